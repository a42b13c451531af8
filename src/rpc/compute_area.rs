use crate::parcel::analysis::MIN_POINTS;
use crate::parcel::area::AreaResult;
use crate::parcel::point::Point;
use crate::{Error, Result};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct Params {
    /// `[lat, lon]` pairs
    pub points: Vec<Point>,
}

pub fn run(params: Params) -> Result<AreaResult> {
    if params.points.len() < MIN_POINTS {
        return Err(Error::InvalidInput(format!(
            "At least {MIN_POINTS} points are required"
        )));
    }
    Ok(AreaResult::of(&params.points))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::mock_parcel;

    #[test]
    fn area_of_mock_parcel() -> Result<()> {
        let res = run(Params {
            points: mock_parcel(),
        })?;
        assert!((res.m2 - 15_904.0).abs() < 1.0);
        assert!((res.ha - res.m2 / 10_000.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn two_points_are_rejected() {
        let res = run(Params {
            points: vec![Point::new(50.0, 20.0), Point::new(50.1, 20.1)],
        });
        assert!(matches!(res, Err(Error::InvalidInput(_))));
    }
}
