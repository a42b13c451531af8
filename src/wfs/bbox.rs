use crate::crs::Crs;
use serde::Serialize;

/// Query window in a source's CRS. The margin is applied after projecting the center, so a
/// meter based CRS gets the same physical window size at any latitude.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub crs: Crs,
}

impl BoundingBox {
    pub fn around(center: (f64, f64), margin: f64, crs: Crs) -> Self {
        let (x, y) = center;
        BoundingBox {
            min_x: x - margin,
            min_y: y - margin,
            max_x: x + margin,
            max_y: y + margin,
            crs,
        }
    }

    /// WFS 1.1.0 `BBOX` value with a trailing CRS identifier.
    pub fn to_param(&self, northing_first: bool) -> String {
        if northing_first {
            format!(
                "{},{},{},{},{}",
                self.min_y, self.min_x, self.max_y, self.max_x, self.crs
            )
        } else {
            format!(
                "{},{},{},{},{}",
                self.min_x, self.min_y, self.max_x, self.max_y, self.crs
            )
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn around_center() {
        let bbox = BoundingBox::around((571644.5, 237447.25), 10.0, Crs::Puwg1992);
        assert_eq!(571634.5, bbox.min_x);
        assert_eq!(237437.25, bbox.min_y);
        assert_eq!(571654.5, bbox.max_x);
        assert_eq!(237457.25, bbox.max_y);
    }

    #[test]
    fn param_axis_order() {
        let bbox = BoundingBox::around((100.0, 200.0), 10.0, Crs::Puwg1992);
        assert_eq!("90,190,110,210,EPSG:2180", bbox.to_param(false));
        assert_eq!("190,90,210,110,EPSG:2180", bbox.to_param(true));
    }
}
