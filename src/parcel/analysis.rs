use super::area::AreaResult;
use super::point::{extract_with_order, Point};
use crate::wfs::html::attributes_table;
use crate::wfs::{Lookup, Resolution, Resolver};
use crate::{Error, Result};
use geo::{Coord, LineString, Polygon};
use geojson::Geometry;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;

pub const MIN_POINTS: usize = 3;

/// Everything the map page needs to render one submission.
#[derive(Serialize)]
pub struct Analysis {
    pub points: Vec<Point>,
    /// Where the map gets centered
    pub focus: Point,
    /// GeoJSON polygon, lon/lat order
    pub outline: Geometry,
    pub area: AreaResult,
    pub mpzp: Resolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mpzp_html: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

/// Extracts the parcel and refuses to continue with fewer than three vertices.
pub fn parcel(text: &str, swap: bool) -> Result<Vec<Point>> {
    let points = extract_with_order(text, swap);
    if points.len() < MIN_POINTS {
        return Err(Error::InvalidInput(format!(
            "Too few points: found {}, at least {MIN_POINTS} are required",
            points.len()
        )));
    }
    Ok(points)
}

pub fn outline(points: &[Point]) -> Geometry {
    let ring: Vec<Coord> = points
        .iter()
        .map(|it| Coord {
            x: it.lon,
            y: it.lat,
        })
        .collect();
    let polygon = Polygon::new(LineString::new(ring), vec![]);
    Geometry::new(geojson::Value::from(&polygon))
}

pub async fn analyze<L: Lookup>(text: &str, swap: bool, resolver: &Resolver<L>) -> Result<Analysis> {
    let points = parcel(text, swap)?;
    let area = AreaResult::of(&points);
    info!(points = points.len(), area_m2 = area.m2, "Parcel parsed");
    let mpzp = resolver.resolve(&points).await;
    let mpzp_html = match &mpzp {
        Resolution::Found {
            source_name,
            attributes,
            ..
        } => Some(attributes_table(source_name, attributes)),
        Resolution::Unavailable { .. } => None,
    };
    Ok(Analysis {
        focus: points[0],
        outline: outline(&points),
        points,
        area,
        mpzp,
        mpzp_html,
        generated_at: OffsetDateTime::now_utc(),
    })
}
