use super::point::{centroid, Point};
use geo::{Area, Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const METERS_PER_DEGREE_LAT: f64 = 111132.954;
pub const EARTH_RADIUS_M: f64 = 6378137.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AreaResult {
    pub m2: f64,
    pub ar: f64,
    pub ha: f64,
}

impl AreaResult {
    pub fn from_m2(m2: f64) -> Self {
        AreaResult {
            m2,
            ar: m2 / 100.0,
            ha: m2 / 10000.0,
        }
    }

    pub fn of(points: &[Point]) -> Self {
        AreaResult::from_m2(area_m2(points))
    }
}

/// Meters per degree of longitude at the given latitude.
pub fn meters_per_degree_lon(lat: f64) -> f64 {
    (PI / 180.0) * EARTH_RADIUS_M * lat.to_radians().cos()
}

/// Projects the ring onto a plane tangent at its mean point.
pub fn project_local(points: &[Point]) -> Vec<Coord> {
    let Some(center) = centroid(points) else {
        return vec![];
    };
    let lon_scale = meters_per_degree_lon(center.lat);
    points
        .iter()
        .map(|it| Coord {
            x: (it.lon - center.lon) * lon_scale,
            y: (it.lat - center.lat) * METERS_PER_DEGREE_LAT,
        })
        .collect()
}

/// Approximate area in square meters, winding agnostic.
///
/// Equirectangular approximation around the ring's mean point, good enough for parcels and
/// drifting for shapes spanning whole degrees of latitude. Self-intersecting rings are
/// taken as is, the shoelace sum simply cancels the overlapping lobes.
pub fn area_m2(points: &[Point]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let ring = LineString::new(project_local(points));
    Polygon::new(ring, vec![]).unsigned_area()
}
