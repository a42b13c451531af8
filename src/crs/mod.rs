mod tm;

use crate::parcel::point::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::{Display, Formatter};
pub use tm::TransverseMercator;

const WEB_MERCATOR_RADIUS: f64 = 6378137.0;
const WEB_MERCATOR_MAX_LAT: f64 = 85.05112878;

/// Forward transform from WGS84 degrees into a source's own coordinates, `(x, y)`.
pub trait Transform {
    fn forward(&self, point: Point) -> Result<(f64, f64), TransformError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    NonFinite(Point),
    OutOfDomain(String),
}

impl Display for TransformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::NonFinite(point) => {
                write!(f, "Point ({}, {}) can't be projected", point.lat, point.lon)
            }
            TransformError::OutOfDomain(err) => write!(f, "{}", err),
        }
    }
}

/// Coordinate reference systems sources can ask for, keyed by their EPSG code.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum Crs {
    Wgs84,
    WebMercator,
    Puwg1992,
    Puwg2000(u8),
}

impl Crs {
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
            Crs::Puwg1992 => 2180,
            Crs::Puwg2000(zone) => 2171 + *zone as u32,
        }
    }

    pub fn from_epsg(code: u32) -> Option<Crs> {
        match code {
            4326 => Some(Crs::Wgs84),
            3857 => Some(Crs::WebMercator),
            2180 => Some(Crs::Puwg1992),
            2176..=2179 => Some(Crs::Puwg2000((code - 2171) as u8)),
            _ => None,
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Wgs84)
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl TryFrom<String> for Crs {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let code = value
            .trim()
            .to_ascii_uppercase()
            .trim_start_matches("EPSG:")
            .parse::<u32>()
            .map_err(|_| format!("Malformed CRS identifier: {value}"))?;
        Crs::from_epsg(code).ok_or_else(|| format!("Unsupported CRS: {value}"))
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.to_string()
    }
}

impl Transform for Crs {
    fn forward(&self, point: Point) -> Result<(f64, f64), TransformError> {
        if !point.lat.is_finite() || !point.lon.is_finite() {
            return Err(TransformError::NonFinite(point));
        }
        let (x, y) = match self {
            Crs::Wgs84 => (point.lon, point.lat),
            Crs::WebMercator => {
                if point.lat.abs() > WEB_MERCATOR_MAX_LAT {
                    return Err(TransformError::OutOfDomain(format!(
                        "Latitude {} is outside of web mercator bounds",
                        point.lat
                    )));
                }
                let x = WEB_MERCATOR_RADIUS * point.lon.to_radians();
                let y = WEB_MERCATOR_RADIUS * (PI / 4.0 + point.lat.to_radians() / 2.0).tan().ln();
                (x, y)
            }
            Crs::Puwg1992 => TransverseMercator::PUWG_1992.forward(point.lat, point.lon),
            Crs::Puwg2000(zone) => TransverseMercator::puwg_2000(*zone).forward(point.lat, point.lon),
        };
        if !x.is_finite() || !y.is_finite() {
            return Err(TransformError::NonFinite(point));
        }
        Ok((x, y))
    }
}
