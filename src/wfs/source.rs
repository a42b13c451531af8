use crate::crs::Crs;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::Display;
use url::Url;

pub const DEFAULT_GEOMETRY_FIELDS: &[&str] = &[
    "geom",
    "geometry",
    "the_geom",
    "shape",
    "boundedby",
    "msgeometry",
    "wkb_geometry",
];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Gml,
}

/// One WFS endpoint serving zoning plan features.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Source {
    pub id: String,
    pub name: String,
    pub url: String,
    pub crs: Crs,
    /// Empty list means the first type advertised by GetCapabilities
    #[serde(default)]
    pub type_names: Vec<String>,
    #[serde(default)]
    pub format: Format,
    #[serde(default)]
    pub output_format: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    /// Half width of the query window, in the unit of `crs`
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default = "default_max_features")]
    pub max_features: u32,
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
    #[serde(default = "default_geometry_fields")]
    pub geometry_fields: Vec<String>,
    /// Some servers want BBOX as miny,minx,maxy,maxx for northing/easting grids
    #[serde(default)]
    pub northing_first: bool,
}

fn default_version() -> String {
    "1.1.0".into()
}

fn default_margin() -> f64 {
    10.0
}

fn default_max_features() -> u32 {
    10
}

fn default_timeout_sec() -> u64 {
    20
}

fn default_geometry_fields() -> Vec<String> {
    DEFAULT_GEOMETRY_FIELDS.iter().map(|it| it.to_string()).collect()
}

impl Source {
    /// Gmina Wieliczka plans, published by Geo-System on mpzp.igeomap.pl
    pub fn wieliczka() -> Source {
        Source {
            id: "igeomap-wieliczka".into(),
            name: "MPZP Wieliczka (mpzp.igeomap.pl)".into(),
            url: "https://mpzp.igeomap.pl/cgi-bin/121905".into(),
            crs: Crs::Puwg1992,
            type_names: vec![],
            format: Format::Json,
            output_format: None,
            version: default_version(),
            margin: default_margin(),
            max_features: default_max_features(),
            timeout_sec: default_timeout_sec(),
            geometry_fields: default_geometry_fields(),
            northing_first: false,
        }
    }

    pub fn output_format(&self) -> Option<&str> {
        match (&self.output_format, self.format) {
            (Some(explicit), _) => Some(explicit.as_str()),
            (None, Format::Json) => Some("application/json"),
            (None, Format::Gml) => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }

    /// Case insensitive, namespace prefixes are ignored.
    pub fn is_geometry_field(&self, name: &str) -> bool {
        let local = name.rsplit(':').next().unwrap_or(name);
        self.geometry_fields
            .iter()
            .any(|it| it.eq_ignore_ascii_case(local) || it.eq_ignore_ascii_case(name))
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Conf("Source id can't be empty".into()));
        }
        Url::parse(&self.url)
            .map_err(|e| Error::Conf(format!("Source {} has invalid url: {e}", self.id)))?;
        if !self.margin.is_finite() || self.margin <= 0.0 {
            return Err(Error::Conf(format!(
                "Source {} margin must be a positive number",
                self.id
            )));
        }
        if self.crs.is_geographic() && self.margin >= 1.0 {
            return Err(Error::Conf(format!(
                "Source {} uses {}, margin is in degrees and must stay below 1",
                self.id, self.crs
            )));
        }
        if self.max_features == 0 {
            return Err(Error::Conf(format!(
                "Source {} max_features must be positive",
                self.id
            )));
        }
        if self.timeout_sec == 0 {
            return Err(Error::Conf(format!(
                "Source {} timeout_sec must be positive",
                self.id
            )));
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn mock(id: &str) -> Source {
        Source {
            id: id.into(),
            name: format!("Mock {id}"),
            url: format!("https://{id}.example.com/wfs"),
            ..Source::wieliczka()
        }
    }
}
