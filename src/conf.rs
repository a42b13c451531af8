use crate::wfs::Source;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::{env, fs, path::Path};
use tracing::info;

/// Points to a JSON file with the list of plan services, highest priority first.
pub const SOURCES_ENV_VAR: &str = "MPZP_SOURCES";

pub struct Conf {
    pub sources: Vec<Source>,
}

#[derive(Deserialize)]
struct ConfFile {
    sources: Vec<Source>,
}

impl Default for Conf {
    fn default() -> Self {
        Conf {
            sources: vec![Source::wieliczka()],
        }
    }
}

impl Conf {
    pub fn load() -> Result<Conf> {
        match env::var(SOURCES_ENV_VAR) {
            Ok(path) => {
                info!(path, "Loading plan sources");
                Conf::from_file(path)
            }
            Err(_) => {
                info!("{SOURCES_ENV_VAR} is not set, using built-in plan sources");
                Ok(Conf::default())
            }
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Conf> {
        let json = fs::read_to_string(path.as_ref())?;
        Conf::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Conf> {
        let file: ConfFile = serde_json::from_str(json)?;
        let mut ids = HashSet::new();
        for source in &file.sources {
            source.validate()?;
            if !ids.insert(source.id.as_str()) {
                return Err(Error::Conf(format!("Duplicate source id: {}", source.id)));
            }
        }
        Ok(Conf {
            sources: file.sources,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crs::Crs;
    use crate::wfs::source::Format;

    #[test]
    fn default_has_wieliczka() {
        let conf = Conf::default();
        assert_eq!(1, conf.sources.len());
        assert_eq!(Crs::Puwg1992, conf.sources[0].crs);
        assert!(conf.sources[0].type_names.is_empty());
        assert!(conf.sources[0].validate().is_ok());
    }

    #[test]
    fn from_json_keeps_priority_order() -> Result<()> {
        let conf = Conf::from_json(
            r#"{
                "sources": [
                    {
                        "id": "wieliczka",
                        "name": "Wieliczka",
                        "url": "https://mpzp.igeomap.pl/cgi-bin/121905",
                        "crs": "EPSG:2180"
                    },
                    {
                        "id": "krakow",
                        "name": "Kraków",
                        "url": "https://example.com/wfs",
                        "crs": "EPSG:2178",
                        "format": "gml",
                        "type_names": ["ms:plany"],
                        "margin": 25,
                        "max_features": 5,
                        "timeout_sec": 30,
                        "geometry_fields": ["obrys"]
                    }
                ]
            }"#,
        )?;
        let ids: Vec<&str> = conf.sources.iter().map(|it| it.id.as_str()).collect();
        assert_eq!(vec!["wieliczka", "krakow"], ids);
        let krakow = &conf.sources[1];
        assert_eq!(Format::Gml, krakow.format);
        assert_eq!(Crs::Puwg2000(7), krakow.crs);
        assert_eq!(25.0, krakow.margin);
        assert_eq!(5, krakow.max_features);
        Ok(())
    }

    #[test]
    fn from_json_rejects_duplicates() {
        let res = Conf::from_json(
            r#"{"sources": [
                {"id": "a", "name": "A", "url": "https://a.example.com", "crs": "EPSG:2180"},
                {"id": "a", "name": "A", "url": "https://a.example.com", "crs": "EPSG:2180"}
            ]}"#,
        );
        assert!(matches!(res, Err(Error::Conf(_))));
    }

    #[test]
    fn from_json_rejects_unknown_crs() {
        let res = Conf::from_json(
            r#"{"sources": [{"id": "a", "name": "A", "url": "https://a.example.com", "crs": "EPSG:31467"}]}"#,
        );
        assert!(matches!(res, Err(Error::SerdeJson(_))));
    }
}
