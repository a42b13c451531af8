use super::bbox::BoundingBox;
use super::parse;
use super::result::{snippet, Failure, SourceResult};
use super::source::Source;
use crate::crs::Transform;
use crate::parcel::point::{centroid, Point};
use crate::Result;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

static USER_AGENT: &str = concat!("mpzp-api/", env!("CARGO_PKG_VERSION"));

/// Talks to WFS endpoints. One instance is shared by all requests, the underlying connection
/// pool is reused between sources and submissions.
pub struct WfsClient {
    http: Client,
}

impl WfsClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(WfsClient { http })
    }

    /// One attempt against one source. Anything that goes wrong is folded into the result.
    pub async fn query(&self, source: &Source, points: &[Point]) -> SourceResult {
        let bbox = match query_window(source, points) {
            Ok(bbox) => bbox,
            Err(failure) => return SourceResult::Failed(failure),
        };
        let type_names = if source.type_names.is_empty() {
            match self.discover_type_names(source).await {
                Ok(type_names) => type_names,
                Err(failure) => return SourceResult::Failed(failure),
            }
        } else {
            source.type_names.clone()
        };
        let url = match get_feature_url(source, &type_names, &bbox) {
            Ok(url) => url,
            Err(e) => return SourceResult::Failed(Failure::Config(e.to_string())),
        };
        info!(source = source.id, %url, "Querying WFS");
        let body = match self.fetch(url, source.timeout()).await {
            Ok(body) => body,
            Err(failure) => return SourceResult::Failed(failure),
        };
        parse::feature_result(source, &body)
    }

    async fn discover_type_names(&self, source: &Source) -> Result<Vec<String>, Failure> {
        let url = capabilities_url(source).map_err(|e| Failure::Config(e.to_string()))?;
        info!(source = source.id, %url, "Fetching WFS capabilities");
        let body = self.fetch(url, source.timeout()).await?;
        let type_names = parse::capabilities_type_names(&body)?;
        match type_names.into_iter().next() {
            Some(first) => {
                info!(source = source.id, type_name = first, "Using first advertised feature type");
                Ok(vec![first])
            }
            None => Err(Failure::Capabilities(
                "Service doesn't advertise any feature type".into(),
            )),
        }
    }

    async fn fetch(&self, url: Url, timeout: Duration) -> Result<String, Failure> {
        let res = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_failure(e, timeout))?;
        let status = res.status();
        info!(http_status_code = ?status, "Got WFS response");
        let body = res.text().await.map_err(|e| transport_failure(e, timeout))?;
        if !status.is_success() {
            warn!(http_status_code = ?status, body = snippet(&body), "Unexpected WFS status");
            return Err(Failure::Status {
                code: status.as_u16(),
                snippet: snippet(&body),
            });
        }
        Ok(body)
    }
}

fn transport_failure(e: reqwest::Error, timeout: Duration) -> Failure {
    if e.is_timeout() {
        Failure::Timeout {
            seconds: timeout.as_secs(),
        }
    } else {
        Failure::Transport(e.to_string())
    }
}

/// Centroid of the parcel, projected into the source's CRS and padded by its margin.
pub fn query_window(source: &Source, points: &[Point]) -> Result<BoundingBox, Failure> {
    let Some(center) = centroid(points) else {
        return Err(Failure::Transform("Parcel has no points".into()));
    };
    let projected = source
        .crs
        .forward(center)
        .map_err(|e| Failure::Transform(e.to_string()))?;
    Ok(BoundingBox::around(projected, source.margin, source.crs))
}

pub fn capabilities_url(source: &Source) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&source.url)?;
    url.query_pairs_mut()
        .append_pair("SERVICE", "WFS")
        .append_pair("REQUEST", "GetCapabilities")
        .append_pair("VERSION", &source.version);
    Ok(url)
}

pub fn get_feature_url(
    source: &Source,
    type_names: &[String],
    bbox: &BoundingBox,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&source.url)?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("SERVICE", "WFS")
            .append_pair("VERSION", &source.version)
            .append_pair("REQUEST", "GetFeature")
            .append_pair("TYPENAME", &type_names.join(","))
            .append_pair("SRSNAME", &source.crs.to_string())
            .append_pair("BBOX", &bbox.to_param(source.northing_first))
            .append_pair("MAXFEATURES", &source.max_features.to_string());
        if let Some(output_format) = source.output_format() {
            query.append_pair("OUTPUTFORMAT", output_format);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crs::Crs;
    use crate::test::{mock_gml_source, mock_json_source, mock_parcel};
    use std::collections::HashMap;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn query_map(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn window_is_margin_in_meters_around_projected_centroid() {
        let source = mock_json_source("a");
        let bbox = query_window(&source, &mock_parcel()).unwrap();
        assert_eq!(Crs::Puwg1992, bbox.crs);
        assert!((bbox.max_x - bbox.min_x - 20.0).abs() < 1e-6);
        assert!((bbox.max_y - bbox.min_y - 20.0).abs() < 1e-6);
        // the mock parcel sits around 50.0005 N 20.001 E
        let center_x = (bbox.min_x + bbox.max_x) / 2.0;
        let center_y = (bbox.min_y + bbox.max_y) / 2.0;
        assert!((center_x - 571715.839).abs() < 0.01, "{center_x}");
        assert!((center_y - 237503.950).abs() < 0.01, "{center_y}");
    }

    #[test]
    fn window_in_degrees_for_geographic_sources() {
        let source = Source {
            crs: Crs::Wgs84,
            margin: 0.0001,
            ..mock_json_source("a")
        };
        let bbox = query_window(&source, &mock_parcel()).unwrap();
        assert!((bbox.min_x - 20.0009).abs() < 1e-9);
        assert!((bbox.max_y - 50.0006).abs() < 1e-9);
    }

    #[test]
    fn window_needs_points() {
        let res = query_window(&mock_json_source("a"), &[]);
        assert!(matches!(res, Err(Failure::Transform(_))));
    }

    #[test]
    fn window_rejects_non_finite_centroid() {
        let points = vec![Point::new(f64::NAN, 20.0); 3];
        let res = query_window(&mock_json_source("a"), &points);
        assert!(matches!(res, Err(Failure::Transform(_))));
    }

    #[test]
    fn get_feature_url_for_json_source() {
        let source = mock_json_source("a");
        let bbox = BoundingBox::around((100.0, 200.0), 10.0, Crs::Puwg1992);
        let url = get_feature_url(&source, &["ms:plan".into()], &bbox).unwrap();
        let query = query_map(&url);
        assert_eq!("WFS", query["SERVICE"]);
        assert_eq!("GetFeature", query["REQUEST"]);
        assert_eq!("1.1.0", query["VERSION"]);
        assert_eq!("ms:plan", query["TYPENAME"]);
        assert_eq!("EPSG:2180", query["SRSNAME"]);
        assert_eq!("90,190,110,210,EPSG:2180", query["BBOX"]);
        assert_eq!("10", query["MAXFEATURES"]);
        assert_eq!("application/json", query["OUTPUTFORMAT"]);
        assert_eq!(Some("a.example.com"), url.host_str());
    }

    #[test]
    fn get_feature_url_for_gml_source() {
        let source = mock_gml_source("a");
        let bbox = BoundingBox::around((100.0, 200.0), 10.0, Crs::Puwg1992);
        let url = get_feature_url(&source, &["a".into(), "b".into()], &bbox).unwrap();
        let query = query_map(&url);
        assert_eq!("a,b", query["TYPENAME"]);
        assert!(!query.contains_key("OUTPUTFORMAT"));
    }

    #[test]
    fn existing_query_is_preserved() {
        let source = Source {
            url: "https://a.example.com/cgi-bin/mapserv?map=mpzp.map".into(),
            ..mock_gml_source("a")
        };
        let url = capabilities_url(&source).unwrap();
        let query = query_map(&url);
        assert_eq!("mpzp.map", query["map"]);
        assert_eq!("GetCapabilities", query["REQUEST"]);
    }

    /// Accepts one connection on a local port, answers with `response` or stays silent.
    fn serve_once(response: Option<&'static str>) -> crate::Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let Some(response) = response else {
                thread::sleep(Duration::from_secs(5));
                return;
            };
            let mut req: Vec<u8> = vec![];
            let mut buf = [0; 1024];
            while !req.windows(4).any(|it| it == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => return,
                    Ok(n) => req.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream.write_all(response.as_bytes());
        });
        Ok(format!("http://{addr}/wfs"))
    }

    const UNAVAILABLE: &str = "HTTP/1.1 503 Service Unavailable\r\n\
        Content-Type: text/plain\r\n\
        Content-Length: 11\r\n\
        Connection: close\r\n\r\n\
        maintenance";

    #[actix_web::test]
    async fn silent_server_is_timeout() -> crate::Result<()> {
        let source = Source {
            url: serve_once(None)?,
            type_names: vec!["ms:plan".into()],
            timeout_sec: 1,
            ..mock_json_source("a")
        };
        let res = WfsClient::new()?.query(&source, &mock_parcel()).await;
        assert_eq!(SourceResult::Failed(Failure::Timeout { seconds: 1 }), res);
        Ok(())
    }

    #[actix_web::test]
    async fn silent_server_during_discovery_is_timeout() -> crate::Result<()> {
        let source = Source {
            url: serve_once(None)?,
            timeout_sec: 1,
            ..mock_json_source("a")
        };
        assert!(source.type_names.is_empty());
        let res = WfsClient::new()?.query(&source, &mock_parcel()).await;
        assert_eq!(SourceResult::Failed(Failure::Timeout { seconds: 1 }), res);
        Ok(())
    }

    #[actix_web::test]
    async fn error_status_is_reported_with_body() -> crate::Result<()> {
        let source = Source {
            url: serve_once(Some(UNAVAILABLE))?,
            type_names: vec!["ms:plan".into()],
            timeout_sec: 5,
            ..mock_json_source("a")
        };
        let res = WfsClient::new()?.query(&source, &mock_parcel()).await;
        assert_eq!(
            SourceResult::Failed(Failure::Status {
                code: 503,
                snippet: "maintenance".into(),
            }),
            res
        );
        Ok(())
    }

    #[actix_web::test]
    async fn error_status_during_discovery_keeps_its_code() -> crate::Result<()> {
        let source = Source {
            url: serve_once(Some(UNAVAILABLE))?,
            timeout_sec: 5,
            ..mock_json_source("a")
        };
        let res = WfsClient::new()?.query(&source, &mock_parcel()).await;
        assert!(matches!(
            res,
            SourceResult::Failed(Failure::Status { code: 503, .. })
        ));
        Ok(())
    }

    #[actix_web::test]
    async fn refused_connection_is_transport_failure() -> crate::Result<()> {
        let addr = TcpListener::bind("127.0.0.1:0")?.local_addr()?;
        let source = Source {
            url: format!("http://{addr}/wfs"),
            type_names: vec!["ms:plan".into()],
            timeout_sec: 5,
            ..mock_json_source("a")
        };
        let res = WfsClient::new()?.query(&source, &mock_parcel()).await;
        assert!(matches!(res, SourceResult::Failed(Failure::Transport(_))));
        Ok(())
    }
}
