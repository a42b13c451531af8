use super::attributes::AttributeSet;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use strum::Display as StrumDisplay;

/// Outcome of querying a single source. Lookups never error out, every problem ends up here.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceResult {
    Found {
        source_id: String,
        attributes: AttributeSet,
    },
    NotFound(NotFoundReason),
    Failed(Failure),
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotFoundReason {
    /// Well formed response without a single feature
    EmptyResultSet,
    /// First feature carried nothing but geometry
    NoAttributes,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Failure {
    Config(String),
    Transform(String),
    Capabilities(String),
    Timeout { seconds: u64 },
    Transport(String),
    Status { code: u16, snippet: String },
    Parse { message: String, snippet: String },
    ServiceException(String),
}

const SNIPPET_LEN: usize = 200;

impl Failure {
    pub fn parse(message: impl Into<String>, body: &str) -> Self {
        Failure::Parse {
            message: message.into(),
            snippet: snippet(body),
        }
    }
}

/// First few hundred chars of a response body, for logs and diagnostics.
pub fn snippet(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(SNIPPET_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Config(err) => write!(f, "Invalid source configuration: {err}"),
            Failure::Transform(err) => write!(f, "Coordinate transform failed: {err}"),
            Failure::Capabilities(err) => write!(f, "GetCapabilities failed: {err}"),
            Failure::Timeout { seconds } => write!(f, "No response within {seconds} s"),
            Failure::Transport(err) => write!(f, "Request failed: {err}"),
            Failure::Status { code, .. } => write!(f, "Unexpected response status: {code}"),
            Failure::Parse { message, .. } => write!(f, "Malformed response: {message}"),
            Failure::ServiceException(err) => write!(f, "Service reported an error: {err}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn snippet_cuts_long_bodies_on_char_boundary() {
        let body = "ż".repeat(500);
        let res = snippet(&body);
        assert_eq!(SNIPPET_LEN + 3, res.chars().count());
        assert!(res.ends_with("..."));
        assert_eq!("short", snippet("  short \n"));
    }

    #[test]
    fn failure_serializes_with_kind() -> crate::Result<()> {
        let json = serde_json::to_value(Failure::Timeout { seconds: 20 })?;
        assert_eq!("timeout", json["kind"]);
        assert_eq!(20, json["detail"]["seconds"]);
        Ok(())
    }
}
