use super::attributes::AttributeSet;
use super::classify::{plan_status, PlanStatus};
use super::client::WfsClient;
use super::result::{Failure, NotFoundReason, SourceResult};
use super::source::Source;
use crate::parcel::point::Point;
use serde::Serialize;
use tracing::{info, warn};

pub const UNAVAILABLE_MESSAGE: &str = "No zoning plan (MPZP) data could be retrieved for this parcel. \
Likely causes: no vector plan has been published for this area, \
the parcel lies outside of every plan boundary, \
or the plan service failed to respond properly.";

/// Something able to query a single source.
#[allow(async_fn_in_trait)]
pub trait Lookup {
    async fn lookup(&self, source: &Source, points: &[Point]) -> SourceResult;
}

impl Lookup for WfsClient {
    async fn lookup(&self, source: &Source, points: &[Point]) -> SourceResult {
        self.query(source, points).await
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum Miss {
    NotFound(NotFoundReason),
    Failed(Failure),
}

/// A source that was asked and had nothing to offer.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Attempt {
    pub source_id: String,
    #[serde(flatten)]
    pub miss: Miss,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Found {
        source_id: String,
        source_name: String,
        attributes: AttributeSet,
        plan_status: PlanStatus,
        attempts: Vec<Attempt>,
    },
    Unavailable {
        message: String,
        attempts: Vec<Attempt>,
    },
}

/// Walks the configured sources in priority order and settles on the first hit.
pub struct Resolver<L> {
    lookup: L,
    sources: Vec<Source>,
}

impl<L: Lookup> Resolver<L> {
    pub fn new(lookup: L, sources: Vec<Source>) -> Self {
        Resolver { lookup, sources }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub async fn resolve(&self, points: &[Point]) -> Resolution {
        let mut attempts = vec![];
        for source in &self.sources {
            let miss = match self.lookup.lookup(source, points).await {
                SourceResult::Found {
                    source_id,
                    attributes,
                } => {
                    info!(
                        source = source_id,
                        attributes = attributes.len(),
                        "Found zoning plan record"
                    );
                    return Resolution::Found {
                        source_id,
                        source_name: source.name.clone(),
                        plan_status: plan_status(&attributes),
                        attributes,
                        attempts,
                    };
                }
                SourceResult::NotFound(reason) => {
                    info!(source = source.id, %reason, "Source has no record, trying next");
                    Miss::NotFound(reason)
                }
                SourceResult::Failed(failure) => {
                    warn!(source = source.id, %failure, "Source failed, trying next");
                    Miss::Failed(failure)
                }
            };
            attempts.push(Attempt {
                source_id: source.id.clone(),
                miss,
            });
        }
        warn!(sources = self.sources.len(), "No source returned zoning plan data");
        Resolution::Unavailable {
            message: unavailable_message(&self.sources),
            attempts,
        }
    }
}

fn unavailable_message(sources: &[Source]) -> String {
    if sources.is_empty() {
        return format!("{UNAVAILABLE_MESSAGE} No plan services are configured.");
    }
    let names: Vec<&str> = sources.iter().map(|it| it.name.as_str()).collect();
    format!("{UNAVAILABLE_MESSAGE} Services asked: {}.", names.join(", "))
}
