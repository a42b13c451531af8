use super::attributes::AttributeSet;
use serde::Serialize;
use strum::Display;

/// Best effort guess whether the returned record says a local plan applies.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlanStatus {
    Covered,
    NotCovered,
    Unknown,
}

/// Substring heuristics over free text some services put in their records. This is a weak
/// signal, anything not matching the two known phrases is reported as `Unknown` and callers
/// must not base fallback decisions on it.
pub fn plan_status(attributes: &AttributeSet) -> PlanStatus {
    let text = attributes
        .iter()
        .map(|(_, v)| v.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    if text.contains("brak wyniku") {
        PlanStatus::NotCovered
    } else if text.contains("plan miejscowy") {
        PlanStatus::Covered
    } else {
        PlanStatus::Unknown
    }
}
