use crate::types::{GenerateTimetableResponse, OfficialTimetablePayload};
use crate::validator::ValidationReport;
use crate::Result;

/// Generate a JSON report of the published payload.
pub fn generate_json_report(payload: &OfficialTimetablePayload) -> Result<String> {
    Ok(serde_json::to_string_pretty(payload)?)
}

/// Summary statistics as JSON, combining a generation response with its
/// validation report.
#[derive(serde::Serialize)]
pub struct JsonSummary {
    pub total_slots: usize,
    pub hard_conflicts: u64,
    pub soft_penalty: f64,
    pub runtime_ms: u64,
    pub score: f64,
}

pub fn generate_json_summary(response: &GenerateTimetableResponse, validation: &ValidationReport) -> Result<String> {
    let best = response.alternatives.first();
    let summary = JsonSummary {
        total_slots: best.map(|a| a.payload.slots.len()).unwrap_or(0),
        hard_conflicts: best.map(|a| a.hard_conflicts).unwrap_or(0),
        soft_penalty: best.map(|a| a.soft_penalty).unwrap_or(0.0),
        runtime_ms: response.runtime_ms,
        score: validation.total_score,
    };
    Ok(serde_json::to_string_pretty(&summary)?)
}
