mod hard_constraints;
mod soft_constraints;

pub use hard_constraints::*;
pub use soft_constraints::*;

use crate::types::{OfficialTimetablePayload, Snapshot};

/// Outcome of the publish gate: an independent, strictly-stricter-than-solver
/// re-check run synchronously before a payload can become official.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub hard_violations: Vec<Violation>,
    pub soft_scores: Vec<SoftScore>,
    pub total_score: f64,
}

/// Re-validates a generated or hand-edited payload against the full hard
/// constraint catalogue. Unlike the solver's `evaluate`, this never trusts
/// the genotype bookkeeping (fixed genes, candidate pools) — it walks the raw
/// `PlacedSlot` list and the snapshot directly, so a manually edited payload
/// is checked exactly as strictly as a generated one.
pub fn validate_payload(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> ValidationReport {
    let mut hard_violations = Vec::new();
    hard_violations.extend(check_room_conflicts(payload));
    hard_violations.extend(check_faculty_conflicts(payload));
    hard_violations.extend(check_section_conflicts(payload));
    hard_violations.extend(check_schedule_bounds(payload, snapshot));
    hard_violations.extend(check_capacity_and_room_type(payload, snapshot));
    hard_violations.extend(check_faculty_availability(payload, snapshot));
    hard_violations.extend(check_locked_slots(payload, snapshot));
    hard_violations.extend(check_semester_limits(payload, snapshot));
    hard_violations.extend(check_elective_overlap(payload, snapshot));
    hard_violations.extend(check_shared_lecture_sync(payload, snapshot));
    hard_violations.extend(check_block_durations(payload, snapshot));
    hard_violations.extend(check_lab_contiguity(payload, snapshot));
    hard_violations.extend(check_single_faculty_per_section(payload));
    hard_violations.extend(check_program_credit_coverage(payload, snapshot));
    hard_violations.extend(check_prerequisites_satisfied(payload, snapshot));

    let is_valid = hard_violations.iter().all(|v| v.severity != Severity::Error);

    let soft_scores = calculate_soft_scores(payload, snapshot);
    let total_score = if !is_valid {
        0.0
    } else {
        let soft_total: f64 = soft_scores.iter().map(|s| s.score).sum();
        let soft_max: f64 = soft_scores.iter().map(|s| s.max_score).sum();
        if soft_max > 0.0 {
            (soft_total / soft_max) * 100.0
        } else {
            100.0
        }
    };

    ValidationReport {
        is_valid,
        hard_violations,
        soft_scores,
        total_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::demo::demo_snapshot;
    use crate::scheduler::run_generation;
    use crate::types::{GenerateTimetableRequest, ProgramId};

    #[test]
    fn a_freshly_generated_payload_is_either_valid_or_reports_why_not() {
        let snapshot = demo_snapshot();
        let request = GenerateTimetableRequest {
            program_id: ProgramId::from("CS"),
            term_number: snapshot.term_number,
            alternative_count: 1,
            persist_official: false,
            settings_override: None,
            already_placed: vec![],
        };
        let response = run_generation(&snapshot, &request).unwrap();
        let payload = &response.alternatives[0].payload;
        let report = validate_payload(payload, &snapshot);
        if !report.is_valid {
            assert!(!report.hard_violations.is_empty());
        }
    }
}
