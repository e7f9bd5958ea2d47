use crate::types::{OfficialTimetablePayload, Snapshot};
use std::collections::{HashMap, HashSet};

/// A scored soft-constraint contribution, normalized to `[0, max_score]` so
/// callers can sum toward a single percentage score.
#[derive(Debug, Clone)]
pub struct SoftScore {
    pub constraint: String,
    pub score: f64,
    pub max_score: f64,
    pub details: String,
}

pub fn calculate_soft_scores(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> Vec<SoftScore> {
    let mut scores = Vec::new();
    scores.push(workload_balance_score(payload, snapshot));
    scores.push(faculty_preference_score(payload, snapshot));
    scores.push(spread_balance_score(payload));
    scores
}

fn workload_balance_score(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> SoftScore {
    let mut minutes_by_faculty: HashMap<&str, u32> = HashMap::new();
    for slot in &payload.slots {
        *minutes_by_faculty.entry(slot.faculty_id.0.as_str()).or_insert(0) += slot.end_min - slot.start_min;
    }

    let mut hit = 0usize;
    let mut total = 0usize;
    for (faculty_id, minutes) in &minutes_by_faculty {
        if let Some(faculty) = snapshot.faculty.values().find(|f| f.id.0 == *faculty_id) {
            total += 1;
            let target = faculty.target_minutes().max(1);
            let ratio = (*minutes as f64 / target as f64).min(1.0);
            if ratio >= 0.85 {
                hit += 1;
            }
        }
    }

    let max_score = 100.0;
    let score = if total == 0 { max_score } else { max_score * hit as f64 / total as f64 };
    SoftScore {
        constraint: "workload_balance".to_string(),
        score,
        max_score,
        details: format!("{hit}/{total} faculty within 15% of their target teaching load"),
    }
}

fn faculty_preference_score(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> SoftScore {
    let mut matched = 0usize;
    let mut total = 0usize;
    for slot in &payload.slots {
        total += 1;
        if let Some(faculty) = snapshot.faculty_member(&slot.faculty_id) {
            if let Some(course) = snapshot.course(&slot.course_id) {
                if faculty.preference_codes_for_term(payload.term_number).contains(&course.code.to_uppercase()) {
                    matched += 1;
                }
            }
        }
    }
    let max_score = 100.0;
    let score = if total == 0 { max_score } else { max_score * matched as f64 / total as f64 };
    SoftScore {
        constraint: "faculty_subject_preference".to_string(),
        score,
        max_score,
        details: format!("{matched}/{total} slots taught by a faculty member who prefers that subject"),
    }
}

fn spread_balance_score(payload: &OfficialTimetablePayload) -> SoftScore {
    let mut days_by_section: HashMap<&str, HashSet<crate::types::Day>> = HashMap::new();
    let mut blocks_by_section: HashMap<&str, usize> = HashMap::new();
    for slot in &payload.slots {
        days_by_section.entry(slot.section.0.as_str()).or_default().insert(slot.day);
        *blocks_by_section.entry(slot.section.0.as_str()).or_insert(0) += 1;
    }

    let mut ratios = Vec::new();
    for (section, blocks) in &blocks_by_section {
        let days_used = days_by_section.get(section).map(|d| d.len()).unwrap_or(1).max(1);
        let ideal_days = (*blocks).min(5).max(1);
        ratios.push(days_used as f64 / ideal_days as f64);
    }

    let max_score = 100.0;
    let score = if ratios.is_empty() {
        max_score
    } else {
        max_score * (ratios.iter().sum::<f64>() / ratios.len() as f64).min(1.0)
    };
    SoftScore {
        constraint: "spread_balance".to_string(),
        score,
        max_score,
        details: "teaching load spread across the working week, relative to the ideal".to_string(),
    }
}
