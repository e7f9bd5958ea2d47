use crate::types::{minutes_to_time, CourseId, OfficialTimetablePayload, Snapshot};
use crate::validator::ValidationReport;
use std::collections::HashMap;

/// Generate a markdown report of a timetable payload.
pub fn generate_markdown_report(payload: &OfficialTimetablePayload, snapshot: &Snapshot, validation: &ValidationReport) -> String {
    let mut lines = vec![
        "# Timetable Report".to_string(),
        String::new(),
        format!("Program: {}", payload.program_id),
        format!("Term: {}", payload.term_number),
        String::new(),
    ];

    lines.push("## Summary\n".to_string());
    lines.push("| Metric | Value |".to_string());
    lines.push("|--------|-------|".to_string());
    lines.push(format!("| Total Slots | {} |", payload.slots.len()));
    lines.push(format!("| Hard Violations | {} |", validation.hard_violations.len()));
    lines.push(format!("| Overall Score | {:.1}/100 |", validation.total_score));
    lines.push(String::new());

    if validation.is_valid {
        lines.push("## Validation: PASSED\n".to_string());
    } else {
        lines.push("## Validation: FAILED\n".to_string());
        for violation in &validation.hard_violations {
            lines.push(format!("- **{}**: {}", violation.constraint, violation.message));
        }
        lines.push(String::new());
    }

    lines.push("## Soft Constraint Scores\n".to_string());
    for score in &validation.soft_scores {
        let pct = if score.max_score > 0.0 { (score.score / score.max_score) * 100.0 } else { 100.0 };
        lines.push(format!("- **{}**: {:.1}% ({})", score.constraint, pct, score.details));
    }
    lines.push(String::new());

    lines.push("## Course Sections\n".to_string());
    let course_names: HashMap<&CourseId, &str> = snapshot.courses.iter().map(|(id, c)| (id, c.name.as_str())).collect();

    let mut by_course: HashMap<&CourseId, Vec<&crate::types::PlacedSlot>> = HashMap::new();
    for slot in &payload.slots {
        by_course.entry(&slot.course_id).or_default().push(slot);
    }
    let mut course_ids: Vec<_> = by_course.keys().copied().collect();
    course_ids.sort_by_key(|c| course_names.get(*c).copied().unwrap_or(""));

    for course_id in course_ids {
        let name = course_names.get(course_id).copied().unwrap_or("Unknown");
        let mut slots = by_course[course_id].clone();
        slots.sort_by_key(|s| (s.day, s.start_min));

        lines.push(format!("### {}\n", name));
        lines.push("| Day | Time | Section | Room | Faculty |".to_string());
        lines.push("|-----|------|---------|------|---------|".to_string());
        for slot in slots {
            let room = snapshot.room(&slot.room_id).map(|r| r.name.as_str()).unwrap_or("Unknown");
            let faculty = snapshot.faculty_member(&slot.faculty_id).map(|f| f.name.as_str()).unwrap_or("Unknown");
            let section = match &slot.batch {
                Some(batch) => format!("{} ({})", slot.section, batch),
                None => slot.section.to_string(),
            };
            lines.push(format!(
                "| {} | {}-{} | {} | {} | {} |",
                slot.day,
                minutes_to_time(slot.start_min),
                minutes_to_time(slot.end_min),
                section,
                room,
                faculty
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
