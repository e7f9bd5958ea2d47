mod json;
mod markdown;
mod text;

pub use json::*;
pub use markdown::*;
pub use text::*;

use crate::types::{FacultyId, OfficialTimetablePayload, SectionName, Snapshot};
use crate::validator::ValidationReport;
use crate::Result;
use std::fs;
use std::path::Path;

/// Output format for generated reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Text,
}

/// Generate all requested report formats and write them to `output_dir`.
pub fn generate_reports(
    payload: &OfficialTimetablePayload,
    snapshot: &Snapshot,
    validation: &ValidationReport,
    output_dir: &Path,
    formats: &[OutputFormat],
) -> Result<()> {
    fs::create_dir_all(output_dir)?;

    for format in formats {
        match format {
            OutputFormat::Json => {
                let json = generate_json_report(payload)?;
                fs::write(output_dir.join("timetable.json"), json)?;
            }
            OutputFormat::Markdown => {
                let md = generate_markdown_report(payload, snapshot, validation);
                fs::write(output_dir.join("timetable.md"), md)?;
            }
            OutputFormat::Text => {
                let txt = generate_text_report(payload, snapshot, validation);
                fs::write(output_dir.join("timetable.txt"), txt)?;
            }
        }
    }

    Ok(())
}

/// Renders one faculty member's personal weekly schedule.
pub fn generate_faculty_schedule(payload: &OfficialTimetablePayload, snapshot: &Snapshot, faculty_id: &FacultyId) -> Option<String> {
    let faculty = snapshot.faculty_member(faculty_id)?;

    let mut lines = vec![format!("# Schedule for {} ({})", faculty.name, faculty.id), String::new()];

    let mut slots: Vec<_> = payload.slots.iter().filter(|s| &s.faculty_id == faculty_id).collect();
    slots.sort_by_key(|s| (s.day, s.start_min));

    if slots.is_empty() {
        lines.push("No sections assigned.".to_string());
        return Some(lines.join("\n"));
    }

    lines.push(format!("Teaching {} slot(s) this week.\n", slots.len()));
    for slot in slots {
        let course_name = snapshot.course(&slot.course_id).map(|c| c.name.as_str()).unwrap_or("Unknown");
        let room = snapshot.room(&slot.room_id).map(|r| r.name.as_str()).unwrap_or("TBD");
        lines.push(format!(
            "- **{}** {}-{}: {} (section {}) in {}",
            slot.day,
            crate::types::minutes_to_time(slot.start_min),
            crate::types::minutes_to_time(slot.end_min),
            course_name,
            slot.section,
            room
        ));
    }

    Some(lines.join("\n"))
}

/// Renders one program section's personal weekly schedule.
pub fn generate_section_schedule(payload: &OfficialTimetablePayload, snapshot: &Snapshot, section: &SectionName) -> Option<String> {
    let mut slots: Vec<_> = payload.slots.iter().filter(|s| &s.section == section).collect();
    if slots.is_empty() {
        return None;
    }
    slots.sort_by_key(|s| (s.day, s.start_min));

    let mut lines = vec![format!("# Schedule for Section {}", section), String::new()];
    for slot in slots {
        let course_name = snapshot.course(&slot.course_id).map(|c| c.name.as_str()).unwrap_or("Unknown");
        let faculty_name = snapshot.faculty_member(&slot.faculty_id).map(|f| f.name.as_str()).unwrap_or("TBD");
        let room = snapshot.room(&slot.room_id).map(|r| r.name.as_str()).unwrap_or("TBD");
        let batch_label = slot.batch.as_deref().map(|b| format!(" [{b}]")).unwrap_or_default();
        lines.push(format!(
            "- **{}** {}-{}: {}{} with {} in {}",
            slot.day,
            crate::types::minutes_to_time(slot.start_min),
            crate::types::minutes_to_time(slot.end_min),
            course_name,
            batch_label,
            faculty_name,
            room
        ));
    }

    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::demo::demo_snapshot;
    use crate::scheduler::run_generation;
    use crate::types::{GenerateTimetableRequest, ProgramId, SectionName};
    use crate::validator::validate_payload;

    #[test]
    fn section_schedule_is_rendered_for_a_known_section() {
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
        let report = generate_section_schedule(payload, &snapshot, &SectionName::from("A"));
        assert!(report.is_some());
    }

    #[test]
    fn generate_reports_writes_every_requested_format() {
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
        let validation = validate_payload(payload, &snapshot);

        let dir = std::env::temp_dir().join(format!("academic-timetabler-test-{}", std::process::id()));
        generate_reports(payload, &snapshot, &validation, &dir, &[OutputFormat::Json, OutputFormat::Markdown, OutputFormat::Text]).unwrap();
        assert!(dir.join("timetable.json").exists());
        assert!(dir.join("timetable.md").exists());
        assert!(dir.join("timetable.txt").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
