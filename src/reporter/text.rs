use crate::types::{minutes_to_time, CourseId, OfficialTimetablePayload, Snapshot};
use crate::validator::ValidationReport;
use colored::Colorize;
use std::collections::HashMap;

/// Generate a plain text report (colored for terminal display).
pub fn generate_text_report(payload: &OfficialTimetablePayload, snapshot: &Snapshot, validation: &ValidationReport) -> String {
    let mut lines = Vec::new();

    lines.push("=".repeat(60));
    lines.push("               TIMETABLE REPORT".to_string());
    lines.push("=".repeat(60));
    lines.push(String::new());

    lines.push(format!("Program: {}", payload.program_id));
    lines.push(format!("Term: {}", payload.term_number));
    lines.push(String::new());

    lines.push("-".repeat(40));
    lines.push("STATISTICS".to_string());
    lines.push("-".repeat(40));
    lines.push(format!("  Slots:         {}", payload.slots.len()));
    lines.push(format!("  Hard Issues:   {}", validation.hard_violations.len()));
    lines.push(format!("  Score:         {:.1}/100", validation.total_score));
    lines.push(String::new());

    lines.push("-".repeat(40));
    if validation.is_valid {
        lines.push("VALIDATION: PASSED".green().to_string());
    } else {
        lines.push("VALIDATION: FAILED".red().to_string());
        for v in &validation.hard_violations {
            lines.push(format!("  ! {}: {}", v.constraint, v.message));
        }
    }
    lines.push("-".repeat(40));
    lines.push(String::new());

    let course_names: HashMap<&CourseId, &str> = snapshot.courses.iter().map(|(id, c)| (id, c.name.as_str())).collect();
    let mut by_course: HashMap<&CourseId, Vec<&crate::types::PlacedSlot>> = HashMap::new();
    for slot in &payload.slots {
        by_course.entry(&slot.course_id).or_default().push(slot);
    }

    lines.push("COURSE SECTIONS".to_string());
    lines.push("-".repeat(40));

    for (course_id, slots) in &by_course {
        let name = course_names.get(course_id).copied().unwrap_or("Unknown");
        lines.push(format!("\n{} ({} slots)", name.bold(), slots.len()));

        let mut sorted = slots.clone();
        sorted.sort_by_key(|s| (s.day, s.start_min));
        for slot in sorted {
            let room = snapshot.room(&slot.room_id).map(|r| r.name.as_str()).unwrap_or("Unknown");
            let faculty = snapshot.faculty_member(&slot.faculty_id).map(|f| f.name.as_str()).unwrap_or("Unknown");
            let fill_pct = (slot.student_count as f64 / snapshot.room(&slot.room_id).map(|r| r.capacity).unwrap_or(1).max(1) as f64) * 100.0;
            let fill_indicator = if fill_pct >= 90.0 {
                "o".red()
            } else if fill_pct >= 70.0 {
                "o".yellow()
            } else {
                "o".green()
            };
            lines.push(format!(
                "  {} {} {}-{} | {} | {} | {} students {}",
                fill_indicator,
                slot.day,
                minutes_to_time(slot.start_min),
                minutes_to_time(slot.end_min),
                room,
                faculty,
                slot.student_count,
                format!("({:.0}%)", fill_pct).dimmed()
            ));
        }
    }

    lines.push(String::new());
    lines.push("=".repeat(60));

    lines.join("\n")
}

/// Print a quick summary to stdout.
pub fn print_summary(payload: &OfficialTimetablePayload, validation: &ValidationReport, runtime_ms: u64) {
    println!();
    if validation.is_valid {
        println!("{}", "Timetable generated successfully".green().bold());
    } else {
        println!("{}", "Timetable has validation errors".red().bold());
    }
    println!();
    println!("  Slots:       {}", payload.slots.len());
    println!("  Hard Issues: {}", validation.hard_violations.len());
    println!("  Score:       {:.1}/100", validation.total_score);
    println!("  Time:        {}ms", runtime_ms);
    println!();
}
