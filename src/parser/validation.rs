use crate::types::{Course, Faculty, ProgramCourse, ProgramSection, Room};
use std::collections::HashSet;

/// Validation result with collected errors and warnings, mirroring the
/// pre-expansion input checks run before a `Snapshot` is handed to the solver.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

/// Validates the raw, just-parsed input collections before they are folded
/// into a `Snapshot`. Duplicate IDs are caught here because building the
/// snapshot's `HashMap`s would otherwise silently keep the last entry.
pub fn validate_input(
    courses: &[Course],
    faculty: &[Faculty],
    rooms: &[Room],
    program_courses: &[ProgramCourse],
    sections: &[ProgramSection],
) -> crate::Result<ValidationResult> {
    let mut result = ValidationResult::default();

    check_duplicate_course_ids(courses, &mut result);
    check_duplicate_faculty_ids(faculty, &mut result);
    check_duplicate_room_ids(rooms, &mut result);

    let course_ids: HashSet<&str> = courses.iter().map(|c| c.id.0.as_str()).collect();
    let faculty_ids: HashSet<&str> = faculty.iter().map(|f| f.id.0.as_str()).collect();

    for pc in program_courses {
        if !course_ids.contains(pc.course_id.0.as_str()) {
            result.add_error(format!(
                "program course in term {} references unknown course '{}'",
                pc.term_number, pc.course_id
            ));
        }
        for prereq in &pc.prerequisite_course_ids {
            if !course_ids.contains(prereq.0.as_str()) {
                result.add_error(format!("course '{}' prerequisite '{}' is not a known course", pc.course_id, prereq));
            }
        }
    }

    for course in courses {
        if let Err(message) = course.validate_hour_split() {
            result.add_error(message);
        }
        if let Some(assigned) = &course.assigned_faculty_id {
            if !faculty_ids.contains(assigned.0.as_str()) {
                result.add_warning(format!("course '{}' assigned_faculty_id '{}' is not a known faculty member", course.code, assigned));
            }
        }
    }

    let max_room_capacity = rooms.iter().map(|r| r.capacity).max().unwrap_or(0);
    for section in sections {
        if section.capacity > max_room_capacity {
            result.add_warning(format!(
                "section '{}' capacity ({}) exceeds the largest room capacity ({})",
                section.name, section.capacity, max_room_capacity
            ));
        }
    }

    if !result.is_valid() {
        return Err(anyhow::anyhow!(
            "input validation failed with {} error(s):\n{}",
            result.errors.len(),
            result.errors.join("\n")
        ));
    }

    Ok(result)
}

fn check_duplicate_course_ids(courses: &[Course], result: &mut ValidationResult) {
    let mut seen = HashSet::new();
    for course in courses {
        if !seen.insert(&course.id) {
            result.add_error(format!("duplicate course ID: '{}'", course.id));
        }
    }
}

fn check_duplicate_faculty_ids(faculty: &[Faculty], result: &mut ValidationResult) {
    let mut seen = HashSet::new();
    for f in faculty {
        if !seen.insert(&f.id) {
            result.add_error(format!("duplicate faculty ID: '{}'", f.id));
        }
    }
}

fn check_duplicate_room_ids(rooms: &[Room], result: &mut ValidationResult) {
    let mut seen = HashSet::new();
    for room in rooms {
        if !seen.insert(&room.id) {
            result.add_error(format!("duplicate room ID: '{}'", room.id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::demo::demo_snapshot;

    #[test]
    fn the_demo_snapshot_passes_input_validation() {
        let snapshot = demo_snapshot();
        let courses: Vec<Course> = snapshot.courses.values().cloned().collect();
        let faculty: Vec<Faculty> = snapshot.faculty.values().cloned().collect();
        let rooms: Vec<Room> = snapshot.rooms.values().cloned().collect();
        let result = validate_input(&courses, &faculty, &rooms, &snapshot.program_courses, &snapshot.sections).unwrap();
        assert!(result.is_valid());
    }
}
