use crate::error::SchedulerError;
use crate::parser::validation::validate_input;
use crate::scheduler::grid::build_day_slots;
use crate::types::{
    Course, ElectiveOverlapGroup, Faculty, ProgramCourse, ProgramId, ProgramSection,
    ReservedResourceSlot, Room, SchedulePolicy, SemesterConstraint, SharedLectureGroup, SlotLock,
    Snapshot, WorkingHoursEntry,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Institution-wide settings that aren't keyed by ID: working hours, the
/// period/break grid, and the per-term scheduling envelope. Loaded from
/// `config.toml`; any field left out falls back to its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "crate::types::default_working_hours")]
    pub working_hours: Vec<WorkingHoursEntry>,
    #[serde(default)]
    pub schedule_policy: SchedulePolicy,
    #[serde(default)]
    pub semester_constraint: Option<SemesterConstraint>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            working_hours: crate::types::default_working_hours(),
            schedule_policy: SchedulePolicy::default(),
            semester_constraint: None,
        }
    }
}

/// Reads a full input snapshot from a directory of JSON/TOML files:
/// `courses.json`, `faculty.json`, `rooms.json`, `program_courses.json`, and
/// `sections.json` are required; `slot_locks.json`, `elective_overlap_groups.json`,
/// `shared_lecture_groups.json`, and `config.toml` are optional and default to
/// empty/default when absent.
pub fn load_snapshot_from_dir(dir: &Path, program_id: &ProgramId, term_number: u32) -> crate::Result<Snapshot> {
    let courses: Vec<Course> = load_json_file(&dir.join("courses.json"))?;
    let faculty: Vec<Faculty> = load_json_file(&dir.join("faculty.json"))?;
    let rooms: Vec<Room> = load_json_file(&dir.join("rooms.json"))?;
    let program_courses: Vec<ProgramCourse> = load_json_file(&dir.join("program_courses.json"))?;
    let sections: Vec<ProgramSection> = load_json_file(&dir.join("sections.json"))?;
    let slot_locks: Vec<SlotLock> = load_json_file_or_default(&dir.join("slot_locks.json"));
    let elective_overlap_groups: Vec<ElectiveOverlapGroup> = load_json_file_or_default(&dir.join("elective_overlap_groups.json"));
    let shared_lecture_groups: Vec<SharedLectureGroup> = load_json_file_or_default(&dir.join("shared_lecture_groups.json"));
    let reserved_resource_slots: Vec<ReservedResourceSlot> = load_json_file_or_default(&dir.join("reserved_resource_slots.json"));
    let config = load_config_or_default(&dir.join("config.toml"));

    validate_input(&courses, &faculty, &rooms, &program_courses, &sections)?;

    let day_slots = build_day_slots(&config.working_hours, &config.schedule_policy);

    Ok(Snapshot {
        program_id: program_id.clone(),
        term_number,
        working_hours: config.working_hours,
        schedule_policy: config.schedule_policy,
        day_slots,
        courses: courses.into_iter().map(|c| (c.id.clone(), c)).collect(),
        program_courses,
        sections,
        rooms: rooms.into_iter().map(|r| (r.id.clone(), r)).collect(),
        faculty: faculty.into_iter().map(|f| (f.id.clone(), f)).collect(),
        elective_overlap_groups,
        shared_lecture_groups,
        semester_constraint: config.semester_constraint,
        slot_locks,
        reserved_resource_slots,
    })
}

/// Loads `config.toml` if present, falling back to institution defaults when
/// the file is missing or malformed rather than failing the whole load.
fn load_config_or_default(path: &Path) -> InputConfig {
    if path.exists() {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => InputConfig::default(),
        }
    } else {
        InputConfig::default()
    }
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> crate::Result<T> {
    let path_str = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| SchedulerError::FileRead {
        path: path_str.clone(),
        source: e,
    })?;

    serde_json::from_str(&content)
        .map_err(|e| {
            SchedulerError::JsonParse {
                file: path_str,
                message: e.to_string(),
            }
            .into()
        })
}

fn load_json_file_or_default<T: serde::de::DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => T::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_toml_falls_back_to_institution_defaults() {
        let config = load_config_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.schedule_policy.period_minutes, SchedulePolicy::default().period_minutes);
    }

    #[test]
    fn missing_optional_collection_files_default_to_empty() {
        let locks: Vec<SlotLock> = load_json_file_or_default(Path::new("/nonexistent/slot_locks.json"));
        assert!(locks.is_empty());
    }
}
