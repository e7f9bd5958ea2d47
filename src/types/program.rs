use super::{CourseId, Day, FacultyId, ProgramId, RoomId, SectionName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A course's placement within one program term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramCourse {
    pub program_id: ProgramId,
    pub term_number: u32,
    pub course_id: CourseId,
    pub is_required: bool,
    pub lab_batch_count: usize,
    pub allow_parallel_batches: bool,
    #[serde(default)]
    pub prerequisite_course_ids: Vec<CourseId>,
}

/// One enrolled section of a program term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramSection {
    pub program_id: ProgramId,
    pub term_number: u32,
    pub name: SectionName,
    pub capacity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlapPolicy {
    NoOverlap,
    AllowOverlap,
}

/// A set of elective courses drawn from the same student population; a
/// `NoOverlap` policy forbids any pair of its courses from overlapping in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectiveOverlapGroup {
    pub term_number: u32,
    pub course_ids: BTreeSet<CourseId>,
    pub policy: OverlapPolicy,
}

/// Co-taught non-lab lecture: all listed sections must end up with an
/// identical multiset of `(day, start, end, room, faculty)` signatures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedLectureGroup {
    pub term_number: u32,
    pub course_id: CourseId,
    pub section_names: BTreeSet<SectionName>,
}

/// Per-term scheduling envelope and load limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemesterConstraint {
    pub term_number: u32,
    pub earliest_start_min: u32,
    pub latest_end_min: u32,
    pub max_per_day_min: u32,
    pub max_per_week_min: u32,
    pub min_break_min: u32,
    pub max_consecutive_min: u32,
}

/// An operator-pinned placement that a `BlockRequest` must honor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotLock {
    pub program_id: ProgramId,
    pub term_number: u32,
    pub section: SectionName,
    #[serde(default)]
    pub batch: Option<String>,
    pub course_id: CourseId,
    pub day: Day,
    pub start_min: u32,
    pub end_min: u32,
    #[serde(default)]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub faculty_id: Option<FacultyId>,
    pub active: bool,
}
