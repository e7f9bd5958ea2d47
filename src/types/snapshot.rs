use super::{
    Course, CourseId, Day, ElectiveOverlapGroup, Faculty, FacultyId, ProgramCourse, ProgramId,
    ProgramSection, Room, RoomId, SchedulePolicy, SectionName, SemesterConstraint,
    SharedLectureGroup, SlotLock, SlotSegment, WorkingHoursEntry,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An already-committed `(day, time, room?, faculty?)` tuple from a sibling term
/// within a cycle generation; reserves resources for the current run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservedResourceSlot {
    pub day: Day,
    pub start_min: u32,
    pub end_min: u32,
    pub room_id: Option<RoomId>,
    pub faculty_id: Option<FacultyId>,
}

/// Immutable input bundle for a single (program, term) solver run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub program_id: ProgramId,
    pub term_number: u32,
    pub working_hours: Vec<WorkingHoursEntry>,
    pub schedule_policy: SchedulePolicy,
    pub day_slots: HashMap<Day, Vec<SlotSegment>>,
    pub courses: HashMap<CourseId, Course>,
    pub program_courses: Vec<ProgramCourse>,
    pub sections: Vec<ProgramSection>,
    pub rooms: HashMap<RoomId, Room>,
    pub faculty: HashMap<FacultyId, Faculty>,
    pub elective_overlap_groups: Vec<ElectiveOverlapGroup>,
    pub shared_lecture_groups: Vec<SharedLectureGroup>,
    pub semester_constraint: Option<SemesterConstraint>,
    pub slot_locks: Vec<SlotLock>,
    pub reserved_resource_slots: Vec<ReservedResourceSlot>,
}

impl Snapshot {
    pub fn working_day_slots(&self, day: Day) -> &[SlotSegment] {
        self.day_slots.get(&day).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn longest_teaching_segment(&self) -> usize {
        self.day_slots.values().map(|slots| slots.len()).max().unwrap_or(0)
    }

    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.courses.get(id)
    }

    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn faculty_member(&self, id: &FacultyId) -> Option<&Faculty> {
        self.faculty.get(id)
    }
}
