use super::{CourseId, Day, FacultyId, RoomId, SectionName};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    Theory,
    Tutorial,
    Lab,
}

/// A candidate `(day, start_index, room, faculty)` tuple for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementOption {
    pub day: Day,
    pub start_index: usize,
    pub room_id_idx: usize,
    pub faculty_id_idx: usize,
}

/// One atomic unit of contiguous teaching that must be placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRequest {
    pub request_id: usize,
    pub course_id: CourseId,
    pub course_code: String,
    pub section: SectionName,
    pub batch: Option<String>,
    pub student_count: u32,
    pub primary_faculty_id: FacultyId,
    pub preferred_faculty_ids: Vec<FacultyId>,
    pub block_size: usize,
    pub is_lab: bool,
    pub is_elective: bool,
    pub session_type: SessionType,
    pub allow_parallel_batches: bool,
    pub room_pool: Vec<RoomId>,
    pub faculty_pool: Vec<FacultyId>,
    pub options: Vec<PlacementOption>,
}

impl BlockRequest {
    pub fn room_id(&self, option: &PlacementOption) -> &RoomId {
        &self.room_pool[option.room_id_idx]
    }

    pub fn faculty_id(&self, option: &PlacementOption) -> &FacultyId {
        &self.faculty_pool[option.faculty_id_idx]
    }

    pub fn course_section_key(&self) -> (CourseId, SectionName) {
        (self.course_id.clone(), self.section.clone())
    }
}
