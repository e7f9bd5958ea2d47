use super::{CourseId, Day, FacultyId, ProgramId, RoomId, SectionName, SessionType};
use serde::{Deserialize, Serialize};

/// One placed teaching block in a generated or edited timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedSlot {
    pub id: String,
    pub day: Day,
    pub start_min: u32,
    pub end_min: u32,
    pub course_id: CourseId,
    pub room_id: RoomId,
    pub faculty_id: FacultyId,
    pub section: SectionName,
    pub batch: Option<String>,
    pub student_count: u32,
    pub session_type: SessionType,
}

/// The working set plus the full list of placed slots for one (program, term).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficialTimetablePayload {
    pub program_id: ProgramId,
    pub term_number: u32,
    pub slots: Vec<PlacedSlot>,
}

/// One ranked candidate returned by a solver run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedAlternative {
    pub rank: usize,
    pub fitness: f64,
    pub hard_conflicts: u64,
    pub soft_penalty: f64,
    pub payload: OfficialTimetablePayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateTimetableRequest {
    pub program_id: ProgramId,
    pub term_number: u32,
    pub alternative_count: usize,
    pub persist_official: bool,
    #[serde(default)]
    pub settings_override: Option<super::GenerationSettings>,
    #[serde(default)]
    pub already_placed: Vec<super::ReservedResourceSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateTimetableResponse {
    pub alternatives: Vec<GeneratedAlternative>,
    pub settings_used: super::GenerationSettings,
    pub runtime_ms: u64,
    #[serde(default)]
    pub publish_warning: Option<String>,
    pub generated_at: String,
}

/// A per-term request chained into a cycle, reserving prior terms' placements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRequest {
    pub program_id: ProgramId,
    pub term_numbers: Vec<u32>,
    pub alternative_count: usize,
    #[serde(default)]
    pub settings_override: Option<super::GenerationSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleResponse {
    pub per_term: Vec<(u32, GenerateTimetableResponse)>,
    /// Non-dominated `(term_number, hard_conflicts, soft_penalty)` front across the cycle.
    pub pareto_front: Vec<(u32, u64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    RoomOverlap,
    FacultyOverlap,
    SectionOverlap,
    Capacity,
    RoomAvailability,
    FacultyAvailability,
}

/// A single identified conflict in a published payload, as surfaced to an operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub conflict_id: String,
    pub kind: ConflictKind,
    pub slot_ids: Vec<String>,
    pub room_id: Option<RoomId>,
    pub faculty_id: Option<FacultyId>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictDecision {
    Yes,
    No,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictDecisionRequest {
    pub conflict_id: String,
    pub decision: ConflictDecision,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictResolution {
    pub resolved: bool,
    pub message: String,
    #[serde(default)]
    pub new_payload: Option<OfficialTimetablePayload>,
    #[serde(default)]
    pub version_label: Option<String>,
}
