use crate::types::{
    CourseId, Day, Faculty, FacultyId, GenerationSettings, ObjectiveWeights, Room, RoomId,
    SectionName, SemesterConstraint, SlotSegment,
};
use std::cell::RefCell;
use std::collections::HashMap;

use crate::types::BlockRequest;

/// Outcome of scoring one genotype: hard conflicts dominate lexicographically,
/// `fitness` is the tie-break only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationResult {
    pub fitness: f64,
    pub hard_conflicts: u64,
    pub soft_penalty: f64,
}

impl EvaluationResult {
    pub fn lex_key(&self) -> (u64, ordered_float::OrderedF64) {
        (self.hard_conflicts, ordered_float::OrderedF64(self.soft_penalty))
    }
}

/// Thin `f64` wrapper giving us a total order for lexicographic comparisons
/// without pulling in an external crate for a single comparator.
pub mod ordered_float {
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct OrderedF64(pub f64);

    impl PartialOrd for OrderedF64 {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Eq for OrderedF64 {}
    impl Ord for OrderedF64 {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            self.0.partial_cmp(&other.0).unwrap_or(std::cmp::Ordering::Equal)
        }
    }
}

/// A single solver run's owned, mutable context: the immutable snapshot-derived
/// block requests plus the per-run evaluation cache. Never shared across runs.
pub struct SolverContext {
    pub block_requests: Vec<BlockRequest>,
    pub weights: ObjectiveWeights,
    pub settings: GenerationSettings,
    pub day_slots: HashMap<Day, Vec<SlotSegment>>,
    pub semester_constraint: Option<SemesterConstraint>,
    pub faculty: HashMap<FacultyId, Faculty>,
    pub rooms: HashMap<RoomId, Room>,
    /// request_id -> fixed option index, for blocks pinned by an active `SlotLock`.
    pub fixed_genes: HashMap<usize, usize>,
    pub request_indices_by_course: HashMap<CourseId, Vec<usize>>,
    pub request_indices_by_course_section: HashMap<(CourseId, SectionName), Vec<usize>>,
    pub single_faculty_required_by_course: HashMap<CourseId, bool>,
    /// course_id -> section_names sharing one `SharedLectureGroup`.
    pub shared_lecture_sections_by_course: HashMap<CourseId, Vec<std::collections::BTreeSet<SectionName>>>,
    /// unordered pairs of course ids that may not overlap in time.
    pub elective_overlap_pairs: std::collections::HashSet<(CourseId, CourseId)>,
    pub eval_cache: RefCell<HashMap<Vec<usize>, EvaluationResult>>,
}

impl SolverContext {
    pub fn option_count(&self, request_id: usize) -> usize {
        self.block_requests[request_id].options.len()
    }

    pub fn request_count(&self) -> usize {
        self.block_requests.len()
    }

    /// Resolves a `(day, start_index)` placement option into wall-clock minutes.
    pub fn option_bounds(&self, request_id: usize, option_index: usize) -> (Day, u32, u32) {
        let req = &self.block_requests[request_id];
        let opt = &req.options[option_index];
        let slots = &self.day_slots[&opt.day];
        let start_min = slots[opt.start_index].start_min;
        let end_min = slots[opt.start_index + req.block_size - 1].end_min;
        (opt.day, start_min, end_min)
    }

    /// A random starting genotype honoring any fixed genes.
    pub fn random_genotype(&self, rng: &mut impl rand::Rng) -> Vec<usize> {
        self.block_requests
            .iter()
            .map(|req| {
                if let Some(&fixed) = self.fixed_genes.get(&req.request_id) {
                    fixed
                } else {
                    rng.gen_range(0..req.options.len().max(1))
                }
            })
            .collect()
    }
}

pub fn elective_pair_key(a: &CourseId, b: &CourseId) -> (CourseId, CourseId) {
    if a.0 <= b.0 {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}
