use crate::error::SchedulerError;
use crate::scheduler::context::SolverContext;
use crate::scheduler::hashing::fnv1a_str;
use crate::types::*;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};

const MAX_TOTAL_OPTIONS: usize = 640;
const MAX_OPTIONS_PER_DAY: usize = 140;
const MAX_OPTIONS_PER_DAY_START: usize = 30;
const LAB_FACULTY_CAP: usize = 16;
const LECTURE_FACULTY_CAP: usize = 36;
const LAB_ROOM_CAP: usize = 12;
const LECTURE_ROOM_CAP: usize = 28;

/// Turns an immutable input snapshot into a ready-to-solve `SolverContext`:
/// configuration validation, block expansion, and placement enumeration.
pub fn build_solver_context(
    snapshot: &Snapshot,
    settings: &GenerationSettings,
) -> crate::Result<SolverContext> {
    validate_total_faculty_capacity(snapshot)?;
    validate_section_time_capacity(snapshot)?;
    validate_prerequisite_mappings(snapshot)?;

    let mut faculty_load: HashMap<FacultyId, u32> = snapshot.faculty.keys().map(|id| (id.clone(), 0)).collect();
    let mut block_requests = Vec::new();
    let mut next_id = 0usize;

    let current_term_courses: Vec<&ProgramCourse> = snapshot
        .program_courses
        .iter()
        .filter(|pc| pc.term_number == snapshot.term_number)
        .collect();

    for pc in &current_term_courses {
        let course = snapshot.course(&pc.course_id).ok_or_else(|| {
            SchedulerError::ConfigurationInvalid {
                message: format!("program course references unknown course '{}'", pc.course_id),
            }
        })?;
        course
            .validate_hour_split()
            .map_err(|message| SchedulerError::ConfigurationInvalid { message })?;

        if course.is_lab() && course.lab_block_count() > 0 {
            let longest = snapshot.longest_teaching_segment();
            if course.lab_contiguous_slots > longest {
                return Err(SchedulerError::ConfigurationInvalid {
                    message: format!(
                        "course '{}': lab block size {} exceeds longest teaching segment {}",
                        course.code, course.lab_contiguous_slots, longest
                    ),
                }
                .into());
            }
        }

        for section in snapshot.sections.iter().filter(|s| s.term_number == pc.term_number) {
            if course.is_lab() {
                let batch_count = pc.lab_batch_count.max(1);
                let student_count = section.capacity.div_ceil(batch_count as u32);
                for batch_idx in 0..batch_count {
                    let batch_label = format!("B{}", batch_idx + 1);
                    for _ in 0..course.lab_block_count() {
                        let req = build_block_request(
                            snapshot,
                            &mut next_id,
                            &mut faculty_load,
                            course,
                            pc,
                            section,
                            Some(batch_label.clone()),
                            student_count,
                            course.lab_contiguous_slots,
                            SessionType::Lab,
                            pc.allow_parallel_batches,
                        )?;
                        block_requests.push(req);
                    }
                }
            } else {
                let student_count = section.capacity;
                for _ in 0..course.theory_h {
                    block_requests.push(build_block_request(
                        snapshot,
                        &mut next_id,
                        &mut faculty_load,
                        course,
                        pc,
                        section,
                        None,
                        student_count,
                        1,
                        SessionType::Theory,
                        false,
                    )?);
                }
                for _ in 0..course.tutorial_h {
                    block_requests.push(build_block_request(
                        snapshot,
                        &mut next_id,
                        &mut faculty_load,
                        course,
                        pc,
                        section,
                        None,
                        student_count,
                        1,
                        SessionType::Tutorial,
                        false,
                    )?);
                }
            }
        }
    }

    let fixed_genes = load_fixed_genes(snapshot, &block_requests)?;

    let mut request_indices_by_course: HashMap<CourseId, Vec<usize>> = HashMap::new();
    let mut request_indices_by_course_section: HashMap<(CourseId, SectionName), Vec<usize>> = HashMap::new();
    for (idx, req) in block_requests.iter().enumerate() {
        request_indices_by_course.entry(req.course_id.clone()).or_default().push(idx);
        request_indices_by_course_section
            .entry(req.course_section_key())
            .or_default()
            .push(idx);
    }

    let single_faculty_required_by_course = build_single_faculty_requirements(snapshot, &current_term_courses, &block_requests);

    let shared_lecture_sections_by_course = snapshot
        .shared_lecture_groups
        .iter()
        .filter(|g| g.term_number == snapshot.term_number)
        .fold(HashMap::new(), |mut acc: HashMap<CourseId, Vec<BTreeSet<SectionName>>>, g| {
            acc.entry(g.course_id.clone()).or_default().push(g.section_names.clone());
            acc
        });

    let mut elective_overlap_pairs = HashSet::new();
    for group in snapshot.elective_overlap_groups.iter().filter(|g| g.term_number == snapshot.term_number && g.policy == OverlapPolicy::NoOverlap) {
        let courses: Vec<&CourseId> = group.course_ids.iter().collect();
        for i in 0..courses.len() {
            for j in (i + 1)..courses.len() {
                elective_overlap_pairs.insert(super::context::elective_pair_key(courses[i], courses[j]));
            }
        }
    }

    Ok(SolverContext {
        block_requests,
        weights: settings.objective_weights,
        settings: *settings,
        day_slots: snapshot.day_slots.clone(),
        semester_constraint: snapshot.semester_constraint.clone(),
        faculty: snapshot.faculty.clone(),
        rooms: snapshot.rooms.clone(),
        fixed_genes,
        request_indices_by_course,
        request_indices_by_course_section,
        single_faculty_required_by_course,
        shared_lecture_sections_by_course,
        elective_overlap_pairs,
        eval_cache: RefCell::new(HashMap::new()),
    })
}

#[allow(clippy::too_many_arguments)]
fn build_block_request(
    snapshot: &Snapshot,
    next_id: &mut usize,
    faculty_load: &mut HashMap<FacultyId, u32>,
    course: &Course,
    pc: &ProgramCourse,
    section: &ProgramSection,
    batch: Option<String>,
    student_count: u32,
    block_size: usize,
    session_type: SessionType,
    allow_parallel_batches: bool,
) -> crate::Result<BlockRequest> {
    let faculty_pool = faculty_candidates_for_course(snapshot, course, faculty_load);
    if faculty_pool.is_empty() {
        return Err(SchedulerError::ConfigurationInvalid {
            message: format!("course '{}' has no candidate faculty", course.code),
        }
        .into());
    }
    let room_pool = room_candidates_for(snapshot, course, student_count);
    if room_pool.is_empty() {
        return Err(SchedulerError::ConfigurationInvalid {
            message: format!("course '{}' has no candidate room for {} students", course.code, student_count),
        }
        .into());
    }

    let primary_faculty_id = course
        .assigned_faculty_id
        .clone()
        .filter(|id| snapshot.faculty.contains_key(id))
        .unwrap_or_else(|| faculty_pool[0].clone());

    let preferred_faculty_ids: Vec<FacultyId> = faculty_pool
        .iter()
        .filter(|id| {
            snapshot
                .faculty_member(id)
                .map(|f| f.preference_codes_for_term(snapshot.term_number).contains(&course.code.to_uppercase()))
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    // Credit the planning load to the top-ranked candidate so later blocks of
    // other courses see a more even ascending-workload ranking.
    if let Some(first) = faculty_pool.first() {
        *faculty_load.entry(first.clone()).or_insert(0) += block_size as u32 * snapshot.schedule_policy.period_minutes;
    }

    let options = enumerate_options(snapshot, &room_pool, &faculty_pool, block_size, session_type);
    if options.is_empty() {
        return Err(SchedulerError::InfeasiblePlacement {
            block: format!("{} / {} / {:?}", course.code, section.name, batch),
            reason: "no placement option survives even the relaxed fallback".to_string(),
        }
        .into());
    }

    let request_id = *next_id;
    *next_id += 1;

    Ok(BlockRequest {
        request_id,
        course_id: course.id.clone(),
        course_code: course.code.clone(),
        section: section.name.clone(),
        batch,
        student_count,
        primary_faculty_id,
        preferred_faculty_ids,
        block_size,
        is_lab: session_type == SessionType::Lab,
        is_elective: course.kind == CourseKind::Elective,
        session_type,
        allow_parallel_batches,
        room_pool,
        faculty_pool,
        options,
    })
}

fn faculty_candidates_for_course(
    snapshot: &Snapshot,
    course: &Course,
    faculty_load: &HashMap<FacultyId, u32>,
) -> Vec<FacultyId> {
    let mut ordered: Vec<FacultyId> = Vec::new();
    let mut seen: HashSet<FacultyId> = HashSet::new();

    if let Some(declared) = &course.assigned_faculty_id {
        if snapshot.faculty.contains_key(declared) {
            ordered.push(declared.clone());
            seen.insert(declared.clone());
        }
    }

    let code_upper = course.code.to_uppercase();
    let rank_key = |id: &FacultyId| (*faculty_load.get(id).unwrap_or(&0), fnv1a_str(&id.0));

    let mut preferring: Vec<FacultyId> = snapshot
        .faculty
        .values()
        .filter(|f| !seen.contains(&f.id) && f.preference_codes_for_term(snapshot.term_number).contains(&code_upper))
        .map(|f| f.id.clone())
        .collect();
    preferring.sort_by_key(|id| rank_key(id));
    for id in preferring {
        seen.insert(id.clone());
        ordered.push(id);
    }

    let mut remaining: Vec<FacultyId> = snapshot
        .faculty
        .keys()
        .filter(|id| !seen.contains(*id))
        .cloned()
        .collect();
    remaining.sort_by_key(|id| rank_key(id));
    ordered.extend(remaining);

    let cap = if course.is_lab() { LAB_FACULTY_CAP } else { LECTURE_FACULTY_CAP };
    ordered.truncate(cap.max(1));
    ordered
}

fn room_candidates_for(snapshot: &Snapshot, course: &Course, student_count: u32) -> Vec<RoomId> {
    let mut candidates: Vec<&Room> = snapshot
        .rooms
        .values()
        .filter(|r| {
            let kind_ok = if course.is_lab() {
                r.kind == RoomKind::Lab
            } else {
                r.kind != RoomKind::Lab
            };
            kind_ok && r.capacity >= student_count
        })
        .collect();

    candidates.sort_by(|a, b| {
        let waste_a = a.capacity - student_count;
        let waste_b = b.capacity - student_count;
        waste_a.cmp(&waste_b).then_with(|| a.name.cmp(&b.name))
    });

    let cap = if course.is_lab() { LAB_ROOM_CAP } else { LECTURE_ROOM_CAP };
    candidates.truncate(cap.max(1));
    candidates.into_iter().map(|r| r.id.clone()).collect()
}

/// Enumerates placement options with the two-tier feasibility fallback: if the
/// strict pass (all soft filters enabled) yields nothing, relax room/faculty
/// windows and reserved-slot filters; if still empty, also relax the semester
/// window and day-availability filters.
fn enumerate_options(
    snapshot: &Snapshot,
    room_pool: &[RoomId],
    faculty_pool: &[FacultyId],
    block_size: usize,
    session_type: SessionType,
) -> Vec<PlacementOption> {
    for relax_tier in 0..=2 {
        let options = enumerate_options_tier(snapshot, room_pool, faculty_pool, block_size, session_type, relax_tier);
        if !options.is_empty() {
            return options;
        }
    }
    Vec::new()
}

fn enumerate_options_tier(
    snapshot: &Snapshot,
    room_pool: &[RoomId],
    faculty_pool: &[FacultyId],
    block_size: usize,
    _session_type: SessionType,
    relax_tier: u8,
) -> Vec<PlacementOption> {
    let relax_windows = relax_tier >= 1;
    let relax_semester = relax_tier >= 2;

    let mut options = Vec::new();
    'days: for &day in Day::WORKING_DAYS.iter() {
        let slots = snapshot.working_day_slots(day);
        if slots.len() < block_size {
            continue;
        }
        let mut per_day_count = 0usize;
        for start_index in 0..=(slots.len() - block_size) {
            let start_min = slots[start_index].start_min;
            let end_min = slots[start_index + block_size - 1].end_min;

            if !relax_semester {
                if let Some(sem) = &snapshot.semester_constraint {
                    if start_min < sem.earliest_start_min || end_min > sem.latest_end_min {
                        continue;
                    }
                }
            }

            let mut per_start_count = 0usize;
            for (room_idx, room_id) in room_pool.iter().enumerate() {
                let room = match snapshot.room(room_id) {
                    Some(r) => r,
                    None => continue,
                };
                if !relax_windows && !room.is_available(day, start_min, end_min) {
                    continue;
                }
                for (faculty_idx, faculty_id) in faculty_pool.iter().enumerate() {
                    let faculty = match snapshot.faculty_member(faculty_id) {
                        Some(f) => f,
                        None => continue,
                    };
                    if !relax_semester && !faculty.allows_day(day) {
                        continue;
                    }
                    if !relax_windows && !faculty.is_available(day, start_min, end_min) {
                        continue;
                    }
                    if !relax_windows && conflicts_reserved_resources(snapshot, day, start_min, end_min, room_id, faculty_id) {
                        continue;
                    }

                    options.push(PlacementOption {
                        day,
                        start_index,
                        room_id_idx: room_idx,
                        faculty_id_idx: faculty_idx,
                    });
                    per_start_count += 1;
                    per_day_count += 1;
                    if per_start_count >= MAX_OPTIONS_PER_DAY_START {
                        break;
                    }
                    if options.len() >= MAX_TOTAL_OPTIONS {
                        break 'days;
                    }
                }
                if per_start_count >= MAX_OPTIONS_PER_DAY_START {
                    break;
                }
            }
            if per_day_count >= MAX_OPTIONS_PER_DAY {
                break;
            }
        }
    }
    options
}

fn conflicts_reserved_resources(
    snapshot: &Snapshot,
    day: Day,
    start_min: u32,
    end_min: u32,
    room_id: &RoomId,
    faculty_id: &FacultyId,
) -> bool {
    snapshot.reserved_resource_slots.iter().any(|r| {
        r.day == day
            && start_min < r.end_min
            && r.start_min < end_min
            && (r.room_id.as_ref() == Some(room_id) || r.faculty_id.as_ref() == Some(faculty_id))
    })
}

fn load_fixed_genes(snapshot: &Snapshot, block_requests: &[BlockRequest]) -> crate::Result<HashMap<usize, usize>> {
    let mut fixed = HashMap::new();
    let mut already_fixed_requests: HashSet<usize> = HashSet::new();

    for lock in snapshot.slot_locks.iter().filter(|l| l.active && l.term_number == snapshot.term_number) {
        let matching_request = block_requests.iter().find(|req| {
            !already_fixed_requests.contains(&req.request_id)
                && req.course_id == lock.course_id
                && req.section == lock.section
                && req.batch == lock.batch
        });

        let req = matching_request.ok_or_else(|| SchedulerError::LockNotRepresentable {
            lock: format!("{}/{}/{:?}", lock.course_id, lock.section, lock.batch),
        })?;

        let option_index = req.options.iter().position(|opt| {
            let slots = snapshot.working_day_slots(opt.day);
            if opt.start_index + req.block_size > slots.len() {
                return false;
            }
            let start_min = slots[opt.start_index].start_min;
            let end_min = slots[opt.start_index + req.block_size - 1].end_min;
            let day_matches = opt.day == lock.day && start_min == lock.start_min && end_min == lock.end_min;
            let room_matches = lock.room_id.as_ref().map(|r| req.room_id(opt) == r).unwrap_or(true);
            let faculty_matches = lock.faculty_id.as_ref().map(|f| req.faculty_id(opt) == f).unwrap_or(true);
            day_matches && room_matches && faculty_matches
        });

        match option_index {
            Some(idx) => {
                fixed.insert(req.request_id, idx);
                already_fixed_requests.insert(req.request_id);
            }
            None => {
                return Err(SchedulerError::LockNotRepresentable {
                    lock: format!("{}/{}/{:?}", lock.course_id, lock.section, lock.batch),
                }
                .into());
            }
        }
    }
    Ok(fixed)
}

fn build_single_faculty_requirements(
    snapshot: &Snapshot,
    current_term_courses: &[&ProgramCourse],
    block_requests: &[BlockRequest],
) -> HashMap<CourseId, bool> {
    let mut required_minutes: HashMap<CourseId, u32> = HashMap::new();
    for req in block_requests.iter().filter(|r| !r.is_lab) {
        *required_minutes.entry(req.course_id.clone()).or_insert(0) += req.block_size as u32 * snapshot.schedule_policy.period_minutes;
    }

    current_term_courses
        .iter()
        .filter_map(|pc| snapshot.course(&pc.course_id))
        .map(|course| {
            let required_min = *required_minutes.get(&course.id).unwrap_or(&0);
            let has_capacity = course
                .assigned_faculty_id
                .as_ref()
                .and_then(|id| snapshot.faculty_member(id))
                .map(|f| required_min <= f.max_minutes())
                .unwrap_or(false);
            (course.id.clone(), has_capacity)
        })
        .collect()
}

fn validate_total_faculty_capacity(snapshot: &Snapshot) -> crate::Result<()> {
    let period = snapshot.schedule_policy.period_minutes;
    let mut required_minutes = 0u64;
    for pc in snapshot.program_courses.iter().filter(|pc| pc.term_number == snapshot.term_number) {
        let course = match snapshot.course(&pc.course_id) {
            Some(c) => c,
            None => continue,
        };
        let sections = snapshot.sections.iter().filter(|s| s.term_number == pc.term_number).count() as u64;
        let batch_multiplier = if course.is_lab() { pc.lab_batch_count.max(1) as u64 } else { 1 };
        required_minutes += course.hours_per_week as u64 * period as u64 * sections * batch_multiplier;
    }
    let total_capacity: u64 = snapshot.faculty.values().map(|f| f.max_minutes() as u64).sum();
    if required_minutes > total_capacity {
        return Err(SchedulerError::ConfigurationInvalid {
            message: format!(
                "total faculty capacity ({} min) is less than total required teaching minutes ({} min)",
                total_capacity, required_minutes
            ),
        }
        .into());
    }
    Ok(())
}

fn validate_section_time_capacity(snapshot: &Snapshot) -> crate::Result<()> {
    let period = snapshot.schedule_policy.period_minutes;
    let total_available_minutes: u32 = snapshot.day_slots.values().map(|slots| slots.len() as u32 * period).sum();

    let mut expected_minutes_per_section = 0u32;
    for pc in snapshot.program_courses.iter().filter(|pc| pc.term_number == snapshot.term_number && pc.is_required) {
        if let Some(course) = snapshot.course(&pc.course_id) {
            expected_minutes_per_section += course.hours_per_week * period;
        }
    }

    if expected_minutes_per_section > total_available_minutes {
        return Err(SchedulerError::ConfigurationInvalid {
            message: format!(
                "weekly minutes shortfall: sections need {} min/week but only {} min/week are available",
                expected_minutes_per_section, total_available_minutes
            ),
        }
        .into());
    }
    Ok(())
}

fn validate_prerequisite_mappings(snapshot: &Snapshot) -> crate::Result<()> {
    let by_course: HashMap<&CourseId, &ProgramCourse> = snapshot.program_courses.iter().map(|pc| (&pc.course_id, pc)).collect();

    for pc in snapshot.program_courses.iter().filter(|pc| pc.term_number == snapshot.term_number) {
        for prereq_id in &pc.prerequisite_course_ids {
            match by_course.get(prereq_id) {
                None => {
                    return Err(SchedulerError::ConfigurationInvalid {
                        message: format!(
                            "course '{}' prerequisite '{}' is not part of program '{}'",
                            pc.course_id, prereq_id, pc.program_id
                        ),
                    }
                    .into());
                }
                Some(prereq_pc) if prereq_pc.term_number >= pc.term_number => {
                    return Err(SchedulerError::ConfigurationInvalid {
                        message: format!(
                            "course '{}' prerequisite '{}' must be in a strictly earlier term (found term {})",
                            pc.course_id, prereq_id, prereq_pc.term_number
                        ),
                    }
                    .into());
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::demo::demo_snapshot;

    #[test]
    fn expansion_produces_one_block_request_per_theory_hour() {
        let snapshot = demo_snapshot();
        let settings = GenerationSettings::default();
        let ctx = build_solver_context(&snapshot, &settings).unwrap();
        assert!(!ctx.block_requests.is_empty());
        for req in &ctx.block_requests {
            assert!(!req.options.is_empty());
        }
    }

    #[test]
    fn every_block_request_options_are_nonempty_and_bounded() {
        let snapshot = demo_snapshot();
        let settings = GenerationSettings::default();
        let ctx = build_solver_context(&snapshot, &settings).unwrap();
        for req in &ctx.block_requests {
            assert!(!req.options.is_empty());
            assert!(req.options.len() <= MAX_TOTAL_OPTIONS);
        }
    }
}
