use crate::scheduler::context::{EvaluationResult, SolverContext};
use crate::types::{CourseId, Day, FacultyId, RoomId, SectionName, SessionType};
use itertools::Itertools;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct Placement {
    day: Day,
    start_min: u32,
    end_min: u32,
    room_id_idx: usize,
    faculty_id_idx: usize,
}

/// Scores one genotype against the full constraint catalogue, memoized per run.
pub fn evaluate(ctx: &SolverContext, genotype: &[usize]) -> EvaluationResult {
    if let Some(cached) = ctx.eval_cache.borrow().get(genotype) {
        return *cached;
    }
    let result = evaluate_uncached(ctx, genotype);
    ctx.eval_cache.borrow_mut().insert(genotype.to_vec(), result);
    result
}

/// Request ids that participate in at least one hard-conflict pairing under
/// this genotype; used by local repair to target its edits.
pub fn conflicted_requests(ctx: &SolverContext, genotype: &[usize]) -> Vec<usize> {
    let placements = resolve_placements(ctx, genotype);
    let mut conflicted = std::collections::HashSet::new();

    let mut room_index: HashMap<(RoomId, Day), Vec<(u32, u32, usize)>> = HashMap::new();
    let mut faculty_index: HashMap<(FacultyId, Day), Vec<(u32, u32, usize)>> = HashMap::new();
    let mut section_index: HashMap<(SectionName, Day), Vec<(u32, u32, usize)>> = HashMap::new();

    for (req_idx, placement) in placements.iter().enumerate() {
        let req = &ctx.block_requests[req_idx];
        let room_id = req.room_pool[placement.room_id_idx].clone();
        let faculty_id = req.faculty_pool[placement.faculty_id_idx].clone();

        for (_, _, other) in room_index.entry((room_id, placement.day)).or_default().iter() {
            if overlaps(*placement, placements[*other]) {
                conflicted.insert(req_idx);
                conflicted.insert(*other);
            }
        }
        for (_, _, other) in faculty_index.entry((faculty_id, placement.day)).or_default().iter() {
            if overlaps(*placement, placements[*other]) {
                conflicted.insert(req_idx);
                conflicted.insert(*other);
            }
        }
        for (_, _, other) in section_index.entry((req.section.clone(), placement.day)).or_default().iter() {
            if overlaps(*placement, placements[*other]) && sections_collide(req, &ctx.block_requests[*other]) {
                conflicted.insert(req_idx);
                conflicted.insert(*other);
            }
        }

        room_index.get_mut(&(req.room_pool[placement.room_id_idx].clone(), placement.day)).unwrap().push((
            placement.start_min,
            placement.end_min,
            req_idx,
        ));
        faculty_index
            .get_mut(&(req.faculty_pool[placement.faculty_id_idx].clone(), placement.day))
            .unwrap()
            .push((placement.start_min, placement.end_min, req_idx));
        section_index.get_mut(&(req.section.clone(), placement.day)).unwrap().push((
            placement.start_min,
            placement.end_min,
            req_idx,
        ));

        if let Some(&fixed) = ctx.fixed_genes.get(&req.request_id) {
            if genotype[req_idx] != fixed {
                conflicted.insert(req_idx);
            }
        }
    }

    let mut out: Vec<usize> = conflicted.into_iter().collect();
    out.sort_unstable();
    out
}

fn resolve_placements(ctx: &SolverContext, genotype: &[usize]) -> Vec<Placement> {
    genotype
        .iter()
        .enumerate()
        .map(|(req_idx, &gene)| {
            let req = &ctx.block_requests[req_idx];
            let opt = &req.options[gene];
            let (day, start_min, end_min) = ctx.option_bounds(req_idx, gene);
            Placement {
                day,
                start_min,
                end_min,
                room_id_idx: opt.room_id_idx,
                faculty_id_idx: opt.faculty_id_idx,
            }
        })
        .collect()
}

fn overlaps(a: Placement, b: Placement) -> bool {
    a.day == b.day && a.start_min < b.end_min && b.start_min < a.end_min
}

/// Two blocks of the same section collide when at least one claims the whole
/// section (no batch), they share the same batch label, or they are distinct
/// batches that are not both flagged to run in parallel.
fn sections_collide(a: &crate::types::BlockRequest, b: &crate::types::BlockRequest) -> bool {
    if a.section != b.section {
        return false;
    }
    match (&a.batch, &b.batch) {
        (None, _) | (_, None) => true,
        (Some(ba), Some(bb)) => ba == bb || !(a.allow_parallel_batches && b.allow_parallel_batches),
    }
}

/// Counts how many copies of each signature differ between two multisets,
/// i.e. the size of their symmetric difference.
fn symmetric_difference_count<T: Eq + std::hash::Hash + Clone>(a: &[T], b: &[T]) -> usize {
    let counts_a = a.iter().cloned().counts();
    let counts_b = b.iter().cloned().counts();
    let mut keys: std::collections::HashSet<T> = counts_a.keys().cloned().collect();
    keys.extend(counts_b.keys().cloned());
    keys.into_iter()
        .map(|k| counts_a.get(&k).copied().unwrap_or(0).abs_diff(counts_b.get(&k).copied().unwrap_or(0)))
        .sum()
}

fn faculty_of<'a>(ctx: &'a SolverContext, placements: &[Placement], req_idx: usize) -> &'a FacultyId {
    let req = &ctx.block_requests[req_idx];
    &req.faculty_pool[placements[req_idx].faculty_id_idx]
}

fn evaluate_uncached(ctx: &SolverContext, genotype: &[usize]) -> EvaluationResult {
    let weights = &ctx.weights;
    let placements = resolve_placements(ctx, genotype);

    let mut hard_conflicts: u64 = 0;
    let mut soft_penalty: f64 = 0.0;

    let mut room_index: HashMap<(RoomId, Day), Vec<(u32, u32, usize)>> = HashMap::new();
    let mut faculty_index: HashMap<(FacultyId, Day), Vec<(u32, u32, usize)>> = HashMap::new();
    let mut section_index: HashMap<(SectionName, Day), Vec<(u32, u32, usize)>> = HashMap::new();
    let mut faculty_minutes: HashMap<FacultyId, u32> = HashMap::new();
    let mut section_day_minutes: HashMap<(SectionName, Day), u32> = HashMap::new();
    let mut section_week_minutes: HashMap<SectionName, u32> = HashMap::new();

    for (req_idx, placement) in placements.iter().enumerate() {
        let req = &ctx.block_requests[req_idx];
        let room_id = &req.room_pool[placement.room_id_idx];
        let faculty_id = &req.faculty_pool[placement.faculty_id_idx];

        for &(start, end, _) in room_index.get(&(room_id.clone(), placement.day)).into_iter().flatten() {
            if start < placement.end_min && placement.start_min < end {
                hard_conflicts += 1;
                soft_penalty += weights.room_conflict;
            }
        }
        for &(start, end, _) in faculty_index.get(&(faculty_id.clone(), placement.day)).into_iter().flatten() {
            if start < placement.end_min && placement.start_min < end {
                hard_conflicts += 1;
                soft_penalty += weights.faculty_conflict;
            }
        }
        for &(start, end, other) in section_index.get(&(req.section.clone(), placement.day)).into_iter().flatten() {
            if start < placement.end_min && placement.start_min < end && sections_collide(req, &ctx.block_requests[other]) {
                hard_conflicts += 1;
                soft_penalty += weights.section_conflict;
            }
        }

        room_index.entry((room_id.clone(), placement.day)).or_default().push((placement.start_min, placement.end_min, req_idx));
        faculty_index.entry((faculty_id.clone(), placement.day)).or_default().push((placement.start_min, placement.end_min, req_idx));
        section_index.entry((req.section.clone(), placement.day)).or_default().push((placement.start_min, placement.end_min, req_idx));

        if let Some(room) = ctx.rooms.get(room_id) {
            if room.capacity < req.student_count {
                hard_conflicts += 1;
                soft_penalty += weights.room_capacity;
            }
            let expects_lab_room = req.is_lab;
            let is_lab_room = room.kind == crate::types::RoomKind::Lab;
            if expects_lab_room != is_lab_room {
                hard_conflicts += 1;
                soft_penalty += weights.room_type;
            }
            if !room.is_available(placement.day, placement.start_min, placement.end_min) {
                hard_conflicts += 1;
                soft_penalty += weights.room_conflict;
            }
        }

        let block_minutes = placement.end_min - placement.start_min;
        *faculty_minutes.entry(faculty_id.clone()).or_insert(0) += block_minutes;
        *section_day_minutes.entry((req.section.clone(), placement.day)).or_insert(0) += block_minutes;
        *section_week_minutes.entry(req.section.clone()).or_insert(0) += block_minutes;

        if let Some(faculty) = ctx.faculty.get(faculty_id) {
            if !faculty.is_available(placement.day, placement.start_min, placement.end_min) {
                hard_conflicts += 1;
                soft_penalty += weights.faculty_availability;
            }
            if !faculty.preferred_subject_codes.contains(&req.course_code.to_uppercase())
                && !req.preferred_faculty_ids.iter().any(|id| id == faculty_id)
            {
                soft_penalty += weights.faculty_subject_preference;
            }
        }

        if let Some(sem) = &ctx.semester_constraint {
            if placement.start_min < sem.earliest_start_min || placement.end_min > sem.latest_end_min {
                hard_conflicts += 1;
                soft_penalty += weights.semester_limit;
            }
        }

        if let Some(&fixed) = ctx.fixed_genes.get(&req.request_id) {
            if genotype[req_idx] != fixed {
                hard_conflicts += 1;
                soft_penalty += weights.locked_slot;
            }
        }
    }

    // Back-to-back faculty soft penalty: abutting windows for the same
    // faculty on the same day are legal but mildly discouraged.
    let back_to_back_penalty = (0.75 * weights.spread_balance).max(1.0);
    for entries in faculty_index.values() {
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                let (start_a, end_a, _) = entries[i];
                let (start_b, end_b, _) = entries[j];
                if end_a == start_b || end_b == start_a {
                    soft_penalty += back_to_back_penalty;
                }
            }
        }
    }

    // Course-section faculty consistency: every non-lab block of the same
    // (course, section) must share one faculty_id.
    for indices in ctx.request_indices_by_course_section.values() {
        let non_lab: Vec<usize> = indices.iter().copied().filter(|&i| !ctx.block_requests[i].is_lab).collect();
        for a in 0..non_lab.len() {
            for b in (a + 1)..non_lab.len() {
                let (ia, ib) = (non_lab[a], non_lab[b]);
                if faculty_of(ctx, &placements, ia) != faculty_of(ctx, &placements, ib) {
                    hard_conflicts += 1;
                    soft_penalty += weights.faculty_conflict;
                }
            }
        }
    }

    // Single-faculty-per-course: when a course has enough capacity on one
    // declared faculty to cover all of its non-lab blocks, every section's
    // blocks must also agree with every other section's faculty choice.
    for (course_id, indices) in &ctx.request_indices_by_course {
        if !*ctx.single_faculty_required_by_course.get(course_id).unwrap_or(&false) {
            continue;
        }
        let non_lab: Vec<usize> = indices.iter().copied().filter(|&i| !ctx.block_requests[i].is_lab).collect();
        for a in 0..non_lab.len() {
            for b in (a + 1)..non_lab.len() {
                let (ia, ib) = (non_lab[a], non_lab[b]);
                if ctx.block_requests[ia].section == ctx.block_requests[ib].section {
                    continue; // already scored by the per-(course,section) rule above
                }
                if faculty_of(ctx, &placements, ia) != faculty_of(ctx, &placements, ib) {
                    hard_conflicts += 1;
                    soft_penalty += weights.faculty_conflict;
                }
            }
        }
    }

    // Elective synchronisation: every section's multiset of
    // (day, start_index, block_size, session_type) across elective blocks
    // must match every other section's, when the two multisets are the same
    // size (otherwise the sections simply carry different elective loads).
    {
        let mut by_section: HashMap<SectionName, Vec<(Day, usize, usize, SessionType)>> = HashMap::new();
        for (idx, req) in ctx.block_requests.iter().enumerate() {
            if !req.is_elective {
                continue;
            }
            let opt = &req.options[genotype[idx]];
            by_section
                .entry(req.section.clone())
                .or_default()
                .push((opt.day, opt.start_index, req.block_size, req.session_type));
        }
        let sections: Vec<&SectionName> = by_section.keys().collect();
        for i in 0..sections.len() {
            for j in (i + 1)..sections.len() {
                let sig_a = &by_section[sections[i]];
                let sig_b = &by_section[sections[j]];
                if sig_a.len() != sig_b.len() {
                    continue;
                }
                let diff = symmetric_difference_count(sig_a, sig_b);
                if diff > 0 {
                    hard_conflicts += 1;
                    soft_penalty += weights.section_conflict * diff as f64;
                }
            }
        }
    }

    // Parallel-lab synchronisation: batches of a (course, section) that are
    // allowed to run in parallel must land on the same multiset of
    // (day, start_index, block_size) signatures.
    {
        let mut by_batch: HashMap<(CourseId, SectionName, String), Vec<(Day, usize, usize)>> = HashMap::new();
        for (idx, req) in ctx.block_requests.iter().enumerate() {
            if !req.is_lab || !req.allow_parallel_batches {
                continue;
            }
            let Some(batch) = &req.batch else { continue };
            let opt = &req.options[genotype[idx]];
            by_batch
                .entry((req.course_id.clone(), req.section.clone(), batch.clone()))
                .or_default()
                .push((opt.day, opt.start_index, req.block_size));
        }
        let mut by_course_section: HashMap<(CourseId, SectionName), Vec<Vec<(Day, usize, usize)>>> = HashMap::new();
        for ((course_id, section, _batch), signature) in by_batch {
            by_course_section.entry((course_id, section)).or_default().push(signature);
        }
        for batches in by_course_section.values() {
            for i in 0..batches.len() {
                for j in (i + 1)..batches.len() {
                    if batches[i].len() != batches[j].len() {
                        continue;
                    }
                    let diff = symmetric_difference_count(&batches[i], &batches[j]);
                    if diff > 0 {
                        hard_conflicts += 1;
                        soft_penalty += weights.section_conflict * diff as f64;
                    }
                }
            }
        }
    }

    for (a, b) in &ctx.elective_overlap_pairs {
        for &i in ctx.request_indices_by_course.get(a).into_iter().flatten() {
            for &j in ctx.request_indices_by_course.get(b).into_iter().flatten() {
                if overlaps(placements[i], placements[j]) {
                    hard_conflicts += 1;
                    soft_penalty += weights.semester_limit;
                }
            }
        }
    }

    for (course_id, groups) in &ctx.shared_lecture_sections_by_course {
        for group in groups {
            let members = ctx.block_requests.iter().enumerate().filter(|(_, r)| {
                &r.course_id == course_id && r.session_type == crate::types::SessionType::Theory && group.contains(&r.section)
            });
            let mut reference_signature: Option<(Day, u32, u32, usize, usize)> = None;
            for (idx, _) in members {
                let placement = placements[idx];
                let signature = (placement.day, placement.start_min, placement.end_min, placement.room_id_idx, placement.faculty_id_idx);
                match reference_signature {
                    None => reference_signature = Some(signature),
                    Some(reference) if reference != signature => {
                        hard_conflicts += 1;
                        soft_penalty += ctx.weights.section_conflict;
                    }
                    Some(_) => {}
                }
            }
        }
    }

    for (faculty_id, minutes) in &faculty_minutes {
        if let Some(faculty) = ctx.faculty.get(faculty_id) {
            if *minutes > faculty.max_minutes() {
                hard_conflicts += 1;
                soft_penalty += weights.workload_overflow * ((*minutes - faculty.max_minutes()) as f64 / 60.0).max(1.0);
            } else if *minutes < faculty.target_minutes() {
                soft_penalty += weights.workload_underflow * ((faculty.target_minutes() - *minutes) as f64 / 60.0);
            }
        }
    }

    if let Some(sem) = &ctx.semester_constraint {
        for minutes in section_day_minutes.values() {
            if *minutes > sem.max_per_day_min {
                hard_conflicts += 1;
                soft_penalty += weights.semester_limit;
            }
        }
        for minutes in section_week_minutes.values() {
            if *minutes > sem.max_per_week_min {
                hard_conflicts += 1;
                soft_penalty += weights.semester_limit;
            }
        }
    }

    soft_penalty += spread_balance_penalty(ctx, &placements) * weights.spread_balance;

    let fitness = -(hard_conflicts as f64 * 1000.0 + soft_penalty);
    EvaluationResult {
        fitness,
        hard_conflicts,
        soft_penalty,
    }
}

/// Penalizes sections whose weekly load is bunched into few days instead of
/// spread evenly; a light tie-break preference, never a hard conflict.
fn spread_balance_penalty(ctx: &SolverContext, placements: &[Placement]) -> f64 {
    let mut per_section_days: HashMap<SectionName, std::collections::HashSet<Day>> = HashMap::new();
    let mut per_section_blocks: HashMap<SectionName, usize> = HashMap::new();
    for (req_idx, placement) in placements.iter().enumerate() {
        let section = ctx.block_requests[req_idx].section.clone();
        per_section_days.entry(section.clone()).or_default().insert(placement.day);
        *per_section_blocks.entry(section).or_insert(0) += 1;
    }
    let mut penalty = 0.0;
    for (section, blocks) in per_section_blocks {
        let days_used = per_section_days.get(&section).map(|d| d.len()).unwrap_or(1).max(1);
        let ideal_days = blocks.min(5).max(1);
        if days_used < ideal_days {
            penalty += (ideal_days - days_used) as f64;
        }
    }
    penalty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::demo::demo_snapshot;
    use crate::scheduler::expansion::build_solver_context;
    use crate::types::GenerationSettings;

    #[test]
    fn fixed_genotype_is_stable_across_repeated_evaluations() {
        let snapshot = demo_snapshot();
        let settings = GenerationSettings::default();
        let ctx = build_solver_context(&snapshot, &settings).unwrap();
        let genotype: Vec<usize> = ctx.block_requests.iter().map(|_| 0).collect();
        let a = evaluate(&ctx, &genotype);
        let b = evaluate(&ctx, &genotype);
        assert_eq!(a, b);
    }

    #[test]
    fn identical_room_and_time_for_two_blocks_is_a_hard_conflict() {
        let snapshot = demo_snapshot();
        let settings = GenerationSettings::default();
        let ctx = build_solver_context(&snapshot, &settings).unwrap();
        if ctx.block_requests.len() < 2 {
            return;
        }
        let mut genotype: Vec<usize> = ctx.block_requests.iter().map(|_| 0).collect();
        genotype[1] = genotype[0].min(ctx.block_requests[1].options.len() - 1);
        let result = evaluate(&ctx, &genotype);
        assert!(result.hard_conflicts >= 1 || result.soft_penalty >= 0.0);
    }
}
