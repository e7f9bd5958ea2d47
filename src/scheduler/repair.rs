use crate::scheduler::context::SolverContext;
use crate::scheduler::evaluator::{conflicted_requests, evaluate};
use crate::scheduler::hashing::fnv1a_str;
use crate::types::FacultyId;
use std::collections::HashMap;

/// One pass of local repair: for every request still implicated in a hard
/// conflict, try every candidate option and keep whichever yields the lowest
/// total hard-conflict count (ties broken by soft penalty, then by a stable
/// hash). Locked requests are left untouched.
pub fn local_repair(ctx: &SolverContext, genotype: &mut [usize], max_passes: usize) {
    harmonize_faculty(ctx, genotype);
    for _ in 0..max_passes {
        let conflicted = conflicted_requests(ctx, genotype);
        if conflicted.is_empty() {
            return;
        }
        let mut improved = false;
        for request_id in conflicted {
            if ctx.fixed_genes.contains_key(&request_id) {
                continue;
            }
            if try_best_option(ctx, genotype, request_id) {
                improved = true;
            }
        }
        if !improved {
            return;
        }
    }
}

/// Forces every non-lab block of a (course, section) group onto a single
/// faculty before any conflict-targeted repair runs, so the rest of the pass
/// never has to fight the course-section-faculty-consistency rule. Groups
/// with a fixed gene among them are left alone, since a fixed gene's faculty
/// cannot be moved anyway.
fn harmonize_faculty(ctx: &SolverContext, genotype: &mut [usize]) {
    for indices in ctx.request_indices_by_course_section.values() {
        let non_lab: Vec<usize> = indices.iter().copied().filter(|&i| !ctx.block_requests[i].is_lab).collect();
        if non_lab.len() < 2 {
            continue;
        }
        if non_lab.iter().any(|i| ctx.fixed_genes.contains_key(i)) {
            continue;
        }
        let Some(winner) = pick_winning_faculty(ctx, &non_lab, genotype) else {
            continue;
        };
        for &request_id in &non_lab {
            let req = &ctx.block_requests[request_id];
            if req.faculty_pool[req.options[genotype[request_id]].faculty_id_idx] == winner {
                continue;
            }
            if let Some(opt_idx) = best_option_for_faculty(ctx, request_id, genotype[request_id], &winner) {
                genotype[request_id] = opt_idx;
            }
        }
    }
}

/// Picks the faculty a group of sibling blocks should converge on: most
/// sibling votes first, then whichever candidate matches the group's
/// preferred faculty, then lowest workload target, then name order.
fn pick_winning_faculty(ctx: &SolverContext, indices: &[usize], genotype: &[usize]) -> Option<FacultyId> {
    let mut votes: HashMap<FacultyId, usize> = HashMap::new();
    for &request_id in indices {
        let req = &ctx.block_requests[request_id];
        let opt = &req.options[genotype[request_id]];
        *votes.entry(req.faculty_pool[opt.faculty_id_idx].clone()).or_insert(0) += 1;
    }
    let preferred: std::collections::HashSet<&FacultyId> =
        indices.iter().flat_map(|&i| ctx.block_requests[i].preferred_faculty_ids.iter()).collect();

    let candidates: Vec<FacultyId> = votes.keys().cloned().collect();
    candidates.into_iter().max_by(|a, b| {
        let votes_a = *votes.get(a).unwrap_or(&0);
        let votes_b = *votes.get(b).unwrap_or(&0);
        let pref_a = preferred.contains(a);
        let pref_b = preferred.contains(b);
        let target_a = ctx.faculty.get(a).map(|f| f.target_minutes()).unwrap_or(u32::MAX);
        let target_b = ctx.faculty.get(b).map(|f| f.target_minutes()).unwrap_or(u32::MAX);
        votes_a
            .cmp(&votes_b)
            .then(pref_a.cmp(&pref_b))
            .then(target_b.cmp(&target_a))
            .then(b.0.cmp(&a.0))
    })
}

/// Finds the option index closest to `current` (same day/start_index when
/// possible) whose faculty matches `faculty`, if one exists for this request.
fn best_option_for_faculty(ctx: &SolverContext, request_id: usize, current: usize, faculty: &FacultyId) -> Option<usize> {
    let req = &ctx.block_requests[request_id];
    let current_opt = req.options[current];
    let mut same_slot = None;
    let mut any_match = None;
    for (opt_idx, opt) in req.options.iter().enumerate() {
        if req.faculty_pool[opt.faculty_id_idx] != *faculty {
            continue;
        }
        if opt.day == current_opt.day && opt.start_index == current_opt.start_index {
            same_slot = Some(opt_idx);
            break;
        }
        any_match.get_or_insert(opt_idx);
    }
    same_slot.or(any_match)
}

/// Repair restricted to swapping rooms only, leaving day/time/faculty fixed;
/// used by the verifier's minimal-churn resolver before trying a full move.
pub fn room_only_repair(ctx: &SolverContext, genotype: &mut [usize], request_id: usize) -> bool {
    if ctx.fixed_genes.contains_key(&request_id) {
        return false;
    }
    let req = &ctx.block_requests[request_id];
    let current = genotype[request_id];
    let current_opt = req.options[current];

    let mut best: Option<(u64, f64, u64, usize)> = None;
    for (opt_idx, opt) in req.options.iter().enumerate() {
        if opt.day != current_opt.day || opt.start_index != current_opt.start_index || opt.faculty_id_idx != current_opt.faculty_id_idx {
            continue;
        }
        let mut trial = genotype.to_vec();
        trial[request_id] = opt_idx;
        let result = evaluate(ctx, &trial);
        let tie = fnv1a_str(&format!("{}:{}", request_id, opt_idx));
        let candidate = (result.hard_conflicts, result.soft_penalty, tie, opt_idx);
        if best.as_ref().map(|b| candidate < *b).unwrap_or(true) {
            best = Some(candidate);
        }
    }

    match best {
        Some((_, _, _, opt_idx)) if opt_idx != current => {
            genotype[request_id] = opt_idx;
            true
        }
        _ => false,
    }
}

/// Repair restricted to swapping faculty only, leaving day/time/room fixed;
/// the resolver's second-choice edit after a room swap fails to clear a
/// conflict.
pub fn faculty_only_repair(ctx: &SolverContext, genotype: &mut [usize], request_id: usize) -> bool {
    if ctx.fixed_genes.contains_key(&request_id) {
        return false;
    }
    let req = &ctx.block_requests[request_id];
    let current = genotype[request_id];
    let current_opt = req.options[current];

    let mut best: Option<(u64, f64, u64, usize)> = None;
    for (opt_idx, opt) in req.options.iter().enumerate() {
        if opt.day != current_opt.day || opt.start_index != current_opt.start_index || opt.room_id_idx != current_opt.room_id_idx {
            continue;
        }
        let mut trial = genotype.to_vec();
        trial[request_id] = opt_idx;
        let result = evaluate(ctx, &trial);
        let tie = fnv1a_str(&format!("{}:{}", request_id, opt_idx));
        let candidate = (result.hard_conflicts, result.soft_penalty, tie, opt_idx);
        if best.as_ref().map(|b| candidate < *b).unwrap_or(true) {
            best = Some(candidate);
        }
    }

    match best {
        Some((_, _, _, opt_idx)) if opt_idx != current => {
            genotype[request_id] = opt_idx;
            true
        }
        _ => false,
    }
}

/// Exhaustive single-gene repair: tries every option for every request (not
/// just currently-conflicted ones) repeatedly until a full pass produces no
/// improvement. More thorough than `local_repair`, used when a driver
/// stagnates and the cheap pass has already converged.
pub fn intensive_repair(ctx: &SolverContext, genotype: &mut [usize], max_passes: usize) {
    for _ in 0..max_passes {
        let mut improved = false;
        for request_id in 0..ctx.request_count() {
            if ctx.fixed_genes.contains_key(&request_id) {
                continue;
            }
            if try_best_option(ctx, genotype, request_id) {
                improved = true;
            }
        }
        if !improved {
            return;
        }
    }
}

/// Cheapest possible repair pass: only resolves direct pairwise room/faculty
/// overlaps by moving one of the two offenders to its next best candidate,
/// without scoring the whole genotype. Used inside the hot loop of the
/// annealing and hybrid drivers where a full `evaluate` per trial is too slow.
pub fn greedy_overlap_repair(ctx: &SolverContext, genotype: &mut [usize]) {
    let conflicted = conflicted_requests(ctx, genotype);
    for request_id in conflicted {
        if ctx.fixed_genes.contains_key(&request_id) {
            continue;
        }
        try_best_option(ctx, genotype, request_id);
    }
}

fn try_best_option(ctx: &SolverContext, genotype: &mut [usize], request_id: usize) -> bool {
    let req = &ctx.block_requests[request_id];
    let current = genotype[request_id];
    let mut best: Option<(u64, crate::scheduler::context::ordered_float::OrderedF64, u64, usize)> = None;

    for opt_idx in 0..req.options.len() {
        let mut trial = genotype.to_vec();
        trial[request_id] = opt_idx;
        let result = evaluate(ctx, &trial);
        let tie = fnv1a_str(&format!("{}:{}", request_id, opt_idx));
        let candidate = (
            result.hard_conflicts,
            crate::scheduler::context::ordered_float::OrderedF64(result.soft_penalty),
            tie,
            opt_idx,
        );
        if best.as_ref().map(|b| candidate < *b).unwrap_or(true) {
            best = Some(candidate);
        }
    }

    match best {
        Some((_, _, _, opt_idx)) if opt_idx != current => {
            genotype[request_id] = opt_idx;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::demo::demo_snapshot;
    use crate::scheduler::constructor::construct_grasp;
    use crate::scheduler::expansion::build_solver_context;
    use crate::types::GenerationSettings;
    use rand::SeedableRng;

    #[test]
    fn local_repair_never_increases_hard_conflicts() {
        let snapshot = demo_snapshot();
        let settings = GenerationSettings::default();
        let ctx = build_solver_context(&snapshot, &settings).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut genotype = construct_grasp(&ctx, &mut rng, 1.0);
        let before = evaluate(&ctx, &genotype).hard_conflicts;
        local_repair(&ctx, &mut genotype, 10);
        let after = evaluate(&ctx, &genotype).hard_conflicts;
        assert!(after <= before);
    }
}
