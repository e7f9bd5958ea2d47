use crate::scheduler::context::SolverContext;
use crate::scheduler::hashing::fnv1a_str;
use crate::types::{CourseId, Day, FacultyId, RoomId, SectionName};
use rand::Rng;
use std::collections::HashMap;

#[derive(Default)]
struct Occupancy {
    room: HashMap<(RoomId, Day), Vec<(u32, u32)>>,
    faculty: HashMap<(FacultyId, Day), Vec<(u32, u32)>>,
    section: HashMap<(SectionName, Day), Vec<(u32, u32, Option<String>)>>,
}

impl Occupancy {
    fn incremental_cost(&self, ctx: &SolverContext, request_id: usize, option_index: usize) -> u32 {
        let req = &ctx.block_requests[request_id];
        let (day, start_min, end_min) = ctx.option_bounds(request_id, option_index);
        let opt = &req.options[option_index];
        let room_id = &req.room_pool[opt.room_id_idx];
        let faculty_id = &req.faculty_pool[opt.faculty_id_idx];

        let mut cost = 0u32;
        if let Some(existing) = self.room.get(&(room_id.clone(), day)) {
            cost += existing.iter().filter(|&&(s, e)| s < end_min && start_min < e).count() as u32;
        }
        if let Some(existing) = self.faculty.get(&(faculty_id.clone(), day)) {
            cost += existing.iter().filter(|&&(s, e)| s < end_min && start_min < e).count() as u32;
        }
        if let Some(existing) = self.section.get(&(req.section.clone(), day)) {
            cost += existing
                .iter()
                .filter(|&&(s, e, ref batch)| {
                    s < end_min && start_min < e && (batch.is_none() || req.batch.is_none() || batch == &req.batch)
                })
                .count() as u32;
        }
        cost
    }

    fn commit(&mut self, ctx: &SolverContext, request_id: usize, option_index: usize) {
        let req = &ctx.block_requests[request_id];
        let (day, start_min, end_min) = ctx.option_bounds(request_id, option_index);
        let opt = &req.options[option_index];
        let room_id = req.room_pool[opt.room_id_idx].clone();
        let faculty_id = req.faculty_pool[opt.faculty_id_idx].clone();

        self.room.entry((room_id, day)).or_default().push((start_min, end_min));
        self.faculty.entry((faculty_id, day)).or_default().push((start_min, end_min));
        self.section
            .entry((req.section.clone(), day))
            .or_default()
            .push((start_min, end_min, req.batch.clone()));
    }
}

/// Tracks the faculty and timing decisions made so far for each (course,
/// section), so later blocks of the same group can be steered toward
/// candidates that already agree with their siblings instead of relying on
/// repair to reconcile them after the fact.
#[derive(Default)]
struct CoursePlan {
    section_faculty: HashMap<(CourseId, SectionName), FacultyId>,
    parallel_signature: HashMap<(CourseId, SectionName), (Day, usize)>,
}

/// Restricts a block's candidate option indices to whatever its (course,
/// section) group has already committed to: the planned faculty for non-lab
/// blocks (or the course's primary faculty if nothing is planned yet), and
/// the already-placed parallel-batch peer's (day, start_index) for labs that
/// allow parallel batches. Falls back to every option when the restriction
/// would leave nothing to choose from.
fn candidate_indices(ctx: &SolverContext, plan: &CoursePlan, request_id: usize) -> Vec<usize> {
    let req = &ctx.block_requests[request_id];
    let key = req.course_section_key();

    if req.is_lab {
        if req.allow_parallel_batches {
            if let Some(&(day, start_index)) = plan.parallel_signature.get(&key) {
                let matching: Vec<usize> = req
                    .options
                    .iter()
                    .enumerate()
                    .filter(|(_, opt)| opt.day == day && opt.start_index == start_index)
                    .map(|(idx, _)| idx)
                    .collect();
                if !matching.is_empty() {
                    return matching;
                }
            }
        }
        return (0..req.options.len()).collect();
    }

    let faculty = plan.section_faculty.get(&key).cloned().unwrap_or_else(|| req.primary_faculty_id.clone());
    let matching: Vec<usize> = req
        .options
        .iter()
        .enumerate()
        .filter(|(_, opt)| req.faculty_pool[opt.faculty_id_idx] == faculty)
        .map(|(idx, _)| idx)
        .collect();
    if matching.is_empty() {
        (0..req.options.len()).collect()
    } else {
        matching
    }
}

/// Records a committed placement's faculty/timing into the plan so that
/// later sibling blocks of the same (course, section) see it via
/// `candidate_indices`.
fn record_plan(plan: &mut CoursePlan, ctx: &SolverContext, request_id: usize, option_index: usize) {
    let req = &ctx.block_requests[request_id];
    let key = req.course_section_key();
    let opt = &req.options[option_index];

    if !req.is_lab {
        plan.section_faculty.entry(key).or_insert_with(|| req.faculty_pool[opt.faculty_id_idx].clone());
    } else if req.allow_parallel_batches {
        plan.parallel_signature.entry(key).or_insert((opt.day, opt.start_index));
    }
}

/// Most-constrained-first placement order: fewer candidate options and lab
/// blocks (harder to move once placed) go first; a stable hash breaks ties.
fn priority_order(ctx: &SolverContext) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ctx.request_count()).collect();
    order.sort_by_key(|&idx| {
        let req = &ctx.block_requests[idx];
        let tie_break = fnv1a_str(&format!("{}:{}:{:?}", req.course_id, req.section, req.batch));
        (
            std::cmp::Reverse(req.is_lab),
            req.options.len(),
            std::cmp::Reverse(req.student_count),
            tie_break,
        )
    });
    order
}

/// GRASP-style construction: at each step, build a restricted candidate list
/// of the `alpha` fraction lowest-incremental-conflict options and pick
/// uniformly at random among them. `alpha = 0.0` degenerates to greedy-best.
pub fn construct_grasp(ctx: &SolverContext, rng: &mut impl Rng, alpha: f64) -> Vec<usize> {
    let order = priority_order(ctx);
    let mut genotype = vec![0usize; ctx.request_count()];
    let mut occupancy = Occupancy::default();
    let mut plan = CoursePlan::default();

    for request_id in order {
        if let Some(&fixed) = ctx.fixed_genes.get(&request_id) {
            genotype[request_id] = fixed;
            occupancy.commit(ctx, request_id, fixed);
            record_plan(&mut plan, ctx, request_id, fixed);
            continue;
        }

        let candidates = candidate_indices(ctx, &plan, request_id);
        let mut scored: Vec<(u32, u64, usize)> = candidates
            .into_iter()
            .map(|opt_idx| {
                let cost = occupancy.incremental_cost(ctx, request_id, opt_idx);
                let tie = fnv1a_str(&format!("{}:{}", request_id, opt_idx));
                (cost, tie, opt_idx)
            })
            .collect();
        scored.sort_unstable();

        let rcl_len = ((scored.len() as f64 * alpha.clamp(0.0, 1.0)).ceil() as usize).clamp(1, scored.len());
        let choice_idx = if rcl_len <= 1 { 0 } else { rng.gen_range(0..rcl_len) };
        let chosen = scored[choice_idx].2;

        genotype[request_id] = chosen;
        occupancy.commit(ctx, request_id, chosen);
        record_plan(&mut plan, ctx, request_id, chosen);
    }

    genotype
}

/// Deterministic zero-conflict-first construction with no randomness, used by
/// the fast solver and as the seed individual for every driver's population.
pub fn construct_deterministic(ctx: &SolverContext) -> Vec<usize> {
    let order = priority_order(ctx);
    let mut genotype = vec![0usize; ctx.request_count()];
    let mut occupancy = Occupancy::default();
    let mut plan = CoursePlan::default();

    for request_id in order {
        if let Some(&fixed) = ctx.fixed_genes.get(&request_id) {
            genotype[request_id] = fixed;
            occupancy.commit(ctx, request_id, fixed);
            record_plan(&mut plan, ctx, request_id, fixed);
            continue;
        }

        let best = candidate_indices(ctx, &plan, request_id)
            .into_iter()
            .map(|opt_idx| {
                let cost = occupancy.incremental_cost(ctx, request_id, opt_idx);
                let tie = fnv1a_str(&format!("{}:{}", request_id, opt_idx));
                (cost, tie, opt_idx)
            })
            .min()
            .map(|(_, _, idx)| idx)
            .unwrap_or(0);

        genotype[request_id] = best;
        occupancy.commit(ctx, request_id, best);
        record_plan(&mut plan, ctx, request_id, best);
    }

    genotype
}

/// Greedy construction with bounded backtracking: if the greedy pass leaves
/// unavoidable zero-conflict candidates exhausted for some block, the last
/// few placements are undone and retried with a reshuffled tie-break before
/// falling back to accepting the best-available (possibly conflicted) option.
pub fn construct_with_backtracking(ctx: &SolverContext, rng: &mut impl Rng, max_backtracks: usize) -> Vec<usize> {
    let order = priority_order(ctx);
    let mut genotype = vec![0usize; ctx.request_count()];
    let mut occupancy = Occupancy::default();
    let mut plan = CoursePlan::default();
    let mut placed: Vec<usize> = Vec::new();
    let mut backtracks_used = 0usize;
    let mut position = 0usize;

    while position < order.len() {
        let request_id = order[position];

        if let Some(&fixed) = ctx.fixed_genes.get(&request_id) {
            genotype[request_id] = fixed;
            occupancy.commit(ctx, request_id, fixed);
            record_plan(&mut plan, ctx, request_id, fixed);
            placed.push(request_id);
            position += 1;
            continue;
        }

        let mut scored: Vec<(u32, u64, usize)> = candidate_indices(ctx, &plan, request_id)
            .into_iter()
            .map(|opt_idx| {
                let cost = occupancy.incremental_cost(ctx, request_id, opt_idx);
                let tie = fnv1a_str(&format!("{}:{}:{}", request_id, opt_idx, backtracks_used));
                (cost, tie, opt_idx)
            })
            .collect();
        scored.sort_unstable();

        let zero_conflict_exists = scored.first().map(|&(cost, ..)| cost == 0).unwrap_or(false);

        if !zero_conflict_exists && backtracks_used < max_backtracks && !placed.is_empty() {
            backtracks_used += 1;
            let undo_count = (placed.len() / 4).max(1).min(placed.len());
            for _ in 0..undo_count {
                if placed.pop().is_some() {
                    position -= 1;
                }
            }
            occupancy = Occupancy::default();
            plan = CoursePlan::default();
            for &already in &placed {
                occupancy.commit(ctx, already, genotype[already]);
                record_plan(&mut plan, ctx, already, genotype[already]);
            }
            continue;
        }

        let chosen = scored.first().map(|&(_, _, idx)| idx).unwrap_or(0);
        genotype[request_id] = chosen;
        occupancy.commit(ctx, request_id, chosen);
        record_plan(&mut plan, ctx, request_id, chosen);
        placed.push(request_id);
        position += 1;
    }

    genotype
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::demo::demo_snapshot;
    use crate::scheduler::evaluator::evaluate;
    use crate::scheduler::expansion::build_solver_context;
    use crate::types::GenerationSettings;
    use rand::SeedableRng;

    #[test]
    fn deterministic_construction_is_repeatable() {
        let snapshot = demo_snapshot();
        let settings = GenerationSettings::default();
        let ctx = build_solver_context(&snapshot, &settings).unwrap();
        let a = construct_deterministic(&ctx);
        let b = construct_deterministic(&ctx);
        assert_eq!(a, b);
    }

    #[test]
    fn grasp_construction_honors_locked_genes() {
        let snapshot = demo_snapshot();
        let settings = GenerationSettings::default();
        let ctx = build_solver_context(&snapshot, &settings).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(settings.random_seed);
        let genotype = construct_grasp(&ctx, &mut rng, 0.3);
        for (&request_id, &fixed) in &ctx.fixed_genes {
            assert_eq!(genotype[request_id], fixed);
        }
        let result = evaluate(&ctx, &genotype);
        assert!(result.hard_conflicts < ctx.request_count() as u64 * 3);
    }
}
