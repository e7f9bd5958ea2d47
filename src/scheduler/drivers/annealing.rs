use crate::scheduler::constructor::{construct_deterministic, construct_grasp};
use crate::scheduler::context::SolverContext;
use crate::scheduler::drivers::{ParetoArchive, ScoredGenotype};
use crate::scheduler::evaluator::evaluate;
use crate::scheduler::repair::greedy_overlap_repair;
use rand::Rng;

/// Steps between re-seeding the walk from a fresh GRASP construction instead
/// of a perturbation of the current genotype; keeps the archive from
/// stagnating around one basin.
const PROBE_INTERVAL: usize = 45;
/// Consecutive non-improving steps before the walk is forced back to a fresh
/// random restart rather than continuing to perturb a stuck genotype.
const FORCED_RESTART_STALL: usize = 120;
/// Temperature floor below which the schedule reheats instead of continuing
/// to cool, giving the walk a chance to escape a converged basin.
const REHEAT_THRESHOLD: f64 = 0.03;

/// Scalar used by the Metropolis criterion: hard conflicts dominate, fitness
/// only nudges the ranking of otherwise-equal candidates.
fn energy(result: crate::scheduler::context::EvaluationResult) -> f64 {
    result.hard_conflicts as f64 * 10_000.0 + result.soft_penalty + 1e-6 * (-result.fitness) * 0.01
}

/// Re-rolls a random fraction of mutable genes to fresh random options.
fn perturb(ctx: &SolverContext, genotype: &mut [usize], mutable_requests: &[usize], intensity: f64, rng: &mut impl Rng) {
    for &request_id in mutable_requests {
        if rng.gen::<f64>() >= intensity {
            continue;
        }
        let option_count = ctx.option_count(request_id);
        if option_count > 1 {
            genotype[request_id] = rng.gen_range(0..option_count);
        }
    }
}

/// Simulated annealing over single-gene moves, returning every distinct
/// non-dominated candidate visited along the way (not just the final best),
/// so the caller can offer a shortlist of alternatives rather than one
/// genotype.
///
/// Each step perturbs a fraction of the mutable genes (probe steps
/// reconstruct from scratch instead), repairs lightly, and accepts or
/// rejects against the current state via the Metropolis criterion on
/// `energy`. The schedule cools multiplicatively and reheats once it drops
/// below `REHEAT_THRESHOLD`; a long enough stall forces a hard restart from
/// a new construction.
pub fn run(ctx: &SolverContext, rng: &mut impl Rng, archive_capacity: usize) -> ParetoArchive {
    let settings = &ctx.settings;
    let mutable_requests: Vec<usize> = (0..ctx.request_count())
        .filter(|idx| !ctx.fixed_genes.contains_key(idx) && ctx.option_count(*idx) > 1)
        .collect();

    let mut archive = ParetoArchive::new(archive_capacity);
    let mut current = construct_deterministic(ctx);
    let mut current_energy = energy(evaluate(ctx, &current));
    archive.offer(ScoredGenotype::score(ctx, current.clone()));

    if mutable_requests.is_empty() {
        return archive;
    }

    let mut temperature = settings.annealing_initial_temperature.max(1e-6);
    let mut stall = 0usize;

    for step in 0..settings.annealing_iterations {
        let progress = step as f64 / settings.annealing_iterations.max(1) as f64;

        if step > 0 && step % PROBE_INTERVAL == 0 {
            let probe_alpha = rng.gen_range(0.0..1.0);
            current = construct_grasp(ctx, rng, probe_alpha);
            current_energy = energy(evaluate(ctx, &current));
            archive.offer(ScoredGenotype::score(ctx, current.clone()));
            continue;
        }

        if stall >= FORCED_RESTART_STALL {
            current = construct_grasp(ctx, rng, 1.0);
            current_energy = energy(evaluate(ctx, &current));
            archive.offer(ScoredGenotype::score(ctx, current.clone()));
            stall = 0;
            continue;
        }

        let mut candidate = current.clone();
        let intensity = (0.03 + 0.18 * progress + stall as f64 * 0.002).min(0.35);
        perturb(ctx, &mut candidate, &mutable_requests, intensity, rng);

        let mutate_rate = (settings.mutation_rate * if current_energy >= 10_000.0 { 1.35 } else { 1.0 }).min(0.40);
        perturb(ctx, &mut candidate, &mutable_requests, mutate_rate, rng);

        greedy_overlap_repair(ctx, &mut candidate);
        let candidate_result = evaluate(ctx, &candidate);
        let candidate_energy = energy(candidate_result);

        let delta = candidate_energy - current_energy;
        let accept = delta <= 0.0 || rng.gen::<f64>() < (-delta / temperature).exp();

        archive.offer(ScoredGenotype { genotype: candidate.clone(), result: candidate_result });

        if accept {
            if candidate_energy < current_energy - f64::EPSILON {
                stall = 0;
            } else {
                stall += 1;
            }
            current = candidate;
            current_energy = candidate_energy;
        } else {
            stall += 1;
        }

        temperature *= settings.annealing_cooling_rate;
        if temperature < REHEAT_THRESHOLD {
            temperature = settings.annealing_initial_temperature.max(1e-6);
        }
    }

    archive
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::demo::demo_snapshot;
    use crate::scheduler::expansion::build_solver_context;
    use crate::types::GenerationSettings;
    use rand::SeedableRng;

    #[test]
    fn annealing_never_returns_a_worse_genotype_than_the_deterministic_seed() {
        let snapshot = demo_snapshot();
        let mut settings = GenerationSettings::default();
        settings.annealing_iterations = 200;
        let ctx = build_solver_context(&snapshot, &settings).unwrap();
        let seed_score = evaluate(&ctx, &construct_deterministic(&ctx));
        let mut rng = rand::rngs::StdRng::seed_from_u64(settings.random_seed);
        let archive = run(&ctx, &mut rng, 8);
        let best = archive.into_ranked().into_iter().next().expect("archive always holds the seed");
        assert!(best.result.lex_key() <= seed_score.lex_key());
    }
}
