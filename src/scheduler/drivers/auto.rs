use crate::scheduler::context::SolverContext;
use crate::scheduler::drivers::{annealing, fast, genetic, hybrid, ParetoArchive, ScoredGenotype};
use crate::types::SolverStrategy;
use rand::Rng;

/// Dispatches to the strategy named in `ctx.settings.solver_strategy`, or (for
/// `Auto`) runs the fast solver as a floor, the hybrid GRASP+local-search
/// driver for breadth, and the genetic driver for depth, merging every
/// candidate into one Pareto archive. Returns up to `alternative_count`
/// distinct, ranked alternatives.
pub fn run(ctx: &SolverContext, rng: &mut impl Rng, alternative_count: usize) -> Vec<ScoredGenotype> {
    let capacity = alternative_count.max(1) * 3;
    let mut archive = ParetoArchive::new(capacity);

    match ctx.settings.solver_strategy {
        SolverStrategy::Fast => {
            archive.offer(fast::run(ctx));
        }
        SolverStrategy::Hybrid => {
            for scored in hybrid::run(ctx, rng, capacity).into_ranked() {
                archive.offer(scored);
            }
        }
        SolverStrategy::SimulatedAnnealing => {
            for scored in annealing::run(ctx, rng, capacity).into_ranked() {
                archive.offer(scored);
            }
        }
        SolverStrategy::Genetic => {
            for scored in genetic::run(ctx, rng, alternative_count.max(1)) {
                archive.offer(scored);
            }
        }
        SolverStrategy::Auto => {
            archive.offer(fast::run(ctx));
            for scored in hybrid::run(ctx, rng, capacity).into_ranked() {
                archive.offer(scored);
            }
            for scored in genetic::run(ctx, rng, alternative_count.max(1)) {
                archive.offer(scored);
            }
            for scored in annealing::run(ctx, rng, capacity).into_ranked() {
                archive.offer(scored);
            }
        }
    }

    archive.into_ranked().into_iter().take(alternative_count.max(1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::demo::demo_snapshot;
    use crate::scheduler::expansion::build_solver_context;
    use crate::types::GenerationSettings;
    use rand::SeedableRng;

    #[test]
    fn auto_strategy_returns_at_least_one_alternative() {
        let snapshot = demo_snapshot();
        let mut settings = GenerationSettings::default();
        settings.generations = 8;
        settings.annealing_iterations = 100;
        let ctx = build_solver_context(&snapshot, &settings).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(settings.random_seed);
        let alternatives = run(&ctx, &mut rng, 3);
        assert!(!alternatives.is_empty());
        assert!(alternatives.len() <= 3);
    }
}
