use crate::scheduler::constructor::construct_deterministic;
use crate::scheduler::context::SolverContext;
use crate::scheduler::drivers::ScoredGenotype;
use crate::scheduler::repair::{intensive_repair, local_repair};

/// Single deterministic construction plus repair, no search. Used when a
/// caller needs one timetable quickly and is willing to accept whatever the
/// greedy heuristic converges to.
pub fn run(ctx: &SolverContext) -> ScoredGenotype {
    let mut genotype = construct_deterministic(ctx);
    local_repair(ctx, &mut genotype, 6);
    intensive_repair(ctx, &mut genotype, 2);
    ScoredGenotype::score(ctx, genotype)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::demo::demo_snapshot;
    use crate::scheduler::expansion::build_solver_context;
    use crate::types::GenerationSettings;

    #[test]
    fn fast_solver_returns_a_scored_genotype_for_every_request() {
        let snapshot = demo_snapshot();
        let settings = GenerationSettings::default();
        let ctx = build_solver_context(&snapshot, &settings).unwrap();
        let scored = run(&ctx);
        assert_eq!(scored.genotype.len(), ctx.request_count());
    }
}
