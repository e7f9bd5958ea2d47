use crate::scheduler::context::SolverContext;
use crate::scheduler::constructor::{construct_deterministic, construct_grasp};
use crate::scheduler::drivers::ScoredGenotype;
use crate::scheduler::evaluator::evaluate;
use crate::scheduler::repair::local_repair;
use rand::Rng;

/// Caps the running shortlist at `max(20, 8 * alternative_count)` so a long
/// run doesn't keep scoring and sorting an unbounded set of candidates.
fn shortlist_capacity(alternative_count: usize) -> usize {
    (8 * alternative_count).max(20)
}

/// Merges a generation's scored population into the running shortlist:
/// dedups by genotype equality, sorts by lexicographic key, and truncates to
/// capacity.
fn merge_into_shortlist(shortlist: &mut Vec<ScoredGenotype>, generation: &[(Vec<usize>, crate::scheduler::context::EvaluationResult)], capacity: usize) {
    for (genotype, result) in generation {
        if shortlist.iter().any(|s| &s.genotype == genotype) {
            continue;
        }
        shortlist.push(ScoredGenotype { genotype: genotype.clone(), result: *result });
    }
    shortlist.sort_by_key(|s| s.result.lex_key());
    shortlist.truncate(capacity);
}

/// Classic generational GA: tournament selection, uniform crossover, per-gene
/// mutation, elitism, and a stagnation counter that stops early once the best
/// lexicographic `(hard_conflicts, soft_penalty)` key hasn't improved for
/// `stagnation_limit` generations. Returns the best `alternative_count`
/// distinct genotypes seen across every generation, not just the final
/// population, so a short, early-converging run still offers a shortlist.
pub fn run(ctx: &SolverContext, rng: &mut impl Rng, alternative_count: usize) -> Vec<ScoredGenotype> {
    let settings = &ctx.settings;
    let population_size = settings.population_size.max(4);
    let capacity = shortlist_capacity(alternative_count.max(1));

    let mut population: Vec<Vec<usize>> = Vec::with_capacity(population_size);
    population.push(construct_deterministic(ctx));
    while population.len() < population_size {
        population.push(construct_grasp(ctx, rng, 0.4));
    }

    let mut shortlist: Vec<ScoredGenotype> = Vec::new();
    let mut best_key = None;
    let mut stagnant_generations = 0usize;

    for _generation in 0..settings.generations {
        let scored_raw: Vec<(Vec<usize>, crate::scheduler::context::EvaluationResult)> =
            population.iter().map(|g| (g.clone(), evaluate(ctx, g))).collect();
        merge_into_shortlist(&mut shortlist, &scored_raw, capacity);

        let mut scored = scored_raw;
        scored.sort_by_key(|(_, r)| r.lex_key());

        let current_best = scored[0].1.lex_key();
        if best_key.as_ref().map(|k| current_best < *k).unwrap_or(true) {
            best_key = Some(current_best);
            stagnant_generations = 0;
        } else {
            stagnant_generations += 1;
        }
        if stagnant_generations >= settings.stagnation_limit {
            break;
        }

        let elite_count = settings.elite_count.min(population_size);
        let mut next_population: Vec<Vec<usize>> = scored.iter().take(elite_count).map(|(g, _)| g.clone()).collect();

        while next_population.len() < population_size {
            let parent_a = tournament_select(&scored, settings.tournament_size, rng);
            let parent_b = tournament_select(&scored, settings.tournament_size, rng);
            let mut child = if rng.gen_bool(settings.crossover_rate) {
                crossover(ctx, parent_a, parent_b, rng)
            } else {
                parent_a.to_vec()
            };
            mutate(ctx, &mut child, settings.mutation_rate, rng);
            next_population.push(child);
        }

        population = next_population;
    }

    let final_scored: Vec<(Vec<usize>, crate::scheduler::context::EvaluationResult)> =
        population.into_iter().map(|g| (g.clone(), evaluate(ctx, &g))).collect();
    merge_into_shortlist(&mut shortlist, &final_scored, capacity);

    shortlist.truncate(alternative_count.max(1));
    for scored in &mut shortlist {
        local_repair(ctx, &mut scored.genotype, 4);
        scored.result = evaluate(ctx, &scored.genotype);
    }
    shortlist.sort_by_key(|s| s.result.lex_key());
    shortlist
}

fn tournament_select<'a>(
    scored: &'a [(Vec<usize>, crate::scheduler::context::EvaluationResult)],
    tournament_size: usize,
    rng: &mut impl Rng,
) -> &'a [usize] {
    let size = tournament_size.clamp(1, scored.len());
    let mut best_idx = rng.gen_range(0..scored.len());
    for _ in 1..size {
        let challenger_idx = rng.gen_range(0..scored.len());
        if scored[challenger_idx].1.lex_key() < scored[best_idx].1.lex_key() {
            best_idx = challenger_idx;
        }
    }
    &scored[best_idx].0
}

fn crossover(ctx: &SolverContext, a: &[usize], b: &[usize], rng: &mut impl Rng) -> Vec<usize> {
    (0..ctx.request_count())
        .map(|idx| {
            if let Some(&fixed) = ctx.fixed_genes.get(&idx) {
                fixed
            } else if rng.gen_bool(0.5) {
                a[idx]
            } else {
                b[idx]
            }
        })
        .collect()
}

fn mutate(ctx: &SolverContext, genotype: &mut [usize], mutation_rate: f64, rng: &mut impl Rng) {
    for (idx, gene) in genotype.iter_mut().enumerate() {
        if ctx.fixed_genes.contains_key(&idx) {
            continue;
        }
        if rng.gen_bool(mutation_rate.clamp(0.0, 1.0)) {
            let option_count = ctx.option_count(idx);
            if option_count > 0 {
                *gene = rng.gen_range(0..option_count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::demo::demo_snapshot;
    use crate::scheduler::expansion::build_solver_context;
    use crate::types::{GenerationSettings, SolverStrategy};
    use rand::SeedableRng;

    #[test]
    fn genetic_driver_respects_locked_genes() {
        let snapshot = demo_snapshot();
        let mut settings = GenerationSettings::default();
        settings.solver_strategy = SolverStrategy::Genetic;
        settings.population_size = 8;
        settings.generations = 5;
        settings.stagnation_limit = 3;
        let ctx = build_solver_context(&snapshot, &settings).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(settings.random_seed);
        let shortlist = run(&ctx, &mut rng, 3);
        assert!(!shortlist.is_empty());
        for scored in &shortlist {
            for (&request_id, &fixed) in &ctx.fixed_genes {
                assert_eq!(scored.genotype[request_id], fixed);
            }
        }
    }
}
