use crate::scheduler::constructor::construct_grasp;
use crate::scheduler::context::SolverContext;
use crate::scheduler::drivers::{ParetoArchive, ScoredGenotype};
use crate::scheduler::repair::{intensive_repair, local_repair};
use rand::Rng;

const SEED_COUNT: usize = 6;

/// Uniform one-point-per-gene crossover honoring fixed genes, matching the
/// genetic driver's crossover in spirit without sharing its private helper.
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

/// Re-rolls a random fraction of non-fixed genes to fresh random options.
fn perturb(ctx: &SolverContext, genotype: &mut [usize], intensity: f64, rng: &mut impl Rng) {
    for idx in 0..genotype.len() {
        if ctx.fixed_genes.contains_key(&idx) || rng.gen::<f64>() >= intensity {
            continue;
        }
        let option_count = ctx.option_count(idx);
        if option_count > 1 {
            genotype[idx] = rng.gen_range(0..option_count);
        }
    }
}

/// Per-gene mutation at a flat rate, independent of `perturb`'s
/// progress-scaled intensity.
fn mutate(ctx: &SolverContext, genotype: &mut [usize], mutation_rate: f64, rng: &mut impl Rng) {
    for idx in 0..genotype.len() {
        if ctx.fixed_genes.contains_key(&idx) || !rng.gen_bool(mutation_rate.clamp(0.0, 1.0)) {
            continue;
        }
        let option_count = ctx.option_count(idx);
        if option_count > 1 {
            genotype[idx] = rng.gen_range(0..option_count);
        }
    }
}

/// Elite-sampling hybrid: seeds the archive with a handful of GRASP
/// constructions at increasing alpha, then repeatedly samples an elite from
/// the archive (optionally crossed over with another archived candidate),
/// perturbs and mutates it, repairs, and offers the result back. Stops early
/// once the archive has enough conflict-free alternatives or stagnates.
pub fn run(ctx: &SolverContext, rng: &mut impl Rng, archive_capacity: usize) -> ParetoArchive {
    let settings = &ctx.settings;
    let mut archive = ParetoArchive::new(archive_capacity);
    let mut stagnant_rounds = 0usize;
    let mut best_key = None;
    let target_conflict_free = (archive_capacity / 2).max(2);

    for seed_idx in 0..SEED_COUNT {
        let alpha = if seed_idx == 0 { 0.0 } else { (seed_idx as f64 / SEED_COUNT as f64) * 0.5 };
        let mut genotype = construct_grasp(ctx, rng, alpha);
        local_repair(ctx, &mut genotype, 5);
        archive.offer(ScoredGenotype::score(ctx, genotype));
    }

    let generations = settings.generations.max(1);
    for round in 0..generations {
        if archive.conflict_free_count() >= target_conflict_free {
            break;
        }

        let progress = round as f64 / generations as f64;
        let fallback = construct_grasp(ctx, rng, 0.5);
        let mut genotype = archive.sample_top(8, rng).map(|s| s.genotype.clone()).unwrap_or(fallback);

        if rng.gen_bool((settings.crossover_rate + 0.1).min(0.85)) {
            if let Some(mate) = archive.sample_any(rng) {
                genotype = crossover(ctx, &genotype, &mate.genotype, rng);
            }
        }

        perturb(ctx, &mut genotype, (0.05 + 0.25 * progress).min(0.3), rng);
        mutate(ctx, &mut genotype, settings.mutation_rate, rng);

        if round % 2 == 0 {
            local_repair(ctx, &mut genotype, 5);
        } else {
            intensive_repair(ctx, &mut genotype, 1);
        }

        let scored = ScoredGenotype::score(ctx, genotype);
        let key = scored.result.lex_key();
        archive.offer(scored);

        if best_key.as_ref().map(|k| key < *k).unwrap_or(true) {
            best_key = Some(key);
            stagnant_rounds = 0;
        } else {
            stagnant_rounds += 1;
        }
        if stagnant_rounds >= settings.stagnation_limit {
            break;
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
    fn hybrid_driver_produces_a_nonempty_archive() {
        let snapshot = demo_snapshot();
        let mut settings = GenerationSettings::default();
        settings.generations = 10;
        let ctx = build_solver_context(&snapshot, &settings).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(settings.random_seed);
        let archive = run(&ctx, &mut rng, 6);
        assert!(!archive.is_empty());
    }
}
