pub mod annealing;
pub mod auto;
pub mod fast;
pub mod genetic;
pub mod hybrid;

use crate::scheduler::context::{EvaluationResult, SolverContext};

/// A complete, scored candidate timetable.
#[derive(Debug, Clone)]
pub struct ScoredGenotype {
    pub genotype: Vec<usize>,
    pub result: EvaluationResult,
}

impl ScoredGenotype {
    pub fn score(ctx: &SolverContext, genotype: Vec<usize>) -> Self {
        let result = crate::scheduler::evaluator::evaluate(ctx, &genotype);
        Self { genotype, result }
    }
}

fn dominates(a: &EvaluationResult, b: &EvaluationResult) -> bool {
    a.hard_conflicts <= b.hard_conflicts
        && a.soft_penalty <= b.soft_penalty
        && (a.hard_conflicts < b.hard_conflicts || a.soft_penalty < b.soft_penalty)
}

/// A capped, deduplicated set of Pareto-non-dominated `(hard_conflicts,
/// soft_penalty)` genotypes, accumulated across a driver's generations.
pub struct ParetoArchive {
    capacity: usize,
    entries: Vec<ScoredGenotype>,
}

impl ParetoArchive {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    pub fn offer(&mut self, candidate: ScoredGenotype) {
        if self.entries.iter().any(|e| e.genotype == candidate.genotype) {
            return;
        }
        if self.entries.iter().any(|e| dominates(&e.result, &candidate.result)) {
            return;
        }
        self.entries.retain(|e| !dominates(&candidate.result, &e.result));
        self.entries.push(candidate);
        if self.entries.len() > self.capacity {
            self.entries.sort_by_key(|e| e.result.lex_key());
            self.entries.truncate(self.capacity);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_ranked(mut self) -> Vec<ScoredGenotype> {
        self.entries.sort_by_key(|e| e.result.lex_key());
        self.entries
    }

    /// Samples one of the best `window` entries uniformly at random; falls
    /// back to any entry once the archive is smaller than `window`.
    pub fn sample_top(&self, window: usize, rng: &mut impl rand::Rng) -> Option<&ScoredGenotype> {
        if self.entries.is_empty() {
            return None;
        }
        let mut ranked: Vec<&ScoredGenotype> = self.entries.iter().collect();
        ranked.sort_by_key(|e| e.result.lex_key());
        let bound = window.min(ranked.len()).max(1);
        Some(ranked[rng.gen_range(0..bound)])
    }

    /// Samples any entry uniformly at random.
    pub fn sample_any(&self, rng: &mut impl rand::Rng) -> Option<&ScoredGenotype> {
        if self.entries.is_empty() {
            return None;
        }
        Some(&self.entries[rng.gen_range(0..self.entries.len())])
    }

    /// The best lexicographic key currently held, if any.
    pub fn best_key(&self) -> Option<(u64, crate::scheduler::context::ordered_float::OrderedF64)> {
        self.entries.iter().map(|e| e.result.lex_key()).min()
    }

    /// How many archived entries have zero hard conflicts.
    pub fn conflict_free_count(&self) -> usize {
        self.entries.iter().filter(|e| e.result.hard_conflicts == 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(hard: u64, soft: f64) -> ScoredGenotype {
        ScoredGenotype {
            genotype: vec![hard as usize, soft as usize],
            result: EvaluationResult {
                fitness: -(hard as f64 * 1000.0 + soft),
                hard_conflicts: hard,
                soft_penalty: soft,
            },
        }
    }

    #[test]
    fn archive_drops_dominated_candidates() {
        let mut archive = ParetoArchive::new(8);
        archive.offer(scored(0, 10.0));
        archive.offer(scored(0, 20.0));
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn archive_keeps_incomparable_candidates() {
        let mut archive = ParetoArchive::new(8);
        archive.offer(scored(0, 20.0));
        archive.offer(scored(1, 5.0));
        assert_eq!(archive.len(), 2);
    }
}
