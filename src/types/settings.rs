use serde::{Deserialize, Serialize};

/// Weighted objective terms shared by the evaluator, constructor, and drivers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    pub room_conflict: f64,
    pub faculty_conflict: f64,
    pub section_conflict: f64,
    pub room_capacity: f64,
    pub room_type: f64,
    pub faculty_availability: f64,
    pub locked_slot: f64,
    pub semester_limit: f64,
    pub workload_overflow: f64,
    pub workload_underflow: f64,
    pub faculty_subject_preference: f64,
    pub spread_balance: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            room_conflict: 1000.0,
            faculty_conflict: 1000.0,
            section_conflict: 1000.0,
            room_capacity: 800.0,
            room_type: 600.0,
            faculty_availability: 700.0,
            locked_slot: 1200.0,
            semester_limit: 400.0,
            workload_overflow: 500.0,
            workload_underflow: 5.0,
            faculty_subject_preference: 3.0,
            spread_balance: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStrategy {
    Auto,
    Fast,
    Hybrid,
    SimulatedAnnealing,
    Genetic,
}

impl Default for SolverStrategy {
    fn default() -> Self {
        SolverStrategy::Auto
    }
}

/// Tunable parameters for all drivers; unused fields are harmless for whichever
/// strategy does not consume them (mirrors the flat `GenerationSettingsBase`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub solver_strategy: SolverStrategy,
    pub population_size: usize,
    pub generations: usize,
    pub elite_count: usize,
    pub tournament_size: usize,
    pub stagnation_limit: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub annealing_iterations: usize,
    pub annealing_initial_temperature: f64,
    pub annealing_cooling_rate: f64,
    pub random_seed: u64,
    pub objective_weights: ObjectiveWeights,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            solver_strategy: SolverStrategy::Auto,
            population_size: 60,
            generations: 120,
            elite_count: 4,
            tournament_size: 4,
            stagnation_limit: 20,
            mutation_rate: 0.05,
            crossover_rate: 0.75,
            annealing_iterations: 2000,
            annealing_initial_temperature: 8.0,
            annealing_cooling_rate: 0.995,
            random_seed: 42,
            objective_weights: ObjectiveWeights::default(),
        }
    }
}
