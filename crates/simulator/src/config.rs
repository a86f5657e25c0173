//! Configuration types for the simulator.

use contention_policy::PolicyKind;
use contention_simulation::RunConfig;
use contention_types::ConfigError;
use serde::{Deserialize, Serialize};

/// Configuration for an experiment: one parameter point, repeated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Number of contending nodes.
    pub num_nodes: usize,

    /// Per-tick packet-generation probability.
    pub generation_probability: f64,

    /// Backoff policy every node runs.
    pub policy: PolicyKind,

    /// Exploration rate (used by epsilon-greedy).
    pub epsilon: f64,

    /// Ticks per run.
    pub ticks: u64,

    /// Base random seed; repetition `r` runs with `seed + r`.
    pub seed: u64,

    /// Independent runs of this point.
    pub repetitions: usize,
}

impl SimulatorConfig {
    /// Create a new simulator configuration.
    pub fn new(num_nodes: usize, policy: PolicyKind) -> Self {
        Self {
            num_nodes,
            generation_probability: 0.02,
            policy,
            epsilon: 0.1,
            ticks: 500_000,
            seed: 12345,
            repetitions: 1,
        }
    }

    /// Set the packet-generation probability.
    pub fn with_generation_probability(mut self, p: f64) -> Self {
        self.generation_probability = p;
        self
    }

    /// Set the policy.
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Set the exploration rate.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the number of nodes.
    pub fn with_num_nodes(mut self, num_nodes: usize) -> Self {
        self.num_nodes = num_nodes;
        self
    }

    /// Set the tick budget.
    pub fn with_ticks(mut self, ticks: u64) -> Self {
        self.ticks = ticks;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of repetitions.
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Check every parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks == 0 {
            return Err(ConfigError::ZeroTicks);
        }
        if self.repetitions == 0 {
            return Err(ConfigError::ZeroRepetitions);
        }
        self.to_run_config(0).validate()
    }

    /// Seed used by a repetition.
    pub fn seed_for(&self, repetition: usize) -> u64 {
        self.seed.wrapping_add(repetition as u64)
    }

    /// Convert to a RunConfig for one repetition.
    pub fn to_run_config(&self, repetition: usize) -> RunConfig {
        RunConfig {
            num_nodes: self.num_nodes,
            generation_probability: self.generation_probability,
            policy: self.policy,
            epsilon: self.epsilon,
            seed: self.seed_for(repetition),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::new(100, PolicyKind::Baseline)
    }
}
