//! Parameter sweeps.
//!
//! A sweep expands a base configuration into a list of parameter points and
//! runs every (point, repetition) pair in parallel:
//!
//! ```text
//!   base ──► points() ──► [cfg₀, cfg₁, …] × [rep₀ … repₖ]
//!                                │
//!                          rayon par_iter
//!                                │
//!                   Vec<RunReport> (point-major, repetition order)
//! ```

use crate::config::SimulatorConfig;
use crate::error::SimulatorError;
use crate::runner::Simulator;
use crate::report::RunReport;
use contention_policy::PolicyKind;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// First node count of a node sweep, and its step.
pub const NODE_SWEEP_STEP: usize = 500;

/// Generation probabilities visited by a probability sweep.
pub const GENERATION_PROBABILITIES: [f64; 9] =
    [0.0002, 0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0];

/// Exploration-rate increment of an epsilon sweep.
pub const EPSILON_STEP: f64 = 0.1;

/// Repetitions per point unless overridden.
pub const DEFAULT_SWEEP_REPETITIONS: usize = 3;

/// Which parameter a sweep varies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Sweep {
    /// Node counts 500, 1000, ... up to `max_nodes`.
    Nodes { max_nodes: usize },
    /// Every entry of [`GENERATION_PROBABILITIES`].
    GenerationProbability,
    /// Exploration rate from the base value to 1.0; forces epsilon-greedy.
    Epsilon,
}

impl Sweep {
    /// Expand `base` into one configuration per point.
    pub fn points(&self, base: &SimulatorConfig) -> Vec<SimulatorConfig> {
        match *self {
            Sweep::Nodes { max_nodes } => (1..)
                .map(|i| i * NODE_SWEEP_STEP)
                .take_while(|&n| n <= max_nodes)
                .map(|n| base.clone().with_num_nodes(n))
                .collect(),
            Sweep::GenerationProbability => GENERATION_PROBABILITIES
                .iter()
                .map(|&p| base.clone().with_generation_probability(p))
                .collect(),
            Sweep::Epsilon => {
                let mut points = Vec::new();
                let mut step = 0u32;
                loop {
                    let epsilon = round_rate(base.epsilon + f64::from(step) * EPSILON_STEP);
                    if epsilon > 1.0 {
                        break;
                    }
                    points.push(
                        base.clone()
                            .with_policy(PolicyKind::BanditEpsilonGreedy)
                            .with_epsilon(epsilon),
                    );
                    step += 1;
                }
                points
            }
        }
    }
}

/// Drop accumulated floating-point noise from a swept rate.
fn round_rate(rate: f64) -> f64 {
    (rate * 1e6).round() / 1e6
}

/// Run every point of `sweep` around `base`.
///
/// The base and all points are validated before any run starts. Reports
/// are ordered by point, then by repetition.
pub fn run_sweep(sweep: Sweep, base: &SimulatorConfig) -> Result<Vec<RunReport>, SimulatorError> {
    base.validate()?;
    let simulators = sweep
        .points(base)
        .into_iter()
        .map(Simulator::new)
        .collect::<Result<Vec<_>, _>>()?;

    if simulators.is_empty() {
        warn!(?sweep, "Sweep has no points");
        return Ok(Vec::new());
    }

    let jobs: Vec<(&Simulator, usize)> = simulators
        .iter()
        .flat_map(|sim| (0..sim.config().repetitions).map(move |rep| (sim, rep)))
        .collect();

    info!(
        ?sweep,
        points = simulators.len(),
        runs = jobs.len(),
        "Starting sweep"
    );

    jobs.par_iter()
        .map(|(sim, rep)| sim.run_once(*rep))
        .collect()
}
