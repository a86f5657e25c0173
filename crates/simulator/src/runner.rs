//! Simulator runner: repeated runs of one parameter point.

use crate::config::SimulatorConfig;
use crate::error::SimulatorError;
use crate::metrics::MetricsCollector;
use crate::report::RunReport;
use contention_simulation::SimulationRunner;
use rayon::prelude::*;
use tracing::{debug, info};

/// Runs an experiment described by a [`SimulatorConfig`].
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    /// Create a simulator, validating the configuration up front.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Execute a single repetition.
    pub fn run_once(&self, repetition: usize) -> Result<RunReport, SimulatorError> {
        let run_config = self.config.to_run_config(repetition);
        let mut runner = SimulationRunner::new(&run_config)?;
        let mut metrics = MetricsCollector::new()?;

        let stats = runner.run_with(self.config.ticks, |_, resolution| {
            metrics.record(resolution);
        })?;

        debug!(
            repetition,
            busy_ticks = metrics.busy_ticks(),
            idle_ticks = metrics.idle_ticks(),
            "Channel occupancy"
        );

        Ok(RunReport::new(
            &self.config,
            repetition,
            &stats,
            metrics.access_delay(),
        ))
    }

    /// Execute every repetition in parallel. Reports come back in repetition
    /// order.
    pub fn run(&self) -> Result<Vec<RunReport>, SimulatorError> {
        info!(
            policy = %self.config.policy,
            nodes = self.config.num_nodes,
            p = self.config.generation_probability,
            epsilon = self.config.epsilon,
            repetitions = self.config.repetitions,
            "Starting experiment"
        );

        (0..self.config.repetitions)
            .into_par_iter()
            .map(|rep| self.run_once(rep))
            .collect()
    }
}
