//! Contention Simulator
//!
//! Experiment driver built on top of the simulation framework. Runs one
//! backoff policy against a shared channel for a fixed number of ticks and
//! turns the result into reports.
//!
//! # Architecture
//!
//! The simulator builds on `contention-simulation` to provide:
//!
//! - **Configuration**: one parameter point plus tick budget, seed and repetitions
//! - **Sweeps**: node-count, generation-probability and exploration-rate grids
//! - **Metrics Collection**: access-delay percentiles, channel occupancy
//! - **Reports**: console summary, JSON, and an append-only CSV file
//!
//! # Example
//!
//! ```ignore
//! use contention_policy::PolicyKind;
//! use contention_simulator::{append_csv, Simulator, SimulatorConfig};
//! use std::path::Path;
//!
//! let config = SimulatorConfig::new(100, PolicyKind::QLearningDynamic)
//!     .with_generation_probability(0.05)
//!     .with_repetitions(3);
//!
//! let reports = Simulator::new(config)?.run()?;
//! for report in &reports {
//!     report.print();
//! }
//! append_csv(Path::new("data/output.csv"), &reports)?;
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod sweep;

pub use config::SimulatorConfig;
pub use error::SimulatorError;
pub use metrics::{AccessDelaySummary, MetricsCollector};
pub use report::{append_csv, RunReport, CSV_HEADER};
pub use runner::Simulator;
pub use sweep::{run_sweep, Sweep, DEFAULT_SWEEP_REPETITIONS, GENERATION_PROBABILITIES};
