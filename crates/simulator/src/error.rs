//! Error types for the simulator.

use contention_types::ConfigError;
use thiserror::Error;

/// Errors while running experiments or persisting their results.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// Invalid experiment parameters.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Report file could not be written.
    #[error("Report I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Metrics histogram could not be created.
    #[error("Metrics setup failed: {0}")]
    Metrics(#[from] hdrhistogram::CreationError),

    /// Report could not be serialized.
    #[error("Report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
