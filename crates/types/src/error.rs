//! Configuration errors.

use thiserror::Error;

/// Invalid parameters rejected at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A run needs at least one node.
    #[error("Node count must be at least 1")]
    ZeroNodes,

    /// A run needs a positive tick budget.
    #[error("Tick budget must be positive")]
    ZeroTicks,

    /// An experiment needs at least one repetition.
    #[error("Repetition count must be at least 1")]
    ZeroRepetitions,

    /// Packet-generation probability outside `[0, 1]`.
    #[error("Packet-generation probability must be in [0, 1], got {0}")]
    GenerationProbability(f64),

    /// Exploration rate outside `[0, 1]`.
    #[error("Exploration rate must be in [0, 1], got {0}")]
    ExplorationRate(f64),

    /// A strictly positive parameter was zero, negative, or NaN.
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    /// Discount factor outside `[0, 1]`.
    #[error("Discount factor must be in [0, 1], got {0}")]
    Discount(f64),

    /// Node ids must equal their position in the node table.
    #[error("Node at index {index} has id {id}")]
    NodeIndex { index: usize, id: u32 },
}

/// Check that `value` is a probability.
pub(crate) fn is_unit(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Validate a packet-generation probability.
pub fn check_generation_probability(p: f64) -> Result<f64, ConfigError> {
    if is_unit(p) {
        Ok(p)
    } else {
        Err(ConfigError::GenerationProbability(p))
    }
}

/// Validate an exploration rate.
pub fn check_exploration_rate(epsilon: f64) -> Result<f64, ConfigError> {
    if is_unit(epsilon) {
        Ok(epsilon)
    } else {
        Err(ConfigError::ExplorationRate(epsilon))
    }
}

/// Validate a discount factor.
pub fn check_discount(gamma: f64) -> Result<f64, ConfigError> {
    if is_unit(gamma) {
        Ok(gamma)
    } else {
        Err(ConfigError::Discount(gamma))
    }
}

/// Validate a strictly positive parameter.
pub fn check_positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}
