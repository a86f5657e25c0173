//! Tabular Q-learning over the contention-window ladder.
//!
//! # Model
//!
//! - **State**: a contention level on the ladder, the node's perceived
//!   congestion. Success moves it one rung down, collision one rung up.
//! - **Action**: the ladder level to draw the next backoff from.
//! - **Selection**: Boltzmann (softmax) over the current state's row.
//! - **Update**: one-step Bellman backup toward `reward + γ · max Q[next]`.
//!
//! ```text
//! success   : next = max(0, s - 1)          reward =  20 + a
//! collision : next = min(levels - 1, s + 1) reward = -2^(levels - a)
//! ```
//!
//! Q-values start at `2 · a` for every state, favouring larger windows.

use contention_core::{Backoff, BackoffPolicy};
use contention_types::{
    check_discount, check_positive, ConfigError, DrawSource, WindowLevel, CW_LEVELS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// How the learning rate evolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlphaMode {
    /// Constant learning rate.
    #[default]
    Fixed,

    /// `α = 1 / (1 + visits(s, a))`, recomputed before every update after
    /// counting the visit being updated.
    Dynamic,
}

impl fmt::Display for AlphaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlphaMode::Fixed => write!(f, "fixed"),
            AlphaMode::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Q-learning configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QLearningConfig {
    /// Learning rate used in fixed mode.
    pub learning_rate: f64,

    /// Discount factor γ.
    pub discount: f64,

    /// Softmax temperature. Higher explores more.
    pub temperature: f64,

    /// Learning-rate mode.
    pub alpha_mode: AlphaMode,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.8,
            temperature: 1.0,
            alpha_mode: AlphaMode::Fixed,
        }
    }
}

impl QLearningConfig {
    /// Default configuration with the given learning-rate mode.
    pub fn with_alpha_mode(mut self, alpha_mode: AlphaMode) -> Self {
        self.alpha_mode = alpha_mode;
        self
    }

    /// Set the discount factor.
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    /// Set the softmax temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Check every parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("learning rate", self.learning_rate)?;
        check_discount(self.discount)?;
        check_positive("temperature", self.temperature)?;
        Ok(())
    }
}

/// Reward for a delivered packet sent at `action`.
pub fn success_reward(action: WindowLevel) -> f64 {
    20.0 + action.index() as f64
}

/// Reward (negative) for a collision at `action`.
///
/// Exponential in the distance to the top of the ladder: -1024 at the
/// bottom, -2 at the top.
pub fn collision_penalty(action: WindowLevel) -> f64 {
    -(2f64.powi(action.rungs_to_top() as i32))
}

/// Tabular Q-learning backoff policy.
#[derive(Debug, Clone)]
pub struct QLearningPolicy {
    config: QLearningConfig,
    /// Action values indexed by `[state][action]`.
    q: [[f64; CW_LEVELS]; CW_LEVELS],
    /// Update counts indexed by `[state][action]`. Only advanced in dynamic mode.
    visits: [[u32; CW_LEVELS]; CW_LEVELS],
    /// Current contention state.
    state: WindowLevel,
    /// Action chosen by the latest selection; feedback is credited to it.
    action: WindowLevel,
    /// Learning rate applied by the latest update.
    alpha: f64,
}

impl QLearningPolicy {
    /// Create a policy in the least-contended state.
    pub fn new(config: QLearningConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut q = [[0.0; CW_LEVELS]; CW_LEVELS];
        for row in q.iter_mut() {
            for (a, value) in row.iter_mut().enumerate() {
                *value = a as f64 * 2.0;
            }
        }
        Ok(Self {
            config,
            q,
            visits: [[0; CW_LEVELS]; CW_LEVELS],
            state: WindowLevel::BOTTOM,
            action: WindowLevel::BOTTOM,
            alpha: config.learning_rate,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    /// Current contention state.
    pub fn state(&self) -> WindowLevel {
        self.state
    }

    /// Action value for a (state, action) pair.
    pub fn q_value(&self, state: WindowLevel, action: WindowLevel) -> f64 {
        self.q[state.index()][action.index()]
    }

    /// Update count for a (state, action) pair.
    pub fn visits(&self, state: WindowLevel, action: WindowLevel) -> u32 {
        self.visits[state.index()][action.index()]
    }

    /// Learning rate used by the most recent update.
    ///
    /// Before any update this is the configured learning rate.
    pub fn learning_rate(&self) -> f64 {
        self.alpha
    }

    /// Softmax selection over the current state's row.
    ///
    /// Exponentials are shifted by the row maximum before summing; the
    /// selection probabilities are unchanged and large Q-values cannot
    /// overflow.
    fn softmax_select<D: DrawSource>(&self, draws: &mut D) -> WindowLevel {
        let row = &self.q[self.state.index()];
        let t = self.config.temperature;
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut weights = [0.0; CW_LEVELS];
        let mut total = 0.0;
        for (w, &q) in weights.iter_mut().zip(row.iter()) {
            *w = ((q - max) / t).exp();
            total += *w;
        }

        let roll = draws.uniform_real() * total;
        let mut cumulative = 0.0;
        for (a, w) in weights.iter().enumerate() {
            cumulative += w;
            if roll <= cumulative {
                return WindowLevel::new(a);
            }
        }
        // Only reachable if the row holds NaN
        self.action
    }

    /// One Bellman backup for the current (state, action), then move to `next`.
    fn update(&mut self, reward: f64, next: WindowLevel) {
        let (s, a) = (self.state.index(), self.action.index());
        let max_next = self.q[next.index()]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        self.alpha = match self.config.alpha_mode {
            AlphaMode::Fixed => self.config.learning_rate,
            AlphaMode::Dynamic => {
                self.visits[s][a] += 1;
                1.0 / (1.0 + f64::from(self.visits[s][a]))
            }
        };

        let target = reward + self.config.discount * max_next;
        self.q[s][a] += self.alpha * (target - self.q[s][a]);

        trace!(
            state = s,
            action = a,
            reward,
            alpha = self.alpha,
            q = self.q[s][a],
            next = next.index(),
            "Q-value updated"
        );

        self.state = next;
    }
}

impl BackoffPolicy for QLearningPolicy {
    fn select_backoff<D: DrawSource>(&mut self, _ticks_alive: u32, draws: &mut D) -> Backoff {
        self.action = self.softmax_select(draws);
        Backoff::draw(self.action, draws)
    }

    fn on_success(&mut self) {
        self.update(success_reward(self.action), self.state.down());
    }

    fn on_collision(&mut self) {
        self.update(collision_penalty(self.action), self.state.up());
    }

    fn level(&self) -> WindowLevel {
        self.action
    }
}
