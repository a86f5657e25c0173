//! Backoff-selection policies.
//!
//! Three interchangeable policies choose a rung of the contention-window
//! ladder for every contention round and learn (or not) from the outcome:
//!
//! - [`BaselinePolicy`] - binary exponential backoff
//! - [`BanditPolicy`] - multi-armed bandit, UCB1 or epsilon-greedy
//! - [`QLearningPolicy`] - tabular Q-learning with softmax selection
//!
//! The set is closed, so nodes hold a [`Policy`] enum and dispatch by match.
//! [`PolicyKind`] names each variant (with the numeric strategy codes used in
//! run reports) and builds it from run parameters.

mod bandit;
mod baseline;
mod q_learning;

pub use bandit::{BanditConfig, BanditPolicy, DecisionMode, DEFAULT_EXPLORATION_CONSTANT};
pub use baseline::BaselinePolicy;
pub use q_learning::{AlphaMode, QLearningConfig, QLearningPolicy};


use contention_core::{Backoff, BackoffPolicy};
use contention_types::{ConfigError, DrawSource, WindowLevel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Policy variants, as selected for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Binary exponential backoff.
    #[default]
    Baseline,

    /// Bandit with UCB1 selection.
    BanditUcb1,

    /// Bandit with epsilon-greedy selection.
    BanditEpsilonGreedy,

    /// Q-learning with a constant learning rate.
    QLearningFixed,

    /// Q-learning with a visit-count learning rate.
    QLearningDynamic,
}

impl PolicyKind {
    /// Every kind, in strategy-code order.
    pub const ALL: [PolicyKind; 5] = [
        PolicyKind::Baseline,
        PolicyKind::BanditUcb1,
        PolicyKind::BanditEpsilonGreedy,
        PolicyKind::QLearningFixed,
        PolicyKind::QLearningDynamic,
    ];

    /// Numeric strategy code written to run reports.
    pub fn code(self) -> u8 {
        match self {
            PolicyKind::Baseline => 0,
            PolicyKind::BanditUcb1 => 1,
            PolicyKind::BanditEpsilonGreedy => 2,
            PolicyKind::QLearningFixed => 3,
            PolicyKind::QLearningDynamic => 4,
        }
    }

    /// Kind for a strategy code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    /// Short name accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Baseline => "baseline",
            PolicyKind::BanditUcb1 => "ucb1",
            PolicyKind::BanditEpsilonGreedy => "e-greedy",
            PolicyKind::QLearningFixed => "q-fixed",
            PolicyKind::QLearningDynamic => "q-dynamic",
        }
    }

    /// Build a fresh policy of this kind.
    ///
    /// `epsilon` is the exploration rate; it is validated for every kind but
    /// only consumed by epsilon-greedy.
    pub fn build(self, epsilon: f64) -> Result<Policy, ConfigError> {
        contention_types::check_exploration_rate(epsilon)?;
        let policy = match self {
            PolicyKind::Baseline => Policy::Baseline(BaselinePolicy::new()),
            PolicyKind::BanditUcb1 => {
                Policy::Bandit(BanditPolicy::new(BanditConfig::ucb1().with_epsilon(epsilon))?)
            }
            PolicyKind::BanditEpsilonGreedy => {
                Policy::Bandit(BanditPolicy::new(BanditConfig::epsilon_greedy(epsilon))?)
            }
            PolicyKind::QLearningFixed => Policy::QLearning(QLearningPolicy::new(
                QLearningConfig::default().with_alpha_mode(AlphaMode::Fixed),
            )?),
            PolicyKind::QLearningDynamic => Policy::QLearning(QLearningPolicy::new(
                QLearningConfig::default().with_alpha_mode(AlphaMode::Dynamic),
            )?),
        };
        Ok(policy)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognized policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown policy: {0} (expected baseline, ucb1, e-greedy, q-fixed, q-dynamic or 0-4)")]
pub struct UnknownPolicy(pub String);

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baseline" | "beb" => Ok(PolicyKind::Baseline),
            "ucb1" | "ucb" | "mab-ucb1" => Ok(PolicyKind::BanditUcb1),
            "e-greedy" | "egreedy" | "epsilon-greedy" | "mab-egreedy" => {
                Ok(PolicyKind::BanditEpsilonGreedy)
            }
            "q-fixed" | "qlearning" | "q-learning" => Ok(PolicyKind::QLearningFixed),
            "q-dynamic" => Ok(PolicyKind::QLearningDynamic),
            other => other
                .parse::<u8>()
                .ok()
                .and_then(PolicyKind::from_code)
                .ok_or_else(|| UnknownPolicy(s.to_string())),
        }
    }
}

/// A node's backoff policy.
#[derive(Debug, Clone)]
pub enum Policy {
    Baseline(BaselinePolicy),
    Bandit(BanditPolicy),
    QLearning(QLearningPolicy),
}

impl Policy {
    /// Kind of this policy.
    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Baseline(_) => PolicyKind::Baseline,
            Policy::Bandit(b) => match b.config().mode {
                DecisionMode::Ucb1 => PolicyKind::BanditUcb1,
                DecisionMode::EpsilonGreedy => PolicyKind::BanditEpsilonGreedy,
            },
            Policy::QLearning(q) => match q.config().alpha_mode {
                AlphaMode::Fixed => PolicyKind::QLearningFixed,
                AlphaMode::Dynamic => PolicyKind::QLearningDynamic,
            },
        }
    }
}

impl From<BaselinePolicy> for Policy {
    fn from(policy: BaselinePolicy) -> Self {
        Policy::Baseline(policy)
    }
}

impl From<BanditPolicy> for Policy {
    fn from(policy: BanditPolicy) -> Self {
        Policy::Bandit(policy)
    }
}

impl From<QLearningPolicy> for Policy {
    fn from(policy: QLearningPolicy) -> Self {
        Policy::QLearning(policy)
    }
}

impl BackoffPolicy for Policy {
    fn select_backoff<D: DrawSource>(&mut self, ticks_alive: u32, draws: &mut D) -> Backoff {
        match self {
            Policy::Baseline(p) => p.select_backoff(ticks_alive, draws),
            Policy::Bandit(p) => p.select_backoff(ticks_alive, draws),
            Policy::QLearning(p) => p.select_backoff(ticks_alive, draws),
        }
    }

    fn on_success(&mut self) {
        match self {
            Policy::Baseline(p) => p.on_success(),
            Policy::Bandit(p) => p.on_success(),
            Policy::QLearning(p) => p.on_success(),
        }
    }

    fn on_collision(&mut self) {
        match self {
            Policy::Baseline(p) => p.on_collision(),
            Policy::Bandit(p) => p.on_collision(),
            Policy::QLearning(p) => p.on_collision(),
        }
    }

    fn level(&self) -> WindowLevel {
        match self {
            Policy::Baseline(p) => p.level(),
            Policy::Bandit(p) => p.level(),
            Policy::QLearning(p) => p.level(),
        }
    }
}
