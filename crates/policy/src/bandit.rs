//! Multi-armed bandit over the contention-window ladder.
//!
//! Each ladder level is an arm. The bandit keeps a sample-mean value estimate
//! and a pull count per arm, and picks an arm with either UCB1 or
//! epsilon-greedy.
//!
//! ## Reward shaping
//!
//! ```text
//! success   :  20 + level             (larger windows earn slightly more)
//! collision : -10 * (levels - level)  (colliding at a small window costs most)
//! ```
//!
//! Initial estimates are `10 + level`, optimistic and increasing with the
//! window so that larger windows get tried early.

use contention_core::{Backoff, BackoffPolicy};
use contention_types::{
    check_exploration_rate, check_positive, ConfigError, DrawSource, WindowLevel, CW_LEVELS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Default UCB1 exploration constant.
pub const DEFAULT_EXPLORATION_CONSTANT: f64 = 0.0001;

/// Arm selection rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionMode {
    /// Upper confidence bound: untried arms first, then value plus a
    /// bonus that shrinks with the arm's pull count.
    Ucb1,

    /// Random arm with probability epsilon, greedy arm otherwise.
    #[default]
    EpsilonGreedy,
}

impl fmt::Display for DecisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionMode::Ucb1 => write!(f, "ucb1"),
            DecisionMode::EpsilonGreedy => write!(f, "e-greedy"),
        }
    }
}

/// Bandit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BanditConfig {
    /// Exploration probability for epsilon-greedy.
    pub epsilon: f64,

    /// Scale of the UCB1 exploration bonus.
    pub exploration_constant: f64,

    /// Arm selection rule.
    pub mode: DecisionMode,
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.2,
            exploration_constant: DEFAULT_EXPLORATION_CONSTANT,
            mode: DecisionMode::default(),
        }
    }
}

impl BanditConfig {
    /// UCB1 bandit with the default exploration constant.
    pub fn ucb1() -> Self {
        Self {
            mode: DecisionMode::Ucb1,
            ..Default::default()
        }
    }

    /// Epsilon-greedy bandit.
    pub fn epsilon_greedy(epsilon: f64) -> Self {
        Self {
            epsilon,
            mode: DecisionMode::EpsilonGreedy,
            ..Default::default()
        }
    }

    /// Set the exploration probability.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the UCB1 exploration constant.
    pub fn with_exploration_constant(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Check every parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_exploration_rate(self.epsilon)?;
        check_positive("exploration constant", self.exploration_constant)?;
        Ok(())
    }
}

/// Reward for a delivered packet sent at `level`.
pub fn success_reward(level: WindowLevel) -> f64 {
    20.0 + level.index() as f64
}

/// Reward (negative) for a collision at `level`.
pub fn collision_penalty(level: WindowLevel) -> f64 {
    -10.0 * level.rungs_to_top() as f64
}

/// Multi-armed bandit backoff policy.
#[derive(Debug, Clone)]
pub struct BanditPolicy {
    config: BanditConfig,
    /// Sample-mean value estimate per arm.
    values: [f64; CW_LEVELS],
    /// Times each arm has received feedback.
    pulls: [u32; CW_LEVELS],
    /// Arm chosen by the latest selection; feedback is credited to it.
    current: WindowLevel,
}

impl BanditPolicy {
    /// Create a bandit with optimistic initial estimates.
    pub fn new(config: BanditConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut values = [0.0; CW_LEVELS];
        for (i, v) in values.iter_mut().enumerate() {
            *v = 10.0 + i as f64;
        }
        Ok(Self {
            config,
            values,
            pulls: [0; CW_LEVELS],
            current: WindowLevel::BOTTOM,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &BanditConfig {
        &self.config
    }

    /// Current value estimate of an arm.
    pub fn value(&self, level: WindowLevel) -> f64 {
        self.values[level.index()]
    }

    /// Feedback count of an arm.
    pub fn pulls(&self, level: WindowLevel) -> u32 {
        self.pulls[level.index()]
    }

    /// Fold a reward into the estimate of the current arm.
    ///
    /// Incremental sample mean: `value += (reward - value) / pulls`, with
    /// `pulls` incremented first.
    pub fn update(&mut self, reward: f64) {
        let a = self.current.index();
        self.pulls[a] += 1;
        let n = self.pulls[a] as f64;
        self.values[a] += (reward - self.values[a]) / n;
        trace!(
            arm = a,
            reward,
            value = self.values[a],
            pulls = self.pulls[a],
            "Bandit estimate updated"
        );
    }

    fn select_ucb1(&self, ticks_alive: u32) -> WindowLevel {
        let log_t = f64::from(ticks_alive.max(1)).ln();
        let mut best = WindowLevel::BOTTOM;
        let mut best_score = f64::NEG_INFINITY;

        for level in WindowLevel::all() {
            let a = level.index();
            let score = if self.pulls[a] == 0 {
                f64::INFINITY
            } else {
                let bonus = (self.config.exploration_constant * log_t / self.pulls[a] as f64).sqrt();
                self.values[a] + bonus
            };
            // Strict comparison: first-seen wins ties
            if score > best_score {
                best_score = score;
                best = level;
            }
        }
        best
    }

    fn select_epsilon_greedy<D: DrawSource>(&self, draws: &mut D) -> WindowLevel {
        if draws.uniform_real() < self.config.epsilon {
            let arm = draws.uniform_int(0, CW_LEVELS as i32 - 1);
            return WindowLevel::new(arm.max(0) as usize);
        }
        self.greedy()
    }

    /// Arm with the highest estimate, first-seen wins ties.
    pub fn greedy(&self) -> WindowLevel {
        let mut best = WindowLevel::BOTTOM;
        let mut best_value = f64::NEG_INFINITY;
        for level in WindowLevel::all() {
            let v = self.values[level.index()];
            if v > best_value {
                best_value = v;
                best = level;
            }
        }
        best
    }
}

impl BackoffPolicy for BanditPolicy {
    fn select_backoff<D: DrawSource>(&mut self, ticks_alive: u32, draws: &mut D) -> Backoff {
        self.current = match self.config.mode {
            DecisionMode::Ucb1 => self.select_ucb1(ticks_alive),
            DecisionMode::EpsilonGreedy => self.select_epsilon_greedy(draws),
        };
        Backoff::draw(self.current, draws)
    }

    fn on_success(&mut self) {
        self.update(success_reward(self.current));
    }

    fn on_collision(&mut self) {
        self.update(collision_penalty(self.current));
    }

    fn level(&self) -> WindowLevel {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contention_test_helpers::ScriptedDraws;
    use std::collections::HashSet;

    #[test]
    fn test_reward_shaping() {
        assert_eq!(success_reward(WindowLevel::BOTTOM), 20.0);
        assert_eq!(success_reward(WindowLevel::TOP), 29.0);
        assert_eq!(collision_penalty(WindowLevel::BOTTOM), -100.0);
        assert_eq!(collision_penalty(WindowLevel::TOP), -10.0);
    }

    #[test]
    fn test_initial_estimates_optimistic_and_increasing() {
        let policy = BanditPolicy::new(BanditConfig::ucb1()).unwrap();
        for level in WindowLevel::all() {
            assert_eq!(policy.value(level), 10.0 + level.index() as f64);
            assert_eq!(policy.pulls(level), 0);
        }
    }

    #[test]
    fn test_ucb1_tries_every_arm_once() {
        let mut policy = BanditPolicy::new(BanditConfig::ucb1()).unwrap();
        let mut draws = ScriptedDraws::new();
        let mut seen = HashSet::new();

        for t in 1..=CW_LEVELS as u32 {
            let backoff = policy.select_backoff(t, &mut draws);
            assert_eq!(policy.pulls(backoff.level), 0, "Arm should be unpulled");
            assert!(seen.insert(backoff.level), "Arm picked twice");
            if t % 2 == 0 {
                policy.on_success();
            } else {
                policy.on_collision();
            }
        }
        assert_eq!(seen.len(), CW_LEVELS);
    }

    #[test]
    fn test_ucb1_first_unpulled_wins_ties() {
        let mut policy = BanditPolicy::new(BanditConfig::ucb1()).unwrap();
        let mut draws = ScriptedDraws::new();
        let backoff = policy.select_backoff(1, &mut draws);
        assert_eq!(backoff.level, WindowLevel::BOTTOM);
    }

    #[test]
    fn test_ucb1_exploits_after_exploration() {
        let mut policy = BanditPolicy::new(BanditConfig::ucb1()).unwrap();
        let mut draws = ScriptedDraws::new();
        for t in 1..=CW_LEVELS as u32 {
            policy.select_backoff(t, &mut draws);
            // Only the top arm ever succeeds
            if policy.level() == WindowLevel::TOP {
                policy.on_success();
            } else {
                policy.on_collision();
            }
        }
        let backoff = policy.select_backoff(CW_LEVELS as u32 + 1, &mut draws);
        assert_eq!(backoff.level, WindowLevel::TOP);
    }

    #[test]
    fn test_incremental_mean_update() {
        let mut policy = BanditPolicy::new(BanditConfig::ucb1()).unwrap();
        let mut draws = ScriptedDraws::new();
        policy.select_backoff(1, &mut draws);
        assert_eq!(policy.level(), WindowLevel::BOTTOM);

        // First pull replaces the optimistic seed entirely
        policy.update(30.0);
        assert_eq!(policy.value(WindowLevel::BOTTOM), 30.0);

        // Second pull averages
        policy.update(10.0);
        assert_eq!(policy.value(WindowLevel::BOTTOM), 20.0);
        assert_eq!(policy.pulls(WindowLevel::BOTTOM), 2);
    }

    #[test]
    fn test_epsilon_greedy_exploits_below_epsilon_roll() {
        let mut policy = BanditPolicy::new(BanditConfig::epsilon_greedy(0.1)).unwrap();
        // Roll 0.5 >= 0.1: greedy picks the highest initial estimate (top)
        let mut draws = ScriptedDraws::new().with_reals([0.5]);
        let backoff = policy.select_backoff(1, &mut draws);
        assert_eq!(backoff.level, WindowLevel::TOP);
    }

    #[test]
    fn test_epsilon_greedy_explores_on_low_roll() {
        let mut policy = BanditPolicy::new(BanditConfig::epsilon_greedy(0.1)).unwrap();
        // Roll 0.05 < 0.1: random arm 3, then backoff counter 0
        let mut draws = ScriptedDraws::new().with_reals([0.05]).with_ints([3, 0]);
        let backoff = policy.select_backoff(1, &mut draws);
        assert_eq!(backoff.level, WindowLevel::new(3));
        assert_eq!(backoff.counter, 0);
    }

    #[test]
    fn test_greedy_first_seen_wins_ties() {
        let mut policy = BanditPolicy::new(BanditConfig::epsilon_greedy(0.0)).unwrap();
        policy.values = [5.0; CW_LEVELS];
        assert_eq!(policy.greedy(), WindowLevel::BOTTOM);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(BanditPolicy::new(BanditConfig::epsilon_greedy(1.5)).is_err());
        assert!(BanditPolicy::new(BanditConfig::ucb1().with_exploration_constant(0.0)).is_err());
    }
}
