//! Test helpers for the contention simulator.
//!
//! [`ScriptedDraws`] replaces the seeded draw source in tests that need to
//! force a specific sequence of decisions: a packet generated on a given
//! tick, a backoff counter of exactly zero, a particular exploration roll.

use contention_core::Medium;
use contention_types::{DrawSource, NodeId};
use std::collections::VecDeque;

/// A draw source that replays scripted values.
///
/// Integer draws pop from the integer script and are clamped to the
/// requested range; once exhausted they return the lower bound. Real draws
/// pop from the real script; once exhausted they return the fallback
/// (0.0 unless set), which makes `uniform_real() < p` true for any `p > 0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDraws {
    ints: VecDeque<i32>,
    reals: VecDeque<f64>,
    real_fallback: f64,
    int_calls: usize,
    real_calls: usize,
}

impl ScriptedDraws {
    /// Create a draw source with empty scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue integer draws.
    pub fn with_ints(mut self, ints: impl IntoIterator<Item = i32>) -> Self {
        self.ints.extend(ints);
        self
    }

    /// Queue real draws.
    pub fn with_reals(mut self, reals: impl IntoIterator<Item = f64>) -> Self {
        self.reals.extend(reals);
        self
    }

    /// Value returned by real draws once the script is exhausted.
    pub fn with_real_fallback(mut self, value: f64) -> Self {
        self.real_fallback = value;
        self
    }

    /// Number of integer draws made so far.
    pub fn int_calls(&self) -> usize {
        self.int_calls
    }

    /// Number of real draws made so far.
    pub fn real_calls(&self) -> usize {
        self.real_calls
    }
}

impl DrawSource for ScriptedDraws {
    fn uniform_int(&mut self, low: i32, high: i32) -> i32 {
        self.int_calls += 1;
        match self.ints.pop_front() {
            Some(v) => v.clamp(low, high.max(low)),
            None => low,
        }
    }

    fn uniform_real(&mut self) -> f64 {
        self.real_calls += 1;
        self.reals.pop_front().unwrap_or(self.real_fallback)
    }
}

/// Draws for a node that generates a packet of `duration` ticks on its first
/// tick and picks a backoff counter of zero.
///
/// The first integer draw is the packet duration, the second the backoff
/// counter drawn when the inter-frame space elapses.
pub fn immediate_sender(duration: i32) -> ScriptedDraws {
    ScriptedDraws::new().with_ints([duration, 0])
}

/// A medium whose occupancy is set by the test and which records every
/// registered attempt.
#[derive(Debug, Clone)]
pub struct RecordingMedium {
    /// Occupancy reported to nodes.
    pub idle: bool,
    /// Attempts registered since the last [`RecordingMedium::take`].
    pub registered: Vec<NodeId>,
}

impl RecordingMedium {
    /// An idle medium.
    pub fn idle() -> Self {
        Self {
            idle: true,
            registered: Vec::new(),
        }
    }

    /// A busy medium.
    pub fn busy() -> Self {
        Self {
            idle: false,
            registered: Vec::new(),
        }
    }

    /// Drain the recorded attempts.
    pub fn take(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.registered)
    }
}

impl Medium for RecordingMedium {
    fn is_idle(&self) -> bool {
        self.idle
    }

    fn register(&mut self, node: NodeId) {
        self.registered.push(node);
    }
}
