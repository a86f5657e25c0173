//! Binary exponential backoff.

use contention_core::{Backoff, BackoffPolicy};
use contention_types::{DrawSource, WindowLevel};
use tracing::trace;

/// Classic binary exponential backoff.
///
/// Starts at the bottom of the ladder, climbs one rung (doubling the window)
/// on every collision, saturating at the top, and drops back to the bottom
/// after any success.
#[derive(Debug, Clone, Default)]
pub struct BaselinePolicy {
    level: WindowLevel,
}

impl BaselinePolicy {
    /// Create a policy at the bottom of the ladder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BackoffPolicy for BaselinePolicy {
    fn select_backoff<D: DrawSource>(&mut self, _ticks_alive: u32, draws: &mut D) -> Backoff {
        Backoff::draw(self.level, draws)
    }

    fn on_success(&mut self) {
        self.level = WindowLevel::BOTTOM;
    }

    fn on_collision(&mut self) {
        self.level = self.level.up();
        trace!(level = %self.level, "Baseline window doubled");
    }

    fn level(&self) -> WindowLevel {
        self.level
    }
}
