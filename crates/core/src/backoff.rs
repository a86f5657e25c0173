//! Backoff decisions.

use contention_types::{DrawSource, WindowLevel};

/// A policy's backoff decision: the chosen window and the counter drawn from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Chosen rung of the contention-window ladder.
    pub level: WindowLevel,

    /// Ticks of idle medium to wait before attempting. Signed: a counter
    /// drawn as 0 goes negative on its first decrement and fires at once.
    pub counter: i32,
}

impl Backoff {
    /// Draw a counter uniformly from `[0, window - 1]` at `level`.
    pub fn draw<D: DrawSource>(level: WindowLevel, draws: &mut D) -> Self {
        let window = i32::from(level.window());
        Self {
            level,
            counter: draws.uniform_int(0, window - 1),
        }
    }
}
