//! Contention-window ladder and access timing constants.
//!
//! The ladder is the shared action space of every backoff policy: a policy
//! never picks a raw window size, it picks a [`WindowLevel`] and the ladder
//! maps it to a window.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of rungs on the contention-window ladder.
pub const CW_LEVELS: usize = 10;

/// Contention-window sizes, doubling from 8 to 4096.
pub const CW_LADDER: [u16; CW_LEVELS] = [8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096];

/// Inter-frame space, in ticks, that must be observed idle before contention.
pub const DIFS: u32 = 3;

/// Shortest packet a node generates, in ticks.
pub const MIN_PACKET_DURATION: u32 = 2;

/// Longest packet a node generates, in ticks.
pub const MAX_PACKET_DURATION: u32 = 5;

/// Duration of one tick in seconds.
pub const TICK_DURATION_SECS: f64 = 10e-6;

/// Physical-layer bit rate in bits per second.
pub const PHY_RATE_BPS: f64 = 6e6;

/// Bits carried by one tick of a successful transmission.
pub fn bits_per_tick() -> u64 {
    (PHY_RATE_BPS * TICK_DURATION_SECS) as u64
}

/// Index into [`CW_LADDER`].
///
/// Always in `0..CW_LEVELS`; every constructor clamps.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WindowLevel(usize);

impl WindowLevel {
    /// Smallest window.
    pub const BOTTOM: Self = WindowLevel(0);

    /// Largest window.
    pub const TOP: Self = WindowLevel(CW_LEVELS - 1);

    /// Create a level, clamping to the top of the ladder.
    pub fn new(index: usize) -> Self {
        WindowLevel(index.min(CW_LEVELS - 1))
    }

    /// Iterate over every level, bottom first.
    pub fn all() -> impl Iterator<Item = WindowLevel> {
        (0..CW_LEVELS).map(WindowLevel)
    }

    /// Position on the ladder.
    pub fn index(self) -> usize {
        self.0
    }

    /// Contention-window size at this level.
    pub fn window(self) -> u16 {
        CW_LADDER[self.0]
    }

    /// One rung up (double the window), saturating at [`WindowLevel::TOP`].
    pub fn up(self) -> Self {
        WindowLevel::new(self.0 + 1)
    }

    /// One rung down (halve the window), saturating at [`WindowLevel::BOTTOM`].
    pub fn down(self) -> Self {
        WindowLevel(self.0.saturating_sub(1))
    }

    /// Number of rungs between this level and the top of the ladder, inclusive.
    ///
    /// Used for collision penalty shaping: 10 at the bottom, 1 at the top.
    pub fn rungs_to_top(self) -> usize {
        CW_LEVELS - self.0
    }
}

impl fmt::Display for WindowLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CW{}({})", self.0, self.window())
    }
}
