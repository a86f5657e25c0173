//! Core types for the contention simulator.
//!
//! Leaf crate shared by every other crate in the workspace:
//!
//! - [`WindowLevel`] and the [`CW_LADDER`] it indexes, the action space of
//!   every backoff policy
//! - Timing constants ([`DIFS`], tick duration, PHY rate)
//! - [`DrawSource`], the uniform-draw contract, and [`SimRng`], its seeded
//!   implementation
//! - [`ConfigError`] and the validation helpers used at construction time

mod draw;
mod error;
mod identifiers;
mod ladder;

pub use draw::{DrawSource, SimRng};
pub use error::{
    check_discount, check_exploration_rate, check_generation_probability, check_positive,
    ConfigError,
};
pub use identifiers::{NodeId, Tick};
pub use ladder::{
    bits_per_tick, WindowLevel, CW_LADDER, CW_LEVELS, DIFS, MAX_PACKET_DURATION,
    MIN_PACKET_DURATION, PHY_RATE_BPS, TICK_DURATION_SECS,
};
