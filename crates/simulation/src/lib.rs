//! Deterministic contention simulation.
//!
//! This crate provides the shared channel and the tick loop that drives a
//! set of contending nodes against it. Given the same seed, it produces
//! identical results every run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SimulationRunner                       │
//! │                                                         │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     nodes: Vec<Node>                               │ │
//! │  │     Each steps once per tick, reading occupancy    │ │
//! │  │     and registering attempts through Medium        │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Channel::tick                                  │ │
//! │  │     busy │ idle │ success │ collision              │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     on_success / on_collision → node policies      │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod channel;
mod runner;
mod stats;

pub use channel::{Channel, ChannelStats, Resolution};
pub use runner::{RunConfig, SimulationRunner};
pub use stats::{delivery_ratio_pct, throughput_mbps, SimulationStats};
