//! Shared wireless channel.
//!
//! The channel is the only shared mutable resource of a run. During the
//! node phase of a tick it is read (occupancy) and appended to (attempt
//! registrations) through [`Medium`]; afterwards [`Channel::tick`] resolves
//! the tick's registrations against the node table.

use contention_core::Medium;
use contention_node::Node;
use contention_types::{bits_per_tick, DrawSource, NodeId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Utilization counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    /// Attempts that were the only attempt in their tick.
    pub successful_transmissions: u64,

    /// Every registered attempt; each participant of a collision counts once.
    pub total_transmissions: u64,

    /// Collision events; one per colliding tick regardless of participants.
    pub collisions: u64,

    /// Payload bits delivered by successful transmissions.
    pub bits_delivered: u64,
}

/// What the channel did in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A transmission (or collision) still occupied the medium.
    Busy {
        /// Ticks of occupancy left after this one.
        remaining: u32,
    },

    /// Nobody attempted.
    Idle,

    /// Exactly one node attempted and its packet was delivered.
    Success {
        node: NodeId,
        /// Packet length; the medium is occupied for this many ticks.
        duration: u32,
        /// Ticks the packet waited in the node, generation tick included.
        access_delay: u64,
    },

    /// Two or more nodes attempted; nothing was delivered.
    Collision {
        participants: usize,
        /// Longest colliding packet; the medium is occupied for this many ticks.
        duration: u32,
    },
}

/// The shared medium.
#[derive(Debug)]
pub struct Channel {
    /// Ticks left in the transmission currently occupying the medium.
    remaining: u32,

    /// Attempts registered this tick. Empty outside the node phase.
    registrants: Vec<NodeId>,

    stats: ChannelStats,
}

impl Channel {
    /// Create an idle channel sized for `max_nodes` contenders.
    pub fn new(max_nodes: usize) -> Self {
        Self {
            remaining: 0,
            registrants: Vec::with_capacity(max_nodes),
            stats: ChannelStats::default(),
        }
    }

    /// Ticks left in the current occupancy; 0 when idle.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Attempts registered so far this tick.
    pub fn pending(&self) -> &[NodeId] {
        &self.registrants
    }

    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    /// Resolve this tick.
    ///
    /// Must run after every node has stepped. Invokes exactly one outcome
    /// callback on every registered node, then clears the registrations.
    ///
    /// # Panics
    ///
    /// Panics if a registered [`NodeId`] is not an index into `nodes`.
    pub fn tick<D: DrawSource>(&mut self, nodes: &mut [Node<D>]) -> Resolution {
        if self.remaining > 0 {
            // Nodes only register after observing an idle medium
            debug_assert!(self.registrants.is_empty());
            self.remaining -= 1;
            return Resolution::Busy {
                remaining: self.remaining,
            };
        }

        let resolution = match self.registrants.len() {
            0 => Resolution::Idle,

            1 => {
                let id = self.registrants[0];
                let node = &mut nodes[id.index()];
                let duration = node.packet_duration();
                let access_delay = node.packet_age();

                self.remaining = duration;
                self.stats.successful_transmissions += 1;
                self.stats.total_transmissions += 1;
                self.stats.bits_delivered += u64::from(duration) * bits_per_tick();

                node.on_success();
                trace!(node = %id, duration, access_delay, "Transmission delivered");

                Resolution::Success {
                    node: id,
                    duration,
                    access_delay,
                }
            }

            participants => {
                self.stats.collisions += 1;
                let mut longest = 0;
                for &id in &self.registrants {
                    let node = &mut nodes[id.index()];
                    self.stats.total_transmissions += 1;
                    longest = longest.max(node.packet_duration());
                    node.on_collision();
                }
                self.remaining = longest;
                debug!(participants, duration = longest, "Collision");

                Resolution::Collision {
                    participants,
                    duration: longest,
                }
            }
        };

        self.registrants.clear();
        resolution
    }
}

impl Medium for Channel {
    fn is_idle(&self) -> bool {
        self.remaining == 0
    }

    fn register(&mut self, node: NodeId) {
        self.registrants.push(node);
    }
}
