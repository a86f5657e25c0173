//! Core traits for the access state machine and its collaborators.

use crate::Backoff;
use contention_types::{DrawSource, NodeId, WindowLevel};

/// A backoff-selection policy.
///
/// Each node exclusively owns one policy. The node's state machine asks the
/// policy for a backoff whenever contention (re)starts and reports every
/// channel outcome back to it. Policies are:
///
/// - **Synchronous**: No async, no `.await`
/// - **Deterministic**: Same state + same draws = same decisions
/// - **Pure-ish**: Mutates self, but performs no I/O
///
/// # Call order
///
/// ```text
/// IFS elapsed ──► select_backoff ──► ... ──► on_success
///                       ▲                        │
///                       └──── on_collision ◄─────┘ (on collision)
/// ```
///
/// After `on_collision` the node immediately calls `select_backoff` again and
/// re-enters backoff; after `on_success` the node returns to idle.
pub trait BackoffPolicy {
    /// Choose a contention window and draw a backoff counter from it.
    ///
    /// # Arguments
    ///
    /// * `ticks_alive` - Number of backoff selections the owning node has
    ///   made so far, including this one. Always at least 1.
    /// * `draws` - The node's draw source
    fn select_backoff<D: DrawSource>(&mut self, ticks_alive: u32, draws: &mut D) -> Backoff;

    /// The last transmission attempt was delivered.
    fn on_success(&mut self);

    /// The last transmission attempt collided.
    fn on_collision(&mut self);

    /// Window level the policy is currently using.
    fn level(&self) -> WindowLevel;
}

/// The shared medium as seen by a node during its tick step.
///
/// Nodes may only read occupancy and register an attempt. Resolution of
/// the registered attempts is the medium's own business and happens after
/// every node has stepped.
pub trait Medium {
    /// Whether no transmission currently occupies the medium.
    fn is_idle(&self) -> bool;

    /// Register a transmission attempt by `node` for this tick.
    fn register(&mut self, node: NodeId);
}
