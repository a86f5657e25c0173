//! Per-node access state machine.

use contention_core::{Backoff, BackoffPolicy, Medium};
use contention_policy::Policy;
use contention_types::{
    check_generation_probability, ConfigError, DrawSource, NodeId, SimRng, WindowLevel, DIFS,
    MAX_PACKET_DURATION, MIN_PACKET_DURATION,
};
use std::fmt;
use tracing::trace;

/// Access state of a node. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AccessState {
    /// No contention in progress.
    #[default]
    Idle,

    /// Waiting for DIFS ticks of contiguous idle medium.
    InterFrameSpace,

    /// Counting the backoff down on idle ticks.
    Backoff,

    /// Registered with the channel, waiting for the outcome callback.
    Transmitting,
}

impl fmt::Display for AccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessState::Idle => write!(f, "Idle"),
            AccessState::InterFrameSpace => write!(f, "IFS"),
            AccessState::Backoff => write!(f, "Backoff"),
            AccessState::Transmitting => write!(f, "Transmitting"),
        }
    }
}

/// A contending node.
///
/// Holds at most one packet; a new packet is only generated while none is
/// queued. Each tick the node observes the medium's occupancy and advances
/// its access state:
///
/// ```text
///            packet queued
///   Idle ──────────────────► IFS ──(DIFS idle ticks)──► Backoff
///    ▲                        │ busy: counter = DIFS      │ busy: frozen
///    │                        └───────────┘               │ idle: counter -= 1
///    │ on_success                                         ▼ counter <= 0
///    └──────────────────── Transmitting ◄──── register with medium
///                               │
///                               └── on_collision ──► Backoff (new selection)
/// ```
///
/// A collided packet stays queued and is retried through backoff with the
/// window the policy picks after learning from the collision.
#[derive(Debug, Clone)]
pub struct Node<D = SimRng> {
    id: NodeId,

    /// Per-tick probability of generating a packet while none is queued.
    generation_probability: f64,

    policy: Policy,

    draws: D,

    state: AccessState,

    /// Ticks needed to transmit the queued packet; 0 when none is queued.
    packet_duration: u32,

    /// Ticks the queued packet has spent in the node, including this one.
    packet_age: u64,

    /// Latest backoff decision. The counter only moves in `Backoff`.
    backoff: Backoff,

    /// Remaining inter-frame space.
    ifs_counter: i32,

    /// Contention rounds started over the node's lifetime.
    ticks_alive: u32,
}

impl<D: DrawSource> Node<D> {
    /// Create a node.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::GenerationProbability`] if
    /// `generation_probability` is not in `[0, 1]`.
    pub fn new(
        id: NodeId,
        generation_probability: f64,
        policy: Policy,
        draws: D,
    ) -> Result<Self, ConfigError> {
        let generation_probability = check_generation_probability(generation_probability)?;
        let level = policy.level();
        Ok(Self {
            id,
            generation_probability,
            policy,
            draws,
            state: AccessState::Idle,
            packet_duration: 0,
            packet_age: 0,
            backoff: Backoff { level, counter: 0 },
            ifs_counter: 0,
            ticks_alive: 0,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn state(&self) -> AccessState {
        self.state
    }

    /// Ticks needed to transmit the queued packet; 0 when none is queued.
    pub fn packet_duration(&self) -> u32 {
        self.packet_duration
    }

    pub fn has_packet(&self) -> bool {
        self.packet_duration > 0
    }

    /// Ticks the queued packet has been waiting, counting the tick it was
    /// generated on. 0 when none is queued.
    pub fn packet_age(&self) -> u64 {
        self.packet_age
    }

    pub fn backoff_counter(&self) -> i32 {
        self.backoff.counter
    }

    pub fn ifs_counter(&self) -> i32 {
        self.ifs_counter
    }

    /// Window level the policy is currently on.
    pub fn level(&self) -> WindowLevel {
        self.policy.level()
    }

    /// Contention window the policy is currently on.
    pub fn contention_window(&self) -> u16 {
        self.policy.level().window()
    }

    pub fn ticks_alive(&self) -> u32 {
        self.ticks_alive
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Tick step
    // ═══════════════════════════════════════════════════════════════════════

    /// Advance one tick.
    ///
    /// Returns `true` if the node registered a transmission attempt with
    /// `medium` this tick.
    pub fn tick<M: Medium>(&mut self, medium: &mut M) -> bool {
        self.generate_packet_if_needed();
        if !self.has_packet() {
            return false;
        }
        self.packet_age += 1;

        let idle = medium.is_idle();
        match (self.state, idle) {
            (AccessState::Idle, _) => {
                self.state = AccessState::InterFrameSpace;
                self.ifs_counter = DIFS as i32;
                false
            }

            // The gap must be observed contiguously
            (AccessState::InterFrameSpace, false) => {
                self.ifs_counter = DIFS as i32;
                false
            }

            (AccessState::InterFrameSpace, true) => {
                self.ifs_counter -= 1;
                if self.ifs_counter > 0 {
                    return false;
                }
                self.start_backoff();
                false
            }

            // Frozen while the medium is busy
            (AccessState::Backoff, false) => false,

            (AccessState::Backoff, true) => {
                self.backoff.counter -= 1;
                if self.backoff.counter > 0 {
                    return false;
                }
                self.state = AccessState::Transmitting;
                medium.register(self.id);
                trace!(node = %self.id, level = %self.backoff.level, "Transmission attempt");
                true
            }

            (AccessState::Transmitting, _) => false,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Channel callbacks
    // ═══════════════════════════════════════════════════════════════════════

    /// The attempt registered this tick was delivered.
    pub fn on_success(&mut self) {
        debug_assert_eq!(self.state, AccessState::Transmitting);
        self.policy.on_success();
        self.packet_duration = 0;
        self.packet_age = 0;
        self.state = AccessState::Idle;
    }

    /// The attempt registered this tick collided.
    ///
    /// The packet stays queued and the node re-enters backoff directly,
    /// skipping the inter-frame space.
    pub fn on_collision(&mut self) {
        debug_assert_eq!(self.state, AccessState::Transmitting);
        self.policy.on_collision();
        self.start_backoff();
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Internal
    // ═══════════════════════════════════════════════════════════════════════

    fn generate_packet_if_needed(&mut self) {
        if self.has_packet() {
            return;
        }
        if self.draws.uniform_real() < self.generation_probability {
            let duration = self
                .draws
                .uniform_int(MIN_PACKET_DURATION as i32, MAX_PACKET_DURATION as i32);
            self.packet_duration = duration.max(MIN_PACKET_DURATION as i32) as u32;
            self.packet_age = 0;
        }
    }

    fn start_backoff(&mut self) {
        self.ticks_alive += 1;
        self.backoff = self.policy.select_backoff(self.ticks_alive, &mut self.draws);
        self.state = AccessState::Backoff;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contention_policy::{BaselinePolicy, PolicyKind};
    use contention_test_helpers::{immediate_sender, RecordingMedium, ScriptedDraws};

    fn baseline_node(draws: ScriptedDraws) -> Node<ScriptedDraws> {
        Node::new(NodeId(0), 1.0, BaselinePolicy::new().into(), draws).unwrap()
    }

    /// Step an idle-medium node from its first tick into `Backoff`.
    fn into_backoff(node: &mut Node<ScriptedDraws>, medium: &mut RecordingMedium) {
        // Generate + Idle -> IFS, then DIFS idle ticks
        for _ in 0..=DIFS {
            node.tick(medium);
        }
        assert_eq!(node.state(), AccessState::Backoff);
    }

    #[test]
    fn test_no_packet_no_state_change() {
        let draws = ScriptedDraws::new().with_real_fallback(0.5);
        let mut node = Node::new(NodeId(1), 0.2, BaselinePolicy::new().into(), draws).unwrap();
        let mut medium = RecordingMedium::idle();

        for _ in 0..10 {
            assert!(!node.tick(&mut medium));
            assert_eq!(node.state(), AccessState::Idle);
            assert!(!node.has_packet());
        }
    }

    #[test]
    fn test_packet_duration_in_range() {
        let mut node = baseline_node(ScriptedDraws::new().with_ints([4]));
        let mut medium = RecordingMedium::idle();
        node.tick(&mut medium);
        assert_eq!(node.packet_duration(), 4);
        assert_eq!(node.state(), AccessState::InterFrameSpace);
        assert_eq!(node.ifs_counter(), DIFS as i32);
    }

    #[test]
    fn test_ifs_resets_on_busy_medium() {
        let mut node = baseline_node(ScriptedDraws::new().with_ints([3, 5]));
        let mut medium = RecordingMedium::idle();

        node.tick(&mut medium); // Idle -> IFS
        node.tick(&mut medium); // 3 -> 2
        assert_eq!(node.ifs_counter(), 2);

        medium.idle = false;
        node.tick(&mut medium);
        assert_eq!(node.ifs_counter(), DIFS as i32);
        assert_eq!(node.state(), AccessState::InterFrameSpace);

        // Needs a full contiguous DIFS again
        medium.idle = true;
        node.tick(&mut medium);
        node.tick(&mut medium);
        assert_eq!(node.state(), AccessState::InterFrameSpace);
        node.tick(&mut medium);
        assert_eq!(node.state(), AccessState::Backoff);
    }

    #[test]
    fn test_ifs_never_completes_on_busy_medium() {
        let mut node = baseline_node(ScriptedDraws::new().with_ints([3]));
        let mut medium = RecordingMedium::busy();

        // Contention starts regardless of occupancy
        node.tick(&mut medium);
        assert_eq!(node.state(), AccessState::InterFrameSpace);

        for _ in 0..50 {
            assert!(!node.tick(&mut medium));
            assert_eq!(node.state(), AccessState::InterFrameSpace);
            assert_eq!(node.ifs_counter(), DIFS as i32);
        }
        assert_eq!(node.ticks_alive(), 0);
    }

    #[test]
    fn test_backoff_frozen_on_busy_medium() {
        let mut node = baseline_node(ScriptedDraws::new().with_ints([2, 5]));
        let mut medium = RecordingMedium::idle();
        into_backoff(&mut node, &mut medium);
        assert_eq!(node.backoff_counter(), 5);

        medium.idle = false;
        for _ in 0..20 {
            assert!(!node.tick(&mut medium));
            assert_eq!(node.backoff_counter(), 5);
            assert_eq!(node.state(), AccessState::Backoff);
        }

        medium.idle = true;
        node.tick(&mut medium);
        assert_eq!(node.backoff_counter(), 4);
    }

    #[test]
    fn test_backoff_expiry_registers_attempt() {
        let mut node = baseline_node(ScriptedDraws::new().with_ints([2, 2]));
        let mut medium = RecordingMedium::idle();
        into_backoff(&mut node, &mut medium);

        assert!(!node.tick(&mut medium)); // 2 -> 1
        assert!(node.tick(&mut medium)); // 1 -> 0
        assert_eq!(node.state(), AccessState::Transmitting);
        assert_eq!(medium.take(), vec![NodeId(0)]);

        // Passive until a callback arrives
        for _ in 0..5 {
            assert!(!node.tick(&mut medium));
        }
        assert_eq!(node.state(), AccessState::Transmitting);
        assert!(medium.registered.is_empty());
    }

    #[test]
    fn test_zero_counter_fires_on_first_idle_tick() {
        let mut node = baseline_node(immediate_sender(3));
        let mut medium = RecordingMedium::idle();
        into_backoff(&mut node, &mut medium);
        assert_eq!(node.backoff_counter(), 0);

        assert!(node.tick(&mut medium));
        assert_eq!(node.backoff_counter(), -1);
    }

    #[test]
    fn test_success_returns_to_idle() {
        let mut node = baseline_node(immediate_sender(3));
        let mut medium = RecordingMedium::idle();
        into_backoff(&mut node, &mut medium);
        node.tick(&mut medium);
        assert_eq!(node.packet_age(), 5);

        node.on_success();
        assert_eq!(node.state(), AccessState::Idle);
        assert_eq!(node.packet_duration(), 0);
        assert_eq!(node.packet_age(), 0);
        assert_eq!(node.level(), WindowLevel::BOTTOM);
    }

    #[test]
    fn test_collision_reenters_backoff_with_packet() {
        let mut node = baseline_node(ScriptedDraws::new().with_ints([4, 0, 9]));
        let mut medium = RecordingMedium::idle();
        into_backoff(&mut node, &mut medium);
        node.tick(&mut medium);

        node.on_collision();
        assert_eq!(node.state(), AccessState::Backoff);
        assert_eq!(node.packet_duration(), 4);
        assert_eq!(node.contention_window(), 16);
        assert_eq!(node.backoff_counter(), 9);
        assert_eq!(node.ticks_alive(), 2);
    }

    #[test]
    fn test_invalid_generation_probability_rejected() {
        for p in [-0.1, 1.01, f64::NAN] {
            let result = Node::new(
                NodeId(0),
                p,
                PolicyKind::Baseline.build(0.1).unwrap(),
                ScriptedDraws::new(),
            );
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_no_packet_implies_idle_over_random_run() {
        let policy = PolicyKind::QLearningDynamic.build(0.1).unwrap();
        let mut node = Node::new(NodeId(3), 0.3, policy, SimRng::seed_from_u64(9)).unwrap();
        let mut medium = RecordingMedium::idle();

        for t in 0..5_000u32 {
            medium.idle = t % 7 != 0;
            if node.tick(&mut medium) {
                medium.take();
                if t % 3 == 0 {
                    node.on_collision();
                } else {
                    node.on_success();
                }
            }
            if !node.has_packet() {
                assert_eq!(node.state(), AccessState::Idle);
            }
        }
    }
}
