//! Tick loop.

use crate::{Channel, Resolution, SimulationStats};
use contention_node::Node;
use contention_policy::PolicyKind;
use contention_types::{
    check_exploration_rate, check_generation_probability, ConfigError, DrawSource, NodeId,
    SimRng, Tick,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Parameters of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of contending nodes.
    pub num_nodes: usize,

    /// Per-tick packet-generation probability of every node.
    pub generation_probability: f64,

    /// Backoff policy every node runs.
    pub policy: PolicyKind,

    /// Exploration rate handed to the policy.
    pub epsilon: f64,

    /// Seed from which every node's draw source is derived.
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_nodes: 100,
            generation_probability: 0.02,
            policy: PolicyKind::Baseline,
            epsilon: 0.1,
            seed: 12345,
        }
    }
}

impl RunConfig {
    /// Check every parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_nodes == 0 {
            return Err(ConfigError::ZeroNodes);
        }
        check_generation_probability(self.generation_probability)?;
        check_exploration_rate(self.epsilon)?;
        Ok(())
    }
}

/// Drives nodes and the channel through discrete ticks.
///
/// Within a tick every node steps against the same channel occupancy, then
/// the channel resolves the tick's attempts. Given the same seed (or the
/// same draw sources) a run is exactly reproducible.
pub struct SimulationRunner<D = SimRng> {
    nodes: Vec<Node<D>>,
    channel: Channel,
    /// Ticks executed so far.
    now: Tick,
}

impl SimulationRunner<SimRng> {
    /// Build a run of `config.num_nodes` nodes running `config.policy`.
    pub fn new(config: &RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let nodes = (0..config.num_nodes as u32)
            .map(|i| {
                let policy = config.policy.build(config.epsilon)?;
                Node::new(
                    NodeId(i),
                    config.generation_probability,
                    policy,
                    SimRng::for_node(config.seed, i),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            nodes = config.num_nodes,
            policy = %config.policy,
            p = config.generation_probability,
            epsilon = config.epsilon,
            seed = config.seed,
            "Simulation built"
        );

        Self::from_nodes(nodes)
    }
}

impl<D: DrawSource> SimulationRunner<D> {
    /// Build a run from pre-constructed nodes.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroNodes`] if `nodes` is empty
    /// - [`ConfigError::NodeIndex`] if a node's id differs from its position
    pub fn from_nodes(nodes: Vec<Node<D>>) -> Result<Self, ConfigError> {
        if nodes.is_empty() {
            return Err(ConfigError::ZeroNodes);
        }
        if let Some((index, node)) = nodes
            .iter()
            .enumerate()
            .find(|(i, n)| n.id().index() != *i)
        {
            return Err(ConfigError::NodeIndex {
                index,
                id: node.id().get(),
            });
        }

        let channel = Channel::new(nodes.len());
        Ok(Self {
            nodes,
            channel,
            now: Tick::ZERO,
        })
    }

    pub fn nodes(&self) -> &[Node<D>] {
        &self.nodes
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Ticks executed so far.
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Counters of the run so far.
    pub fn stats(&self) -> SimulationStats {
        SimulationStats {
            ticks: self.now.0,
            channel: *self.channel.stats(),
        }
    }

    /// Execute one tick.
    pub fn step(&mut self) -> Resolution {
        for node in self.nodes.iter_mut() {
            node.tick(&mut self.channel);
        }
        let resolution = self.channel.tick(&mut self.nodes);
        self.now = self.now.next();
        resolution
    }

    /// Execute `ticks` ticks.
    pub fn run(&mut self, ticks: u64) -> Result<SimulationStats, ConfigError> {
        self.run_with(ticks, |_, _| {})
    }

    /// Execute `ticks` ticks, handing every resolution to `observer`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTicks`] if `ticks` is zero.
    pub fn run_with<F>(&mut self, ticks: u64, mut observer: F) -> Result<SimulationStats, ConfigError>
    where
        F: FnMut(Tick, &Resolution),
    {
        if ticks == 0 {
            return Err(ConfigError::ZeroTicks);
        }

        info!(nodes = self.nodes.len(), ticks, "Simulation started");
        for _ in 0..ticks {
            let tick = self.now;
            let resolution = self.step();
            observer(tick, &resolution);
        }

        let stats = self.stats();
        info!(
            ticks = stats.ticks,
            successes = stats.channel.successful_transmissions,
            attempts = stats.channel.total_transmissions,
            collisions = stats.channel.collisions,
            "Simulation complete"
        );
        Ok(stats)
    }
}
