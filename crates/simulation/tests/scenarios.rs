//! End-to-end scenarios driving nodes and the channel through the runner.

use contention_core::BackoffPolicy;
use contention_node::{AccessState, Node};
use contention_policy::{BaselinePolicy, Policy, PolicyKind};
use contention_simulation::{Resolution, RunConfig, SimulationRunner};
use contention_test_helpers::{immediate_sender, ScriptedDraws};
use contention_types::{NodeId, SimRng, WindowLevel, CW_LEVELS};
use std::collections::HashSet;

#[test]
fn test_single_baseline_node_delivers_once_in_twenty_ticks() {
    // Packet of 5 ticks, backoff 7; then the same again
    let draws = ScriptedDraws::new().with_ints([5, 7, 5, 7]);
    let node = Node::new(NodeId(0), 1.0, BaselinePolicy::new().into(), draws).unwrap();
    let mut runner = SimulationRunner::from_nodes(vec![node]).unwrap();

    let mut success_ticks = Vec::new();
    let stats = runner
        .run_with(20, |tick, resolution| {
            if let Resolution::Success { .. } = resolution {
                success_ticks.push(tick);
            }
        })
        .unwrap();

    assert_eq!(stats.channel.successful_transmissions, 1);
    assert_eq!(stats.channel.total_transmissions, 1);
    assert_eq!(stats.channel.collisions, 0);
    assert_eq!(stats.channel.bits_delivered, 300);
    assert_eq!(success_ticks.len(), 1);

    let node = &runner.nodes()[0];
    assert_eq!(node.level(), WindowLevel::BOTTOM);
    assert_eq!(node.contention_window(), 8);
    // Second packet is counting down its backoff
    assert_eq!(node.state(), AccessState::Backoff);
}

#[test]
fn test_single_node_never_collides() {
    let config = RunConfig {
        num_nodes: 1,
        generation_probability: 1.0,
        policy: PolicyKind::Baseline,
        seed: 99,
        ..Default::default()
    };
    let mut runner = SimulationRunner::new(&config).unwrap();
    let stats = runner.run(20).unwrap();

    assert!(stats.channel.successful_transmissions >= 1);
    assert_eq!(stats.channel.collisions, 0);
    assert_eq!(stats.delivery_ratio_pct(), 100.0);
    assert_eq!(runner.nodes()[0].level(), WindowLevel::BOTTOM);
}

#[test]
fn test_simultaneous_attempts_collide() {
    let nodes = vec![
        Node::new(NodeId(0), 1.0, BaselinePolicy::new().into(), immediate_sender(2)).unwrap(),
        Node::new(NodeId(1), 1.0, BaselinePolicy::new().into(), immediate_sender(4)).unwrap(),
    ];
    let mut runner = SimulationRunner::from_nodes(nodes).unwrap();

    // Generate, DIFS, then both fire on the first backoff tick
    for _ in 0..4 {
        assert_eq!(runner.step(), Resolution::Idle);
    }
    let resolution = runner.step();

    assert_eq!(
        resolution,
        Resolution::Collision {
            participants: 2,
            duration: 4,
        }
    );
    assert_eq!(runner.channel().remaining(), 4);
    assert!(runner.channel().pending().is_empty());

    let stats = runner.stats();
    assert_eq!(stats.channel.collisions, 1);
    assert_eq!(stats.channel.total_transmissions, 2);
    assert_eq!(stats.channel.successful_transmissions, 0);

    for node in runner.nodes() {
        assert_eq!(node.state(), AccessState::Backoff);
        assert_eq!(node.contention_window(), 16);
        assert_eq!(node.ticks_alive(), 2);
        assert!(node.has_packet());
    }

    // The medium stays busy for the longest frame
    for remaining in (0..4).rev() {
        assert_eq!(runner.step(), Resolution::Busy { remaining });
    }
}

/// Record each node's first `CW_LEVELS` window selections.
fn first_selections(runner: &mut SimulationRunner, max_ticks: u64) -> Vec<Vec<WindowLevel>> {
    let n = runner.nodes().len();
    let mut seen_alive = vec![0u32; n];
    let mut selections = vec![Vec::new(); n];

    for _ in 0..max_ticks {
        runner.step();
        for (i, node) in runner.nodes().iter().enumerate() {
            if node.ticks_alive() != seen_alive[i] {
                // One selection per tick at most
                assert_eq!(node.ticks_alive(), seen_alive[i] + 1);
                seen_alive[i] = node.ticks_alive();
                if selections[i].len() < CW_LEVELS {
                    selections[i].push(node.level());
                }
            }
        }
        if selections.iter().all(|s| s.len() == CW_LEVELS) {
            break;
        }
    }
    selections
}

#[test]
fn test_ucb1_tries_every_level_once_first() {
    let config = RunConfig {
        num_nodes: 1,
        generation_probability: 1.0,
        policy: PolicyKind::BanditUcb1,
        seed: 2024,
        ..Default::default()
    };
    let mut runner = SimulationRunner::new(&config).unwrap();
    let selections = first_selections(&mut runner, 200_000);

    let levels = &selections[0];
    assert_eq!(levels.len(), CW_LEVELS);
    let distinct: HashSet<_> = levels.iter().collect();
    assert_eq!(distinct.len(), CW_LEVELS);
}

#[test]
fn test_ucb1_exploration_survives_collisions() {
    let config = RunConfig {
        num_nodes: 6,
        generation_probability: 0.5,
        policy: PolicyKind::BanditUcb1,
        seed: 31337,
        ..Default::default()
    };
    let mut runner = SimulationRunner::new(&config).unwrap();
    let selections = first_selections(&mut runner, 1_000_000);

    for (i, levels) in selections.iter().enumerate() {
        assert_eq!(levels.len(), CW_LEVELS, "Node {i} did not finish exploring");
        let distinct: HashSet<_> = levels.iter().collect();
        assert_eq!(distinct.len(), CW_LEVELS, "Node {i} repeated a level");
    }
}

#[test]
fn test_baseline_window_bounded_under_heavy_load() {
    let config = RunConfig {
        num_nodes: 200,
        generation_probability: 1.0,
        policy: PolicyKind::Baseline,
        seed: 5,
        ..Default::default()
    };
    let mut runner = SimulationRunner::new(&config).unwrap();

    for _ in 0..5_000 {
        runner.step();
        for node in runner.nodes() {
            assert!(node.level() <= WindowLevel::TOP);
            assert!(node.contention_window() <= 4096);
        }
    }
    assert!(runner.stats().channel.collisions > 0);
}

#[test]
fn test_metrics_bounded_for_every_policy() {
    for policy in PolicyKind::ALL {
        let config = RunConfig {
            num_nodes: 50,
            generation_probability: 0.05,
            policy,
            epsilon: 0.2,
            seed: 11,
        };
        let stats = SimulationRunner::new(&config).unwrap().run(30_000).unwrap();

        let pdr = stats.delivery_ratio_pct();
        let throughput = stats.throughput_mbps();
        assert!((0.0..=100.0).contains(&pdr), "{policy}: pdr {pdr}");
        // Never more than the PHY rate
        assert!((0.0..=6.0).contains(&throughput), "{policy}: {throughput}");
    }
}

#[test]
fn test_custom_policy_nodes_run_through_runner() {
    let nodes = (0..4)
        .map(|i| {
            let policy: Policy = PolicyKind::QLearningDynamic.build(0.1).unwrap();
            Node::new(NodeId(i), 0.3, policy, SimRng::for_node(8, i)).unwrap()
        })
        .collect();
    let mut runner = SimulationRunner::from_nodes(nodes).unwrap();
    let stats = runner.run(10_000).unwrap();

    assert!(stats.channel.total_transmissions > 0);
    for node in runner.nodes() {
        assert!(node.policy().level() <= WindowLevel::TOP);
    }
}
