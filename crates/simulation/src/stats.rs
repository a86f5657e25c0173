//! Run-level statistics derived from the channel counters.

use crate::ChannelStats;
use contention_types::TICK_DURATION_SECS;
use serde::{Deserialize, Serialize};

/// Throughput in Mbit/s for `bits` delivered over `ticks`.
///
/// Zero when no time has elapsed.
pub fn throughput_mbps(bits: u64, ticks: u64) -> f64 {
    let elapsed_secs = ticks as f64 * TICK_DURATION_SECS;
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    bits as f64 / elapsed_secs / 1e6
}

/// Packet-delivery ratio in percent.
///
/// Zero when there have been no attempts.
pub fn delivery_ratio_pct(successes: u64, attempts: u64) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    successes as f64 / attempts as f64 * 100.0
}

/// Counters and derived metrics of a finished (or in-progress) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    /// Ticks executed.
    pub ticks: u64,

    /// Channel counters.
    pub channel: ChannelStats,
}

impl SimulationStats {
    /// Delivered throughput in Mbit/s.
    pub fn throughput_mbps(&self) -> f64 {
        throughput_mbps(self.channel.bits_delivered, self.ticks)
    }

    /// Successes over attempts, in percent.
    pub fn delivery_ratio_pct(&self) -> f64 {
        delivery_ratio_pct(
            self.channel.successful_transmissions,
            self.channel.total_transmissions,
        )
    }

    /// Collision events per attempt, in percent.
    pub fn collision_rate_pct(&self) -> f64 {
        delivery_ratio_pct(self.channel.collisions, self.channel.total_transmissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_denominators_yield_zero() {
        assert_eq!(throughput_mbps(0, 0), 0.0);
        assert_eq!(throughput_mbps(1_000, 0), 0.0);
        assert_eq!(delivery_ratio_pct(0, 0), 0.0);

        let stats = SimulationStats::default();
        assert_eq!(stats.throughput_mbps(), 0.0);
        assert_eq!(stats.delivery_ratio_pct(), 0.0);
        assert_eq!(stats.collision_rate_pct(), 0.0);
    }

    #[test]
    fn test_throughput_units() {
        // Fully utilized medium: 60 bits every 10us = 6 Mbit/s
        let ticks = 1_000;
        let bits = ticks * 60;
        assert!((throughput_mbps(bits, ticks) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_delivery_ratio() {
        assert_eq!(delivery_ratio_pct(3, 4), 75.0);
        assert_eq!(delivery_ratio_pct(4, 4), 100.0);
    }

    #[test]
    fn test_metrics_never_nan_or_negative() {
        for ticks in [0u64, 1, 17, 500_000] {
            for (successes, attempts) in [(0u64, 0u64), (0, 5), (5, 5), (2, 9)] {
                let stats = SimulationStats {
                    ticks,
                    channel: ChannelStats {
                        successful_transmissions: successes,
                        total_transmissions: attempts,
                        collisions: attempts - successes,
                        bits_delivered: successes * 180,
                    },
                };
                for value in [
                    stats.throughput_mbps(),
                    stats.delivery_ratio_pct(),
                    stats.collision_rate_pct(),
                ] {
                    assert!(!value.is_nan());
                    assert!(value >= 0.0);
                }
            }
        }
    }
}
