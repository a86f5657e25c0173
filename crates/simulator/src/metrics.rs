//! Per-run metrics beyond the channel counters.

use contention_simulation::Resolution;
use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};

/// Access-delay distribution of delivered packets, in ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessDelaySummary {
    /// Delivered packets measured.
    pub samples: u64,
    pub mean: f64,
    pub p50: u64,
    pub p99: u64,
    pub max: u64,
}

/// Collects metrics from channel resolutions during a run.
pub struct MetricsCollector {
    /// Ticks from packet generation to delivery.
    access_delay: Histogram<u64>,
    /// Ticks in which the medium was occupied.
    busy_ticks: u64,
    /// Ticks in which the medium was free and nobody attempted.
    idle_ticks: u64,
}

impl MetricsCollector {
    /// Create an empty collector.
    pub fn new() -> Result<Self, hdrhistogram::CreationError> {
        Ok(Self {
            access_delay: Histogram::new(3)?,
            busy_ticks: 0,
            idle_ticks: 0,
        })
    }

    /// Record one tick's resolution.
    pub fn record(&mut self, resolution: &Resolution) {
        match *resolution {
            Resolution::Busy { .. } => self.busy_ticks += 1,
            Resolution::Idle => self.idle_ticks += 1,
            Resolution::Success { access_delay, .. } => {
                self.access_delay.saturating_record(access_delay);
            }
            Resolution::Collision { .. } => {}
        }
    }

    pub fn busy_ticks(&self) -> u64 {
        self.busy_ticks
    }

    pub fn idle_ticks(&self) -> u64 {
        self.idle_ticks
    }

    /// Summarize the access-delay distribution.
    pub fn access_delay(&self) -> AccessDelaySummary {
        let h = &self.access_delay;
        if h.is_empty() {
            return AccessDelaySummary::default();
        }
        AccessDelaySummary {
            samples: h.len(),
            mean: h.mean(),
            p50: h.value_at_quantile(0.5),
            p99: h.value_at_quantile(0.99),
            max: h.max(),
        }
    }
}
