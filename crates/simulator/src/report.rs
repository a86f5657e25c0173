//! Run reports and their CSV persistence.

use crate::metrics::AccessDelaySummary;
use crate::{SimulatorConfig, SimulatorError};
use contention_policy::PolicyKind;
use contention_simulation::SimulationStats;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Header row of the run-summary CSV.
pub const CSV_HEADER: &str =
    "STRATEGY,NODES,TICKS,P_PACK_GEN,EPSILON,SUCC_TRANS,TOT_TRANS,THROUGHPUT,PDR,COLLISIONS";

/// Summary of one finished run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub policy: PolicyKind,
    pub num_nodes: usize,
    pub ticks: u64,
    pub generation_probability: f64,
    pub epsilon: f64,
    pub seed: u64,
    pub successful_transmissions: u64,
    pub total_transmissions: u64,
    pub collisions: u64,
    /// Delivered throughput in Mbit/s.
    pub throughput_mbps: f64,
    /// Packet-delivery ratio in percent.
    pub delivery_ratio_pct: f64,
    pub access_delay: AccessDelaySummary,
}

impl RunReport {
    /// Build a report from a run's configuration and results.
    pub fn new(
        config: &SimulatorConfig,
        repetition: usize,
        stats: &SimulationStats,
        access_delay: AccessDelaySummary,
    ) -> Self {
        Self {
            policy: config.policy,
            num_nodes: config.num_nodes,
            ticks: stats.ticks,
            generation_probability: config.generation_probability,
            epsilon: config.epsilon,
            seed: config.seed_for(repetition),
            successful_transmissions: stats.channel.successful_transmissions,
            total_transmissions: stats.channel.total_transmissions,
            collisions: stats.channel.collisions,
            throughput_mbps: stats.throughput_mbps(),
            delivery_ratio_pct: stats.delivery_ratio_pct(),
            access_delay,
        }
    }

    /// One CSV row matching [`CSV_HEADER`], without a trailing newline.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{:.3},{:.3},{}",
            self.policy.code(),
            self.num_nodes,
            self.ticks,
            self.generation_probability,
            self.epsilon,
            self.successful_transmissions,
            self.total_transmissions,
            self.throughput_mbps,
            self.delivery_ratio_pct,
            self.collisions,
        )
    }

    /// Print a human-readable summary to stdout.
    pub fn print(&self) {
        println!(
            "Policy: {} | nodes: {} | p: {} | epsilon: {} | seed: {}",
            self.policy, self.num_nodes, self.generation_probability, self.epsilon, self.seed
        );
        println!("Successful transmissions: {}", self.successful_transmissions);
        println!("Total transmissions: {}", self.total_transmissions);
        println!("# collisions: {}", self.collisions);
        println!("Throughput: {:.3} Mbit/s", self.throughput_mbps);
        println!("PDR: {:.3} %", self.delivery_ratio_pct);
        if self.access_delay.samples > 0 {
            println!(
                "Access delay (ticks): mean {:.1}, p50 {}, p99 {}, max {}",
                self.access_delay.mean,
                self.access_delay.p50,
                self.access_delay.p99,
                self.access_delay.max
            );
        }
    }
}

/// Append reports to a CSV file, writing the header first if the file is
/// new or empty. Parent directories are created as needed.
pub fn append_csv(path: &Path, reports: &[RunReport]) -> Result<(), SimulatorError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut out = String::new();
    if file.metadata()?.len() == 0 {
        out.push_str(CSV_HEADER);
        out.push('\n');
    }
    for report in reports {
        out.push_str(&report.to_csv_row());
        out.push('\n');
    }
    file.write_all(out.as_bytes())?;

    info!(path = %path.display(), rows = reports.len(), "Reports appended");
    Ok(())
}
