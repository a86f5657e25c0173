//! Contention Simulator CLI
//!
//! Runs backoff-policy experiments on a shared slotted channel and appends
//! the results to a CSV file.

use clap::{Args, Parser, Subcommand, ValueEnum};
use contention_policy::PolicyKind;
use contention_simulator::{
    append_csv, run_sweep, RunReport, Simulator, SimulatorConfig, Sweep,
    DEFAULT_SWEEP_REPETITIONS,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contention-sim")]
#[command(about = "Slotted CSMA/CA contention simulator with learning backoff policies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single parameter point
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Sweep one parameter around a base point
    Sweep {
        /// Parameter to vary
        #[arg(long, value_enum)]
        axis: Axis,

        /// Largest node count of a node sweep
        #[arg(long, default_value = "5000")]
        max_nodes: usize,

        #[command(flatten)]
        args: RunArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Axis {
    /// Node count, 500 to --max-nodes in steps of 500
    Nodes,
    /// Packet-generation probability
    Probability,
    /// Exploration rate (forces epsilon-greedy)
    Epsilon,
}

#[derive(Args)]
struct RunArgs {
    /// Number of contending nodes
    #[arg(short, long, default_value = "100")]
    nodes: usize,

    /// Ticks per run
    #[arg(short, long, default_value = "500000")]
    ticks: u64,

    /// Per-tick packet-generation probability
    #[arg(short, long, default_value = "0.02")]
    p: f64,

    /// Exploration rate for epsilon-greedy
    #[arg(short, long, default_value = "0.1")]
    epsilon: f64,

    /// Backoff policy (baseline, ucb1, e-greedy, q-fixed, q-dynamic or 0-4)
    #[arg(long, default_value = "baseline")]
    policy: PolicyKind,

    /// Base random seed
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Repetitions per point (sweeps default to 3)
    #[arg(short, long)]
    repetitions: Option<usize>,

    /// CSV file the reports are appended to
    #[arg(short, long, default_value = "data/output.csv")]
    output: PathBuf,

    /// Do not write the CSV file
    #[arg(long)]
    no_save: bool,

    /// Print reports as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn to_config(&self, default_repetitions: usize) -> SimulatorConfig {
        SimulatorConfig::new(self.nodes, self.policy)
            .with_ticks(self.ticks)
            .with_generation_probability(self.p)
            .with_epsilon(self.epsilon)
            .with_seed(self.seed)
            .with_repetitions(self.repetitions.unwrap_or(default_repetitions))
    }

    fn emit(&self, reports: &[RunReport]) -> Result<(), Box<dyn std::error::Error>> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(reports)?);
        } else {
            for report in reports {
                report.print();
                println!();
            }
        }

        if !self.no_save {
            append_csv(&self.output, reports)?;
            eprintln!("Results saved to {}", self.output.display());
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { args } => {
            let simulator = Simulator::new(args.to_config(1))?;
            let reports = simulator.run()?;
            args.emit(&reports)?;
        }

        Commands::Sweep {
            axis,
            max_nodes,
            args,
        } => {
            let sweep = match axis {
                Axis::Nodes => Sweep::Nodes { max_nodes },
                Axis::Probability => Sweep::GenerationProbability,
                Axis::Epsilon => Sweep::Epsilon,
            };
            let reports = run_sweep(sweep, &args.to_config(DEFAULT_SWEEP_REPETITIONS))?;
            args.emit(&reports)?;
        }
    }

    Ok(())
}
