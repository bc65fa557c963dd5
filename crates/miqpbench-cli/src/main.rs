//! Randomized MIQP benchmark
//!
//! Generates seeded random mixed-integer QPs over a sweep of problem sizes,
//! times every selected backend on the same instances, and prints one
//! comparison table.

mod config;

use std::path::PathBuf;

use clap::Parser;
use miqpbench_report::build;
use miqpbench_sim::run_comparison;
use miqpbench_solver::{BackendSettings, SolverBackend};
use tracing_subscriber::EnvFilter;

use crate::config::{BenchConfig, Overrides};

#[derive(Parser)]
#[command(name = "miqpbench", version, about = "Compare MIQP solver backends on random instances")]
struct Args {
    /// JSON configuration file ({ "sweep": {...}, "backends": [...] })
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in sweep: 1 = mixed shapes, 2 = small fully binary problems
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
    problem_set: Option<u8>,

    /// Repetitions per configuration
    #[arg(long)]
    repeat: Option<usize>,

    /// Nonzero fraction of the random matrices, in (0, 1]
    #[arg(long)]
    density: Option<f64>,

    /// Seed of the instance generator
    #[arg(long)]
    seed: Option<u64>,

    /// Backend to run (clarabel, miqp-bnb); repeat to select several
    #[arg(long = "backend")]
    backends: Vec<String>,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            problem_set: self.problem_set,
            repeat: self.repeat,
            density: self.density,
            seed: self.seed,
            backends: self.backends.clone(),
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Table goes to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };
    let plan = config.resolve(&args.overrides())?;

    let backends: Vec<(Box<dyn SolverBackend>, BackendSettings)> = plan
        .backends
        .iter()
        .map(|(kind, settings)| (kind.create(), settings.clone()))
        .collect();

    let runs = run_comparison(&plan.sweep, &backends)?;
    let report = build(&runs, &plan.sweep)?;

    println!("{}", report);
    Ok(())
}
