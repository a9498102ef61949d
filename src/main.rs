//! Spreadband - Adaptive Spread Threshold Engine CLI
//!
//! Operational front door: validate a configuration file or push a
//! synthetic spread feed through the controller and inspect the outcome.

mod application;
mod config;
mod domain;
mod ports;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use crate::application::simulator;
use crate::config::load_config;

#[derive(Debug, Parser)]
#[command(name = "spreadband", about = "Adaptive spread threshold engine", version)]
struct CliApp {
    #[command(subcommand)]
    command: Command,
    /// Verbose output (info level)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Debug output (debug level)
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a configuration file and print the resolved parameters
    Validate(ValidateCmd),
    /// Run a synthetic spread feed through the controller
    Simulate(SimulateCmd),
}

#[derive(Debug, Args)]
struct ValidateCmd {
    /// Path to config.toml
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[derive(Debug, Args)]
struct SimulateCmd {
    /// Path to config.toml
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
    /// Override the number of samples to feed
    #[arg(long)]
    samples: Option<u64>,
    /// Override the RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let app = CliApp::parse();
    init_logging(app.verbose, app.debug);

    match app.command {
        Command::Validate(cmd) => validate_command(cmd),
        Command::Simulate(cmd) => simulate_command(cmd),
    }
}

fn init_logging(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    fmt().with_env_filter(filter).init();
}

fn validate_command(cmd: ValidateCmd) -> Result<()> {
    let config = load_config(&cmd.config)
        .with_context(|| format!("Failed to load configuration from {}", cmd.config.display()))?;

    let threshold = config.threshold.to_threshold_config();
    println!("Configuration OK: {}", cmd.config.display());
    println!(
        "  window: capacity {} / min samples {}",
        threshold.sample_capacity, threshold.min_samples
    );
    println!(
        "  multiplier: start {} in [{}, {}]",
        threshold.initial_multiplier, threshold.min_multiplier, threshold.max_multiplier
    );
    println!("  threshold floor: {}%", threshold.min_total_threshold);
    println!("  logging level: {}", config.logging.level);
    Ok(())
}

fn simulate_command(cmd: SimulateCmd) -> Result<()> {
    let mut config = load_config(&cmd.config)
        .with_context(|| format!("Failed to load configuration from {}", cmd.config.display()))?;

    if let Some(samples) = cmd.samples {
        config.simulation.samples = samples;
    }
    if let Some(seed) = cmd.seed {
        config.simulation.seed = Some(seed);
    }

    tracing::info!(
        samples = config.simulation.samples,
        seed = ?config.simulation.seed,
        "starting simulation"
    );

    let report = simulator::run(&config).context("Simulation failed")?;

    println!(
        "Fed {} samples: {} adjustments, {} warm-up rejections",
        report.samples_fed, report.adjustments_applied, report.warmup_rejections
    );
    match report.final_thresholds {
        Some((open, close)) => println!(
            "Final thresholds: open {:.6}% close {:.6}% (k = {:.4})",
            open, close, report.final_multiplier
        ),
        None => println!("No thresholds produced (still collecting)"),
    }

    let snapshot =
        serde_json::to_string_pretty(&report.final_snapshot).context("Failed to render snapshot")?;
    println!("{snapshot}");
    Ok(())
}
