//! Command-line argument parsing for Ising sweeps

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Metropolis Monte Carlo sweeps of the 2D Ising model with YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "config.yaml", global = true)]
    pub config_file: String,

    /// Override log output file: (default stdout)
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a (temperature, field) sweep and store the magnetization history
    Simulate(SimulateArgs),
    /// Estimate the burn-in cutoff of one stored trajectory
    Burnout(BurnoutArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct SimulateArgs {
    /// Override lattice size N (N x N spins)
    #[arg(long)]
    pub lattice_size: Option<usize>,

    /// Override total Metropolis steps per chain
    #[arg(long)]
    pub total_steps: Option<usize>,

    /// Override first recorded step (burn-in length)
    #[arg(long)]
    pub record_from: Option<usize>,

    /// Override sample count of both the temperature and field axes
    #[arg(long)]
    pub samples: Option<usize>,

    /// Override master seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override worker thread count
    #[arg(long)]
    pub threads: Option<usize>,

    /// Override results root directory
    #[arg(long)]
    pub directory: Option<PathBuf>,

    /// Override run label (sub-directory name)
    #[arg(long)]
    pub label: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct BurnoutArgs {
    /// Path to a results.json written by `simulate`
    #[arg(long)]
    pub results: PathBuf,

    /// Temperature index of the trajectory
    #[arg(long, default_value_t = 0)]
    pub temperature_index: usize,

    /// Field index of the trajectory
    #[arg(long, default_value_t = 0)]
    pub field_index: usize,

    /// Override refinement iterations
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Override initial search fraction
    #[arg(long)]
    pub initial_percent: Option<f64>,

    /// Override tolerance
    #[arg(long)]
    pub error: Option<f64>,
}
