//! Ising sweep command-line interface
//!
//! Runs (temperature, field) sweeps of the 2D Ising model and estimates
//! burn-in cutoffs of stored trajectories, driven by a YAML configuration.

use color_eyre::eyre::Result;
use ising_mc::app::IsingApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    IsingApplication::from_cli()?.run()
}
