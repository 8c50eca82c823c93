mod report;
mod runner;

pub use runner::{run_burnout, run_simulation, SimulationRun};

use crate::config::{Args, Command, Config};
use crate::io::setup_output;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use std::path::Path;
use tracing::info;

pub struct IsingApplication {
    args: Args,
    config: Config,
}

impl IsingApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(mut self) -> Result<()> {
        setup_output(self.args.output.as_ref());

        match &self.args.command {
            Command::Simulate(overrides) => {
                self.config.apply_simulate_overrides(overrides);
                info!("Configuration loaded:\n{:?}", self.config);
                let run = run_simulation(&self.config)?;
                info!("Run directory: {}", run.directory.path().display());
            }
            Command::Burnout(burnout_args) => {
                self.config.apply_burnout_overrides(burnout_args);
                run_burnout(&self.config, burnout_args)?;
            }
        }

        Ok(())
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let path = Path::new(&args.config_file);
    if !path.exists() {
        return Ok(Config::default().with_defaults());
    }

    let config_content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    Config::from_yaml_str(&config_content).wrap_err("Failed to parse configuration file")
}
