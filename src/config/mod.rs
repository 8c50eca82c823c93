//! Configuration management for Ising sweeps
//!
//! This module handles configuration structures, defaults, validation and
//! command-line overrides for sweeps and burn-in detection.

mod args;

pub use args::{Args, BurnoutArgs, Command, SimulateArgs};

use crate::error::{IsingError, IsingResult};
use crate::ising::analysis::critical_temperature;
use crate::ising::burnout::{
    BurnoutParams, DEFAULT_ERROR, DEFAULT_INITIAL_PERCENT, DEFAULT_ITERATIONS,
};
use crate::ising::lattice::InitMode;
use crate::ising::rng::SeedStrategy;
use crate::ising::sweep::{AxisRange, SweepParams};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_LATTICE_SIZE: usize = 32;
pub const DEFAULT_TOTAL_STEPS: usize = 100_000;
pub const DEFAULT_SAMPLES: usize = 10;
pub const DEFAULT_DIRECTORY: &str = "results";

/// Main configuration structure for Ising sweeps
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub lattice: LatticeParams,
    #[serde(default)]
    pub simulation: SimulationParams,
    pub temperature: Option<RangeParams>,
    pub field: Option<RangeParams>,
    #[serde(default)]
    pub burnout: BurnoutConfig,
    #[serde(default)]
    pub output: OutputParams,
}

/// Lattice parameters
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct LatticeParams {
    pub size: Option<usize>,
    pub init: Option<InitMode>,
}

/// Chain length, recording window and scheduling
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct SimulationParams {
    pub total_steps: Option<usize>,
    pub record_from: Option<usize>,
    /// Master seed; drawn from OS entropy when absent
    pub seed: Option<u64>,
    pub threads: Option<usize>,
}

/// Inclusive linearly spaced axis
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy, PartialEq)]
pub struct RangeParams {
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub samples: Option<usize>,
}

/// Burn-in detector parameters
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct BurnoutConfig {
    pub iterations: Option<usize>,
    pub initial_percent: Option<f64>,
    pub error: Option<f64>,
}

/// Where results go
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct OutputParams {
    pub directory: Option<PathBuf>,
    pub label: Option<String>,
}

impl RangeParams {
    /// T_c / 2 .. 1.5 T_c, bracketing the phase transition
    pub fn temperature_default() -> Self {
        let t_c = critical_temperature();
        RangeParams {
            low: Some(t_c / 2.0),
            high: Some(t_c * 1.5),
            samples: Some(DEFAULT_SAMPLES),
        }
    }

    pub fn field_default() -> Self {
        RangeParams {
            low: Some(-1.0),
            high: Some(1.0),
            samples: Some(DEFAULT_SAMPLES),
        }
    }

    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self, defaults: RangeParams) -> Self {
        if self.low.is_none() {
            self.low = defaults.low;
        }
        if self.high.is_none() {
            self.high = defaults.high;
        }
        if self.samples.is_none() {
            self.samples = defaults.samples;
        }
        self
    }

    fn axis(&self, defaults: RangeParams) -> AxisRange {
        let filled = self.with_defaults(defaults);
        AxisRange::new(
            filled.low.unwrap_or_default(),
            filled.high.unwrap_or_default(),
            filled.samples.unwrap_or(DEFAULT_SAMPLES),
        )
    }
}

impl BurnoutConfig {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        if self.iterations.is_none() {
            self.iterations = Some(DEFAULT_ITERATIONS);
        }
        if self.initial_percent.is_none() {
            self.initial_percent = Some(DEFAULT_INITIAL_PERCENT);
        }
        if self.error.is_none() {
            self.error = Some(DEFAULT_ERROR);
        }
        self
    }
}

impl Config {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yml::Error> {
        Ok(serde_yml::from_str::<Config>(content)?.with_defaults())
    }

    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        if self.lattice.size.is_none() {
            self.lattice.size = Some(DEFAULT_LATTICE_SIZE);
        }
        if self.lattice.init.is_none() {
            self.lattice.init = Some(InitMode::AllAligned);
        }
        if self.simulation.total_steps.is_none() {
            self.simulation.total_steps = Some(DEFAULT_TOTAL_STEPS);
        }
        if self.simulation.record_from.is_none() {
            self.simulation.record_from = Some(0);
        }
        self.temperature = Some(
            self.temperature
                .unwrap_or_default()
                .with_defaults(RangeParams::temperature_default()),
        );
        self.field = Some(
            self.field
                .unwrap_or_default()
                .with_defaults(RangeParams::field_default()),
        );
        self.burnout = self.burnout.with_defaults();
        if self.output.directory.is_none() {
            self.output.directory = Some(PathBuf::from(DEFAULT_DIRECTORY));
        }
        self
    }

    /// Command-line values win over file values
    pub fn apply_simulate_overrides(&mut self, args: &SimulateArgs) {
        if let Some(size) = args.lattice_size {
            self.lattice.size = Some(size);
        }
        if let Some(steps) = args.total_steps {
            self.simulation.total_steps = Some(steps);
        }
        if let Some(record_from) = args.record_from {
            self.simulation.record_from = Some(record_from);
        }
        if let Some(samples) = args.samples {
            for axis in [&mut self.temperature, &mut self.field] {
                axis.get_or_insert_with(RangeParams::default).samples = Some(samples);
            }
        }
        if args.seed.is_some() {
            self.simulation.seed = args.seed;
        }
        if args.threads.is_some() {
            self.simulation.threads = args.threads;
        }
        if args.directory.is_some() {
            self.output.directory = args.directory.clone();
        }
        if args.label.is_some() {
            self.output.label = args.label.clone();
        }
    }

    pub fn apply_burnout_overrides(&mut self, args: &BurnoutArgs) {
        if args.iterations.is_some() {
            self.burnout.iterations = args.iterations;
        }
        if args.initial_percent.is_some() {
            self.burnout.initial_percent = args.initial_percent;
        }
        if args.error.is_some() {
            self.burnout.error = args.error;
        }
    }

    pub fn lattice_size(&self) -> usize {
        self.lattice.size.unwrap_or(DEFAULT_LATTICE_SIZE)
    }

    pub fn total_steps(&self) -> usize {
        self.simulation.total_steps.unwrap_or(DEFAULT_TOTAL_STEPS)
    }

    pub fn record_from(&self) -> usize {
        self.simulation.record_from.unwrap_or(0)
    }

    pub fn temperature_axis(&self) -> AxisRange {
        self.temperature
            .unwrap_or_default()
            .axis(RangeParams::temperature_default())
    }

    pub fn field_axis(&self) -> AxisRange {
        self.field.unwrap_or_default().axis(RangeParams::field_default())
    }

    pub fn output_directory(&self) -> PathBuf {
        self.output
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIRECTORY))
    }

    pub fn burnout_params(&self) -> BurnoutParams {
        BurnoutParams {
            iterations: self.burnout.iterations.unwrap_or(DEFAULT_ITERATIONS),
            initial_percent: self.burnout.initial_percent.unwrap_or(DEFAULT_INITIAL_PERCENT),
            error: self.burnout.error.unwrap_or(DEFAULT_ERROR),
        }
    }

    /// Build and validate the core sweep parameters
    pub fn to_sweep_params(&self) -> IsingResult<SweepParams> {
        let temperature = self.temperature_axis();
        let field = self.field_axis();
        if temperature.low > temperature.high || field.low > field.high {
            return Err(IsingError::Config(format!(
                "axis ranges must satisfy low <= high (temperature {:?}, field {:?})",
                temperature, field
            )));
        }

        let params = SweepParams {
            lattice_size: self.lattice_size(),
            total_steps: self.total_steps(),
            record_from: self.record_from(),
            temperatures: temperature.values(),
            fields: field.values(),
            init: self.lattice.init.unwrap_or_default(),
            seed: SeedStrategy::from(self.simulation.seed),
            threads: self.simulation.threads,
        };
        params.validate()?;
        Ok(params)
    }

    /// Run label: configured, or derived from size, steps and seed
    pub fn run_label(&self, master_seed: u64) -> String {
        self.output.label.clone().unwrap_or_else(|| {
            format!(
                "ising_L{}_N{}_seed{}",
                self.lattice_size(),
                self.total_steps(),
                master_seed
            )
        })
    }
}
