use std::ops::Deref;

use crate::error::{IsingError, IsingResult};
use crate::ising::lattice::Lattice;
use crate::ising::metropolis::propose_and_step;
use crate::ising::observer::{NullObserver, SimulationObserver};
use crate::ising::rng::ChainRng;
use crate::ising::sweep::{SimulationPoint, MAX_TENSOR_ENTRIES};

/// Magnetization recorded after each step of the recording phase.
///
/// Capacity is fixed when the chain starts and the series is never
/// modified once the chain has finished.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MagnetizationSeries {
    values: Vec<f64>,
}

impl MagnetizationSeries {
    fn with_capacity(len: usize) -> Self {
        Self {
            values: Vec::with_capacity(len),
        }
    }

    #[inline]
    fn push(&mut self, magnetization: f64) {
        self.values.push(magnetization);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}

impl Deref for MagnetizationSeries {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}

impl From<Vec<f64>> for MagnetizationSeries {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

/// One Markov chain: a lattice, its own random stream and a step counter
#[derive(Debug, Clone)]
pub struct Chain {
    lattice: Lattice,
    rng: ChainRng,
    step: u64,
}

impl Chain {
    pub fn new(lattice: Lattice, rng: ChainRng) -> Self {
        Self {
            lattice,
            rng,
            step: 0,
        }
    }

    pub fn seeded(lattice: Lattice, seed: u64) -> Self {
        Self::new(lattice, ChainRng::from_seed(seed))
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn into_lattice(self) -> Lattice {
        self.lattice
    }
}

/// What a finished chain hands back to the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct ChainReport {
    pub series: MagnetizationSeries,
    /// Steps executed, burn-in included
    pub steps: u64,
    pub accepted: u64,
    /// Steps whose Boltzmann exponent -ΔE/T was not finite
    pub saturated_steps: u64,
    pub final_magnetization: f64,
}

impl ChainReport {
    pub fn acceptance_rate(&self) -> f64 {
        if self.steps == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.steps as f64
    }

    pub fn is_stable(&self) -> bool {
        self.saturated_steps == 0
    }
}

/// Runs a fixed number of Metropolis steps for one (T, B) point.
///
/// Steps with index < `record_from` are burn-in: they mutate the lattice
/// but their magnetization is discarded. The resulting series has
/// `total_steps - record_from` entries.
#[derive(Debug, Clone, Copy)]
pub struct ChainDriver {
    point: SimulationPoint,
    total_steps: usize,
    record_from: usize,
}

impl ChainDriver {
    pub fn new(point: SimulationPoint, total_steps: usize, record_from: usize) -> IsingResult<Self> {
        if !(point.temperature.is_finite() && point.temperature > 0.0) {
            return Err(IsingError::config(format!(
                "temperature must be a positive finite number, got {}",
                point.temperature
            )));
        }
        if !point.field.is_finite() {
            return Err(IsingError::config(format!(
                "field must be finite, got {}",
                point.field
            )));
        }
        if record_from > total_steps {
            return Err(IsingError::config(format!(
                "record_from ({}) must not exceed total_steps ({})",
                record_from, total_steps
            )));
        }

        if total_steps - record_from > MAX_TENSOR_ENTRIES {
            return Err(IsingError::config(format!(
                "series of {} entries is too large",
                total_steps - record_from
            )));
        }

        Ok(Self {
            point,
            total_steps,
            record_from,
        })
    }

    pub fn point(&self) -> &SimulationPoint {
        &self.point
    }

    pub fn series_len(&self) -> usize {
        self.total_steps - self.record_from
    }

    /// Run the chain to completion, reporting to `observer`.
    pub fn run(&self, chain: &mut Chain, observer: &dyn SimulationObserver) -> ChainReport {
        observer.chain_started(&self.point);

        let temperature = self.point.temperature;
        let field = self.point.field;
        let mut series = MagnetizationSeries::with_capacity(self.series_len());
        let mut accepted = 0u64;
        let mut saturated_steps = 0u64;

        for t in 0..self.total_steps {
            let outcome = propose_and_step(&mut chain.lattice, temperature, field, &mut chain.rng);
            chain.step += 1;
            accepted += u64::from(outcome.accepted);
            saturated_steps += u64::from(outcome.saturated);

            if t >= self.record_from {
                series.push(chain.lattice.magnetization());
            }
        }

        let report = ChainReport {
            series,
            steps: self.total_steps as u64,
            accepted,
            saturated_steps,
            final_magnetization: chain.lattice.magnetization(),
        };
        observer.chain_finished(&self.point, &report);
        report
    }
}

/// Run one chain on `lattice` in place and return its magnetization series.
pub fn run_chain(
    lattice: &mut Lattice,
    temperature: f64,
    field: f64,
    total_steps: usize,
    record_from: usize,
    rng: ChainRng,
) -> IsingResult<ChainReport> {
    let driver = ChainDriver::new(
        SimulationPoint::new(temperature, field),
        total_steps,
        record_from,
    )?;
    let mut chain = Chain::new(lattice.clone(), rng);
    let report = driver.run(&mut chain, &NullObserver);
    *lattice = chain.into_lattice();
    Ok(report)
}
