use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use itertools::iproduct;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{IsingError, IsingResult};
use crate::ising::chain::{Chain, ChainDriver, MagnetizationSeries};
use crate::ising::lattice::{InitMode, Lattice};
use crate::ising::observer::{NullObserver, SimulationObserver};
use crate::ising::rng::{derive_chain_seed, ChainRng, SeedStrategy, BASE_LATTICE_STREAM};

/// Largest history tensor a sweep may allocate, in f64 entries
pub const MAX_TENSOR_ENTRIES: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// `samples` evenly spaced values over `[low, high]`, both endpoints included.
pub fn linspace(low: f64, high: f64, samples: usize) -> Vec<f64> {
    match samples {
        0 => Vec::new(),
        1 => vec![low],
        _ => {
            let step = (high - low) / (samples - 1) as f64;
            (0..samples)
                .map(|k| if k == samples - 1 { high } else { low + step * k as f64 })
                .collect()
        }
    }
}

/// Inclusive, linearly spaced parameter axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub low: f64,
    pub high: f64,
    pub samples: usize,
}

impl AxisRange {
    pub fn new(low: f64, high: f64, samples: usize) -> Self {
        Self { low, high, samples }
    }

    pub fn values(&self) -> Vec<f64> {
        linspace(self.low, self.high, self.samples)
    }
}

/// One (temperature, field) grid cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationPoint {
    pub temperature: f64,
    pub field: f64,
    pub temperature_index: usize,
    pub field_index: usize,
}

impl SimulationPoint {
    pub fn new(temperature: f64, field: f64) -> Self {
        Self {
            temperature,
            field,
            temperature_index: 0,
            field_index: 0,
        }
    }
}

/// Everything a sweep needs before it starts
#[derive(Debug, Clone, PartialEq)]
pub struct SweepParams {
    pub lattice_size: usize,
    pub total_steps: usize,
    pub record_from: usize,
    pub temperatures: Vec<f64>,
    pub fields: Vec<f64>,
    pub init: InitMode,
    pub seed: SeedStrategy,
    /// Worker threads; `None` uses the global rayon pool
    pub threads: Option<usize>,
}

impl SweepParams {
    pub fn new(
        lattice_size: usize,
        total_steps: usize,
        temperatures: Vec<f64>,
        fields: Vec<f64>,
        record_from: usize,
    ) -> Self {
        Self {
            lattice_size,
            total_steps,
            record_from,
            temperatures,
            fields,
            init: InitMode::AllAligned,
            seed: SeedStrategy::Entropy,
            threads: None,
        }
    }

    pub fn with_seed(mut self, seed: SeedStrategy) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_init(mut self, init: InitMode) -> Self {
        self.init = init;
        self
    }

    pub fn series_len(&self) -> usize {
        self.total_steps.saturating_sub(self.record_from)
    }

    pub fn validate(&self) -> IsingResult<()> {
        if self.lattice_size == 0 {
            return Err(IsingError::config("lattice size must be a positive integer"));
        }
        if self.total_steps == 0 {
            return Err(IsingError::config("total_steps must be a positive integer"));
        }
        if self.record_from > self.total_steps {
            return Err(IsingError::config(format!(
                "record_from ({}) must not exceed total_steps ({})",
                self.record_from, self.total_steps
            )));
        }
        if self.temperatures.is_empty() {
            return Err(IsingError::config("at least one temperature is required"));
        }
        if self.fields.is_empty() {
            return Err(IsingError::config("at least one field value is required"));
        }
        if let Some(t) = self.temperatures.iter().find(|t| !(t.is_finite() && **t > 0.0)) {
            return Err(IsingError::config(format!(
                "temperatures must be positive and finite, got {}",
                t
            )));
        }
        if let Some(b) = self.fields.iter().find(|b| !b.is_finite()) {
            return Err(IsingError::config(format!("fields must be finite, got {}", b)));
        }
        let entries = self
            .temperatures
            .len()
            .checked_mul(self.fields.len())
            .and_then(|cells| cells.checked_mul(self.series_len()))
            .filter(|&n| n <= MAX_TENSOR_ENTRIES);
        if entries.is_none() {
            return Err(IsingError::config(format!(
                "history tensor of {} x {} x {} entries is too large",
                self.temperatures.len(),
                self.fields.len(),
                self.series_len()
            )));
        }
        if self.threads == Some(0) {
            return Err(IsingError::config("threads must be at least 1"));
        }
        Ok(())
    }
}

/// Magnetization history indexed by (temperature, field, step)
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryTensor {
    shape: [usize; 3],
    data: Vec<f64>,
}

impl HistoryTensor {
    /// Tensor of the given shape with every entry NaN
    pub fn unfilled(shape: [usize; 3]) -> Self {
        Self {
            shape,
            data: vec![f64::NAN; shape[0] * shape[1] * shape[2]],
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    fn offset(&self, temperature_index: usize, field_index: usize) -> usize {
        (temperature_index * self.shape[1] + field_index) * self.shape[2]
    }

    pub fn get(&self, temperature_index: usize, field_index: usize, step: usize) -> f64 {
        self.data[self.offset(temperature_index, field_index) + step]
    }

    /// The magnetization series of one cell
    pub fn series(&self, temperature_index: usize, field_index: usize) -> &[f64] {
        let start = self.offset(temperature_index, field_index);
        &self.data[start..start + self.shape[2]]
    }

    fn set_series(&mut self, temperature_index: usize, field_index: usize, series: &[f64]) {
        let start = self.offset(temperature_index, field_index);
        self.data[start..start + self.shape[2]].copy_from_slice(series);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Nested `[temperature][field][step]` copy
    pub fn to_nested(&self) -> Vec<Vec<Vec<f64>>> {
        (0..self.shape[0])
            .map(|i| (0..self.shape[1]).map(|j| self.series(i, j).to_vec()).collect())
            .collect()
    }
}

/// Outcome of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    Completed,
    /// Chain finished but some Boltzmann exponents were not finite
    Unstable { saturated_steps: u64 },
    /// Never started because the sweep was cancelled; its series is NaN
    Cancelled,
}

impl CellStatus {
    pub fn has_data(&self) -> bool {
        !matches!(self, CellStatus::Cancelled)
    }
}

/// Aggregate verdict over all cells of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepSummary {
    Success,
    /// Every cell ran; `unstable` of them had non-finite Boltzmann exponents
    PartiallyUnstable { unstable: usize, total: usize },
    /// `finished` cells ran before cancellation, `unstable` of them unstable
    Cancelled {
        finished: usize,
        unstable: usize,
        total: usize,
    },
    /// No cell holds data
    NoValidCells,
}

/// Cooperative cancellation flag shared between a sweep and its caller.
///
/// Checked before each chain starts; chains already running finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result tensor plus everything needed to interpret it
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    pub tensor: HistoryTensor,
    /// Row-major `[temperature][field]` cell statuses
    pub statuses: Vec<CellStatus>,
    pub temperatures: Vec<f64>,
    pub fields: Vec<f64>,
    pub master_seed: u64,
}

impl SweepOutcome {
    pub fn status(&self, temperature_index: usize, field_index: usize) -> CellStatus {
        self.statuses[temperature_index * self.fields.len() + field_index]
    }

    pub fn point(&self, temperature_index: usize, field_index: usize) -> SimulationPoint {
        SimulationPoint {
            temperature: self.temperatures[temperature_index],
            field: self.fields[field_index],
            temperature_index,
            field_index,
        }
    }

    /// Cells with data are the completed and the unstable ones.
    pub fn summary(&self) -> SweepSummary {
        let total = self.statuses.len();
        let completed = self
            .statuses
            .iter()
            .filter(|s| matches!(s, CellStatus::Completed))
            .count();
        let unstable = self
            .statuses
            .iter()
            .filter(|s| matches!(s, CellStatus::Unstable { .. }))
            .count();

        let finished = completed + unstable;

        if finished == 0 {
            SweepSummary::NoValidCells
        } else if finished < total {
            SweepSummary::Cancelled {
                finished,
                unstable,
                total,
            }
        } else if unstable > 0 {
            SweepSummary::PartiallyUnstable { unstable, total }
        } else {
            SweepSummary::Success
        }
    }

    /// One `NumericInstability` error per unstable cell
    pub fn instabilities(&self) -> Vec<IsingError> {
        iproduct!(0..self.temperatures.len(), 0..self.fields.len())
            .filter_map(|(i, j)| match self.status(i, j) {
                CellStatus::Unstable { saturated_steps } => Some(IsingError::NumericInstability {
                    temperature: self.temperatures[i],
                    field: self.fields[j],
                    saturated_steps,
                }),
                _ => None,
            })
            .collect()
    }
}

/// Parameter-grid orchestrator.
///
/// Builds one base lattice, clones it for every (T, B) cell and runs an
/// independent chain per cell, temperature on the outer axis.
pub struct Sweep {
    params: SweepParams,
    cancel: CancelToken,
}

impl Sweep {
    /// Validates `params`; no chain is run on invalid input.
    pub fn new(params: SweepParams) -> IsingResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn params(&self) -> &SweepParams {
        &self.params
    }

    pub fn run(&self, observer: &dyn SimulationObserver) -> IsingResult<SweepOutcome> {
        let params = &self.params;
        let master_seed = params.seed.resolve();
        let base = Lattice::new(
            params.lattice_size,
            params.init,
            derive_chain_seed(master_seed, BASE_LATTICE_STREAM),
        )?;

        let drivers = iproduct!(
            params.temperatures.iter().copied().enumerate(),
            params.fields.iter().copied().enumerate()
        )
        .map(|((i, temperature), (j, field))| {
            let point = SimulationPoint {
                temperature,
                field,
                temperature_index: i,
                field_index: j,
            };
            ChainDriver::new(point, params.total_steps, params.record_from)
        })
        .collect::<IsingResult<Vec<_>>>()?;

        observer.sweep_started(params.temperatures.len(), params.fields.len(), master_seed);

        let cells = match params.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(|| self.run_cells(&base, &drivers, master_seed, observer)),
            None => self.run_cells(&base, &drivers, master_seed, observer),
        };

        let shape = [
            params.temperatures.len(),
            params.fields.len(),
            params.series_len(),
        ];
        let mut tensor = HistoryTensor::unfilled(shape);
        let mut statuses = Vec::with_capacity(cells.len());
        for (driver, (status, series)) in drivers.iter().zip(cells) {
            if let Some(series) = series {
                let point = driver.point();
                tensor.set_series(point.temperature_index, point.field_index, &series);
            }
            statuses.push(status);
        }

        let outcome = SweepOutcome {
            tensor,
            statuses,
            temperatures: params.temperatures.clone(),
            fields: params.fields.clone(),
            master_seed,
        };
        observer.sweep_finished(&outcome.summary());
        Ok(outcome)
    }

    fn run_cells(
        &self,
        base: &Lattice,
        drivers: &[ChainDriver],
        master_seed: u64,
        observer: &dyn SimulationObserver,
    ) -> Vec<(CellStatus, Option<MagnetizationSeries>)> {
        drivers
            .par_iter()
            .enumerate()
            .map(|(cell_index, driver)| {
                if self.cancel.is_cancelled() {
                    observer.cell_skipped(driver.point(), &CellStatus::Cancelled);
                    return (CellStatus::Cancelled, None);
                }

                let rng = ChainRng::for_chain(master_seed, cell_index as u64);
                let mut chain = Chain::new(base.clone(), rng);
                let report = driver.run(&mut chain, observer);
                let status = if report.is_stable() {
                    CellStatus::Completed
                } else {
                    CellStatus::Unstable {
                        saturated_steps: report.saturated_steps,
                    }
                };
                (status, Some(report.series))
            })
            .collect()
    }
}

/// Run a full sweep from an all-aligned lattice with entropy seeding.
pub fn sweep(
    lattice_size: usize,
    total_steps: usize,
    temperatures: &[f64],
    fields: &[f64],
    record_from: usize,
) -> IsingResult<HistoryTensor> {
    let params = SweepParams::new(
        lattice_size,
        total_steps,
        temperatures.to_vec(),
        fields.to_vec(),
        record_from,
    );
    Ok(Sweep::new(params)?.run(&NullObserver)?.tensor)
}
