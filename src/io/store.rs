//! Result persistence: run directories, sweep records and burn-in reports

use crate::config::Config;
use crate::ising::analysis::mean_magnetization;
use crate::ising::burnout::{BurnoutParams, BurnoutResult};
use crate::ising::sweep::{CellStatus, SweepOutcome, SweepParams};
use color_eyre::eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const RESULTS_FILE: &str = "results.json";
pub const CONFIG_FILE: &str = "config.yaml";

/// One grid cell as written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCell {
    pub temperature_index: usize,
    pub field_index: usize,
    pub temperature: f64,
    pub field: f64,
    pub status: CellStatus,
    /// Empty for cells without data
    pub magnetization: Vec<f64>,
}

/// Serialized form of a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    pub master_seed: u64,
    pub lattice_size: usize,
    pub total_steps: usize,
    pub record_from: usize,
    /// `[temperatures, fields, recorded steps]`
    pub shape: [usize; 3],
    pub temperatures: Vec<f64>,
    pub fields: Vec<f64>,
    /// `[temperature][field]` mean magnetization over recorded steps
    pub mean_magnetization: Vec<Vec<Option<f64>>>,
    pub cells: Vec<StoredCell>,
}

impl SweepRecord {
    pub fn from_outcome(outcome: &SweepOutcome, params: &SweepParams) -> Self {
        let [n_temperatures, n_fields, _] = outcome.tensor.shape();
        let mut cells = Vec::with_capacity(n_temperatures * n_fields);
        for i in 0..n_temperatures {
            for j in 0..n_fields {
                let status = outcome.status(i, j);
                let magnetization = if status.has_data() {
                    outcome.tensor.series(i, j).to_vec()
                } else {
                    Vec::new()
                };
                cells.push(StoredCell {
                    temperature_index: i,
                    field_index: j,
                    temperature: outcome.temperatures[i],
                    field: outcome.fields[j],
                    status,
                    magnetization,
                });
            }
        }

        Self {
            master_seed: outcome.master_seed,
            lattice_size: params.lattice_size,
            total_steps: params.total_steps,
            record_from: params.record_from,
            shape: outcome.tensor.shape(),
            temperatures: outcome.temperatures.clone(),
            fields: outcome.fields.clone(),
            mean_magnetization: mean_magnetization(outcome),
            cells,
        }
    }

    pub fn cell(&self, temperature_index: usize, field_index: usize) -> Result<&StoredCell> {
        if temperature_index >= self.shape[0] || field_index >= self.shape[1] {
            return Err(eyre!(
                "cell [{}, {}] is outside the {}x{} grid",
                temperature_index,
                field_index,
                self.shape[0],
                self.shape[1]
            ));
        }
        self.cells
            .iter()
            .find(|c| c.temperature_index == temperature_index && c.field_index == field_index)
            .ok_or_else(|| eyre!("cell [{}, {}] missing from record", temperature_index, field_index))
    }

    /// Magnetization series of one cell; fails for cells without data
    pub fn series(&self, temperature_index: usize, field_index: usize) -> Result<&[f64]> {
        let cell = self.cell(temperature_index, field_index)?;
        if cell.magnetization.is_empty() {
            return Err(eyre!(
                "cell [{}, {}] has no recorded magnetization (status {:?})",
                temperature_index,
                field_index,
                cell.status
            ));
        }
        Ok(&cell.magnetization)
    }
}

/// Burn-in estimate for one stored trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnoutReport {
    pub temperature_index: usize,
    pub field_index: usize,
    pub temperature: f64,
    pub field: f64,
    pub series_len: usize,
    pub params: BurnoutParams,
    pub result: BurnoutResult,
}

/// Directory holding every artifact of one labelled run
#[derive(Debug, Clone)]
pub struct RunDirectory {
    path: PathBuf,
}

impl RunDirectory {
    pub fn create(root: &Path, label: &str) -> Result<Self> {
        let path = root.join(label);
        fs::create_dir_all(&path)
            .wrap_err_with(|| format!("Unable to create run directory: {}", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_results(&self, record: &SweepRecord) -> Result<PathBuf> {
        let path = self.path.join(RESULTS_FILE);
        let file = File::create(&path)
            .wrap_err_with(|| format!("Unable to create results file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, record).wrap_err("Failed to serialize sweep results")?;
        writer.flush()?;
        info!("Saved magnetization history to {}", path.display());
        Ok(path)
    }

    pub fn write_config(&self, config: &Config) -> Result<PathBuf> {
        let path = self.path.join(CONFIG_FILE);
        let yaml = serde_yml::to_string(config).wrap_err("Failed to serialize configuration")?;
        fs::write(&path, yaml)
            .wrap_err_with(|| format!("Unable to write configuration: {}", path.display()))?;
        Ok(path)
    }
}

pub fn load_results(path: &Path) -> Result<SweepRecord> {
    let file = File::open(path)
        .wrap_err_with(|| format!("Unable to open results file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .wrap_err_with(|| format!("Failed to parse results file: {}", path.display()))
}

/// Write a burn-in report next to `results_path`
pub fn write_burnout_report(results_path: &Path, report: &BurnoutReport) -> Result<PathBuf> {
    let dir = results_path.parent().unwrap_or_else(|| Path::new("."));
    let path = dir.join(format!(
        "burnout_{}_{}.json",
        report.temperature_index, report.field_index
    ));
    let json = serde_json::to_string_pretty(report).wrap_err("Failed to serialize burnout report")?;
    fs::write(&path, json)
        .wrap_err_with(|| format!("Unable to write burnout report: {}", path.display()))?;
    info!("Saved burnout report to {}", path.display());
    Ok(path)
}
