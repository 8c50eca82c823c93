//! Input/Output operations for Ising sweeps
//!
//! This module handles logging setup, phase timing and result persistence.

mod output;
mod store;

pub use output::{setup_output, Timer};
pub use store::{
    load_results, write_burnout_report, BurnoutReport, RunDirectory, StoredCell, SweepRecord,
    CONFIG_FILE, RESULTS_FILE,
};
