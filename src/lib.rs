// Metropolis Monte Carlo simulation of the 2D Ising model

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod ising;

pub use error::{IsingError, IsingResult};
pub use ising::{
    detect_burnout, sweep, BurnoutResult, HistoryTensor, Lattice, Sweep, SweepOutcome,
    SweepParams,
};
