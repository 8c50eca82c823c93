//! Error taxonomy for the simulation core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IsingError {
    /// Invalid static configuration, raised before any simulation work starts.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(
        "Numeric instability at T={temperature}, B={field}: \
         {saturated_steps} steps had a non-finite Boltzmann exponent"
    )]
    NumericInstability {
        temperature: f64,
        field: f64,
        saturated_steps: u64,
    },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl IsingError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        IsingError::Config(message.into())
    }
}

pub type IsingResult<T> = Result<T, IsingError>;
