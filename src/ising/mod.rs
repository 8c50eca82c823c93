pub mod analysis;
pub mod burnout;
pub mod chain;
pub mod lattice;
pub mod metropolis;
pub mod observer;
pub mod rng;
pub mod sweep;

pub use burnout::{detect_burnout, BurnIn, BurnoutParams, BurnoutResult};
pub use chain::{run_chain, Chain, ChainDriver, ChainReport, MagnetizationSeries};
pub use lattice::{InitMode, Lattice, Site};
pub use metropolis::{propose_and_step, StepOutcome};
pub use observer::{NullObserver, SimulationObserver, TracingObserver};
pub use rng::{ChainRng, SeedStrategy};
pub use sweep::{
    linspace, sweep, AxisRange, CancelToken, CellStatus, HistoryTensor, SimulationPoint, Sweep,
    SweepOutcome, SweepParams, SweepSummary,
};

#[cfg(test)]
mod tests;
