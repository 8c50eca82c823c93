//! Telemetry hooks injected into the sweep orchestrator and chain driver.

use tracing::{debug, info, warn};

use crate::ising::chain::ChainReport;
use crate::ising::sweep::{CellStatus, SimulationPoint, SweepSummary};

/// Receives progress callbacks for one sweep invocation.
///
/// Callbacks arrive from worker threads, so implementations must be `Sync`.
/// Every method has a no-op default.
pub trait SimulationObserver: Sync {
    fn sweep_started(&self, _temperatures: usize, _fields: usize, _master_seed: u64) {}

    fn chain_started(&self, _point: &SimulationPoint) {}

    fn chain_finished(&self, _point: &SimulationPoint, _report: &ChainReport) {}

    fn cell_skipped(&self, _point: &SimulationPoint, _status: &CellStatus) {}

    fn sweep_finished(&self, _summary: &SweepSummary) {}
}

/// Observer that discards every callback
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SimulationObserver for NullObserver {}

/// Forwards callbacks to `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SimulationObserver for TracingObserver {
    fn sweep_started(&self, temperatures: usize, fields: usize, master_seed: u64) {
        info!(
            "Starting sweep over {} temperatures x {} fields ({} chains), master seed {}",
            temperatures,
            fields,
            temperatures * fields,
            master_seed
        );
    }

    fn chain_started(&self, point: &SimulationPoint) {
        debug!(
            "Chain [{}, {}] started: T={:.4}, B={:.4}",
            point.temperature_index, point.field_index, point.temperature, point.field
        );
    }

    fn chain_finished(&self, point: &SimulationPoint, report: &ChainReport) {
        if report.saturated_steps > 0 {
            warn!(
                "Chain [{}, {}] at T={:.4e} had {} steps with a non-finite Boltzmann exponent",
                point.temperature_index,
                point.field_index,
                point.temperature,
                report.saturated_steps
            );
        }
        debug!(
            "Chain [{}, {}] finished: acceptance {:.4}, final magnetization {:+.4}",
            point.temperature_index,
            point.field_index,
            report.acceptance_rate(),
            report.final_magnetization
        );
    }

    fn cell_skipped(&self, point: &SimulationPoint, status: &CellStatus) {
        debug!(
            "Cell [{}, {}] skipped: {:?}",
            point.temperature_index, point.field_index, status
        );
    }

    fn sweep_finished(&self, summary: &SweepSummary) {
        match summary {
            SweepSummary::Success => info!("Sweep finished: all chains completed"),
            SweepSummary::PartiallyUnstable { unstable, total } => warn!(
                "Sweep finished: {} of {} chains were numerically unstable",
                unstable, total
            ),
            SweepSummary::Cancelled {
                finished,
                unstable,
                total,
            } => warn!(
                "Sweep cancelled: {} of {} chains finished, {} numerically unstable",
                finished, total, unstable
            ),
            SweepSummary::NoValidCells => warn!("Sweep finished without any valid cell"),
        }
    }
}
