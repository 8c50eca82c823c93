use crate::io::BurnoutReport;
use crate::ising::analysis::mean_magnetization;
use crate::ising::{BurnoutResult, SweepOutcome};
use tracing::{info, warn};

pub fn report_sweep_summary(outcome: &SweepOutcome) {
    let [n_temperatures, n_fields, steps] = outcome.tensor.shape();
    info!(
        "\nSweep finished: {} temperatures x {} fields x {} recorded steps (seed {})",
        n_temperatures, n_fields, steps, outcome.master_seed
    );

    for err in outcome.instabilities() {
        warn!("{}", err);
    }

    info!("\nMean magnetization:");
    for (i, row) in mean_magnetization(outcome).iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|m| m.map_or_else(|| "   n/a".to_string(), |m| format!("{:+.3}", m)))
            .collect();
        info!("  T = {:>8.4}: {}", outcome.temperatures[i], cells.join(" "));
    }
}

pub fn report_burnout(report: &BurnoutReport) {
    info!(
        "\nBurnout for cell [{}, {}] (T = {:.4}, B = {:.4}), {} samples:",
        report.temperature_index,
        report.field_index,
        report.temperature,
        report.field,
        report.series_len
    );
    match report.result {
        BurnoutResult::Converged(burn_in) => info!(
            "  burn-in ends near step {:.2} ({:.4} of the trajectory)",
            burn_in.steps, burn_in.percent
        ),
        BurnoutResult::NotConverged => warn!(
            "  trajectory has not converged within error {}",
            report.params.error
        ),
    }
}
