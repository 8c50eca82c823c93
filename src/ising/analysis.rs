//! Utility functions for analyzing sweep results

use crate::ising::sweep::SweepOutcome;

/// Critical temperature for 2D Ising model (exact result)
/// T_c = 2J / (k_B * ln(1 + √2)) ≈ 2.269 J/k_B
pub fn critical_temperature() -> f64 {
    2.0 / (1.0 + 2.0_f64.sqrt()).ln()
}

/// Theoretical energy per site at T=0, B=0 (all spins aligned)
pub fn energy_per_site_at_zero_temp() -> f64 {
    // Each spin has 4 aligned neighbors, E = -J * 4 / 2 = -2J per site
    -2.0
}

/// Arithmetic mean of a series, `None` when empty or not finite
pub fn mean(series: &[f64]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let mean = series.iter().sum::<f64>() / series.len() as f64;
    mean.is_finite().then_some(mean)
}

/// Mean magnetization over recorded steps for every (T, B) cell.
///
/// Indexed `[temperature][field]`; cells without data are `None`.
pub fn mean_magnetization(outcome: &SweepOutcome) -> Vec<Vec<Option<f64>>> {
    (0..outcome.temperatures.len())
        .map(|i| {
            (0..outcome.fields.len())
                .map(|j| {
                    if outcome.status(i, j).has_data() {
                        mean(outcome.tensor.series(i, j))
                    } else {
                        None
                    }
                })
                .collect()
        })
        .collect()
}
