//! Burn-in ("burnout") detection on a single magnetization trajectory.
//!
//! The last sample is taken as the steady-state value. If the midpoint
//! already lies within `error` of it, a fixed number of geometric
//! refinement steps walks a fractional position towards the earliest point
//! where the trajectory enters the tolerance band: each step halves in
//! size and moves earlier when the sampled value is inside the band,
//! later otherwise.
//!
//! Trajectories are noisy, so the direction signal can be locally wrong;
//! the iteration budget bounds the work rather than guaranteeing an exact
//! answer.

use serde::{Deserialize, Serialize};

use crate::error::{IsingError, IsingResult};

pub const DEFAULT_ITERATIONS: usize = 10;
pub const DEFAULT_INITIAL_PERCENT: f64 = 0.5;
pub const DEFAULT_ERROR: f64 = 0.01;

/// Estimated burn-in cutoff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurnIn {
    /// Fractional position in [0, 1]
    pub percent: f64,
    /// `percent * len`, deliberately not rounded
    pub steps: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BurnoutResult {
    Converged(BurnIn),
    /// The midpoint is still outside the tolerance band around the final value
    NotConverged,
}

impl BurnoutResult {
    pub fn steps(&self) -> Option<f64> {
        match self {
            BurnoutResult::Converged(burn_in) => Some(burn_in.steps),
            BurnoutResult::NotConverged => None,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, BurnoutResult::Converged(_))
    }
}

/// Tuning knobs of the detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurnoutParams {
    pub iterations: usize,
    pub initial_percent: f64,
    pub error: f64,
}

impl Default for BurnoutParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            initial_percent: DEFAULT_INITIAL_PERCENT,
            error: DEFAULT_ERROR,
        }
    }
}

impl BurnoutParams {
    pub fn validate(&self) -> IsingResult<()> {
        if self.iterations == 0 {
            return Err(IsingError::config("burnout iterations must be positive"));
        }
        if !(self.initial_percent > 0.0 && self.initial_percent < 1.0) {
            return Err(IsingError::config(format!(
                "burnout initial_percent must lie in (0, 1), got {}",
                self.initial_percent
            )));
        }
        if !(self.error.is_finite() && self.error > 0.0) {
            return Err(IsingError::config(format!(
                "burnout error must be positive and finite, got {}",
                self.error
            )));
        }
        Ok(())
    }

    pub fn detect(&self, series: &[f64]) -> IsingResult<BurnoutResult> {
        detect_burnout(series, self.iterations, self.initial_percent, self.error)
    }
}

#[inline]
fn sample(series: &[f64], percent: f64) -> f64 {
    let last = series.len() - 1;
    let index = (percent * last as f64).floor() as usize;
    series[index.min(last)]
}

/// Estimate the burn-in cutoff of `series`.
///
/// `iterations` is the fixed refinement budget; the loop always runs it in full.
pub fn detect_burnout(
    series: &[f64],
    iterations: usize,
    initial_percent: f64,
    error: f64,
) -> IsingResult<BurnoutResult> {
    BurnoutParams {
        iterations,
        initial_percent,
        error,
    }
    .validate()?;
    if series.is_empty() {
        return Err(IsingError::config("cannot detect burn-in on an empty series"));
    }

    let len = series.len();
    let h1 = series[len - 1];
    let h2 = sample(series, 0.5);

    // NaN compares false, so a NaN endpoint also lands here
    if !((h1 - h2).abs() < error) {
        return Ok(BurnoutResult::NotConverged);
    }

    let mut percent = initial_percent;
    let mut direction = -1.0;
    for i in 0..iterations {
        let exponent = i32::try_from(i + 2).unwrap_or(i32::MAX);
        percent = (percent + direction * 0.5f64.powi(exponent)).clamp(0.0, 1.0);

        let value = sample(series, percent);
        direction = if (value - h1).abs() < error { -1.0 } else { 1.0 };
    }

    Ok(BurnoutResult::Converged(BurnIn {
        percent,
        steps: percent * len as f64,
    }))
}
