use rand::Rng;

use crate::ising::lattice::{Lattice, Site};

/// Result of one single-spin-flip proposal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub site: Site,
    pub delta_energy: f64,
    pub accepted: bool,
    /// The Boltzmann exponent -ΔE/T was not finite for this proposal
    pub saturated: bool,
}

/// Metropolis acceptance test in log space.
///
/// Accepts when `ln(u) < -ΔE / T`, which is the same event as
/// `u < exp(-ΔE / T)` without underflowing the exponential at low
/// temperature. Returns `(accepted, saturated)`.
#[inline]
pub fn accept(delta_energy: f64, temperature: f64, uniform: f64) -> (bool, bool) {
    let exponent = -delta_energy / temperature;
    (uniform.ln() < exponent, !exponent.is_finite())
}

/// Propose flipping one uniformly chosen site and apply the Metropolis rule.
///
/// Draws row then column from `rng`, plus one extra uniform draw only when
/// ΔE > 0. `temperature` is validated by the chain driver, never here.
#[inline]
pub fn propose_and_step<R: Rng + ?Sized>(
    lattice: &mut Lattice,
    temperature: f64,
    field: f64,
    rng: &mut R,
) -> StepOutcome {
    let n = lattice.size();
    let site = Site::new(rng.gen_range(0..n), rng.gen_range(0..n));
    let delta_energy = lattice.delta_energy(site, field);

    let (accepted, saturated) = if delta_energy <= 0.0 {
        (true, false)
    } else {
        accept(delta_energy, temperature, rng.gen::<f64>())
    };

    if accepted {
        lattice.flip(site);
    }

    StepOutcome {
        site,
        delta_energy,
        accepted,
        saturated,
    }
}
