use approx::assert_abs_diff_eq;
use ising_mc::ising::{detect_burnout, BurnoutResult, ChainRng, InitMode, Lattice, Site};
use ising_mc::ising::metropolis::propose_and_step;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_delta_energy_matches_full_recompute(
        size in 2usize..8,
        seed in any::<u64>(),
        field in -2.0f64..2.0,
        row in 0usize..8,
        col in 0usize..8,
    ) {
        let mut lattice = Lattice::new(size, InitMode::RandomSign, seed).unwrap();
        let site = Site::new(row % size, col % size);

        let before = lattice.energy(field);
        let predicted = lattice.delta_energy(site, field);
        lattice.flip(site);
        let after = lattice.energy(field);

        assert_abs_diff_eq!(after - before, predicted, epsilon = 1e-9);
    }

    #[test]
    fn prop_spin_sum_tracks_flips(
        size in 1usize..8,
        seed in any::<u64>(),
        steps in 1usize..200,
        temperature in 0.1f64..10.0,
        field in -1.0f64..1.0,
    ) {
        let mut lattice = Lattice::new(size, InitMode::RandomSign, seed).unwrap();
        let mut rng = ChainRng::from_seed(seed);
        for _ in 0..steps {
            propose_and_step(&mut lattice, temperature, field, &mut rng);
        }
        let recount: i64 = lattice.spins().iter().map(|&s| i64::from(s)).sum();
        assert_eq!(lattice.spin_sum(), recount);
        assert!(lattice.magnetization().abs() <= 1.0);
    }

    #[test]
    fn prop_burnout_estimate_stays_in_range(
        series in proptest::collection::vec(-1.0f64..1.0, 1..200),
        iterations in 1usize..30,
        initial_percent in 0.01f64..0.99,
        error in 0.001f64..1.0,
    ) {
        let len = series.len();
        match detect_burnout(&series, iterations, initial_percent, error).unwrap() {
            BurnoutResult::Converged(burn_in) => {
                assert!((0.0..=1.0).contains(&burn_in.percent));
                assert!(burn_in.steps >= 0.0 && burn_in.steps <= len as f64);
                assert!((series[len - 1] - series[(len - 1) / 2]).abs() < error);
            }
            BurnoutResult::NotConverged => {
                assert!((series[len - 1] - series[(len - 1) / 2]).abs() >= error);
            }
        }
    }
}
