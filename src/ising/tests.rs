
use super::*;
use crate::error::IsingError;
use approx::*;

fn checkerboard(size: usize) -> Lattice {
    let rows: Vec<Vec<i8>> = (0..size)
        .map(|i| (0..size).map(|j| if (i + j) % 2 == 0 { 1 } else { -1 }).collect())
        .collect();
    Lattice::from_rows(&rows).unwrap()
}

#[test]
fn test_lattice_creation() {
    let lattice = Lattice::aligned(10).unwrap();
    assert_eq!(lattice.size(), 10);
    assert_eq!(lattice.num_sites(), 100);
    assert_eq!(lattice.spins().nrows(), 10);
    assert_eq!(lattice.spins().ncols(), 10);
}

#[test]
fn test_zero_size_is_config_error() {
    assert!(matches!(
        Lattice::new(0, InitMode::AllAligned, 1),
        Err(IsingError::Config(_))
    ));
    assert!(matches!(Lattice::from_rows(&[]), Err(IsingError::Config(_))));
}

#[test]
fn test_from_rows_rejects_bad_input() {
    assert!(Lattice::from_rows(&[vec![1, 1], vec![1]]).is_err());
    assert!(Lattice::from_rows(&[vec![1, 0], vec![1, 1]]).is_err());
}

#[test]
fn test_ordered_state() {
    for size in [1, 2, 5, 17] {
        let up = Lattice::aligned(size).unwrap();
        assert_eq!(up.magnetization(), 1.0);

        let down = Lattice::from_rows(&vec![vec![-1i8; size]; size]).unwrap();
        assert_eq!(down.magnetization(), -1.0);
    }

    let ising = Lattice::aligned(5).unwrap();
    assert_relative_eq!(
        ising.energy_per_site(0.0),
        analysis::energy_per_site_at_zero_temp(),
        epsilon = 1e-10
    );
}

#[test]
fn test_energy_calculation() {
    let mut ising = Lattice::aligned(3).unwrap();
    let initial_energy = ising.energy(0.0);

    // Flip one spin and check energy change
    ising.flip(Site::new(1, 1));
    let new_energy = ising.energy(0.0);

    // The energy should increase by 8J (one spin surrounded by 4 opposite neighbors)
    assert_relative_eq!(new_energy - initial_energy, 8.0, epsilon = 1e-10);
}

#[test]
fn test_periodic_boundary_conditions() {
    let mut ising = Lattice::aligned(3).unwrap();
    ising.flip(Site::new(2, 0));
    ising.flip(Site::new(1, 2));

    assert_eq!(ising.spin_wrapped(-1, 0), -1); // wraps to (2, 0)
    assert_eq!(ising.spin_wrapped(3, 1), 1); // wraps to (0, 1)
    assert_eq!(ising.spin_wrapped(1, -1), -1); // wraps to (1, 2)
    assert_eq!(ising.spin_wrapped(4, 5), -1); // wraps to (1, 2)
    assert_eq!(lattice::wrap(-4, 3), 2);
}

#[test]
fn test_neighbor_sum_wraps_at_corner() {
    let mut ising = Lattice::aligned(4).unwrap();
    // Neighbours of (0, 0) are (3, 0), (1, 0), (0, 3), (0, 1)
    ising.flip(Site::new(3, 0));
    ising.flip(Site::new(0, 3));
    assert_eq!(ising.neighbor_sum(Site::new(0, 0)), 0);
    assert_relative_eq!(ising.delta_energy(Site::new(0, 0), 0.5), 1.0, epsilon = 1e-12);
}

#[test]
fn test_neighbor_sum_matches_explicit_neighbours() {
    let lattice = Lattice::new(5, InitMode::RandomSign, 3).unwrap();
    let n = lattice.size();
    for row in 0..n {
        for col in 0..n {
            let expected: i32 = [
                Site::new((row + n - 1) % n, col),
                Site::new((row + 1) % n, col),
                Site::new(row, (col + n - 1) % n),
                Site::new(row, (col + 1) % n),
            ]
            .iter()
            .map(|&s| i32::from(lattice.spin(s)))
            .sum();
            assert_eq!(lattice.neighbor_sum(Site::new(row, col)), expected);
        }
    }
}

#[test]
fn test_delta_energy_matches_energy_difference() {
    let lattice = Lattice::new(6, InitMode::RandomSign, 11).unwrap();
    for &field in &[0.0, 0.35, -1.0] {
        for row in 0..6 {
            for col in 0..6 {
                let site = Site::new(row, col);
                let mut flipped = lattice.clone();
                flipped.flip(site);
                assert_relative_eq!(
                    lattice.energy(field) + lattice.delta_energy(site, field),
                    flipped.energy(field),
                    epsilon = 1e-9
                );
            }
        }
    }
}

#[test]
fn test_flip_keeps_spin_sum() {
    let mut lattice = checkerboard(4);
    assert_eq!(lattice.spin_sum(), 0);
    lattice.flip(Site::new(0, 1));
    lattice.flip(Site::new(2, 3));
    lattice.flip(Site::new(2, 3));
    let recomputed: i64 = lattice.spins().iter().map(|&s| i64::from(s)).sum();
    assert_eq!(lattice.spin_sum(), recomputed);
    assert_relative_eq!(lattice.magnetization(), 2.0 / 16.0);
}

#[test]
fn test_random_init_is_seeded() {
    let a = Lattice::new(8, InitMode::RandomSign, 5).unwrap();
    let b = Lattice::new(8, InitMode::RandomSign, 5).unwrap();
    let c = Lattice::new(8, InitMode::RandomSign, 6).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.spins().iter().all(|&s| s == 1 || s == -1));
}

#[test]
fn test_negative_delta_energy_always_accepted() {
    // On a 1x1 lattice the only site is its own neighbour: ΔE = 8 + 2 B s
    let mut lattice = Lattice::aligned(1).unwrap();
    let mut rng = ChainRng::from_seed(3);

    let outcome = propose_and_step(&mut lattice, 1.0, -10.0, &mut rng);
    assert!(outcome.accepted);
    assert_relative_eq!(outcome.delta_energy, -12.0);
    assert_eq!(lattice.magnetization(), -1.0);
}

#[test]
fn test_log_space_acceptance() {
    let (accepted, saturated) = metropolis::accept(1.0, 1.0, 0.0);
    assert!(accepted && !saturated);

    let (accepted, saturated) = metropolis::accept(1.0, 1.0, 0.5);
    assert_eq!(accepted, 0.5f64 < (-1.0f64).exp());
    assert!(!saturated);

    // exp(-800) underflows, the log form still rejects cleanly
    let (accepted, saturated) = metropolis::accept(8.0, 0.01, 1e-300);
    assert!(!accepted && !saturated);

    let (accepted, saturated) = metropolis::accept(8.0, 1e-310, 0.25);
    assert!(!accepted);
    assert!(saturated);
}

#[test]
fn test_ground_state_stability() {
    for seed in 0..5 {
        let mut lattice = Lattice::aligned(4).unwrap();
        let report = run_chain(&mut lattice, 0.01, 0.0, 1000, 0, ChainRng::from_seed(seed)).unwrap();
        assert_eq!(report.accepted, 0);
        assert_eq!(report.final_magnetization, 1.0);
        assert_eq!(lattice.magnetization(), 1.0);
        assert!(report.series.iter().all(|&m| m == 1.0));
    }
}

#[test]
fn test_high_temperature_demagnetizes() {
    let mut tail_means = Vec::new();
    for seed in 0..8 {
        let mut lattice = Lattice::aligned(8).unwrap();
        let report =
            run_chain(&mut lattice, 1000.0, 0.0, 20_000, 10_000, ChainRng::from_seed(seed)).unwrap();
        assert!(report.acceptance_rate() > 0.95);
        tail_means.push(analysis::mean(&report.series).unwrap().abs());
    }
    let overall = tail_means.iter().sum::<f64>() / tail_means.len() as f64;
    assert!(overall < 0.3, "mean |m| = {}", overall);
}

#[test]
fn test_chain_series_length_and_step_counter() {
    let driver = ChainDriver::new(SimulationPoint::new(2.0, 0.1), 250, 50).unwrap();
    let mut chain = Chain::seeded(Lattice::aligned(6).unwrap(), 9);
    let report = driver.run(&mut chain, &NullObserver);

    assert_eq!(report.series.len(), 200);
    assert_eq!(driver.series_len(), 200);
    assert_eq!(chain.step(), 250);
    assert_eq!(report.steps, 250);
    assert!(report.series.iter().all(|m| (-1.0..=1.0).contains(m)));
    assert_eq!(report.final_magnetization, *report.series.last().unwrap());
    assert_eq!(chain.lattice().magnetization(), report.final_magnetization);
}

#[test]
fn test_record_from_matches_truncated_full_history() {
    let point = SimulationPoint::new(2.2, -0.2);
    let full = ChainDriver::new(point, 500, 0)
        .unwrap()
        .run(&mut Chain::seeded(Lattice::aligned(5).unwrap(), 42), &NullObserver);
    let burned = ChainDriver::new(point, 500, 120)
        .unwrap()
        .run(&mut Chain::seeded(Lattice::aligned(5).unwrap(), 42), &NullObserver);

    assert_eq!(full.series.len(), 500);
    assert_eq!(&full.series[120..], burned.series.as_slice());
}

#[test]
fn test_record_from_bounds() {
    let point = SimulationPoint::new(1.0, 0.0);
    assert!(ChainDriver::new(point, 10, 10).is_ok());
    assert_eq!(ChainDriver::new(point, 10, 10).unwrap().series_len(), 0);
    assert!(matches!(
        ChainDriver::new(point, 10, 11),
        Err(IsingError::Config(_))
    ));
    // the series would not fit in memory
    assert!(matches!(
        ChainDriver::new(point, usize::MAX, 0),
        Err(IsingError::Config(_))
    ));
    assert!(ChainDriver::new(point, usize::MAX, usize::MAX).is_ok());
}

#[test]
fn test_non_positive_temperature_rejected() {
    for temperature in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let mut lattice = Lattice::aligned(3).unwrap();
        let result = run_chain(&mut lattice, temperature, 0.0, 10, 0, ChainRng::from_seed(1));
        assert!(matches!(result, Err(IsingError::Config(_))));
    }
}

#[test]
fn test_tiny_temperature_reports_saturation() {
    let mut lattice = Lattice::aligned(3).unwrap();
    let report = run_chain(&mut lattice, 1e-310, 0.0, 50, 0, ChainRng::from_seed(2)).unwrap();
    assert_eq!(report.saturated_steps, 50);
    assert!(!report.is_stable());
    assert_eq!(report.final_magnetization, 1.0);
}

#[test]
fn test_chain_is_reproducible_and_seed_dependent() {
    let run = |seed| {
        let mut lattice = Lattice::aligned(8).unwrap();
        run_chain(&mut lattice, 2.5, 0.0, 2000, 0, ChainRng::from_seed(seed))
            .unwrap()
            .series
    };
    assert_eq!(run(10), run(10));
    assert_ne!(run(10), run(11));
}

#[test]
fn test_derived_chain_seeds_differ() {
    let seeds: Vec<u64> = (0..16).map(|k| rng::derive_chain_seed(7, k)).collect();
    for (a, sa) in seeds.iter().enumerate() {
        for sb in &seeds[a + 1..] {
            assert_ne!(sa, sb);
        }
    }
}

#[test]
fn test_linspace_inclusive() {
    let values = linspace(-1.0, 1.0, 5);
    assert_eq!(values, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
    assert!(linspace(0.0, 1.0, 0).is_empty());
    assert_eq!(*AxisRange::new(0.1, 0.7, 4).values().last().unwrap(), 0.7);
}

#[test]
fn test_critical_temperature() {
    let t_c = analysis::critical_temperature();
    assert_relative_eq!(t_c, 2.269, epsilon = 0.001);
}

#[test]
fn test_burnout_constant_series() {
    let series = vec![0.7; 100];
    let result = detect_burnout(&series, 10, 0.5, 0.01).unwrap();
    match result {
        BurnoutResult::Converged(burn_in) => {
            assert!(burn_in.steps < 1.0);
            assert_relative_eq!(burn_in.percent, 0.5f64.powi(11), epsilon = 1e-12);
        }
        BurnoutResult::NotConverged => panic!("constant series must converge"),
    }
}

#[test]
fn test_burnout_step_change_not_converged() {
    let mut series = vec![0.2; 50];
    series.extend(vec![0.9; 50]);
    let result = detect_burnout(&series, 10, 0.5, 0.01).unwrap();
    assert_eq!(result, BurnoutResult::NotConverged);
    assert_eq!(result.steps(), None);
}

#[test]
fn test_burnout_locates_transient() {
    let mut series = vec![0.0; 30];
    series.extend(vec![0.5; 70]);
    let result = BurnoutParams::default().detect(&series).unwrap();
    let steps = result.steps().unwrap();
    assert!((29.0..32.0).contains(&steps), "estimate {}", steps);
    // fractional estimates are kept as-is
    assert!(steps.fract() != 0.0);
}

#[test]
fn test_burnout_single_sample() {
    let result = detect_burnout(&[0.3], 4, 0.5, 0.1).unwrap();
    assert!(result.is_converged());
}

#[test]
fn test_burnout_invalid_input() {
    let series = vec![0.5; 10];
    assert!(detect_burnout(&[], 10, 0.5, 0.01).is_err());
    assert!(detect_burnout(&series, 0, 0.5, 0.01).is_err());
    assert!(detect_burnout(&series, 10, 0.0, 0.01).is_err());
    assert!(detect_burnout(&series, 10, 1.0, 0.01).is_err());
    assert!(detect_burnout(&series, 10, 0.5, 0.0).is_err());
    assert!(detect_burnout(&series, 10, 0.5, f64::NAN).is_err());
}

#[test]
fn test_burnout_large_budget_stays_in_range() {
    let mut series = vec![-0.4; 10];
    series.extend(vec![0.1; 90]);
    let result = detect_burnout(&series, 200, 0.5, 0.05).unwrap();
    let steps = result.steps().unwrap();
    assert!((0.0..=100.0).contains(&steps));
}
