use nalgebra::DMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{IsingError, IsingResult};
use crate::ising::rng::ChainRng;

/// Coupling constant J of the nearest-neighbour interaction.
pub const COUPLING: f64 = 1.0;

/// Initial spin configuration of a freshly created lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitMode {
    /// Every spin +1 (ordered state)
    #[default]
    AllAligned,
    /// Every spin independently +1 or -1 with equal probability
    RandomSign,
}

/// A lattice site addressed by row and column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Site {
    pub row: usize,
    pub col: usize,
}

impl Site {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Map a possibly out-of-range coordinate onto `[0, size)` (periodic boundary).
#[inline]
pub fn wrap(index: i64, size: usize) -> usize {
    index.rem_euclid(size as i64) as usize
}

/// 2D Ising lattice with periodic (toroidal) boundary conditions
///
/// Spins are stored as `i8` values in {-1, +1}. The only mutation is
/// [`Lattice::flip`], which keeps the cached spin sum in step with the grid
/// so that magnetization is O(1) per Monte Carlo step.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    /// Lattice size (N x N)
    size: usize,
    /// Spin configuration: +1 or -1 for each site
    spins: DMatrix<i8>,
    /// Sum of all spins
    spin_sum: i64,
}

impl Lattice {
    /// Create a new lattice of `size x size` spins.
    ///
    /// `seed` only matters for [`InitMode::RandomSign`].
    pub fn new(size: usize, init: InitMode, seed: u64) -> IsingResult<Self> {
        if size == 0 {
            return Err(IsingError::config("lattice size must be a positive integer"));
        }

        let spins = match init {
            InitMode::AllAligned => DMatrix::from_element(size, size, 1i8),
            InitMode::RandomSign => {
                let mut rng = ChainRng::from_seed(seed);
                DMatrix::from_fn(size, size, |_, _| if rng.gen_bool(0.5) { 1 } else { -1 })
            }
        };

        Ok(Self::from_matrix(spins))
    }

    /// Create a lattice with all spins up
    pub fn aligned(size: usize) -> IsingResult<Self> {
        Self::new(size, InitMode::AllAligned, 0)
    }

    /// Build a lattice from explicit rows of spins.
    ///
    /// Rows must form a non-empty square and every value must be +1 or -1.
    pub fn from_rows(rows: &[Vec<i8>]) -> IsingResult<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(IsingError::config("lattice size must be a positive integer"));
        }
        if rows.iter().any(|row| row.len() != size) {
            return Err(IsingError::config("lattice rows must form a square grid"));
        }
        if rows.iter().flatten().any(|&s| s != 1 && s != -1) {
            return Err(IsingError::config("spins must be +1 or -1"));
        }

        Ok(Self::from_matrix(DMatrix::from_fn(size, size, |i, j| rows[i][j])))
    }

    fn from_matrix(spins: DMatrix<i8>) -> Self {
        let spin_sum = spins.iter().map(|&s| i64::from(s)).sum();
        Self {
            size: spins.nrows(),
            spins,
            spin_sum,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn num_sites(&self) -> usize {
        self.size * self.size
    }

    pub fn spin(&self, site: Site) -> i8 {
        self.spins[(site.row, site.col)]
    }

    /// Get the spin at (i, j) with periodic boundary conditions
    #[inline]
    pub fn spin_wrapped(&self, i: i64, j: i64) -> i8 {
        self.spins[(wrap(i, self.size), wrap(j, self.size))]
    }

    /// Read-only view of the spin grid
    pub fn spins(&self) -> &DMatrix<i8> {
        &self.spins
    }

    /// Flip the spin at `site` in place
    #[inline]
    pub fn flip(&mut self, site: Site) {
        let spin = &mut self.spins[(site.row, site.col)];
        *spin = -*spin;
        self.spin_sum += 2 * i64::from(*spin);
    }

    /// Sum of all spins
    pub fn spin_sum(&self) -> i64 {
        self.spin_sum
    }

    /// Magnetization per site, in [-1, 1]
    #[inline]
    pub fn magnetization(&self) -> f64 {
        self.spin_sum as f64 / self.num_sites() as f64
    }

    /// Sum of the four toroidal neighbours of `site`
    #[inline]
    pub fn neighbor_sum(&self, site: Site) -> i32 {
        let (i, j) = (site.row as i64, site.col as i64);
        [(i - 1, j), (i + 1, j), (i, j - 1), (i, j + 1)]
            .into_iter()
            .map(|(r, c)| i32::from(self.spin_wrapped(r, c)))
            .sum()
    }

    /// Energy change if the spin at `site` were flipped.
    ///
    /// ΔE = 2 * J * s_i * (Σ neighbours) + 2 * B * s_i
    #[inline]
    pub fn delta_energy(&self, site: Site, field: f64) -> f64 {
        let spin = f64::from(self.spin(site));
        let neighbors = f64::from(self.neighbor_sum(site));
        2.0 * (COUPLING * spin * neighbors + field * spin)
    }

    /// Total energy H = -J Σ<ij> s_i s_j - B Σ s_i
    pub fn energy(&self, field: f64) -> f64 {
        let n = self.size;
        let mut bonds = 0i64;

        for i in 0..n {
            for j in 0..n {
                let spin = i64::from(self.spins[(i, j)]);
                // Right and down neighbours only, to count each bond once
                let right = i64::from(self.spins[(i, (j + 1) % n)]);
                let down = i64::from(self.spins[((i + 1) % n, j)]);
                bonds += spin * (right + down);
            }
        }

        -COUPLING * bonds as f64 - field * self.spin_sum as f64
    }

    /// Energy per site
    pub fn energy_per_site(&self, field: f64) -> f64 {
        self.energy(field) / self.num_sites() as f64
    }
}
