//! Deterministic per-chain random streams.
//!
//! Every chain owns its own stream, seeded from (master_seed, cell_index).
//! No stream is ever shared between chains, so each grid cell is
//! reproducible in isolation and independent of the thread it ran on.

use rand::{Error, Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

/// Substream reserved for the randomized base lattice.
pub const BASE_LATTICE_STREAM: u64 = u64::MAX;

/// How the sweep obtains its master seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStrategy {
    Fixed(u64),
    /// Draw one master seed from OS entropy per sweep; it is recorded in the outcome.
    Entropy,
}

impl SeedStrategy {
    pub fn resolve(self) -> u64 {
        match self {
            SeedStrategy::Fixed(seed) => seed,
            SeedStrategy::Entropy => rand::thread_rng().gen(),
        }
    }
}

impl From<Option<u64>> for SeedStrategy {
    fn from(seed: Option<u64>) -> Self {
        seed.map_or(SeedStrategy::Entropy, SeedStrategy::Fixed)
    }
}

/// Derive the seed of one chain's stream from the master seed.
pub fn derive_chain_seed(master_seed: u64, stream: u64) -> u64 {
    master_seed ^ stream.wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

/// Random stream owned by a single chain.
#[derive(Debug, Clone)]
pub struct ChainRng {
    inner: Pcg64Mcg,
}

impl ChainRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn for_chain(master_seed: u64, stream: u64) -> Self {
        Self::from_seed(derive_chain_seed(master_seed, stream))
    }
}

impl RngCore for ChainRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.inner.try_fill_bytes(dest)
    }
}
