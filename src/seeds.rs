//! Seed management for world generation
//!
//! Provides separate seeds for each generation system, allowing fine-grained control
//! over which aspects of world generation to vary or keep constant.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeds for all world generation systems.
///
/// Each system gets its own seed, derived from a master seed. Fields are
/// public so a single system can be varied while the others stay fixed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Point sampling jitter for the mesh
    pub mesh: u64,
    /// Island placement and deep-ocean island roots
    pub land: u64,
    /// Coherent noise for elevation, deep-ocean bands and aridity
    pub noise: u64,
    /// Spring selection for the river simulation
    pub hydrology: u64,
    /// Landmass display colors
    pub landmass: u64,
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            mesh: derive_seed(master, "mesh"),
            land: derive_seed(master, "land"),
            noise: derive_seed(master, "noise"),
            hydrology: derive_seed(master, "hydrology"),
            landmass: derive_seed(master, "landmass"),
        }
    }

    /// Seed from the wall clock, for runs without an explicit seed.
    pub fn from_clock() -> Self {
        Self::from_master(chrono::Utc::now().timestamp_millis() as u64)
    }

    /// Fresh RNG for one generation system.
    pub fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    /// Offset added to every noise sample position, so worlds sharing a noise
    /// permutation still sample different regions of noise space.
    pub fn noise_offset(&self) -> f64 {
        Self::rng(self.noise).gen_range(0.0..1024.0)
    }
}

/// Derive a sub-seed from a master seed and a system name.
/// Uses hashing to ensure different systems get different but deterministic seeds.
fn derive_seed(master: u64, system: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    system.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, mesh: {}, land: {}, noise: {}, hydrology: {}, landmass: {} }}",
            self.master, self.mesh, self.land, self.noise, self.hydrology, self.landmass,
        )
    }
}
