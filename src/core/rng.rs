//! Seeded random number generation for search and self-play.
//!
//! Each search tree owns one `GameRng`. Worker threads derive their own
//! streams with [`GameRng::fork`], so a run is reproducible from its base
//! seed regardless of how games are split across threads.
//!
//! ```
//! use tak_zero::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! let mut worker = rng.fork();
//!
//! let mut again = GameRng::new(42);
//! let mut worker_again = again.fork();
//! assert_eq!(worker.gen_unit(), worker_again.gen_unit());
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic ChaCha8-backed RNG with forking.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive an independent, deterministic stream.
    ///
    /// The n-th fork of a given seed always gets the same stream.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        Self::new(mix(self.seed ^ mix(self.fork_counter)))
    }

    /// Uniform sample from `[0, 1)`.
    pub fn gen_unit(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Pick an index by walking the cumulative distribution with one uniform
    /// draw. Returns the first index whose running sum exceeds the draw.
    ///
    /// Falls back to the last index with non-zero weight when rounding leaves
    /// the running sum just below the draw. `None` if all weights are zero.
    pub fn sample_cumulative(&mut self, weights: &[f32]) -> Option<usize> {
        let last_nonzero = weights.iter().rposition(|&w| w > 0.0)?;
        let draw = self.gen_unit();
        let mut running = 0.0;
        for (index, &weight) in weights.iter().enumerate() {
            running += weight;
            if running > draw {
                return Some(index);
            }
        }
        Some(last_nonzero)
    }
}

/// SplitMix64 finalizer; keeps nested forks distinct from their siblings.
fn mix(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
