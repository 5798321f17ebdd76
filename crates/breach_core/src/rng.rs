//! Deterministic random source.
//!
//! Every match owns one [`SeededRandom`] built from the match seed. Two
//! instances with the same seed, driven by the same sequence of calls,
//! produce identical outputs. Replays depend on this.
//!
//! ```
//! use breach_core::rng::SeededRandom;
//!
//! let mut a = SeededRandom::new(42);
//! let mut b = SeededRandom::new(42);
//! assert_eq!(a.next_int(1, 6), b.next_int(1, 6));
//! assert_eq!(a.shuffle(vec![1, 2, 3, 4]), b.shuffle(vec![1, 2, 3, 4]));
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded generator for integers and permutations.
///
/// Uses ChaCha8, which is portable across platforms, so the same seed
/// builds the same decks everywhere. Not meant to be shared between
/// threads; each match (or simulated game) creates its own.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    inner: ChaCha8Rng,
    seed: u64,
}

impl SeededRandom {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this generator was built from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in `[min, max]`, both ends inclusive.
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn next_int(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.inner.gen_range(lo..=hi)
    }

    /// Shuffle a slice in place (Fisher-Yates).
    pub fn shuffle_in_place<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }

    /// Return a shuffled permutation of `items`.
    #[must_use]
    pub fn shuffle<T>(&mut self, mut items: Vec<T>) -> Vec<T> {
        self.shuffle_in_place(&mut items);
        items
    }
}
