//! Random number generation for floor layouts
//!
//! Layout generation never owns its RNG. It draws from whatever stream the
//! caller passes in, so one top-level seed reproduces a whole floor.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A shared source of random draws.
///
/// Implementors must be deterministic for a given internal state: the same
/// sequence of calls has to yield the same sequence of values.
pub trait RandomSource {
    /// Returns a value in `min..max_exclusive`.
    ///
    /// Returns `min` when the range is empty.
    fn next_int(&mut self, min: i32, max_exclusive: i32) -> i32;

    /// Returns a value in `[0, 1)`.
    fn next_double(&mut self) -> f64;

    /// Returns an index in `0..len`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        let upper = i32::try_from(len).unwrap_or(i32::MAX);
        self.next_int(0, upper) as usize
    }

    /// Shuffle a slice in place
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_int(&mut self, min: i32, max_exclusive: i32) -> i32 {
        (**self).next_int(min, max_exclusive)
    }

    fn next_double(&mut self) -> f64 {
        (**self).next_double()
    }
}

/// Floor random number generator
///
/// Wraps ChaCha8Rng for reproducible random number generation.
/// Only the seed is serialized; deserializing restarts the stream.
#[derive(Debug, Clone)]
pub struct FloorRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl Serialize for FloorRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FloorRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(FloorRng::new(seed))
    }
}

impl FloorRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        let seed = rand::random();
        Self::new(seed)
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for FloorRng {
    fn next_int(&mut self, min: i32, max_exclusive: i32) -> i32 {
        if max_exclusive <= min {
            return min;
        }
        self.rng.gen_range(min..max_exclusive)
    }

    fn next_double(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }
}

impl Default for FloorRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_int_bounds() {
        let mut rng = FloorRng::new(42);
        for _ in 0..1000 {
            let n = rng.next_int(-3, 4);
            assert!((-3..4).contains(&n));
        }
    }

    #[test]
    fn test_next_double_bounds() {
        let mut rng = FloorRng::new(42);
        for _ in 0..1000 {
            let x = rng.next_double();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_empty_range() {
        let mut rng = FloorRng::new(42);
        assert_eq!(rng.next_int(5, 5), 5);
        assert_eq!(rng.next_int(5, 2), 5);
    }

    #[test]
    fn test_reproducibility() {
        let mut rng1 = FloorRng::new(42);
        let mut rng2 = FloorRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_int(0, 100), rng2.next_int(0, 100));
            assert_eq!(rng1.next_double().to_bits(), rng2.next_double().to_bits());
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = FloorRng::new(7);
        let mut items = [0, 1, 2, 3];
        rng.shuffle(&mut items);
        let mut sorted = items;
        sorted.sort_unstable();
        assert_eq!(sorted, [0, 1, 2, 3]);
    }

    #[test]
    fn test_serde_keeps_seed() {
        let rng = FloorRng::new(1234);
        let json = serde_json::to_string(&rng).unwrap();
        let restored: FloorRng = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.seed(), 1234);
    }
}
