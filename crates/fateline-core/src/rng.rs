//! Random number generator abstraction for determinism.
//!
//! In production, this wraps a seedable `StdRng`. In tests, a fixed or
//! scripted implementation is injected so shuffles are repeatable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;
}

/// Production RNG backed by `rand`'s `StdRng`.
#[derive(Debug)]
pub struct SystemRng(StdRng);

impl SystemRng {
    /// Seeds from the operating system.
    #[must_use]
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Seeds from a fixed value, for reproducible tables.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl DeterministicRng for SystemRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.0.random_range(min..=max)
    }
}

/// Uniform in-place Fisher–Yates shuffle.
#[allow(clippy::cast_possible_truncation)]
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn DeterministicRng) {
    for i in (1..items.len()).rev() {
        let j = rng.next_u32_range(0, i as u32) as usize;
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysMin;

    impl DeterministicRng for AlwaysMin {
        fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
            min
        }
    }

    #[test]
    fn test_shuffle_keeps_every_element() {
        let mut rng = SystemRng::seeded(7);
        let mut items: Vec<u32> = (0..52).collect();

        shuffle(&mut items, &mut rng);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..52).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_is_reproducible_for_equal_seeds() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();

        shuffle(&mut a, &mut SystemRng::seeded(42));
        shuffle(&mut b, &mut SystemRng::seeded(42));

        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_with_fixed_draws_swaps_towards_front() {
        // j is always 0, so each step swaps position i with the head.
        let mut items = vec![1, 2, 3];

        shuffle(&mut items, &mut AlwaysMin);

        assert_eq!(items, vec![2, 3, 1]);
    }

    #[test]
    fn test_shuffle_of_empty_and_single_is_noop() {
        let mut empty: Vec<u8> = Vec::new();
        let mut single = vec![9];

        shuffle(&mut empty, &mut AlwaysMin);
        shuffle(&mut single, &mut AlwaysMin);

        assert!(empty.is_empty());
        assert_eq!(single, vec![9]);
    }
}
