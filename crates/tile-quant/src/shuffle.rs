//! Full-period random permutation stream.
//!
//! [`RandomShuffle`] hands out the indices `0..n` in a random order and
//! reshuffles (Fisher–Yates, via [`SliceRandom::shuffle`]) whenever all `n`
//! have been consumed. Every aligned window of `n` calls is therefore a
//! permutation, which gives the palette learner unbiased sampling without
//! replacement at the memory cost of one index vector.

use rand::seq::SliceRandom;
use rand::Rng;

/// Endless stream of random permutations of `0..n`.
#[derive(Debug, Clone)]
pub struct RandomShuffle<R> {
    values: Vec<usize>,
    current: usize,
    rng: R,
}

impl<R: Rng> RandomShuffle<R> {
    /// Create a stream over `0..n`, shuffled up front.
    ///
    /// With `n == 0` the stream is empty and [`next`](Self::next) always
    /// returns `None`.
    pub fn new(n: usize, mut rng: R) -> Self {
        let mut values: Vec<usize> = (0..n).collect();
        values.shuffle(&mut rng);
        Self {
            values,
            current: 0,
            rng,
        }
    }

    /// Number of distinct indices in each permutation.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the stream covers no indices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Next index of the current permutation.
    ///
    /// Starts a fresh, independent permutation once all `n` indices of the
    /// current one have been returned.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<usize> {
        if self.values.is_empty() {
            return None;
        }
        if self.current == self.values.len() {
            self.values.shuffle(&mut self.rng);
            self.current = 0;
        }
        let value = self.values[self.current];
        self.current += 1;
        Some(value)
    }

    /// Give the generator back once sampling is done.
    #[inline]
    pub fn into_rng(self) -> R {
        self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_single_window_is_permutation() {
        let n = 37;
        let mut shuffle = RandomShuffle::new(n, StdRng::seed_from_u64(1));
        let seen: HashSet<usize> = (0..n).filter_map(|_| shuffle.next()).collect();
        assert_eq!(seen.len(), n);
        assert!(seen.iter().all(|&v| v < n));
    }

    #[test]
    fn test_every_window_is_permutation() {
        let n = 10;
        let k = 7;
        let mut shuffle = RandomShuffle::new(n, StdRng::seed_from_u64(99));
        let stream: Vec<usize> = (0..n * k).filter_map(|_| shuffle.next()).collect();
        assert_eq!(stream.len(), n * k);

        for window in stream.chunks(n) {
            let mut sorted = window.to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_reshuffles_between_windows() {
        let n = 64;
        let mut shuffle = RandomShuffle::new(n, StdRng::seed_from_u64(7));
        let first: Vec<usize> = (0..n).filter_map(|_| shuffle.next()).collect();
        let second: Vec<usize> = (0..n).filter_map(|_| shuffle.next()).collect();
        assert_ne!(first, second, "consecutive permutations should differ");
    }

    #[test]
    fn test_empty_stream() {
        let mut shuffle = RandomShuffle::new(0, StdRng::seed_from_u64(0));
        assert!(shuffle.is_empty());
        assert_eq!(shuffle.next(), None);
    }

    #[test]
    fn test_single_element() {
        let mut shuffle = RandomShuffle::new(1, StdRng::seed_from_u64(0));
        for _ in 0..5 {
            assert_eq!(shuffle.next(), Some(0));
        }
    }
}
