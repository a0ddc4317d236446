//! Deterministic, explicitly-seeded PRNG for workload setup.
//!
//! Workload kernels must be reproducible given a seed (per §4.7), so
//! index permutations and random buffers are built from this generator
//! rather than the OS entropy pool. `xorshift64*` is small enough to
//! hand-write and carries no allocation, matching the "no heap
//! allocation inside the measured region" constraint even if a kernel
//! ever drew numbers during `run()` instead of `prepare()`.

pub struct Seeded(u64);

impl Seeded {
    pub fn new(seed: u64) -> Self {
        // xorshift64* requires a nonzero state.
        Self(if seed == 0 { 0x9E3779B97F4A7C15 } else { seed })
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    pub fn gen_range(&mut self, upper_exclusive: usize) -> usize {
        if upper_exclusive == 0 {
            return 0;
        }
        (self.next_u64() % upper_exclusive as u64) as usize
    }

    /// Fisher-Yates shuffle of `0..len`, producing a uniformly-random
    /// permutation deterministic in this generator's seed.
    pub fn shuffled_indices(&mut self, len: usize) -> Vec<usize> {
        let mut v: Vec<usize> = (0..len).collect();
        for i in (1..len).rev() {
            let j = self.gen_range(i + 1);
            v.swap(i, j);
        }
        v
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Seeded::new(42);
        let mut b = Seeded::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Seeded::new(1);
        let mut b = Seeded::new(2);
        let seq_a: Vec<_> = (0..8).map(|_| a.next_u64()).collect();
        let seq_b: Vec<_> = (0..8).map(|_| b.next_u64()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = Seeded::new(7);
        let perm = rng.shuffled_indices(1000);
        let mut sorted = perm.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn zero_seed_does_not_degenerate() {
        let mut rng = Seeded::new(0);
        let a = rng.next_u64();
        let b = rng.next_u64();
        assert_ne!(a, 0);
        assert_ne!(a, b);
    }
}
