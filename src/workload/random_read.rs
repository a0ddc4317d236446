//! Pre-generated random index array, read-only, with no dependency chain
//! between accesses — measures random bandwidth rather than latency.

use super::rng::Seeded;

pub struct RandomRead {
    buf: Vec<u64>,
    indices: Vec<usize>,
}

pub fn prepare(size_bytes: usize, accesses: usize, seed: u64) -> RandomRead {
    let len = (size_bytes / std::mem::size_of::<u64>()).max(1);
    let buf: Vec<u64> = (0..len as u64).collect();

    let mut rng = Seeded::new(seed);
    let indices = (0..accesses).map(|_| rng.gen_range(len)).collect();

    RandomRead { buf, indices }
}

impl RandomRead {
    pub fn run(&self) -> u64 {
        let mut sum = 0u64;
        for &i in &self.indices {
            sum = sum.wrapping_add(self.buf[i]);
        }
        std::hint::black_box(sum)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deterministic_given_seed() {
        let a = prepare(4096, 1000, 5).run();
        let b = prepare(4096, 1000, 5).run();
        assert_eq!(a, b);
    }

    #[test]
    fn indices_stay_in_bounds() {
        let w = prepare(64, 10_000, 9);
        let len = w.buf.len();
        assert!(w.indices.iter().all(|&i| i < len));
    }
}
