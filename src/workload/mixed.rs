//! Interleaves memory access (over a working-set-sized index list) with a
//! configurable number of compute ops per access.

use super::rng::Seeded;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    Flat,
    /// Working set grows across `phases` phases.
    Phased { phases: u32 },
    /// Alternates compute-heavy and memory-heavy windows every 1000
    /// iterations.
    Bursty,
}

pub struct MixedWorkload {
    buf: Vec<u64>,
    indices: Vec<usize>,
    compute_ops_per_access: u32,
    variant: Variant,
}

pub fn prepare(
    working_set_elems: usize,
    accesses: usize,
    compute_ops_per_access: u32,
    variant: Variant,
    seed: u64,
) -> MixedWorkload {
    let len = working_set_elems.max(1);
    let buf: Vec<u64> = (0..len as u64).collect();
    let mut rng = Seeded::new(seed);
    let indices = (0..accesses).map(|_| rng.gen_range(len)).collect();
    MixedWorkload { buf, indices, compute_ops_per_access, variant }
}

#[inline]
fn compute(mut acc: u64, ops: u32) -> u64 {
    for _ in 0..ops {
        acc = acc.wrapping_mul(2654435761).rotate_left(7);
    }
    acc
}

impl MixedWorkload {
    pub fn run(&self) -> u64 {
        match self.variant {
            Variant::Flat => self.run_flat(self.compute_ops_per_access),
            Variant::Phased { phases } => {
                let mut acc = 0u64;
                let phases = phases.max(1);
                for phase in 0..phases {
                    let working_len = (self.buf.len() * (phase as usize + 1) / phases as usize).max(1);
                    acc = acc.wrapping_add(self.run_over(working_len, self.compute_ops_per_access));
                }
                std::hint::black_box(acc)
            }
            Variant::Bursty => {
                let mut acc = 0u64;
                for (i, &idx) in self.indices.iter().enumerate() {
                    let window_is_compute_heavy = (i / 1000) % 2 == 0;
                    let ops = if window_is_compute_heavy { self.compute_ops_per_access * 8 } else { 1 };
                    acc = acc.wrapping_add(self.buf[idx]);
                    acc = compute(acc, ops);
                }
                std::hint::black_box(acc)
            }
        }
    }

    fn run_flat(&self, ops: u32) -> u64 {
        self.run_over(self.buf.len(), ops)
    }

    fn run_over(&self, working_len: usize, ops: u32) -> u64 {
        let mut acc = 0u64;
        for &idx in &self.indices {
            let bounded = idx % working_len.max(1);
            acc = acc.wrapping_add(self.buf[bounded]);
            acc = compute(acc, ops);
        }
        std::hint::black_box(acc)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flat_is_deterministic() {
        let a = prepare(1024, 5_000, 4, Variant::Flat, 1).run();
        let b = prepare(1024, 5_000, 4, Variant::Flat, 1).run();
        assert_eq!(a, b);
    }

    #[test]
    fn phased_runs_without_panicking() {
        let w = prepare(4096, 2_000, 2, Variant::Phased { phases: 4 }, 2);
        let _ = w.run();
    }

    #[test]
    fn bursty_runs_without_panicking() {
        let w = prepare(4096, 2_500, 2, Variant::Bursty, 3);
        let _ = w.run();
    }
}
