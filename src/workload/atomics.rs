//! Non-atomic increment, relaxed atomic add, strong compare-and-swap, and
//! contended atomic add (multi-threaded).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    NonAtomic,
    RelaxedAdd,
    StrongCas,
    ContendedAdd { threads: usize },
}

pub struct AtomicsWorkload {
    variant: Variant,
    iterations: u64,
}

pub fn prepare(variant: Variant, iterations: u64) -> AtomicsWorkload {
    AtomicsWorkload { variant, iterations }
}

impl AtomicsWorkload {
    pub fn run(&self) -> u64 {
        match self.variant {
            Variant::NonAtomic => {
                let mut acc = 0u64;
                for _ in 0..self.iterations {
                    acc += 1;
                }
                std::hint::black_box(acc)
            }
            Variant::RelaxedAdd => {
                let a = AtomicU64::new(0);
                for _ in 0..self.iterations {
                    a.fetch_add(1, Ordering::Relaxed);
                }
                a.load(Ordering::Relaxed)
            }
            Variant::StrongCas => {
                let a = AtomicU64::new(0);
                for _ in 0..self.iterations {
                    loop {
                        let cur = a.load(Ordering::Acquire);
                        if a.compare_exchange(cur, cur + 1, Ordering::AcqRel, Ordering::Acquire).is_ok() {
                            break;
                        }
                    }
                }
                a.load(Ordering::Acquire)
            }
            Variant::ContendedAdd { threads } => {
                let shared = Arc::new(AtomicU64::new(0));
                let per_thread = self.iterations;
                let handles: Vec<_> = (0..threads.max(1))
                    .map(|_| {
                        let shared = Arc::clone(&shared);
                        thread::spawn(move || {
                            for _ in 0..per_thread {
                                shared.fetch_add(1, Ordering::Relaxed);
                            }
                        })
                    })
                    .collect();
                for h in handles {
                    let _ = h.join();
                }
                shared.load(Ordering::Relaxed)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn non_atomic_counts_exactly_single_threaded() {
        assert_eq!(prepare(Variant::NonAtomic, 10_000).run(), 10_000);
    }

    #[test]
    fn relaxed_add_counts_exactly_single_threaded() {
        assert_eq!(prepare(Variant::RelaxedAdd, 10_000).run(), 10_000);
    }

    #[test]
    fn strong_cas_counts_exactly_single_threaded() {
        assert_eq!(prepare(Variant::StrongCas, 10_000).run(), 10_000);
    }

    #[test]
    fn contended_add_sums_across_threads() {
        let w = prepare(Variant::ContendedAdd { threads: 4 }, 2_000);
        assert_eq!(w.run(), 8_000);
    }
}
