//! N threads increment per-thread counters stored either adjacent (same
//! cache line) or cache-line-padded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

#[repr(align(64))]
struct Padded(AtomicU64);

pub enum Counters {
    Adjacent(Vec<AtomicU64>),
    Padded(Vec<Padded>),
}

pub struct FalseSharingWorkload {
    counters: Arc<Counters>,
    threads: usize,
    iterations_per_thread: u64,
}

pub fn prepare(threads: usize, iterations_per_thread: u64, padded: bool) -> FalseSharingWorkload {
    let threads = threads.max(1);
    let counters = if padded {
        Counters::Padded((0..threads).map(|_| Padded(AtomicU64::new(0))).collect())
    } else {
        Counters::Adjacent((0..threads).map(|_| AtomicU64::new(0)).collect())
    };
    FalseSharingWorkload { counters: Arc::new(counters), threads, iterations_per_thread }
}

impl FalseSharingWorkload {
    /// Runs all threads to completion, joining before returning — the
    /// reported wall-clock is the whole-group completion time, not any
    /// single worker's.
    pub fn run(&self) {
        let handles: Vec<_> = (0..self.threads)
            .map(|t| {
                let counters = Arc::clone(&self.counters);
                let iters = self.iterations_per_thread;
                thread::spawn(move || {
                    for _ in 0..iters {
                        match counters.as_ref() {
                            Counters::Adjacent(v) => {
                                v[t].fetch_add(1, Ordering::Relaxed);
                            }
                            Counters::Padded(v) => {
                                v[t].0.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            let _ = h.join();
        }
    }

    pub fn total(&self) -> u64 {
        match self.counters.as_ref() {
            Counters::Adjacent(v) => v.iter().map(|c| c.load(Ordering::Relaxed)).sum(),
            Counters::Padded(v) => v.iter().map(|c| c.0.load(Ordering::Relaxed)).sum(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn adjacent_counts_exactly() {
        let w = prepare(4, 10_000, false);
        w.run();
        assert_eq!(w.total(), 40_000);
    }

    #[test]
    fn padded_counts_exactly() {
        let w = prepare(4, 10_000, true);
        w.run();
        assert_eq!(w.total(), 40_000);
    }

    #[test]
    fn padded_layout_is_cache_line_sized() {
        assert_eq!(std::mem::align_of::<Padded>(), 64);
    }
}
