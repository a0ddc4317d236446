//! Reader-writer lock scaling: N threads with a configurable writer
//! percentage, each operation either a read-lock/read or write-lock/mutate.

use std::sync::{Arc, RwLock};
use std::thread;

use super::rng::Seeded;

pub struct RwLockWorkload {
    shared: Arc<RwLock<u64>>,
    threads: usize,
    ops_per_thread: u64,
    writer_percent: u8,
    seed: u64,
}

pub fn prepare(threads: usize, ops_per_thread: u64, writer_percent: u8, seed: u64) -> RwLockWorkload {
    RwLockWorkload {
        shared: Arc::new(RwLock::new(0)),
        threads: threads.max(1),
        ops_per_thread,
        writer_percent: writer_percent.min(100),
        seed,
    }
}

impl RwLockWorkload {
    /// Joins all workers before returning (main-thread-reported wall-clock).
    pub fn run(&self) -> u64 {
        let handles: Vec<_> = (0..self.threads)
            .map(|t| {
                let shared = Arc::clone(&self.shared);
                let ops = self.ops_per_thread;
                let writer_percent = self.writer_percent;
                let mut rng = Seeded::new(self.seed ^ (t as u64).wrapping_mul(0x9E3779B1));
                thread::spawn(move || {
                    let mut local_reads = 0u64;
                    for _ in 0..ops {
                        if rng.gen_range(100) < writer_percent as usize {
                            let mut guard = shared.write().expect("rwlock poisoned");
                            *guard = guard.wrapping_add(1);
                        } else {
                            let guard = shared.read().expect("rwlock poisoned");
                            local_reads = local_reads.wrapping_add(*guard);
                        }
                    }
                    local_reads
                })
            })
            .collect();

        let mut acc = 0u64;
        for h in handles {
            acc = acc.wrapping_add(h.join().unwrap_or(0));
        }
        std::hint::black_box(acc)
    }

    pub fn final_value(&self) -> u64 {
        *self.shared.read().expect("rwlock poisoned")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn all_writer_matches_expected_total() {
        let w = prepare(4, 1_000, 100, 7);
        w.run();
        assert_eq!(w.final_value(), 4_000);
    }

    #[test]
    fn all_reader_never_mutates() {
        let w = prepare(4, 1_000, 0, 7);
        w.run();
        assert_eq!(w.final_value(), 0);
    }

    #[test]
    fn mixed_runs_without_panicking() {
        let w = prepare(6, 2_000, 20, 3);
        let _ = w.run();
    }
}
