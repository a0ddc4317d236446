//! Lock contention kernels: busy-wait spinlock, sleeping mutex, and
//! sequentially-consistent atomic add, each driven by a parameterized
//! thread count over a shared counter.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::sched;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    SpinLock,
    SleepingMutex,
    AtomicAdd,
}

pub struct LockWorkload {
    kind: Kind,
    threads: usize,
    iterations_per_thread: u64,
    pin: bool,
}

pub fn prepare(kind: Kind, threads: usize, iterations_per_thread: u64, pin: bool) -> LockWorkload {
    LockWorkload { kind, threads: threads.max(1), iterations_per_thread, pin }
}

struct SpinLock {
    locked: AtomicBool,
    counter: std::cell::UnsafeCell<u64>,
}

// SAFETY: access to `counter` is serialized by the spin loop on `locked`.
unsafe impl Sync for SpinLock {}

impl SpinLock {
    fn new() -> Self {
        Self { locked: AtomicBool::new(false), counter: std::cell::UnsafeCell::new(0) }
    }

    fn increment(&self) {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            std::hint::spin_loop();
        }
        unsafe {
            *self.counter.get() += 1;
        }
        self.locked.store(false, Ordering::Release);
    }
}

impl LockWorkload {
    /// Runs all threads to completion and returns the final shared
    /// counter value (`threads * iterations_per_thread` on success).
    pub fn run(&self) -> u64 {
        match self.kind {
            Kind::SpinLock => self.run_spin(),
            Kind::SleepingMutex => self.run_mutex(),
            Kind::AtomicAdd => self.run_atomic(),
        }
    }

    fn run_spin(&self) -> u64 {
        let lock = Arc::new(SpinLock::new());
        let handles: Vec<_> = (0..self.threads)
            .map(|t| {
                let lock = Arc::clone(&lock);
                let pin = self.pin;
                let iters = self.iterations_per_thread;
                thread::spawn(move || {
                    if pin {
                        let _ = sched::pin_to_cpu((t % sched::online_cpu_count().max(1)) as u32);
                    }
                    for _ in 0..iters {
                        lock.increment();
                    }
                })
            })
            .collect();
        for h in handles {
            let _ = h.join();
        }
        unsafe { *lock.counter.get() }
    }

    fn run_mutex(&self) -> u64 {
        let counter = Arc::new(Mutex::new(0u64));
        let handles: Vec<_> = (0..self.threads)
            .map(|t| {
                let counter = Arc::clone(&counter);
                let pin = self.pin;
                let iters = self.iterations_per_thread;
                thread::spawn(move || {
                    if pin {
                        let _ = sched::pin_to_cpu((t % sched::online_cpu_count().max(1)) as u32);
                    }
                    for _ in 0..iters {
                        *counter.lock().expect("lock poisoned") += 1;
                    }
                })
            })
            .collect();
        for h in handles {
            let _ = h.join();
        }
        let result = *counter.lock().expect("lock poisoned");
        result
    }

    fn run_atomic(&self) -> u64 {
        let counter = Arc::new(AtomicU64::new(0));
        let handles: Vec<_> = (0..self.threads)
            .map(|t| {
                let counter = Arc::clone(&counter);
                let pin = self.pin;
                let iters = self.iterations_per_thread;
                thread::spawn(move || {
                    if pin {
                        let _ = sched::pin_to_cpu((t % sched::online_cpu_count().max(1)) as u32);
                    }
                    for _ in 0..iters {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for h in handles {
            let _ = h.join();
        }
        counter.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn spin_lock_counts_exactly() {
        let w = prepare(Kind::SpinLock, 4, 2_000, false);
        assert_eq!(w.run(), 8_000);
    }

    #[test]
    fn sleeping_mutex_counts_exactly() {
        let w = prepare(Kind::SleepingMutex, 4, 2_000, false);
        assert_eq!(w.run(), 8_000);
    }

    #[test]
    fn atomic_add_counts_exactly() {
        let w = prepare(Kind::AtomicAdd, 4, 2_000, false);
        assert_eq!(w.run(), 8_000);
    }

    #[test]
    fn single_thread_is_trivially_correct() {
        let w = prepare(Kind::AtomicAdd, 1, 500, false);
        assert_eq!(w.run(), 500);
    }
}
