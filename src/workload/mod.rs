//! The microbenchmark catalog.
//!
//! Every kernel here is a pure function of its parameters and pre-built
//! buffers, deterministic given an explicit seed, and carries no
//! internal timing code — the scenario driver brackets `run()` with
//! [`crate::record::begin`]/[`crate::record::end`]. Setup (index
//! generation, file creation, buffer fill) happens in each kernel's
//! `prepare`, never inside `run`, so allocation and I/O never leak into
//! the measured region.

pub mod atomics;
pub mod branch;
pub mod cpu_spin;
pub mod false_sharing;
pub mod fileio;
pub mod huge_pages;
pub mod lock;
pub mod mixed;
pub mod pointer_chase;
pub mod process;
pub mod random_read;
pub mod rng;
pub mod rwlock;
pub mod simd;
pub mod stream;
pub mod tlb;
