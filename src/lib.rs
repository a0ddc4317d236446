//! Measurement substrate for exploring Linux CPU, cache, memory, and
//! scheduler behavior: a catalog of deterministic microbenchmarks, a
//! timing/scheduling/NUMA/hardware-counter measurement layer with
//! strict no-allocation hot paths, and a scenario driver that emits
//! per-iteration records for downstream statistical analysis.
//!
//! ## Example
//!
//! Run the null-baseline scenario and inspect its emitted record count.
//!
//! ```rust,no_run
//! use perflab::emit::OverwritePolicy;
//! use perflab::registry;
//!
//! let scenario = registry::lookup("null_baseline").unwrap();
//! scenario.run(std::path::Path::new("data"), OverwritePolicy::Overwrite).unwrap();
//! ```

pub mod emit;
pub mod error;
pub mod hwcounter;
pub mod numa;
pub mod procfs;
pub mod record;
pub mod registry;
pub mod scenario;
pub mod sched;
pub mod timing;
pub mod workload;
