//! Scenario driver: precondition check, schema declaration, condition
//! matrix enumeration, apply-context / warmup / begin-run-end / emit
//! loop, and resource release.
//!
//! Every scenario owns its own condition matrix and column schema; the
//! only shared behavior lives here: the snapshot-to-column conversion and
//! the `Scenario` trait the registry dispatches through.

pub mod atomics_scaling;
pub mod branch_prediction;
pub mod cache_hierarchy;
pub mod false_sharing;
pub mod fileio_patterns;
pub mod huge_pages;
pub mod lock_scaling;
pub mod mixed_workload;
pub mod null_baseline;
pub mod numa_locality;
pub mod pinned;
pub mod process_creation;
pub mod rwlock_scaling;
pub mod simd;
pub mod tlb_pressure;

use crate::emit::{OverwritePolicy, RecordWriter, Value};
use crate::error::{LabError, Result};
use crate::hwcounter::HwStat;
use crate::record::MetricSnapshot;

/// Trailing columns every scenario that brackets its workload with
/// `record::begin`/`record::end` appends, in this fixed order.
pub const SNAPSHOT_COLUMNS: &[&str] = &[
    "timestamp_ns",
    "runtime_ns",
    "voluntary_ctxt_switches",
    "nonvoluntary_ctxt_switches",
    "minor_page_faults",
    "major_page_faults",
    "start_cpu",
    "end_cpu",
];

/// Hardware-counter columns, appended after [`SNAPSHOT_COLUMNS`] by
/// scenarios that open a [`crate::hwcounter::HwCounterGroup`].
pub const HWCOUNTER_COLUMNS: &[&str] =
    &["instructions", "cycles", "ipc", "l1_dcache_misses", "llc_misses", "branches", "branch_misses", "branch_miss_rate"];

pub fn snapshot_values(snap: &MetricSnapshot) -> Vec<Value> {
    vec![
        Value::from(snap.timestamp_ns),
        Value::from(snap.runtime_ns),
        Value::from(snap.voluntary_ctxt_switches),
        Value::from(snap.nonvoluntary_ctxt_switches),
        Value::from(snap.minor_page_faults),
        Value::from(snap.major_page_faults),
        Value::from(snap.start_cpu),
        Value::from(snap.end_cpu),
    ]
}

pub fn hwstat_values(stat: &HwStat) -> Vec<Value> {
    vec![
        Value::from(stat.instructions),
        Value::from(stat.cycles),
        Value::Decimal3(stat.ipc()),
        Value::from(stat.l1d_read_misses),
        Value::from(stat.llc_misses),
        Value::from(stat.branches),
        Value::from(stat.branch_misses),
        Value::Decimal6(stat.branch_miss_rate()),
    ]
}

/// One self-contained experiment: validates its own preconditions,
/// declares its schema, and writes its own `data/<name>.csv`.
pub trait Scenario {
    fn name(&self) -> &'static str;

    /// Runs to completion, writing `data/<name>.csv` under `out_dir`.
    ///
    /// Returns `Ok(())` on clean completion, including the case where
    /// some conditions were skipped due to capability denial (per the
    /// degrading-error taxonomy); only a fatal error (clock failure,
    /// unwritable output) is `Err`.
    fn run(&self, out_dir: &std::path::Path, overwrite: OverwritePolicy) -> Result<()>;
}

pub(crate) fn open_writer(
    out_dir: &std::path::Path,
    name: &str,
    columns: &[&str],
    overwrite: OverwritePolicy,
) -> Result<RecordWriter> {
    let path = out_dir.join(format!("{name}.csv"));
    RecordWriter::create(path, columns, overwrite)
}

pub(crate) fn clock_fatal(scenario: &str, e: std::io::Error) -> LabError {
    LabError::ScenarioAborted { scenario: scenario.to_string(), source: e }
}
