//! TLB pressure: buffers from 16 KiB to 16 MiB x page-strides {1,2,4,8,16}.
//! Per-access latency should climb once the buffer exceeds TLB reach, and
//! climb with stride at a fixed size at or above that reach.

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::record;
use crate::workload::tlb;

const RUNS_PER_CONDITION: u32 = 10;
const BUFFER_SIZES: [usize; 5] = [16 * 1024, 256 * 1024, 2 * 1024 * 1024, 8 * 1024 * 1024, 16 * 1024 * 1024];
const PAGE_STRIDES: [usize; 5] = [1, 2, 4, 8, 16];

pub struct TlbPressure;

impl Scenario for TlbPressure {
    fn name(&self) -> &'static str {
        "tlb_pressure"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run", "buffer_size", "pattern"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        columns.push("ns_per_access");
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let mut run_index = 0u64;
        for &size in &BUFFER_SIZES {
            for &stride in &PAGE_STRIDES {
                for _ in 0..RUNS_PER_CONDITION {
                    let workload = tlb::prepare(size, stride);

                    let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                    let _ = workload.run();
                    let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

                    let pages_touched = (size / 4096).max(1).div_ceil(stride);
                    let ns_per_access =
                        if pages_touched == 0 { 0.0 } else { snap.runtime_ns as f64 / pages_touched as f64 };

                    let mut values = vec![Value::from(run_index), Value::from(size), Value::from(stride)];
                    values.extend(snapshot_values(&snap));
                    values.push(Value::Decimal6(ns_per_access));
                    writer.write_record(&values)?;
                    run_index += 1;
                }
            }
        }

        writer.finish()
    }
}
