//! False sharing: {1,2,4,8} threads x {packed, padded} x 10^7 iterations.
//! At 1 thread the two should be close; at >=2 threads padded must win by
//! a wide margin. Reports main-thread wall-clock (joins all workers
//! before `end()`).

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::record;
use crate::workload::false_sharing;

const RUNS_PER_CONDITION: u32 = 10;
const ITERATIONS_PER_THREAD: u64 = 10_000_000;
const THREAD_COUNTS: [usize; 4] = [1, 2, 4, 8];

pub struct FalseSharing;

impl Scenario for FalseSharing {
    fn name(&self) -> &'static str {
        "false_sharing"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run", "threads", "pattern"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        columns.push("ns_per_operation");
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let mut run_index = 0u64;
        for &threads in &THREAD_COUNTS {
            for (padded, label) in [(false, "packed"), (true, "padded")] {
                for _ in 0..RUNS_PER_CONDITION {
                    let workload = false_sharing::prepare(threads, ITERATIONS_PER_THREAD, padded);

                    let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                    workload.run();
                    let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

                    let total_ops = threads as u64 * ITERATIONS_PER_THREAD;
                    let ns_per_op = if total_ops == 0 { 0.0 } else { snap.runtime_ns as f64 / total_ops as f64 };

                    let mut values = vec![Value::from(run_index), Value::from(threads), Value::from(label)];
                    values.extend(snapshot_values(&snap));
                    values.push(Value::Decimal6(ns_per_op));
                    writer.write_record(&values)?;
                    run_index += 1;
                }
            }
        }

        writer.finish()
    }
}
