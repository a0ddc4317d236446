//! Reader-writer lock scaling: {1,2,4,8} threads x writer percentages
//! {0, 10, 50, 100} x 5 runs x 10^5 ops per thread. Reports main-thread
//! wall-clock (joins all workers before `end()`).

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::record;
use crate::workload::rwlock;

const RUNS_PER_CONDITION: u32 = 5;
const OPS_PER_THREAD: u64 = 100_000;
const THREAD_COUNTS: [usize; 4] = [1, 2, 4, 8];
const WRITER_PERCENTAGES: [u8; 4] = [0, 10, 50, 100];

pub struct RwLockScaling;

impl Scenario for RwLockScaling {
    fn name(&self) -> &'static str {
        "rwlock_scaling"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run", "threads", "compute_ratio"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        columns.push("ops_per_second");
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let mut run_index = 0u64;
        let mut seed = 1u64;
        for &threads in &THREAD_COUNTS {
            for &writer_percent in &WRITER_PERCENTAGES {
                for _ in 0..RUNS_PER_CONDITION {
                    let workload = rwlock::prepare(threads, OPS_PER_THREAD, writer_percent, seed);
                    seed = seed.wrapping_add(1);

                    let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                    workload.run();
                    let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

                    let total_ops = threads as u64 * OPS_PER_THREAD;
                    let ops_per_second = if snap.runtime_ns == 0 {
                        0.0
                    } else {
                        total_ops as f64 / (snap.runtime_ns as f64 / 1e9)
                    };

                    let mut values =
                        vec![Value::from(run_index), Value::from(threads), Value::Decimal3(writer_percent as f64 / 100.0)];
                    values.extend(snapshot_values(&snap));
                    values.push(Value::Decimal6(ops_per_second));
                    writer.write_record(&values)?;
                    run_index += 1;
                }
            }
        }

        writer.finish()
    }
}
