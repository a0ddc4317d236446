//! Lock scaling: thread counts {1,2,4,8} x {busy-wait, mutex, atomic} x 5
//! runs x 10^6 per-thread iterations. At 8 threads, atomic add should win
//! on aggregate ops/s and busy-wait should lose. Reports main-thread
//! wall-clock (joins all workers before `end()`).

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::record;
use crate::workload::lock::{self, Kind};

const RUNS_PER_CONDITION: u32 = 5;
const ITERATIONS_PER_THREAD: u64 = 1_000_000;
const THREAD_COUNTS: [usize; 4] = [1, 2, 4, 8];

fn lock_kinds() -> [(Kind, &'static str); 3] {
    [(Kind::SpinLock, "busy_wait"), (Kind::SleepingMutex, "mutex"), (Kind::AtomicAdd, "atomic")]
}

pub struct LockScaling;

impl Scenario for LockScaling {
    fn name(&self) -> &'static str {
        "lock_scaling"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run", "threads", "lock_type"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        columns.push("ops_per_second");
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let mut run_index = 0u64;
        for &threads in &THREAD_COUNTS {
            for (kind, label) in lock_kinds() {
                for _ in 0..RUNS_PER_CONDITION {
                    let workload = lock::prepare(kind, threads, ITERATIONS_PER_THREAD, true);

                    let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                    let total = workload.run();
                    let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

                    let ops_per_second = if snap.runtime_ns == 0 {
                        0.0
                    } else {
                        total as f64 / (snap.runtime_ns as f64 / 1e9)
                    };

                    let mut values = vec![Value::from(run_index), Value::from(threads), Value::from(label)];
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
