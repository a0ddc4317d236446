//! Atomic operations: non-atomic increment, relaxed add, strong CAS
//! (single-threaded), and contended add at {2,4,8} threads, 10 runs each.

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::record;
use crate::workload::atomics::{self, Variant};

const RUNS_PER_CONDITION: u32 = 10;
const ITERATIONS: u64 = 5_000_000;
const CONTENDED_THREAD_COUNTS: [usize; 3] = [2, 4, 8];

pub struct AtomicsScaling;

impl Scenario for AtomicsScaling {
    fn name(&self) -> &'static str {
        "atomics_scaling"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run", "lock_type", "threads"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let mut run_index = 0u64;

        for (variant, label) in
            [(Variant::NonAtomic, "non_atomic"), (Variant::RelaxedAdd, "relaxed_add"), (Variant::StrongCas, "strong_cas")]
        {
            for _ in 0..RUNS_PER_CONDITION {
                let workload = atomics::prepare(variant, ITERATIONS);

                let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                let _ = workload.run();
                let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

                let mut values = vec![Value::from(run_index), Value::from(label), Value::from(1u64)];
                values.extend(snapshot_values(&snap));
                writer.write_record(&values)?;
                run_index += 1;
            }
        }

        for &threads in &CONTENDED_THREAD_COUNTS {
            for _ in 0..RUNS_PER_CONDITION {
                let workload = atomics::prepare(Variant::ContendedAdd { threads }, ITERATIONS);

                let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                let _ = workload.run();
                let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

                let mut values = vec![Value::from(run_index), Value::from("contended_add"), Value::from(threads)];
                values.extend(snapshot_values(&snap));
                writer.write_record(&values)?;
                run_index += 1;
            }
        }

        writer.finish()
    }
}
