//! Mixed: interleaved memory access and compute, across compute:memory
//! ratios {1, 4, 16} in the flat variant, plus one phased and one bursty
//! run per ratio for qualitative comparison.

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::record;
use crate::workload::mixed::{self, Variant};

const RUNS_PER_CONDITION: u32 = 10;
const WORKING_SET_ELEMS: usize = 1 << 16;
const ACCESSES: usize = 200_000;
const COMPUTE_RATIOS: [u32; 3] = [1, 4, 16];

pub struct MixedWorkload;

impl Scenario for MixedWorkload {
    fn name(&self) -> &'static str {
        "mixed_workload"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run", "compute_ratio", "pattern"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let mut run_index = 0u64;
        for &ratio in &COMPUTE_RATIOS {
            for (variant, label) in
                [(Variant::Flat, "flat"), (Variant::Phased { phases: 4 }, "phased"), (Variant::Bursty, "bursty")]
            {
                let runs = if matches!(variant, Variant::Flat) { RUNS_PER_CONDITION } else { 1 };
                for run in 0..runs {
                    let workload = mixed::prepare(WORKING_SET_ELEMS, ACCESSES, ratio, variant, run as u64);

                    let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                    let _ = workload.run();
                    let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

                    let mut values = vec![Value::from(run_index), Value::from(ratio as u64), Value::from(label)];
                    values.extend(snapshot_values(&snap));
                    writer.write_record(&values)?;
                    run_index += 1;
                }
            }
        }

        writer.finish()
    }
}
