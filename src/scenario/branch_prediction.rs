//! Branch prediction: sorted-branching, random-branching, and branchless
//! conditional-sum passes over the same size array, 10 runs each.

use std::path::Path;

use super::{clock_fatal, hwstat_values, open_writer, snapshot_values, Scenario, HWCOUNTER_COLUMNS, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::hwcounter::HwCounterGroup;
use crate::record;
use crate::workload::branch::{self, Mode};

const RUNS_PER_CONDITION: u32 = 10;
const ARRAY_LEN: usize = 1_000_000;

fn modes() -> [(Mode, &'static str); 3] {
    [
        (Mode::SortedBranch, "sorted_branch"),
        (Mode::RandomBranch, "random_branch"),
        (Mode::Branchless, "branchless"),
    ]
}

pub struct BranchPrediction;

impl Scenario for BranchPrediction {
    fn name(&self) -> &'static str {
        "branch_prediction"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run", "access_pattern"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        columns.extend_from_slice(HWCOUNTER_COLUMNS);
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let mut hw = HwCounterGroup::init();
        if !hw.available() {
            log::warn!("branch_prediction: hardware counters unavailable, branch columns will read 0");
        }

        let mut run_index = 0u64;
        for (mode, label) in modes() {
            for run in 0..RUNS_PER_CONDITION {
                let workload = branch::prepare(ARRAY_LEN, 0, mode, run as u64);

                hw.start();
                let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                let _ = workload.run();
                let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;
                let stat = hw.stop();

                let mut values = vec![Value::from(run_index), Value::from(label)];
                values.extend(snapshot_values(&snap));
                values.extend(hwstat_values(&stat));
                writer.write_record(&values)?;
                run_index += 1;
            }
        }

        writer.finish()
    }
}
