//! Null baseline: brackets an empty workload 100 times. Serves as the
//! overhead floor every other scenario's runtime should be measured
//! against. Reports main-thread wall-clock (single-threaded).

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::record;

const RUNS: u32 = 100;

pub struct NullBaseline;

impl Scenario for NullBaseline {
    fn name(&self) -> &'static str {
        "null_baseline"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        for run in 0..RUNS {
            let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
            // Empty workload: nothing happens between begin and end.
            let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

            let mut values = vec![Value::from(run as u64)];
            values.extend(snapshot_values(&snap));
            writer.write_record(&values)?;
        }

        writer.finish()
    }
}
