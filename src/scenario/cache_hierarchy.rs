//! Cache hierarchy: sequential read over buffers spanning L1 through far
//! above LLC, 10 runs each. Median per-byte runtime should climb as the
//! buffer outgrows each cache level.

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::record;
use crate::workload::stream::{self, Pattern};

const RUNS_PER_CONDITION: u32 = 10;
const BUFFER_SIZES: [usize; 4] = [8 * 1024, 128 * 1024, 4 * 1024 * 1024, 64 * 1024 * 1024];

pub struct CacheHierarchy;

impl Scenario for CacheHierarchy {
    fn name(&self) -> &'static str {
        "cache_hierarchy"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run", "buffer_size"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let mut run_index = 0u64;
        for &size in &BUFFER_SIZES {
            for _ in 0..RUNS_PER_CONDITION {
                let mut kernel = stream::prepare(size, Pattern::Read);

                let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                let _ = kernel.run();
                let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

                let mut values = vec![Value::from(run_index), Value::from(size)];
                values.extend(snapshot_values(&snap));
                writer.write_record(&values)?;
                run_index += 1;
            }
        }

        writer.finish()
    }
}
