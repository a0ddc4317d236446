//! File I/O patterns: sequential/random/direct/mmap access over an
//! unlinked temp file, 10 runs each. `degraded` marks runs where
//! `O_DIRECT` was requested but unavailable on the backing filesystem.

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::record;
use crate::workload::fileio::{self, Mode};

const RUNS_PER_CONDITION: u32 = 10;
const FILE_SIZE: usize = 8 * 1024 * 1024;

fn modes() -> [(Mode, &'static str); 6] {
    [
        (Mode::SequentialRead, "sequential_read"),
        (Mode::SequentialWrite, "sequential_write"),
        (Mode::RandomSeekRead, "random_seek_read"),
        (Mode::DirectRead, "direct_read"),
        (Mode::MmapSequentialRead, "mmap_sequential_read"),
        (Mode::MmapRandomAccess, "mmap_random_access"),
    ]
}

pub struct FileIoPatterns;

impl Scenario for FileIoPatterns {
    fn name(&self) -> &'static str {
        "fileio_patterns"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run", "access_pattern", "degraded"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let mut run_index = 0u64;
        for (mode, label) in modes() {
            for run in 0..RUNS_PER_CONDITION {
                let mut workload = match fileio::prepare(FILE_SIZE, mode, run as u64) {
                    Ok(w) => w,
                    Err(e) => {
                        log::warn!("fileio_patterns: setup failed for {label} ({e}), skipping this run");
                        continue;
                    }
                };

                let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                if let Err(e) = workload.run() {
                    log::warn!("fileio_patterns: {label} iteration failed ({e}), skipping this run");
                    let _ = record::end(begun);
                    continue;
                }
                let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

                let mut values =
                    vec![Value::from(run_index), Value::from(label), Value::from(workload.degraded as u64)];
                values.extend(snapshot_values(&snap));
                writer.write_record(&values)?;
                run_index += 1;
            }
        }

        writer.finish()
    }
}
