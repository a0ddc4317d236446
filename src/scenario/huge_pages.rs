//! Huge pages: ordinary pages, transparent-huge-page hint, and explicit
//! hugetlb allocation, each with a fixed page-strided access pattern, 10
//! runs each. `degraded` marks explicit-huge-page runs that fell back to
//! ordinary pages because no hugetlbfs pool was configured.

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::record;
use crate::workload::huge_pages::{self, PageKind};

const RUNS_PER_CONDITION: u32 = 10;
const BUFFER_SIZE: usize = 32 * 1024 * 1024;
const PAGE_STRIDE_BYTES: usize = 4096;

fn kinds() -> [(PageKind, &'static str); 3] {
    [
        (PageKind::Ordinary, "ordinary"),
        (PageKind::TransparentHint, "transparent_hint"),
        (PageKind::Explicit, "explicit_hugetlb"),
    ]
}

pub struct HugePages;

impl Scenario for HugePages {
    fn name(&self) -> &'static str {
        "huge_pages"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run", "pattern", "degraded"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let mut run_index = 0u64;
        for (kind, label) in kinds() {
            for _ in 0..RUNS_PER_CONDITION {
                let workload = match huge_pages::prepare(BUFFER_SIZE, kind, PAGE_STRIDE_BYTES) {
                    Ok(w) => w,
                    Err(e) => {
                        log::warn!("huge_pages: allocation failed for {label} ({e}), skipping this run");
                        continue;
                    }
                };

                let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                let _ = workload.run();
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
