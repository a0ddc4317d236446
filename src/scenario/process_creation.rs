//! Process creation: fork / vfork / clone(CLONE_THREAD) / posix_spawn, 20
//! runs each. Per-iteration runtime is the whole create-exit-reap cycle.

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::record;
use crate::workload::process::{self, Variant};

const RUNS_PER_CONDITION: u32 = 20;

fn variants() -> [(Variant, &'static str); 4] {
    [
        (Variant::Fork, "fork"),
        (Variant::VFork, "vfork"),
        (Variant::CloneThread, "clone_thread"),
        (Variant::PosixSpawn, "posix_spawn"),
    ]
}

pub struct ProcessCreation;

impl Scenario for ProcessCreation {
    fn name(&self) -> &'static str {
        "process_creation"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run", "syscall_type"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let mut run_index = 0u64;
        for (variant, label) in variants() {
            let workload = process::prepare(variant);

            for _ in 0..RUNS_PER_CONDITION {
                let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                if let Err(e) = workload.run() {
                    log::warn!("process_creation: {label} iteration failed ({e}), skipping this run");
                    let _ = record::end(begun);
                    continue;
                }
                let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

                let mut values = vec![Value::from(run_index), Value::from(label)];
                values.extend(snapshot_values(&snap));
                writer.write_record(&values)?;
                run_index += 1;
            }
        }

        writer.finish()
    }
}
