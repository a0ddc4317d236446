//! Pinned experiment: unpinned / pinned-to-cpu0 / pinned-to-cpu1 groups of
//! a fixed CPU-spin kernel, 10 runs each. Demonstrates that pinning
//! eliminates cross-CPU migration within a run.

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::sched;
use crate::record;
use crate::workload::cpu_spin;

const RUNS_PER_CONDITION: u32 = 10;
const SPIN_ITERATIONS: u64 = 1_000_000_000;

#[derive(Clone, Copy)]
enum Condition {
    Unpinned,
    PinnedCpu(u32),
}

impl Condition {
    fn label(&self) -> &'static str {
        match self {
            Condition::Unpinned => "unpinned",
            Condition::PinnedCpu(0) => "pinned_cpu0",
            Condition::PinnedCpu(_) => "pinned_cpu1",
        }
    }

    fn requested_cpu(&self) -> i32 {
        match self {
            Condition::Unpinned => -1,
            Condition::PinnedCpu(cpu) => *cpu as i32,
        }
    }
}

pub struct Pinned;

impl Scenario for Pinned {
    fn name(&self) -> &'static str {
        "pinned"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run", "condition_label", "affinity"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let conditions = if sched::online_cpu_count() >= 2 {
            vec![Condition::Unpinned, Condition::PinnedCpu(0), Condition::PinnedCpu(1)]
        } else {
            log::warn!("pinned: fewer than 2 online CPUs, skipping the second pinned group");
            vec![Condition::Unpinned, Condition::PinnedCpu(0)]
        };

        let mut run_index = 0u64;
        for condition in &conditions {
            if let Condition::PinnedCpu(cpu) = condition {
                if let Err(e) = sched::pin_to_cpu(*cpu) {
                    log::warn!("pinned: could not pin to cpu {cpu} ({e}), skipping condition");
                    continue;
                }
            }

            let kernel = cpu_spin::prepare(SPIN_ITERATIONS, None);

            for _ in 0..RUNS_PER_CONDITION {
                let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                let _ = kernel.run();
                let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

                let mut values =
                    vec![Value::from(run_index), Value::from(condition.label()), Value::from(condition.requested_cpu())];
                values.extend(snapshot_values(&snap));
                writer.write_record(&values)?;
                run_index += 1;
            }
        }

        writer.finish()
    }
}
