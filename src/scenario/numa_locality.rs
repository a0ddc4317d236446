//! NUMA locality: sequential read over a buffer bound to the local node
//! vs. interleaved across all nodes, 10 runs each. On a single-node
//! system this degrades gracefully (both conditions run unbound) per the
//! "degrading" error taxonomy rather than failing outright.

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::{numa, record};

const RUNS_PER_CONDITION: u32 = 10;
const BUFFER_SIZE: usize = 16 * 1024 * 1024;

#[derive(Clone, Copy)]
enum Locality {
    NodeLocal,
    Interleaved,
}

pub struct NumaLocality;

impl Scenario for NumaLocality {
    fn name(&self) -> &'static str {
        "numa_locality"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        if !numa::available() {
            log::warn!("numa_locality: single NUMA node, running degraded (both conditions unbound)");
        }

        let mut columns = vec!["run", "locality", "degraded"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let mut run_index = 0u64;
        for locality in [Locality::NodeLocal, Locality::Interleaved] {
            let label = match locality {
                Locality::NodeLocal => "node_local",
                Locality::Interleaved => "interleaved",
            };

            for _ in 0..RUNS_PER_CONDITION {
                let alloc = match locality {
                    Locality::NodeLocal => numa::alloc_on_node(BUFFER_SIZE, 0),
                    Locality::Interleaved => numa::alloc_interleaved(BUFFER_SIZE),
                };
                let alloc = match alloc {
                    Ok(a) => a,
                    Err(e) => {
                        log::warn!("numa_locality: allocation failed ({e}), skipping this run");
                        continue;
                    }
                };

                let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                let mut sum = 0u64;
                unsafe {
                    let words = alloc.len() / std::mem::size_of::<u64>();
                    let base = alloc.as_ptr() as *const u64;
                    for i in 0..words {
                        sum = sum.wrapping_add(base.add(i).read_volatile());
                    }
                }
                std::hint::black_box(sum);
                let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

                let mut values = vec![Value::from(run_index), Value::from(label), Value::from(alloc.degraded as u64)];
                values.extend(snapshot_values(&snap));
                writer.write_record(&values)?;
                run_index += 1;
            }
        }

        writer.finish()
    }
}
