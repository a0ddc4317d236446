//! SIMD: scalar, auto-vectorization-hinted, 128-bit-lane, and 256-bit-lane
//! elementwise add, plus scalar vs. vector dot product, 10 runs each.

use std::path::Path;

use super::{clock_fatal, open_writer, snapshot_values, Scenario, SNAPSHOT_COLUMNS};
use crate::emit::{OverwritePolicy, Value};
use crate::error::Result;
use crate::record;
use crate::workload::simd::{self, AddVariant};

const RUNS_PER_CONDITION: u32 = 10;
const ARRAY_LEN: usize = 4_000_003; // not a multiple of 4 or 8, exercises the scalar tail

pub struct Simd;

impl Scenario for Simd {
    fn name(&self) -> &'static str {
        "simd"
    }

    fn run(&self, out_dir: &Path, overwrite: OverwritePolicy) -> Result<()> {
        let mut columns = vec!["run", "access_pattern"];
        columns.extend_from_slice(SNAPSHOT_COLUMNS);
        let mut writer = open_writer(out_dir, self.name(), &columns, overwrite)?;

        let mut run_index = 0u64;

        for (variant, label) in [
            (AddVariant::Scalar, "scalar_add"),
            (AddVariant::AutoVectorHint, "auto_vector_add"),
            (AddVariant::Vector128, "vector128_add"),
            (AddVariant::Vector256, "vector256_add"),
        ] {
            for _ in 0..RUNS_PER_CONDITION {
                let workload = simd::prepare_add(ARRAY_LEN, variant);

                let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                let _ = workload.run();
                let snap = record::end(begun).map_err(|e| clock_fatal(self.name(), e))?;

                let mut values = vec![Value::from(run_index), Value::from(label)];
                values.extend(snapshot_values(&snap));
                writer.write_record(&values)?;
                run_index += 1;
            }
        }

        for (label, run_vector) in [("dot_scalar", false), ("dot_vector", true)] {
            for _ in 0..RUNS_PER_CONDITION {
                let workload = simd::prepare_dot(ARRAY_LEN);

                let begun = record::begin().map_err(|e| clock_fatal(self.name(), e))?;
                let _ = if run_vector { workload.run_vector() } else { workload.run_scalar() };
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
