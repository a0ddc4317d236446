//! Scenario name to constructor map. The one place that knows every
//! scenario this binary can run.

use crate::scenario::{
    atomics_scaling::AtomicsScaling, branch_prediction::BranchPrediction, cache_hierarchy::CacheHierarchy,
    false_sharing::FalseSharing, fileio_patterns::FileIoPatterns, huge_pages::HugePages, lock_scaling::LockScaling,
    mixed_workload::MixedWorkload, null_baseline::NullBaseline, numa_locality::NumaLocality, pinned::Pinned,
    process_creation::ProcessCreation, rwlock_scaling::RwLockScaling, simd::Simd, tlb_pressure::TlbPressure, Scenario,
};

/// Every scenario name this binary recognizes, in the order `list`
/// prints them.
pub const NAMES: &[&str] = &[
    "null_baseline",
    "pinned",
    "cache_hierarchy",
    "lock_scaling",
    "false_sharing",
    "tlb_pressure",
    "numa_locality",
    "rwlock_scaling",
    "branch_prediction",
    "mixed_workload",
    "process_creation",
    "atomics_scaling",
    "simd",
    "fileio_patterns",
    "huge_pages",
];

/// Returns the scenario registered under `name`, or `None` if unknown.
pub fn lookup(name: &str) -> Option<Box<dyn Scenario>> {
    let scenario: Box<dyn Scenario> = match name {
        "null_baseline" => Box::new(NullBaseline),
        "pinned" => Box::new(Pinned),
        "cache_hierarchy" => Box::new(CacheHierarchy),
        "lock_scaling" => Box::new(LockScaling),
        "false_sharing" => Box::new(FalseSharing),
        "tlb_pressure" => Box::new(TlbPressure),
        "numa_locality" => Box::new(NumaLocality),
        "rwlock_scaling" => Box::new(RwLockScaling),
        "branch_prediction" => Box::new(BranchPrediction),
        "mixed_workload" => Box::new(MixedWorkload),
        "process_creation" => Box::new(ProcessCreation),
        "atomics_scaling" => Box::new(AtomicsScaling),
        "simd" => Box::new(Simd),
        "fileio_patterns" => Box::new(FileIoPatterns),
        "huge_pages" => Box::new(HugePages),
        _ => return None,
    };
    Some(scenario)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_listed_name_resolves() {
        for &name in NAMES {
            assert!(lookup(name).is_some(), "{name} is listed but not registered");
        }
    }

    #[test]
    fn unknown_name_returns_none() {
        assert!(lookup("does_not_exist").is_none());
    }
}
