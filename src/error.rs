use std::path::PathBuf;

use thiserror::Error;

/// Application- and scenario-level failures.
///
/// OS-boundary failures (clock, affinity, NUMA, procfs, `perf_event_open`)
/// stay as [`std::io::Error`] at the layer that produces them, matching
/// the library convention this crate is built on; `LabError` only covers
/// failures that originate above that layer.
#[derive(Debug, Error)]
pub enum LabError {
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("output path {0:?} already exists (use --force to overwrite)")]
    OutputExists(PathBuf),

    #[error("failed to create output directory {0:?}: {1}")]
    CreateOutputDir(PathBuf, #[source] std::io::Error),

    #[error("monotonic clock unavailable: {0}")]
    ClockUnavailable(#[source] std::io::Error),

    #[error("scenario {scenario:?} aborted: {source}")]
    ScenarioAborted {
        scenario: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LabError>;
