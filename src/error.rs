//! Error types for the search orchestration layer
//!
//! Every failure here either prevents the run from starting or aborts it
//! outright; there is no local recovery. Offline experiment orchestration
//! restarts from the last checkpoint instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the orchestration loop
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or conflicting search-space inputs; fatal at startup
    #[error("invalid search configuration: {0}")]
    Configuration(String),

    /// A checkpoint file exists but cannot be read or parsed; fatal at
    /// startup. Silently discarding it would duplicate artifact filenames
    /// after restart, so it is never ignored.
    #[error("failed to load checkpoint {}: {reason}", path.display())]
    CheckpointLoad {
        /// Path of the unreadable checkpoint file
        path: PathBuf,
        /// Underlying I/O or parse failure
        reason: String,
    },

    /// A training run failed; the whole evaluation call is aborted
    #[error("training run failed: {0}")]
    Training(#[source] anyhow::Error),

    /// A metric failed to score a model output; the whole evaluation call is
    /// aborted
    #[error("metric '{metric}' failed to score model output: {source}")]
    Scoring {
        /// Name of the failing metric
        metric: String,
        /// Underlying scorer failure
        #[source]
        source: anyhow::Error,
    },

    /// Artifact persistence failed (directory creation or output write)
    #[error("artifact write to {} failed: {source}", path.display())]
    Artifact {
        /// Destination that could not be written
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: anyhow::Error,
    },

    /// The external optimizer failed; fatal for the whole search run
    #[error("optimizer failed: {0}")]
    Optimizer(#[source] anyhow::Error),
}

/// Result type for orchestration operations
pub type Result<T> = std::result::Result<T, Error>;
