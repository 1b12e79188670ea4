//! Run-state persistence and resumption
//!
//! Optimization progress lives in a single JSON checkpoint file: the history
//! of every evaluation recorded so far plus an opaque optimizer-state blob.
//! Periodic writes during the search are the optimizer collaborator's job
//! (configured through [`crate::config::OptimizerOptions`]); this module owns
//! the file format and the one-time read at startup that restores the
//! process-wide call index.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::space::Configuration;

/// One optimizer-visible evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Ordinal call index, process-wide and monotonically increasing
    pub call: u64,
    /// The evaluated hyperparameter configuration
    pub configuration: Configuration,
    /// Per-metric aggregated scores, in metric-declaration order
    pub scores: Vec<f64>,
}

/// Serialized optimization progress
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    /// All evaluations recorded so far, oldest first
    pub evaluations: Vec<EvaluationRecord>,
    /// Optimizer-internal state; opaque to this crate
    #[serde(default)]
    pub optimizer_state: serde_json::Value,
}

impl Checkpoint {
    /// Create an empty checkpoint
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a checkpoint from `path`
    ///
    /// A file that exists but cannot be read or parsed fails fast with
    /// [`Error::CheckpointLoad`]; restarting fresh on a corrupt checkpoint
    /// would duplicate artifact filenames and break the call-index
    /// invariant.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::CheckpointLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| Error::CheckpointLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write the checkpoint to `path` as pretty-printed JSON
    ///
    /// Provided for optimizer collaborators that adopt this file format;
    /// the core itself only reads checkpoints.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Append one evaluation record
    pub fn record(&mut self, record: EvaluationRecord) {
        self.evaluations.push(record);
    }

    /// Number of recorded evaluations
    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    /// Whether any evaluations have been recorded
    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    /// The call index the next evaluation should use
    ///
    /// Call indices are 1-based: `(number of recorded evaluations) + 1`.
    pub fn next_call(&self) -> u64 {
        self.evaluations.len() as u64 + 1
    }
}

/// Read the checkpoint at `path` once at startup and return the initial call
/// index
///
/// Returns `1` (a fresh run) when no file exists at `path`. When a
/// checkpoint recording `k` evaluations exists, returns `k + 1`, so artifact
/// filenames and optimizer history never collide after a restart.
pub fn resume(path: &Path) -> Result<u64> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no checkpoint found, starting fresh");
        return Ok(1);
    }
    let checkpoint = Checkpoint::load(path)?;
    let next = checkpoint.next_call();
    tracing::info!(
        path = %path.display(),
        evaluations = checkpoint.len(),
        next_call = next,
        "resumed from checkpoint"
    );
    Ok(next)
}
