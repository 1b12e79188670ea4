//! # pareto-tune
//!
//! Multi-objective hyperparameter search orchestration for stochastic model
//! training.
//!
//! Training a model is noisy: two runs with the same hyperparameters produce
//! different scores. This crate wraps a noisy, multi-run, multi-metric
//! training procedure into a single deterministic objective callable that a
//! multi-objective Bayesian optimizer can drive, persists search progress
//! across process restarts, and manages per-call model artifacts.
//!
//! The optimizer itself is an external collaborator injected through the
//! [`driver::MultiObjectiveOptimizer`] trait, as are the training routine,
//! the metric scorers, and the artifact serialization format.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pareto_tune::{
//!     config::{OptimizerOptions, ResolvedConfig},
//!     space::SearchSpace,
//! };
//!
//! # fn wiring() -> pareto_tune::error::Result<()> {
//! let space = SearchSpace::new()
//!     .add_continuous("learning_rate", 0.01, 1.0, false)
//!     .add_discrete("num_topics", vec![10, 20, 50]);
//!
//! let config = ResolvedConfig::resolve(Some(space), None)?;
//! let options = OptimizerOptions::new().checkpoint("progress.json");
//! // ... build an Evaluator from your trainer and metrics, pick an
//! // optimizer, then SearchDriver::new(..).run(&mut evaluator)
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Run-state persistence: checkpoint file format and startup resumption
pub mod checkpoint;

/// Search-space resolution and optimizer option bundle
pub mod config;

/// Search driving against an external multi-objective optimizer
pub mod driver;

/// Error taxonomy for the orchestration layer
pub mod error;

/// Objective evaluation over repeated stochastic training runs
pub mod evaluator;

/// Parameter space definitions
pub mod space;

pub use checkpoint::{resume, Checkpoint, EvaluationRecord};
pub use config::{AcquisitionFunction, OptimizerOptions, ResolvedConfig};
pub use driver::{
    Direction, MultiObjectiveOptimizer, ObjectiveFn, OptimizationMethod, ParetoFront, SearchDriver,
    SearchOutcome,
};
pub use error::{Error, Result};
pub use evaluator::{ArtifactWriter, Evaluator, Metric, ModelTrainer};
pub use space::{Configuration, Parameter, ParameterValue, SearchSpace};

/// Current version of pareto-tune
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
