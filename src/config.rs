//! Search-space resolution and optimizer option bundle
//!
//! The resolver turns exactly one of {an explicit [`SearchSpace`], a JSON
//! config-file path} into an immutable [`ResolvedConfig`] that the driver
//! hands to the optimizer. [`OptimizerOptions`] enumerates the recognized
//! optimizer knobs explicitly rather than as a dynamic bag.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::space::SearchSpace;

/// Acquisition function driving candidate selection in the optimizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionFunction {
    /// Upper Confidence Bound
    #[default]
    Ucb,
    /// Expected Improvement
    ExpectedImprovement,
    /// Thompson Sampling
    ThompsonSampling,
}

impl AcquisitionFunction {
    /// Identifier understood by the optimizer collaborator
    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionFunction::Ucb => "ucb",
            AcquisitionFunction::ExpectedImprovement => "ei",
            AcquisitionFunction::ThompsonSampling => "ts",
        }
    }
}

/// Options bundle passed to the optimizer collaborator
///
/// Defaults mirror an offline topic-model search: rebuild the surrogate on
/// every call, report every 4 calls, UCB acquisition, checkpoint every 2
/// calls when a checkpoint path is set.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerOptions {
    /// Rebuild the surrogate model every N calls
    pub model_rebuild_interval: usize,

    /// Report search progress every N calls
    pub report_interval: usize,

    /// Acquisition function for candidate selection
    pub acquisition_function: AcquisitionFunction,

    /// Checkpoint file the optimizer loads from and saves to
    pub checkpoint_path: Option<PathBuf>,

    /// Write a checkpoint every N calls (requires a checkpoint path)
    pub checkpoint_interval: Option<usize>,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            model_rebuild_interval: 1,
            report_interval: 4,
            acquisition_function: AcquisitionFunction::Ucb,
            checkpoint_path: None,
            checkpoint_interval: None,
        }
    }
}

impl OptimizerOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate option values
    pub fn validate(&self) -> Result<()> {
        if self.model_rebuild_interval == 0 {
            return Err(Error::Configuration(
                "model_rebuild_interval must be positive".to_string(),
            ));
        }
        if self.report_interval == 0 {
            return Err(Error::Configuration("report_interval must be positive".to_string()));
        }
        if let Some(interval) = self.checkpoint_interval {
            if interval == 0 {
                return Err(Error::Configuration(
                    "checkpoint_interval must be positive".to_string(),
                ));
            }
            if self.checkpoint_path.is_none() {
                return Err(Error::Configuration(
                    "checkpoint_interval set without checkpoint_path".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Set surrogate rebuild cadence
    pub fn model_rebuild_interval(mut self, every: usize) -> Self {
        self.model_rebuild_interval = every;
        self
    }

    /// Set progress report cadence
    pub fn report_interval(mut self, every: usize) -> Self {
        self.report_interval = every;
        self
    }

    /// Set acquisition function
    pub fn acquisition_function(mut self, acq: AcquisitionFunction) -> Self {
        self.acquisition_function = acq;
        self
    }

    /// Enable checkpointing to `path`, every 2 calls unless a cadence was
    /// already chosen
    pub fn checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = Some(path.into());
        if self.checkpoint_interval.is_none() {
            self.checkpoint_interval = Some(2);
        }
        self
    }

    /// Set checkpoint cadence
    pub fn checkpoint_interval(mut self, every: usize) -> Self {
        self.checkpoint_interval = Some(every);
        self
    }
}

/// Immutable optimizer configuration embedding the resolved search domain
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    domain: SearchSpace,
}

impl ResolvedConfig {
    /// Resolve the search domain from exactly one of an explicit space or a
    /// JSON config file
    ///
    /// Fails with [`Error::Configuration`] when neither or both inputs are
    /// given, when the file cannot be read or parsed, or when the resolved
    /// domain fails validation. No side effects beyond reading the file.
    pub fn resolve(space: Option<SearchSpace>, config_file: Option<&Path>) -> Result<Self> {
        let domain = match (space, config_file) {
            (Some(space), None) => space,
            (None, Some(path)) => load_space_file(path)?,
            (Some(_), Some(_)) => {
                return Err(Error::Configuration(
                    "both an explicit search space and a config file were given; \
                     provide exactly one"
                        .to_string(),
                ))
            }
            (None, None) => {
                return Err(Error::Configuration(
                    "either a search space or a config file is required".to_string(),
                ))
            }
        };
        domain.validate()?;
        Ok(Self { domain })
    }

    /// The resolved search domain
    pub fn domain(&self) -> &SearchSpace {
        &self.domain
    }
}

fn load_space_file(path: &Path) -> Result<SearchSpace> {
    let text = fs::read_to_string(path).map_err(|e| {
        Error::Configuration(format!("cannot read config file {}: {e}", path.display()))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        Error::Configuration(format!("cannot parse config file {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_options() {
        let options = OptimizerOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.model_rebuild_interval, 1);
        assert_eq!(options.report_interval, 4);
        assert_eq!(options.acquisition_function, AcquisitionFunction::Ucb);
        assert!(options.checkpoint_path.is_none());
        assert!(options.checkpoint_interval.is_none());
    }

    #[test]
    fn test_options_builder() {
        let options = OptimizerOptions::new()
            .model_rebuild_interval(5)
            .report_interval(10)
            .acquisition_function(AcquisitionFunction::ExpectedImprovement)
            .checkpoint("progress.json");

        assert_eq!(options.model_rebuild_interval, 5);
        assert_eq!(options.report_interval, 10);
        assert_eq!(options.acquisition_function.as_str(), "ei");
        assert_eq!(options.checkpoint_path, Some(PathBuf::from("progress.json")));
        assert_eq!(options.checkpoint_interval, Some(2)); // default cadence
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_validation() {
        let options = OptimizerOptions::new().model_rebuild_interval(0);
        assert!(options.validate().is_err());

        let options = OptimizerOptions::new().report_interval(0);
        assert!(options.validate().is_err());

        // Interval without a path is a misconfiguration, not a no-op
        let options = OptimizerOptions::new().checkpoint_interval(3);
        assert!(options.validate().is_err());

        let options = OptimizerOptions::new().checkpoint("progress.json").checkpoint_interval(3);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_resolve_requires_exactly_one_input() {
        let space = SearchSpace::new().add_continuous("lr", 0.01, 1.0, false);

        assert!(ResolvedConfig::resolve(Some(space.clone()), None).is_ok());

        let err = ResolvedConfig::resolve(None, None).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err =
            ResolvedConfig::resolve(Some(space), Some(Path::new("space.json"))).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_resolve_rejects_invalid_domain() {
        let space = SearchSpace::new();
        assert!(ResolvedConfig::resolve(Some(space), None).is_err());
    }

    #[test]
    fn test_resolve_from_file() {
        let space = SearchSpace::new()
            .add_continuous("lr", 0.01, 1.0, false)
            .add_discrete("num_topics", vec![10, 20]);
        let json = serde_json::to_string_pretty(&space).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = ResolvedConfig::resolve(None, Some(file.path())).unwrap();
        assert_eq!(config.domain().dim(), 2);
    }

    #[test]
    fn test_resolve_from_unparseable_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json at all").unwrap();

        let err = ResolvedConfig::resolve(None, Some(file.path())).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_resolve_from_missing_file() {
        let err =
            ResolvedConfig::resolve(None, Some(Path::new("/nonexistent/space.json"))).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
