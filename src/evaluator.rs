//! Objective evaluation over repeated stochastic training runs
//!
//! The [`Evaluator`] is the single function the external optimizer calls: it
//! turns one hyperparameter configuration into one score vector by training
//! the model `R` times, scoring every run on every metric, and reducing each
//! metric's `R` scores to their median. The median suppresses the occasional
//! outlier run that training instability produces; a mean would not.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::space::Configuration;

/// Training collaborator: one stochastic training run per invocation
pub trait ModelTrainer<O> {
    /// Train the model with the given hyperparameters
    ///
    /// Failures are not retried; they abort the whole evaluation call.
    fn train(&mut self, configuration: &Configuration) -> anyhow::Result<O>;
}

/// Metric collaborator: scores one model output as a real number
pub trait Metric<O> {
    /// Metric name, used in logs and error reports
    fn name(&self) -> &str;

    /// Score a model output
    fn score(&self, output: &O) -> anyhow::Result<f64>;
}

/// Artifact collaborator: serializes one model output to durable storage
pub trait ArtifactWriter<O> {
    /// Persist `output` at `destination`
    fn persist(&self, output: &O, destination: &Path) -> anyhow::Result<()>;
}

struct ArtifactSink<O> {
    writer: Box<dyn ArtifactWriter<O>>,
    directory: PathBuf,
}

/// Wraps the training and metric collaborators into the objective callable
/// the optimizer drives
///
/// Owns the process-wide call counter; sequential use only. The optimizer
/// calls [`Evaluator::evaluate`] as a blocking black box, one configuration
/// at a time.
pub struct Evaluator<O> {
    trainer: Box<dyn ModelTrainer<O>>,
    metrics: Vec<Box<dyn Metric<O>>>,
    artifacts: Option<ArtifactSink<O>>,
    model_runs: usize,
    current_call: u64,
}

impl<O> Evaluator<O> {
    /// Create an evaluator over `model_runs` repeated runs per call
    ///
    /// Call indices start at 1; use [`Evaluator::starting_at`] with the
    /// value returned by [`crate::checkpoint::resume`] to continue an
    /// interrupted run.
    pub fn new(
        trainer: Box<dyn ModelTrainer<O>>,
        metrics: Vec<Box<dyn Metric<O>>>,
        model_runs: usize,
    ) -> Result<Self> {
        if model_runs == 0 {
            return Err(Error::Configuration("model_runs must be at least 1".to_string()));
        }
        if metrics.is_empty() {
            return Err(Error::Configuration("at least one metric is required".to_string()));
        }
        Ok(Self { trainer, metrics, artifacts: None, model_runs, current_call: 1 })
    }

    /// Enable artifact persistence under `save_path`
    ///
    /// Model outputs are written to a `models/` subdirectory, created
    /// recursively if absent, under filenames `{call index}_{run index}`.
    pub fn persist_artifacts(
        mut self,
        writer: Box<dyn ArtifactWriter<O>>,
        save_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let directory = save_path.into().join("models");
        fs::create_dir_all(&directory).map_err(|e| Error::Artifact {
            path: directory.clone(),
            source: e.into(),
        })?;
        self.artifacts = Some(ArtifactSink { writer, directory });
        Ok(self)
    }

    /// Set the initial call index (from checkpoint resumption)
    pub fn starting_at(mut self, call: u64) -> Self {
        self.current_call = call;
        self
    }

    /// Number of configured metrics; the arity of the objective
    pub fn num_metrics(&self) -> usize {
        self.metrics.len()
    }

    /// The call index the next evaluation will use
    pub fn current_call(&self) -> u64 {
        self.current_call
    }

    /// Number of repeated training runs per evaluation call
    pub fn model_runs(&self) -> usize {
        self.model_runs
    }

    /// Evaluate one configuration: train `R` times, score every run on every
    /// metric, return the per-metric medians in metric-declaration order
    ///
    /// The call counter advances by exactly one on success and not at all on
    /// failure; a failed call never returns a partial score vector, and its
    /// partially written artifacts are discardable (the call index will be
    /// re-run after resume).
    pub fn evaluate(&mut self, configuration: &Configuration) -> Result<Vec<f64>> {
        let mut samples: Vec<Vec<f64>> = (0..self.metrics.len())
            .map(|_| Vec::with_capacity(self.model_runs))
            .collect();

        for run in 0..self.model_runs {
            let output = self.trainer.train(configuration).map_err(Error::Training)?;

            if let Some(sink) = &self.artifacts {
                let destination = sink.directory.join(format!("{}_{}", self.current_call, run));
                sink.writer.persist(&output, &destination).map_err(|e| Error::Artifact {
                    path: destination.clone(),
                    source: e,
                })?;
            }

            for (metric, accumulator) in self.metrics.iter().zip(samples.iter_mut()) {
                let score = metric.score(&output).map_err(|e| Error::Scoring {
                    metric: metric.name().to_string(),
                    source: e,
                })?;
                accumulator.push(score);
            }
        }

        let medians: Vec<f64> = samples.iter().map(|scores| median(scores)).collect();
        tracing::debug!(
            call = self.current_call,
            runs = self.model_runs,
            scores = ?medians,
            "evaluation complete"
        );
        self.current_call += 1;
        Ok(medians)
    }
}

/// Statistical median; averages the two middle elements for even lengths
fn median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::ParameterValue;

    /// Trainer whose outputs are consecutive run ids
    struct CountingTrainer {
        next_output: usize,
        fail_on: Option<usize>,
    }

    impl CountingTrainer {
        fn new() -> Self {
            Self { next_output: 0, fail_on: None }
        }

        fn failing_on(output: usize) -> Self {
            Self { next_output: 0, fail_on: Some(output) }
        }
    }

    impl ModelTrainer<usize> for CountingTrainer {
        fn train(&mut self, _configuration: &Configuration) -> anyhow::Result<usize> {
            let output = self.next_output;
            if self.fail_on == Some(output) {
                anyhow::bail!("training diverged on run {output}");
            }
            self.next_output += 1;
            Ok(output)
        }
    }

    /// Metric that maps run ids onto a fixed score cycle
    struct CycleMetric {
        name: &'static str,
        cycle: Vec<f64>,
    }

    impl Metric<usize> for CycleMetric {
        fn name(&self) -> &str {
            self.name
        }

        fn score(&self, output: &usize) -> anyhow::Result<f64> {
            Ok(self.cycle[output % self.cycle.len()])
        }
    }

    struct TouchWriter;

    impl ArtifactWriter<usize> for TouchWriter {
        fn persist(&self, output: &usize, destination: &Path) -> anyhow::Result<()> {
            fs::write(destination, output.to_string())?;
            Ok(())
        }
    }

    fn any_config() -> Configuration {
        let mut configuration = Configuration::new();
        configuration.insert("learning_rate".to_string(), ParameterValue::Continuous(0.3));
        configuration
    }

    fn two_metric_evaluator(model_runs: usize) -> Evaluator<usize> {
        Evaluator::new(
            Box::new(CountingTrainer::new()),
            vec![
                Box::new(CycleMetric { name: "coherence", cycle: vec![1.0, 2.0, 3.0] }),
                Box::new(CycleMetric { name: "diversity", cycle: vec![4.0, 5.0, 6.0] }),
            ],
            model_runs,
        )
        .unwrap()
    }

    #[test]
    fn test_medians_in_metric_order() {
        // Scores over three runs: coherence [1,2,3], diversity [4,5,6]
        let mut evaluator = two_metric_evaluator(3);
        assert_eq!(evaluator.current_call(), 1);

        let scores = evaluator.evaluate(&any_config()).unwrap();
        assert_eq!(scores, vec![2.0, 5.0]);
        assert_eq!(evaluator.current_call(), 2);
    }

    #[test]
    fn test_even_run_count_averages_middle_scores() {
        // Two runs score coherence [1,2]: median is 1.5
        let mut evaluator = two_metric_evaluator(2);
        let scores = evaluator.evaluate(&any_config()).unwrap();
        assert_eq!(scores, vec![1.5, 4.5]);
    }

    #[test]
    fn test_failed_call_does_not_advance_counter() {
        let mut evaluator = Evaluator::<usize>::new(
            Box::new(CountingTrainer::failing_on(1)),
            vec![Box::new(CycleMetric { name: "coherence", cycle: vec![1.0] })],
            3,
        )
        .unwrap();

        // Second run fails; the whole call aborts without a partial vector
        let err = evaluator.evaluate(&any_config()).unwrap_err();
        assert!(matches!(err, Error::Training(_)));
        assert_eq!(evaluator.current_call(), 1);
    }

    #[test]
    fn test_scoring_failure_aborts_call() {
        struct BrokenMetric;
        impl Metric<usize> for BrokenMetric {
            fn name(&self) -> &str {
                "broken"
            }
            fn score(&self, _output: &usize) -> anyhow::Result<f64> {
                anyhow::bail!("scorer crashed")
            }
        }

        let mut evaluator =
            Evaluator::<usize>::new(Box::new(CountingTrainer::new()), vec![Box::new(BrokenMetric)], 2)
                .unwrap();

        let err = evaluator.evaluate(&any_config()).unwrap_err();
        assert!(matches!(err, Error::Scoring { .. }));
        assert_eq!(evaluator.current_call(), 1);
    }

    #[test]
    fn test_artifact_filenames_use_call_and_run_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut evaluator = two_metric_evaluator(2)
            .persist_artifacts(Box::new(TouchWriter), dir.path())
            .unwrap();

        evaluator.evaluate(&any_config()).unwrap();
        evaluator.evaluate(&any_config()).unwrap();

        let models = dir.path().join("models");
        assert!(models.join("1_0").exists());
        assert!(models.join("1_1").exists());
        assert!(models.join("2_0").exists());
        assert!(models.join("2_1").exists());
    }

    #[test]
    fn test_no_writes_when_persistence_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut evaluator = two_metric_evaluator(2);

        evaluator.evaluate(&any_config()).unwrap();

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(!dir.path().join("models").exists());
    }

    #[test]
    fn test_rejects_degenerate_construction() {
        let result = Evaluator::<usize>::new(
            Box::new(CountingTrainer::new()),
            vec![Box::new(CycleMetric { name: "coherence", cycle: vec![1.0] })],
            0,
        );
        assert!(matches!(result, Err(Error::Configuration(_))));

        let result = Evaluator::<usize>::new(Box::new(CountingTrainer::new()), vec![], 2);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0]), 2.5);
        assert_eq!(median(&[7.0]), 7.0);
    }
}
