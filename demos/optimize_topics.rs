//! Multi-objective search over a simulated topic model
//!
//! Wires the full loop with a random-search stand-in for the Bayesian
//! optimizer collaborator: two competing metrics (coherence vs. diversity),
//! three noisy training runs per candidate, JSON checkpointing every two
//! calls. Re-running resumes from `topic_search/progress.json`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example optimize_topics
//! ```

use std::path::Path;

use anyhow::Result;
use pareto_tune::{
    checkpoint, ArtifactWriter, Checkpoint, Configuration, Direction, EvaluationRecord,
    Evaluator, Metric, ModelTrainer, MultiObjectiveOptimizer, ObjectiveFn, OptimizationMethod,
    OptimizerOptions, ResolvedConfig, SearchDriver, SearchSpace,
};
use rand::Rng;

/// Output of one simulated training run
struct TopicModelOutput {
    coherence: f64,
    diversity: f64,
}

/// Simulated topic-model trainer: quality depends on the hyperparameters,
/// with per-run noise standing in for training stochasticity
struct TopicModelTrainer;

impl ModelTrainer<TopicModelOutput> for TopicModelTrainer {
    fn train(&mut self, configuration: &Configuration) -> Result<TopicModelOutput> {
        let mut rng = rand::thread_rng();
        let learning_rate = configuration["learning_rate"].as_f64().unwrap_or(0.1);
        let num_topics = configuration["num_topics"].as_i64().unwrap_or(20) as f64;

        // More topics: more diverse, less coherent. Noise makes single runs
        // unreliable, which is why the evaluator takes medians.
        let noise = rng.gen::<f64>() * 0.05;
        let coherence = (1.0 - (learning_rate - 0.3).abs()) / num_topics.sqrt() + noise;
        let diversity = (num_topics.ln() / 5.0).min(1.0) - noise;

        Ok(TopicModelOutput { coherence, diversity })
    }
}

struct CoherenceMetric;

impl Metric<TopicModelOutput> for CoherenceMetric {
    fn name(&self) -> &str {
        "coherence"
    }

    fn score(&self, output: &TopicModelOutput) -> Result<f64> {
        Ok(output.coherence)
    }
}

struct DiversityMetric;

impl Metric<TopicModelOutput> for DiversityMetric {
    fn name(&self) -> &str {
        "diversity"
    }

    fn score(&self, output: &TopicModelOutput) -> Result<f64> {
        Ok(output.diversity)
    }
}

/// Writes one artifact per training run as a small JSON file
struct JsonArtifactWriter;

impl ArtifactWriter<TopicModelOutput> for JsonArtifactWriter {
    fn persist(&self, output: &TopicModelOutput, destination: &Path) -> Result<()> {
        let json = serde_json::json!({
            "coherence": output.coherence,
            "diversity": output.diversity,
        });
        std::fs::write(destination, serde_json::to_string_pretty(&json)?)?;
        Ok(())
    }
}

/// Random-search stand-in for the external Bayesian optimizer
///
/// Proposes configurations uniformly, keeps the non-dominated subset as the
/// Pareto front, and checkpoints at the configured cadence.
struct RandomSearchOptimizer;

impl RandomSearchOptimizer {
    fn drive(
        objective: ObjectiveFn<'_>,
        domain: &SearchSpace,
        max_capital: usize,
        options: &OptimizerOptions,
        maximize: bool,
    ) -> pareto_tune::Result<(Vec<Vec<f64>>, Vec<Configuration>, Checkpoint)> {
        let mut history = Checkpoint::new();

        for call in 1..=max_capital as u64 {
            let configuration = domain.sample();
            let scores = objective(&configuration)?;
            tracing::info!(call, scores = ?scores, "evaluated candidate");
            history.record(EvaluationRecord { call, configuration, scores });

            if let (Some(path), Some(every)) =
                (&options.checkpoint_path, options.checkpoint_interval)
            {
                if call as usize % every == 0 {
                    history.save(path).map_err(pareto_tune::Error::Optimizer)?;
                }
            }
        }

        // Non-dominated filter over everything evaluated
        let dominated = |a: &[f64], b: &[f64]| {
            let better = |x: f64, y: f64| if maximize { x > y } else { x < y };
            b.iter().zip(a).all(|(&bv, &av)| !better(av, bv))
                && b.iter().zip(a).any(|(&bv, &av)| better(bv, av))
        };
        let mut values = Vec::new();
        let mut points = Vec::new();
        for record in &history.evaluations {
            let is_dominated = history
                .evaluations
                .iter()
                .any(|other| dominated(&record.scores, &other.scores));
            if !is_dominated {
                values.push(record.scores.clone());
                points.push(record.configuration.clone());
            }
        }
        Ok((values, points, history))
    }
}

impl MultiObjectiveOptimizer for RandomSearchOptimizer {
    type History = Checkpoint;

    fn maximize(
        &mut self,
        objective: ObjectiveFn<'_>,
        _num_objectives: usize,
        domain: &SearchSpace,
        max_capital: usize,
        _config: &ResolvedConfig,
        _method: OptimizationMethod,
        options: &OptimizerOptions,
    ) -> pareto_tune::Result<(Vec<Vec<f64>>, Vec<Configuration>, Checkpoint)> {
        Self::drive(objective, domain, max_capital, options, true)
    }

    fn minimize(
        &mut self,
        objective: ObjectiveFn<'_>,
        _num_objectives: usize,
        domain: &SearchSpace,
        max_capital: usize,
        _config: &ResolvedConfig,
        _method: OptimizationMethod,
        options: &OptimizerOptions,
    ) -> pareto_tune::Result<(Vec<Vec<f64>>, Vec<Configuration>, Checkpoint)> {
        Self::drive(objective, domain, max_capital, options, false)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let save_path = Path::new("topic_search");
    let progress = save_path.join("progress.json");
    std::fs::create_dir_all(save_path)?;

    let space = SearchSpace::new()
        .add_continuous("learning_rate", 0.01, 1.0, false)
        .add_discrete("num_topics", vec![10, 20, 50, 100]);

    let config = ResolvedConfig::resolve(Some(space), None)?;
    let options = OptimizerOptions::new().checkpoint(&progress);

    let start = checkpoint::resume(&progress)?;
    let mut evaluator = Evaluator::<TopicModelOutput>::new(
        Box::new(TopicModelTrainer),
        vec![Box::new(CoherenceMetric), Box::new(DiversityMetric)],
        3,
    )?
    .persist_artifacts(Box::new(JsonArtifactWriter), save_path)?
    .starting_at(start);

    let mut driver =
        SearchDriver::new(RandomSearchOptimizer, config, options, 10, Direction::Maximize);
    let outcome = driver.run(&mut evaluator)?;

    tracing::info!("Pareto-optimal configurations:");
    for (values, point) in outcome.pareto.values.iter().zip(&outcome.pareto.points) {
        tracing::info!("  coherence={:.3} diversity={:.3} <- {:?}", values[0], values[1], point);
    }

    Ok(())
}
