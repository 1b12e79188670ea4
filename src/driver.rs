//! Search driving against an external multi-objective optimizer
//!
//! The driver invokes the optimizer collaborator exactly once, blocking, and
//! yields control: the optimizer calls back into the objective sequentially
//! until the capital budget is exhausted, then hands back the Pareto-optimal
//! set and its history. Optimizer failures (malformed domain, bad
//! configuration) propagate unmodified; they are fatal for the whole run.

use crate::config::{OptimizerOptions, ResolvedConfig};
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::space::{Configuration, SearchSpace};

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Maximize every metric
    Maximize,
    /// Minimize every metric
    Minimize,
}

impl Direction {
    /// Check if this direction is maximization
    pub fn is_maximization(&self) -> bool {
        matches!(self, Direction::Maximize)
    }
}

/// Optimization method identifier passed to the optimizer collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationMethod {
    /// Bayesian optimization
    BayesOpt,
}

impl OptimizationMethod {
    /// Identifier understood by the optimizer collaborator
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationMethod::BayesOpt => "bo",
        }
    }
}

/// The objective callable handed to the optimizer: one configuration in, one
/// score vector out
pub type ObjectiveFn<'a> = &'a mut dyn FnMut(&Configuration) -> Result<Vec<f64>>;

/// The Pareto-optimal set: parallel sequences of objective-value vectors and
/// the configurations that produced them
#[derive(Debug, Clone)]
pub struct ParetoFront {
    /// Objective-value vectors, one per Pareto-optimal point
    pub values: Vec<Vec<f64>>,
    /// Configurations corresponding positionally to `values`
    pub points: Vec<Configuration>,
}

impl ParetoFront {
    /// Number of Pareto-optimal points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the front is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Everything a finished search surfaces to its caller
#[derive(Debug)]
pub struct SearchOutcome<H> {
    /// The Pareto-optimal set
    pub pareto: ParetoFront,
    /// Opaque optimization history from the collaborator
    pub history: H,
}

/// External multi-objective optimizer boundary
///
/// The calling convention must be matched exactly: the objective callable
/// together with its output arity, then the domain, the capital budget, the
/// resolved configuration, the method identifier, and the options bundle.
/// Two distinct entry functions mirror the collaborator's maximise/minimise
/// API so doubles can record which one was driven.
pub trait MultiObjectiveOptimizer {
    /// Opaque optimization history
    type History;

    /// Run a maximization search until the capital budget is exhausted
    #[allow(clippy::too_many_arguments)]
    fn maximize(
        &mut self,
        objective: ObjectiveFn<'_>,
        num_objectives: usize,
        domain: &SearchSpace,
        max_capital: usize,
        config: &ResolvedConfig,
        method: OptimizationMethod,
        options: &OptimizerOptions,
    ) -> Result<(Vec<Vec<f64>>, Vec<Configuration>, Self::History)>;

    /// Run a minimization search until the capital budget is exhausted
    #[allow(clippy::too_many_arguments)]
    fn minimize(
        &mut self,
        objective: ObjectiveFn<'_>,
        num_objectives: usize,
        domain: &SearchSpace,
        max_capital: usize,
        config: &ResolvedConfig,
        method: OptimizationMethod,
        options: &OptimizerOptions,
    ) -> Result<(Vec<Vec<f64>>, Vec<Configuration>, Self::History)>;
}

/// Configures and invokes the optimizer with the evaluator as its black-box
/// objective
pub struct SearchDriver<Opt> {
    optimizer: Opt,
    config: ResolvedConfig,
    options: OptimizerOptions,
    number_of_calls: usize,
    direction: Direction,
}

impl<Opt: MultiObjectiveOptimizer> SearchDriver<Opt> {
    /// Create a driver with a capital budget of `number_of_calls` objective
    /// evaluations
    pub fn new(
        optimizer: Opt,
        config: ResolvedConfig,
        options: OptimizerOptions,
        number_of_calls: usize,
        direction: Direction,
    ) -> Self {
        Self { optimizer, config, options, number_of_calls, direction }
    }

    /// Access the injected optimizer
    pub fn optimizer(&self) -> &Opt {
        &self.optimizer
    }

    /// Run the search to completion, blocking
    ///
    /// Invokes the optimizer exactly once; the optimizer calls back into the
    /// evaluator sequentially, one configuration at a time.
    pub fn run<O>(&mut self, evaluator: &mut Evaluator<O>) -> Result<SearchOutcome<Opt::History>> {
        self.options.validate()?;
        let num_objectives = evaluator.num_metrics();

        tracing::info!(
            budget = self.number_of_calls,
            objectives = num_objectives,
            runs_per_call = evaluator.model_runs(),
            direction = ?self.direction,
            acquisition = self.options.acquisition_function.as_str(),
            "starting multi-objective search"
        );

        let mut objective = |configuration: &Configuration| evaluator.evaluate(configuration);

        let (values, points, history) = match self.direction {
            Direction::Maximize => self.optimizer.maximize(
                &mut objective,
                num_objectives,
                self.config.domain(),
                self.number_of_calls,
                &self.config,
                OptimizationMethod::BayesOpt,
                &self.options,
            )?,
            Direction::Minimize => self.optimizer.minimize(
                &mut objective,
                num_objectives,
                self.config.domain(),
                self.number_of_calls,
                &self.config,
                OptimizationMethod::BayesOpt,
                &self.options,
            )?,
        };

        tracing::info!(pareto_size = values.len(), "search complete");
        Ok(SearchOutcome { pareto: ParetoFront { values, points }, history })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction() {
        assert!(Direction::Maximize.is_maximization());
        assert!(!Direction::Minimize.is_maximization());
    }

    #[test]
    fn test_method_identifier() {
        assert_eq!(OptimizationMethod::BayesOpt.as_str(), "bo");
    }
}
