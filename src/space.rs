//! Parameter space definitions for hyperparameter search

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A point in the search domain: parameter name -> chosen value.
///
/// Produced by the external optimizer, immutable once produced.
pub type Configuration = HashMap<String, ParameterValue>;

/// A parameter value (continuous, discrete or categorical)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    /// Continuous floating-point value
    Continuous(f64),
    /// Discrete integer value
    Discrete(i64),
    /// Categorical choice
    Categorical(String),
}

impl ParameterValue {
    /// Get as f64 (continuous params, or discrete cast to float)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Continuous(v) => Some(*v),
            ParameterValue::Discrete(v) => Some(*v as f64),
            ParameterValue::Categorical(_) => None,
        }
    }

    /// Get as i64 (for discrete params)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParameterValue::Discrete(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string (for categorical params)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Categorical(s) => Some(s),
            _ => None,
        }
    }
}

/// Parameter definition in search space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Parameter {
    /// Continuous parameter with min, max, and optional log scale
    Continuous {
        /// Parameter name
        name: String,
        /// Lower bound (inclusive)
        min: f64,
        /// Upper bound (inclusive)
        max: f64,
        /// Sample in log space
        log_scale: bool,
    },
    /// Discrete parameter with allowed values
    Discrete {
        /// Parameter name
        name: String,
        /// Allowed values
        values: Vec<i64>,
    },
    /// Categorical parameter with named choices
    Categorical {
        /// Parameter name
        name: String,
        /// Allowed choices
        choices: Vec<String>,
    },
}

impl Parameter {
    /// Get parameter name
    pub fn name(&self) -> &str {
        match self {
            Parameter::Continuous { name, .. } => name,
            Parameter::Discrete { name, .. } => name,
            Parameter::Categorical { name, .. } => name,
        }
    }

    /// Sample a random value from this parameter's range
    pub fn sample(&self) -> ParameterValue {
        use rand::Rng;
        let mut rng = rand::thread_rng();

        match self {
            Parameter::Continuous { min, max, log_scale, .. } => {
                let value = if *log_scale {
                    // Sample in log space
                    let log_min = min.ln();
                    let log_max = max.ln();
                    (rng.gen::<f64>() * (log_max - log_min) + log_min).exp()
                } else {
                    rng.gen::<f64>() * (max - min) + min
                };
                ParameterValue::Continuous(value)
            }
            Parameter::Discrete { values, .. } => {
                let idx = rng.gen_range(0..values.len());
                ParameterValue::Discrete(values[idx])
            }
            Parameter::Categorical { choices, .. } => {
                let idx = rng.gen_range(0..choices.len());
                ParameterValue::Categorical(choices[idx].clone())
            }
        }
    }

    /// Normalize a value to [0, 1] range (for surrogate-model input)
    pub fn normalize(&self, value: &ParameterValue) -> f64 {
        match (self, value) {
            (Parameter::Continuous { min, max, log_scale, .. }, ParameterValue::Continuous(v)) => {
                if *log_scale {
                    let log_val = v.ln();
                    let log_min = min.ln();
                    let log_max = max.ln();
                    (log_val - log_min) / (log_max - log_min)
                } else {
                    (v - min) / (max - min)
                }
            }
            (Parameter::Discrete { values, .. }, ParameterValue::Discrete(v)) => {
                // Map to [0, 1] based on position in values list
                let idx = values.iter().position(|&x| x == *v).unwrap_or(0);
                idx as f64 / (values.len() - 1).max(1) as f64
            }
            (Parameter::Categorical { choices, .. }, ParameterValue::Categorical(v)) => {
                let idx = choices.iter().position(|x| x == v).unwrap_or(0);
                idx as f64 / (choices.len() - 1).max(1) as f64
            }
            _ => 0.5, // Mismatch, return middle value
        }
    }
}

/// Search domain for hyperparameter optimization
///
/// Parameter order is significant and preserved: the optimizer sees the
/// domain positionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpace {
    parameters: Vec<Parameter>,
}

impl SearchSpace {
    /// Create a new empty search space
    pub fn new() -> Self {
        Self { parameters: Vec::new() }
    }

    /// Add a continuous parameter
    pub fn add_continuous(
        mut self,
        name: impl Into<String>,
        min: f64,
        max: f64,
        log_scale: bool,
    ) -> Self {
        self.parameters
            .push(Parameter::Continuous { name: name.into(), min, max, log_scale });
        self
    }

    /// Add a discrete parameter
    pub fn add_discrete(mut self, name: impl Into<String>, values: Vec<i64>) -> Self {
        self.parameters.push(Parameter::Discrete { name: name.into(), values });
        self
    }

    /// Add a categorical parameter
    pub fn add_categorical(mut self, name: impl Into<String>, choices: Vec<String>) -> Self {
        self.parameters.push(Parameter::Categorical { name: name.into(), choices });
        self
    }

    /// Get number of parameters
    pub fn dim(&self) -> usize {
        self.parameters.len()
    }

    /// Sample a random configuration
    pub fn sample(&self) -> Configuration {
        self.parameters.iter().map(|p| (p.name().to_string(), p.sample())).collect()
    }

    /// Normalize a configuration to [0, 1]^d vector (for surrogate models)
    pub fn normalize(&self, config: &Configuration) -> Vec<f64> {
        self.parameters
            .iter()
            .map(|p| config.get(p.name()).map(|v| p.normalize(v)).unwrap_or(0.5))
            .collect()
    }

    /// Get parameter by name
    pub fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// Get all parameters
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Validate the domain description
    ///
    /// Checks that the space is non-empty, names are unique, continuous
    /// bounds are ordered (and positive when log-scaled), and discrete /
    /// categorical parameters offer at least one value.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::Error;

        if self.parameters.is_empty() {
            return Err(Error::Configuration("search space is empty".to_string()));
        }
        let mut seen = std::collections::HashSet::new();
        for param in &self.parameters {
            if !seen.insert(param.name()) {
                return Err(Error::Configuration(format!(
                    "duplicate parameter '{}'",
                    param.name()
                )));
            }
            match param {
                Parameter::Continuous { name, min, max, log_scale } => {
                    if min >= max {
                        return Err(Error::Configuration(format!(
                            "parameter '{name}': min must be less than max"
                        )));
                    }
                    if *log_scale && *min <= 0.0 {
                        return Err(Error::Configuration(format!(
                            "parameter '{name}': log scale requires positive bounds"
                        )));
                    }
                }
                Parameter::Discrete { name, values } => {
                    if values.is_empty() {
                        return Err(Error::Configuration(format!(
                            "parameter '{name}': no discrete values"
                        )));
                    }
                }
                Parameter::Categorical { name, choices } => {
                    if choices.is_empty() {
                        return Err(Error::Configuration(format!(
                            "parameter '{name}': no categorical choices"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_space() {
        let space = SearchSpace::new()
            .add_continuous("lr", 1e-4, 1e-3, true)
            .add_discrete("num_topics", vec![10, 20, 50])
            .add_categorical("activation", vec!["relu".to_string(), "tanh".to_string()]);

        assert_eq!(space.dim(), 3);
        assert!(space.validate().is_ok());

        let config = space.sample();
        assert_eq!(config.len(), 3);
        assert!(config.contains_key("lr"));
        assert!(config.contains_key("num_topics"));
        assert!(config.contains_key("activation"));
    }

    #[test]
    fn test_normalization() {
        let space = SearchSpace::new()
            .add_continuous("x", 0.0, 10.0, false)
            .add_discrete("y", vec![1, 2, 3]);

        let mut config = Configuration::new();
        config.insert("x".to_string(), ParameterValue::Continuous(5.0));
        config.insert("y".to_string(), ParameterValue::Discrete(2));

        let normalized = space.normalize(&config);
        assert_eq!(normalized.len(), 2);
        assert!((normalized[0] - 0.5).abs() < 1e-6); // x=5.0 -> 0.5 in [0, 10]
        assert!((normalized[1] - 0.5).abs() < 1e-6); // y=2 -> middle value
    }

    #[test]
    fn test_sample_stays_in_bounds() {
        let space = SearchSpace::new().add_continuous("lr", 0.01, 1.0, false);
        for _ in 0..100 {
            let config = space.sample();
            let lr = config["lr"].as_f64().unwrap();
            assert!((0.01..=1.0).contains(&lr));
        }
    }

    #[test]
    fn test_validate_rejects_bad_domains() {
        assert!(SearchSpace::new().validate().is_err());

        let inverted = SearchSpace::new().add_continuous("lr", 1.0, 0.01, false);
        assert!(inverted.validate().is_err());

        let bad_log = SearchSpace::new().add_continuous("lr", 0.0, 1.0, true);
        assert!(bad_log.validate().is_err());

        let empty_choices = SearchSpace::new().add_discrete("k", vec![]);
        assert!(empty_choices.validate().is_err());

        let duplicate = SearchSpace::new()
            .add_continuous("lr", 0.01, 1.0, false)
            .add_discrete("lr", vec![1, 2]);
        assert!(duplicate.validate().is_err());
    }

    #[test]
    fn test_space_json_round_trip() {
        let space = SearchSpace::new()
            .add_continuous("lr", 0.01, 1.0, false)
            .add_discrete("num_topics", vec![10, 20]);

        let json = serde_json::to_string(&space).unwrap();
        let restored: SearchSpace = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.dim(), 2);
        assert!(restored.get_parameter("lr").is_some());
        assert!(restored.get_parameter("num_topics").is_some());
    }
}
