//! Solver configuration
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::{
    AlgorithmParameter, FlowError, FlowResult, ParameterConstraints, ParameterType,
};

/// Maximum flow algorithm variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFlowVariant {
    /// Edmonds-Karp with BFS shortest augmenting paths
    EdmondsKarp,
    /// Goldberg-Tarjan push-relabel with FIFO vertex selection
    PushRelabel,
}

impl MaxFlowVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            MaxFlowVariant::EdmondsKarp => "edmonds_karp",
            MaxFlowVariant::PushRelabel => "push_relabel",
        }
    }
}

impl fmt::Display for MaxFlowVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaxFlowVariant {
    type Err = FlowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "edmonds_karp" => Ok(MaxFlowVariant::EdmondsKarp),
            "push_relabel" => Ok(MaxFlowVariant::PushRelabel),
            other => Err(FlowError::InvalidParameter {
                name: "variant".to_string(),
                reason: format!("unknown variant '{}', expected edmonds_karp or push_relabel", other),
            }),
        }
    }
}

/// Solver configuration with documented defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Strategy used by [`MaxFlowSolver`](crate::algorithm::graph::max_flow::MaxFlowSolver)
    pub variant: MaxFlowVariant,

    /// Residuals at or below this threshold count as saturated
    ///
    /// The threshold is absolute, not relative to the capacities. The
    /// default `1e-9` suits capacities around 1 and above; scale it down with
    /// the capacities (e.g. `1e-15` for capacities around `1e-6`), otherwise
    /// the two strategies can stop on slightly different flows.
    pub epsilon: f64,

    /// Augmentations (Edmonds-Karp) or discharges (push-relabel) allowed
    /// before giving up; `None` means unbounded
    pub max_iterations: Option<usize>,

    /// Discharges between global relabels in push-relabel; 0 disables them
    pub global_relabel_interval: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            variant: MaxFlowVariant::EdmondsKarp,
            epsilon: 1e-9,
            max_iterations: None,
            global_relabel_interval: 100,
        }
    }
}

impl SolverConfig {
    /// Parameter names accepted by [`set_parameter`](Self::set_parameter)
    pub const PARAMETERS: [&'static str; 4] =
        ["variant", "epsilon", "max_iterations", "global_relabel_interval"];

    /// Parse a JSON document; missing keys take their defaults
    pub fn from_json(json: &str) -> FlowResult<Self> {
        let config: SolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> FlowResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_variant(mut self, variant: MaxFlowVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn validate(&self) -> FlowResult<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(FlowError::InvalidParameter {
                name: "epsilon".to_string(),
                reason: format!("must be finite and non-negative, got {}", self.epsilon),
            });
        }
        if self.max_iterations == Some(0) {
            return Err(FlowError::InvalidParameter {
                name: "max_iterations".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Set one parameter from its string form
    ///
    /// The configuration is left untouched when the value is rejected.
    pub fn set_parameter(&mut self, name: &str, value: &str) -> FlowResult<()> {
        let mut updated = self.clone();
        match name {
            "variant" => updated.variant = value.parse()?,
            "epsilon" => {
                updated.epsilon = value.parse::<f64>()
                    .map_err(|_| invalid(name, "must be a number"))?;
            }
            "max_iterations" => {
                updated.max_iterations = match value {
                    "none" | "" => None,
                    _ => Some(value.parse::<usize>()
                        .map_err(|_| invalid(name, "must be a positive integer or 'none'"))?),
                };
            }
            "global_relabel_interval" => {
                updated.global_relabel_interval = value.parse::<usize>()
                    .map_err(|_| invalid(name, "must be a non-negative integer"))?;
            }
            _ => return Err(invalid(name, "unknown parameter")),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "variant" => Some(self.variant.to_string()),
            "epsilon" => Some(self.epsilon.to_string()),
            "max_iterations" => Some(self.max_iterations
                .map_or_else(|| "none".to_string(), |limit| limit.to_string())),
            "global_relabel_interval" => Some(self.global_relabel_interval.to_string()),
            _ => None,
        }
    }

    /// Typed descriptor of one parameter with its current value
    pub fn parameter(&self, name: &str) -> Option<AlgorithmParameter> {
        let (value_type, constraints) = match name {
            "variant" => (
                ParameterType::Enum(vec![
                    MaxFlowVariant::EdmondsKarp.to_string(),
                    MaxFlowVariant::PushRelabel.to_string(),
                ]),
                None,
            ),
            "epsilon" => (
                ParameterType::Float,
                Some(ParameterConstraints { min: Some(0.0), max: None }),
            ),
            "max_iterations" => (
                ParameterType::Integer,
                Some(ParameterConstraints { min: Some(1.0), max: None }),
            ),
            "global_relabel_interval" => (
                ParameterType::Integer,
                Some(ParameterConstraints { min: Some(0.0), max: None }),
            ),
            _ => return None,
        };

        Some(AlgorithmParameter {
            name: name.to_string(),
            value: self.get_parameter(name)?,
            value_type,
            constraints,
        })
    }
}

fn invalid(name: &str, reason: &str) -> FlowError {
    FlowError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();

        assert_eq!(config.variant, MaxFlowVariant::EdmondsKarp);
        assert_eq!(config.epsilon, 1e-9);
        assert_eq!(config.max_iterations, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_missing_keys() {
        let config = SolverConfig::from_json(r#"{ "variant": "push_relabel", "max_iterations": 500 }"#)
            .unwrap();

        assert_eq!(config.variant, MaxFlowVariant::PushRelabel);
        assert_eq!(config.max_iterations, Some(500));
        assert_eq!(config.epsilon, SolverConfig::default().epsilon);
    }

    #[test]
    fn test_from_json_rejects_bad_documents() {
        assert!(matches!(SolverConfig::from_json("{ "), Err(FlowError::Config(_))));
        assert!(matches!(SolverConfig::from_json(r#"{ "variant": "dinic" }"#),
                         Err(FlowError::Config(_))));
        assert!(matches!(SolverConfig::from_json(r#"{ "epsilon": -1.0 }"#),
                         Err(FlowError::InvalidParameter { .. })));
    }

    #[test]
    fn test_json_round_trip() {
        let config = SolverConfig::default().with_variant(MaxFlowVariant::PushRelabel);
        let json = config.to_json().unwrap();

        assert!(json.contains("\"push_relabel\""));
        assert_eq!(SolverConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_parameter_setting() {
        let mut config = SolverConfig::default();

        assert!(config.set_parameter("global_relabel_interval", "50").is_ok());
        assert_eq!(config.get_parameter("global_relabel_interval").as_deref(), Some("50"));

        assert!(config.set_parameter("max_iterations", "1000").is_ok());
        assert_eq!(config.max_iterations, Some(1000));
        assert!(config.set_parameter("max_iterations", "none").is_ok());
        assert_eq!(config.max_iterations, None);

        assert!(config.set_parameter("variant", "push_relabel").is_ok());
        assert_eq!(config.get_parameter("variant").as_deref(), Some("push_relabel"));

        // Test invalid parameters
        assert!(config.set_parameter("invalid_param", "value").is_err());
        assert!(config.set_parameter("epsilon", "tiny").is_err());
        assert!(config.set_parameter("epsilon", "-0.1").is_err());
        assert!(config.set_parameter("max_iterations", "0").is_err());
        assert_eq!(config.epsilon, 1e-9);
        assert_eq!(config.get_parameter("invalid_param"), None);
    }

    #[test]
    fn test_parameter_descriptors() {
        let config = SolverConfig::default();
        let variant = config.parameter("variant").unwrap();

        assert_eq!(variant.value, "edmonds_karp");
        assert!(matches!(variant.value_type, ParameterType::Enum(ref options) if options.len() == 2));
        assert_eq!(config.parameter("max_iterations").unwrap().value, "none");
        assert!(config.parameter("unknown").is_none());
    }
}
