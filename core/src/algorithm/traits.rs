//! Core algorithm trait definitions for the flowcut solver
//!
//! This module establishes the shared vocabulary of the crate: node and edge
//! handles, capacity and flow scalars, the error taxonomy, and the trait
//! system that every maximum flow strategy implements.
//!
//! # Key Design Principles
//! - Dense integer node identifiers with arena-indexed edges
//! - Eager validation, explicit `Result` propagation
//! - String-typed parameter surface shared by all strategies
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt::{self, Debug, Display};
use serde::{Serialize, Deserialize};

use crate::algorithm::graph::max_flow::FlowMetrics;
use crate::data_structures::graph::FlowNetwork;

/// Node identifier: a dense index in `[0, node_count)`
pub type NodeId = usize;

/// Edge capacity scalar
pub type Capacity = f64;

/// Flow value scalar
pub type Flow = f64;

/// Handle to an edge record inside a [`FlowNetwork`] arena
///
/// Forward edges occupy even slots and their reverse edges the following odd
/// slot, so the paired edge is always `id ^ 1`.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl EdgeId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// The paired edge in the opposite direction
    #[inline]
    pub fn pair(self) -> EdgeId {
        EdgeId(self.0 ^ 1)
    }

    /// Whether this is an original (caller supplied) edge
    #[inline]
    pub fn is_forward(self) -> bool {
        self.0 & 1 == 0
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Comprehensive error types for graph construction and solving
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error("Invalid node: {node} is outside [0, {node_count})")]
    InvalidNode { node: NodeId, node_count: usize },

    #[error("Invalid capacity {capacity} on edge ({from}, {to}): must be finite and non-negative")]
    InvalidCapacity { from: NodeId, to: NodeId, capacity: Capacity },

    #[error("Degenerate graph: source and sink are both node {node}")]
    DegenerateGraph { node: NodeId },

    #[error("Capacity exceeded on {edge}: requested {requested}, residual {residual}")]
    CapacityExceeded { edge: EdgeId, requested: Flow, residual: Capacity },

    #[error("Infeasible flow at node {node}: net outflow {imbalance}")]
    InfeasibleFlow { node: NodeId, imbalance: Flow },

    #[error("Minimum cut requested before the maximum flow has been computed")]
    NotConverged,

    #[error("Iteration limit exceeded: {limit} iterations without convergence")]
    IterationLimitExceeded { limit: usize },

    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::Config(err.to_string())
    }
}

/// Result alias used throughout the crate
pub type FlowResult<T> = Result<T, FlowError>;

/// Algorithm parameter with strongly typed values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmParameter {
    pub name: String,
    pub value: String,
    pub value_type: ParameterType,
    pub constraints: Option<ParameterConstraints>,
}

/// Parameter type enumeration for type-safe parameter handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterType {
    Integer,
    Float,
    Enum(Vec<String>),
}

/// Parameter constraints for validating algorithm parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterConstraints {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Algorithm complexity information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmComplexity {
    pub time_complexity: String,
    pub space_complexity: String,
}

/// Main algorithm trait
///
/// # Invariants
/// - State isolation between runs
/// - Deterministic behavior for given inputs
pub trait Algorithm: Debug + Send + Sync {
    /// Returns the algorithm's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the algorithm's category
    fn category(&self) -> &'static str;

    /// Returns the algorithm's description
    fn description(&self) -> String;

    /// Returns the algorithm's asymptotic complexity in Big-O notation
    fn complexity(&self) -> AlgorithmComplexity;

    /// Returns supported parameters with type information
    fn parameters(&self) -> Vec<AlgorithmParameter>;

    /// Sets algorithm parameter with type validation
    fn set_parameter(&mut self, name: &str, value: &str) -> FlowResult<()>;

    /// Gets algorithm parameter value
    fn get_parameter(&self, name: &str) -> Option<String>;
}

/// Maximum flow strategy operating on a residual network in place
///
/// Implementations must leave the network in a state where no
/// source-to-sink path of positive residual capacity remains and every
/// node other than the terminals conserves flow.
pub trait MaxFlowAlgorithm: Algorithm {
    /// Computes the maximum flow value, mutating residual capacities
    fn max_flow(&mut self, network: &mut FlowNetwork) -> FlowResult<Flow>;

    /// Counters gathered during the last run
    fn metrics(&self) -> &FlowMetrics;
}
