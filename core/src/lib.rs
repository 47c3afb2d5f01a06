//! flowcut: maximum flow and minimum cut on directed capacitated graphs
//!
//! Graphs are stored as an arena of paired residual edges. Two strategies
//! compute the maximum flow from a single source to a single sink:
//! Edmonds-Karp shortest augmenting paths and FIFO push-relabel. The
//! minimum cut is then read off the final residual graph.
//!
//! ```no_run
//! use flowcut::max_flow_min_cut;
//!
//! let edges = [(0, 1, 3.0), (0, 2, 1.0), (1, 2, 1.0), (1, 3, 2.0), (2, 3, 2.0)];
//! let result = max_flow_min_cut(&edges, 0, 3, None).unwrap();
//! assert_eq!(result.max_flow, 4.0);
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod data_structures;
pub mod validation;

pub use crate::algorithm::config::{MaxFlowVariant, SolverConfig};
pub use crate::algorithm::graph::max_flow::{EdmondsKarp, FlowMetrics, MaxFlowResult, MaxFlowSolver};
pub use crate::algorithm::graph::min_cut::{extract_cut, CutEdge, MinCut, MinCutExtractor};
pub use crate::algorithm::graph::push_relabel::PushRelabel;
pub use crate::algorithm::traits::{
    Algorithm, Capacity, EdgeId, Flow, FlowError, FlowResult, MaxFlowAlgorithm, NodeId,
};
pub use crate::data_structures::builder::{from_edge_list, GraphBuilder};
pub use crate::data_structures::graph::{EdgeRecord, FlowEdge, FlowNetwork, NetworkRecord, SolveStatus};
pub use crate::data_structures::labels::{LabeledCut, LabeledFlow, LabeledGraph};

/// Solve with the default configuration and return flow, cut and metrics
pub fn max_flow_min_cut(
    edges: &[(NodeId, NodeId, Capacity)],
    source: NodeId,
    sink: NodeId,
    node_count: Option<usize>,
) -> FlowResult<MaxFlowResult> {
    max_flow_min_cut_with(edges, source, sink, node_count, SolverConfig::default())
}

pub fn max_flow_min_cut_with(
    edges: &[(NodeId, NodeId, Capacity)],
    source: NodeId,
    sink: NodeId,
    node_count: Option<usize>,
    config: SolverConfig,
) -> FlowResult<MaxFlowResult> {
    let mut network = from_edge_list(edges, source, sink, node_count)?;
    MaxFlowSolver::new(config)?.solve_with_cut(&mut network)
}
