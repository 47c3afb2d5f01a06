//! Minimum cut extraction from a converged residual graph
//!
//! Once no augmenting path remains, the nodes reachable from the source
//! through residual capacity above `epsilon` form the source side `S` of a
//! minimum cut. Every original edge leaving `S` is saturated, and their
//! capacities sum to the maximum flow value.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::{BTreeSet, VecDeque};

use log::{debug, warn};
use serde::{Serialize, Deserialize};

use crate::algorithm::traits::{Capacity, Flow, FlowError, FlowResult, NodeId};
use crate::data_structures::graph::{FlowNetwork, SolveStatus};

/// Original edge crossing from the source side to the sink side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub capacity: Capacity,
}

/// Partition of the nodes into source side and sink side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinCut {
    /// Nodes reachable from the source in the final residual graph
    pub source_side: BTreeSet<NodeId>,
    /// Every other node
    pub sink_side: BTreeSet<NodeId>,
    /// Positive-capacity forward edges from `source_side` to `sink_side`,
    /// in insertion order
    pub cut_edges: Vec<CutEdge>,
    /// Sum of the cut edge capacities
    pub capacity: Capacity,
}

impl MinCut {
    /// Cut edges as `(from, to, capacity)` triples
    pub fn edge_triples(&self) -> Vec<(NodeId, NodeId, Capacity)> {
        self.cut_edges
            .iter()
            .map(|edge| (edge.from, edge.to, edge.capacity))
            .collect()
    }

    pub fn is_source_side(&self, node: NodeId) -> bool {
        self.source_side.contains(&node)
    }
}

/// Reads minimum cuts out of solved networks
#[derive(Debug, Clone, Copy)]
pub struct MinCutExtractor {
    epsilon: f64,
}

impl Default for MinCutExtractor {
    fn default() -> Self {
        Self { epsilon: 1e-9 }
    }
}

impl MinCutExtractor {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Source-side minimum cut: `S` is everything the source still reaches
    pub fn extract_cut(&self, network: &FlowNetwork) -> FlowResult<MinCut> {
        let flow = converged_flow(network)?;
        let reached = self.reachable_from_source(network);
        let cut = self.partition(network, |node| reached[node]);
        self.check_duality(&cut, flow);
        Ok(cut)
    }

    /// Sink-side minimum cut: `T` is everything that still reaches the sink
    ///
    /// This yields the minimum cut with the largest source side, which
    /// differs from [`extract_cut`](Self::extract_cut) when the minimum cut
    /// is not unique.
    pub fn extract_sink_side_cut(&self, network: &FlowNetwork) -> FlowResult<MinCut> {
        let flow = converged_flow(network)?;
        let reaches_sink = self.reaching_sink(network);
        let cut = self.partition(network, |node| !reaches_sink[node]);
        self.check_duality(&cut, flow);
        Ok(cut)
    }

    /// Nodes reachable from the source over residual capacity above `epsilon`
    pub fn reachable_from_source(&self, network: &FlowNetwork) -> Vec<bool> {
        let mut reached = vec![false; network.node_count()];
        let mut queue = VecDeque::from([network.source()]);
        reached[network.source()] = true;

        while let Some(node) = queue.pop_front() {
            for edge_id in network.edges_from(node) {
                let edge = network.edge(edge_id);
                if !reached[edge.to] && edge.residual() > self.epsilon {
                    reached[edge.to] = true;
                    queue.push_back(edge.to);
                }
            }
        }
        reached
    }

    /// Nodes that reach the sink over residual capacity above `epsilon`
    fn reaching_sink(&self, network: &FlowNetwork) -> Vec<bool> {
        let mut reached = vec![false; network.node_count()];
        let mut queue = VecDeque::from([network.sink()]);
        reached[network.sink()] = true;

        while let Some(node) = queue.pop_front() {
            for edge_id in network.edges_from(node) {
                let neighbour = network.edge(edge_id).to;
                if !reached[neighbour] && network.residual(edge_id.pair()) > self.epsilon {
                    reached[neighbour] = true;
                    queue.push_back(neighbour);
                }
            }
        }
        reached
    }

    fn partition<F>(&self, network: &FlowNetwork, on_source_side: F) -> MinCut
    where
        F: Fn(NodeId) -> bool,
    {
        let (source_side, sink_side): (BTreeSet<NodeId>, BTreeSet<NodeId>) =
            (0..network.node_count()).partition(|&node| on_source_side(node));

        let cut_edges: Vec<CutEdge> = network
            .forward_edges()
            .filter(|(_, edge)| edge.capacity > 0.0)
            .filter(|(_, edge)| on_source_side(edge.from) && !on_source_side(edge.to))
            .map(|(_, edge)| CutEdge { from: edge.from, to: edge.to, capacity: edge.capacity })
            .collect();
        let capacity = cut_edges.iter().map(|edge| edge.capacity).sum();

        MinCut {
            source_side,
            sink_side,
            cut_edges,
            capacity,
        }
    }

    fn check_duality(&self, cut: &MinCut, flow: Flow) {
        let tolerance = self.epsilon.max(f64::EPSILON)
            * (cut.cut_edges.len() + 1) as f64
            * flow.abs().max(1.0);
        if (cut.capacity - flow).abs() > tolerance {
            warn!("cut capacity {} differs from flow value {} beyond tolerance {}",
                  cut.capacity, flow, tolerance);
        } else {
            debug!("min cut: |S| = {}, |T| = {}, {} cut edges, capacity {}",
                   cut.source_side.len(), cut.sink_side.len(), cut.cut_edges.len(), cut.capacity);
        }
    }
}

fn converged_flow(network: &FlowNetwork) -> FlowResult<Flow> {
    match network.status() {
        SolveStatus::Solved { flow, .. } => Ok(flow),
        SolveStatus::Unsolved => Err(FlowError::NotConverged),
    }
}

/// Extract the source-side minimum cut with the threshold the network was
/// solved with
pub fn extract_cut(network: &FlowNetwork) -> FlowResult<MinCut> {
    let epsilon = network.solve_epsilon().ok_or(FlowError::NotConverged)?;
    MinCutExtractor::new(epsilon).extract_cut(network)
}
