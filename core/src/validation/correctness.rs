//! Correctness verification of solved networks
//!
//! Checks a converged residual graph and its minimum cut against the
//! properties every maximum flow must satisfy:
//!
//! - capacity bounds: `0 ≤ residual ≤ capacity` on every forward edge
//! - pairing: `residual(fwd) + residual(rev) == capacity(fwd) + capacity(rev)`
//! - conservation at every node other than source and sink
//! - partition: source on the source side, sink on the sink side, every
//!   node on exactly one side
//! - duality: cut capacity equals the flow value
//!
//! Per-edge and per-node checks run in parallel with rayon.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::algorithm::graph::min_cut::MinCut;
use crate::algorithm::traits::{Capacity, EdgeId, Flow, NodeId};
use crate::data_structures::graph::FlowNetwork;

/// Verification failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerificationError {
    #[error("Network has not been solved")]
    Unsolved,

    #[error("Capacity bound violated on {edge} ({from}->{to}): residual {residual} outside [0, {capacity}]")]
    CapacityBound {
        edge: EdgeId,
        from: NodeId,
        to: NodeId,
        residual: Capacity,
        capacity: Capacity,
    },

    #[error("Edge pair {edge}: residuals sum to {actual}, capacities to {expected}")]
    PairImbalance {
        edge: EdgeId,
        expected: Capacity,
        actual: Capacity,
    },

    #[error("Conservation violated at node {node}: net outflow {imbalance}")]
    Conservation { node: NodeId, imbalance: Flow },

    #[error("Invalid partition: {0}")]
    Partition(String),

    #[error("Duality violated: flow {flow}, cut capacity {cut_capacity}")]
    Duality { flow: Flow, cut_capacity: Capacity },
}

/// Summary of a successful verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectnessReport {
    pub flow: Flow,
    pub cut_capacity: Capacity,
    pub edges_checked: usize,
    pub nodes_checked: usize,
    /// Largest absolute net outflow seen at an inner node
    pub max_conservation_error: f64,
    /// Largest pairing discrepancy seen on an edge pair
    pub max_pair_error: f64,
    /// Absolute tolerance the checks were held to
    pub tolerance: f64,
}

/// Verifier for solved networks
#[derive(Debug, Clone, Copy)]
pub struct CorrectnessValidator {
    tolerance: f64,
}

impl Default for CorrectnessValidator {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

impl CorrectnessValidator {
    /// `tolerance` is relative to the largest capacity in the network
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Run every check, failing on the first violation found
    pub fn validate(&self, network: &FlowNetwork, cut: &MinCut) -> Result<CorrectnessReport, VerificationError> {
        let flow = network.flow_value().ok_or(VerificationError::Unsolved)?;
        let tolerance = self.absolute_tolerance(network);

        self.check_capacity_bounds(network, tolerance)?;
        let max_pair_error = self.check_pair_invariant(network, tolerance)?;
        let max_conservation_error = self.check_conservation(network, tolerance)?;
        self.check_partition(network, cut)?;
        self.check_duality(flow, cut, tolerance)?;

        let report = CorrectnessReport {
            flow,
            cut_capacity: cut.capacity,
            edges_checked: network.edge_count(),
            nodes_checked: network.node_count(),
            max_conservation_error,
            max_pair_error,
            tolerance,
        };
        debug!("verified flow {} over {} edges (conservation error {:e})",
               report.flow, report.edges_checked, report.max_conservation_error);
        Ok(report)
    }

    pub fn check_capacity_bounds(&self, network: &FlowNetwork, tolerance: f64) -> Result<(), VerificationError> {
        match forward_ids(network).find_first(|&id| {
            let edge = network.edge(id);
            edge.residual() < -tolerance || edge.residual() > edge.capacity + tolerance
        }) {
            Some(id) => {
                let edge = network.edge(id);
                warn!("capacity bound violated on {}", id);
                Err(VerificationError::CapacityBound {
                    edge: id,
                    from: edge.from,
                    to: edge.to,
                    residual: edge.residual(),
                    capacity: edge.capacity,
                })
            }
            None => Ok(()),
        }
    }

    /// Returns the largest discrepancy observed
    pub fn check_pair_invariant(&self, network: &FlowNetwork, tolerance: f64) -> Result<f64, VerificationError> {
        let discrepancy = |id: EdgeId| {
            let (forward, reverse) = (network.edge(id), network.edge(id.pair()));
            let expected = forward.capacity + reverse.capacity;
            let actual = forward.residual() + reverse.residual();
            (expected, actual)
        };

        if let Some(id) = forward_ids(network).find_first(|&id| {
            let (expected, actual) = discrepancy(id);
            (expected - actual).abs() > tolerance
        }) {
            let (expected, actual) = discrepancy(id);
            return Err(VerificationError::PairImbalance { edge: id, expected, actual });
        }

        Ok(forward_ids(network)
            .map(|id| {
                let (expected, actual) = discrepancy(id);
                (expected - actual).abs()
            })
            .reduce(|| 0.0, f64::max))
    }

    /// Returns the largest absolute net outflow at an inner node
    pub fn check_conservation(&self, network: &FlowNetwork, tolerance: f64) -> Result<f64, VerificationError> {
        let (source, sink) = (network.source(), network.sink());
        let imbalances: Vec<(NodeId, Flow)> = (0..network.node_count())
            .into_par_iter()
            .filter(|&node| node != source && node != sink)
            .map(|node| (node, network.net_outflow(node)))
            .collect();

        if let Some(&(node, imbalance)) = imbalances.iter().find(|(_, imbalance)| imbalance.abs() > tolerance) {
            warn!("conservation violated at node {}: {}", node, imbalance);
            return Err(VerificationError::Conservation { node, imbalance });
        }

        Ok(imbalances
            .iter()
            .map(|(_, imbalance)| imbalance.abs())
            .fold(0.0, f64::max))
    }

    pub fn check_partition(&self, network: &FlowNetwork, cut: &MinCut) -> Result<(), VerificationError> {
        if !cut.source_side.contains(&network.source()) {
            return Err(VerificationError::Partition("source is not on the source side".to_string()));
        }
        if !cut.sink_side.contains(&network.sink()) {
            return Err(VerificationError::Partition("sink is not on the sink side".to_string()));
        }
        if let Some(node) = cut.source_side.intersection(&cut.sink_side).next() {
            return Err(VerificationError::Partition(format!("node {} is on both sides", node)));
        }
        let covered = cut.source_side.len() + cut.sink_side.len();
        if covered != network.node_count() {
            return Err(VerificationError::Partition(format!(
                "{} of {} nodes assigned", covered, network.node_count())));
        }
        if let Some(edge) = cut.cut_edges.iter().find(|edge| {
            !cut.source_side.contains(&edge.from) || !cut.sink_side.contains(&edge.to)
        }) {
            return Err(VerificationError::Partition(format!(
                "cut edge {}->{} does not cross from S to T", edge.from, edge.to)));
        }
        Ok(())
    }

    pub fn check_duality(&self, flow: Flow, cut: &MinCut, tolerance: f64) -> Result<(), VerificationError> {
        let slack = tolerance * (cut.cut_edges.len() + 1) as f64;
        if (flow - cut.capacity).abs() > slack {
            return Err(VerificationError::Duality { flow, cut_capacity: cut.capacity });
        }
        Ok(())
    }

    fn absolute_tolerance(&self, network: &FlowNetwork) -> f64 {
        let scale = network
            .forward_edges()
            .map(|(_, edge)| edge.capacity)
            .fold(1.0, f64::max);
        self.tolerance * scale
    }
}

fn forward_ids(network: &FlowNetwork) -> impl IndexedParallelIterator<Item = EdgeId> {
    (0..network.edge_count()).into_par_iter().map(|k| EdgeId(2 * k))
}

/// Verify with the default tolerance
pub fn verify(network: &FlowNetwork, cut: &MinCut) -> Result<CorrectnessReport, VerificationError> {
    CorrectnessValidator::default().validate(network, cut)
}
