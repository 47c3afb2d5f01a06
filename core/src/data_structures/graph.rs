//! Residual flow network with arena-indexed edge storage
//!
//! Nodes are dense integer indices and edges live in one flat arena. Every
//! caller-supplied edge `u → v` is stored at an even slot `2k` and its reverse
//! `v → u` (capacity zero) at `2k + 1`, so the paired edge of any handle is a
//! single XOR away and no back-pointers are needed.
//!
//! # Invariants
//! For every forward/reverse pair:
//! `residual(fwd) + residual(rev) == capacity(fwd) + capacity(rev)`
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;

use log::trace;
use serde::{Serialize, Deserialize};

use crate::algorithm::traits::{Capacity, EdgeId, Flow, FlowError, FlowResult, NodeId};

/// Flow edge representation with residual capacity tracking
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowEdge {
    /// Tail vertex
    pub from: NodeId,
    /// Head vertex
    pub to: NodeId,
    /// Original edge capacity (zero for reverse edges)
    pub capacity: Capacity,
    /// Remaining capacity available for additional flow
    residual: Capacity,
}

impl FlowEdge {
    fn new(from: NodeId, to: NodeId, capacity: Capacity) -> Self {
        Self {
            from,
            to,
            capacity,
            residual: capacity,
        }
    }

    /// Current residual capacity
    #[inline]
    pub fn residual(&self) -> Capacity {
        self.residual
    }

    /// Flow currently carried, `capacity - residual`
    ///
    /// Negative on reverse edges, which carry the cancellation of their
    /// forward partner.
    #[inline]
    pub fn flow(&self) -> Flow {
        self.capacity - self.residual
    }
}

/// Whether the residual graph currently holds a converged maximum flow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Residuals have not been driven to a maximum flow
    Unsolved,
    /// A solver ran to completion and found this flow value, treating
    /// residuals at or below `epsilon` as saturated
    Solved { flow: Flow, epsilon: f64 },
}

/// Flow network representation with residual graph
///
/// Serialized as a [`NetworkRecord`]; deserializing rebuilds the network
/// through [`FlowNetwork::new`] and [`FlowNetwork::add_edge`], so documents
/// get the same validation as the builder. The solve status is not part of
/// the record and a deserialized network always starts out unsolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "NetworkRecord", try_from = "NetworkRecord")]
pub struct FlowNetwork {
    /// Number of vertices in network
    node_count: usize,
    /// Designated source vertex
    source: NodeId,
    /// Designated sink vertex
    sink: NodeId,
    /// Outgoing edge handles per vertex in insertion order
    adjacency: Vec<Vec<EdgeId>>,
    /// All edges in the network, forward/reverse pairs adjacent
    edges: Vec<FlowEdge>,
    status: SolveStatus,
}

impl FlowNetwork {
    /// Create an empty network over `node_count` vertices
    ///
    /// Fails if either terminal is out of range or both terminals coincide.
    pub fn new(node_count: usize, source: NodeId, sink: NodeId) -> FlowResult<Self> {
        for node in [source, sink] {
            if node >= node_count {
                return Err(FlowError::InvalidNode { node, node_count });
            }
        }
        if source == sink {
            return Err(FlowError::DegenerateGraph { node: source });
        }

        Ok(Self {
            node_count,
            source,
            sink,
            adjacency: vec![Vec::new(); node_count],
            edges: Vec::new(),
            status: SolveStatus::Unsolved,
        })
    }

    /// Add edge `from → to` together with its zero-capacity reverse edge
    ///
    /// Returns the handle of the forward edge.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, capacity: Capacity) -> FlowResult<EdgeId> {
        self.check_node(from)?;
        self.check_node(to)?;
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(FlowError::InvalidCapacity { from, to, capacity });
        }

        let forward = EdgeId(self.edges.len());
        let reverse = forward.pair();

        self.edges.push(FlowEdge::new(from, to, capacity));
        self.edges.push(FlowEdge::new(to, from, 0.0));
        self.adjacency[from].push(forward);
        self.adjacency[to].push(reverse);
        self.status = SolveStatus::Unsolved;

        Ok(forward)
    }

    /// Outgoing edge handles of `node`, forward and reverse, in insertion order
    ///
    /// Yields nothing for a node outside the network.
    pub fn edges_from(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.adjacency.get(node).into_iter().flatten().copied()
    }

    /// Move `amount` units of residual capacity from `edge` to its pair
    pub fn push(&mut self, edge: EdgeId, amount: Flow) -> FlowResult<()> {
        let residual = self.edges[edge.0].residual;
        // NaN fails both comparisons and is rejected here as well
        if !(amount >= 0.0 && amount <= residual) {
            return Err(FlowError::CapacityExceeded { edge, requested: amount, residual });
        }

        self.edges[edge.0].residual -= amount;
        self.edges[edge.pair().0].residual += amount;
        self.status = SolveStatus::Unsolved;

        trace!("push {} units over {} ({} -> {})", amount, edge,
               self.edges[edge.0].from, self.edges[edge.0].to);
        Ok(())
    }

    /// Restore every residual to its capacity
    pub fn reset_flows(&mut self) {
        for edge in &mut self.edges {
            edge.residual = edge.capacity;
        }
        self.status = SolveStatus::Unsolved;
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of caller-supplied (forward) edges
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    #[inline]
    pub fn source(&self) -> NodeId {
        self.source
    }

    #[inline]
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    #[inline]
    pub fn edge(&self, edge: EdgeId) -> &FlowEdge {
        &self.edges[edge.0]
    }

    #[inline]
    pub fn residual(&self, edge: EdgeId) -> Capacity {
        self.edges[edge.0].residual
    }

    /// Flow on a forward edge
    #[inline]
    pub fn flow(&self, edge: EdgeId) -> Flow {
        self.edges[edge.0].flow()
    }

    /// Forward edges with their handles, in insertion order
    pub fn forward_edges(&self) -> impl Iterator<Item = (EdgeId, &FlowEdge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .step_by(2)
            .map(|(index, edge)| (EdgeId(index), edge))
    }

    /// First forward edge `from → to`, if any
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.edges_from(from)
            .find(|&id| id.is_forward() && self.edges[id.0].to == to)
    }

    /// Flow leaving `node` minus flow entering it
    pub fn net_outflow(&self, node: NodeId) -> Flow {
        self.edges_from(node)
            .map(|id| {
                if id.is_forward() {
                    self.flow(id)
                } else {
                    -self.flow(id.pair())
                }
            })
            .sum()
    }

    #[inline]
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Maximum flow value, once a solver has converged
    pub fn flow_value(&self) -> Option<Flow> {
        match self.status {
            SolveStatus::Solved { flow, .. } => Some(flow),
            SolveStatus::Unsolved => None,
        }
    }

    /// Saturation threshold the last successful solve ran with
    pub fn solve_epsilon(&self) -> Option<f64> {
        match self.status {
            SolveStatus::Solved { epsilon, .. } => Some(epsilon),
            SolveStatus::Unsolved => None,
        }
    }

    #[inline]
    pub(crate) fn out_edges(&self, node: NodeId) -> &[EdgeId] {
        &self.adjacency[node]
    }

    pub(crate) fn mark_solved(&mut self, flow: Flow, epsilon: f64) {
        self.status = SolveStatus::Solved { flow, epsilon };
    }

    fn check_node(&self, node: NodeId) -> FlowResult<()> {
        if node < self.node_count {
            Ok(())
        } else {
            Err(FlowError::InvalidNode { node, node_count: self.node_count })
        }
    }
}

/// Serialized form of a [`FlowNetwork`]: terminals plus forward edges with
/// the flow they carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub node_count: usize,
    pub source: NodeId,
    pub sink: NodeId,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: NodeId,
    pub to: NodeId,
    pub capacity: Capacity,
    #[serde(default)]
    pub flow: Flow,
}

impl From<FlowNetwork> for NetworkRecord {
    fn from(network: FlowNetwork) -> Self {
        let edges = network
            .forward_edges()
            .map(|(_, edge)| EdgeRecord {
                from: edge.from,
                to: edge.to,
                capacity: edge.capacity,
                flow: edge.flow(),
            })
            .collect();

        NetworkRecord {
            node_count: network.node_count,
            source: network.source,
            sink: network.sink,
            edges,
        }
    }
}

impl TryFrom<NetworkRecord> for FlowNetwork {
    type Error = FlowError;

    /// Edge flows must lie in `[0, capacity]` and conserve at every inner
    /// node, within `1e-9` of the largest capacity
    fn try_from(record: NetworkRecord) -> FlowResult<Self> {
        let mut network = FlowNetwork::new(record.node_count, record.source, record.sink)?;
        for edge in &record.edges {
            let id = network.add_edge(edge.from, edge.to, edge.capacity)?;
            if edge.flow != 0.0 {
                network.push(id, edge.flow)?;
            }
        }

        let tolerance = 1e-9 * record.edges.iter().map(|edge| edge.capacity).fold(1.0, f64::max);
        let (source, sink) = (network.source, network.sink);
        if let Some((node, imbalance)) = (0..network.node_count)
            .filter(|&node| node != source && node != sink)
            .map(|node| (node, network.net_outflow(node)))
            .find(|(_, imbalance)| imbalance.abs() > tolerance)
        {
            return Err(FlowError::InfeasibleFlow { node, imbalance });
        }

        network.status = SolveStatus::Unsolved;
        Ok(network)
    }
}

/// Edge list in the NetworkX text format, one forward edge per line
impl fmt::Display for FlowNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, edge) in self.forward_edges() {
            writeln!(f, "{} {} {{'capacity': {}, 'flow': {}}}",
                     edge.from, edge.to, edge.capacity, edge.flow())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> FlowNetwork {
        let mut network = FlowNetwork::new(4, 0, 3).unwrap();
        network.add_edge(0, 1, 10.0).unwrap();
        network.add_edge(1, 2, 5.0).unwrap();
        network.add_edge(2, 3, 8.0).unwrap();
        network
    }

    #[test]
    fn test_flow_network_creation() {
        let network = diamond();

        assert_eq!(network.node_count(), 4);
        assert_eq!(network.edge_count(), 3);
        assert_eq!(network.edges.len(), 6); // 3 forward + 3 reverse edges
        assert_eq!(network.status(), SolveStatus::Unsolved);
    }

    #[test]
    fn test_reverse_edges_are_paired() {
        let network = diamond();
        let forward = network.find_edge(1, 2).unwrap();
        let reverse = network.edge(forward.pair());

        assert_eq!((reverse.from, reverse.to), (2, 1));
        assert_eq!(reverse.capacity, 0.0);
        assert_eq!(reverse.residual(), 0.0);
        assert_eq!(network.residual(forward), 5.0);
    }

    #[test]
    fn test_edges_from_is_restartable_and_ordered() {
        let network = diamond();
        let first: Vec<_> = network.edges_from(1).collect();
        let second: Vec<_> = network.edges_from(1).collect();

        // reverse of 0->1 was inserted before 1->2
        assert_eq!(first, vec![EdgeId(1), EdgeId(2)]);
        assert_eq!(first, second);
        assert_eq!(network.edges_from(99).count(), 0);
    }

    #[test]
    fn test_push_moves_residual_to_pair() {
        let mut network = diamond();
        let edge = network.find_edge(0, 1).unwrap();

        network.push(edge, 4.0).unwrap();

        assert_eq!(network.residual(edge), 6.0);
        assert_eq!(network.residual(edge.pair()), 4.0);
        assert_eq!(network.flow(edge), 4.0);
        assert_eq!(network.net_outflow(0), 4.0);
        assert_eq!(network.net_outflow(1), -4.0);
    }

    #[test]
    fn test_push_beyond_residual_fails() {
        let mut network = diamond();
        let edge = network.find_edge(1, 2).unwrap();

        let err = network.push(edge, 5.5).unwrap_err();
        assert!(matches!(err, FlowError::CapacityExceeded { requested, residual, .. }
                         if requested == 5.5 && residual == 5.0));
        assert!(network.push(edge, -1.0).is_err());
        assert!(network.push(edge, f64::NAN).is_err());
        assert_eq!(network.residual(edge), 5.0);
    }

    #[test]
    fn test_invalid_nodes_and_capacities() {
        let mut network = diamond();

        assert_eq!(network.add_edge(0, 4, 1.0),
                   Err(FlowError::InvalidNode { node: 4, node_count: 4 }));
        assert!(matches!(network.add_edge(0, 1, -2.0),
                         Err(FlowError::InvalidCapacity { .. })));
        assert!(matches!(network.add_edge(0, 1, f64::INFINITY),
                         Err(FlowError::InvalidCapacity { .. })));
        assert_eq!(FlowNetwork::new(3, 1, 1).unwrap_err(),
                   FlowError::DegenerateGraph { node: 1 });
        assert!(FlowNetwork::new(3, 0, 3).is_err());
    }

    #[test]
    fn test_reset_restores_capacities() {
        let mut network = diamond();
        let edge = network.find_edge(2, 3).unwrap();
        network.push(edge, 8.0).unwrap();
        network.mark_solved(8.0, 1e-9);

        network.reset_flows();

        assert_eq!(network.residual(edge), 8.0);
        assert_eq!(network.residual(edge.pair()), 0.0);
        assert_eq!(network.flow_value(), None);
    }

    #[test]
    fn test_display_uses_edge_list_format() {
        let mut network = FlowNetwork::new(2, 0, 1).unwrap();
        let edge = network.add_edge(0, 1, 2.5).unwrap();
        network.push(edge, 1.0).unwrap();

        assert_eq!(network.to_string(), "0 1 {'capacity': 2.5, 'flow': 1}\n");
    }

    #[test]
    fn test_serde_round_trip_keeps_flows_but_not_status() {
        let mut network = diamond();
        for (from, to) in [(0, 1), (1, 2), (2, 3)] {
            network.push(network.find_edge(from, to).unwrap(), 5.0).unwrap();
        }
        network.mark_solved(5.0, 1e-9);

        let json = serde_json::to_string(&network).unwrap();
        let decoded: FlowNetwork = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.to_string(), network.to_string());
        assert_eq!(decoded.edges.len(), 6);
        assert_eq!(decoded.adjacency, network.adjacency);
        assert_eq!(decoded.status(), SolveStatus::Unsolved);
    }

    #[test]
    fn test_deserialization_validates_documents() {
        let decode = |json: &str| serde_json::from_str::<FlowNetwork>(json);

        // source == sink
        assert!(decode(r#"{"node_count": 2, "source": 1, "sink": 1, "edges": []}"#).is_err());
        // negative capacity
        assert!(decode(r#"{"node_count": 2, "source": 0, "sink": 1,
                           "edges": [{"from": 0, "to": 1, "capacity": -5.0}]}"#).is_err());
        // edge outside the node range
        assert!(decode(r#"{"node_count": 2, "source": 0, "sink": 1,
                           "edges": [{"from": 0, "to": 7, "capacity": 1.0}]}"#).is_err());
        // flow beyond capacity
        assert!(decode(r#"{"node_count": 2, "source": 0, "sink": 1,
                           "edges": [{"from": 0, "to": 1, "capacity": 1.0, "flow": 2.0}]}"#).is_err());
        // flow piling up at node 1
        let err = decode(r#"{"node_count": 3, "source": 0, "sink": 2,
                             "edges": [{"from": 0, "to": 1, "capacity": 1.0, "flow": 1.0},
                                       {"from": 1, "to": 2, "capacity": 1.0}]}"#).unwrap_err();
        assert!(err.to_string().contains("node 1"));

        let network = decode(r#"{"node_count": 3, "source": 0, "sink": 2,
                                 "edges": [{"from": 0, "to": 1, "capacity": 4.0}]}"#).unwrap();
        assert_eq!(network.edge_count(), 1);
        assert_eq!(network.residual(EdgeId(0)), 4.0);
    }

    #[test]
    fn test_solve_epsilon_is_recorded() {
        let mut network = diamond();
        assert_eq!(network.solve_epsilon(), None);

        network.mark_solved(0.0, 0.25);
        assert_eq!(network.solve_epsilon(), Some(0.25));
        assert_eq!(network.flow_value(), Some(0.0));
    }
}
