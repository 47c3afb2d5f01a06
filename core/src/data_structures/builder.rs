//! Flow network construction from edge lists
//!
//! All validation happens here, before a network exists: terminal
//! distinctness, node ranges, and capacities. A malformed edge list never
//! reaches a solver.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;

use log::debug;

use crate::algorithm::traits::{Capacity, FlowError, FlowResult, NodeId};
use crate::data_structures::graph::FlowNetwork;

/// Builder for [`FlowNetwork`] instances
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    edges: Vec<(NodeId, NodeId, Capacity)>,
    node_count: Option<usize>,
    merge_parallel_edges: bool,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            edges: Vec::new(),
            node_count: None,
            merge_parallel_edges: true,
        }
    }

    /// Declare the node count instead of inferring it from the edges
    pub fn node_count(mut self, node_count: usize) -> Self {
        self.node_count = Some(node_count);
        self
    }

    /// Sum repeated `(u, v)` edges into one edge (the default) or keep them
    /// as separate edge pairs
    pub fn merge_parallel_edges(mut self, merge: bool) -> Self {
        self.merge_parallel_edges = merge;
        self
    }

    pub fn edge(mut self, from: NodeId, to: NodeId, capacity: Capacity) -> Self {
        self.edges.push((from, to, capacity));
        self
    }

    pub fn edges<I>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, NodeId, Capacity)>,
    {
        self.edges.extend(edges);
        self
    }

    /// Validate the edge list and produce a network ready for solving
    pub fn build(&self, source: NodeId, sink: NodeId) -> FlowResult<FlowNetwork> {
        if source == sink {
            return Err(FlowError::DegenerateGraph { node: source });
        }

        let node_count = self.resolve_node_count(&[source, sink])?;
        let edges = self.validated_edges(node_count)?;

        let mut network = FlowNetwork::new(node_count, source, sink)?;
        for &(from, to, capacity) in &edges {
            network.add_edge(from, to, capacity)?;
        }

        debug!("built flow network: {} nodes, {} edges ({} supplied), source {}, sink {}",
               node_count, network.edge_count(), self.edges.len(), source, sink);
        Ok(network)
    }

    /// Reduce a multi-source / multi-sink problem to a single-terminal one
    ///
    /// A super-source is appended at index `n` and a super-sink at `n + 1`,
    /// where `n` is the node count of the plain graph. Each source receives
    /// an edge from the super-source bounded by its total outgoing capacity,
    /// and each sink an edge to the super-sink bounded by its total incoming
    /// capacity, so the reduction never adds capacity the graph cannot carry.
    pub fn build_multi_terminal(&self, sources: &[NodeId], sinks: &[NodeId]) -> FlowResult<FlowNetwork> {
        if sources.is_empty() || sinks.is_empty() {
            return Err(FlowError::InvalidParameter {
                name: if sources.is_empty() { "sources" } else { "sinks" }.to_string(),
                reason: "at least one terminal is required".to_string(),
            });
        }
        if let Some(&node) = sources.iter().find(|node| sinks.contains(node)) {
            return Err(FlowError::DegenerateGraph { node });
        }

        let terminals: Vec<NodeId> = sources.iter().chain(sinks).copied().collect();
        let node_count = self.resolve_node_count(&terminals)?;
        let edges = self.validated_edges(node_count)?;

        let super_source = node_count;
        let total = node_count.checked_add(2).ok_or(FlowError::InvalidParameter {
            name: "node_count".to_string(),
            reason: format!("no room for super-terminals above {} nodes", node_count),
        })?;
        let super_sink = total - 1;
        let mut out_bound = vec![0.0; node_count];
        let mut in_bound = vec![0.0; node_count];
        for &(from, to, capacity) in &edges {
            if from != to {
                out_bound[from] += capacity;
                in_bound[to] += capacity;
            }
        }

        let mut network = FlowNetwork::new(total, super_source, super_sink)?;
        for &(from, to, capacity) in &edges {
            network.add_edge(from, to, capacity)?;
        }
        let mut seen = vec![false; node_count];
        for &source in sources {
            if !std::mem::replace(&mut seen[source], true) {
                network.add_edge(super_source, source, out_bound[source])?;
            }
        }
        for &sink in sinks {
            if !std::mem::replace(&mut seen[sink], true) {
                network.add_edge(sink, super_sink, in_bound[sink])?;
            }
        }

        debug!("built multi-terminal network: {} sources, {} sinks, super-source {}, super-sink {}",
               sources.len(), sinks.len(), super_source, super_sink);
        Ok(network)
    }

    fn resolve_node_count(&self, terminals: &[NodeId]) -> FlowResult<usize> {
        match self.node_count {
            Some(node_count) => {
                let out_of_range = terminals
                    .iter()
                    .copied()
                    .chain(self.edges.iter().flat_map(|&(from, to, _)| [from, to]))
                    .find(|&node| node >= node_count);
                match out_of_range {
                    Some(node) => Err(FlowError::InvalidNode { node, node_count }),
                    None => Ok(node_count),
                }
            }
            None => {
                let max_node = terminals
                    .iter()
                    .copied()
                    .chain(self.edges.iter().flat_map(|&(from, to, _)| [from, to]))
                    .max()
                    .unwrap_or(0);
                max_node
                    .checked_add(1)
                    .ok_or(FlowError::InvalidNode { node: max_node, node_count: usize::MAX })
            }
        }
    }

    /// Capacity-checked edges, merged per `(u, v)` in first-seen order when
    /// merging is enabled
    fn validated_edges(&self, node_count: usize) -> FlowResult<Vec<(NodeId, NodeId, Capacity)>> {
        let mut merged: Vec<(NodeId, NodeId, Capacity)> = Vec::with_capacity(self.edges.len());
        let mut slots: HashMap<(NodeId, NodeId), usize> = HashMap::new();

        for &(from, to, capacity) in &self.edges {
            if !capacity.is_finite() || capacity < 0.0 {
                return Err(FlowError::InvalidCapacity { from, to, capacity });
            }
            for node in [from, to] {
                if node >= node_count {
                    return Err(FlowError::InvalidNode { node, node_count });
                }
            }

            if !self.merge_parallel_edges {
                merged.push((from, to, capacity));
                continue;
            }
            match slots.get(&(from, to)) {
                Some(&slot) => {
                    let total = merged[slot].2 + capacity;
                    if !total.is_finite() {
                        return Err(FlowError::InvalidCapacity { from, to, capacity: total });
                    }
                    merged[slot].2 = total;
                }
                None => {
                    slots.insert((from, to), merged.len());
                    merged.push((from, to, capacity));
                }
            }
        }

        Ok(merged)
    }
}

/// Build a network straight from `(u, v, capacity)` triples
///
/// Parallel edges are merged; the node count is inferred when `node_count`
/// is `None`.
pub fn from_edge_list(
    edges: &[(NodeId, NodeId, Capacity)],
    source: NodeId,
    sink: NodeId,
    node_count: Option<usize>,
) -> FlowResult<FlowNetwork> {
    let mut builder = GraphBuilder::new().edges(edges.iter().copied());
    if let Some(node_count) = node_count {
        builder = builder.node_count(node_count);
    }
    builder.build(source, sink)
}
