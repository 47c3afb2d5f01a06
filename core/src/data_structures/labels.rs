//! Labeled-node adapter
//!
//! Maps arbitrary hashable node labels onto dense ids in first-seen order,
//! so that callers holding string- or tuple-named graphs can use the solver
//! and read results back in their own vocabulary.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use serde::{Serialize, Deserialize};

use crate::algorithm::config::SolverConfig;
use crate::algorithm::graph::max_flow::{FlowMetrics, MaxFlowSolver};
use crate::algorithm::graph::min_cut::MinCut;
use crate::algorithm::traits::{Capacity, Flow, FlowResult, MaxFlowAlgorithm, NodeId};
use crate::data_structures::builder::GraphBuilder;
use crate::data_structures::graph::FlowNetwork;

/// Edge list keyed by caller-chosen labels
#[derive(Debug, Clone)]
pub struct LabeledGraph<L> {
    ids: HashMap<L, NodeId>,
    labels: Vec<L>,
    edges: Vec<(NodeId, NodeId, Capacity)>,
}

/// Minimum cut expressed in labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledCut<L> {
    pub source_side: Vec<L>,
    pub sink_side: Vec<L>,
    pub cut_edges: Vec<(L, L, Capacity)>,
    pub capacity: Capacity,
}

/// Maximum flow result expressed in labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledFlow<L> {
    pub max_flow: Flow,
    pub min_cut: LabeledCut<L>,
    pub metrics: FlowMetrics,
}

impl<L: Eq + Hash + Clone> Default for LabeledGraph<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Eq + Hash + Clone> LabeledGraph<L> {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            labels: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (L, L, Capacity)>,
    {
        let mut graph = Self::new();
        for (from, to, capacity) in edges {
            graph.add_edge(from, to, capacity);
        }
        graph
    }

    /// Id of `label`, assigning the next free id on first sight
    pub fn add_node(&mut self, label: L) -> NodeId {
        if let Some(&id) = self.ids.get(&label) {
            return id;
        }
        let id = self.labels.len();
        self.ids.insert(label.clone(), id);
        self.labels.push(label);
        id
    }

    pub fn add_edge(&mut self, from: L, to: L, capacity: Capacity) -> &mut Self {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.edges.push((from, to, capacity));
        self
    }

    pub fn id(&self, label: &L) -> Option<NodeId> {
        self.ids.get(label).copied()
    }

    pub fn label(&self, id: NodeId) -> Option<&L> {
        self.labels.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Integer edge list, as consumed by [`GraphBuilder`]
    pub fn edge_list(&self) -> &[(NodeId, NodeId, Capacity)] {
        &self.edges
    }

    /// Build the integer network; terminals never seen on an edge become
    /// isolated nodes
    pub fn build(&mut self, source: L, sink: L) -> FlowResult<FlowNetwork> {
        let source = self.add_node(source);
        let sink = self.add_node(sink);
        GraphBuilder::new()
            .node_count(self.labels.len())
            .edges(self.edges.iter().copied())
            .build(source, sink)
    }

    /// Solve and translate the result back into labels
    pub fn solve(&mut self, source: L, sink: L, config: SolverConfig) -> FlowResult<LabeledFlow<L>> {
        let mut network = self.build(source, sink)?;
        let mut solver = MaxFlowSolver::new(config)?;
        let result = solver.solve_with_cut(&mut network)?;

        Ok(LabeledFlow {
            max_flow: result.max_flow,
            min_cut: self.label_cut(&result.min_cut),
            metrics: solver.metrics().clone(),
        })
    }

    pub fn label_cut(&self, cut: &MinCut) -> LabeledCut<L> {
        let relabel = |ids: &BTreeSet<NodeId>| -> Vec<L> {
            ids.iter().filter_map(|&id| self.labels.get(id).cloned()).collect()
        };

        LabeledCut {
            source_side: relabel(&cut.source_side),
            sink_side: relabel(&cut.sink_side),
            cut_edges: cut
                .cut_edges
                .iter()
                .filter_map(|edge| {
                    Some((self.labels.get(edge.from)?.clone(),
                          self.labels.get(edge.to)?.clone(),
                          edge.capacity))
                })
                .collect(),
            capacity: cut.capacity,
        }
    }
}
