//! Residual graph storage and construction
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod graph;
pub mod builder;
pub mod labels;

pub use self::graph::{EdgeRecord, FlowEdge, FlowNetwork, NetworkRecord, SolveStatus};
pub use self::builder::{from_edge_list, GraphBuilder};
pub use self::labels::{LabeledCut, LabeledFlow, LabeledGraph};
