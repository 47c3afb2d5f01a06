//! Maximum flow strategies and minimum cut extraction
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod max_flow;
pub mod push_relabel;
pub mod min_cut;

pub use self::max_flow::{EdmondsKarp, FlowMetrics, MaxFlowResult, MaxFlowSolver};
pub use self::push_relabel::PushRelabel;
pub use self::min_cut::{CutEdge, MinCut, MinCutExtractor};
