//! Flow algorithms and their configuration
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod traits;
pub mod config;
pub mod graph;

pub use self::traits::*;
pub use self::config::{MaxFlowVariant, SolverConfig};
pub use self::graph::*;
