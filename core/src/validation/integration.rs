//! End-to-end scenarios: build, solve with both strategies, extract the cut
//! and verify the result.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeSet;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algorithm::config::{MaxFlowVariant, SolverConfig};
use crate::algorithm::graph::max_flow::{MaxFlowResult, MaxFlowSolver};
use crate::algorithm::graph::min_cut::{extract_cut, MinCutExtractor};
use crate::algorithm::traits::{Capacity, FlowError, NodeId};
use crate::data_structures::builder::{from_edge_list, GraphBuilder};
use crate::data_structures::graph::FlowNetwork;
use crate::validation::correctness::verify;
use crate::{max_flow_min_cut, max_flow_min_cut_with};

const VARIANTS: [MaxFlowVariant; 2] = [MaxFlowVariant::EdmondsKarp, MaxFlowVariant::PushRelabel];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn solve(
    edges: &[(NodeId, NodeId, Capacity)],
    source: NodeId,
    sink: NodeId,
    variant: MaxFlowVariant,
) -> (FlowNetwork, MaxFlowResult) {
    let mut network = from_edge_list(edges, source, sink, None).unwrap();
    let result = MaxFlowSolver::with_variant(variant)
        .solve_with_cut(&mut network)
        .unwrap();
    verify(&network, &result.min_cut).unwrap();
    (network, result)
}

/// x=0, a=1, b=2, c=3, d=4, e=5, y=6
const REFERENCE: [(NodeId, NodeId, Capacity); 8] = [
    (0, 1, 3.0),
    (0, 2, 1.0),
    (1, 3, 3.0),
    (2, 3, 5.0),
    (2, 4, 4.0),
    (4, 5, 2.0),
    (3, 6, 2.0),
    (5, 6, 3.0),
];

#[test]
fn test_reference_scenario() {
    init_logging();
    for variant in VARIANTS {
        let (_, result) = solve(&REFERENCE, 0, 6, variant);

        assert_eq!(result.max_flow, 3.0);
        assert_eq!(result.min_cut.source_side, BTreeSet::from([0, 1, 3]));
        assert_eq!(result.min_cut.sink_side, BTreeSet::from([2, 4, 5, 6]));
        assert_eq!(result.min_cut.edge_triples(), vec![(0, 2, 1.0), (3, 6, 2.0)]);
        assert_eq!(result.min_cut.capacity, result.max_flow);
    }
}

#[test]
fn test_reference_scenario_edge_flows() {
    let (network, _) = solve(&REFERENCE, 0, 6, MaxFlowVariant::EdmondsKarp);

    let rendered = network.to_string();
    assert_eq!(rendered.lines().count(), REFERENCE.len());
    assert!(rendered.starts_with("0 1 {'capacity': 3, 'flow': 2}\n"));
    assert!(rendered.contains("0 2 {'capacity': 1, 'flow': 1}\n"));
    assert!(rendered.contains("3 6 {'capacity': 2, 'flow': 2}\n"));
}

#[test]
fn test_parallel_edges_act_as_one() {
    for variant in VARIANTS {
        let (network, result) = solve(&[(0, 1, 2.0), (0, 1, 3.0)], 0, 1, variant);

        assert_eq!(result.max_flow, 5.0);
        assert_eq!(network.edge_count(), 1);
        assert_eq!(result.min_cut.edge_triples(), vec![(0, 1, 5.0)]);
    }
}

#[test]
fn test_unmerged_parallel_edges_share_the_flow() {
    let mut network = GraphBuilder::new()
        .merge_parallel_edges(false)
        .edge(0, 1, 2.0)
        .edge(0, 1, 3.0)
        .build(0, 1)
        .unwrap();

    let result = MaxFlowSolver::default().solve_with_cut(&mut network).unwrap();

    assert_eq!(network.edge_count(), 2);
    assert_eq!(result.max_flow, 5.0);
    assert_eq!(result.min_cut.edge_triples(), vec![(0, 1, 2.0), (0, 1, 3.0)]);
}

#[test]
fn test_disconnected_sink() {
    let edges = [(0, 1, 4.0), (1, 2, 4.0), (3, 4, 7.0)];
    for variant in VARIANTS {
        let (_, result) = solve(&edges, 0, 4, variant);

        assert_eq!(result.max_flow, 0.0);
        assert_eq!(result.min_cut.source_side, BTreeSet::from([0, 1, 2]));
        assert!(result.min_cut.cut_edges.is_empty());
    }
}

#[test]
fn test_no_edges() {
    for variant in VARIANTS {
        let result = max_flow_min_cut_with(&[], 0, 1, None, SolverConfig::default().with_variant(variant))
            .unwrap();

        assert_eq!(result.max_flow, 0.0);
        assert_eq!(result.min_cut.source_side, BTreeSet::from([0]));
        assert_eq!(result.min_cut.sink_side, BTreeSet::from([1]));
        assert!(result.min_cut.cut_edges.is_empty());
    }
}

#[test]
fn test_invalid_input_is_rejected_before_solving() {
    assert_eq!(max_flow_min_cut(&[(0, 1, 1.0)], 2, 2, None).unwrap_err(),
               FlowError::DegenerateGraph { node: 2 });
    assert!(matches!(max_flow_min_cut(&[(0, 1, -1.0)], 0, 1, None),
                     Err(FlowError::InvalidCapacity { .. })));
    assert!(matches!(max_flow_min_cut(&[(0, 5, 1.0)], 0, 1, Some(3)),
                     Err(FlowError::InvalidNode { node: 5, node_count: 3 })));
}

#[test]
fn test_cut_extraction_is_idempotent() {
    let (network, result) = solve(&REFERENCE, 0, 6, MaxFlowVariant::PushRelabel);

    assert_eq!(extract_cut(&network).unwrap(), result.min_cut);
    assert_eq!(extract_cut(&network).unwrap(), extract_cut(&network).unwrap());
}

#[test]
fn test_multi_terminal_supplies_add_up() {
    // two disjoint source/sink corridors
    let builder = GraphBuilder::new()
        .edge(0, 1, 3.0)
        .edge(1, 2, 2.0)
        .edge(3, 4, 4.0)
        .edge(4, 5, 5.0);

    let mut network = builder.build_multi_terminal(&[0, 3], &[2, 5]).unwrap();
    let result = MaxFlowSolver::with_variant(MaxFlowVariant::PushRelabel)
        .solve_with_cut(&mut network)
        .unwrap();

    assert_eq!(result.max_flow, 2.0 + 4.0);
    verify(&network, &result.min_cut).unwrap();
}

fn random_edges(rng: &mut StdRng, node_count: usize, edge_count: usize) -> Vec<(NodeId, NodeId, Capacity)> {
    (0..edge_count)
        .map(|_| {
            let from = rng.gen_range(0..node_count);
            let to = rng.gen_range(0..node_count);
            (from, to, rng.gen_range(0..20) as Capacity)
        })
        .collect()
}

#[test]
fn test_strategies_agree_on_random_graphs() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for round in 0..40 {
        let node_count = rng.gen_range(2..25);
        let edge_count = rng.gen_range(0..80);
        let edges = random_edges(&mut rng, node_count, edge_count);
        let sink = rng.gen_range(1..node_count);

        let (ek_network, ek) = solve(&edges, 0, sink, MaxFlowVariant::EdmondsKarp);
        let (pr_network, pr) = solve(&edges, 0, sink, MaxFlowVariant::PushRelabel);

        assert_eq!(ek.max_flow, pr.max_flow, "round {}", round);
        assert_eq!(ek.min_cut.capacity, ek.max_flow, "round {}", round);
        assert_eq!(pr.min_cut.capacity, pr.max_flow, "round {}", round);
        // the set reachable from the source is the same for every maximum flow
        assert_eq!(ek.min_cut.source_side, pr.min_cut.source_side, "round {}", round);

        let extractor = MinCutExtractor::default();
        let ek_sink_side = extractor.extract_sink_side_cut(&ek_network).unwrap();
        let pr_sink_side = extractor.extract_sink_side_cut(&pr_network).unwrap();
        assert_eq!(ek_sink_side.source_side, pr_sink_side.source_side, "round {}", round);
        assert_eq!(ek_sink_side.capacity, ek.max_flow, "round {}", round);
    }
}

#[test]
fn test_fractional_random_graphs() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
        let node_count = rng.gen_range(2..15);
        let edges: Vec<_> = (0..rng.gen_range(1..40))
            .map(|_| (rng.gen_range(0..node_count), rng.gen_range(0..node_count), rng.gen::<f64>()))
            .collect();

        let (_, ek) = solve(&edges, 0, node_count - 1, MaxFlowVariant::EdmondsKarp);
        let (_, pr) = solve(&edges, 0, node_count - 1, MaxFlowVariant::PushRelabel);

        assert_relative_eq!(ek.max_flow, pr.max_flow, epsilon = 1e-9);
        assert_relative_eq!(ek.min_cut.capacity, ek.max_flow, epsilon = 1e-9);
    }
}

#[test]
fn test_small_capacities_with_scaled_epsilon() {
    let mut rng = StdRng::seed_from_u64(11);
    let config = SolverConfig { epsilon: 1e-15, ..SolverConfig::default() };

    for round in 0..30 {
        let node_count = rng.gen_range(2..15);
        let edges: Vec<_> = (0..rng.gen_range(1..40))
            .map(|_| (rng.gen_range(0..node_count), rng.gen_range(0..node_count), 1e-6 * rng.gen::<f64>()))
            .collect();
        let sink = node_count - 1;

        let ek = max_flow_min_cut_with(&edges, 0, sink, None, config.clone()).unwrap();
        let pr = max_flow_min_cut_with(&edges, 0, sink, None,
                                       config.clone().with_variant(MaxFlowVariant::PushRelabel)).unwrap();

        assert_relative_eq!(ek.max_flow, pr.max_flow, epsilon = 1e-18, max_relative = 1e-9);
        assert_relative_eq!(ek.min_cut.capacity, ek.max_flow, epsilon = 1e-18, max_relative = 1e-9);
        assert_eq!(ek.min_cut.source_side, pr.min_cut.source_side, "round {}", round);
    }
}

#[test]
fn test_result_serializes() {
    let result = max_flow_min_cut(&REFERENCE, 0, 6, Some(7)).unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let decoded: MaxFlowResult = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded.max_flow, 3.0);
    assert_eq!(decoded.min_cut, result.min_cut);
    assert_eq!(decoded.variant, MaxFlowVariant::EdmondsKarp);
}
