//! Dependency graph cascade tests
//!
//! Critical invariant: system functionality never increases when the
//! withdrawn set grows.

use cooperation_simulator_core_rs::config::{GraphConfig, NodeConfig};
use cooperation_simulator_core_rs::consortium::DependencyGraph;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn node(id: &str, criticality: f64, requires: &[&str]) -> NodeConfig {
    NodeConfig {
        id: id.to_string(),
        owner: None,
        criticality,
        requires: requires.iter().map(|r| r.to_string()).collect(),
    }
}

fn graph(coupling: f64, nodes: Vec<NodeConfig>) -> DependencyGraph {
    DependencyGraph::from_config(&GraphConfig { coupling, nodes }).unwrap()
}

/// Cyclic graph where a loose convergence tolerance would break monotonicity
fn feedback_graph() -> DependencyGraph {
    graph(
        1.0 / 3.0,
        vec![
            node("w1", 1.0, &[]),
            node("w2", 1.0, &[]),
            node("w3", 1.0, &[]),
            node("y", 1.0, &["w1", "w2", "w3"]),
            node("a", 1.0, &["y", "b", "w1"]),
            node("b", 1.0, &["a"]),
        ],
    )
}

#[test]
fn test_no_withdrawals_full_functionality() {
    let g = feedback_graph();
    assert_eq!(g.functionality(&[]), 1.0);
}

#[test]
fn test_feedback_graph_is_monotone() {
    let g = feedback_graph();
    let without_y = g.functionality(&["w1", "w2", "w3"]);
    let with_y = g.functionality(&["w1", "w2", "w3", "y"]);
    assert!(with_y <= without_y, "{} > {}", with_y, without_y);

    let impact = g.withdrawal_impact(&["w1", "w2", "w3"], "y");
    assert!(impact >= 0.0);
}

#[test]
fn test_relaxation_stops_at_fixed_point_or_cap() {
    let g = feedback_graph();
    let idx: BTreeSet<usize> = ["w1"].iter().filter_map(|id| g.node_index(id)).collect();
    let result = g.propagate(&idx);
    assert!(result.passes <= DependencyGraph::MAX_PASSES);
    assert!(result.stress.iter().all(|s| (0.0..=1.0).contains(s)));
    assert_eq!(result.stress[g.node_index("w1").unwrap()], 1.0);
}

#[test]
fn test_withdrawn_nodes_follow_owner() {
    let g = DependencyGraph::from_config(&GraphConfig {
        coupling: 0.6,
        nodes: vec![
            NodeConfig {
                id: "habitat".to_string(),
                owner: Some("agent_0".to_string()),
                criticality: 1.0,
                requires: Vec::new(),
            },
            NodeConfig {
                id: "isru".to_string(),
                owner: Some("agent_1".to_string()),
                criticality: 0.8,
                requires: vec!["habitat".to_string()],
            },
        ],
    })
    .unwrap();
    let withdrawn = g.withdrawn_nodes(["agent_0"]);
    assert_eq!(withdrawn.len(), 1);
    assert!(withdrawn.contains(&g.node_index("habitat").unwrap()));
    assert_eq!(g.nodes_owned_by("agent_1"), vec!["isru"]);
}

// ============================================================================
// Property: monotonicity over random graphs
// ============================================================================

/// Random graph of `n` nodes plus two nested withdrawn sets `small ⊆ large`
fn graph_and_sets() -> impl Strategy<Value = (f64, Vec<(f64, Vec<usize>)>, Vec<bool>, Vec<bool>)> {
    (2usize..10).prop_flat_map(|n| {
        (
            0.0f64..1.5,
            prop::collection::vec(
                (0.0f64..1.0, prop::collection::vec(0..n, 0..4)),
                n,
            ),
            prop::collection::vec(any::<bool>(), n),
            prop::collection::vec(any::<bool>(), n),
        )
    })
}

proptest! {
    #[test]
    fn prop_functionality_monotone((coupling, layout, small, extra) in graph_and_sets()) {
        let n = layout.len();
        let nodes: Vec<NodeConfig> = layout
            .iter()
            .enumerate()
            .map(|(i, (crit, deps))| {
                let requires: BTreeSet<String> = deps
                    .iter()
                    .filter(|&&d| d != i)
                    .map(|d| format!("n{}", d))
                    .collect();
                NodeConfig {
                    id: format!("n{}", i),
                    owner: None,
                    criticality: *crit,
                    requires: requires.into_iter().collect(),
                }
            })
            .collect();
        let g = graph(coupling, nodes);

        let index = |i: usize| g.node_index(&format!("n{}", i)).unwrap();
        let small_set: BTreeSet<usize> = (0..n).filter(|&i| small[i]).map(index).collect();
        let large_set: BTreeSet<usize> =
            (0..n).filter(|&i| small[i] || extra[i]).map(index).collect();

        let f_small = g.propagate(&small_set).system_functionality;
        let f_large = g.propagate(&large_set).system_functionality;
        prop_assert!(f_large <= f_small + 1e-12, "{} > {}", f_large, f_small);
        prop_assert!((0.0..=1.0).contains(&f_large));
    }
}
