//! Dependency-graph cascade propagation
//!
//! Withdrawn nodes carry full stress (1.0). Stress flows to every node that
//! requires a stressed node, scaled by the graph's coupling coefficient, via
//! Jacobi relaxation: each pass computes every node's new stress from the
//! previous pass only, so the result does not depend on node order.
//!
//! # Determinism
//!
//! - Node ids indexed in lexicographic order (BTreeMap)
//! - `requires` edges summed in configuration order
//!
//! # Monotonicity
//!
//! Each pass is a monotone map of the previous stress vector, and withdrawn
//! nodes are pinned at the maximum. Passes run until one leaves every node
//! unchanged (a fixed point) or the pass bound is hit. A tolerance-based early
//! exit would let two withdrawn sets stop after different pass counts and
//! break the ordering, so none is used: system functionality is
//! non-increasing in the withdrawn set for any coupling ≥ 0.

use crate::config::{ConfigError, GraphConfig};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
struct GraphNode {
    id: String,
    owner: Option<String>,
    criticality: f64,
    requires: Vec<usize>,
}

/// Static dependency graph of a run
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyGraph {
    node_to_index: BTreeMap<String, usize>,
    nodes: Vec<GraphNode>,
    /// index → nodes that require it
    dependents: Vec<Vec<usize>>,
    coupling: f64,
}

/// Stress vector and functionality after propagation
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeResult {
    pub stress: Vec<f64>,
    pub system_functionality: f64,
    pub passes: usize,
}

impl DependencyGraph {
    /// Upper bound on relaxation passes
    pub const MAX_PASSES: usize = 10;

    /// Criticality above which a node with dependents is on the critical path
    pub const CRITICAL_PATH_THRESHOLD: f64 = 0.7;

    /// Build from configuration, resolving `requires` ids to indices
    pub fn from_config(config: &GraphConfig) -> Result<Self, ConfigError> {
        let mut ids: Vec<&str> = config.nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != config.nodes.len() {
            return Err(ConfigError::Invalid {
                field: "graph.nodes".to_string(),
                reason: "node ids must be unique".to_string(),
            });
        }
        let node_to_index: BTreeMap<String, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.to_string(), i))
            .collect();

        let mut nodes: Vec<Option<GraphNode>> = vec![None; ids.len()];
        for node in &config.nodes {
            let mut requires = Vec::with_capacity(node.requires.len());
            for dep in &node.requires {
                let index = node_to_index.get(dep).copied().ok_or_else(|| {
                    ConfigError::MalformedGraph {
                        node: node.id.clone(),
                        reason: format!("requires unknown node `{}`", dep),
                    }
                })?;
                requires.push(index);
            }
            let index = node_to_index[&node.id];
            nodes[index] = Some(GraphNode {
                id: node.id.clone(),
                owner: node.owner.clone(),
                criticality: node.criticality,
                requires,
            });
        }
        let nodes: Vec<GraphNode> = nodes.into_iter().flatten().collect();

        let mut dependents = vec![Vec::new(); nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            for &dep in &node.requires {
                dependents[dep].push(i);
            }
        }

        Ok(Self {
            node_to_index,
            nodes,
            dependents,
            coupling: config.coupling,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn coupling(&self) -> f64 {
        self.coupling
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.node_to_index.get(id).copied()
    }

    /// Ids of the nodes a given agent owns
    pub fn nodes_owned_by(&self, owner: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.owner.as_deref() == Some(owner))
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Node indices taken down by the given owners' withdrawal
    pub fn withdrawn_nodes<'a>(&self, owners: impl IntoIterator<Item = &'a str>) -> BTreeSet<usize> {
        let owners: BTreeSet<&str> = owners.into_iter().collect();
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.owner.as_deref().is_some_and(|o| owners.contains(o)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Relax stress from the withdrawn set and derive system functionality
    pub fn propagate(&self, withdrawn: &BTreeSet<usize>) -> CascadeResult {
        let n = self.nodes.len();
        let mut stress = vec![0.0; n];
        for &w in withdrawn {
            if w < n {
                stress[w] = 1.0;
            }
        }

        let mut passes = 0;
        while passes < Self::MAX_PASSES {
            passes += 1;
            let mut next = stress.clone();
            let mut changed = false;
            for (i, node) in self.nodes.iter().enumerate() {
                if withdrawn.contains(&i) {
                    continue;
                }
                let incoming: f64 = node
                    .requires
                    .iter()
                    .map(|&d| stress[d] * self.coupling)
                    .sum();
                let value = incoming.min(1.0);
                if value != stress[i] {
                    changed = true;
                }
                next[i] = value;
            }
            stress = next;
            if !changed {
                break;
            }
        }

        let system_functionality = self.functionality_of(&stress);
        CascadeResult {
            stress,
            system_functionality,
            passes,
        }
    }

    /// System functionality with the given node ids withdrawn
    ///
    /// Unknown ids are ignored.
    pub fn functionality(&self, withdrawn_ids: &[&str]) -> f64 {
        let withdrawn: BTreeSet<usize> = withdrawn_ids
            .iter()
            .filter_map(|id| self.node_index(id))
            .collect();
        self.propagate(&withdrawn).system_functionality
    }

    /// Functionality lost by additionally withdrawing `node`, without mutating anything
    pub fn withdrawal_impact(&self, already_withdrawn: &[&str], node: &str) -> f64 {
        let before = self.functionality(already_withdrawn);
        let mut with_node = already_withdrawn.to_vec();
        with_node.push(node);
        before - self.functionality(&with_node)
    }

    /// High-criticality nodes other nodes depend on, in id order
    pub fn critical_path(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, n)| {
                n.criticality > Self::CRITICAL_PATH_THRESHOLD && !self.dependents[*i].is_empty()
            })
            .map(|(_, n)| n.id.as_str())
            .collect()
    }

    fn functionality_of(&self, stress: &[f64]) -> f64 {
        let total: f64 = self.nodes.iter().map(|n| n.criticality).sum();
        if total <= 0.0 {
            return 0.0;
        }
        let healthy: f64 = self
            .nodes
            .iter()
            .zip(stress)
            .map(|(n, s)| n.criticality * (1.0 - s))
            .sum();
        (healthy / total).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;

    fn node(id: &str, criticality: f64, requires: &[&str]) -> NodeConfig {
        NodeConfig {
            id: id.to_string(),
            owner: Some(id.to_string()),
            criticality,
            requires: requires.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_chain_attenuates_by_coupling() {
        let graph = DependencyGraph::from_config(&GraphConfig {
            coupling: 0.5,
            nodes: vec![
                node("power", 1.0, &[]),
                node("habitat", 1.0, &["power"]),
                node("lab", 1.0, &["habitat"]),
            ],
        })
        .unwrap();
        let withdrawn: BTreeSet<usize> = [graph.node_index("power").unwrap()].into();
        let result = graph.propagate(&withdrawn);

        let habitat = graph.node_index("habitat").unwrap();
        let lab = graph.node_index("lab").unwrap();
        assert_eq!(result.stress[habitat], 0.5);
        assert_eq!(result.stress[lab], 0.25);
        // (0 + 0.5 + 0.75) / 3
        assert!((result.system_functionality - 1.25 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_total_criticality_yields_zero() {
        let graph = DependencyGraph::from_config(&GraphConfig {
            coupling: 0.6,
            nodes: vec![node("a", 0.0, &[]), node("b", 0.0, &["a"])],
        })
        .unwrap();
        assert_eq!(graph.functionality(&[]), 0.0);
    }

    #[test]
    fn test_stress_saturates_at_one() {
        let graph = DependencyGraph::from_config(&GraphConfig {
            coupling: 0.9,
            nodes: vec![
                node("a", 1.0, &[]),
                node("b", 1.0, &[]),
                node("c", 1.0, &["a", "b"]),
            ],
        })
        .unwrap();
        let result = graph.propagate(&[0, 1].into());
        assert_eq!(result.stress[2], 1.0);
        assert_eq!(result.system_functionality, 0.0);
    }

    #[test]
    fn test_unknown_requirement_is_malformed() {
        let err = DependencyGraph::from_config(&GraphConfig {
            coupling: 0.6,
            nodes: vec![node("a", 1.0, &["ghost"])],
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::MalformedGraph { .. }));
    }

    #[test]
    fn test_critical_path_requires_dependents() {
        let graph = DependencyGraph::from_config(&GraphConfig {
            coupling: 0.6,
            nodes: vec![
                node("core", 0.9, &[]),
                node("leaf", 0.95, &["core"]),
                node("minor", 0.5, &[]),
            ],
        })
        .unwrap();
        assert_eq!(graph.critical_path(), vec!["core"]);
    }
}
