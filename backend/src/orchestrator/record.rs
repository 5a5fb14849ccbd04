//! Run outputs: per-tick traces and terminal records
//!
//! Records carry a SHA-256 fingerprint of the canonical configuration so
//! results from different processes or machines can be grouped by exact
//! scenario.

use super::SimulationError;
use crate::bilateral::BilateralOutcome;
use crate::consortium::{ConsortiumOutcome, ForfeitureRecord};
use crate::models::{ActionKind, AgentSnapshot, DefectionReason, Event, StateSnapshot};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// Consortium
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectionRecord {
    pub agent_id: String,
    pub tick: usize,
    pub phase: usize,
    pub reason: DefectionReason,
}

/// State after one consortium tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickTrace {
    pub tick: usize,
    pub phase: usize,
    pub political_volatility: f64,
    pub system_functionality: f64,
    pub agents: Vec<AgentSnapshot>,
    pub events: Vec<Event>,
}

/// Terminal record of one consortium run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsortiumRecord {
    pub seed: u64,
    pub config_hash: String,
    pub outcome: ConsortiumOutcome,
    pub final_phase: usize,
    /// Last tick executed
    pub final_tick: usize,
    pub active_agents: usize,
    pub system_functionality: f64,
    pub cascade_triggered: bool,
    pub defections: Vec<DefectionRecord>,
    pub forfeitures: Vec<ForfeitureRecord>,
    pub total_investment: f64,
    pub revenue_generated: f64,
}

impl ConsortiumRecord {
    /// Defections that happened in phases `0..=last_phase`
    pub fn defections_through_phase(&self, last_phase: usize) -> usize {
        self.defections
            .iter()
            .filter(|d| d.phase <= last_phase)
            .count()
    }
}

// ============================================================================
// Bilateral
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub tick: usize,
    pub state_id: String,
    pub sector: String,
    pub action: ActionKind,
    pub from: f64,
    pub to: f64,
    pub net_benefit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BilateralTickTrace {
    pub tick: usize,
    pub friction: f64,
    pub political_volatility: f64,
    pub state_a: StateSnapshot,
    pub state_b: StateSnapshot,
    pub active_third_parties: Vec<String>,
    pub events: Vec<Event>,
}

/// Terminal record of one bilateral run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BilateralRecord {
    pub seed: u64,
    pub config_hash: String,
    pub outcome: BilateralOutcome,
    pub ticks: usize,
    pub final_friction: f64,
    pub peak_friction: f64,
    pub actions: Vec<ActionRecord>,
    pub diversification_a: f64,
    pub diversification_b: f64,
    pub cumulative_gdp_loss_a: f64,
    pub cumulative_gdp_loss_b: f64,
    pub active_third_parties: Vec<String>,
}

impl BilateralRecord {
    /// Committed actions of one state, in tick order
    pub fn actions_by<'a>(&'a self, state_id: &'a str) -> impl Iterator<Item = &'a ActionRecord> {
        self.actions.iter().filter(move |a| a.state_id == state_id)
    }
}

// ============================================================================
// Config fingerprint
// ============================================================================

/// SHA-256 hex digest of the configuration's canonical JSON
///
/// Object keys are sorted recursively, so the digest does not depend on field
/// declaration order or map iteration order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config)
        .map_err(|e| SimulationError::Serialization(format!("config: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| SimulationError::Serialization(format!("config: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsortiumConfig;

    #[test]
    fn test_config_hash_is_stable() {
        let a = compute_config_hash(&ConsortiumConfig::default()).unwrap();
        let b = compute_config_hash(&ConsortiumConfig::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_config_hash_changes_with_parameters() {
        let base = ConsortiumConfig::default();
        let mut changed = base.clone();
        changed.mechanisms.poison_pill.cascade_probability = 0.5;
        assert_ne!(
            compute_config_hash(&base).unwrap(),
            compute_config_hash(&changed).unwrap()
        );
    }
}
