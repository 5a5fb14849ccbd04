//! Consortium simulation state
//!
//! Holds the participant roster and the run-wide global quantities.
//!
//! # Critical Invariants
//!
//! 1. **Stable roster**: agents are never removed; order is creation order
//! 2. **Monotone phase**: `current_phase` never decreases
//! 3. **Bounded shares**: `system_functionality` and `political_volatility` stay in [0, 1]

use crate::models::agent::{AgentError, ConsortiumAgent};
use serde::{Deserialize, Serialize};

/// Run-wide quantities shared by every phase of a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsortiumGlobalState {
    pub current_phase: usize,
    pub total_investment: f64,
    pub system_functionality: f64,
    pub political_volatility: f64,
    pub isru_operational: bool,
    pub revenue_generated: f64,
}

impl ConsortiumGlobalState {
    pub fn new(initial_volatility: f64) -> Self {
        Self {
            current_phase: 0,
            total_investment: 0.0,
            system_functionality: 1.0,
            political_volatility: initial_volatility.clamp(0.0, 1.0),
            isru_operational: false,
            revenue_generated: 0.0,
        }
    }

    /// Move to `phase`; earlier phases are ignored
    pub fn advance_phase(&mut self, phase: usize) {
        self.current_phase = self.current_phase.max(phase);
    }
}

/// Complete consortium state
///
/// # Example
///
/// ```rust
/// use cooperation_simulator_core_rs::models::{AgentCategory, ConsortiumAgent, ConsortiumState};
///
/// let state = ConsortiumState::new(
///     vec![
///         ConsortiumAgent::new("agent_0".to_string(), AgentCategory::TrackACore),
///         ConsortiumAgent::new("agent_1".to_string(), AgentCategory::Associate),
///     ],
///     0.0,
/// );
/// assert_eq!(state.num_agents(), 2);
/// assert_eq!(state.active_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsortiumState {
    agents: Vec<ConsortiumAgent>,
    pub global: ConsortiumGlobalState,
}

impl ConsortiumState {
    pub fn new(agents: Vec<ConsortiumAgent>, initial_volatility: f64) -> Self {
        Self {
            agents,
            global: ConsortiumGlobalState::new(initial_volatility),
        }
    }

    pub fn agents(&self) -> &[ConsortiumAgent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [ConsortiumAgent] {
        &mut self.agents
    }

    pub fn get_agent(&self, id: &str) -> Option<&ConsortiumAgent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn active_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_active()).count()
    }

    /// Indices of active agents, in roster order
    pub fn active_indices(&self) -> Vec<usize> {
        self.agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_active())
            .map(|(i, _)| i)
            .collect()
    }

    /// Ids of agents that have left
    pub fn withdrawn_ids(&self) -> Vec<&str> {
        self.agents
            .iter()
            .filter(|a| !a.is_active())
            .map(|a| a.id())
            .collect()
    }

    /// Check every agent's lifecycle invariants
    pub fn check_invariants(&self) -> Result<(), AgentError> {
        self.agents.iter().try_for_each(|a| a.check_invariants())
    }
}
