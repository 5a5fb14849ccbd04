//! Consortium participant model
//!
//! Each agent belongs to one [`AgentCategory`]; the category supplies default
//! behavioral parameters from a fixed table, and explicit scenario overrides
//! may replace any of them. Agents are never removed mid-run: a defected agent
//! stays in the roster as an inactive record.
//!
//! Lifecycle invariant: `defected ⇒ !active`. The engine re-checks it every
//! tick through [`ConsortiumAgent::check_invariants`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during agent operations
#[derive(Debug, Error, PartialEq)]
pub enum AgentError {
    #[error("agent {id} has already left the consortium")]
    AlreadyWithdrawn { id: String },

    #[error("agent {id} has inconsistent lifecycle flags: active={active}, defected={defected}")]
    InconsistentLifecycle {
        id: String,
        active: bool,
        defected: bool,
    },

    #[error("agent {id} has negative {field}: {value}")]
    NegativeStock {
        id: String,
        field: &'static str,
        value: f64,
    },
}

/// Participant categories
///
/// Adding a category means adding a variant and a row in [`AgentCategory::profile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCategory {
    TrackACore,
    TrackBCore,
    Associate,
    StrategicTenant,
    Private,
}

/// Default parameter bundle of a category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryProfile {
    pub base_defection_prob: f64,
    pub sunk_cost_sensitivity: f64,
    pub shock_sensitivity: f64,
    pub domestic_veto_risk: f64,
    /// First phase at which a domestic veto can remove the agent
    pub min_veto_phase: Option<usize>,
}

impl AgentCategory {
    pub const ALL: [AgentCategory; 5] = [
        AgentCategory::TrackACore,
        AgentCategory::TrackBCore,
        AgentCategory::Associate,
        AgentCategory::StrategicTenant,
        AgentCategory::Private,
    ];

    pub fn profile(&self) -> CategoryProfile {
        match self {
            AgentCategory::TrackACore => CategoryProfile {
                base_defection_prob: 0.35,
                sunk_cost_sensitivity: 0.8,
                shock_sensitivity: 0.30,
                domestic_veto_risk: 0.40,
                min_veto_phase: Some(3),
            },
            AgentCategory::TrackBCore => CategoryProfile {
                base_defection_prob: 0.45,
                sunk_cost_sensitivity: 0.6,
                shock_sensitivity: 0.25,
                domestic_veto_risk: 0.20,
                min_veto_phase: Some(4),
            },
            AgentCategory::Associate => CategoryProfile {
                base_defection_prob: 0.25,
                sunk_cost_sensitivity: 0.4,
                shock_sensitivity: 0.35,
                domestic_veto_risk: 0.30,
                min_veto_phase: Some(3),
            },
            AgentCategory::StrategicTenant => CategoryProfile {
                base_defection_prob: 0.15,
                sunk_cost_sensitivity: 0.2,
                shock_sensitivity: 0.40,
                domestic_veto_risk: 0.50,
                min_veto_phase: Some(2),
            },
            AgentCategory::Private => CategoryProfile {
                base_defection_prob: 0.10,
                sunk_cost_sensitivity: 0.1,
                shock_sensitivity: 0.20,
                domestic_veto_risk: 0.0,
                min_veto_phase: None,
            },
        }
    }
}

/// Why an agent left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectionReason {
    CalculatedDefection,
    DomesticVeto,
}

impl DefectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefectionReason::CalculatedDefection => "calculated_defection",
            DefectionReason::DomesticVeto => "domestic_veto",
        }
    }
}

/// A consortium participant
///
/// # Example
/// ```
/// use cooperation_simulator_core_rs::models::{AgentCategory, ConsortiumAgent, DefectionReason};
///
/// let mut agent = ConsortiumAgent::new("agent_0".to_string(), AgentCategory::Associate);
/// agent.invest(2.5, 0.2);
/// assert_eq!(agent.escrow_amount(), 0.5);
///
/// agent.defect(3, 0, DefectionReason::CalculatedDefection).unwrap();
/// assert!(!agent.is_active());
/// assert_eq!(agent.defection_phase(), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsortiumAgent {
    id: String,
    category: AgentCategory,
    base_defection_prob: f64,
    sunk_cost_sensitivity: f64,
    shock_sensitivity: f64,
    domestic_veto_risk: f64,
    min_veto_phase: Option<usize>,

    trust_level: f64,
    committed_capital: f64,
    sunk_cost: f64,
    escrow_amount: f64,
    lc_balance: f64,
    domestic_stability: f64,

    active: bool,
    defected: bool,
    defection_phase: Option<usize>,
    defection_tick: Option<usize>,
    defection_reason: Option<DefectionReason>,
}

impl ConsortiumAgent {
    /// New active agent with its category's default parameters
    pub fn new(id: String, category: AgentCategory) -> Self {
        let profile = category.profile();
        Self {
            id,
            category,
            base_defection_prob: profile.base_defection_prob,
            sunk_cost_sensitivity: profile.sunk_cost_sensitivity,
            shock_sensitivity: profile.shock_sensitivity,
            domestic_veto_risk: profile.domestic_veto_risk,
            min_veto_phase: profile.min_veto_phase,
            trust_level: 0.5,
            committed_capital: 0.0,
            sunk_cost: 0.0,
            escrow_amount: 0.0,
            lc_balance: 0.0,
            domestic_stability: 1.0,
            active: true,
            defected: false,
            defection_phase: None,
            defection_tick: None,
            defection_reason: None,
        }
    }

    pub fn with_trust(mut self, trust: f64) -> Self {
        self.trust_level = trust.clamp(0.0, 1.0);
        self
    }

    pub fn with_domestic_stability(mut self, stability: f64) -> Self {
        self.domestic_stability = stability.clamp(0.0, 1.0);
        self
    }

    pub fn with_base_defection_prob(mut self, p: f64) -> Self {
        self.base_defection_prob = p;
        self
    }

    pub fn with_sunk_cost_sensitivity(mut self, s: f64) -> Self {
        self.sunk_cost_sensitivity = s;
        self
    }

    pub fn with_shock_sensitivity(mut self, s: f64) -> Self {
        self.shock_sensitivity = s;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> AgentCategory {
        self.category
    }

    pub fn base_defection_prob(&self) -> f64 {
        self.base_defection_prob
    }

    pub fn sunk_cost_sensitivity(&self) -> f64 {
        self.sunk_cost_sensitivity
    }

    pub fn shock_sensitivity(&self) -> f64 {
        self.shock_sensitivity
    }

    pub fn domestic_veto_risk(&self) -> f64 {
        self.domestic_veto_risk
    }

    /// Whether a domestic veto can remove this agent during `phase`
    pub fn veto_exposed(&self, phase: usize) -> bool {
        self.min_veto_phase.is_some_and(|min| phase >= min)
    }

    pub fn trust_level(&self) -> f64 {
        self.trust_level
    }

    pub fn committed_capital(&self) -> f64 {
        self.committed_capital
    }

    pub fn sunk_cost(&self) -> f64 {
        self.sunk_cost
    }

    pub fn escrow_amount(&self) -> f64 {
        self.escrow_amount
    }

    pub fn lc_balance(&self) -> f64 {
        self.lc_balance
    }

    pub fn domestic_stability(&self) -> f64 {
        self.domestic_stability
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_defected(&self) -> bool {
        self.defected
    }

    pub fn defection_phase(&self) -> Option<usize> {
        self.defection_phase
    }

    pub fn defection_tick(&self) -> Option<usize> {
        self.defection_tick
    }

    pub fn defection_reason(&self) -> Option<DefectionReason> {
        self.defection_reason
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Commit capital for one tick, placing `escrow_share` of it in escrow
    pub fn invest(&mut self, amount: f64, escrow_share: f64) {
        self.committed_capital += amount;
        self.sunk_cost += amount;
        self.escrow_amount += amount * escrow_share;
    }

    /// Shift trust, clamped to [0, 1]
    pub fn adjust_trust(&mut self, delta: f64) {
        self.trust_level = (self.trust_level + delta).clamp(0.0, 1.0);
    }

    /// Shift domestic stability, clamped to [0, 1]
    pub fn adjust_stability(&mut self, delta: f64) {
        self.domestic_stability = (self.domestic_stability + delta).clamp(0.0, 1.0);
    }

    pub fn credit_escrow(&mut self, amount: f64) {
        self.escrow_amount += amount;
    }

    pub fn credit_lc(&mut self, amount: f64) {
        self.lc_balance += amount;
    }

    /// Remove and return the whole escrow balance
    pub fn take_escrow(&mut self) -> f64 {
        std::mem::take(&mut self.escrow_amount)
    }

    /// Leave the consortium
    ///
    /// # Errors
    /// Returns [`AgentError::AlreadyWithdrawn`] if the agent is no longer active.
    pub fn defect(
        &mut self,
        tick: usize,
        phase: usize,
        reason: DefectionReason,
    ) -> Result<(), AgentError> {
        if !self.active {
            return Err(AgentError::AlreadyWithdrawn {
                id: self.id.clone(),
            });
        }
        self.active = false;
        self.defected = true;
        self.defection_phase = Some(phase);
        self.defection_tick = Some(tick);
        self.defection_reason = Some(reason);
        Ok(())
    }

    /// Verify lifecycle flags and non-negative stocks
    pub fn check_invariants(&self) -> Result<(), AgentError> {
        if self.active == self.defected {
            return Err(AgentError::InconsistentLifecycle {
                id: self.id.clone(),
                active: self.active,
                defected: self.defected,
            });
        }
        let stocks = [
            ("committed_capital", self.committed_capital),
            ("sunk_cost", self.sunk_cost),
            ("escrow_amount", self.escrow_amount),
            ("lc_balance", self.lc_balance),
        ];
        for (field, value) in stocks {
            if value < 0.0 {
                return Err(AgentError::NegativeStock {
                    id: self.id.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id.clone(),
            active: self.active,
            trust_level: self.trust_level,
            committed_capital: self.committed_capital,
            sunk_cost: self.sunk_cost,
            escrow_amount: self.escrow_amount,
            lc_balance: self.lc_balance,
            domestic_stability: self.domestic_stability,
        }
    }
}

/// Agent state as recorded in a tick trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: String,
    pub active: bool,
    pub trust_level: f64,
    pub committed_capital: f64,
    pub sunk_cost: f64,
    pub escrow_amount: f64,
    pub lc_balance: f64,
    pub domestic_stability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defect_twice_is_rejected() {
        let mut agent = ConsortiumAgent::new("a".to_string(), AgentCategory::Private);
        agent
            .defect(0, 0, DefectionReason::DomesticVeto)
            .unwrap();
        assert_eq!(
            agent.defect(1, 0, DefectionReason::CalculatedDefection),
            Err(AgentError::AlreadyWithdrawn {
                id: "a".to_string()
            })
        );
    }

    #[test]
    fn test_trust_is_clamped() {
        let mut agent = ConsortiumAgent::new("a".to_string(), AgentCategory::Associate).with_trust(0.98);
        agent.adjust_trust(0.05);
        assert_eq!(agent.trust_level(), 1.0);
        agent.adjust_trust(-3.0);
        assert_eq!(agent.trust_level(), 0.0);
    }

    #[test]
    fn test_private_agents_are_never_veto_exposed() {
        let agent = ConsortiumAgent::new("p".to_string(), AgentCategory::Private);
        assert!(!agent.veto_exposed(100));
        let tenant = ConsortiumAgent::new("t".to_string(), AgentCategory::StrategicTenant);
        assert!(!tenant.veto_exposed(1));
        assert!(tenant.veto_exposed(2));
    }

    #[test]
    fn test_take_escrow_empties_balance() {
        let mut agent = ConsortiumAgent::new("a".to_string(), AgentCategory::TrackACore);
        agent.invest(10.0, 0.2);
        assert_eq!(agent.take_escrow(), 2.0);
        assert_eq!(agent.escrow_amount(), 0.0);
        assert_eq!(agent.committed_capital(), 10.0);
    }
}
