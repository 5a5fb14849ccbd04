//! Defection probability
//!
//! ```text
//! p = base × (1 − trust)^0.5 × phase_modifier × Π modifiers + volatility × shock_sensitivity
//! ```
//!
//! clamped to the configured probability bounds. Each institutional mechanism
//! that acts on the probability is a [`Modifier`] returning a multiplicative
//! factor; a disabled mechanism is simply absent from the calculator, which is
//! the same as contributing 1.0.

use crate::config::{ConsortiumConfig, Mechanism};
use crate::models::agent::ConsortiumAgent;
use crate::rng::RngManager;

/// Phase modifiers for phases 0..=3; later phases use [`LATE_PHASE_MODIFIER`]
pub const PHASE_MODIFIERS: [f64; 4] = [1.5, 1.2, 0.8, 0.5];
pub const LATE_PHASE_MODIFIER: f64 = 0.3;

/// Sunk cost at which lock-in saturates
pub const SUNK_COST_SATURATION: f64 = 50.0;
/// Escrow balance at which the escrow deterrent saturates
pub const ESCROW_SATURATION: f64 = 5.0;
/// LC balance at which the wealth deterrent saturates
pub const WEALTH_SATURATION: f64 = 500.0;
/// Maximum reduction either deterrent can apply
pub const DETERRENT_WEIGHT: f64 = 0.1;

pub fn phase_modifier(phase: usize) -> f64 {
    PHASE_MODIFIERS
        .get(phase)
        .copied()
        .unwrap_or(LATE_PHASE_MODIFIER)
}

pub fn trust_modifier(trust: f64) -> f64 {
    (1.0 - trust).max(0.0).sqrt()
}

/// A multiplicative factor on the defection probability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// `1 − sensitivity × min(1, sunk / 50)`
    SunkCostLockIn,
    /// `1 − 0.1 × min(1, escrow / 5)`
    EscrowDeterrent,
    /// `1 − 0.1 × min(1, lc / 500)`
    WealthDeterrent,
}

impl Modifier {
    pub fn factor(&self, agent: &ConsortiumAgent) -> f64 {
        match self {
            Modifier::SunkCostLockIn => {
                let ratio = (agent.sunk_cost() / SUNK_COST_SATURATION).min(1.0);
                1.0 - agent.sunk_cost_sensitivity() * ratio
            }
            Modifier::EscrowDeterrent => {
                1.0 - DETERRENT_WEIGHT * (agent.escrow_amount() / ESCROW_SATURATION).min(1.0)
            }
            Modifier::WealthDeterrent => {
                1.0 - DETERRENT_WEIGHT * (agent.lc_balance() / WEALTH_SATURATION).min(1.0)
            }
        }
    }

    /// Mechanism toggle that controls this modifier
    pub fn mechanism(&self) -> Mechanism {
        match self {
            Modifier::SunkCostLockIn => Mechanism::SunkCost,
            Modifier::EscrowDeterrent => Mechanism::Escrow,
            Modifier::WealthDeterrent => Mechanism::Wealth,
        }
    }
}

/// Every term of one agent's defection probability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefectionProbability {
    pub trust_modifier: f64,
    pub phase_modifier: f64,
    pub modifier_product: f64,
    pub shock_term: f64,
    /// Before clamping
    pub raw: f64,
    /// Probability actually sampled against
    pub clamped: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefectionCalculator {
    modifiers: Vec<Modifier>,
    floor: f64,
    ceiling: f64,
}

impl DefectionCalculator {
    pub fn new(modifiers: Vec<Modifier>, floor: f64, ceiling: f64) -> Self {
        Self {
            modifiers,
            floor,
            ceiling,
        }
    }

    /// Calculator with the modifiers of every enabled mechanism
    pub fn from_config(config: &ConsortiumConfig) -> Self {
        let modifiers = [
            Modifier::SunkCostLockIn,
            Modifier::EscrowDeterrent,
            Modifier::WealthDeterrent,
        ]
        .into_iter()
        .filter(|m| config.mechanisms.is_enabled(m.mechanism()))
        .collect();
        Self::new(modifiers, config.probability_floor, config.probability_ceiling)
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Clamp any agent decision probability to the configured bounds
    pub fn clamp(&self, p: f64) -> f64 {
        p.clamp(self.floor, self.ceiling)
    }

    pub fn probability(
        &self,
        agent: &ConsortiumAgent,
        phase: usize,
        volatility: f64,
    ) -> DefectionProbability {
        let trust_modifier = trust_modifier(agent.trust_level());
        let phase_modifier = phase_modifier(phase);
        let modifier_product: f64 = self.modifiers.iter().map(|m| m.factor(agent)).product();
        let shock_term = volatility * agent.shock_sensitivity();
        let raw = agent.base_defection_prob() * trust_modifier * modifier_product * phase_modifier
            + shock_term;
        DefectionProbability {
            trust_modifier,
            phase_modifier,
            modifier_product,
            shock_term,
            raw,
            clamped: self.clamp(raw),
        }
    }

    /// Draw once; `Some(p)` if the agent defects
    pub fn decide(
        &self,
        agent: &ConsortiumAgent,
        phase: usize,
        volatility: f64,
        rng: &mut RngManager,
    ) -> Option<f64> {
        let p = self.probability(agent, phase, volatility).clamped;
        (rng.next_f64() < p).then_some(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::agent::AgentCategory;

    fn all_modifiers() -> DefectionCalculator {
        DefectionCalculator::new(
            vec![
                Modifier::SunkCostLockIn,
                Modifier::EscrowDeterrent,
                Modifier::WealthDeterrent,
            ],
            0.05,
            0.95,
        )
    }

    #[test]
    fn test_phase_modifier_table() {
        assert_eq!(phase_modifier(0), 1.5);
        assert_eq!(phase_modifier(3), 0.5);
        assert_eq!(phase_modifier(4), 0.3);
        assert_eq!(phase_modifier(12), 0.3);
    }

    #[test]
    fn test_fresh_agent_probability() {
        // base 0.25, trust 0.25, phase 0; no sunk cost, escrow or wealth yet
        let agent =
            ConsortiumAgent::new("a".to_string(), AgentCategory::Associate).with_trust(0.25);
        let p = all_modifiers().probability(&agent, 0, 0.0);
        assert_eq!(p.modifier_product, 1.0);
        assert!((p.clamped - 0.25 * 0.75_f64.sqrt() * 1.5).abs() < 1e-12);

        // constructor default trust is 0.5
        let fresh = ConsortiumAgent::new("b".to_string(), AgentCategory::Associate);
        let p = all_modifiers().probability(&fresh, 0, 0.0);
        assert!((p.clamped - 0.25 * 0.5_f64.sqrt() * 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_saturated_modifiers() {
        let mut agent = ConsortiumAgent::new("a".to_string(), AgentCategory::TrackACore);
        agent.invest(100.0, 0.1);
        agent.credit_lc(1000.0);
        let p = all_modifiers().probability(&agent, 0, 0.0);
        // (1 − 0.8) × 0.9 × 0.9
        assert!((p.modifier_product - 0.2 * 0.81).abs() < 1e-12);
    }

    #[test]
    fn test_disabled_modifiers_are_identity() {
        let mut agent = ConsortiumAgent::new("a".to_string(), AgentCategory::TrackACore);
        agent.invest(100.0, 0.1);
        let bare = DefectionCalculator::new(Vec::new(), 0.0, 1.0);
        assert_eq!(bare.probability(&agent, 0, 0.0).modifier_product, 1.0);
    }

    #[test]
    fn test_probability_is_clamped() {
        let agent = ConsortiumAgent::new("a".to_string(), AgentCategory::Private).with_trust(1.0);
        let p = all_modifiers().probability(&agent, 5, 0.0);
        assert_eq!(p.raw, 0.0);
        assert_eq!(p.clamped, 0.05);

        let shaky = ConsortiumAgent::new("b".to_string(), AgentCategory::StrategicTenant)
            .with_trust(0.0)
            .with_base_defection_prob(0.9);
        let p = all_modifiers().probability(&shaky, 0, 1.0);
        assert!(p.raw > 1.0);
        assert_eq!(p.clamped, 0.95);
    }
}
