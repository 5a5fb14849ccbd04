//! Graduated action selection
//!
//! Every sector yields up to two candidates for the acting state: one step of
//! escalation and one step of de-escalation. All candidates are scored on the
//! same `benefit − cost` scale and only the single best one can be committed.
//! Escalating a fresh sector and easing an existing restriction therefore
//! compete directly, which tilts states toward opening new fronts over
//! unwinding old ones.

use super::pain::TradeProfile;
use crate::config::DecisionParams;
use crate::models::{ActionKind, StateAgent};
use crate::rng::RngManager;

/// Escalation benefit multiplier when pain exceeds the escalation threshold
pub const PAIN_ESCALATION_BOOST: f64 = 1.3;
/// De-escalation benefit multiplier when pain exceeds the de-escalation threshold
pub const PAIN_RELIEF_BOOST: f64 = 1.5;
/// Steps smaller than this are not worth taking
const MIN_STEP: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub sector: String,
    pub action: ActionKind,
    pub from: f64,
    pub to: f64,
    pub benefit: f64,
    pub cost: f64,
}

impl Candidate {
    pub fn net_benefit(&self) -> f64 {
        self.benefit - self.cost
    }
}

/// Everything one state's decision reads, all taken from the tick-start snapshot
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub me: &'a StateAgent,
    pub opponent: &'a StateAgent,
    pub my_profile: &'a TradeProfile,
    pub opponent_profile: &'a TradeProfile,
    pub params: &'a DecisionParams,
    pub volatility: f64,
    /// Total de-escalation pressure on `me`
    pub pressure: f64,
    /// Mediation benefit landed this tick
    pub mediation: f64,
}

/// Committed action together with the perturbed score that cleared the threshold
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub candidate: Candidate,
    pub perturbed_net: f64,
}

pub fn candidates(ctx: &DecisionContext) -> Vec<Candidate> {
    let me = ctx.me;
    let opp = ctx.opponent;
    let params = ctx.params;
    let pain = me.last_pain();
    let mut out = Vec::new();

    for sector in ctx.my_profile.sectors() {
        let name = sector.name.as_str();
        let current = me.restriction(name);

        let step = params.intensity_step.min(1.0 - current);
        if step > MIN_STEP {
            let vulnerability = ctx.opponent_profile.sector(name).map_or(0.0, |o| {
                o.import_share * o.terms.criticality * (1.0 - opp.diversification(name))
            });
            let mut benefit = (me.coercion_hope() * vulnerability
                + me.proactive_nationalism() * me.nationalism()
                + me.retaliation_propensity() * opp.restriction(name)
                + ctx.volatility * params.volatility_weight)
                * step;
            if pain > me.escalation_threshold() {
                benefit *= PAIN_ESCALATION_BOOST;
            }
            let cost = (sector.terms.self_harm * sector.export_share
                + opp.retaliation_propensity() * params.retaliation_fear
                + params.reputation_cost)
                * step;
            out.push(Candidate {
                sector: name.to_string(),
                action: ActionKind::Escalate,
                from: current,
                to: current + step,
                benefit,
                cost,
            });
        }

        let step = params.intensity_step.min(current);
        if step > MIN_STEP {
            let mut benefit = (params.pain_relief_weight * pain + params.relationship_value) * step;
            if pain > me.de_escalation_threshold() {
                benefit *= PAIN_RELIEF_BOOST;
            }
            benefit += (ctx.mediation + ctx.pressure) * step;
            let cost = (me.regime().audience_cost_base() * me.nationalism() + me.weakness_signal())
                * step;
            out.push(Candidate {
                sector: name.to_string(),
                action: ActionKind::Deescalate,
                from: current,
                to: current - step,
                benefit,
                cost,
            });
        }
    }
    out
}

/// Highest net benefit; the first candidate wins ties
pub fn best_candidate(ctx: &DecisionContext) -> Option<Candidate> {
    candidates(ctx).into_iter().fold(None, |best, c| match best {
        Some(b) if b.net_benefit() >= c.net_benefit() => Some(b),
        _ => Some(c),
    })
}

/// Choose this tick's action, if any
///
/// A state under cooldown, or with nothing to do, consumes no randomness.
pub fn decide(ctx: &DecisionContext, rng: &mut RngManager) -> Option<Decision> {
    if !ctx.me.can_act() {
        return None;
    }
    let candidate = best_candidate(ctx)?;
    let noise = ctx.params.noise;
    let perturbed_net = candidate.net_benefit() * (1.0 + rng.uniform(-noise, noise));
    (perturbed_net > ctx.params.action_threshold).then_some(Decision {
        candidate,
        perturbed_net,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RegimeType, SectorDependency, Side, StateConfig};
    use std::collections::BTreeMap;

    fn sectors() -> Vec<SectorDependency> {
        ["rare_earths", "soybeans"]
            .iter()
            .map(|name| SectorDependency {
                name: name.to_string(),
                a_exports_to_b: 10.0,
                b_exports_to_a: 10.0,
                a_substitution_time: 12.0,
                b_substitution_time: 12.0,
                a_substitution_cost: 0.2,
                b_substitution_cost: 0.2,
                a_criticality: 0.5,
                b_criticality: 0.5,
                a_restriction_self_harm: 0.1,
                b_restriction_self_harm: 0.1,
            })
            .collect()
    }

    fn state(id: &str, nationalism: f64) -> StateConfig {
        StateConfig {
            id: id.to_string(),
            name: id.to_string(),
            gdp: 1000.0,
            regime: RegimeType::Democracy,
            nationalism,
            approval: 0.5,
            escalation_threshold: 0.9,
            de_escalation_threshold: 0.9,
            retaliation_propensity: 0.0,
            coercion_hope: 0.2,
            weakness_signal: 0.5,
            proactive_nationalism: 1.0,
            action_cooldown: 2,
            initial_restrictions: BTreeMap::new(),
        }
    }

    #[test]
    fn test_escalation_score() {
        let sectors = sectors();
        let a = StateAgent::from_config(&state("a", 0.75), Side::A, &sectors);
        let b = StateAgent::from_config(&state("b", 0.5), Side::B, &sectors);
        let (pa, pb) = (
            TradeProfile::new(&sectors, Side::A),
            TradeProfile::new(&sectors, Side::B),
        );
        let params = DecisionParams::default();
        let ctx = DecisionContext {
            me: &a,
            opponent: &b,
            my_profile: &pa,
            opponent_profile: &pb,
            params: &params,
            volatility: 0.0,
            pressure: 0.0,
            mediation: 0.0,
        };
        let all = candidates(&ctx);
        // nothing restricted yet: escalation only
        assert_eq!(all.len(), 2);
        let best = best_candidate(&ctx).unwrap();
        assert_eq!(best.sector, "rare_earths");
        // (0.2 × 0.25 + 0.75) × 0.2
        assert!((best.benefit - 0.16).abs() < 1e-12);
        // (0.1 × 0.5 + 0 + 0.1) × 0.2
        assert!((best.cost - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_cooldown_blocks_without_drawing() {
        let sectors = sectors();
        let mut a = StateAgent::from_config(&state("a", 0.75), Side::A, &sectors);
        a.start_cooldown();
        let b = StateAgent::from_config(&state("b", 0.5), Side::B, &sectors);
        let (pa, pb) = (
            TradeProfile::new(&sectors, Side::A),
            TradeProfile::new(&sectors, Side::B),
        );
        let params = DecisionParams::default();
        let ctx = DecisionContext {
            me: &a,
            opponent: &b,
            my_profile: &pa,
            opponent_profile: &pb,
            params: &params,
            volatility: 0.0,
            pressure: 0.0,
            mediation: 0.0,
        };
        let mut rng = RngManager::new(8);
        let before = rng.get_state();
        assert!(decide(&ctx, &mut rng).is_none());
        assert_eq!(rng.get_state(), before);
    }

    #[test]
    fn test_deescalation_candidate_for_restricted_sector() {
        let sectors = sectors();
        let mut a = StateAgent::from_config(&state("a", 0.5), Side::A, &sectors);
        a.set_restriction("soybeans", 0.1, 0);
        let b = StateAgent::from_config(&state("b", 0.5), Side::B, &sectors);
        let (pa, pb) = (
            TradeProfile::new(&sectors, Side::A),
            TradeProfile::new(&sectors, Side::B),
        );
        let params = DecisionParams::default();
        let ctx = DecisionContext {
            me: &a,
            opponent: &b,
            my_profile: &pa,
            opponent_profile: &pb,
            params: &params,
            volatility: 0.0,
            pressure: 0.0,
            mediation: 0.0,
        };
        let ease = candidates(&ctx)
            .into_iter()
            .find(|c| c.action == ActionKind::Deescalate)
            .unwrap();
        assert_eq!(ease.from, 0.1);
        assert_eq!(ease.to, 0.0);
        // (1.0 × 0.5 + 0.5) × 0.1
        assert!((ease.cost - 0.1).abs() < 1e-12);
    }
}
