//! Third parties
//!
//! A third party joins once bilateral friction reaches its intervention
//! threshold and stays involved for the rest of the run. An active party
//! supplies alternatives to the side it leans toward and may mediate.

use crate::config::{Side, ThirdPartyConfig};
use crate::rng::RngManager;

/// Upper bound on the combined alternative supply one side can receive
pub const SUPPORT_CAP: f64 = 0.9;

#[derive(Debug, Clone, PartialEq)]
pub struct ThirdParty {
    config: ThirdPartyConfig,
    active: bool,
}

impl ThirdParty {
    pub fn new(config: ThirdPartyConfig) -> Self {
        Self {
            config,
            active: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn coordination_bonus(&self) -> f64 {
        self.config.coordination_bonus
    }

    pub fn mediation_effectiveness(&self) -> f64 {
        self.config.mediation_effectiveness
    }

    /// Side the party leans toward; `None` when perfectly neutral
    pub fn favors(&self) -> Option<Side> {
        if self.config.alignment_with_a > 0.0 {
            Some(Side::A)
        } else if self.config.alignment_with_a < 0.0 {
            Some(Side::B)
        } else {
            None
        }
    }

    /// Activate if friction has reached the threshold; `true` on first activation
    pub fn observe(&mut self, friction: f64) -> bool {
        if self.active || friction < self.config.intervention_threshold {
            return false;
        }
        self.active = true;
        true
    }

    /// Alternative supply this party gives `side`
    pub fn support_for(&self, side: Side) -> f64 {
        if self.active && self.favors() == Some(side) {
            self.config.alternative_supply_capacity * self.config.alignment_with_a.abs()
        } else {
            0.0
        }
    }

    /// Neutral parties mediate more credibly
    pub fn mediation_probability(&self) -> f64 {
        self.config.mediation_effectiveness * (1.0 - self.config.alignment_with_a.abs())
    }

    /// One mediation attempt; draws only for active parties that can mediate
    pub fn attempt_mediation(&self, rng: &mut RngManager) -> bool {
        self.active
            && self.config.mediation_effectiveness > 0.0
            && rng.bernoulli(self.mediation_probability())
    }
}

/// Combined support for `side`, capped at [`SUPPORT_CAP`]
pub fn total_support(parties: &[ThirdParty], side: Side) -> f64 {
    parties
        .iter()
        .map(|p| p.support_for(side))
        .sum::<f64>()
        .min(SUPPORT_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(alignment: f64, capacity: f64) -> ThirdParty {
        ThirdParty::new(ThirdPartyConfig {
            id: "eu".to_string(),
            alignment_with_a: alignment,
            intervention_threshold: 0.3,
            alternative_supply_capacity: capacity,
            mediation_effectiveness: 0.5,
            coordination_bonus: 0.1,
        })
    }

    #[test]
    fn test_activation_is_sticky() {
        let mut p = party(0.5, 0.4);
        assert!(!p.observe(0.2));
        assert!(p.observe(0.3));
        assert!(!p.observe(0.9));
        assert!(p.is_active());
        p.observe(0.0);
        assert!(p.is_active());
    }

    #[test]
    fn test_support_goes_to_favored_side() {
        let mut p = party(-0.5, 0.4);
        p.observe(1.0);
        assert_eq!(p.support_for(Side::A), 0.0);
        assert_eq!(p.support_for(Side::B), 0.2);
    }

    #[test]
    fn test_support_is_capped() {
        let mut parties = vec![party(1.0, 1.0), party(1.0, 1.0)];
        for p in parties.iter_mut() {
            p.observe(1.0);
        }
        assert_eq!(total_support(&parties, Side::A), SUPPORT_CAP);
    }

    #[test]
    fn test_inactive_party_does_not_draw() {
        let p = party(0.0, 0.4);
        let mut rng = RngManager::new(4);
        let before = rng.get_state();
        assert!(!p.attempt_mediation(&mut rng));
        assert_eq!(rng.get_state(), before);
    }
}
