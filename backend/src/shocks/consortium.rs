use super::ShockProcess;
use crate::config::ConsortiumShockConfig;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsortiumShockKind {
    Election,
    EconomicCrisis,
    TechnicalFailure,
    Sanctions,
    Geopolitical,
}

impl ConsortiumShockKind {
    pub const ALL: [ConsortiumShockKind; 5] = [
        ConsortiumShockKind::Election,
        ConsortiumShockKind::EconomicCrisis,
        ConsortiumShockKind::TechnicalFailure,
        ConsortiumShockKind::Sanctions,
        ConsortiumShockKind::Geopolitical,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConsortiumShockKind::Election => "election",
            ConsortiumShockKind::EconomicCrisis => "economic_crisis",
            ConsortiumShockKind::TechnicalFailure => "technical_failure",
            ConsortiumShockKind::Sanctions => "sanctions",
            ConsortiumShockKind::Geopolitical => "geopolitical",
        }
    }

    /// Political volatility added per unit of intensity
    pub fn volatility_weight(&self) -> f64 {
        match self {
            ConsortiumShockKind::Geopolitical | ConsortiumShockKind::Sanctions => 0.3,
            ConsortiumShockKind::EconomicCrisis => 0.2,
            ConsortiumShockKind::Election | ConsortiumShockKind::TechnicalFailure => 0.1,
        }
    }

    /// Whether the shock lands on a single agent rather than the whole system
    pub fn is_targeted(&self) -> bool {
        matches!(
            self,
            ConsortiumShockKind::Election
                | ConsortiumShockKind::EconomicCrisis
                | ConsortiumShockKind::Sanctions
        )
    }

    fn probability(&self, config: &ConsortiumShockConfig) -> f64 {
        match self {
            ConsortiumShockKind::Election => config.election,
            ConsortiumShockKind::EconomicCrisis => config.economic_crisis,
            ConsortiumShockKind::TechnicalFailure => config.technical_failure,
            ConsortiumShockKind::Sanctions => config.sanctions,
            ConsortiumShockKind::Geopolitical => config.geopolitical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsortiumShock {
    pub kind: ConsortiumShockKind,
    pub intensity: f64,
}

/// Independent per-kind Bernoulli shocks with uniform intensity
#[derive(Debug, Clone)]
pub struct IidConsortiumShocks {
    config: ConsortiumShockConfig,
}

impl IidConsortiumShocks {
    pub fn new(config: ConsortiumShockConfig) -> Self {
        Self { config }
    }
}

impl ShockProcess for IidConsortiumShocks {
    type Shock = ConsortiumShock;

    fn sample(&mut self, _tick: usize, rng: &mut RngManager) -> Vec<ConsortiumShock> {
        if !self.config.enabled {
            return Vec::new();
        }
        let mut shocks = Vec::new();
        for kind in ConsortiumShockKind::ALL {
            if rng.bernoulli(kind.probability(&self.config)) {
                let intensity = rng.uniform(self.config.intensity_min, self.config.intensity_max);
                shocks.push(ConsortiumShock { kind, intensity });
            }
        }
        shocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_process_draws_nothing() {
        let mut process = IidConsortiumShocks::new(ConsortiumShockConfig {
            enabled: false,
            ..ConsortiumShockConfig::default()
        });
        let mut rng = RngManager::new(3);
        let before = rng.get_state();
        assert!(process.sample(0, &mut rng).is_empty());
        assert_eq!(rng.get_state(), before);
    }

    #[test]
    fn test_certain_shocks_fire_in_order() {
        let mut process = IidConsortiumShocks::new(ConsortiumShockConfig {
            election: 1.0,
            economic_crisis: 1.0,
            technical_failure: 1.0,
            sanctions: 1.0,
            geopolitical: 1.0,
            ..ConsortiumShockConfig::default()
        });
        let mut rng = RngManager::new(3);
        let kinds: Vec<_> = process.sample(0, &mut rng).iter().map(|s| s.kind).collect();
        assert_eq!(kinds, ConsortiumShockKind::ALL.to_vec());
    }
}
