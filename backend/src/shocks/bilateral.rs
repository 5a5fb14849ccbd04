use super::ShockProcess;
use crate::config::BilateralShockConfig;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BilateralShock {
    TerritorialIncident,
    MilitaryExercise,
    Election,
    Recession,
    CommoditySpike,
}

/// Deterministic adjustment applied to both states
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShockEffect {
    pub nationalism: f64,
    pub approval: f64,
    pub volatility: f64,
}

impl BilateralShock {
    pub const ALL: [BilateralShock; 5] = [
        BilateralShock::TerritorialIncident,
        BilateralShock::MilitaryExercise,
        BilateralShock::Election,
        BilateralShock::Recession,
        BilateralShock::CommoditySpike,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BilateralShock::TerritorialIncident => "territorial_incident",
            BilateralShock::MilitaryExercise => "military_exercise",
            BilateralShock::Election => "election",
            BilateralShock::Recession => "recession",
            BilateralShock::CommoditySpike => "commodity_spike",
        }
    }

    pub fn effect(&self) -> ShockEffect {
        let (nationalism, approval, volatility) = match self {
            BilateralShock::TerritorialIncident => (0.10, 0.0, 0.15),
            BilateralShock::MilitaryExercise => (0.05, 0.0, 0.10),
            BilateralShock::Election => (0.05, -0.05, 0.0),
            BilateralShock::Recession => (0.0, -0.10, 0.05),
            BilateralShock::CommoditySpike => (0.0, -0.03, 0.10),
        };
        ShockEffect {
            nationalism,
            approval,
            volatility,
        }
    }

    fn probability(&self, config: &BilateralShockConfig) -> f64 {
        match self {
            BilateralShock::TerritorialIncident => config.territorial_incident,
            BilateralShock::MilitaryExercise => config.military_exercise,
            BilateralShock::Election => config.election,
            BilateralShock::Recession => config.recession,
            BilateralShock::CommoditySpike => config.commodity_spike,
        }
    }
}

/// Independent per-kind Bernoulli events with fixed probabilities
#[derive(Debug, Clone)]
pub struct IidBilateralShocks {
    config: BilateralShockConfig,
}

impl IidBilateralShocks {
    pub fn new(config: BilateralShockConfig) -> Self {
        Self { config }
    }
}

impl ShockProcess for IidBilateralShocks {
    type Shock = BilateralShock;

    fn sample(&mut self, _tick: usize, rng: &mut RngManager) -> Vec<BilateralShock> {
        if !self.config.enabled {
            return Vec::new();
        }
        BilateralShock::ALL
            .into_iter()
            .filter(|shock| rng.bernoulli(shock.probability(&self.config)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_territorial_incident_is_most_inflammatory() {
        let effect = BilateralShock::TerritorialIncident.effect();
        assert!(BilateralShock::ALL
            .iter()
            .all(|s| s.effect().nationalism <= effect.nationalism));
    }

    #[test]
    fn test_zero_probability_never_fires() {
        let mut process = IidBilateralShocks::new(BilateralShockConfig {
            territorial_incident: 0.0,
            military_exercise: 0.0,
            election: 0.0,
            recession: 0.0,
            commodity_spike: 0.0,
            ..BilateralShockConfig::default()
        });
        let mut rng = RngManager::new(9);
        for tick in 0..100 {
            assert!(process.sample(tick, &mut rng).is_empty());
        }
    }
}
