//! Terminal classification of a bilateral run

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BilateralOutcome {
    Normalization,
    EscalationSpiral,
    GradualDecoupling,
    StableInterdependence,
    AsymmetricLockIn,
    ManagedCompetition,
}

/// Final-tick quantities the classifier reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalPosition {
    pub friction: f64,
    pub peak_friction: f64,
    pub restriction_a: f64,
    pub restriction_b: f64,
    pub diversification_a: f64,
    pub diversification_b: f64,
}

impl BilateralOutcome {
    pub const ALL: [BilateralOutcome; 6] = [
        BilateralOutcome::Normalization,
        BilateralOutcome::EscalationSpiral,
        BilateralOutcome::GradualDecoupling,
        BilateralOutcome::StableInterdependence,
        BilateralOutcome::AsymmetricLockIn,
        BilateralOutcome::ManagedCompetition,
    ];

    /// First matching rule wins
    pub fn classify(p: &FinalPosition) -> Self {
        if p.friction < 0.10
            && p.peak_friction > 0.4
            && p.diversification_a < 0.4
            && p.diversification_b < 0.4
        {
            BilateralOutcome::Normalization
        } else if p.friction > 0.75 {
            BilateralOutcome::EscalationSpiral
        } else if p.diversification_a > 0.5 || p.diversification_b > 0.5 {
            BilateralOutcome::GradualDecoupling
        } else if p.friction < 0.20 {
            BilateralOutcome::StableInterdependence
        } else if (p.restriction_a - p.restriction_b).abs() > 0.3 {
            BilateralOutcome::AsymmetricLockIn
        } else {
            BilateralOutcome::ManagedCompetition
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BilateralOutcome::Normalization => "NORMALIZATION",
            BilateralOutcome::EscalationSpiral => "ESCALATION_SPIRAL",
            BilateralOutcome::GradualDecoupling => "GRADUAL_DECOUPLING",
            BilateralOutcome::StableInterdependence => "STABLE_INTERDEPENDENCE",
            BilateralOutcome::AsymmetricLockIn => "ASYMMETRIC_LOCK_IN",
            BilateralOutcome::ManagedCompetition => "MANAGED_COMPETITION",
        }
    }
}
