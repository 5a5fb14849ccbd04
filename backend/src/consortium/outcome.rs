//! Terminal classification of a consortium run

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsortiumOutcome {
    CatastrophicFailure,
    StructuralSuccess,
    PartialSuccess,
    GracefulDegradation,
    OrderlyDissolution,
}

impl ConsortiumOutcome {
    pub const ALL: [ConsortiumOutcome; 5] = [
        ConsortiumOutcome::CatastrophicFailure,
        ConsortiumOutcome::StructuralSuccess,
        ConsortiumOutcome::PartialSuccess,
        ConsortiumOutcome::GracefulDegradation,
        ConsortiumOutcome::OrderlyDissolution,
    ];

    /// First matching rule wins; the order of checks is significant
    pub fn classify(active_count: usize, functionality: f64, cascade_triggered: bool) -> Self {
        if cascade_triggered {
            ConsortiumOutcome::CatastrophicFailure
        } else if active_count >= 4 && functionality >= 0.8 {
            ConsortiumOutcome::StructuralSuccess
        } else if active_count >= 2 && functionality >= 0.4 {
            ConsortiumOutcome::PartialSuccess
        } else if active_count >= 1 && functionality >= 0.2 {
            ConsortiumOutcome::GracefulDegradation
        } else {
            ConsortiumOutcome::OrderlyDissolution
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ConsortiumOutcome::CatastrophicFailure
                | ConsortiumOutcome::GracefulDegradation
                | ConsortiumOutcome::OrderlyDissolution
        )
    }

    pub fn is_success(&self) -> bool {
        !self.is_failure()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsortiumOutcome::CatastrophicFailure => "CATASTROPHIC_FAILURE",
            ConsortiumOutcome::StructuralSuccess => "STRUCTURAL_SUCCESS",
            ConsortiumOutcome::PartialSuccess => "PARTIAL_SUCCESS",
            ConsortiumOutcome::GracefulDegradation => "GRACEFUL_DEGRADATION",
            ConsortiumOutcome::OrderlyDissolution => "ORDERLY_DISSOLUTION",
        }
    }
}
