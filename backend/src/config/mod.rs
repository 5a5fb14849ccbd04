//! Scenario configuration and validation
//!
//! A scenario arrives as a declarative description (JSON, or a struct built
//! in code) and is turned into an immutable [`Validated`] run context before
//! any engine sees it. Validation never clamps: an out-of-range value is a
//! [`ConfigError`] naming the offending field.

pub mod bilateral;
pub mod consortium;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ops::Deref;
use thiserror::Error;

pub use bilateral::{
    BilateralConfig, BilateralShockConfig, DecisionParams, PressureConfig, PressureMechanism,
    RegimeType, SectorDependency, SectorSide, Side, StateConfig, ThirdPartyConfig,
};
pub use consortium::{
    AgentComposition, AgentSpec, AuditConfig, CategoryCount, ConsortiumConfig,
    ConsortiumShockConfig, DomesticConfig, EscrowConfig, GraphConfig, InvestmentConfig,
    Mechanism, MechanismConfig, NodeConfig, PoisonPillConfig, ToggleConfig, TrustConfig,
};

/// Errors raised while loading or validating a scenario
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("`{field}` = {value} is out of range (expected {expected})")]
    OutOfRange {
        field: String,
        value: f64,
        expected: &'static str,
    },

    #[error("`{field}` is invalid: {reason}")]
    Invalid { field: String, reason: String },

    #[error("dependency graph node `{node}` is malformed: {reason}")]
    MalformedGraph { node: String, reason: String },
}

impl ConfigError {
    /// Name of the offending field (or graph node)
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::Parse(_) => None,
            ConfigError::OutOfRange { field, .. } | ConfigError::Invalid { field, .. } => {
                Some(field)
            }
            ConfigError::MalformedGraph { node, .. } => Some(node),
        }
    }
}

/// Range and consistency checks for a scenario description
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

/// A configuration that has passed validation
///
/// The only constructors run [`Validate::validate`], so engines can take a
/// `&Validated<C>` and trust every field.
///
/// # Example
/// ```
/// use cooperation_simulator_core_rs::config::{ConsortiumConfig, Validated};
///
/// let scenario = Validated::new(ConsortiumConfig::default()).unwrap();
/// assert_eq!(scenario.phase_count, 13);
///
/// let err = Validated::<ConsortiumConfig>::from_json(r#"{"phase_count": 0}"#).unwrap_err();
/// assert_eq!(err.field(), Some("phase_count"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Validated<C>(C);

impl<C: Validate> Validated<C> {
    pub fn new(config: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self(config))
    }

    /// Consume the wrapper, e.g. to derive an ablated variant and revalidate it
    pub fn into_inner(self) -> C {
        self.0
    }
}

impl<C: Validate + DeserializeOwned> Validated<C> {
    /// Parse a JSON scenario, rejecting unknown keys, then validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: C = serde_json::from_str(json)?;
        Self::new(config)
    }
}

impl<C> Deref for Validated<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.0
    }
}

// ============================================================================
// Field checks
// ============================================================================

pub(crate) fn check_unit(field: &str, value: f64) -> Result<(), ConfigError> {
    check_range(field, value, 0.0, 1.0, "a value in [0, 1]")
}

pub(crate) fn check_signed_unit(field: &str, value: f64) -> Result<(), ConfigError> {
    check_range(field, value, -1.0, 1.0, "a value in [-1, 1]")
}

pub(crate) fn check_non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.to_string(),
            value,
            expected: "a finite value >= 0",
        })
    }
}

pub(crate) fn check_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.to_string(),
            value,
            expected: "a finite value > 0",
        })
    }
}

pub(crate) fn check_nonzero(field: &str, value: usize) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.to_string(),
            value: 0.0,
            expected: "an integer > 0",
        })
    }
}

fn check_range(
    field: &str,
    value: f64,
    low: f64,
    high: f64,
    expected: &'static str,
) -> Result<(), ConfigError> {
    // NaN fails both comparisons
    if value >= low && value <= high {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.to_string(),
            value,
            expected,
        })
    }
}
