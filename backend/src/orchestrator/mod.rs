//! Orchestrators - the two simulation tick loops
//!
//! Each engine is an explicit run context: it owns a clone of its validated
//! configuration, its RNG, its state and its event log. Nothing is shared
//! between runs, so an ensemble is a plain parallel map over seeds.
//!
//! See `consortium.rs` and `bilateral.rs` for the tick pipelines.

pub mod bilateral;
pub mod consortium;
pub mod record;

use crate::config::ConfigError;
use crate::models::agent::AgentError;
use thiserror::Error;

pub use bilateral::{BilateralEngine, BilateralRun, BilateralTickResult};
pub use consortium::{ConsortiumEngine, ConsortiumRun, TickResult};
pub use record::{
    compute_config_hash, ActionRecord, BilateralRecord, BilateralTickTrace, ConsortiumRecord,
    DefectionRecord, TickTrace,
};

/// Simulation error types
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Inconsistent agent state detected between phases
    #[error("invariant violated: {0}")]
    InvariantViolation(#[from] AgentError),

    /// `tick()` called after the run terminated
    #[error("run already finished after tick {tick}")]
    AlreadyFinished { tick: usize },

    /// Configuration rejected while building the run context
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization failed: {0}")]
    Serialization(String),
}
