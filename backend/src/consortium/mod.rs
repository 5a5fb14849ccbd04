//! Consortium cooperation mechanics
//!
//! Building blocks the consortium engine composes each tick: the defection
//! probability calculator, the institutional mechanisms, cascade propagation
//! over the dependency graph, and the terminal outcome classifier.

pub mod audit;
pub mod cascade;
pub mod defection;
pub mod escrow;
pub mod outcome;
pub mod poison_pill;

pub use audit::{AuditOutcome, AuditTracker};
pub use cascade::{CascadeResult, DependencyGraph};
pub use defection::{DefectionCalculator, DefectionProbability, Modifier};
pub use escrow::{forfeit_escrow, ForfeitureRecord};
pub use outcome::ConsortiumOutcome;
pub use poison_pill::PoisonPill;
