//! Bilateral friction mechanics
//!
//! Pieces the bilateral engine composes each tick: trade-restriction pain,
//! third-party involvement, de-escalation pressure, graduated action
//! selection and the terminal outcome taxonomy.

pub mod decision;
pub mod outcome;
pub mod pain;
pub mod pressure;
pub mod third_party;

pub use decision::{best_candidate, candidates, decide, Candidate, Decision, DecisionContext};
pub use outcome::{BilateralOutcome, FinalPosition};
pub use pain::{accrue_pain, PainBreakdown, TradeProfile};
pub use pressure::{de_escalation_pressure, PressureBreakdown, PressureContext};
pub use third_party::{total_support, ThirdParty, SUPPORT_CAP};
