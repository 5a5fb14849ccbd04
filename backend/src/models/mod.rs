//! Domain models for the consortium and bilateral engines

pub mod agent;
pub mod event;
pub mod state;
pub mod state_agent;

// Re-exports
pub use agent::{
    AgentCategory, AgentError, AgentSnapshot, CategoryProfile, ConsortiumAgent, DefectionReason,
};
pub use event::{Event, EventLog};
pub use state::{ConsortiumGlobalState, ConsortiumState};
pub use state_agent::{ActionKind, StateAgent, StateSnapshot};
