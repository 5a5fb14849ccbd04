//! Cooperation Simulator Core - Rust Engine
//!
//! Deterministic Monte Carlo engines for institutional cooperation under
//! strategic defection and for graduated bilateral trade friction.
//!
//! # Architecture
//!
//! - **config**: Scenario descriptions and the [`Validated`] run context
//! - **core**: Tick and phase bookkeeping
//! - **models**: Domain types (consortium agents, bilateral states, events)
//! - **consortium**: Cascade graph, defection calculus, escrow, poison pill, audit
//! - **bilateral**: Pain, third parties, de-escalation pressure, action selection
//! - **shocks**: Exogenous shock processes behind a swappable trait
//! - **orchestrator**: The two tick loops and their run records
//! - **ensemble**: Parallel seed sweeps, frequency tables, bootstrap, ablation
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic: same validated config and seed, same record
//! 2. Every draw in a run goes through that run's single RNG, in a fixed order
//! 3. Agent lifecycle is one-way: an agent that withdrew never rejoins
//! 4. System functionality never increases when more nodes are withdrawn
//!
//! # Example
//!
//! ```rust
//! use cooperation_simulator_core_rs::config::{ConsortiumConfig, Validated};
//! use cooperation_simulator_core_rs::ensemble::{run_consortium_ensemble, OutcomeTable};
//!
//! let scenario = Validated::new(ConsortiumConfig::default()).unwrap();
//! let records = run_consortium_ensemble(&scenario, 1, 8).unwrap();
//! let table: OutcomeTable<_> = records.iter().map(|r| r.outcome).collect();
//! assert_eq!(table.total(), 8);
//! ```

// Module declarations
pub mod bilateral;
pub mod config;
pub mod consortium;
pub mod core;
pub mod ensemble;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod shocks;

// Re-exports for convenience
pub use config::{BilateralConfig, ConfigError, ConsortiumConfig, Validated};
pub use core::time::TimeManager;
pub use models::{
    agent::{AgentError, ConsortiumAgent},
    event::{Event, EventLog},
    state_agent::StateAgent,
};
pub use orchestrator::{
    BilateralEngine, BilateralRecord, ConsortiumEngine, ConsortiumRecord, SimulationError,
};
pub use rng::RngManager;
