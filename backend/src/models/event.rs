//! Run event log
//!
//! Every discrete thing that happens in a tick (a shock, a defection, a
//! committed restriction) is appended here in the order it happened. Two
//! runs with the same seed produce equal logs.
//!
//! # Event Types
//!
//! - **Shock**: exogenous event drawn by a shock process
//! - **Defection / Forfeiture / CascadeTrial / Audit / Revenue**: consortium phases
//! - **ActionCommitted / ThirdPartyActivated / MediationSucceeded**: bilateral phases
//!
//! # Example
//!
//! ```rust
//! use cooperation_simulator_core_rs::models::{DefectionReason, Event};
//!
//! let event = Event::Defection {
//!     tick: 10,
//!     agent_id: "agent_3".to_string(),
//!     phase: 2,
//!     reason: DefectionReason::CalculatedDefection,
//!     probability: 0.21,
//! };
//!
//! assert_eq!(event.tick(), 10);
//! assert_eq!(event.event_type(), "defection");
//! ```

use crate::models::agent::DefectionReason;
use crate::models::state_agent::ActionKind;
use serde::{Deserialize, Serialize};

/// One logged occurrence; every variant carries its tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Exogenous shock drawn this tick
    ShockOccurred {
        tick: usize,
        kind: String,
        intensity: f64,
        target: Option<String>,
    },

    /// Agent left the consortium
    Defection {
        tick: usize,
        agent_id: String,
        phase: usize,
        reason: DefectionReason,
        probability: f64,
    },

    /// Escrow of a defector seized and partly redistributed
    Forfeiture {
        tick: usize,
        agent_id: String,
        forfeited: f64,
        redistributed: f64,
        lost: f64,
    },

    /// Poison-pill Bernoulli trial
    CascadeTrial {
        tick: usize,
        late_defections: usize,
        triggered: bool,
    },

    /// Quarterly audit result
    AuditCompleted {
        tick: usize,
        compliance: f64,
        passed: bool,
    },

    /// Revenue accrued and minted as lunar credits
    RevenueDistributed {
        tick: usize,
        revenue: f64,
        lc_minted: f64,
    },

    /// A state changed its restriction on one sector
    ActionCommitted {
        tick: usize,
        state_id: String,
        sector: String,
        action: ActionKind,
        from: f64,
        to: f64,
        net_benefit: f64,
    },

    /// Third party got involved in the dispute
    ThirdPartyActivated {
        tick: usize,
        party_id: String,
        friction: f64,
    },

    /// Third-party mediation landed this tick
    MediationSucceeded { tick: usize, party_id: String },
}

impl Event {
    /// Get the tick when this event occurred
    pub fn tick(&self) -> usize {
        match self {
            Event::ShockOccurred { tick, .. } => *tick,
            Event::Defection { tick, .. } => *tick,
            Event::Forfeiture { tick, .. } => *tick,
            Event::CascadeTrial { tick, .. } => *tick,
            Event::AuditCompleted { tick, .. } => *tick,
            Event::RevenueDistributed { tick, .. } => *tick,
            Event::ActionCommitted { tick, .. } => *tick,
            Event::ThirdPartyActivated { tick, .. } => *tick,
            Event::MediationSucceeded { tick, .. } => *tick,
        }
    }

    /// Get the event type as a string (matches the serialized tag)
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::ShockOccurred { .. } => "shock_occurred",
            Event::Defection { .. } => "defection",
            Event::Forfeiture { .. } => "forfeiture",
            Event::CascadeTrial { .. } => "cascade_trial",
            Event::AuditCompleted { .. } => "audit_completed",
            Event::RevenueDistributed { .. } => "revenue_distributed",
            Event::ActionCommitted { .. } => "action_committed",
            Event::ThirdPartyActivated { .. } => "third_party_activated",
            Event::MediationSucceeded { .. } => "mediation_succeeded",
        }
    }
}

/// Event log for a simulation run
///
/// Stores all events in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific tick
    pub fn events_at_tick(&self, tick: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }
}
