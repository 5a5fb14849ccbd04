//! De-escalation pressure
//!
//! Four independent sources push a state toward backing down. Each one is
//! computed separately so ensembles can measure its isolated contribution;
//! a disabled source contributes exactly 0.
//!
//! ```text
//! memory        = friction_memory × memory_coefficient + peak_friction × peak_coefficient
//! maintenance   = Σ_restricted base × r × self_harm × min(max_mult, 1 + accel × ln(1 + (dur − grace)))
//! international = min(max, (f − threshold) × base_rate × (1 + sens × avg_dur) × (1 + coordination))
//! fatigue       = min(max, (rate × ln(1 + excess_loss) + duration_rate × avg_dur) × approval_mult)
//! ```

use super::pain::TradeProfile;
use crate::config::{PressureConfig, PressureMechanism};
use crate::models::StateAgent;

/// Per-source pressure on one state this tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PressureBreakdown {
    pub friction_memory: f64,
    pub maintenance_cost: f64,
    pub international_pressure: f64,
    pub economic_fatigue: f64,
}

impl PressureBreakdown {
    pub fn total(&self) -> f64 {
        self.friction_memory
            + self.maintenance_cost
            + self.international_pressure
            + self.economic_fatigue
    }

    pub fn get(&self, mechanism: PressureMechanism) -> f64 {
        match mechanism {
            PressureMechanism::FrictionMemory => self.friction_memory,
            PressureMechanism::MaintenanceCost => self.maintenance_cost,
            PressureMechanism::InternationalPressure => self.international_pressure,
            PressureMechanism::EconomicFatigue => self.economic_fatigue,
        }
    }
}

/// Run-level inputs shared by both states
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureContext {
    pub tick: usize,
    pub friction: f64,
    pub peak_friction: f64,
    /// Mean coordination bonus of active third parties (0 if none)
    pub coordination: f64,
}

pub fn de_escalation_pressure(
    config: &PressureConfig,
    state: &StateAgent,
    profile: &TradeProfile,
    ctx: &PressureContext,
) -> PressureBreakdown {
    let mut breakdown = PressureBreakdown::default();
    let avg_duration = state.average_restriction_duration(ctx.tick);

    let memory = &config.friction_memory;
    if memory.enabled {
        breakdown.friction_memory = state.friction_memory() * memory.memory_coefficient
            + ctx.peak_friction * memory.peak_coefficient;
    }

    let maintenance = &config.maintenance_cost;
    if maintenance.enabled {
        for sector in profile.sectors() {
            let r = state.restriction(&sector.name);
            let duration = state.restriction_duration(&sector.name, ctx.tick);
            if r <= 0.0 || duration <= maintenance.grace_ticks {
                continue;
            }
            let overdue = (duration - maintenance.grace_ticks) as f64;
            let multiplier =
                (1.0 + maintenance.acceleration * overdue.ln_1p()).min(maintenance.max_multiplier);
            breakdown.maintenance_cost +=
                maintenance.base_cost * r * sector.terms.self_harm * multiplier;
        }
    }

    let international = &config.international_pressure;
    if international.enabled && ctx.friction >= international.friction_threshold {
        let pressure = (ctx.friction - international.friction_threshold)
            * international.base_rate
            * (1.0 + international.duration_sensitivity * avg_duration)
            * (1.0 + ctx.coordination);
        breakdown.international_pressure = pressure.min(international.max_pressure);
    }

    let fatigue = &config.economic_fatigue;
    if fatigue.enabled && state.cumulative_gdp_loss() > fatigue.loss_threshold {
        let excess = state.cumulative_gdp_loss() - fatigue.loss_threshold;
        let mut value = fatigue.fatigue_rate * excess.ln_1p() + fatigue.duration_rate * avg_duration;
        if state.approval() < fatigue.low_approval {
            value *= fatigue.approval_multiplier;
        }
        breakdown.economic_fatigue = value.min(fatigue.max_fatigue);
    }

    breakdown
}
