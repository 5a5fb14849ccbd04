//! Mechanism ablation
//!
//! Each mechanism's isolated contribution is measured by switching it off
//! and rerunning the same seeds with everything else unchanged. Pressure
//! mechanisms whose share of total de-escalation pressure falls below a
//! tolerance are reported as inert and logged; their parameters are left
//! untouched.

use super::{run_bilateral_ensemble, run_consortium_ensemble, run_seed};
use crate::config::{
    BilateralConfig, ConsortiumConfig, Mechanism, PressureMechanism, Validated,
};
use crate::orchestrator::{BilateralEngine, SimulationError};
use rayon::prelude::*;
use tracing::{info, warn};

/// Success rate with and without one consortium mechanism
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MechanismAblation {
    pub mechanism: Mechanism,
    pub baseline_success_rate: f64,
    pub ablated_success_rate: f64,
}

impl MechanismAblation {
    /// Success-rate points the mechanism is worth (positive when it helps)
    pub fn delta(&self) -> f64 {
        self.baseline_success_rate - self.ablated_success_rate
    }
}

fn success_rate(
    config: &Validated<ConsortiumConfig>,
    base_seed: u64,
    runs: usize,
) -> Result<f64, SimulationError> {
    let records = run_consortium_ensemble(config, base_seed, runs)?;
    if records.is_empty() {
        return Ok(0.0);
    }
    let successes = records.iter().filter(|r| r.outcome.is_success()).count();
    Ok(successes as f64 / records.len() as f64)
}

/// Disable each mechanism in turn over the same seeds
pub fn consortium_ablation(
    config: &Validated<ConsortiumConfig>,
    base_seed: u64,
    runs: usize,
) -> Result<Vec<MechanismAblation>, SimulationError> {
    let baseline = success_rate(config, base_seed, runs)?;
    Mechanism::ALL
        .into_iter()
        .map(|mechanism| -> Result<MechanismAblation, SimulationError> {
            let mut ablated: ConsortiumConfig = (**config).clone();
            ablated.mechanisms = ablated.mechanisms.without(mechanism);
            let ablated = Validated::new(ablated)?;
            let result = MechanismAblation {
                mechanism,
                baseline_success_rate: baseline,
                ablated_success_rate: success_rate(&ablated, base_seed, runs)?,
            };
            info!(
                mechanism = mechanism.name(),
                delta = result.delta(),
                "consortium ablation"
            );
            Ok(result)
        })
        .collect()
}

// ============================================================================
// De-escalation pressure
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureContribution {
    pub mechanism: PressureMechanism,
    pub enabled: bool,
    /// Mean pressure per state per tick
    pub mean_pressure: f64,
    /// Share of the mean total pressure
    pub share: f64,
    /// Change in mean final friction when the mechanism is switched off
    pub friction_delta: f64,
    /// Enabled but contributing less than the tolerance share
    pub inert: bool,
}

/// Mean per-state, per-tick pressure of every mechanism over one run
fn mean_pressure_of_run(
    config: &Validated<BilateralConfig>,
    seed: u64,
) -> Result<[f64; 4], SimulationError> {
    let mut engine = BilateralEngine::new(config, seed)?;
    let mut sums = [0.0; 4];
    let mut samples = 0usize;
    while !engine.is_finished() {
        let result = engine.tick()?;
        for breakdown in &result.pressure {
            for (sum, mechanism) in sums.iter_mut().zip(PressureMechanism::ALL) {
                *sum += breakdown.get(mechanism);
            }
            samples += 1;
        }
    }
    if samples > 0 {
        for sum in sums.iter_mut() {
            *sum /= samples as f64;
        }
    }
    Ok(sums)
}

fn mean_final_friction(
    config: &Validated<BilateralConfig>,
    base_seed: u64,
    runs: usize,
) -> Result<f64, SimulationError> {
    let records = run_bilateral_ensemble(config, base_seed, runs)?;
    if records.is_empty() {
        return Ok(0.0);
    }
    Ok(records.iter().map(|r| r.final_friction).sum::<f64>() / records.len() as f64)
}

/// Isolated contribution of each de-escalation pressure mechanism
///
/// An enabled mechanism whose share of total pressure is below `tolerance`
/// is flagged inert with a warning.
pub fn pressure_contributions(
    config: &Validated<BilateralConfig>,
    base_seed: u64,
    runs: usize,
    tolerance: f64,
) -> Result<Vec<PressureContribution>, SimulationError> {
    let per_run: Vec<[f64; 4]> = (0..runs)
        .into_par_iter()
        .map(|i| mean_pressure_of_run(config, run_seed(base_seed, i)))
        .collect::<Result<_, _>>()?;

    let mut means = [0.0; 4];
    for run in &per_run {
        for (mean, value) in means.iter_mut().zip(run) {
            *mean += value;
        }
    }
    if !per_run.is_empty() {
        for mean in means.iter_mut() {
            *mean /= per_run.len() as f64;
        }
    }
    let total: f64 = means.iter().sum();
    let baseline_friction = mean_final_friction(config, base_seed, runs)?;

    PressureMechanism::ALL
        .into_iter()
        .zip(means)
        .map(|(mechanism, mean_pressure)| -> Result<PressureContribution, SimulationError> {
            let enabled = config.pressure.is_enabled(mechanism);
            let share = if total > 0.0 { mean_pressure / total } else { 0.0 };

            let mut ablated: BilateralConfig = (**config).clone();
            ablated.pressure = ablated.pressure.without(mechanism);
            let ablated = Validated::new(ablated)?;
            let friction_delta = mean_final_friction(&ablated, base_seed, runs)? - baseline_friction;

            let inert = enabled && share < tolerance;
            if inert {
                warn!(
                    mechanism = mechanism.name(),
                    share,
                    friction_delta,
                    "de-escalation mechanism contributes almost nothing"
                );
            }
            Ok(PressureContribution {
                mechanism,
                enabled,
                mean_pressure,
                share,
                friction_delta,
                inert,
            })
        })
        .collect()
}
