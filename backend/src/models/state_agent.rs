//! Bilateral state actor
//!
//! One of exactly two per bilateral run. Restriction intensity and
//! diversification progress are tracked per sector and always stay in [0, 1].

use crate::config::{RegimeType, SectorDependency, Side, StateConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Direction of a graduated action on one sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Escalate,
    Deescalate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAgent {
    id: String,
    name: String,
    side: Side,
    gdp: f64,
    regime: RegimeType,
    nationalism: f64,
    approval: f64,
    escalation_threshold: f64,
    de_escalation_threshold: f64,
    retaliation_propensity: f64,
    coercion_hope: f64,
    weakness_signal: f64,
    proactive_nationalism: f64,

    /// Configured minimum gap between two actions
    cooldown_ticks: usize,
    /// Ticks left before the next action is allowed
    action_cooldown: usize,

    restriction_intensity: BTreeMap<String, f64>,
    /// Tick at which the current restriction on a sector began
    restriction_since: BTreeMap<String, usize>,
    diversification_progress: BTreeMap<String, f64>,
    cumulative_gdp_loss: f64,
    /// Pain accrued in the most recent tick
    last_pain: f64,
    /// Decaying memory of bilateral friction
    friction_memory: f64,
}

impl StateAgent {
    pub fn from_config(config: &StateConfig, side: Side, sectors: &[SectorDependency]) -> Self {
        let mut restriction_intensity = BTreeMap::new();
        let mut restriction_since = BTreeMap::new();
        let mut diversification_progress = BTreeMap::new();
        for sector in sectors {
            let initial = config
                .initial_restrictions
                .get(&sector.name)
                .copied()
                .unwrap_or(0.0);
            if initial > 0.0 {
                restriction_since.insert(sector.name.clone(), 0);
            }
            restriction_intensity.insert(sector.name.clone(), initial);
            diversification_progress.insert(sector.name.clone(), 0.0);
        }

        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            side,
            gdp: config.gdp,
            regime: config.regime,
            nationalism: config.nationalism,
            approval: config.approval,
            escalation_threshold: config.escalation_threshold,
            de_escalation_threshold: config.de_escalation_threshold,
            retaliation_propensity: config.retaliation_propensity,
            coercion_hope: config.coercion_hope,
            weakness_signal: config.weakness_signal,
            proactive_nationalism: config.proactive_nationalism,
            cooldown_ticks: config.action_cooldown,
            action_cooldown: 0,
            restriction_intensity,
            restriction_since,
            diversification_progress,
            cumulative_gdp_loss: 0.0,
            last_pain: 0.0,
            friction_memory: 0.0,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn gdp(&self) -> f64 {
        self.gdp
    }

    pub fn regime(&self) -> RegimeType {
        self.regime
    }

    pub fn nationalism(&self) -> f64 {
        self.nationalism
    }

    pub fn approval(&self) -> f64 {
        self.approval
    }

    pub fn escalation_threshold(&self) -> f64 {
        self.escalation_threshold
    }

    pub fn de_escalation_threshold(&self) -> f64 {
        self.de_escalation_threshold
    }

    pub fn retaliation_propensity(&self) -> f64 {
        self.retaliation_propensity
    }

    pub fn coercion_hope(&self) -> f64 {
        self.coercion_hope
    }

    pub fn weakness_signal(&self) -> f64 {
        self.weakness_signal
    }

    pub fn proactive_nationalism(&self) -> f64 {
        self.proactive_nationalism
    }

    pub fn action_cooldown(&self) -> usize {
        self.action_cooldown
    }

    pub fn restriction_intensity(&self) -> &BTreeMap<String, f64> {
        &self.restriction_intensity
    }

    pub fn diversification_progress(&self) -> &BTreeMap<String, f64> {
        &self.diversification_progress
    }

    pub fn restriction(&self, sector: &str) -> f64 {
        self.restriction_intensity.get(sector).copied().unwrap_or(0.0)
    }

    pub fn diversification(&self, sector: &str) -> f64 {
        self.diversification_progress
            .get(sector)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn cumulative_gdp_loss(&self) -> f64 {
        self.cumulative_gdp_loss
    }

    pub fn last_pain(&self) -> f64 {
        self.last_pain
    }

    pub fn friction_memory(&self) -> f64 {
        self.friction_memory
    }

    /// Mean restriction over all sectors
    pub fn average_restriction(&self) -> f64 {
        mean(self.restriction_intensity.values())
    }

    /// Mean diversification over all sectors
    pub fn average_diversification(&self) -> f64 {
        mean(self.diversification_progress.values())
    }

    /// Ticks the current restriction on `sector` has been in place
    pub fn restriction_duration(&self, sector: &str, tick: usize) -> usize {
        self.restriction_since
            .get(sector)
            .map_or(0, |since| tick.saturating_sub(*since))
    }

    /// Mean duration over currently restricted sectors
    pub fn average_restriction_duration(&self, tick: usize) -> f64 {
        if self.restriction_since.is_empty() {
            return 0.0;
        }
        let total: usize = self
            .restriction_since
            .keys()
            .map(|s| self.restriction_duration(s, tick))
            .sum();
        total as f64 / self.restriction_since.len() as f64
    }

    pub fn can_act(&self) -> bool {
        self.action_cooldown == 0
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Set the restriction level on a sector, tracking when it began
    pub fn set_restriction(&mut self, sector: &str, value: f64, tick: usize) {
        let value = value.clamp(0.0, 1.0);
        let previous = self.restriction(sector);
        if previous <= 0.0 && value > 0.0 {
            self.restriction_since.insert(sector.to_string(), tick);
        } else if value <= 0.0 {
            self.restriction_since.remove(sector);
        }
        self.restriction_intensity.insert(sector.to_string(), value);
    }

    pub fn advance_diversification(&mut self, sector: &str, amount: f64) {
        let progress = self
            .diversification_progress
            .entry(sector.to_string())
            .or_insert(0.0);
        *progress = (*progress + amount).clamp(0.0, 1.0);
    }

    pub fn adjust_nationalism(&mut self, delta: f64, low: f64, high: f64) {
        self.nationalism = (self.nationalism + delta).clamp(low, high);
    }

    pub fn adjust_approval(&mut self, delta: f64, low: f64, high: f64) {
        self.approval = (self.approval + delta).clamp(low, high);
    }

    /// Record this tick's pain and its share-of-GDP economic loss
    pub fn record_pain(&mut self, pain: f64, gdp_loss: f64) {
        self.last_pain = pain;
        self.cumulative_gdp_loss += gdp_loss.max(0.0);
    }

    /// Fold this tick's bilateral friction into the decaying memory
    pub fn update_friction_memory(&mut self, friction: f64, decay: f64, accumulation: f64) {
        self.friction_memory = self.friction_memory * decay + friction * accumulation;
    }

    pub fn start_cooldown(&mut self) {
        self.action_cooldown = self.cooldown_ticks;
    }

    /// Count down one tick of cooldown
    pub fn tick_cooldown(&mut self) {
        self.action_cooldown = self.action_cooldown.saturating_sub(1);
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            id: self.id.clone(),
            nationalism: self.nationalism,
            approval: self.approval,
            restriction_intensity: self.restriction_intensity.clone(),
            diversification_progress: self.diversification_progress.clone(),
            cumulative_gdp_loss: self.cumulative_gdp_loss,
            last_pain: self.last_pain,
            action_cooldown: self.action_cooldown,
        }
    }
}

fn mean<'a>(values: impl ExactSizeIterator<Item = &'a f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    values.sum::<f64>() / n as f64
}

/// State as recorded in a bilateral tick trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub id: String,
    pub nationalism: f64,
    pub approval: f64,
    pub restriction_intensity: BTreeMap<String, f64>,
    pub diversification_progress: BTreeMap<String, f64>,
    pub cumulative_gdp_loss: f64,
    pub last_pain: f64,
    pub action_cooldown: usize,
}
