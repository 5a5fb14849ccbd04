//! Bilateral friction scenario description

use super::{
    check_non_negative, check_nonzero, check_positive, check_signed_unit, check_unit, ConfigError,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One of the two states in a bilateral run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeType {
    Democracy,
    Hybrid,
    Autocracy,
}

impl RegimeType {
    /// Audience cost per unit of nationalism and de-escalated intensity
    pub fn audience_cost_base(&self) -> f64 {
        match self {
            RegimeType::Democracy => 1.0,
            RegimeType::Hybrid => 0.6,
            RegimeType::Autocracy => 0.3,
        }
    }
}

/// Complete bilateral scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BilateralConfig {
    pub state_a: StateConfig,
    pub state_b: StateConfig,
    pub sectors: Vec<SectorDependency>,
    #[serde(default)]
    pub third_parties: Vec<ThirdPartyConfig>,
    #[serde(default)]
    pub shocks: BilateralShockConfig,
    #[serde(default)]
    pub decision: DecisionParams,
    #[serde(default)]
    pub pressure: PressureConfig,
    #[serde(default = "BilateralConfig::default_max_ticks")]
    pub max_ticks: usize,
    #[serde(default)]
    pub record_trace: bool,
}

impl BilateralConfig {
    fn default_max_ticks() -> usize {
        48
    }

    pub fn state(&self, side: Side) -> &StateConfig {
        match side {
            Side::A => &self.state_a,
            Side::B => &self.state_b,
        }
    }

    pub fn state_mut(&mut self, side: Side) -> &mut StateConfig {
        match side {
            Side::A => &mut self.state_a,
            Side::B => &mut self.state_b,
        }
    }
}

impl Validate for BilateralConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_nonzero("max_ticks", self.max_ticks)?;
        if self.sectors.is_empty() {
            return Err(ConfigError::Invalid {
                field: "sectors".to_string(),
                reason: "at least one sector is required".to_string(),
            });
        }

        let mut names = BTreeSet::new();
        for (i, sector) in self.sectors.iter().enumerate() {
            if !names.insert(sector.name.as_str()) {
                return Err(ConfigError::Invalid {
                    field: format!("sectors[{}].name", i),
                    reason: format!("duplicate sector `{}`", sector.name),
                });
            }
            sector.validate(i)?;
        }

        if self.state_a.id == self.state_b.id {
            return Err(ConfigError::Invalid {
                field: "state_b.id".to_string(),
                reason: "both states share the same id".to_string(),
            });
        }
        self.state_a.validate("state_a", &names)?;
        self.state_b.validate("state_b", &names)?;

        let mut party_ids = BTreeSet::new();
        for (i, party) in self.third_parties.iter().enumerate() {
            if !party_ids.insert(party.id.as_str()) {
                return Err(ConfigError::Invalid {
                    field: format!("third_parties[{}].id", i),
                    reason: format!("duplicate third party `{}`", party.id),
                });
            }
            party.validate(i)?;
        }

        self.shocks.validate()?;
        self.decision.validate()?;
        self.pressure.validate()
    }
}

// ============================================================================
// States
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub gdp: f64,
    pub regime: RegimeType,
    pub nationalism: f64,
    pub approval: f64,
    pub escalation_threshold: f64,
    pub de_escalation_threshold: f64,
    pub retaliation_propensity: f64,
    pub coercion_hope: f64,
    pub weakness_signal: f64,
    pub proactive_nationalism: f64,
    /// Minimum ticks between two committed actions
    #[serde(default = "StateConfig::default_cooldown")]
    pub action_cooldown: usize,
    #[serde(default)]
    pub initial_restrictions: BTreeMap<String, f64>,
}

impl StateConfig {
    fn default_cooldown() -> usize {
        2
    }

    fn validate(&self, prefix: &str, sectors: &BTreeSet<&str>) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::Invalid {
                field: format!("{}.id", prefix),
                reason: "must not be empty".to_string(),
            });
        }
        check_positive(&format!("{}.gdp", prefix), self.gdp)?;
        let unit_fields = [
            ("nationalism", self.nationalism),
            ("approval", self.approval),
            ("escalation_threshold", self.escalation_threshold),
            ("de_escalation_threshold", self.de_escalation_threshold),
            ("retaliation_propensity", self.retaliation_propensity),
            ("coercion_hope", self.coercion_hope),
            ("weakness_signal", self.weakness_signal),
            ("proactive_nationalism", self.proactive_nationalism),
        ];
        for (name, value) in unit_fields {
            check_unit(&format!("{}.{}", prefix, name), value)?;
        }
        for (sector, intensity) in &self.initial_restrictions {
            let field = format!("{}.initial_restrictions.{}", prefix, sector);
            if !sectors.contains(sector.as_str()) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "unknown sector".to_string(),
                });
            }
            check_unit(&field, *intensity)?;
        }
        Ok(())
    }
}

// ============================================================================
// Sectors
// ============================================================================

/// Static trade dependency for one sector, seen from both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectorDependency {
    pub name: String,
    pub a_exports_to_b: f64,
    pub b_exports_to_a: f64,
    /// Ticks A needs to replace imports from B
    pub a_substitution_time: f64,
    pub b_substitution_time: f64,
    pub a_substitution_cost: f64,
    pub b_substitution_cost: f64,
    pub a_criticality: f64,
    pub b_criticality: f64,
    /// Harm A suffers per unit of its own restriction
    pub a_restriction_self_harm: f64,
    pub b_restriction_self_harm: f64,
}

/// One side's view of a sector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorSide {
    pub exports: f64,
    pub imports: f64,
    pub substitution_time: f64,
    pub substitution_cost: f64,
    pub criticality: f64,
    pub self_harm: f64,
}

impl SectorDependency {
    pub fn side(&self, side: Side) -> SectorSide {
        match side {
            Side::A => SectorSide {
                exports: self.a_exports_to_b,
                imports: self.b_exports_to_a,
                substitution_time: self.a_substitution_time,
                substitution_cost: self.a_substitution_cost,
                criticality: self.a_criticality,
                self_harm: self.a_restriction_self_harm,
            },
            Side::B => SectorSide {
                exports: self.b_exports_to_a,
                imports: self.a_exports_to_b,
                substitution_time: self.b_substitution_time,
                substitution_cost: self.b_substitution_cost,
                criticality: self.b_criticality,
                self_harm: self.b_restriction_self_harm,
            },
        }
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let prefix = format!("sectors[{}]", index);
        if self.name.is_empty() {
            return Err(ConfigError::Invalid {
                field: format!("{}.name", prefix),
                reason: "must not be empty".to_string(),
            });
        }
        check_non_negative(&format!("{}.a_exports_to_b", prefix), self.a_exports_to_b)?;
        check_non_negative(&format!("{}.b_exports_to_a", prefix), self.b_exports_to_a)?;
        check_positive(
            &format!("{}.a_substitution_time", prefix),
            self.a_substitution_time,
        )?;
        check_positive(
            &format!("{}.b_substitution_time", prefix),
            self.b_substitution_time,
        )?;
        check_non_negative(
            &format!("{}.a_substitution_cost", prefix),
            self.a_substitution_cost,
        )?;
        check_non_negative(
            &format!("{}.b_substitution_cost", prefix),
            self.b_substitution_cost,
        )?;
        check_unit(&format!("{}.a_criticality", prefix), self.a_criticality)?;
        check_unit(&format!("{}.b_criticality", prefix), self.b_criticality)?;
        check_unit(
            &format!("{}.a_restriction_self_harm", prefix),
            self.a_restriction_self_harm,
        )?;
        check_unit(
            &format!("{}.b_restriction_self_harm", prefix),
            self.b_restriction_self_harm,
        )
    }
}

// ============================================================================
// Third parties
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThirdPartyConfig {
    pub id: String,
    /// +1 fully backs A, -1 fully backs B
    pub alignment_with_a: f64,
    /// Friction at which the party gets involved
    pub intervention_threshold: f64,
    pub alternative_supply_capacity: f64,
    #[serde(default)]
    pub mediation_effectiveness: f64,
    #[serde(default)]
    pub coordination_bonus: f64,
}

impl ThirdPartyConfig {
    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let prefix = format!("third_parties[{}]", index);
        check_signed_unit(&format!("{}.alignment_with_a", prefix), self.alignment_with_a)?;
        check_unit(
            &format!("{}.intervention_threshold", prefix),
            self.intervention_threshold,
        )?;
        check_unit(
            &format!("{}.alternative_supply_capacity", prefix),
            self.alternative_supply_capacity,
        )?;
        check_unit(
            &format!("{}.mediation_effectiveness", prefix),
            self.mediation_effectiveness,
        )?;
        check_unit(&format!("{}.coordination_bonus", prefix), self.coordination_bonus)
    }
}

// ============================================================================
// Shocks
// ============================================================================

/// Fixed per-tick probabilities of the IID exogenous events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BilateralShockConfig {
    pub enabled: bool,
    pub territorial_incident: f64,
    pub military_exercise: f64,
    pub election: f64,
    pub recession: f64,
    pub commodity_spike: f64,
    pub volatility_decay: f64,
}

impl Default for BilateralShockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            territorial_incident: 0.02,
            military_exercise: 0.05,
            election: 0.01,
            recession: 0.01,
            commodity_spike: 0.02,
            volatility_decay: 0.9,
        }
    }
}

impl BilateralShockConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_unit("shocks.territorial_incident", self.territorial_incident)?;
        check_unit("shocks.military_exercise", self.military_exercise)?;
        check_unit("shocks.election", self.election)?;
        check_unit("shocks.recession", self.recession)?;
        check_unit("shocks.commodity_spike", self.commodity_spike)?;
        check_unit("shocks.volatility_decay", self.volatility_decay)
    }
}

// ============================================================================
// Decision parameters
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecisionParams {
    /// Perturbed net benefit must exceed this to commit an action
    pub action_threshold: f64,
    /// Half-width of the multiplicative noise applied to the winning net benefit
    pub noise: f64,
    /// Intensity change of one escalation or de-escalation step
    pub intensity_step: f64,
    pub diversification_rate: f64,
    pub reputation_cost: f64,
    pub retaliation_fear: f64,
    pub relationship_value: f64,
    pub pain_relief_weight: f64,
    /// Weight of political volatility in escalation benefit
    pub volatility_weight: f64,
}

impl Default for DecisionParams {
    fn default() -> Self {
        Self {
            action_threshold: 0.05,
            noise: 0.05,
            intensity_step: 0.2,
            diversification_rate: 0.02,
            reputation_cost: 0.1,
            retaliation_fear: 0.4,
            relationship_value: 0.2,
            pain_relief_weight: 0.5,
            volatility_weight: 0.1,
        }
    }
}

impl DecisionParams {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.action_threshold.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "decision.action_threshold".to_string(),
                value: self.action_threshold,
                expected: "a finite value",
            });
        }
        check_unit("decision.noise", self.noise)?;
        check_positive("decision.intensity_step", self.intensity_step)?;
        check_unit("decision.intensity_step", self.intensity_step)?;
        check_unit("decision.diversification_rate", self.diversification_rate)?;
        check_non_negative("decision.reputation_cost", self.reputation_cost)?;
        check_non_negative("decision.retaliation_fear", self.retaliation_fear)?;
        check_non_negative("decision.relationship_value", self.relationship_value)?;
        check_non_negative("decision.pain_relief_weight", self.pain_relief_weight)?;
        check_non_negative("decision.volatility_weight", self.volatility_weight)
    }
}

// ============================================================================
// De-escalation pressure
// ============================================================================

/// De-escalation pressure sources that can be ablated one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureMechanism {
    FrictionMemory,
    MaintenanceCost,
    InternationalPressure,
    EconomicFatigue,
}

impl PressureMechanism {
    pub const ALL: [PressureMechanism; 4] = [
        PressureMechanism::FrictionMemory,
        PressureMechanism::MaintenanceCost,
        PressureMechanism::InternationalPressure,
        PressureMechanism::EconomicFatigue,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PressureMechanism::FrictionMemory => "friction_memory",
            PressureMechanism::MaintenanceCost => "maintenance_cost",
            PressureMechanism::InternationalPressure => "international_pressure",
            PressureMechanism::EconomicFatigue => "economic_fatigue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PressureConfig {
    pub friction_memory: MemoryPressureConfig,
    pub maintenance_cost: MaintenancePressureConfig,
    pub international_pressure: InternationalPressureConfig,
    pub economic_fatigue: FatiguePressureConfig,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            friction_memory: MemoryPressureConfig::default(),
            maintenance_cost: MaintenancePressureConfig::default(),
            international_pressure: InternationalPressureConfig::default(),
            economic_fatigue: FatiguePressureConfig::default(),
        }
    }
}

impl PressureConfig {
    /// Every pressure source switched off
    pub fn disabled() -> Self {
        let mut config = Self::default();
        for mechanism in PressureMechanism::ALL {
            config.set_enabled(mechanism, false);
        }
        config
    }

    pub fn is_enabled(&self, mechanism: PressureMechanism) -> bool {
        match mechanism {
            PressureMechanism::FrictionMemory => self.friction_memory.enabled,
            PressureMechanism::MaintenanceCost => self.maintenance_cost.enabled,
            PressureMechanism::InternationalPressure => self.international_pressure.enabled,
            PressureMechanism::EconomicFatigue => self.economic_fatigue.enabled,
        }
    }

    pub fn set_enabled(&mut self, mechanism: PressureMechanism, enabled: bool) {
        match mechanism {
            PressureMechanism::FrictionMemory => self.friction_memory.enabled = enabled,
            PressureMechanism::MaintenanceCost => self.maintenance_cost.enabled = enabled,
            PressureMechanism::InternationalPressure => {
                self.international_pressure.enabled = enabled
            }
            PressureMechanism::EconomicFatigue => self.economic_fatigue.enabled = enabled,
        }
    }

    pub fn without(&self, mechanism: PressureMechanism) -> Self {
        let mut ablated = self.clone();
        ablated.set_enabled(mechanism, false);
        ablated
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.friction_memory;
        check_unit("pressure.friction_memory.decay", m.decay)?;
        check_non_negative("pressure.friction_memory.accumulation", m.accumulation)?;
        check_non_negative("pressure.friction_memory.memory_coefficient", m.memory_coefficient)?;
        check_non_negative("pressure.friction_memory.peak_coefficient", m.peak_coefficient)?;

        let c = &self.maintenance_cost;
        check_non_negative("pressure.maintenance_cost.base_cost", c.base_cost)?;
        check_non_negative("pressure.maintenance_cost.acceleration", c.acceleration)?;
        check_non_negative("pressure.maintenance_cost.max_multiplier", c.max_multiplier)?;

        let i = &self.international_pressure;
        check_unit("pressure.international_pressure.friction_threshold", i.friction_threshold)?;
        check_non_negative("pressure.international_pressure.base_rate", i.base_rate)?;
        check_non_negative(
            "pressure.international_pressure.duration_sensitivity",
            i.duration_sensitivity,
        )?;
        check_non_negative("pressure.international_pressure.max_pressure", i.max_pressure)?;

        let f = &self.economic_fatigue;
        check_non_negative("pressure.economic_fatigue.loss_threshold", f.loss_threshold)?;
        check_non_negative("pressure.economic_fatigue.fatigue_rate", f.fatigue_rate)?;
        check_non_negative("pressure.economic_fatigue.duration_rate", f.duration_rate)?;
        check_unit("pressure.economic_fatigue.low_approval", f.low_approval)?;
        check_non_negative(
            "pressure.economic_fatigue.approval_multiplier",
            f.approval_multiplier,
        )?;
        check_non_negative("pressure.economic_fatigue.max_fatigue", f.max_fatigue)
    }
}

/// Decaying memory of past friction plus a permanent peak term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemoryPressureConfig {
    pub enabled: bool,
    pub decay: f64,
    pub accumulation: f64,
    pub memory_coefficient: f64,
    pub peak_coefficient: f64,
}

impl Default for MemoryPressureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            decay: 0.85,
            accumulation: 0.2,
            memory_coefficient: 0.12,
            peak_coefficient: 0.10,
        }
    }
}

/// Rising cost of keeping a restriction in place past a grace period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaintenancePressureConfig {
    pub enabled: bool,
    pub base_cost: f64,
    pub grace_ticks: usize,
    pub acceleration: f64,
    pub max_multiplier: f64,
}

impl Default for MaintenancePressureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_cost: 0.02,
            grace_ticks: 6,
            acceleration: 0.08,
            max_multiplier: 3.0,
        }
    }
}

/// Third-party pressure on a state to back down once friction is high
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InternationalPressureConfig {
    pub enabled: bool,
    pub friction_threshold: f64,
    pub base_rate: f64,
    pub duration_sensitivity: f64,
    pub max_pressure: f64,
}

impl Default for InternationalPressureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            friction_threshold: 0.4,
            base_rate: 0.01,
            duration_sensitivity: 0.05,
            max_pressure: 0.3,
        }
    }
}

/// Domestic fatigue with accumulated economic loss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FatiguePressureConfig {
    pub enabled: bool,
    /// Cumulative GDP loss (share of GDP) before fatigue starts
    pub loss_threshold: f64,
    pub fatigue_rate: f64,
    pub duration_rate: f64,
    /// Approval below which fatigue is amplified
    pub low_approval: f64,
    pub approval_multiplier: f64,
    pub max_fatigue: f64,
}

impl Default for FatiguePressureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            loss_threshold: 0.01,
            fatigue_rate: 0.02,
            duration_rate: 0.005,
            low_approval: 0.4,
            approval_multiplier: 1.3,
            max_fatigue: 0.25,
        }
    }
}
