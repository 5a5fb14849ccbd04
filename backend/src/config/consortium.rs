//! Consortium scenario description

use super::{
    check_non_negative, check_nonzero, check_unit, ConfigError, Validate,
};
use crate::models::agent::AgentCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Complete consortium scenario
///
/// Every field has a default, so a JSON scenario only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsortiumConfig {
    pub phase_count: usize,
    pub ticks_per_phase: usize,
    pub composition: AgentComposition,
    pub trust: TrustConfig,
    pub domestic: DomesticConfig,
    pub investment: InvestmentConfig,
    pub mechanisms: MechanismConfig,
    pub shocks: ConsortiumShockConfig,
    /// Explicit dependency graph; `None` means one isolated node per agent
    pub graph: Option<GraphConfig>,
    /// Lower clamp applied to every agent decision probability
    pub probability_floor: f64,
    /// Upper clamp applied to every agent decision probability
    pub probability_ceiling: f64,
    /// Emit per-tick agent snapshots alongside the event log
    pub record_trace: bool,
}

impl Default for ConsortiumConfig {
    fn default() -> Self {
        Self {
            phase_count: 13,
            ticks_per_phase: 4,
            composition: AgentComposition::default(),
            trust: TrustConfig::default(),
            domestic: DomesticConfig::default(),
            investment: InvestmentConfig::default(),
            mechanisms: MechanismConfig::default(),
            shocks: ConsortiumShockConfig::default(),
            graph: None,
            probability_floor: 0.05,
            probability_ceiling: 0.95,
            record_trace: false,
        }
    }
}

impl ConsortiumConfig {
    /// Agent ids in creation order
    pub fn agent_ids(&self) -> Vec<String> {
        match &self.composition {
            AgentComposition::Counts(counts) => {
                let total: usize = counts.iter().map(|c| c.count).sum();
                (0..total).map(|i| format!("agent_{}", i)).collect()
            }
            AgentComposition::Explicit(specs) => specs.iter().map(|s| s.id.clone()).collect(),
        }
    }

    /// Number of ticks in one run
    pub fn horizon(&self) -> usize {
        self.phase_count * self.ticks_per_phase
    }

    /// The dependency graph to propagate over, materializing the default
    pub fn resolved_graph(&self) -> GraphConfig {
        match &self.graph {
            Some(graph) => graph.clone(),
            None => GraphConfig {
                coupling: GraphConfig::DEFAULT_COUPLING,
                nodes: self
                    .agent_ids()
                    .into_iter()
                    .map(|id| NodeConfig {
                        id: id.clone(),
                        owner: Some(id),
                        criticality: 1.0,
                        requires: Vec::new(),
                    })
                    .collect(),
            },
        }
    }
}

impl Validate for ConsortiumConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_nonzero("phase_count", self.phase_count)?;
        check_nonzero("ticks_per_phase", self.ticks_per_phase)?;
        self.composition.validate()?;
        self.trust.validate()?;
        self.domestic.validate()?;
        self.investment.validate()?;
        self.mechanisms.validate()?;
        self.shocks.validate()?;

        check_unit("probability_floor", self.probability_floor)?;
        check_unit("probability_ceiling", self.probability_ceiling)?;
        if self.probability_floor > self.probability_ceiling {
            return Err(ConfigError::Invalid {
                field: "probability_floor".to_string(),
                reason: format!(
                    "floor {} exceeds ceiling {}",
                    self.probability_floor, self.probability_ceiling
                ),
            });
        }

        if let Some(graph) = &self.graph {
            let owners: BTreeSet<String> = self.agent_ids().into_iter().collect();
            graph.validate_against(&owners)?;
        }
        Ok(())
    }
}

// ============================================================================
// Agents
// ============================================================================

/// How the participant set is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentComposition {
    /// N agents per category, all parameters from the category table
    Counts(Vec<CategoryCount>),
    /// One entry per agent, with optional per-agent overrides
    Explicit(Vec<AgentSpec>),
}

impl Default for AgentComposition {
    fn default() -> Self {
        AgentComposition::Counts(vec![
            CategoryCount {
                category: AgentCategory::TrackACore,
                count: 1,
            },
            CategoryCount {
                category: AgentCategory::TrackBCore,
                count: 2,
            },
            CategoryCount {
                category: AgentCategory::Associate,
                count: 2,
            },
        ])
    }
}

impl AgentComposition {
    /// Categories in agent creation order
    pub fn categories(&self) -> Vec<AgentCategory> {
        match self {
            AgentComposition::Counts(counts) => counts
                .iter()
                .flat_map(|c| std::iter::repeat(c.category).take(c.count))
                .collect(),
            AgentComposition::Explicit(specs) => specs.iter().map(|s| s.category).collect(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.categories().is_empty() {
            return Err(ConfigError::Invalid {
                field: "composition".to_string(),
                reason: "must produce at least one agent".to_string(),
            });
        }
        if let AgentComposition::Explicit(specs) = self {
            let mut ids = BTreeSet::new();
            for (i, agent) in specs.iter().enumerate() {
                if agent.id.is_empty() {
                    return Err(ConfigError::Invalid {
                        field: format!("composition.explicit[{}].id", i),
                        reason: "must not be empty".to_string(),
                    });
                }
                if !ids.insert(agent.id.as_str()) {
                    return Err(ConfigError::Invalid {
                        field: format!("composition.explicit[{}].id", i),
                        reason: format!("duplicate agent id `{}`", agent.id),
                    });
                }
                agent.validate(i)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryCount {
    pub category: AgentCategory,
    pub count: usize,
}

/// Per-agent overrides; unset values come from the category table or sampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentSpec {
    pub id: String,
    pub category: AgentCategory,
    #[serde(default)]
    pub trust_level: Option<f64>,
    #[serde(default)]
    pub domestic_stability: Option<f64>,
    #[serde(default)]
    pub base_defection_prob: Option<f64>,
    #[serde(default)]
    pub sunk_cost_sensitivity: Option<f64>,
    #[serde(default)]
    pub shock_sensitivity: Option<f64>,
}

impl AgentSpec {
    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let overrides = [
            ("trust_level", self.trust_level),
            ("domestic_stability", self.domestic_stability),
            ("base_defection_prob", self.base_defection_prob),
            ("sunk_cost_sensitivity", self.sunk_cost_sensitivity),
            ("shock_sensitivity", self.shock_sensitivity),
        ];
        for (name, value) in overrides {
            if let Some(v) = value {
                check_unit(&format!("composition.explicit[{}].{}", index, name), v)?;
            }
        }
        Ok(())
    }
}

/// Initial trust distribution: triangular on `baseline ± variance`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrustConfig {
    pub baseline: f64,
    pub variance: f64,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            baseline: 0.5,
            variance: 0.1,
        }
    }
}

impl TrustConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_unit("trust.baseline", self.baseline)?;
        check_unit("trust.variance", self.variance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DomesticConfig {
    pub stability_min: f64,
    pub stability_max: f64,
    /// Stability below which a domestic veto becomes possible
    pub veto_threshold: f64,
    /// Per-tick stability recovery
    pub recovery_rate: f64,
}

impl Default for DomesticConfig {
    fn default() -> Self {
        Self {
            stability_min: 0.5,
            stability_max: 0.9,
            veto_threshold: 0.3,
            recovery_rate: 0.01,
        }
    }
}

impl DomesticConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_unit("domestic.stability_min", self.stability_min)?;
        check_unit("domestic.stability_max", self.stability_max)?;
        if self.stability_min > self.stability_max {
            return Err(ConfigError::Invalid {
                field: "domestic.stability_min".to_string(),
                reason: "must not exceed domestic.stability_max".to_string(),
            });
        }
        check_unit("domestic.veto_threshold", self.veto_threshold)?;
        check_unit("domestic.recovery_rate", self.recovery_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InvestmentConfig {
    /// Capital each active agent commits per tick
    pub per_tick: f64,
    /// Share of each tick's investment placed in escrow
    pub escrow_rate: f64,
    pub isru_phase: usize,
    pub revenue_phase: usize,
    pub revenue_per_tick: f64,
    /// Lunar credits minted per unit of revenue
    pub lc_per_revenue: f64,
}

impl Default for InvestmentConfig {
    fn default() -> Self {
        Self {
            per_tick: 2.5,
            escrow_rate: 0.2,
            isru_phase: 4,
            revenue_phase: 9,
            revenue_per_tick: 1.0,
            lc_per_revenue: 100.0,
        }
    }
}

impl InvestmentConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("investment.per_tick", self.per_tick)?;
        check_unit("investment.escrow_rate", self.escrow_rate)?;
        check_non_negative("investment.revenue_per_tick", self.revenue_per_tick)?;
        check_non_negative("investment.lc_per_revenue", self.lc_per_revenue)
    }
}

// ============================================================================
// Mechanisms
// ============================================================================

/// Institutional mechanisms that can be toggled independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mechanism {
    Escrow,
    Wealth,
    PoisonPill,
    Audit,
    SunkCost,
}

impl Mechanism {
    pub const ALL: [Mechanism; 5] = [
        Mechanism::Escrow,
        Mechanism::Wealth,
        Mechanism::PoisonPill,
        Mechanism::Audit,
        Mechanism::SunkCost,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Mechanism::Escrow => "escrow",
            Mechanism::Wealth => "wealth",
            Mechanism::PoisonPill => "poison_pill",
            Mechanism::Audit => "audit",
            Mechanism::SunkCost => "sunk_cost",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MechanismConfig {
    pub escrow: EscrowConfig,
    pub wealth: ToggleConfig,
    pub poison_pill: PoisonPillConfig,
    pub audit: AuditConfig,
    pub sunk_cost: ToggleConfig,
}

impl Default for MechanismConfig {
    fn default() -> Self {
        Self {
            escrow: EscrowConfig::default(),
            wealth: ToggleConfig { enabled: true },
            poison_pill: PoisonPillConfig::default(),
            audit: AuditConfig::default(),
            sunk_cost: ToggleConfig { enabled: true },
        }
    }
}

impl MechanismConfig {
    pub fn is_enabled(&self, mechanism: Mechanism) -> bool {
        match mechanism {
            Mechanism::Escrow => self.escrow.enabled,
            Mechanism::Wealth => self.wealth.enabled,
            Mechanism::PoisonPill => self.poison_pill.enabled,
            Mechanism::Audit => self.audit.enabled,
            Mechanism::SunkCost => self.sunk_cost.enabled,
        }
    }

    pub fn set_enabled(&mut self, mechanism: Mechanism, enabled: bool) {
        match mechanism {
            Mechanism::Escrow => self.escrow.enabled = enabled,
            Mechanism::Wealth => self.wealth.enabled = enabled,
            Mechanism::PoisonPill => self.poison_pill.enabled = enabled,
            Mechanism::Audit => self.audit.enabled = enabled,
            Mechanism::SunkCost => self.sunk_cost.enabled = enabled,
        }
    }

    /// Same parameters with one mechanism switched off
    pub fn without(&self, mechanism: Mechanism) -> Self {
        let mut ablated = self.clone();
        ablated.set_enabled(mechanism, false);
        ablated
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_unit(
            "mechanisms.escrow.redistribution_share",
            self.escrow.redistribution_share,
        )?;
        check_nonzero(
            "mechanisms.poison_pill.cascade_threshold",
            self.poison_pill.cascade_threshold,
        )?;
        check_unit(
            "mechanisms.poison_pill.cascade_probability",
            self.poison_pill.cascade_probability,
        )?;
        check_nonzero("mechanisms.audit.interval_ticks", self.audit.interval_ticks)?;
        check_unit("mechanisms.audit.threshold", self.audit.threshold)?;
        check_unit("mechanisms.audit.trust_increment", self.audit.trust_increment)?;
        check_unit("mechanisms.audit.trust_decay", self.audit.trust_decay)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToggleConfig {
    pub enabled: bool,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EscrowConfig {
    pub enabled: bool,
    /// Defections at or after this phase forfeit escrow
    pub commitment_phase: usize,
    /// Share of forfeited escrow paid out to remaining agents
    pub redistribution_share: f64,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            commitment_phase: 2,
            redistribution_share: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoisonPillConfig {
    pub enabled: bool,
    /// Defections at or after this phase count as late
    pub late_phase: usize,
    pub cascade_threshold: usize,
    pub cascade_probability: f64,
}

impl Default for PoisonPillConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            late_phase: 3,
            cascade_threshold: 2,
            cascade_probability: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    pub enabled: bool,
    pub interval_ticks: usize,
    /// Minimum compliance proxy for a passed audit
    pub threshold: f64,
    pub trust_increment: f64,
    pub trust_decay: f64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ticks: 4,
            threshold: 0.8,
            trust_increment: 0.05,
            trust_decay: 0.02,
        }
    }
}

// ============================================================================
// Shocks
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsortiumShockConfig {
    pub enabled: bool,
    pub initial_volatility: f64,
    /// Per-tick multiplicative decay of political volatility
    pub volatility_decay: f64,
    pub election: f64,
    pub economic_crisis: f64,
    pub technical_failure: f64,
    pub sanctions: f64,
    pub geopolitical: f64,
    pub intensity_min: f64,
    pub intensity_max: f64,
}

impl Default for ConsortiumShockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_volatility: 0.0,
            volatility_decay: 0.9,
            election: 0.20,
            economic_crisis: 0.10,
            technical_failure: 0.08,
            sanctions: 0.05,
            geopolitical: 0.03,
            intensity_min: 0.2,
            intensity_max: 0.8,
        }
    }
}

impl ConsortiumShockConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_unit("shocks.initial_volatility", self.initial_volatility)?;
        check_unit("shocks.volatility_decay", self.volatility_decay)?;
        check_unit("shocks.election", self.election)?;
        check_unit("shocks.economic_crisis", self.economic_crisis)?;
        check_unit("shocks.technical_failure", self.technical_failure)?;
        check_unit("shocks.sanctions", self.sanctions)?;
        check_unit("shocks.geopolitical", self.geopolitical)?;
        check_unit("shocks.intensity_min", self.intensity_min)?;
        check_unit("shocks.intensity_max", self.intensity_max)?;
        if self.intensity_min > self.intensity_max {
            return Err(ConfigError::Invalid {
                field: "shocks.intensity_min".to_string(),
                reason: "must not exceed shocks.intensity_max".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Dependency graph
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    #[serde(default = "GraphConfig::default_coupling")]
    pub coupling: f64,
    pub nodes: Vec<NodeConfig>,
}

impl GraphConfig {
    pub const DEFAULT_COUPLING: f64 = 0.6;

    fn default_coupling() -> f64 {
        Self::DEFAULT_COUPLING
    }

    /// Structural checks; `owners` is the set of agent ids nodes may belong to
    pub fn validate_against(&self, owners: &BTreeSet<String>) -> Result<(), ConfigError> {
        check_non_negative("graph.coupling", self.coupling)?;

        let mut ids = BTreeSet::new();
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(ConfigError::MalformedGraph {
                    node: node.id.clone(),
                    reason: "duplicate node id".to_string(),
                });
            }
        }

        for node in &self.nodes {
            if !(node.criticality.is_finite() && node.criticality >= 0.0) {
                return Err(ConfigError::MalformedGraph {
                    node: node.id.clone(),
                    reason: format!("criticality {} must be >= 0", node.criticality),
                });
            }
            if let Some(owner) = &node.owner {
                if !owners.contains(owner) {
                    return Err(ConfigError::MalformedGraph {
                        node: node.id.clone(),
                        reason: format!("unknown owner `{}`", owner),
                    });
                }
            }
            for dep in &node.requires {
                if dep == &node.id {
                    return Err(ConfigError::MalformedGraph {
                        node: node.id.clone(),
                        reason: "node requires itself".to_string(),
                    });
                }
                if !ids.contains(dep.as_str()) {
                    return Err(ConfigError::MalformedGraph {
                        node: node.id.clone(),
                        reason: format!("requires unknown node `{}`", dep),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub id: String,
    /// Agent whose withdrawal takes this node down; `None` for shared infrastructure
    #[serde(default)]
    pub owner: Option<String>,
    pub criticality: f64,
    #[serde(default)]
    pub requires: Vec<String>,
}
