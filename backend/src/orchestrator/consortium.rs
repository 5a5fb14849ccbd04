//! Consortium engine
//!
//! Phase-scheduled multi-agent defection model. One engine value is one run.
//!
//! # Architecture
//!
//! ```text
//! For each tick t (phase = min(t / ticks_per_phase, phase_count − 1)):
//! 1. Shocks           volatility decays, IID shocks raise it and hit one agent
//! 2. Domestic         stability recovers; unstable, exposed agents may be vetoed out
//! 3. Decision         one uniform draw per active agent against p_defect
//! 4. Forfeiture       escrow of this tick's defectors (phase ≥ commitment phase)
//! 5. Cascade          functionality from withdrawn nodes; poison-pill trials
//! 6. Investment       active agents commit capital and escrow
//! 7. Revenue          phase ≥ revenue phase: revenue accrues, LC minted pro-rata
//! 8. Audit            end of every audit interval: trust up or down
//! 9. Invariants       agent lifecycle checked, trace recorded, time advances
//! ```
//!
//! A triggered poison pill ends the run at step 5 of that tick. Either way the
//! run produces exactly one [`ConsortiumRecord`], classified once from the
//! final state.
//!
//! # Example
//!
//! ```rust
//! use cooperation_simulator_core_rs::config::{ConsortiumConfig, Validated};
//! use cooperation_simulator_core_rs::orchestrator::ConsortiumEngine;
//!
//! let scenario = Validated::new(ConsortiumConfig::default()).unwrap();
//! let run = ConsortiumEngine::new(&scenario, 42).unwrap().run().unwrap();
//! assert_eq!(run.record.seed, 42);
//! assert!(run.record.final_phase < 13);
//! ```

use super::record::{compute_config_hash, ConsortiumRecord, DefectionRecord, TickTrace};
use super::SimulationError;
use crate::config::{AgentComposition, ConsortiumConfig, Validated};
use crate::consortium::{
    forfeit_escrow, AuditTracker, ConsortiumOutcome, DefectionCalculator, DependencyGraph,
    ForfeitureRecord, PoisonPill,
};
use crate::core::time::TimeManager;
use crate::models::{
    AgentCategory, ConsortiumAgent, ConsortiumState, DefectionReason, Event, EventLog,
};
use crate::rng::RngManager;
use crate::shocks::{ConsortiumShock, IidConsortiumShocks, ShockProcess};
use tracing::{debug, info};

/// Stability lost per unit of targeted shock intensity
const SHOCK_STABILITY_IMPACT: f64 = 0.3;
/// Trust lost per unit of targeted shock intensity
const SHOCK_TRUST_IMPACT: f64 = 0.1;

/// Summary of one executed tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    pub tick: usize,
    pub phase: usize,
    pub num_defections: usize,
    pub system_functionality: f64,
    pub cascade_triggered: bool,
}

/// Everything a finished run produced
#[derive(Debug, Clone, PartialEq)]
pub struct ConsortiumRun {
    pub record: ConsortiumRecord,
    /// Empty unless `record_trace` is set
    pub trace: Vec<TickTrace>,
    pub events: EventLog,
}

pub struct ConsortiumEngine<S = IidConsortiumShocks> {
    config: ConsortiumConfig,
    seed: u64,
    config_hash: String,
    rng: RngManager,
    time: TimeManager,
    state: ConsortiumState,
    graph: DependencyGraph,
    calculator: DefectionCalculator,
    poison_pill: PoisonPill,
    audit: AuditTracker,
    shocks: S,
    event_log: EventLog,
    trace: Vec<TickTrace>,
    defections: Vec<DefectionRecord>,
    forfeitures: Vec<ForfeitureRecord>,
    cascade_triggered: bool,
    ticks_executed: usize,
}

impl ConsortiumEngine<IidConsortiumShocks> {
    /// Engine with the default IID shock process
    pub fn new(config: &Validated<ConsortiumConfig>, seed: u64) -> Result<Self, SimulationError> {
        let shocks = IidConsortiumShocks::new(config.shocks.clone());
        Self::with_shock_process(config, seed, shocks)
    }
}

impl<S: ShockProcess<Shock = ConsortiumShock>> ConsortiumEngine<S> {
    /// Engine drawing its shocks from `shocks`
    pub fn with_shock_process(
        config: &Validated<ConsortiumConfig>,
        seed: u64,
        shocks: S,
    ) -> Result<Self, SimulationError> {
        let config: ConsortiumConfig = (**config).clone();
        let config_hash = compute_config_hash(&config)?;
        let graph = DependencyGraph::from_config(&config.resolved_graph())?;

        let mut rng = RngManager::new(seed);
        let agents = build_agents(&config, &mut rng);
        let initial_active = agents.len();
        let state = ConsortiumState::new(agents, config.shocks.initial_volatility);

        Ok(Self {
            time: TimeManager::new(config.ticks_per_phase, config.phase_count),
            calculator: DefectionCalculator::from_config(&config),
            poison_pill: PoisonPill::new(&config.mechanisms.poison_pill),
            audit: AuditTracker::new(&config.mechanisms.audit, initial_active),
            config,
            seed,
            config_hash,
            rng,
            state,
            graph,
            shocks,
            event_log: EventLog::new(),
            trace: Vec::new(),
            defections: Vec::new(),
            forfeitures: Vec::new(),
            cascade_triggered: false,
            ticks_executed: 0,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn current_tick(&self) -> usize {
        self.time.current_tick()
    }

    pub fn state(&self) -> &ConsortiumState {
        &self.state
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Horizon reached or catastrophic cascade triggered
    pub fn is_finished(&self) -> bool {
        self.cascade_triggered || self.time.is_finished()
    }

    fn log_event(&mut self, event: Event) {
        self.event_log.log(event);
    }

    // ========================================================================
    // Tick Loop Implementation
    // ========================================================================

    /// Execute one tick
    ///
    /// # Errors
    /// - [`SimulationError::AlreadyFinished`] once the run has terminated
    /// - [`SimulationError::InvariantViolation`] on inconsistent agent state
    pub fn tick(&mut self) -> Result<TickResult, SimulationError> {
        if self.is_finished() {
            return Err(SimulationError::AlreadyFinished {
                tick: self.ticks_executed,
            });
        }

        let tick = self.time.current_tick();
        let phase = self.time.current_phase();
        let first_event = self.event_log.len();
        self.state.global.advance_phase(phase);

        // STEP 1: SHOCKS
        self.apply_shocks(tick);

        // STEP 2: DOMESTIC POLITICS
        let mut defectors = self.domestic_politics(tick, phase)?;

        // STEP 3: DEFECTION DECISION
        // Every draw reads the same post-shock volatility
        let volatility = self.state.global.political_volatility;
        for i in self.state.active_indices() {
            let decision =
                self.calculator
                    .decide(&self.state.agents()[i], phase, volatility, &mut self.rng);
            if let Some(probability) = decision {
                self.record_defection(i, tick, phase, DefectionReason::CalculatedDefection, probability)?;
                defectors.push(i);
            }
        }

        // STEP 4: FORFEITURE
        let escrow = &self.config.mechanisms.escrow;
        if escrow.enabled && phase >= escrow.commitment_phase {
            let share = escrow.redistribution_share;
            for &i in &defectors {
                let record = forfeit_escrow(self.state.agents_mut(), i, share, tick);
                self.log_event(Event::Forfeiture {
                    tick,
                    agent_id: record.agent_id.clone(),
                    forfeited: record.forfeited,
                    redistributed: record.redistributed,
                    lost: record.lost,
                });
                self.forfeitures.push(record);
            }
        }

        // STEP 5: CASCADE
        let withdrawn = self.graph.withdrawn_nodes(self.state.withdrawn_ids());
        let cascade = self.graph.propagate(&withdrawn);
        self.state.global.system_functionality = cascade.system_functionality;

        for _ in &defectors {
            if let Some(triggered) = self.poison_pill.record_defection(phase, &mut self.rng) {
                self.log_event(Event::CascadeTrial {
                    tick,
                    late_defections: self.poison_pill.late_defections(),
                    triggered,
                });
                debug!(tick, triggered, "poison pill trial");
                if triggered {
                    self.cascade_triggered = true;
                    break;
                }
            }
        }

        if !self.cascade_triggered {
            // STEP 6: INVESTMENT
            self.invest(phase);

            // STEP 7: REVENUE
            if phase >= self.config.investment.revenue_phase {
                self.distribute_revenue(tick);
            }

            // STEP 8: AUDIT
            if self.audit.is_enabled() && self.time.is_end_of_interval(self.audit.interval()) {
                self.run_audit(tick);
            }
        }

        // STEP 9: INVARIANTS, TRACE, TIME
        self.state.check_invariants()?;
        if self.config.record_trace {
            self.trace.push(TickTrace {
                tick,
                phase,
                political_volatility: self.state.global.political_volatility,
                system_functionality: self.state.global.system_functionality,
                agents: self.state.agents().iter().map(|a| a.snapshot()).collect(),
                events: self.event_log.events()[first_event..].to_vec(),
            });
        }
        self.time.advance_tick();
        self.ticks_executed += 1;

        Ok(TickResult {
            tick,
            phase,
            num_defections: defectors.len(),
            system_functionality: self.state.global.system_functionality,
            cascade_triggered: self.cascade_triggered,
        })
    }

    /// Tick until the run terminates and emit its outputs
    pub fn run(mut self) -> Result<ConsortiumRun, SimulationError> {
        info!(
            seed = self.seed,
            agents = self.state.num_agents(),
            horizon = self.time.horizon(),
            "consortium run started"
        );
        while !self.is_finished() {
            self.tick()?;
        }
        let record = self.record();
        info!(
            seed = self.seed,
            outcome = record.outcome.as_str(),
            active = record.active_agents,
            "consortium run finished"
        );
        Ok(ConsortiumRun {
            record,
            trace: self.trace,
            events: self.event_log,
        })
    }

    /// Terminal record derived from the current state
    pub fn record(&self) -> ConsortiumRecord {
        let active_agents = self.state.active_count();
        let functionality = self.state.global.system_functionality;
        ConsortiumRecord {
            seed: self.seed,
            config_hash: self.config_hash.clone(),
            outcome: ConsortiumOutcome::classify(
                active_agents,
                functionality,
                self.cascade_triggered,
            ),
            final_phase: self.state.global.current_phase,
            final_tick: self.ticks_executed.saturating_sub(1),
            active_agents,
            system_functionality: functionality,
            cascade_triggered: self.cascade_triggered,
            defections: self.defections.clone(),
            forfeitures: self.forfeitures.clone(),
            total_investment: self.state.global.total_investment,
            revenue_generated: self.state.global.revenue_generated,
        }
    }

    // ========================================================================
    // Phases
    // ========================================================================

    fn apply_shocks(&mut self, tick: usize) {
        let global = &mut self.state.global;
        global.political_volatility *= self.config.shocks.volatility_decay;

        for shock in self.shocks.sample(tick, &mut self.rng) {
            let global = &mut self.state.global;
            global.political_volatility = (global.political_volatility
                + shock.intensity * shock.kind.volatility_weight())
            .min(1.0);

            let mut target = None;
            if shock.kind.is_targeted() {
                let active = self.state.active_indices();
                if !active.is_empty() {
                    let pick = self.rng.range(0, active.len() as i64) as usize;
                    let agent = &mut self.state.agents_mut()[active[pick]];
                    agent.adjust_stability(-shock.intensity * SHOCK_STABILITY_IMPACT);
                    agent.adjust_trust(-shock.intensity * SHOCK_TRUST_IMPACT);
                    target = Some(agent.id().to_string());
                }
            }
            debug!(tick, kind = shock.kind.name(), intensity = shock.intensity, "shock");
            self.log_event(Event::ShockOccurred {
                tick,
                kind: shock.kind.name().to_string(),
                intensity: shock.intensity,
                target,
            });
        }
    }

    fn domestic_politics(&mut self, tick: usize, phase: usize) -> Result<Vec<usize>, SimulationError> {
        let domestic = self.config.domestic.clone();
        let mut vetoed = Vec::new();
        for i in self.state.active_indices() {
            let agent = &mut self.state.agents_mut()[i];
            agent.adjust_stability(domestic.recovery_rate);
            if agent.domestic_stability() >= domestic.veto_threshold || !agent.veto_exposed(phase) {
                continue;
            }
            let probability = self.calculator.clamp(agent.domestic_veto_risk());
            if self.rng.next_f64() < probability {
                self.record_defection(i, tick, phase, DefectionReason::DomesticVeto, probability)?;
                vetoed.push(i);
            }
        }
        Ok(vetoed)
    }

    fn record_defection(
        &mut self,
        index: usize,
        tick: usize,
        phase: usize,
        reason: DefectionReason,
        probability: f64,
    ) -> Result<(), SimulationError> {
        let agent = &mut self.state.agents_mut()[index];
        agent.defect(tick, phase, reason)?;
        let agent_id = agent.id().to_string();
        debug!(tick, phase, agent = %agent_id, reason = reason.as_str(), probability, "defection");

        self.defections.push(DefectionRecord {
            agent_id: agent_id.clone(),
            tick,
            phase,
            reason,
        });
        self.log_event(Event::Defection {
            tick,
            agent_id,
            phase,
            reason,
            probability,
        });
        Ok(())
    }

    fn invest(&mut self, phase: usize) {
        let per_tick = self.config.investment.per_tick;
        let escrow_share = if self.config.mechanisms.escrow.enabled {
            self.config.investment.escrow_rate
        } else {
            0.0
        };
        for i in self.state.active_indices() {
            self.state.agents_mut()[i].invest(per_tick, escrow_share);
            self.state.global.total_investment += per_tick;
        }
        if phase >= self.config.investment.isru_phase {
            self.state.global.isru_operational = true;
        }
    }

    fn distribute_revenue(&mut self, tick: usize) {
        let revenue =
            self.config.investment.revenue_per_tick * self.state.global.system_functionality;
        self.state.global.revenue_generated += revenue;

        let active = self.state.active_indices();
        if active.is_empty() {
            return;
        }
        let lc_minted = self.config.investment.lc_per_revenue * revenue;
        let total_capital: f64 = active
            .iter()
            .map(|&i| self.state.agents()[i].committed_capital())
            .sum();
        for &i in &active {
            let agent = &mut self.state.agents_mut()[i];
            let weight = if total_capital > 0.0 {
                agent.committed_capital() / total_capital
            } else {
                1.0 / active.len() as f64
            };
            agent.credit_lc(lc_minted * weight);
        }
        self.log_event(Event::RevenueDistributed {
            tick,
            revenue,
            lc_minted,
        });
    }

    fn run_audit(&mut self, tick: usize) {
        let outcome = self.audit.evaluate(
            self.state.active_count(),
            self.state.global.system_functionality,
        );
        for i in self.state.active_indices() {
            self.state.agents_mut()[i].adjust_trust(outcome.trust_delta);
        }
        debug!(tick, compliance = outcome.compliance, passed = outcome.passed, "audit");
        self.log_event(Event::AuditCompleted {
            tick,
            compliance: outcome.compliance,
            passed: outcome.passed,
        });
    }
}

/// Roster in creation order, sampling trust and stability where not overridden
fn build_agents(config: &ConsortiumConfig, rng: &mut RngManager) -> Vec<ConsortiumAgent> {
    let trust = &config.trust;
    let domestic = &config.domestic;
    let sample = |category: AgentCategory, id: String, rng: &mut RngManager| {
        let trust_level = rng
            .triangular(
                trust.baseline - trust.variance,
                trust.baseline,
                trust.baseline + trust.variance,
            )
            .clamp(0.0, 1.0);
        let stability = rng.uniform(domestic.stability_min, domestic.stability_max);
        ConsortiumAgent::new(id, category)
            .with_trust(trust_level)
            .with_domestic_stability(stability)
    };

    match &config.composition {
        AgentComposition::Counts(_) => config
            .composition
            .categories()
            .into_iter()
            .zip(config.agent_ids())
            .map(|(category, id)| sample(category, id, rng))
            .collect(),
        AgentComposition::Explicit(specs) => specs
            .iter()
            .map(|entry| {
                let mut agent = sample(entry.category, entry.id.clone(), rng);
                if let Some(t) = entry.trust_level {
                    agent = agent.with_trust(t);
                }
                if let Some(s) = entry.domestic_stability {
                    agent = agent.with_domestic_stability(s);
                }
                if let Some(p) = entry.base_defection_prob {
                    agent = agent.with_base_defection_prob(p);
                }
                if let Some(s) = entry.sunk_cost_sensitivity {
                    agent = agent.with_sunk_cost_sensitivity(s);
                }
                if let Some(s) = entry.shock_sensitivity {
                    agent = agent.with_shock_sensitivity(s);
                }
                agent
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Validated;

    fn quiet_scenario() -> ConsortiumConfig {
        let mut config = ConsortiumConfig::default();
        config.shocks.enabled = false;
        config
    }

    #[test]
    fn test_runs_to_horizon_without_cascade() {
        let mut config = quiet_scenario();
        config.mechanisms.poison_pill.enabled = false;
        let scenario = Validated::new(config).unwrap();
        let run = ConsortiumEngine::new(&scenario, 5).unwrap().run().unwrap();
        assert_eq!(run.record.final_tick, 51);
        assert_eq!(run.record.final_phase, 12);
        assert!(!run.record.cascade_triggered);
    }

    #[test]
    fn test_tick_after_finish_is_rejected() {
        let mut config = quiet_scenario();
        config.phase_count = 1;
        config.ticks_per_phase = 1;
        let scenario = Validated::new(config).unwrap();
        let mut engine = ConsortiumEngine::new(&scenario, 1).unwrap();
        engine.tick().unwrap();
        assert!(engine.is_finished());
        assert!(matches!(
            engine.tick(),
            Err(SimulationError::AlreadyFinished { tick: 1 })
        ));
    }

    #[test]
    fn test_investment_accumulates_for_active_agents() {
        let mut config = quiet_scenario();
        config.trust.baseline = 1.0;
        config.trust.variance = 0.0;
        config.probability_floor = 0.0;
        config.phase_count = 1;
        config.ticks_per_phase = 2;
        let scenario = Validated::new(config).unwrap();
        let run = ConsortiumEngine::new(&scenario, 1).unwrap().run().unwrap();
        // 5 agents × 2 ticks × 2.5
        assert_eq!(run.record.total_investment, 25.0);
        assert!(run.record.defections.is_empty());
    }

    #[test]
    fn test_trace_records_every_tick() {
        let mut config = quiet_scenario();
        config.record_trace = true;
        config.phase_count = 2;
        let scenario = Validated::new(config).unwrap();
        let run = ConsortiumEngine::new(&scenario, 11).unwrap().run().unwrap();
        assert_eq!(run.trace.len(), run.record.final_tick + 1);
        assert_eq!(run.trace[0].agents.len(), 5);
    }
}
