//! Bilateral engine
//!
//! Two states trade restriction steps over a fixed horizon. One engine value
//! is one run; runs always go to `max_ticks`.
//!
//! # Architecture
//!
//! ```text
//! For each tick t:
//! 1. Shocks           volatility decays; drawn shocks shift both states
//! 2. Third parties    activation on current friction, then mediation attempts
//! 3. Pain             each state accrues pain from both sides' restrictions
//! 4. Decision         both states choose from the same snapshot (A draws first)
//! 5. Apply            committed actions change restrictions, cooldowns start
//! 6. Diversification  progress on every sector the opponent restricts
//! 7. Friction         friction, peak friction and friction memory updated
//! 8. Cooldown         both countdowns tick
//! 9. Trace            optional snapshot, time advances
//! ```
//!
//! # Critical Invariants
//!
//! - Restriction and diversification stay in [0, 1] on every sector
//! - Two actions by one state are at least `action_cooldown` ticks apart
//! - Neither state sees the other's decision for the same tick

use super::record::{compute_config_hash, ActionRecord, BilateralRecord, BilateralTickTrace};
use super::SimulationError;
use crate::bilateral::{
    accrue_pain, de_escalation_pressure, decide, total_support, BilateralOutcome, Decision,
    DecisionContext, FinalPosition, PressureBreakdown, PressureContext, ThirdParty, TradeProfile,
};
use crate::config::{BilateralConfig, Side, Validated};
use crate::core::time::TimeManager;
use crate::models::{Event, EventLog, StateAgent};
use crate::rng::RngManager;
use crate::shocks::{BilateralShock, IidBilateralShocks, ShockProcess};
use tracing::{debug, info};

const NATIONALISM_BOUNDS: (f64, f64) = (0.2, 0.9);
const APPROVAL_BOUNDS: (f64, f64) = (0.2, 0.85);

/// Summary of one executed tick
#[derive(Debug, Clone, PartialEq)]
pub struct BilateralTickResult {
    pub tick: usize,
    pub friction: f64,
    pub actions: usize,
    pub mediated: bool,
    /// De-escalation pressure on A and B this tick
    pub pressure: [PressureBreakdown; 2],
}

/// Everything a finished run produced
#[derive(Debug, Clone, PartialEq)]
pub struct BilateralRun {
    pub record: BilateralRecord,
    /// Empty unless `record_trace` is set
    pub trace: Vec<BilateralTickTrace>,
    pub events: EventLog,
}

pub struct BilateralEngine<S = IidBilateralShocks> {
    config: BilateralConfig,
    seed: u64,
    config_hash: String,
    rng: RngManager,
    time: TimeManager,
    states: [StateAgent; 2],
    profiles: [TradeProfile; 2],
    third_parties: Vec<ThirdParty>,
    shocks: S,
    political_volatility: f64,
    friction: f64,
    peak_friction: f64,
    event_log: EventLog,
    trace: Vec<BilateralTickTrace>,
    actions: Vec<ActionRecord>,
}

fn index(side: Side) -> usize {
    match side {
        Side::A => 0,
        Side::B => 1,
    }
}

impl BilateralEngine<IidBilateralShocks> {
    /// Engine with the default IID shock process
    pub fn new(config: &Validated<BilateralConfig>, seed: u64) -> Result<Self, SimulationError> {
        let shocks = IidBilateralShocks::new(config.shocks.clone());
        Self::with_shock_process(config, seed, shocks)
    }
}

impl<S: ShockProcess<Shock = BilateralShock>> BilateralEngine<S> {
    /// Engine drawing its shocks from `shocks`
    pub fn with_shock_process(
        config: &Validated<BilateralConfig>,
        seed: u64,
        shocks: S,
    ) -> Result<Self, SimulationError> {
        let config: BilateralConfig = (**config).clone();
        let config_hash = compute_config_hash(&config)?;

        let states = [
            StateAgent::from_config(&config.state_a, Side::A, &config.sectors),
            StateAgent::from_config(&config.state_b, Side::B, &config.sectors),
        ];
        let profiles = [
            TradeProfile::new(&config.sectors, Side::A),
            TradeProfile::new(&config.sectors, Side::B),
        ];
        let third_parties = config
            .third_parties
            .iter()
            .cloned()
            .map(ThirdParty::new)
            .collect();
        let friction = friction_of(&states);

        Ok(Self {
            time: TimeManager::new(config.max_ticks, 1),
            rng: RngManager::new(seed),
            config,
            seed,
            config_hash,
            states,
            profiles,
            third_parties,
            shocks,
            political_volatility: 0.0,
            friction,
            peak_friction: friction,
            event_log: EventLog::new(),
            trace: Vec::new(),
            actions: Vec::new(),
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

    pub fn state(&self, side: Side) -> &StateAgent {
        &self.states[index(side)]
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn peak_friction(&self) -> f64 {
        self.peak_friction
    }

    pub fn political_volatility(&self) -> f64 {
        self.political_volatility
    }

    pub fn third_parties(&self) -> &[ThirdParty] {
        &self.third_parties
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn is_finished(&self) -> bool {
        self.time.is_finished()
    }

    // ========================================================================
    // Tick Loop Implementation
    // ========================================================================

    /// Execute one tick
    ///
    /// # Errors
    /// - [`SimulationError::AlreadyFinished`] once `max_ticks` ticks have run
    pub fn tick(&mut self) -> Result<BilateralTickResult, SimulationError> {
        if self.is_finished() {
            return Err(SimulationError::AlreadyFinished {
                tick: self.time.current_tick(),
            });
        }
        let tick = self.time.current_tick();
        let first_event = self.event_log.len();

        // STEP 1: SHOCKS
        self.apply_shocks(tick);

        // STEP 2: THIRD PARTIES
        let mediation = self.third_party_round(tick);

        // STEP 3: PAIN
        for side in [Side::A, Side::B] {
            let me = index(side);
            let support = total_support(&self.third_parties, side);
            let pain = accrue_pain(
                &self.states[me],
                &self.states[1 - me],
                &self.profiles[me],
                support,
                tick,
            );
            self.states[me].record_pain(pain.total, pain.gdp_loss);
        }

        // STEP 4: DECISION
        let coordination = self.coordination();
        let pressure_ctx = PressureContext {
            tick,
            friction: self.friction,
            peak_friction: self.peak_friction,
            coordination,
        };
        let mut decisions: [Option<Decision>; 2] = [None, None];
        let mut pressures = [PressureBreakdown::default(); 2];
        for me in 0..2 {
            let pressure = de_escalation_pressure(
                &self.config.pressure,
                &self.states[me],
                &self.profiles[me],
                &pressure_ctx,
            );
            let ctx = DecisionContext {
                me: &self.states[me],
                opponent: &self.states[1 - me],
                my_profile: &self.profiles[me],
                opponent_profile: &self.profiles[1 - me],
                params: &self.config.decision,
                volatility: self.political_volatility,
                pressure: pressure.total(),
                mediation,
            };
            decisions[me] = decide(&ctx, &mut self.rng);
            pressures[me] = pressure;
        }

        // STEP 5: APPLY
        let mut committed = 0;
        for (me, decision) in decisions.into_iter().enumerate() {
            if let Some(decision) = decision {
                self.commit(me, decision, tick);
                committed += 1;
            }
        }

        // STEP 6: DIVERSIFICATION
        let rate = self.config.decision.diversification_rate;
        for me in 0..2 {
            let sectors: Vec<(String, f64)> = self.profiles[me]
                .sectors()
                .iter()
                .map(|s| (s.name.clone(), self.states[1 - me].restriction(&s.name)))
                .filter(|(_, r)| *r > 0.0)
                .collect();
            for (sector, r_opp) in sectors {
                self.states[me].advance_diversification(&sector, rate * (1.0 + r_opp));
            }
        }

        // STEP 7: FRICTION
        self.friction = friction_of(&self.states);
        self.peak_friction = self.peak_friction.max(self.friction);
        let memory = &self.config.pressure.friction_memory;
        for state in self.states.iter_mut() {
            state.update_friction_memory(self.friction, memory.decay, memory.accumulation);
        }

        // STEP 8: COOLDOWN
        for state in self.states.iter_mut() {
            state.tick_cooldown();
        }

        // STEP 9: TRACE, TIME
        if self.config.record_trace {
            self.trace.push(BilateralTickTrace {
                tick,
                friction: self.friction,
                political_volatility: self.political_volatility,
                state_a: self.states[0].snapshot(),
                state_b: self.states[1].snapshot(),
                active_third_parties: self.active_party_ids(),
                events: self.event_log.events()[first_event..].to_vec(),
            });
        }
        self.time.advance_tick();

        Ok(BilateralTickResult {
            tick,
            friction: self.friction,
            actions: committed,
            mediated: mediation > 0.0,
            pressure: pressures,
        })
    }

    /// Tick to the horizon and emit the run's outputs
    pub fn run(mut self) -> Result<BilateralRun, SimulationError> {
        info!(
            seed = self.seed,
            sectors = self.config.sectors.len(),
            horizon = self.config.max_ticks,
            "bilateral run started"
        );
        while !self.is_finished() {
            self.tick()?;
        }
        let record = self.record();
        info!(
            seed = self.seed,
            outcome = record.outcome.as_str(),
            friction = record.final_friction,
            actions = record.actions.len(),
            "bilateral run finished"
        );
        Ok(BilateralRun {
            record,
            trace: self.trace,
            events: self.event_log,
        })
    }

    /// Terminal record derived from the current state
    pub fn record(&self) -> BilateralRecord {
        let [a, b] = &self.states;
        let position = FinalPosition {
            friction: self.friction,
            peak_friction: self.peak_friction,
            restriction_a: a.average_restriction(),
            restriction_b: b.average_restriction(),
            diversification_a: a.average_diversification(),
            diversification_b: b.average_diversification(),
        };
        BilateralRecord {
            seed: self.seed,
            config_hash: self.config_hash.clone(),
            outcome: BilateralOutcome::classify(&position),
            ticks: self.time.current_tick(),
            final_friction: self.friction,
            peak_friction: self.peak_friction,
            actions: self.actions.clone(),
            diversification_a: position.diversification_a,
            diversification_b: position.diversification_b,
            cumulative_gdp_loss_a: a.cumulative_gdp_loss(),
            cumulative_gdp_loss_b: b.cumulative_gdp_loss(),
            active_third_parties: self.active_party_ids(),
        }
    }

    // ========================================================================
    // Phases
    // ========================================================================

    fn apply_shocks(&mut self, tick: usize) {
        self.political_volatility *= self.config.shocks.volatility_decay;
        for shock in self.shocks.sample(tick, &mut self.rng) {
            let effect = shock.effect();
            for state in self.states.iter_mut() {
                state.adjust_nationalism(
                    effect.nationalism,
                    NATIONALISM_BOUNDS.0,
                    NATIONALISM_BOUNDS.1,
                );
                state.adjust_approval(effect.approval, APPROVAL_BOUNDS.0, APPROVAL_BOUNDS.1);
            }
            self.political_volatility = (self.political_volatility + effect.volatility).clamp(0.0, 1.0);
            debug!(tick, kind = shock.name(), "shock");
            self.event_log.log(Event::ShockOccurred {
                tick,
                kind: shock.name().to_string(),
                intensity: effect.volatility,
                target: None,
            });
        }
    }

    /// Activation and mediation; returns the mediation benefit landed this tick
    fn third_party_round(&mut self, tick: usize) -> f64 {
        for party in self.third_parties.iter_mut() {
            if party.observe(self.friction) {
                debug!(tick, party = party.id(), friction = self.friction, "third party active");
                self.event_log.log(Event::ThirdPartyActivated {
                    tick,
                    party_id: party.id().to_string(),
                    friction: self.friction,
                });
            }
        }

        let mut mediation = 0.0;
        for party in &self.third_parties {
            if party.attempt_mediation(&mut self.rng) {
                mediation += party.mediation_effectiveness();
                self.event_log.log(Event::MediationSucceeded {
                    tick,
                    party_id: party.id().to_string(),
                });
            }
        }
        mediation
    }

    /// Mean coordination bonus of active parties
    fn coordination(&self) -> f64 {
        let active: Vec<f64> = self
            .third_parties
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.coordination_bonus())
            .collect();
        if active.is_empty() {
            0.0
        } else {
            active.iter().sum::<f64>() / active.len() as f64
        }
    }

    fn commit(&mut self, me: usize, decision: Decision, tick: usize) {
        let Decision {
            candidate,
            perturbed_net,
        } = decision;
        let state = &mut self.states[me];
        state.set_restriction(&candidate.sector, candidate.to, tick);
        state.start_cooldown();
        let record = ActionRecord {
            tick,
            state_id: state.id().to_string(),
            to: state.restriction(&candidate.sector),
            net_benefit: candidate.net_benefit(),
            sector: candidate.sector,
            action: candidate.action,
            from: candidate.from,
        };
        debug!(
            tick,
            state = %record.state_id,
            sector = %record.sector,
            to = record.to,
            perturbed_net,
            "action committed"
        );
        self.event_log.log(Event::ActionCommitted {
            tick,
            state_id: record.state_id.clone(),
            sector: record.sector.clone(),
            action: record.action,
            from: record.from,
            to: record.to,
            net_benefit: record.net_benefit,
        });
        self.actions.push(record);
    }

    fn active_party_ids(&self) -> Vec<String> {
        self.third_parties
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.id().to_string())
            .collect()
    }
}

/// Mean of the two states' average restriction
fn friction_of(states: &[StateAgent; 2]) -> f64 {
    (states[0].average_restriction() + states[1].average_restriction()) / 2.0
}
