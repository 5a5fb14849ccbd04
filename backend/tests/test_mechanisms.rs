//! Institutional mechanism tests
//!
//! - Poison pill: two late defections trigger a cascade at the configured rate
//! - Escrow: forfeiture conserves value (redistributed + lost == forfeited)
//! - Audit and defection modifiers respond to their toggles

use cooperation_simulator_core_rs::config::{
    AuditConfig, ConsortiumConfig, Mechanism, PoisonPillConfig,
};
use cooperation_simulator_core_rs::consortium::{
    forfeit_escrow, AuditTracker, DefectionCalculator, PoisonPill,
};
use cooperation_simulator_core_rs::models::{AgentCategory, ConsortiumAgent, DefectionReason};
use cooperation_simulator_core_rs::RngManager;
use proptest::prelude::*;

// ============================================================================
// Poison pill
// ============================================================================

#[test]
fn test_two_late_defections_cascade_rate() {
    let config = PoisonPillConfig::default();
    let runs = 2000;
    let triggered = (0..runs)
        .filter(|&seed| {
            let mut pill = PoisonPill::new(&config);
            let mut rng = RngManager::new(seed);
            assert_eq!(pill.record_defection(config.late_phase, &mut rng), None);
            pill.record_defection(config.late_phase + 1, &mut rng) == Some(true)
        })
        .count();
    let rate = triggered as f64 / runs as f64;
    assert!((rate - 0.70).abs() <= 0.05, "cascade rate {}", rate);
}

#[test]
fn test_early_defections_never_counted() {
    let config = PoisonPillConfig::default();
    let mut pill = PoisonPill::new(&config);
    let mut rng = RngManager::new(1);
    for phase in 0..config.late_phase {
        assert_eq!(pill.record_defection(phase, &mut rng), None);
    }
    assert_eq!(pill.late_defections(), 0);
}

#[test]
fn test_disabled_pill_never_triggers() {
    let config = PoisonPillConfig {
        enabled: false,
        cascade_probability: 1.0,
        ..PoisonPillConfig::default()
    };
    let mut pill = PoisonPill::new(&config);
    let mut rng = RngManager::new(3);
    for _ in 0..10 {
        assert_eq!(pill.record_defection(10, &mut rng), None);
    }
    assert!(!pill.triggered());
}

// ============================================================================
// Escrow
// ============================================================================

fn roster(capital: &[f64]) -> Vec<ConsortiumAgent> {
    capital
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let mut agent = ConsortiumAgent::new(format!("agent_{}", i), AgentCategory::Associate);
            agent.invest(c, 0.2);
            agent
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_forfeiture_conserves_escrow(
        capital in prop::collection::vec(0.0f64..100.0, 1..8),
        share in 0.0f64..=1.0,
        defector_seed in any::<usize>(),
    ) {
        let mut agents = roster(&capital);
        let defector = defector_seed % agents.len();
        agents[defector].defect(5, 2, DefectionReason::CalculatedDefection).unwrap();

        let before: f64 = agents.iter().map(|a| a.escrow_amount()).sum();
        let record = forfeit_escrow(&mut agents, defector, share, 5);
        let after: f64 = agents.iter().map(|a| a.escrow_amount()).sum();

        let tol = 1e-9 * (1.0 + record.forfeited);
        prop_assert!((record.redistributed + record.lost - record.forfeited).abs() <= tol);
        prop_assert!((after + record.lost - before).abs() <= tol);
        prop_assert_eq!(agents[defector].escrow_amount(), 0.0);
        if agents.len() > 1 && record.forfeited > 0.0 {
            prop_assert!((record.redistributed - share * record.forfeited).abs() <= tol);
        } else {
            prop_assert_eq!(record.redistributed, 0.0);
        }
    }
}

#[test]
fn test_forfeiture_pro_rata_by_capital() {
    let mut agents = roster(&[10.0, 30.0, 10.0]);
    agents[0].defect(8, 2, DefectionReason::CalculatedDefection).unwrap();
    let record = forfeit_escrow(&mut agents, 0, 0.8, 8);
    assert!((record.forfeited - 2.0).abs() < 1e-12);
    // survivors hold 30 and 10 of capital: 3/4 and 1/4 of the 1.6 pool
    assert!((agents[1].escrow_amount() - (6.0 + 1.2)).abs() < 1e-12);
    assert!((agents[2].escrow_amount() - (2.0 + 0.4)).abs() < 1e-12);
}

// ============================================================================
// Audit and modifiers
// ============================================================================

#[test]
fn test_audit_penalizes_attrition() {
    let mut audit = AuditTracker::new(&AuditConfig::default(), 5);
    let outcome = audit.evaluate(3, 1.0);
    assert!(!outcome.passed);
    assert!((outcome.compliance - 0.6).abs() < 1e-12);
    assert_eq!(outcome.trust_delta, -0.02);

    // retention is measured against the previous audit
    let outcome = audit.evaluate(3, 0.9);
    assert!(outcome.passed);
}

#[test]
fn test_calculator_modifiers_follow_toggles() {
    let mut config = ConsortiumConfig::default();
    let full = DefectionCalculator::from_config(&config);
    config.mechanisms = config.mechanisms.without(Mechanism::Escrow);
    let ablated = DefectionCalculator::from_config(&config);
    assert_eq!(ablated.modifiers().len() + 1, full.modifiers().len());
    assert!(ablated
        .modifiers()
        .iter()
        .all(|m| m.mechanism() != Mechanism::Escrow));
}

#[test]
fn test_invested_agent_is_deterred() {
    let calculator = DefectionCalculator::from_config(&ConsortiumConfig::default());
    let fresh = ConsortiumAgent::new("fresh".to_string(), AgentCategory::TrackBCore);
    let mut invested = fresh.clone();
    for _ in 0..20 {
        invested.invest(2.5, 0.2);
    }
    let p_fresh = calculator.probability(&fresh, 4, 0.0);
    let p_invested = calculator.probability(&invested, 4, 0.0);
    assert!(p_invested.raw < p_fresh.raw);
}
