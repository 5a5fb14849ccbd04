//! Ensemble, ablation and pressure measurement tests
//!
//! Parallel ensembles must reproduce exactly what sequential single runs
//! with the same seeds produce.

use cooperation_simulator_core_rs::config::{
    BilateralConfig, ConsortiumConfig, Mechanism, PressureMechanism, Validated,
};
use cooperation_simulator_core_rs::consortium::ConsortiumOutcome;
use cooperation_simulator_core_rs::ensemble::{
    consortium_ablation, pressure_contributions, run_bilateral_ensemble, run_consortium_ensemble,
    run_seed, OutcomeTable,
};
use cooperation_simulator_core_rs::orchestrator::{BilateralEngine, ConsortiumEngine};

const STANDOFF_JSON: &str = r#"{
    "state_a": {
        "id": "jp", "gdp": 4200.0, "regime": "democracy",
        "nationalism": 0.55, "approval": 0.45,
        "escalation_threshold": 0.25, "de_escalation_threshold": 0.4,
        "retaliation_propensity": 0.6, "coercion_hope": 0.5,
        "weakness_signal": 0.4, "proactive_nationalism": 0.3,
        "initial_restrictions": {"photoresist": 0.4}
    },
    "state_b": {
        "id": "kr", "gdp": 1700.0, "regime": "democracy",
        "nationalism": 0.65, "approval": 0.4,
        "escalation_threshold": 0.25, "de_escalation_threshold": 0.4,
        "retaliation_propensity": 0.7, "coercion_hope": 0.3,
        "weakness_signal": 0.5, "proactive_nationalism": 0.3
    },
    "sectors": [
        {
            "name": "photoresist",
            "a_exports_to_b": 8.0, "b_exports_to_a": 1.0,
            "a_substitution_time": 6.0, "b_substitution_time": 24.0,
            "a_substitution_cost": 0.1, "b_substitution_cost": 0.5,
            "a_criticality": 0.2, "b_criticality": 0.9,
            "a_restriction_self_harm": 0.2, "b_restriction_self_harm": 0.1
        },
        {
            "name": "consumer_goods",
            "a_exports_to_b": 20.0, "b_exports_to_a": 15.0,
            "a_substitution_time": 4.0, "b_substitution_time": 4.0,
            "a_substitution_cost": 0.1, "b_substitution_cost": 0.1,
            "a_criticality": 0.3, "b_criticality": 0.3,
            "a_restriction_self_harm": 0.3, "b_restriction_self_harm": 0.3
        }
    ],
    "third_parties": [
        {"id": "us", "alignment_with_a": 0.0, "intervention_threshold": 0.15,
         "alternative_supply_capacity": 0.2, "mediation_effectiveness": 0.4,
         "coordination_bonus": 0.3}
    ],
    "max_ticks": 36
}"#;

fn standoff() -> BilateralConfig {
    serde_json::from_str(STANDOFF_JSON).unwrap()
}

// ============================================================================
// Ensembles
// ============================================================================

#[test]
fn test_run_seed_wraps() {
    assert_eq!(run_seed(100, 5), 105);
    assert_eq!(run_seed(u64::MAX, 1), 0);
}

#[test]
fn test_consortium_ensemble_matches_single_runs() {
    let scenario = Validated::new(ConsortiumConfig::default()).unwrap();
    let base = u64::MAX - 3;
    let records = run_consortium_ensemble(&scenario, base, 8).unwrap();
    assert_eq!(records.len(), 8);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.seed, run_seed(base, i));
        let single = ConsortiumEngine::new(&scenario, record.seed)
            .unwrap()
            .run()
            .unwrap()
            .record;
        assert_eq!(&single, record);
    }
}

#[test]
fn test_bilateral_ensemble_matches_single_runs() {
    let scenario = Validated::new(standoff()).unwrap();
    let records = run_bilateral_ensemble(&scenario, 40, 6).unwrap();
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.seed, 40 + i as u64);
        assert_eq!(record.ticks, 36);
        let single = BilateralEngine::new(&scenario, record.seed)
            .unwrap()
            .run()
            .unwrap()
            .record;
        assert_eq!(&single, record);
    }
}

#[test]
fn test_outcome_table_counts_every_run() {
    let scenario = Validated::new(ConsortiumConfig::default()).unwrap();
    let records = run_consortium_ensemble(&scenario, 0, 30).unwrap();
    let table: OutcomeTable<ConsortiumOutcome> = records.iter().map(|r| r.outcome).collect();
    assert_eq!(table.total(), 30);
    assert_eq!(table.iter().map(|(_, n)| n).sum::<usize>(), 30);
    let success = table.rate(|o| o.is_success());
    let failure = table.rate(|o| o.is_failure());
    assert!(success + failure <= 1.0 + 1e-12);
}

#[test]
fn test_empty_ensemble() {
    let scenario = Validated::new(ConsortiumConfig::default()).unwrap();
    assert!(run_consortium_ensemble(&scenario, 0, 0).unwrap().is_empty());
    let table: OutcomeTable<ConsortiumOutcome> = OutcomeTable::new();
    assert_eq!(table.frequency(ConsortiumOutcome::StructuralSuccess), 0.0);
}

// ============================================================================
// Ablation
// ============================================================================

#[test]
fn test_consortium_ablation_covers_every_mechanism() {
    let scenario = Validated::new(ConsortiumConfig::default()).unwrap();
    let ablations = consortium_ablation(&scenario, 7, 20).unwrap();
    let mechanisms: Vec<Mechanism> = ablations.iter().map(|a| a.mechanism).collect();
    assert_eq!(mechanisms, Mechanism::ALL.to_vec());

    let baseline = ablations[0].baseline_success_rate;
    for ablation in &ablations {
        assert_eq!(ablation.baseline_success_rate, baseline);
        assert!((0.0..=1.0).contains(&ablation.ablated_success_rate));
    }
}

#[test]
fn test_pressure_contributions_respect_toggles() {
    let mut config = standoff();
    config
        .pressure
        .set_enabled(PressureMechanism::EconomicFatigue, false);
    let scenario = Validated::new(config).unwrap();

    let contributions = pressure_contributions(&scenario, 3, 10, 0.0).unwrap();
    assert_eq!(contributions.len(), 4);

    let fatigue = contributions
        .iter()
        .find(|c| c.mechanism == PressureMechanism::EconomicFatigue)
        .unwrap();
    assert!(!fatigue.enabled);
    assert_eq!(fatigue.mean_pressure, 0.0);
    assert_eq!(fatigue.friction_delta, 0.0);
    assert!(!fatigue.inert);

    assert!(contributions.iter().all(|c| !c.inert));
    let shares: f64 = contributions.iter().map(|c| c.share).sum();
    assert!(shares == 0.0 || (shares - 1.0).abs() < 1e-9);
}

#[test]
fn test_pressure_below_tolerance_flagged_inert() {
    let scenario = Validated::new(standoff()).unwrap();
    let contributions = pressure_contributions(&scenario, 3, 5, 1.01).unwrap();
    assert!(contributions.iter().all(|c| c.enabled && c.inert));
}
