//! Escrow forfeiture
//!
//! A defector's escrow balance is seized. `redistribution_share` of it is
//! paid into the escrow of every still-active agent, pro-rata by committed
//! capital; the rest is lost. The record always satisfies
//! `redistributed + lost == forfeited`, and `redistributed == share × forfeited`
//! whenever anyone remains active.

use crate::models::agent::ConsortiumAgent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForfeitureRecord {
    pub agent_id: String,
    pub tick: usize,
    pub forfeited: f64,
    pub redistributed: f64,
    pub lost: f64,
}

/// Seize `agents[defector]`'s escrow and pay out the redistributed share
///
/// The defector must already be inactive. With no active agents left nothing
/// is redistributed. When every survivor has zero committed capital the pool
/// is split equally.
pub fn forfeit_escrow(
    agents: &mut [ConsortiumAgent],
    defector: usize,
    redistribution_share: f64,
    tick: usize,
) -> ForfeitureRecord {
    let agent_id = agents[defector].id().to_string();
    let forfeited = agents[defector].take_escrow();

    let survivors: Vec<usize> = agents
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_active())
        .map(|(i, _)| i)
        .collect();

    if survivors.is_empty() || forfeited <= 0.0 {
        return ForfeitureRecord {
            agent_id,
            tick,
            forfeited,
            redistributed: 0.0,
            lost: forfeited,
        };
    }

    let pool = redistribution_share * forfeited;
    let total_capital: f64 = survivors
        .iter()
        .map(|&i| agents[i].committed_capital())
        .sum();
    for &i in &survivors {
        let weight = if total_capital > 0.0 {
            agents[i].committed_capital() / total_capital
        } else {
            1.0 / survivors.len() as f64
        };
        agents[i].credit_escrow(pool * weight);
    }

    ForfeitureRecord {
        agent_id,
        tick,
        forfeited,
        redistributed: pool,
        lost: forfeited - pool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::agent::{AgentCategory, DefectionReason};

    fn roster() -> Vec<ConsortiumAgent> {
        let mut agents: Vec<ConsortiumAgent> = (0..3)
            .map(|i| ConsortiumAgent::new(format!("agent_{}", i), AgentCategory::Associate))
            .collect();
        agents[0].invest(10.0, 0.5);
        agents[1].invest(30.0, 0.0);
        agents[2].invest(10.0, 0.0);
        agents
    }

    #[test]
    fn test_pro_rata_redistribution() {
        let mut agents = roster();
        agents[0]
            .defect(9, 2, DefectionReason::CalculatedDefection)
            .unwrap();
        let record = forfeit_escrow(&mut agents, 0, 0.8, 9);

        assert_eq!(record.forfeited, 5.0);
        assert_eq!(record.redistributed, 4.0);
        assert_eq!(record.lost, 1.0);
        assert_eq!(agents[0].escrow_amount(), 0.0);
        assert!((agents[1].escrow_amount() - 3.0).abs() < 1e-12);
        assert!((agents[2].escrow_amount() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_last_defector_loses_everything() {
        let mut agents = roster();
        for agent in agents.iter_mut() {
            agent.defect(9, 2, DefectionReason::DomesticVeto).unwrap();
        }
        let record = forfeit_escrow(&mut agents, 0, 0.8, 9);
        assert_eq!(record.redistributed, 0.0);
        assert_eq!(record.lost, record.forfeited);
    }

    #[test]
    fn test_equal_split_without_capital() {
        let mut agents: Vec<ConsortiumAgent> = (0..3)
            .map(|i| ConsortiumAgent::new(format!("agent_{}", i), AgentCategory::Private))
            .collect();
        agents[0].credit_escrow(3.0);
        agents[0]
            .defect(9, 2, DefectionReason::CalculatedDefection)
            .unwrap();
        let record = forfeit_escrow(&mut agents, 0, 1.0, 9);
        assert_eq!(record.redistributed, 3.0);
        assert!((agents[1].escrow_amount() - 1.5).abs() < 1e-12);
        assert!((agents[2].escrow_amount() - 1.5).abs() < 1e-12);
    }
}
