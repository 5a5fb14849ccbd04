//! Economic pain from trade restrictions
//!
//! For state X facing opponent restrictions `r` on each sector:
//!
//! ```text
//! trade_loss   = import_share(s) × r_opp(s)
//! time_factor  = max(0, 1 − elapsed / (substitution_time × (1 − support)))
//! sector_pain  = (trade_loss × criticality × (1 − diversification)
//!                 + substitution_cost × trade_loss × time_factor) × (1 − support)
//! self_harm    = Σ r_own(s) × export_share(s) × restriction_self_harm(s)
//! ```
//!
//! `support` is the alternative supply third parties provide to X.

use crate::config::{SectorDependency, SectorSide, Side};
use crate::models::StateAgent;

#[derive(Debug, Clone, PartialEq)]
pub struct SectorTerms {
    pub name: String,
    pub terms: SectorSide,
    /// Share of this side's imports from the opponent that flow through the sector
    pub import_share: f64,
    /// Share of this side's exports to the opponent that flow through the sector
    pub export_share: f64,
}

/// One side's static view of the bilateral trade relationship
#[derive(Debug, Clone, PartialEq)]
pub struct TradeProfile {
    side: Side,
    sectors: Vec<SectorTerms>,
    total_trade: f64,
}

impl TradeProfile {
    pub fn new(sectors: &[SectorDependency], side: Side) -> Self {
        let views: Vec<(String, SectorSide)> = sectors
            .iter()
            .map(|s| (s.name.clone(), s.side(side)))
            .collect();
        let total_imports: f64 = views.iter().map(|(_, v)| v.imports).sum();
        let total_exports: f64 = views.iter().map(|(_, v)| v.exports).sum();
        let share = |value: f64, total: f64| if total > 0.0 { value / total } else { 0.0 };

        Self {
            side,
            sectors: views
                .into_iter()
                .map(|(name, terms)| SectorTerms {
                    import_share: share(terms.imports, total_imports),
                    export_share: share(terms.exports, total_exports),
                    name,
                    terms,
                })
                .collect(),
            total_trade: total_imports + total_exports,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn sectors(&self) -> &[SectorTerms] {
        &self.sectors
    }

    pub fn sector(&self, name: &str) -> Option<&SectorTerms> {
        self.sectors.iter().find(|s| s.name == name)
    }

    /// Exports plus imports with the opponent
    pub fn total_trade(&self) -> f64 {
        self.total_trade
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PainBreakdown {
    pub trade: f64,
    pub substitution: f64,
    pub self_harm: f64,
    pub total: f64,
    /// Share of GDP lost this tick
    pub gdp_loss: f64,
}

/// Pain `me` accrues this tick from both sides' restrictions
pub fn accrue_pain(
    me: &StateAgent,
    opponent: &StateAgent,
    profile: &TradeProfile,
    support: f64,
    tick: usize,
) -> PainBreakdown {
    let mitigation = 1.0 - support;
    let mut trade = 0.0;
    let mut substitution = 0.0;
    let mut self_harm = 0.0;

    for sector in profile.sectors() {
        let terms = &sector.terms;
        let r_opp = opponent.restriction(&sector.name);
        if r_opp > 0.0 {
            let trade_loss = sector.import_share * r_opp;
            let effective_time = terms.substitution_time * mitigation;
            let time_factor = if effective_time > 0.0 {
                let elapsed = opponent.restriction_duration(&sector.name, tick) as f64;
                (1.0 - elapsed / effective_time).max(0.0)
            } else {
                0.0
            };
            trade += trade_loss
                * terms.criticality
                * (1.0 - me.diversification(&sector.name))
                * mitigation;
            substitution += terms.substitution_cost * trade_loss * time_factor * mitigation;
        }
        self_harm += me.restriction(&sector.name) * sector.export_share * terms.self_harm;
    }

    let total = trade + substitution + self_harm;
    let gdp_loss = if me.gdp() > 0.0 {
        total * profile.total_trade() / me.gdp()
    } else {
        0.0
    };
    PainBreakdown {
        trade,
        substitution,
        self_harm,
        total,
        gdp_loss,
    }
}
