//! Ensemble helpers
//!
//! Read-only reductions over many independent runs. Run `i` of an ensemble
//! uses seed `base_seed + i` and owns its own engine, so runs are mapped in
//! parallel with rayon and collected back in seed order.

pub mod ablation;

use crate::config::{BilateralConfig, ConsortiumConfig, Validated};
use crate::orchestrator::{
    BilateralEngine, BilateralRecord, ConsortiumEngine, ConsortiumRecord, SimulationError,
};
use crate::rng::RngManager;
use rayon::prelude::*;
use std::collections::BTreeMap;

pub use ablation::{
    consortium_ablation, pressure_contributions, MechanismAblation, PressureContribution,
};

/// Seed of run `index` in an ensemble starting at `base_seed`
pub fn run_seed(base_seed: u64, index: usize) -> u64 {
    base_seed.wrapping_add(index as u64)
}

/// Records of `runs` consortium runs, in seed order
pub fn run_consortium_ensemble(
    config: &Validated<ConsortiumConfig>,
    base_seed: u64,
    runs: usize,
) -> Result<Vec<ConsortiumRecord>, SimulationError> {
    (0..runs)
        .into_par_iter()
        .map(|i| -> Result<ConsortiumRecord, SimulationError> {
            let engine = ConsortiumEngine::new(config, run_seed(base_seed, i))?;
            Ok(engine.run()?.record)
        })
        .collect()
}

/// Records of `runs` bilateral runs, in seed order
pub fn run_bilateral_ensemble(
    config: &Validated<BilateralConfig>,
    base_seed: u64,
    runs: usize,
) -> Result<Vec<BilateralRecord>, SimulationError> {
    (0..runs)
        .into_par_iter()
        .map(|i| -> Result<BilateralRecord, SimulationError> {
            let engine = BilateralEngine::new(config, run_seed(base_seed, i))?;
            Ok(engine.run()?.record)
        })
        .collect()
}

// ============================================================================
// Outcome frequencies
// ============================================================================

/// Outcome category frequency table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeTable<O: Ord> {
    counts: BTreeMap<O, usize>,
    total: usize,
}

impl<O: Ord + Copy> OutcomeTable<O> {
    pub fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
            total: 0,
        }
    }

    pub fn add(&mut self, outcome: O) {
        *self.counts.entry(outcome).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn count(&self, outcome: O) -> usize {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }

    /// Share of runs that ended in `outcome` (0 for an empty table)
    pub fn frequency(&self, outcome: O) -> f64 {
        self.rate(|o| o == outcome)
    }

    /// Share of runs whose outcome satisfies `predicate`
    pub fn rate(&self, predicate: impl Fn(O) -> bool) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let hits: usize = self
            .counts
            .iter()
            .filter(|(o, _)| predicate(**o))
            .map(|(_, n)| n)
            .sum();
        hits as f64 / self.total as f64
    }

    /// Observed outcomes with their counts, in category order
    pub fn iter(&self) -> impl Iterator<Item = (O, usize)> + '_ {
        self.counts.iter().map(|(o, n)| (*o, *n))
    }
}

impl<O: Ord + Copy> Default for OutcomeTable<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Ord + Copy> FromIterator<O> for OutcomeTable<O> {
    fn from_iter<I: IntoIterator<Item = O>>(iter: I) -> Self {
        let mut table = Self::new();
        for outcome in iter {
            table.add(outcome);
        }
        table
    }
}

// ============================================================================
// Bootstrap
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Percentile bootstrap interval for the mean of `values`
///
/// Resampling is driven by its own seeded stream, so the interval is
/// reproducible. Returns `None` for empty input or zero resamples.
pub fn bootstrap_ci(
    values: &[f64],
    resamples: usize,
    confidence: f64,
    seed: u64,
) -> Option<ConfidenceInterval> {
    if values.is_empty() || resamples == 0 {
        return None;
    }
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;

    let mut rng = RngManager::new(seed);
    let mut means: Vec<f64> = (0..resamples)
        .map(|_| {
            let total: f64 = (0..n)
                .map(|_| values[rng.range(0, n as i64) as usize])
                .sum();
            total / n as f64
        })
        .collect();
    means.sort_by(f64::total_cmp);

    let alpha = (1.0 - confidence.clamp(0.0, 1.0)) / 2.0;
    let at = |q: f64| {
        let idx = (q * (resamples - 1) as f64).round() as usize;
        means[idx.min(resamples - 1)]
    };
    Some(ConfidenceInterval {
        mean,
        lower: at(alpha),
        upper: at(1.0 - alpha),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consortium::ConsortiumOutcome;

    #[test]
    fn test_outcome_table_frequencies() {
        let table: OutcomeTable<ConsortiumOutcome> = [
            ConsortiumOutcome::StructuralSuccess,
            ConsortiumOutcome::StructuralSuccess,
            ConsortiumOutcome::CatastrophicFailure,
            ConsortiumOutcome::PartialSuccess,
        ]
        .into_iter()
        .collect();
        assert_eq!(table.total(), 4);
        assert_eq!(table.count(ConsortiumOutcome::StructuralSuccess), 2);
        assert_eq!(table.frequency(ConsortiumOutcome::CatastrophicFailure), 0.25);
        assert_eq!(table.rate(|o| o.is_failure()), 0.25);
    }

    #[test]
    fn test_bootstrap_constant_sample() {
        let ci = bootstrap_ci(&[0.4; 20], 200, 0.95, 1).unwrap();
        assert!((ci.mean - 0.4).abs() < 1e-12);
        assert!((ci.lower - 0.4).abs() < 1e-12);
        assert!((ci.upper - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_bootstrap_brackets_mean() {
        let values: Vec<f64> = (0..50).map(|i| (i % 2) as f64).collect();
        let ci = bootstrap_ci(&values, 500, 0.9, 7).unwrap();
        assert!(ci.lower <= ci.mean && ci.mean <= ci.upper);
        assert!(ci.upper - ci.lower > 0.0);
        assert_eq!(bootstrap_ci(&values, 500, 0.9, 7), Some(ci));
        assert!(bootstrap_ci(&[], 10, 0.9, 7).is_none());
    }
}
