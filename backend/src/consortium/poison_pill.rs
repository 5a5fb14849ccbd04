//! Poison-pill cascade trigger
//!
//! Every defection at or after `late_phase` is counted. Each late defection
//! that leaves the count at or above `cascade_threshold` runs one Bernoulli
//! trial with `cascade_probability`; the first success triggers a catastrophic
//! cascade and no further trials run.

use crate::config::PoisonPillConfig;
use crate::rng::RngManager;

#[derive(Debug, Clone, PartialEq)]
pub struct PoisonPill {
    enabled: bool,
    late_phase: usize,
    threshold: usize,
    probability: f64,
    late_defections: usize,
    triggered: bool,
}

impl PoisonPill {
    pub fn new(config: &PoisonPillConfig) -> Self {
        Self {
            enabled: config.enabled,
            late_phase: config.late_phase,
            threshold: config.cascade_threshold,
            probability: config.cascade_probability,
            late_defections: 0,
            triggered: false,
        }
    }

    /// Count a defection; returns the trial outcome if one was run
    pub fn record_defection(&mut self, phase: usize, rng: &mut RngManager) -> Option<bool> {
        if !self.enabled || phase < self.late_phase {
            return None;
        }
        self.late_defections += 1;
        if self.triggered || self.late_defections < self.threshold {
            return None;
        }
        let triggered = rng.bernoulli(self.probability);
        self.triggered = triggered;
        Some(triggered)
    }

    pub fn late_defections(&self) -> usize {
        self.late_defections
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_early_defections_are_not_counted() {
        let mut pill = PoisonPill::new(&PoisonPillConfig::default());
        let mut rng = RngManager::new(1);
        assert_eq!(pill.record_defection(0, &mut rng), None);
        assert_eq!(pill.record_defection(2, &mut rng), None);
        assert_eq!(pill.late_defections(), 0);
    }

    #[test]
    fn test_trial_runs_on_threshold() {
        let config = PoisonPillConfig {
            cascade_probability: 1.0,
            ..PoisonPillConfig::default()
        };
        let mut pill = PoisonPill::new(&config);
        let mut rng = RngManager::new(1);
        assert_eq!(pill.record_defection(3, &mut rng), None);
        assert_eq!(pill.record_defection(5, &mut rng), Some(true));
        assert!(pill.triggered());
        assert_eq!(pill.record_defection(6, &mut rng), None);
    }

    #[test]
    fn test_disabled_never_triggers() {
        let config = PoisonPillConfig {
            enabled: false,
            cascade_probability: 1.0,
            ..PoisonPillConfig::default()
        };
        let mut pill = PoisonPill::new(&config);
        let mut rng = RngManager::new(1);
        for _ in 0..5 {
            assert_eq!(pill.record_defection(10, &mut rng), None);
        }
        assert!(!pill.triggered());
    }
}
