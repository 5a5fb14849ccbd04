//! Periodic audit trust adjustment

use crate::config::AuditConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuditOutcome {
    pub compliance: f64,
    pub passed: bool,
    /// Trust change applied to every active agent
    pub trust_delta: f64,
}

/// Tracks retention between audits
#[derive(Debug, Clone, PartialEq)]
pub struct AuditTracker {
    config: AuditConfig,
    active_at_last_audit: usize,
}

impl AuditTracker {
    pub fn new(config: &AuditConfig, initial_active: usize) -> Self {
        Self {
            config: config.clone(),
            active_at_last_audit: initial_active,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn interval(&self) -> usize {
        self.config.interval_ticks
    }

    /// Compliance proxy: retention since the last audit × system functionality
    pub fn evaluate(&mut self, active_now: usize, functionality: f64) -> AuditOutcome {
        let retention = if self.active_at_last_audit == 0 {
            0.0
        } else {
            active_now as f64 / self.active_at_last_audit as f64
        };
        self.active_at_last_audit = active_now;

        let compliance = (retention * functionality).clamp(0.0, 1.0);
        let passed = compliance >= self.config.threshold;
        let trust_delta = if passed {
            self.config.trust_increment
        } else {
            -self.config.trust_decay
        };
        AuditOutcome {
            compliance,
            passed,
            trust_delta,
        }
    }
}
