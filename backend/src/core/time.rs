//! Time management for the simulation
//!
//! The simulation operates in discrete ticks. A fixed number of ticks forms a
//! phase, and a run lasts a fixed number of phases. This module provides
//! deterministic time advancement and the tick → phase mapping.

use serde::{Deserialize, Serialize};

/// Manages simulation time in discrete ticks and phases
///
/// # Example
/// ```
/// use cooperation_simulator_core_rs::TimeManager;
///
/// let mut time = TimeManager::new(4, 13); // 4 ticks per phase, 13 phases
/// assert_eq!(time.current_tick(), 0);
/// assert_eq!(time.current_phase(), 0);
///
/// time.advance_tick();
/// assert_eq!(time.current_tick(), 1);
/// assert_eq!(time.horizon(), 52);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeManager {
    /// Total ticks elapsed since simulation start
    current_tick: usize,
    /// Number of ticks in one phase
    ticks_per_phase: usize,
    /// Number of phases in a run
    phase_count: usize,
}

impl TimeManager {
    /// Create a new TimeManager
    ///
    /// # Panics
    /// Panics if either argument is zero; scenario validation rejects such
    /// configurations before an engine is built.
    pub fn new(ticks_per_phase: usize, phase_count: usize) -> Self {
        assert!(ticks_per_phase > 0, "ticks_per_phase must be positive");
        assert!(phase_count > 0, "phase_count must be positive");
        Self {
            current_tick: 0,
            ticks_per_phase,
            phase_count,
        }
    }

    /// Advance time by one tick
    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }

    /// Get the current tick (total ticks since start)
    pub fn current_tick(&self) -> usize {
        self.current_tick
    }

    /// Get the current phase (0-indexed, never beyond the last phase)
    ///
    /// # Example
    /// ```
    /// use cooperation_simulator_core_rs::TimeManager;
    ///
    /// let mut time = TimeManager::new(4, 2);
    /// for _ in 0..4 {
    ///     time.advance_tick();
    /// }
    /// assert_eq!(time.current_phase(), 1);
    /// ```
    pub fn current_phase(&self) -> usize {
        (self.current_tick / self.ticks_per_phase).min(self.phase_count - 1)
    }

    /// Get the tick within the current phase (0-indexed)
    pub fn tick_within_phase(&self) -> usize {
        self.current_tick % self.ticks_per_phase
    }

    /// Check if the current tick closes an interval of `interval` ticks
    ///
    /// # Example
    /// ```
    /// use cooperation_simulator_core_rs::TimeManager;
    ///
    /// let mut time = TimeManager::new(4, 13);
    /// for _ in 0..3 {
    ///     time.advance_tick();
    /// }
    /// assert!(time.is_end_of_interval(4));
    /// ```
    pub fn is_end_of_interval(&self, interval: usize) -> bool {
        interval > 0 && (self.current_tick + 1) % interval == 0
    }

    /// Total number of ticks in a run
    pub fn horizon(&self) -> usize {
        self.ticks_per_phase * self.phase_count
    }

    /// True once every tick of the horizon has executed
    pub fn is_finished(&self) -> bool {
        self.current_tick >= self.horizon()
    }

    /// Get ticks per phase
    pub fn ticks_per_phase(&self) -> usize {
        self.ticks_per_phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "ticks_per_phase must be positive")]
    fn test_zero_ticks_per_phase_panics() {
        TimeManager::new(0, 3);
    }

    #[test]
    fn test_phase_saturates_at_last_phase() {
        let mut time = TimeManager::new(1, 3);
        for _ in 0..10 {
            time.advance_tick();
        }
        assert_eq!(time.current_phase(), 2);
        assert!(time.is_finished());
    }
}
