//! Seeded xorshift64* stream for one simulation run
//!
//! # Algorithm
//!
//! 64-bit xorshift state scrambled by a final multiply (xorshift64*).
//! Seeds are passed through one splitmix64 round first, so that adjacent
//! ensemble seeds (`base + 0`, `base + 1`, ...) start from unrelated states.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. Every run owns exactly one
//! `RngManager`; nothing else in the crate draws randomness.

use serde::{Deserialize, Serialize};

/// Per-run random stream
///
/// # Example
/// ```
/// use cooperation_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let coin = rng.bernoulli(0.5);
/// let trust = rng.triangular(0.4, 0.5, 0.6);
/// assert!((0.4..=0.6).contains(&trust));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit, never zero)
    state: u64,
}

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl RngManager {
    /// Create a new RNG from a run seed
    ///
    /// # Example
    /// ```
    /// use cooperation_simulator_core_rs::RngManager;
    ///
    /// let a = RngManager::new(7);
    /// let b = RngManager::new(7);
    /// assert_eq!(a, b);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self::from_state(splitmix64(seed))
    }

    /// Restore an RNG from a state previously returned by [`get_state`](Self::get_state)
    pub fn from_state(state: u64) -> Self {
        // xorshift requires a non-zero state
        let state = if state == 0 { 1 } else { state };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Get current RNG state (for replay via [`from_state`](Self::from_state))
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform draw in `[low, high)`; returns `low` when the interval is empty
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let u = self.next_f64();
        if high <= low {
            return low;
        }
        low + (high - low) * u
    }

    /// Bernoulli trial: true with probability `p`
    ///
    /// Always consumes exactly one draw, so the stream position does not
    /// depend on the probability value.
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Triangular draw on `[low, high]` with the given mode
    ///
    /// Degenerate intervals return the mode (one draw is still consumed).
    pub fn triangular(&mut self, low: f64, mode: f64, high: f64) -> f64 {
        let u = self.next_f64();
        let span = high - low;
        if span <= 0.0 {
            return mode;
        }
        let split = (mode - low) / span;
        if u < split {
            low + (u * span * (mode - low)).sqrt()
        } else {
            high - ((1.0 - u) * span * (high - mode)).sqrt()
        }
    }
}
