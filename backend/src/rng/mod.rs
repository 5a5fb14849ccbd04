//! Deterministic random number generation
//!
//! One `RngManager` per run. Every stochastic draw in a run (trust sampling,
//! defection trials, shocks, decision noise) goes through it.

mod xorshift;

pub use xorshift::RngManager;
