//! Exogenous shock generation
//!
//! Both engines draw their external events through the [`ShockProcess`]
//! trait. The default processes are IID: each tick every shock kind fires
//! independently with a fixed probability, regardless of history. A
//! correlated or regime-switching generator can replace them by implementing
//! the trait and keeping whatever state it needs; the decision logic only
//! ever sees the sampled shocks.
//!
//! # Key Principles
//!
//! 1. **Determinism**: Same seed + same config → same shocks
//! 2. **Fixed draw order**: shock kinds are sampled in declaration order
//! 3. **No draws when disabled**: a disabled process leaves the stream untouched
//!
//! # Example
//!
//! ```
//! use cooperation_simulator_core_rs::config::ConsortiumShockConfig;
//! use cooperation_simulator_core_rs::rng::RngManager;
//! use cooperation_simulator_core_rs::shocks::{IidConsortiumShocks, ShockProcess};
//!
//! let mut process = IidConsortiumShocks::new(ConsortiumShockConfig::default());
//! let mut rng = RngManager::new(42);
//! for shock in process.sample(0, &mut rng) {
//!     assert!((0.2..=0.8).contains(&shock.intensity));
//! }
//! ```

mod bilateral;
mod consortium;

pub use bilateral::{BilateralShock, IidBilateralShocks, ShockEffect};
pub use consortium::{ConsortiumShock, ConsortiumShockKind, IidConsortiumShocks};

use crate::rng::RngManager;

/// Source of exogenous events for one run
pub trait ShockProcess {
    type Shock;

    /// Shocks occurring at `tick`
    fn sample(&mut self, tick: usize, rng: &mut RngManager) -> Vec<Self::Shock>;
}
