//! Production implementation of GameContext.

use crate::context::{mix_seed, GameContext};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Production context backed by the system clock and OS entropy.
///
/// The seed is drawn once at construction, so every stream derived from
/// one context is still independent and the seed can be reported back to
/// the caller for replay.
pub struct SystemContext {
    /// Start time for elapsed-time measurement
    start: Instant,

    /// Seed drawn from OS entropy
    seed: u64,
}

impl SystemContext {
    /// Creates a new SystemContext.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            seed: rand::thread_rng().gen(),
        }
    }

    /// Creates an Arc-wrapped context for sharing across threads.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for SystemContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GameContext for SystemContext {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn derive_rng(&self, stream: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(mix_seed(self.seed, stream))
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
