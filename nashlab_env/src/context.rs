//! Execution context trait for nashlab simulators.

use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// The central interface for environment interaction.
///
/// This trait abstracts the clock and the entropy source so that simulators
/// can run both in production (wall clock, OS entropy) and in deterministic
/// simulation tests (virtual clock, fixed seed).
///
/// # Implementations
///
/// - **Production**: `SystemContext` - wraps `Instant`, seed drawn from OS entropy
/// - **Simulation**: `SeededContext` (in `nashlab_sim`) - virtual clock, fixed seed
///
/// # Determinism
///
/// Every random stream a simulator uses must come from `derive_rng`. Two
/// contexts with the same seed hand out identical streams.
pub trait GameContext: Send + Sync {
    /// Returns the time elapsed since the context was created.
    ///
    /// Used only for the `compute_time_ms` annotation of results.
    /// In simulation, this is the virtual clock time.
    fn elapsed(&self) -> Duration;

    /// Derives an independent, reproducible random stream.
    ///
    /// The implementation combines the context seed with `stream` so that
    /// separate subsystems (graph generation, dynamics) do not share state.
    ///
    /// # Arguments
    /// * `stream` - A value to combine with the context seed
    fn derive_rng(&self, stream: u64) -> ChaCha8Rng;

    /// Returns the context's seed (for logging and result metadata).
    fn seed(&self) -> u64;
}

/// Mixes a master seed and a stream id into a sub-seed.
///
/// Every `GameContext` implementation derives its streams through this.
pub fn mix_seed(seed: u64, stream: u64) -> u64 {
    seed.wrapping_mul(0x9e3779b97f4a7c15)
        .wrapping_add(stream.wrapping_mul(0x517cc1b727220a95))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_seed_separates_streams() {
        assert_ne!(mix_seed(42, 0), mix_seed(42, 1));
        assert_ne!(mix_seed(42, 1), mix_seed(43, 1));
        assert_eq!(mix_seed(7, 3), mix_seed(7, 3));
    }
}
