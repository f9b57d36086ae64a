//! The uniform simulator contract.

use crate::context::GameContext;
use crate::error::ArenaError;
use crate::types::{GameConfig, GameInfo, SimulationResult};

/// A game-theoretic simulator.
///
/// # Operations
///
/// - `info` - static identity, parameter schema and explanatory text (no computation)
/// - `compute` - runs one simulated trajectory and reports trace + summary
///
/// Implementations hold no mutable state, so a single instance can serve
/// concurrent invocations as long as each call gets its own context.
pub trait Simulator: Send + Sync {
    /// Describes the simulator.
    fn info(&self) -> GameInfo;

    /// Runs the simulation with the given configuration.
    ///
    /// # Arguments
    /// * `config` - Option map; missing keys fall back to the defaults in `info()`
    /// * `ctx` - Clock and random source for this invocation
    ///
    /// # Returns
    /// * `Ok(SimulationResult)` - Trace, equilibria, summary and metadata
    /// * `Err(ArenaError::InvalidParameter)` - A value has the wrong type or range
    fn compute(
        &self,
        config: &GameConfig,
        ctx: &dyn GameContext,
    ) -> Result<SimulationResult, ArenaError>;
}
