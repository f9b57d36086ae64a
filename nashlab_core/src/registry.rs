//! Game registry - maps game ids to simulator instances.

use crate::network_contagion::NetworkContagion;

use nashlab_env::{ArenaError, GameConfig, GameContext, GameInfo, SimulationResult, Simulator};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Lookup table of available simulators, ordered by id.
#[derive(Clone, Default)]
pub struct GameRegistry {
    games: BTreeMap<String, Arc<dyn Simulator>>,
}

impl GameRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every simulator this crate ships.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(NetworkContagion::new());
        registry
    }

    /// Registers a simulator under the id reported by its `info()`.
    ///
    /// Returns the simulator previously registered under that id, if any.
    pub fn register<S: Simulator + 'static>(&mut self, simulator: S) -> Option<Arc<dyn Simulator>> {
        let id = simulator.info().id;
        self.games.insert(id, Arc::new(simulator))
    }

    /// Looks up a simulator.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Simulator>> {
        self.games.get(id).cloned()
    }

    /// Describes one simulator.
    pub fn info(&self, id: &str) -> Option<GameInfo> {
        self.games.get(id).map(|game| game.info())
    }

    /// Describes every simulator.
    pub fn all_info(&self) -> Vec<GameInfo> {
        self.games.values().map(|game| game.info()).collect()
    }

    /// Registered ids in order.
    pub fn ids(&self) -> Vec<&str> {
        self.games.keys().map(String::as_str).collect()
    }

    /// Number of registered simulators.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Runs a simulator by id.
    pub fn run(
        &self,
        id: &str,
        config: &GameConfig,
        ctx: &dyn GameContext,
    ) -> Result<SimulationResult, ArenaError> {
        let game = self.games.get(id).ok_or_else(|| ArenaError::unknown_game(id))?;
        game.compute(config, ctx)
    }
}

impl std::fmt::Debug for GameRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameRegistry")
            .field("games", &self.ids())
            .finish()
    }
}
