//! nashlab Simulator Contract
//!
//! This crate provides the uniform interface every nashlab simulator
//! implements, so that a presentation layer can list, describe and run
//! games without knowing anything about their internals.
//!
//! # Core Concept: Injected Entropy
//!
//! Simulators never touch hidden global state:
//! - Time (`elapsed()`) comes from the context clock
//! - Randomness (`derive_rng()`) comes from a seeded ChaCha stream
//!
//! By deriving all entropy from a single 64-bit seed, any run becomes
//! reproducible via its seed number.
//!
//! # Example
//!
//! ```ignore
//! use nashlab_env::{GameConfig, GameContext, Simulator, SystemContext};
//!
//! fn run_default<S: Simulator>(sim: &S) {
//!     let ctx = SystemContext::new();
//!     let result = sim.compute(&GameConfig::new(), &ctx)?;
//!     println!("{} rounds", result.rounds.len());
//! }
//! ```

mod context;
mod error;
mod simulator;
mod system_impl;
mod types;

pub use context::{mix_seed, GameContext};
pub use error::ArenaError;
pub use simulator::Simulator;
pub use system_impl::SystemContext;
pub use types::{
    round_to, Equilibrium, GameConfig, GameInfo, ParamKind, ParameterSpec, ResultMetadata,
    RoundData, SimulationResult,
};
