//! nashlab Core - Network Contagion Engine
//!
//! Simulates how a new convention spreads through a population whose
//! members only interact with their network neighbors:
//! 1. **Topology Generator**: Erdos-Renyi, small-world, scale-free and grid graphs
//! 2. **Contagion Dynamics Engine**: synchronous best response in a 2x2 coordination game
//! 3. **Threshold Prediction**: the Morris tipping threshold `q` from the payoffs alone
//!
//! The `NetworkContagion` simulator exposes all of it through the
//! `nashlab_env::Simulator` contract, and `GameRegistry` lists it by id.

pub mod contagion;
pub mod graph;
pub mod network_contagion;
pub mod registry;
pub mod topology;

// Re-export key types for convenience
pub use contagion::{
    contagion_threshold, ContagionEngine, ContagionOutcome, ContagionSummary, PayoffMatrix,
    Regime, RoundRecord, Strategy,
};
pub use graph::{Graph, GraphError};
pub use network_contagion::{ContagionConfig, ContagionRun, NetworkContagion};
pub use registry::GameRegistry;
pub use topology::Topology;
