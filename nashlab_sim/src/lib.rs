//! Nashlab Deterministic Simulation Harness
//!
//! Runs the network contagion simulator under fully controlled randomness
//! and checks every run against the invariants a correct engine must hold.
//!
//! # Core Principle: One Seed, One Trajectory
//!
//! All sources of non-determinism are pinned:
//! - **Time**: `SeededContext` exposes a virtual clock that never moves on its own
//! - **Randomness**: graph and dynamics streams are derived from a single 64-bit seed
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   ScenarioRunner                     │
//! │  ┌──────────────┐   ┌──────────────────────────────┐ │
//! │  │ ScenarioId   │──►│ ContagionConfig::simulate    │ │
//! │  │ (presets)    │   │  (SeededContext streams)     │ │
//! │  └──────────────┘   └──────────────┬───────────────┘ │
//! │                                    │ ContagionRun    │
//! │                     ┌──────────────▼───────────────┐ │
//! │                     │           Oracle             │ │
//! │                     │   (invariant replay checks)  │ │
//! │                     └──────────────┬───────────────┘ │
//! │                                    ▼                 │
//! │                   ScenarioResult / SimExport         │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use nashlab_sim::{ScenarioRunner, ScenarioId};
//!
//! let result = ScenarioRunner::new(42).run(ScenarioId::SmallWorldCascade);
//! assert!(result.passed);
//! ```

mod context;
mod exporter;
mod oracle;
mod runner;
pub mod scenarios;

pub use context::SeededContext;
pub use exporter::{SimExport, SimFrame};
pub use oracle::{Oracle, Violation};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use scenarios::{Expectation, ScenarioId};
