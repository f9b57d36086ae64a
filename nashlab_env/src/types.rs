//! Common types exchanged across the simulator contract.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Configuration handed to a simulator: option name -> JSON value.
///
/// Missing keys are filled from the defaults declared in `GameInfo`.
pub type GameConfig = Map<String, Value>;

/// Kind of a tunable parameter, used by the presentation layer to pick a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Int,
    Float,
    Select,
}

/// Schema entry for one simulator parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: ParamKind,

    pub default: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Allowed values for `ParamKind::Select`
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<String>,

    pub description: String,
}

impl ParameterSpec {
    /// Integer parameter with an inclusive range.
    pub fn int(name: &str, default: i64, min: i64, max: i64, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Int,
            default: Value::from(default),
            min: Some(min as f64),
            max: Some(max as f64),
            options: Vec::new(),
            description: description.to_string(),
        }
    }

    /// Real-valued parameter with an inclusive range.
    pub fn float(name: &str, default: f64, min: f64, max: f64, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Float,
            default: Value::from(default),
            min: Some(min),
            max: Some(max),
            options: Vec::new(),
            description: description.to_string(),
        }
    }

    /// Choice among a fixed list of names.
    pub fn select(name: &str, default: &str, options: &[&str], description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Select,
            default: Value::from(default),
            min: None,
            max: None,
            options: options.iter().map(|o| o.to_string()).collect(),
            description: description.to_string(),
        }
    }
}

/// Static description of a simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfo {
    /// Registry identifier (e.g., "network_contagion")
    pub id: String,

    /// Human readable name
    pub name: String,

    /// Grouping used by the catalogue (e.g., "innovation")
    pub category: String,

    /// Difficulty tier (1 = classical, 3 = advanced)
    pub tier: u8,

    pub short_description: String,
    pub long_description: String,
    pub parameters: Vec<ParameterSpec>,

    /// Whether the simulator can be run
    pub available: bool,

    /// Where the simulation executes ("server")
    pub engine: String,

    pub tags: Vec<String>,

    /// Markdown explanation of the theory behind the game
    pub theory_card: String,
}

impl GameInfo {
    /// Looks up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Builds a configuration holding every parameter's default.
    pub fn default_config(&self) -> GameConfig {
        self.parameters
            .iter()
            .map(|p| (p.name.clone(), p.default.clone()))
            .collect()
    }
}

/// One observation of a simulated round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundData {
    /// 1-based round number
    pub round_num: u32,

    /// Actions taken this round (simulator specific)
    pub actions: Vec<Value>,

    /// Payoffs realized this round (may be an aggregate placeholder)
    pub payoffs: Vec<f64>,

    /// Simulator specific state snapshot
    pub state: Map<String, Value>,
}

/// A named equilibrium concept reported alongside the trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    pub name: String,
    pub strategies: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub payoffs: Vec<f64>,

    pub description: String,
}

/// Execution metadata attached to every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Wall (or virtual) time spent in `compute`, rounded to 0.01 ms
    pub compute_time_ms: f64,

    /// Where the simulation executed
    pub engine: String,

    /// Seed of the context that produced this result
    pub seed: u64,
}

/// Full output of one simulator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub game_id: String,

    /// Configuration as received (before defaults were applied)
    pub config: GameConfig,

    pub rounds: Vec<RoundData>,
    pub equilibria: Vec<Equilibrium>,
    pub summary: Map<String, Value>,
    pub metadata: ResultMetadata,
}

/// Rounds `value` to `decimals` decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
