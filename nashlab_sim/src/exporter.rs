//! JSON exporter for network visualization.
//!
//! Exports a contagion run as JSON: the realized graph once, then one frame
//! of node strategies per simulated round.

use nashlab_core::{ContagionRun, RoundRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single round of simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// 1-based round number
    pub round: u32,

    /// Fraction of nodes playing B
    pub adoption_rate: f64,

    /// Nodes that changed strategy this round
    pub switches: usize,

    /// Strategy code per node (0 = A, 1 = B)
    pub strategies: Vec<u8>,
}

impl From<&RoundRecord> for SimFrame {
    fn from(record: &RoundRecord) -> Self {
        Self {
            round: record.round,
            adoption_rate: record.adoption_rate,
            switches: record.switches,
            strategies: record.strategies.iter().map(|s| s.code()).collect(),
        }
    }
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Topology name
    pub topology: String,

    /// Node count
    pub nodes: usize,

    /// Edge list with `a < b`
    pub edges: Vec<[usize; 2]>,

    /// Predicted tipping threshold
    pub predicted_threshold: f64,

    /// Strategy codes before round 1
    pub initial: Vec<u8>,

    /// All frames
    pub frames: Vec<SimFrame>,

    /// Final results
    pub passed: bool,

    /// Final adoption rate once finalized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_adoption_rate: Option<f64>,
}

impl SimExport {
    /// Creates a new export container for a run's graph.
    pub fn new(scenario: &str, seed: u64, run: &ContagionRun) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            topology: run.config.topology.name().to_string(),
            nodes: run.graph.node_count(),
            edges: run.graph.edges().into_iter().map(|(a, b)| [a, b]).collect(),
            predicted_threshold: run.outcome.summary.predicted_threshold,
            initial: run.outcome.initial.iter().map(|s| s.code()).collect(),
            frames: Vec::new(),
            passed: false,
            final_adoption_rate: None,
        }
    }

    /// Creates an export holding every round of `run`.
    pub fn from_run(scenario: &str, seed: u64, run: &ContagionRun) -> Self {
        let mut export = Self::new(scenario, seed, run);
        for record in &run.outcome.trace {
            export.add_frame(SimFrame::from(record));
        }
        export
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, final_adoption_rate: Option<f64>) {
        self.passed = passed;
        self.final_adoption_rate = final_adoption_rate;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
