//! Scenario runner - executes preset contagion scenarios under a fixed seed.

use crate::context::SeededContext;
use crate::oracle::Oracle;
use crate::scenarios::ScenarioId;

use nashlab_core::{ContagionConfig, ContagionRun, GameRegistry};
use nashlab_env::{ArenaError, GameConfig, SimulationResult};
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether the run satisfied every oracle check
    pub passed: bool,

    /// Rounds actually simulated
    pub rounds_simulated: usize,

    /// Fraction of nodes playing B at the end
    pub final_adoption_rate: f64,

    /// Whether the innovation took over
    pub cascade_occurred: bool,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioMetrics {
    /// Node count of the realized graph
    pub nodes: usize,

    /// Edge count of the realized graph
    pub edges: usize,

    /// Mean degree
    pub average_degree: f64,

    /// Nodes without neighbors
    pub isolated_nodes: usize,

    /// Strategy changes summed over all rounds
    pub total_switches: usize,

    /// Highest adoption rate seen in any round
    pub peak_adoption_rate: f64,

    /// Whether the run stopped early at a fixed point
    pub converged: bool,
}

impl ScenarioMetrics {
    fn from_run(run: &ContagionRun) -> Self {
        let trace = &run.outcome.trace;
        Self {
            nodes: run.graph.node_count(),
            edges: run.graph.edge_count(),
            average_degree: run.graph.average_degree(),
            isolated_nodes: run.graph.isolated_nodes().len(),
            total_switches: trace.iter().map(|r| r.switches).sum(),
            peak_adoption_rate: trace.iter().map(|r| r.adoption_rate).fold(0.0, f64::max),
            converged: run.outcome.summary.converged,
        }
    }
}

/// Runs contagion scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Round budget override
    rounds: Option<u32>,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self { seed, rounds: None }
    }

    /// Overrides the round budget of every scenario.
    pub fn with_rounds(mut self, rounds: Option<u32>) -> Self {
        self.rounds = rounds;
        self
    }

    /// Returns the seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the configuration a scenario will run with.
    pub fn config_for(&self, scenario: ScenarioId) -> ContagionConfig {
        let config = scenario.config();
        match self.rounds {
            Some(rounds) => config.with_rounds(rounds),
            None => config,
        }
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        self.run_detailed(scenario).0
    }

    /// Runs a scenario and also returns the full run for export.
    pub fn run_detailed(&self, scenario: ScenarioId) -> (ScenarioResult, ContagionRun) {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let config = self.config_for(scenario);
        debug!(
            "  n={} topology={} init={} rounds={} payoffs={:?}",
            config.n_nodes, config.topology, config.initial_adopters, config.rounds, config.payoffs
        );

        let ctx = SeededContext::new(self.seed);
        let run = config.simulate(&ctx);

        let violations = Oracle::new()
            .with_expectation(scenario.expectation())
            .check(&run);
        for violation in &violations {
            warn!("  {} violated: {}", scenario.name(), violation);
        }

        let summary = &run.outcome.summary;
        let metrics = ScenarioMetrics::from_run(&run);
        let passed = violations.is_empty();

        info!(
            "{} {}: {} rounds, adoption {:.1}% (peak {:.1}%), {} switches",
            if passed { "PASS" } else { "FAIL" },
            scenario.name(),
            summary.rounds_to_stable,
            summary.final_adoption_rate * 100.0,
            metrics.peak_adoption_rate * 100.0,
            metrics.total_switches
        );

        let result = ScenarioResult {
            scenario,
            seed: self.seed,
            passed,
            rounds_simulated: summary.rounds_to_stable,
            final_adoption_rate: summary.final_adoption_rate,
            cascade_occurred: summary.cascade_occurred,
            failure_reason: if passed {
                None
            } else {
                Some(
                    violations
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join("; "),
                )
            },
            metrics,
        };

        (result, run)
    }

    /// Runs every scenario in order.
    pub fn run_all(&self) -> Vec<ScenarioResult> {
        ScenarioId::all().into_iter().map(|s| self.run(s)).collect()
    }

    /// Runs a registered simulator on an ad-hoc option map.
    pub fn run_game(&self, game_id: &str, config: &GameConfig) -> Result<SimulationResult, ArenaError> {
        let ctx = SeededContext::new(self.seed);
        GameRegistry::with_defaults().run(game_id, config, &ctx)
    }
}
