//! Network Contagion simulator - strategy spread on configurable topologies.
//!
//! Glues the Topology Generator and the Contagion Dynamics Engine to the
//! `Simulator` contract: parses the option map, derives one random stream
//! per subsystem from the context, and assembles the result payload.

use crate::contagion::{ContagionEngine, ContagionOutcome, PayoffMatrix, CASCADE_ADOPTION};
use crate::graph::Graph;
use crate::topology::Topology;

use nashlab_env::{
    round_to, ArenaError, Equilibrium, GameConfig, GameContext, GameInfo, ParameterSpec,
    ResultMetadata, RoundData, SimulationResult, Simulator,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

/// Registry id of this simulator.
pub const GAME_ID: &str = "network_contagion";

/// Random stream used for graph construction.
const GRAPH_STREAM: u64 = 1;

/// Random stream used for adopter seeding.
const DYNAMICS_STREAM: u64 = 2;

/// Typed view of the simulator options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContagionConfig {
    /// Number of agents
    pub n_nodes: usize,

    /// Graph family
    pub topology: Topology,

    /// Initial fraction playing B
    pub initial_adopters: f64,

    /// Round budget
    pub rounds: u32,

    /// Coordination game payoffs
    pub payoffs: PayoffMatrix,
}

impl Default for ContagionConfig {
    fn default() -> Self {
        Self {
            n_nodes: 100,
            topology: Topology::SmallWorld,
            initial_adopters: 0.1,
            rounds: 50,
            payoffs: PayoffMatrix::default(),
        }
    }
}

impl ContagionConfig {
    /// Sets the node count.
    pub fn with_nodes(mut self, n_nodes: usize) -> Self {
        self.n_nodes = n_nodes;
        self
    }

    /// Sets the topology.
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Sets the initial adopter fraction.
    pub fn with_initial_adopters(mut self, fraction: f64) -> Self {
        self.initial_adopters = fraction;
        self
    }

    /// Sets the round budget.
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Sets the payoff matrix.
    pub fn with_payoffs(mut self, payoffs: PayoffMatrix) -> Self {
        self.payoffs = payoffs;
        self
    }

    /// Reads the option map, filling missing keys with defaults.
    ///
    /// Unknown topology names fall back to grid. Values of the wrong type,
    /// `n_nodes < 1`, `rounds < 1` and `initial_adopters` outside `(0, 1]`
    /// are rejected.
    pub fn from_config(config: &GameConfig) -> Result<Self, ArenaError> {
        let defaults = Self::default();

        let n_nodes = read_int(config, "n_nodes", defaults.n_nodes as i64)?;
        if n_nodes < 1 {
            return Err(ArenaError::invalid("n_nodes", "must be at least 1"));
        }

        let rounds = read_int(config, "rounds", defaults.rounds as i64)?;
        if rounds < 1 || rounds > u32::MAX as i64 {
            return Err(ArenaError::invalid("rounds", "must be a positive 32-bit count"));
        }

        let initial_adopters = read_float(config, "initial_adopters", defaults.initial_adopters)?;
        if !(initial_adopters > 0.0 && initial_adopters <= 1.0) {
            return Err(ArenaError::invalid(
                "initial_adopters",
                format!("{} is outside (0, 1]", initial_adopters),
            ));
        }

        let topology = match config.get("topology") {
            None | Some(Value::Null) => defaults.topology,
            Some(Value::String(name)) => Topology::from_name(name),
            Some(other) => {
                return Err(ArenaError::invalid(
                    "topology",
                    format!("expected a name, got {}", other),
                ))
            }
        };

        let payoffs = PayoffMatrix::new(
            read_float(config, "payoff_AA", defaults.payoffs.aa)?,
            read_float(config, "payoff_BB", defaults.payoffs.bb)?,
            read_float(config, "payoff_AB", defaults.payoffs.ab)?,
        );

        Ok(Self {
            n_nodes: n_nodes as usize,
            topology,
            initial_adopters,
            rounds: rounds as u32,
            payoffs,
        })
    }

    /// Writes the options back into a map (inverse of `from_config`).
    pub fn to_config(&self) -> GameConfig {
        let mut config = Map::new();
        config.insert("n_nodes".into(), json!(self.n_nodes));
        config.insert("topology".into(), json!(self.topology.name()));
        config.insert("initial_adopters".into(), json!(self.initial_adopters));
        config.insert("rounds".into(), json!(self.rounds));
        config.insert("payoff_AA".into(), json!(self.payoffs.aa));
        config.insert("payoff_BB".into(), json!(self.payoffs.bb));
        config.insert("payoff_AB".into(), json!(self.payoffs.ab));
        config
    }

    /// Generates the graph and runs the dynamics with streams from `ctx`.
    pub fn simulate(&self, ctx: &dyn GameContext) -> ContagionRun {
        let mut graph_rng = ctx.derive_rng(GRAPH_STREAM);
        let mut dynamics_rng = ctx.derive_rng(DYNAMICS_STREAM);

        let graph = self.topology.generate(self.n_nodes, &mut graph_rng);
        let outcome = ContagionEngine::new(&graph, self.payoffs).run(
            self.initial_adopters,
            self.rounds,
            &mut dynamics_rng,
        );

        ContagionRun {
            config: self.clone(),
            graph,
            outcome,
        }
    }
}

/// Graph and trajectory of one invocation.
#[derive(Debug, Clone)]
pub struct ContagionRun {
    pub config: ContagionConfig,
    pub graph: Graph,
    pub outcome: ContagionOutcome,
}

impl ContagionRun {
    /// Per-round records in the contract's `RoundData` shape.
    pub fn round_data(&self) -> Vec<RoundData> {
        self.outcome
            .trace
            .iter()
            .map(|record| {
                let codes: Vec<Value> = record
                    .strategies
                    .iter()
                    .map(|s| Value::from(s.code()))
                    .collect();

                let mut state = Map::new();
                state.insert(
                    "adoption_rate".into(),
                    json!(round_to(record.adoption_rate, 4)),
                );
                state.insert("switches".into(), json!(record.switches));
                state.insert("node_strategies".into(), Value::Array(codes.clone()));

                RoundData {
                    round_num: record.round,
                    actions: codes,
                    payoffs: vec![0.0],
                    state,
                }
            })
            .collect()
    }

    /// The summary object handed to result assembly.
    pub fn summary(&self) -> Map<String, Value> {
        let summary = &self.outcome.summary;
        let edges: Vec<[usize; 2]> = self.graph.edges().into_iter().map(|(a, b)| [a, b]).collect();

        // Flag follows the reported (rounded) rate
        let final_adoption_rate = round_to(summary.final_adoption_rate, 4);

        let mut map = Map::new();
        map.insert("final_adoption_rate".into(), json!(final_adoption_rate));
        map.insert(
            "cascade_occurred".into(),
            json!(final_adoption_rate > CASCADE_ADOPTION),
        );
        map.insert("rounds_to_stable".into(), json!(summary.rounds_to_stable));
        map.insert(
            "predicted_threshold".into(),
            json!(round_to(summary.predicted_threshold, 4)),
        );
        map.insert("topology".into(), json!(self.config.topology.name()));
        map.insert(
            "network".into(),
            json!({ "nodes": self.graph.node_count(), "edges": edges }),
        );
        map
    }

    /// The threshold annotation.
    pub fn equilibrium(&self) -> Equilibrium {
        let q = self.outcome.summary.predicted_threshold;
        let adoption = self.outcome.summary.final_adoption_rate;

        Equilibrium {
            name: "Contagion Threshold".into(),
            strategies: vec![format!("q = {:.3}", q)],
            payoffs: Vec::new(),
            description: format!(
                "Cascade occurs when neighborhood adoption > {:.1}%. Final adoption: {:.1}%.",
                q * 100.0,
                adoption * 100.0
            ),
        }
    }
}

/// The network contagion simulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkContagion;

impl NetworkContagion {
    pub fn new() -> Self {
        Self
    }
}

impl Simulator for NetworkContagion {
    fn info(&self) -> GameInfo {
        GameInfo {
            id: GAME_ID.into(),
            name: "Network Contagion".into(),
            category: "innovation".into(),
            tier: 3,
            short_description: "Watch strategies spread through a network like wildfire.".into(),
            long_description: "Place agents on a configurable network topology (random, \
                small-world, scale-free, or grid). Each agent plays a 2x2 coordination game \
                with its neighbors and adopts the strategy that would have earned the highest \
                payoff. Observe how tipping points, cascades, and stable coexistence emerge \
                from local interactions on global structures."
                .into(),
            parameters: vec![
                ParameterSpec::int("n_nodes", 100, 20, 500, "Number of agents in the network"),
                ParameterSpec::select(
                    "topology",
                    "small_world",
                    &["random_erdos_renyi", "small_world", "scale_free", "grid"],
                    "Network topology",
                ),
                ParameterSpec::float(
                    "initial_adopters",
                    0.1,
                    0.01,
                    0.5,
                    "Fraction of initial adopters (strategy B)",
                ),
                ParameterSpec::int("rounds", 50, 10, 200, "Number of update rounds"),
                ParameterSpec::float(
                    "payoff_AA",
                    3.0,
                    0.0,
                    10.0,
                    "Payoff when both play A (incumbent)",
                ),
                ParameterSpec::float(
                    "payoff_BB",
                    4.0,
                    0.0,
                    10.0,
                    "Payoff when both play B (innovation)",
                ),
                ParameterSpec::float("payoff_AB", 0.0, 0.0, 10.0, "Payoff when A meets B"),
            ],
            available: true,
            engine: "server".into(),
            tags: ["network", "contagion", "cascade", "topology", "innovation"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            theory_card: "## Network Effects in Game Theory\n\
                Morris (2000) showed that in network coordination games, adoption cascades \
                depend on a critical threshold q = (payoff_AA - payoff_AB) / \
                (payoff_AA - payoff_AB + payoff_BB - payoff_AB).\n\n\
                ## Tipping Points\n\
                When the fraction of B-adopters crosses ~q in a node's neighborhood, \
                switching to B becomes rational, triggering a cascade.\n\n\
                ## Topology Matters\n\
                - **Scale-free**: hubs accelerate or block cascades\n\
                - **Small-world**: short paths enable rapid diffusion\n\
                - **Grid**: slow, wave-like propagation"
                .into(),
        }
    }

    fn compute(
        &self,
        config: &GameConfig,
        ctx: &dyn GameContext,
    ) -> Result<SimulationResult, ArenaError> {
        let started = ctx.elapsed();
        let parsed = ContagionConfig::from_config(config)?;

        debug!(
            "network_contagion: n={} topology={} init={} rounds={} seed={}",
            parsed.n_nodes,
            parsed.topology,
            parsed.initial_adopters,
            parsed.rounds,
            ctx.seed()
        );

        let run = parsed.simulate(ctx);

        info!(
            "network_contagion finished: {} rounds, adoption {:.1}%, cascade={}",
            run.outcome.summary.rounds_to_stable,
            run.outcome.summary.final_adoption_rate * 100.0,
            run.outcome.summary.cascade_occurred
        );

        let elapsed = ctx.elapsed().saturating_sub(started);
        Ok(SimulationResult {
            game_id: GAME_ID.into(),
            config: config.clone(),
            rounds: run.round_data(),
            equilibria: vec![run.equilibrium()],
            summary: run.summary(),
            metadata: ResultMetadata {
                compute_time_ms: round_to(elapsed.as_secs_f64() * 1000.0, 2),
                engine: "server".into(),
                seed: ctx.seed(),
            },
        })
    }
}

/// Reads an integer option; integral floats such as `100.0` are accepted.
fn read_int(config: &GameConfig, key: &str, default: i64) -> Result<i64, ArenaError> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| ArenaError::invalid(key, format!("expected an integer, got {}", value))),
    }
}

/// Reads a finite real option.
fn read_float(config: &GameConfig, key: &str, default: f64) -> Result<f64, ArenaError> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_f64()
            .filter(|f| f.is_finite())
            .ok_or_else(|| ArenaError::invalid(key, format!("expected a number, got {}", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contagion::Strategy;
    use approx::assert_relative_eq;
    use nashlab_env::SystemContext;

    fn config(value: Value) -> GameConfig {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_defaults_when_empty() {
        let parsed = ContagionConfig::from_config(&GameConfig::new()).unwrap();
        assert_eq!(parsed, ContagionConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let parsed = ContagionConfig::from_config(&config(json!({
            "n_nodes": 64.0,
            "topology": "scale_free",
            "initial_adopters": 0.25,
            "rounds": 12,
            "payoff_AA": 1,
            "payoff_BB": 2.5,
            "payoff_AB": 0.5,
        })))
        .unwrap();

        assert_eq!(parsed.n_nodes, 64);
        assert_eq!(parsed.topology, Topology::ScaleFree);
        assert_eq!(parsed.rounds, 12);
        assert_eq!(parsed.payoffs, PayoffMatrix::new(1.0, 2.5, 0.5));
    }

    #[test]
    fn test_unknown_topology_is_grid() {
        let parsed = ContagionConfig::from_config(&config(json!({ "topology": "torus" }))).unwrap();
        assert_eq!(parsed.topology, Topology::Grid);
    }

    #[test]
    fn test_rejects_contract_violations() {
        for bad in [
            json!({ "n_nodes": 0 }),
            json!({ "n_nodes": -5 }),
            json!({ "n_nodes": "many" }),
            json!({ "rounds": 0 }),
            json!({ "initial_adopters": 0.0 }),
            json!({ "initial_adopters": 1.5 }),
            json!({ "payoff_AA": "high" }),
            json!({ "topology": 3 }),
        ] {
            let result = ContagionConfig::from_config(&config(bad.clone()));
            assert!(
                matches!(result, Err(ArenaError::InvalidParameter { .. })),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_config_roundtrip() {
        let original = ContagionConfig::default()
            .with_nodes(30)
            .with_topology(Topology::ErdosRenyi)
            .with_rounds(7);
        let parsed = ContagionConfig::from_config(&original.to_config()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_info_defaults_parse() {
        let info = NetworkContagion.info();
        assert_eq!(info.id, GAME_ID);
        assert_eq!(info.parameters.len(), 7);

        let parsed = ContagionConfig::from_config(&info.default_config()).unwrap();
        assert_eq!(parsed, ContagionConfig::default());
    }

    #[test]
    fn test_compute_result_shape() {
        let ctx = SystemContext::new();
        let result = NetworkContagion
            .compute(&config(json!({ "n_nodes": 49, "topology": "grid", "rounds": 20 })), &ctx)
            .unwrap();

        assert_eq!(result.game_id, GAME_ID);
        assert!(!result.rounds.is_empty() && result.rounds.len() <= 20);
        assert_eq!(result.summary["topology"], "grid");
        assert_eq!(result.summary["network"]["nodes"], 49);
        // 7x7 lattice
        assert_eq!(result.summary["network"]["edges"].as_array().map(Vec::len), Some(84));
        assert_eq!(result.equilibria[0].strategies, vec!["q = 0.429".to_string()]);
        assert_eq!(result.metadata.engine, "server");
        assert_eq!(result.metadata.seed, ctx.seed());

        let first = &result.rounds[0];
        assert_eq!(first.round_num, 1);
        assert_eq!(first.actions.len(), 49);
        assert_eq!(first.payoffs, vec![0.0]);
        assert_eq!(first.state["node_strategies"].as_array().map(Vec::len), Some(49));
    }

    #[test]
    fn test_summary_flag_follows_rounded_rate() {
        // 10001 / 20001 = 0.500025 is reported as 0.5, which is not a cascade
        let n = 20001;
        let graph = Graph::empty(n);
        let mut initial = vec![Strategy::Incumbent; n];
        for slot in initial.iter_mut().take(10001) {
            *slot = Strategy::Innovation;
        }
        let config = ContagionConfig::default().with_nodes(n).with_rounds(4);
        let outcome = ContagionEngine::new(&graph, config.payoffs).run_from(initial, 4);
        assert!(outcome.summary.cascade_occurred);

        let run = ContagionRun {
            config,
            graph,
            outcome,
        };
        let summary = run.summary();
        assert_eq!(summary["final_adoption_rate"], 0.5);
        assert_eq!(summary["cascade_occurred"], false);
    }

    #[test]
    fn test_compute_huge_round_budget() {
        let result = NetworkContagion
            .compute(
                &config(json!({ "n_nodes": 1, "topology": "grid", "rounds": 4_000_000_000u64 })),
                &SystemContext::new(),
            )
            .unwrap();

        // A single isolated node never switches, so round 4 ends the run
        assert_eq!(result.rounds.len(), 4);
        assert_eq!(result.summary["rounds_to_stable"], 4);
    }

    #[test]
    fn test_summary_cascade_flag_matches_rate() {
        let ctx = SystemContext::new();
        let result = NetworkContagion.compute(&GameConfig::new(), &ctx).unwrap();

        let rate = result.summary["final_adoption_rate"].as_f64().unwrap_or(-1.0);
        let cascade = result.summary["cascade_occurred"].as_bool().unwrap_or(false);
        assert!((0.0..=1.0).contains(&rate));
        assert_eq!(cascade, rate > 0.5);
        assert_relative_eq!(
            result.summary["predicted_threshold"].as_f64().unwrap_or(0.0),
            0.4286
        );
    }
}
