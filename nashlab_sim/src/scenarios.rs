//! Preset contagion scenarios for deterministic runs.

use nashlab_core::{ContagionConfig, PayoffMatrix, Topology};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// SC-001: Default small-world run (100 nodes, 10% seeds, 3/4/0 game)
    SmallWorldCascade,

    /// SC-002: Wave-like spread on a 10x10 lattice
    GridWave,

    /// SC-003: Hub-dominated preferential-attachment graph
    ScaleFreeHubs,

    /// SC-004: Erdos-Renyi graph, mean degree 6
    RandomMixing,

    /// SC-005: 20-node grid with 4 isolated nodes
    IsolatedFringe,

    /// SC-006: Incumbent so strong the innovation cannot spread
    LockedIn,

    /// SC-007: All payoffs equal, every tie resolves to A
    DegeneratePayoffs,
}

/// What a scenario must show on top of the general invariants.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Expectation {
    /// Required value of `cascade_occurred`
    pub cascade: Option<bool>,

    /// Required final adoption rate
    pub final_adoption: Option<f64>,

    /// Required number of isolated nodes
    pub isolated_nodes: Option<usize>,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::SmallWorldCascade,
            ScenarioId::GridWave,
            ScenarioId::ScaleFreeHubs,
            ScenarioId::RandomMixing,
            ScenarioId::IsolatedFringe,
            ScenarioId::LockedIn,
            ScenarioId::DegeneratePayoffs,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::SmallWorldCascade => "small_world_cascade",
            ScenarioId::GridWave => "grid_wave",
            ScenarioId::ScaleFreeHubs => "scale_free_hubs",
            ScenarioId::RandomMixing => "random_mixing",
            ScenarioId::IsolatedFringe => "isolated_fringe",
            ScenarioId::LockedIn => "locked_in",
            ScenarioId::DegeneratePayoffs => "degenerate_payoffs",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::SmallWorldCascade => "100-node small world, 10% B seeds, q = 3/7",
            ScenarioId::GridWave => "10x10 lattice, 30% B seeds, q = 1/4",
            ScenarioId::ScaleFreeHubs => "300-node preferential attachment, 5% B seeds",
            ScenarioId::RandomMixing => "200-node Erdos-Renyi, 20% B seeds",
            ScenarioId::IsolatedFringe => "20-node grid, nodes 16-19 isolated, must never move",
            ScenarioId::LockedIn => "q = 10/11: isolated B seeds die out",
            ScenarioId::DegeneratePayoffs => "pAA = pBB = pAB: q falls back to 0.5, ties keep A",
        }
    }

    /// Returns the simulator configuration for this scenario.
    pub fn config(&self) -> ContagionConfig {
        let base = ContagionConfig::default();
        match self {
            ScenarioId::SmallWorldCascade => base,
            ScenarioId::GridWave => base
                .with_topology(Topology::Grid)
                .with_initial_adopters(0.3)
                .with_payoffs(PayoffMatrix::new(1.0, 3.0, 0.0)),
            ScenarioId::ScaleFreeHubs => base
                .with_nodes(300)
                .with_topology(Topology::ScaleFree)
                .with_initial_adopters(0.05),
            ScenarioId::RandomMixing => base
                .with_nodes(200)
                .with_topology(Topology::ErdosRenyi)
                .with_initial_adopters(0.2),
            ScenarioId::IsolatedFringe => base
                .with_nodes(20)
                .with_topology(Topology::Grid)
                .with_initial_adopters(0.5)
                .with_rounds(200),
            ScenarioId::LockedIn => base.with_payoffs(PayoffMatrix::new(10.0, 1.0, 0.0)),
            ScenarioId::DegeneratePayoffs => base
                .with_topology(Topology::Grid)
                .with_payoffs(PayoffMatrix::new(5.0, 5.0, 5.0)),
        }
    }

    /// Returns the scenario-specific expectations.
    pub fn expectation(&self) -> Expectation {
        match self {
            ScenarioId::IsolatedFringe => Expectation {
                isolated_nodes: Some(4),
                ..Default::default()
            },
            ScenarioId::LockedIn => Expectation {
                cascade: Some(false),
                ..Default::default()
            },
            ScenarioId::DegeneratePayoffs => Expectation {
                cascade: Some(false),
                final_adoption: Some(0.0),
                isolated_nodes: Some(0),
            },
            _ => Expectation::default(),
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small_world_cascade" | "smallworld" | "sc-001" => Ok(ScenarioId::SmallWorldCascade),
            "grid_wave" | "gridwave" | "sc-002" => Ok(ScenarioId::GridWave),
            "scale_free_hubs" | "scalefree" | "sc-003" => Ok(ScenarioId::ScaleFreeHubs),
            "random_mixing" | "random" | "sc-004" => Ok(ScenarioId::RandomMixing),
            "isolated_fringe" | "fringe" | "sc-005" => Ok(ScenarioId::IsolatedFringe),
            "locked_in" | "lockedin" | "sc-006" => Ok(ScenarioId::LockedIn),
            "degenerate_payoffs" | "degenerate" | "sc-007" => Ok(ScenarioId::DegeneratePayoffs),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
            assert_eq!(scenario.to_string(), scenario.name());
        }
        assert_eq!("SC-006".parse::<ScenarioId>(), Ok(ScenarioId::LockedIn));
        assert!("flash_mob".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_configs_are_within_contract() {
        for scenario in ScenarioId::all() {
            let config = scenario.config();
            assert!(config.n_nodes >= 1, "{}", scenario);
            assert!(config.rounds >= 1, "{}", scenario);
            assert!(config.initial_adopters > 0.0 && config.initial_adopters <= 0.5);
        }
    }

    #[test]
    fn test_degenerate_threshold_is_half() {
        let config = ScenarioId::DegeneratePayoffs.config();
        assert_eq!(config.payoffs.threshold(), 0.5);
    }
}
