//! The Contagion Dynamics Engine - synchronous best response on a graph.
//!
//! Every agent plays a symmetric 2x2 coordination game against each
//! neighbor and, once per round, switches to whichever strategy would have
//! earned more against the neighbors' previous choices.
//!
//! # Round Structure
//!
//! ```text
//! previous vector ──┬─> node 0: count (n_A, n_B) -> best response ─┐
//!                   ├─> node 1: ...                               ├─> next vector
//!                   └─> node n: ...                               ┘
//! ```
//!
//! No node ever sees a neighbor's updated choice within the same round.

use crate::graph::Graph;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

/// Rounds that must elapse before a zero-switch round ends the run.
pub const MIN_ROUNDS_BEFORE_STABLE: u32 = 3;

/// Largest number of round records reserved up front.
const TRACE_PREALLOC: usize = 256;

/// Adoption rate above which a run counts as a cascade.
pub const CASCADE_ADOPTION: f64 = 0.5;

/// One of the two coordination strategies, encoded `0` / `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Strategy {
    /// Strategy A, the incumbent convention
    #[default]
    Incumbent,

    /// Strategy B, the innovation
    Innovation,
}

impl Strategy {
    /// Wire encoding (`A = 0`, `B = 1`).
    pub fn code(self) -> u8 {
        match self {
            Strategy::Incumbent => 0,
            Strategy::Innovation => 1,
        }
    }

    /// Decodes the wire encoding.
    pub fn from_code(code: u8) -> Option<Strategy> {
        match code {
            0 => Some(Strategy::Incumbent),
            1 => Some(Strategy::Innovation),
            _ => None,
        }
    }

    /// Short label used in logs ("A" / "B").
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Incumbent => "A",
            Strategy::Innovation => "B",
        }
    }
}

impl Serialize for Strategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Strategy::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid strategy code {}", code)))
    }
}

/// Symmetric 2x2 coordination game.
///
/// ```text
///          A      B
///   A    pAA    pAB
///   B    pAB    pBB
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffMatrix {
    /// Payoff when both play A
    pub aa: f64,

    /// Payoff when both play B
    pub bb: f64,

    /// Payoff to either side when A meets B
    pub ab: f64,
}

impl Default for PayoffMatrix {
    fn default() -> Self {
        Self {
            aa: 3.0,
            bb: 4.0,
            ab: 0.0,
        }
    }
}

impl PayoffMatrix {
    pub fn new(aa: f64, bb: f64, ab: f64) -> Self {
        Self { aa, bb, ab }
    }

    /// Total payoffs `(payoff_A, payoff_B)` against `n_a` A-neighbors and `n_b` B-neighbors.
    pub fn payoffs(&self, n_a: usize, n_b: usize) -> (f64, f64) {
        let (n_a, n_b) = (n_a as f64, n_b as f64);
        (
            n_a * self.aa + n_b * self.ab,
            n_a * self.ab + n_b * self.bb,
        )
    }

    /// Best response to a neighborhood; ties keep the incumbent.
    pub fn best_response(&self, n_a: usize, n_b: usize) -> Strategy {
        let (payoff_a, payoff_b) = self.payoffs(n_a, n_b);
        if payoff_a >= payoff_b {
            Strategy::Incumbent
        } else {
            Strategy::Innovation
        }
    }

    /// Morris tipping threshold, see [`contagion_threshold`].
    pub fn threshold(&self) -> f64 {
        contagion_threshold(self.aa, self.bb, self.ab)
    }
}

/// Neighborhood share of B above which switching to B pays off.
///
/// `q = (pAA - pAB) / ((pAA - pAB) + (pBB - pAB))`, or `0.5` when the
/// denominator vanishes.
pub fn contagion_threshold(aa: f64, bb: f64, ab: f64) -> f64 {
    let denom = (aa - ab) + (bb - ab);
    if denom == 0.0 {
        0.5
    } else {
        (aa - ab) / denom
    }
}

/// Fraction of nodes playing B; 0.0 for an empty vector.
pub fn adoption_rate(strategies: &[Strategy]) -> f64 {
    if strategies.is_empty() {
        return 0.0;
    }
    let adopters = strategies
        .iter()
        .filter(|&&s| s == Strategy::Innovation)
        .count();
    adopters as f64 / strategies.len() as f64
}

/// Observation recorded after each round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// 1-based round number
    pub round: u32,

    /// Full strategy vector after the round
    pub strategies: Vec<Strategy>,

    /// Fraction of B after the round
    pub adoption_rate: f64,

    /// Nodes whose strategy changed this round
    pub switches: usize,
}

/// Terminal classification of a run (summary only, never drives the dynamics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Nobody plays B
    Extinct,

    /// Everybody plays B
    Saturated,

    /// Both strategies survive
    Coexistence,
}

/// Summary statistics of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContagionSummary {
    pub final_adoption_rate: f64,

    /// `final_adoption_rate > 0.5`
    pub cascade_occurred: bool,

    /// Rounds actually simulated
    pub rounds_to_stable: usize,

    /// Morris threshold from the payoffs alone
    pub predicted_threshold: f64,

    /// Whether the run ended on a zero-switch round
    pub converged: bool,
}

impl ContagionSummary {
    /// Classifies the terminal adoption level.
    pub fn regime(&self) -> Regime {
        if self.final_adoption_rate <= 0.0 {
            Regime::Extinct
        } else if self.final_adoption_rate >= 1.0 {
            Regime::Saturated
        } else {
            Regime::Coexistence
        }
    }
}

/// Trace and summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContagionOutcome {
    /// Strategy vector the run started from
    pub initial: Vec<Strategy>,

    /// One record per simulated round
    pub trace: Vec<RoundRecord>,

    pub summary: ContagionSummary,
}

impl ContagionOutcome {
    /// Strategy vector after the last simulated round.
    pub fn final_strategies(&self) -> &[Strategy] {
        self.trace
            .last()
            .map(|r| r.strategies.as_slice())
            .unwrap_or(self.initial.as_slice())
    }
}

/// Runs best-response dynamics over a borrowed, immutable graph.
pub struct ContagionEngine<'g> {
    graph: &'g Graph,
    payoffs: PayoffMatrix,
}

impl<'g> ContagionEngine<'g> {
    /// Creates an engine for the given graph and game.
    pub fn new(graph: &'g Graph, payoffs: PayoffMatrix) -> Self {
        Self { graph, payoffs }
    }

    /// Returns the payoff matrix.
    pub fn payoffs(&self) -> &PayoffMatrix {
        &self.payoffs
    }

    /// Number of initial adopters: `max(1, round(n * fraction))`, capped at `n`.
    pub fn seed_count(n: usize, init_fraction: f64) -> usize {
        if n == 0 {
            return 0;
        }
        let wanted = (n as f64 * init_fraction).round();
        let wanted = if wanted.is_finite() && wanted > 0.0 {
            wanted as usize
        } else {
            0
        };
        wanted.max(1).min(n)
    }

    /// All-A vector with a uniformly random subset switched to B.
    pub fn seed_adopters<R: Rng + ?Sized>(&self, init_fraction: f64, rng: &mut R) -> Vec<Strategy> {
        let n = self.graph.node_count();
        let mut strategies = vec![Strategy::Incumbent; n];
        let count = Self::seed_count(n, init_fraction);

        for node in index::sample(rng, n, count).iter() {
            strategies[node] = Strategy::Innovation;
        }
        strategies
    }

    /// Computes the next vector from `current` and the number of switches.
    ///
    /// Isolated nodes keep their strategy.
    pub fn step(&self, current: &[Strategy]) -> (Vec<Strategy>, usize) {
        let mut next = current.to_vec();
        let mut switches = 0;

        for (node, slot) in next.iter_mut().enumerate() {
            let neighbors = self.graph.neighbors(node);
            if neighbors.is_empty() {
                continue;
            }

            let n_b = neighbors
                .iter()
                .filter(|&&nb| current[nb] == Strategy::Innovation)
                .count();
            let n_a = neighbors.len() - n_b;

            let best = self.payoffs.best_response(n_a, n_b);
            if best != current[node] {
                switches += 1;
            }
            *slot = best;
        }

        (next, switches)
    }

    /// Iterates from a given vector until stable or out of rounds.
    pub fn run_from(&self, initial: Vec<Strategy>, rounds: u32) -> ContagionOutcome {
        // Capped reserve: the budget can be far larger than the trace
        let mut trace = Vec::with_capacity((rounds as usize).min(TRACE_PREALLOC));
        let mut current = initial.clone();
        let mut converged = false;

        for round in 1..=rounds {
            let (next, switches) = self.step(&current);
            current = next;

            trace.push(RoundRecord {
                round,
                strategies: current.clone(),
                adoption_rate: adoption_rate(&current),
                switches,
            });

            if switches == 0 && round > MIN_ROUNDS_BEFORE_STABLE {
                converged = true;
                break;
            }
        }

        let final_adoption_rate = adoption_rate(&current);
        let summary = ContagionSummary {
            final_adoption_rate,
            cascade_occurred: final_adoption_rate > CASCADE_ADOPTION,
            rounds_to_stable: trace.len(),
            predicted_threshold: self.payoffs.threshold(),
            converged,
        };

        debug!(
            "Contagion finished after {} rounds: adoption {:.3}, converged={}",
            summary.rounds_to_stable, summary.final_adoption_rate, summary.converged
        );

        ContagionOutcome {
            initial,
            trace,
            summary,
        }
    }

    /// Seeds adopters from `rng` and runs the dynamics.
    pub fn run<R: Rng + ?Sized>(&self, init_fraction: f64, rounds: u32, rng: &mut R) -> ContagionOutcome {
        let initial = self.seed_adopters(init_fraction, rng);
        self.run_from(initial, rounds)
    }
}

/// Runs the dynamics on `graph` with the given game and seeding fraction.
pub fn run<R: Rng + ?Sized>(
    graph: &Graph,
    init_fraction: f64,
    rounds: u32,
    payoffs: PayoffMatrix,
    rng: &mut R,
) -> ContagionOutcome {
    ContagionEngine::new(graph, payoffs).run(init_fraction, rounds, rng)
}
