//! Invariant oracle for contagion runs.
//!
//! The Oracle knows what every correct run must look like, independent of
//! the random draws that produced it:
//! - The graph is simple, symmetric and has the requested size
//! - The trace is consistent with synchronous best response
//! - The summary agrees with the trace and with the threshold formula

use crate::scenarios::Expectation;

use nashlab_core::contagion::{adoption_rate, contagion_threshold, MIN_ROUNDS_BEFORE_STABLE};
use nashlab_core::{ContagionEngine, ContagionRun, Strategy};
use std::fmt;

/// Tolerance for comparing derived floats.
const EPSILON: f64 = 1e-9;

/// A single failed check.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Short name of the check
    pub check: &'static str,

    /// What went wrong
    pub detail: String,
}

impl Violation {
    fn new(check: &'static str, detail: impl Into<String>) -> Self {
        Self {
            check,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.check, self.detail)
    }
}

/// The Oracle - validates finished runs.
#[derive(Debug, Clone, Default)]
pub struct Oracle {
    expectation: Expectation,
}

impl Oracle {
    /// Creates an oracle that checks only the general invariants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds scenario-specific expectations.
    pub fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.expectation = expectation;
        self
    }

    /// Runs every check and returns the violations found.
    pub fn check(&self, run: &ContagionRun) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.check_graph(run, &mut violations);
        self.check_trace(run, &mut violations);
        self.check_summary(run, &mut violations);
        self.check_expectation(run, &mut violations);
        violations
    }

    fn check_graph(&self, run: &ContagionRun, out: &mut Vec<Violation>) {
        if let Err(e) = run.graph.validate() {
            out.push(Violation::new("graph_simple", e.to_string()));
        }
        if run.graph.node_count() != run.config.n_nodes {
            out.push(Violation::new(
                "graph_size",
                format!("{} nodes, expected {}", run.graph.node_count(), run.config.n_nodes),
            ));
        }
    }

    fn check_trace(&self, run: &ContagionRun, out: &mut Vec<Violation>) {
        let outcome = &run.outcome;
        let trace = &outcome.trace;
        let n = run.config.n_nodes;

        let seeded = outcome
            .initial
            .iter()
            .filter(|&&s| s == Strategy::Innovation)
            .count();
        let wanted = ContagionEngine::seed_count(n, run.config.initial_adopters);
        if seeded != wanted {
            out.push(Violation::new(
                "initial_adopters",
                format!("{} seeded, expected {}", seeded, wanted),
            ));
        }

        if trace.is_empty() || trace.len() > run.config.rounds as usize {
            out.push(Violation::new(
                "round_budget",
                format!("{} rounds for a budget of {}", trace.len(), run.config.rounds),
            ));
        }

        let engine = ContagionEngine::new(&run.graph, run.config.payoffs);
        let isolated = run.graph.isolated_nodes();
        let mut previous = outcome.initial.as_slice();

        for (i, record) in trace.iter().enumerate() {
            if record.round as usize != i + 1 {
                out.push(Violation::new(
                    "round_order",
                    format!("record {} numbered {}", i, record.round),
                ));
            }

            if !(0.0..=1.0).contains(&record.adoption_rate)
                || (record.adoption_rate - adoption_rate(&record.strategies)).abs() > EPSILON
            {
                out.push(Violation::new(
                    "adoption_rate",
                    format!("round {} reports {}", record.round, record.adoption_rate),
                ));
            }

            // Replaying the transition must reproduce the recorded snapshot
            let (expected, switches) = engine.step(previous);
            if expected != record.strategies || switches != record.switches {
                out.push(Violation::new(
                    "synchronous_step",
                    format!("round {} does not follow from round {}", record.round, i),
                ));
            }

            if let Some(&node) = isolated
                .iter()
                .find(|&&node| record.strategies[node] != outcome.initial[node])
            {
                out.push(Violation::new(
                    "isolated_frozen",
                    format!("isolated node {} changed in round {}", node, record.round),
                ));
            }

            let is_last = i + 1 == trace.len();
            if !is_last && record.switches == 0 && record.round > MIN_ROUNDS_BEFORE_STABLE {
                out.push(Violation::new(
                    "early_stop",
                    format!("stable at round {} but the run continued", record.round),
                ));
            }

            previous = record.strategies.as_slice();
        }

        if outcome.summary.converged {
            let (_, switches) = engine.step(outcome.final_strategies());
            if switches != 0 {
                out.push(Violation::new(
                    "fixed_point",
                    format!("{} switches after convergence", switches),
                ));
            }
        }
    }

    fn check_summary(&self, run: &ContagionRun, out: &mut Vec<Violation>) {
        let summary = &run.outcome.summary;

        if summary.rounds_to_stable != run.outcome.trace.len() {
            out.push(Violation::new(
                "rounds_to_stable",
                format!(
                    "{} reported, {} recorded",
                    summary.rounds_to_stable,
                    run.outcome.trace.len()
                ),
            ));
        }

        let final_rate = adoption_rate(run.outcome.final_strategies());
        if (summary.final_adoption_rate - final_rate).abs() > EPSILON {
            out.push(Violation::new(
                "final_adoption_rate",
                format!("{} reported, {} observed", summary.final_adoption_rate, final_rate),
            ));
        }

        if summary.cascade_occurred != (summary.final_adoption_rate > 0.5) {
            out.push(Violation::new(
                "cascade_flag",
                format!(
                    "cascade={} with adoption {}",
                    summary.cascade_occurred, summary.final_adoption_rate
                ),
            ));
        }

        let payoffs = run.config.payoffs;
        let q = contagion_threshold(payoffs.aa, payoffs.bb, payoffs.ab);
        if (summary.predicted_threshold - q).abs() > EPSILON {
            out.push(Violation::new(
                "threshold",
                format!("{} reported, formula gives {}", summary.predicted_threshold, q),
            ));
        }
    }

    fn check_expectation(&self, run: &ContagionRun, out: &mut Vec<Violation>) {
        let summary = &run.outcome.summary;

        if let Some(cascade) = self.expectation.cascade {
            if summary.cascade_occurred != cascade {
                out.push(Violation::new(
                    "expected_cascade",
                    format!("cascade={}, expected {}", summary.cascade_occurred, cascade),
                ));
            }
        }

        if let Some(rate) = self.expectation.final_adoption {
            if (summary.final_adoption_rate - rate).abs() > EPSILON {
                out.push(Violation::new(
                    "expected_adoption",
                    format!("adoption {}, expected {}", summary.final_adoption_rate, rate),
                ));
            }
        }

        if let Some(count) = self.expectation.isolated_nodes {
            let isolated = run.graph.isolated_nodes().len();
            if isolated != count {
                out.push(Violation::new(
                    "expected_isolated",
                    format!("{} isolated nodes, expected {}", isolated, count),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SeededContext;
    use nashlab_core::{ContagionConfig, Topology};

    #[test]
    fn test_clean_run_has_no_violations() {
        let run = ContagionConfig::default().simulate(&SeededContext::new(42));
        let violations = Oracle::new().check(&run);
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn test_detects_tampered_switch_count() {
        let mut run = ContagionConfig::default().simulate(&SeededContext::new(7));
        run.outcome.trace[0].switches += 1;

        let violations = Oracle::new().check(&run);
        assert!(violations.iter().any(|v| v.check == "synchronous_step"));
    }

    #[test]
    fn test_detects_wrong_cascade_flag() {
        let mut run = ContagionConfig::default().simulate(&SeededContext::new(7));
        run.outcome.summary.cascade_occurred = !run.outcome.summary.cascade_occurred;

        let violations = Oracle::new().check(&run);
        assert!(violations.iter().any(|v| v.check == "cascade_flag"));
    }

    #[test]
    fn test_detects_truncated_trace() {
        let config = ContagionConfig::default().with_rounds(40);
        let mut run = config.simulate(&SeededContext::new(3));
        // Pretend the budget was smaller than what was simulated
        run.config.rounds = 0;

        let violations = Oracle::new().check(&run);
        assert!(violations.iter().any(|v| v.check == "round_budget"));
    }

    #[test]
    fn test_expectation_isolated_count() {
        let config = ContagionConfig::default()
            .with_nodes(20)
            .with_topology(Topology::Grid);
        let run = config.simulate(&SeededContext::new(1));

        let ok = Oracle::new().with_expectation(Expectation {
            isolated_nodes: Some(4),
            ..Default::default()
        });
        assert!(ok.check(&run).is_empty());

        let wrong = Oracle::new().with_expectation(Expectation {
            isolated_nodes: Some(0),
            ..Default::default()
        });
        assert_eq!(wrong.check(&run).len(), 1);
    }
}
