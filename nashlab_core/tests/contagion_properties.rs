use nashlab_core::contagion::{ContagionEngine, PayoffMatrix, Strategy as Choice};
use nashlab_core::{ContagionConfig, NetworkContagion, Topology};
use nashlab_env::{GameConfig, GameContext, Simulator};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use std::time::Duration;

/// Seeded context with a frozen clock.
struct FixedContext(u64);

impl GameContext for FixedContext {
    fn elapsed(&self) -> Duration {
        Duration::ZERO
    }

    fn derive_rng(&self, stream: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.0 ^ stream.wrapping_mul(0x9e3779b97f4a7c15))
    }

    fn seed(&self) -> u64 {
        self.0
    }
}

fn topology_strategy() -> impl Strategy<Value = Topology> {
    prop_oneof![
        Just(Topology::ErdosRenyi),
        Just(Topology::SmallWorld),
        Just(Topology::ScaleFree),
        Just(Topology::Grid),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_trace_invariants(
        topology in topology_strategy(),
        n in 1usize..=150,
        init in 0.01f64..=0.5,
        rounds in 1u32..=60,
        aa in 0.0f64..10.0,
        bb in 0.0f64..10.0,
        ab in 0.0f64..10.0,
        seed in any::<u64>()
    ) {
        let config = ContagionConfig {
            n_nodes: n,
            topology,
            initial_adopters: init,
            rounds,
            payoffs: PayoffMatrix::new(aa, bb, ab),
        };
        let run = config.simulate(&FixedContext(seed));
        let trace = &run.outcome.trace;

        prop_assert!(!trace.is_empty());
        prop_assert!(trace.len() <= rounds as usize);
        prop_assert_eq!(run.outcome.summary.rounds_to_stable, trace.len());

        let mut previous = run.outcome.initial.clone();
        for (i, record) in trace.iter().enumerate() {
            prop_assert_eq!(record.round as usize, i + 1);
            prop_assert!((0.0..=1.0).contains(&record.adoption_rate));

            let changed = previous.iter().zip(&record.strategies).filter(|(a, b)| a != b).count();
            prop_assert_eq!(changed, record.switches);

            // Only the final record may be a zero-switch round past round 3
            if i + 1 < trace.len() {
                prop_assert!(record.switches > 0 || record.round <= 3);
            }
            previous = record.strategies.clone();
        }

        let summary = &run.outcome.summary;
        prop_assert_eq!(summary.cascade_occurred, summary.final_adoption_rate > 0.5);
    }
}

#[test]
fn test_isolated_grid_fringe_never_changes() {
    // n = 20 -> 4x4 lattice, nodes 16..20 isolated
    let graph = Topology::Grid.generate(20, &mut ChaCha8Rng::seed_from_u64(0));
    let engine = ContagionEngine::new(&graph, PayoffMatrix::new(3.0, 4.0, 0.0));

    for seed in 0..25 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let outcome = engine.run(0.5, 200, &mut rng);
        for record in &outcome.trace {
            assert_eq!(&record.strategies[16..], &outcome.initial[16..]);
        }
    }

    // Forced assignment: fringe all B inside an all-A lattice
    let mut initial = vec![Choice::Incumbent; 20];
    for slot in &mut initial[16..] {
        *slot = Choice::Innovation;
    }
    let outcome = engine.run_from(initial, 100);
    assert!(outcome.trace.iter().all(|r| r.strategies[16..].iter().all(|&s| s == Choice::Innovation)));
    assert_eq!(outcome.summary.final_adoption_rate, 0.2);
}

#[test]
fn test_converged_run_is_a_fixed_point() {
    for topology in Topology::all() {
        for seed in 0..10 {
            let run = ContagionConfig::default()
                .with_topology(topology)
                .with_rounds(200)
                .simulate(&FixedContext(seed));

            if run.outcome.summary.converged {
                let engine = ContagionEngine::new(&run.graph, run.config.payoffs);
                let (_, switches) = engine.step(run.outcome.final_strategies());
                assert_eq!(switches, 0, "{} seed {} not a fixed point", topology, seed);
            }
        }
    }
}

#[test]
fn test_identical_seeds_give_identical_traces() {
    let config: GameConfig = json!({
        "n_nodes": 150,
        "topology": "scale_free",
        "initial_adopters": 0.2,
        "rounds": 80,
    })
    .as_object()
    .cloned()
    .unwrap_or_default();

    let a = NetworkContagion.compute(&config, &FixedContext(1234)).unwrap();
    let b = NetworkContagion.compute(&config, &FixedContext(1234)).unwrap();

    let bytes_a = serde_json::to_vec(&a).unwrap();
    let bytes_b = serde_json::to_vec(&b).unwrap();
    assert_eq!(bytes_a, bytes_b);
}

#[test]
fn test_small_world_end_to_end() {
    let config: GameConfig = json!({
        "n_nodes": 100,
        "topology": "small_world",
        "initial_adopters": 0.1,
        "rounds": 50,
        "payoff_AA": 3,
        "payoff_BB": 4,
        "payoff_AB": 0,
    })
    .as_object()
    .cloned()
    .unwrap_or_default();

    for seed in 0..10 {
        let result = NetworkContagion.compute(&config, &FixedContext(seed)).unwrap();
        let rounds = result.summary["rounds_to_stable"].as_u64().unwrap();
        let rate = result.summary["final_adoption_rate"].as_f64().unwrap();
        let cascade = result.summary["cascade_occurred"].as_bool().unwrap();

        assert!(rounds <= 50);
        assert_eq!(rounds as usize, result.rounds.len());
        assert_eq!(cascade, rate > 0.5);
        assert_eq!(result.summary["topology"], "small_world");
    }
}
