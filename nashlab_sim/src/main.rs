//! Nashlab Simulator CLI
//!
//! Run deterministic contagion scenarios and ad-hoc simulator configs.

use clap::Parser;
use nashlab_core::GameRegistry;
use nashlab_env::{ArenaError, GameConfig};
use nashlab_sim::scenarios::ScenarioId;
use nashlab_sim::{ScenarioResult, ScenarioRunner, SimExport};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Run a scenario and write every round to a JSON file.
fn run_with_export(runner: &ScenarioRunner, scenario: ScenarioId, export_path: &str) -> ScenarioResult {
    let (result, run) = runner.run_detailed(scenario);

    let mut export = SimExport::from_run(scenario.name(), runner.seed(), &run);
    export.finalize(result.passed, Some(result.final_adoption_rate));

    if let Err(e) = export.write_to_file(export_path) {
        error!("Failed to write export: {:?}", e);
    } else {
        info!("Exported {} frames to {}", export.frames.len(), export_path);
    }

    result
}

/// Reads `--config` as inline JSON or as a path to a JSON file.
fn load_config(raw: &str) -> Result<GameConfig, ArenaError> {
    let text = if raw.trim_start().starts_with('{') {
        raw.to_string()
    } else {
        std::fs::read_to_string(raw)?
    };
    Ok(serde_json::from_str(&text)?)
}

/// One-line verdict over a batch of scenario runs.
fn verdict_line(total: usize, failed: usize) -> String {
    if failed == 0 {
        format!("PASS: {}/{} scenario runs", total, total)
    } else {
        format!("FAIL: {}/{} scenario runs failed", failed, total)
    }
}

/// Nashlab Deterministic Simulation CLI
#[derive(Parser, Debug)]
#[command(name = "nashlab-sim")]
#[command(about = "Run deterministic network contagion simulations", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (small_world_cascade, grid_wave, scale_free_hubs, ..., all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Override the round budget of every scenario
    #[arg(short, long)]
    rounds: Option<u32>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export per-round simulation data to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Run a simulator on an option map (inline JSON or a file path)
    #[arg(long)]
    config: Option<String>,

    /// Simulator id used with --config
    #[arg(long, default_value = "network_contagion")]
    game: String,

    /// List registered simulators and scenarios
    #[arg(long)]
    list: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    if args.list {
        let registry = GameRegistry::with_defaults();
        for info in registry.all_info() {
            println!("{:<20} tier {} [{}] {}", info.id, info.tier, info.category, info.short_description);
        }
        println!();
        for scenario in ScenarioId::all() {
            println!("{:<20} {}", scenario.name(), scenario.description());
        }
        return;
    }

    if !args.json {
        info!("Nashlab Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("{}", "-".repeat(53));
    }

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };

    // Handle --config mode: one ad-hoc run, full result on stdout
    if let Some(raw) = &args.config {
        let config = load_config(raw).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

        match ScenarioRunner::new(base_seed).run_game(&args.game, &config) {
            Ok(result) => match serde_json::to_string_pretty(&result) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            let names: Vec<&str> = ScenarioId::all().iter().map(|s| s.name()).collect();
            eprintln!("Available scenarios: {}, all", names.join(", "));
            std::process::exit(1);
        })]
    };

    // Handle --export mode for visualization
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            eprintln!("Error: --export only supports a single scenario, not 'all'");
            std::process::exit(1);
        }

        info!("Running with export to: {}", export_path);

        let runner = ScenarioRunner::new(base_seed).with_rounds(args.rounds);
        let result = run_with_export(&runner, scenarios[0], export_path);

        if result.passed {
            info!(
                "PASS {} (seed={}) exported to {}",
                scenarios[0].name(),
                base_seed,
                export_path
            );
        } else {
            error!(
                "FAIL {}: {}",
                scenarios[0].name(),
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
            std::process::exit(1);
        }
        return;
    }

    // Track results
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = ScenarioRunner::new(seed).with_rounds(args.rounds);

        for scenario in &scenarios {
            let result = runner.run(*scenario);

            if !args.json {
                if result.passed {
                    info!("PASS {} (seed={})", scenario.name(), seed);
                } else {
                    error!(
                        "FAIL {} (seed={}): {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }

            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "rounds": r.rounds_simulated,
                    "final_adoption_rate": r.final_adoption_rate,
                    "cascade_occurred": r.cascade_occurred,
                    "total_switches": r.metrics.total_switches,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Error: {}", e),
        }
    } else {
        info!("");
        info!("{}", "-".repeat(53));

        if failed_count == 0 {
            info!("{}", verdict_line(total, failed_count));
        } else {
            error!("{}", verdict_line(total, failed_count));

            for result in &all_results {
                if !result.passed {
                    error!(
                        "  - {} seed={}: {}",
                        result.scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
