//! Headless runner
//!
//! Runs a seeded simulation for a fixed span of simulated time and prints a
//! JSON summary. The same seed and arguments always give the same output.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use swimwatch::core::types::Millis;
use swimwatch::simulation::Alert;
use swimwatch::{SimulationConfig, World};

#[derive(Parser, Debug)]
#[command(name = "headless_run")]
#[command(about = "Run the swimmer simulation without a terminal UI and print a JSON summary")]
struct Args {
    /// TOML config file overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of swimmers to run with (capped at max_population)
    #[arg(long)]
    swimmers: Option<usize>,

    /// Simulated duration in milliseconds
    #[arg(long, default_value_t = 120_000)]
    duration_ms: Millis,

    /// Simulated milliseconds per tick
    #[arg(long, default_value_t = 16)]
    tick_ms: Millis,

    /// Dismiss every alert as soon as it is raised
    #[arg(long)]
    auto_dismiss: bool,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    duration_ms: Millis,
    swimmers: usize,
    alerts_raised: usize,
    alerts_outstanding: usize,
    status_lines: usize,
    alerts: Vec<Alert>,
}

fn main() -> swimwatch::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("swimwatch=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load_from_toml(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(n) = args.swimmers {
        config.initial_population = n.min(config.max_population);
    }
    let seed = config.seed;

    let mut world = World::new(config)?;
    let tick_ms = args.tick_ms.max(1);

    let mut raised = Vec::new();
    let mut status_lines = 0;
    let mut now: Millis = 0;

    while now <= args.duration_ms {
        let report = world.on_tick(now);
        status_lines += report.status_lines.len();

        for alert in report.new_alerts {
            if args.auto_dismiss {
                world.dismiss_alert(alert.id)?;
            }
            raised.push(alert);
        }
        now += tick_ms;
    }

    let summary = RunSummary {
        seed,
        ticks: world.current_tick,
        duration_ms: args.duration_ms,
        swimmers: world.entity_count(),
        alerts_raised: raised.len(),
        alerts_outstanding: world.alerts.len(),
        status_lines,
        alerts: raised,
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
