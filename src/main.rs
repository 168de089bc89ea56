//! Swimwatch - Entry Point
//!
//! Interactive terminal host: owns the clock, feeds commands into the world
//! and prints what each tick reports.

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

use swimwatch::command::{Command, CommandOutcome};
use swimwatch::core::error::Result;
use swimwatch::core::types::{AlertId, EntityId, Millis, Vec2};
use swimwatch::simulation::TickReport;
use swimwatch::{SimulationConfig, World};

/// Interactive swimmer monitoring simulation
#[derive(Parser, Debug)]
#[command(name = "swimwatch")]
#[command(about = "Simulate swimmers in a gridded pool and flag anyone stuck in one cell")]
struct Args {
    /// TOML config file overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated milliseconds per tick
    #[arg(long, default_value_t = 100)]
    tick_ms: Millis,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("swimwatch=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load_from_toml(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    tracing::info!("Swimwatch starting (seed {})", config.seed);

    let mut world = World::new(config)?;
    let tick_ms = args.tick_ms.max(1);
    let mut now: Millis = 0;

    println!("\n=== SWIMWATCH ===");
    println!("Swimmers staying in one cell too long raise an alert.");
    println!();
    println!("Commands:");
    println!("  tick / t            - Advance one tick ({} ms)", tick_ms);
    println!("  run <ms>            - Advance the clock by <ms>");
    println!("  spawn [x y]         - Add a swimmer (random or at x,y)");
    println!("  remove <id>         - Remove a swimmer");
    println!("  pop                 - Remove the newest swimmer");
    println!("  speed <factor>      - Set the global speed factor");
    println!("  dismiss <alert>     - Dismiss an alert");
    println!("  clear               - Dismiss all alerts");
    println!("  resize <w> <h>      - Change the area size");
    println!("  reset               - Remove everything and start over");
    println!("  status / s          - Show swimmers");
    println!("  log                 - Show the realtime status log");
    println!("  alerts / a          - Show outstanding alerts");
    println!("  json                - Dump a JSON snapshot");
    println!("  quit / q            - Exit");
    println!();

    loop {
        print!("[t={:.1}s] > ", now as f64 / 1000.0);
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some((&cmd, rest)) = parts.split_first() else {
            continue;
        };

        match cmd {
            "quit" | "q" => break,
            "tick" | "t" => {
                now += tick_ms;
                let report = world.on_tick(now);
                if report.is_quiet() {
                    println!("  (nothing to report)");
                }
                print_report(&report);
            }
            "run" => match rest.first().and_then(|s| s.parse::<Millis>().ok()) {
                Some(span) => {
                    let end = now + span;
                    while now < end {
                        now = (now + tick_ms).min(end);
                        let report = world.on_tick(now);
                        print_alerts(&report);
                    }
                    println!("Advanced to t={:.1}s", now as f64 / 1000.0);
                }
                None => println!("Usage: run <ms>"),
            },
            "spawn" => {
                let position = match rest {
                    [x, y] => match (x.parse::<f32>(), y.parse::<f32>()) {
                        (Ok(x), Ok(y)) => Some(Vec2::new(x, y)),
                        _ => {
                            println!("Usage: spawn [x y]");
                            continue;
                        }
                    },
                    _ => None,
                };
                apply(&mut world, Command::Spawn(position));
            }
            "remove" => match rest.first().and_then(|s| s.parse::<u32>().ok()) {
                Some(id) => apply(&mut world, Command::Remove(EntityId(id))),
                None => println!("Usage: remove <id>"),
            },
            "pop" => apply(&mut world, Command::RemoveNewest),
            "speed" => match rest.first().and_then(|s| s.parse::<f32>().ok()) {
                Some(factor) => apply(&mut world, Command::SetSpeedFactor(factor)),
                None => println!("Usage: speed <factor>"),
            },
            "dismiss" => {
                let id = rest
                    .first()
                    .and_then(|s| s.trim_start_matches('#').parse::<u64>().ok());
                match id {
                    Some(id) => apply(&mut world, Command::DismissAlert(AlertId(id))),
                    None => println!("Usage: dismiss <alert>"),
                }
            }
            "clear" => apply(&mut world, Command::ClearAlerts),
            "resize" => match rest {
                [w, h] => match (w.parse::<f32>(), h.parse::<f32>()) {
                    (Ok(width), Ok(height)) => apply(&mut world, Command::Resize { width, height }),
                    _ => println!("Usage: resize <w> <h>"),
                },
                _ => println!("Usage: resize <w> <h>"),
            },
            "reset" => apply(&mut world, Command::Reset),
            "status" | "s" => display_status(&world),
            "log" => {
                for line in world.status_log.newest_first() {
                    println!("  {}", line);
                }
            }
            "alerts" | "a" => {
                if world.alerts.is_empty() {
                    println!("  no alerts");
                }
                for alert in world.alerts.iter() {
                    println!("  {}", alert);
                }
            }
            "json" => println!("{}", world.snapshot_json()?),
            _ => println!("Unknown command: {}", cmd),
        }
    }

    println!(
        "\nGoodbye! Final state: {} swimmers, {} alerts, {} ticks.",
        world.entity_count(),
        world.alerts.len(),
        world.current_tick
    );
    Ok(())
}

/// Run a command right away; the REPL only issues them between ticks
fn apply(world: &mut World, command: Command) {
    match swimwatch::command::CommandExecutor::execute(world, &command) {
        Ok(CommandOutcome::Spawned(id)) => println!("Spawned swimmer {}", id),
        Ok(CommandOutcome::Removed(id)) => println!("Removed swimmer {}", id),
        Ok(CommandOutcome::RemovedNewest(Some(id))) => println!("Removed swimmer {}", id),
        Ok(CommandOutcome::RemovedNewest(None)) => println!("No swimmers to remove"),
        Ok(CommandOutcome::AlertsCleared(cleared)) => println!("Cleared {} alerts", cleared.len()),
        Ok(outcome) => println!("{:?}", outcome),
        Err(e) => println!("Command failed: {}", e),
    }
}

fn print_alerts(report: &TickReport) {
    for alert in &report.new_alerts {
        println!("  ALERT {}", alert);
    }
    for id in &report.cleared_alerts {
        println!("  alert {} cleared", id);
    }
}

fn print_report(report: &TickReport) {
    for moved in &report.moved {
        println!(
            "  swimmer {} -> ({:.2}, {:.2}) {}",
            moved.id, moved.position.x, moved.position.y, moved.cell
        );
    }
    print_alerts(report);
    for line in &report.status_lines {
        println!("  {}", line);
    }
}

fn display_status(world: &World) {
    let bounds = world.bounds();
    println!();
    println!(
        "--- Tick {} | {} swimmers | area {}x{} | speed x{:.1} ---",
        world.current_tick,
        world.entity_count(),
        bounds.width,
        bounds.height,
        world.speed_factor()
    );
    for s in world.swimmers.iter() {
        println!(
            "  {:>3}  ({:>7.2}, {:>7.2})  {}  {:?}  dwell {:>5.1}s  {}",
            s.id,
            s.position.x,
            s.position.y,
            s.cell,
            s.motion,
            s.dwell_ms as f64 / 1000.0,
            s.alert.as_str()
        );
    }
    println!();
}
