//! Tick system - orchestrates simulation updates
//!
//! Each tick runs, in order:
//! queued commands -> bounds re-clamp -> per-swimmer motion, dwell and
//! alert checks -> anomaly scan -> status log
//!
//! Swimmers are visited in spawn order so output is reproducible for a seed.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::command::{CommandExecutor, CommandResult};
use crate::core::types::{AlertId, EntityId, Millis, Vec2};
use crate::ecs::world::World;
use crate::simulation::alert::{self, Alert, AlertCause};
use crate::simulation::dwell::{self, DwellChange};
use crate::simulation::log::StatusLine;
use crate::simulation::motion;
use crate::spatial::grid::CellCoord;

/// A swimmer whose position changed this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MovedSwimmer {
    pub id: EntityId,
    pub position: Vec2,
    pub cell: CellCoord,
}

/// Everything a host needs to refresh its presentation after a tick
#[derive(Debug, Default)]
pub struct TickReport {
    pub now: Millis,
    pub tick: u64,
    pub command_results: Vec<CommandResult>,
    pub moved: Vec<MovedSwimmer>,
    pub new_alerts: Vec<Alert>,
    /// Alerts dropped because their swimmer changed cell
    pub cleared_alerts: Vec<AlertId>,
    pub status_lines: Vec<StatusLine>,
    /// Status lines evicted from the bounded log
    pub expired_log_lines: Vec<StatusLine>,
}

impl TickReport {
    pub fn is_quiet(&self) -> bool {
        self.moved.is_empty()
            && self.new_alerts.is_empty()
            && self.cleared_alerts.is_empty()
            && self.status_lines.is_empty()
    }
}

/// Advance the world to `now`
pub fn run_simulation_tick(world: &mut World, now: Millis) -> TickReport {
    world.current_tick += 1;

    let mut report = TickReport {
        now,
        tick: world.current_tick,
        ..Default::default()
    };

    report.command_results = CommandExecutor::drain(world);

    if world.take_bounds_dirty() {
        reclamp_positions(world);
    }

    let due = world.scheduler.due(now);
    let bounds = world.bounds();
    let grid = world.grid();
    let speed_factor = world.speed_factor();

    for id in world.swimmers.ids() {
        // A swimmer removed earlier in this tick is simply skipped
        let Some(swimmer) = world.swimmers.get_mut(id) else {
            continue;
        };

        let moved = if due.motion {
            motion::step(swimmer, now, bounds, &world.config, speed_factor, &mut world.rng)
        } else {
            swimmer.last_update = Some(now);
            false
        };

        let cell = grid.cell_of(swimmer.position, bounds);
        let change = dwell::observe(swimmer, cell, now, world.config.clear_alert_on_cell_change);
        if let DwellChange::Entered { cleared_alert: Some(alert_id), .. } = change {
            world.alerts.remove(alert_id);
            report.cleared_alerts.push(alert_id);
            tracing::info!("Alert {} cleared: swimmer {} changed cell", alert_id, id);
        }

        if let Some(cause) = alert::check_alert(swimmer, &world.config, &mut world.rng) {
            if let Some(new_alert) = alert::raise(swimmer, now, cause, &mut world.alerts) {
                report.new_alerts.push(new_alert);
            }
        }

        if moved {
            report.moved.push(MovedSwimmer {
                id,
                position: swimmer.position,
                cell: swimmer.cell,
            });
        }
    }

    if due.anomaly_scan {
        if let Some(new_alert) = run_anomaly_scan(world, now) {
            report.new_alerts.push(new_alert);
        }
    }

    report.expired_log_lines.append(&mut world.pending_expired);
    if due.status_log {
        for swimmer in world.swimmers.iter() {
            let line = StatusLine::for_swimmer(swimmer, now);
            if let Some(evicted) = world.status_log.push(line.clone()) {
                report.expired_log_lines.push(evicted);
            }
            report.status_lines.push(line);
        }
    }

    if !report.new_alerts.is_empty() || !report.cleared_alerts.is_empty() {
        tracing::debug!(
            "Tick {} at {}ms: {} moved, {} new alerts, {} cleared",
            report.tick,
            now,
            report.moved.len(),
            report.new_alerts.len(),
            report.cleared_alerts.len()
        );
    }

    report
}

/// Pull every swimmer back inside the current bounds
///
/// Cells are recomputed by the dwell step that follows in the same tick.
fn reclamp_positions(world: &mut World) {
    let bounds = world.bounds();
    let margin = world.config.margin;
    for swimmer in world.swimmers.iter_mut() {
        swimmer.position = bounds.clamp(swimmer.position, margin);
    }
}

/// With probability `anomaly_chance`, flag one random normal swimmer
fn run_anomaly_scan(world: &mut World, now: Millis) -> Option<Alert> {
    if !world.rng.gen_bool(world.config.anomaly_chance) {
        return None;
    }

    let candidates: Vec<EntityId> = world.swimmers.iter_normal().map(|s| s.id).collect();
    let id = *candidates.choose(&mut world.rng)?;
    let swimmer = world.swimmers.get_mut(id)?;
    alert::raise(swimmer, now, AlertCause::Anomaly, &mut world.alerts)
}
