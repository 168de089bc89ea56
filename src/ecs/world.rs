//! World - the simulation context that owns every swimmer, log and timer
//!
//! All host operations go through here. Each one runs to completion before
//! the next, and `run_simulation_tick` only ever sees fully built swimmers.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::command::{Command, CommandQueue};
use crate::core::config::{ClearPolicy, SimulationConfig};
use crate::core::error::{Result, SimError};
use crate::core::types::{AlertId, Bounds, EntityId, Millis, Vec2};
use crate::entity::swimmer::{Swimmer, SwimmerPool};
use crate::simulation::alert::{self, Alert, AlertCause, AlertLog, Dismissal};
use crate::simulation::clock::Scheduler;
use crate::simulation::log::{StatusLine, StatusLog};
use crate::simulation::motion::{draw_speed, random_heading};
use crate::simulation::tick::{run_simulation_tick, TickReport};
use crate::spatial::grid::GridIndex;

/// The simulation world containing all swimmers and their logs
pub struct World {
    pub config: SimulationConfig,
    pub current_tick: u64,
    pub swimmers: SwimmerPool,
    pub alerts: AlertLog,
    pub status_log: StatusLog,
    pub(crate) scheduler: Scheduler,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) commands: CommandQueue,
    /// Status lines evicted outside a tick, reported by the next one
    pub(crate) pending_expired: Vec<StatusLine>,
    grid: GridIndex,
    bounds: Bounds,
    bounds_dirty: bool,
    speed_factor: f32,
    next_entity_id: u32,
}

/// Serializable view of the world for presentation layers
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub bounds: Bounds,
    pub rows: u32,
    pub cols: u32,
    pub speed_factor: f32,
    pub swimmers: Vec<Swimmer>,
    pub alerts: Vec<Alert>,
}

impl World {
    /// Build a world from a validated config and spawn the initial population
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate().map_err(SimError::InvalidConfig)?;
        Ok(Self::build(config))
    }

    fn build(config: SimulationConfig) -> Self {
        let mut world = Self {
            current_tick: 0,
            swimmers: SwimmerPool::new(),
            alerts: AlertLog::new(),
            status_log: StatusLog::new(config.max_log_entries),
            scheduler: Scheduler::from_config(&config),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            commands: CommandQueue::new(),
            pending_expired: Vec::new(),
            grid: GridIndex::new(config.rows, config.cols, config.vertical_origin),
            bounds: config.bounds(),
            bounds_dirty: false,
            speed_factor: config.speed_factor,
            next_entity_id: 0,
            config,
        };
        world.spawn_initial_population();
        world
    }

    fn spawn_initial_population(&mut self) {
        for _ in 0..self.config.initial_population {
            // initial_population <= max_population is validated
            if self.spawn(None).is_err() {
                break;
            }
        }
    }

    pub fn entity_count(&self) -> usize {
        self.swimmers.count()
    }

    pub fn get(&self, id: EntityId) -> Option<&Swimmer> {
        self.swimmers.get(id)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn grid(&self) -> GridIndex {
        self.grid
    }

    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    /// Time of the latest tick, 0 before the first one
    pub fn now(&self) -> Millis {
        self.scheduler.last_tick().unwrap_or(0)
    }

    fn allocate_entity_id(&mut self) -> EntityId {
        self.next_entity_id += 1;
        EntityId(self.next_entity_id)
    }

    fn random_position(&mut self) -> Vec2 {
        let margin = self.config.margin;
        let x = self.rng.gen_range(margin..=self.bounds.width - margin);
        let y = self.rng.gen_range(margin..=self.bounds.height - margin);
        Vec2::new(x, y)
    }

    /// Spawn a swimmer at `position` (clamped into bounds) or at random
    ///
    /// Non-finite positions are rejected with `InvalidPosition`.
    pub fn spawn(&mut self, position: Option<Vec2>) -> Result<EntityId> {
        if self.swimmers.count() >= self.config.max_population {
            tracing::warn!("Spawn rejected: max population {} reached", self.config.max_population);
            return Err(SimError::MaxPopulationReached { max: self.config.max_population });
        }

        let position = match position {
            Some(p) if !p.is_finite() => {
                tracing::warn!("Spawn rejected: position ({}, {}) is not finite", p.x, p.y);
                return Err(SimError::InvalidPosition { x: p.x, y: p.y });
            }
            Some(p) => self.bounds.clamp(p, self.config.margin),
            None => self.random_position(),
        };
        Ok(self.spawn_at(position))
    }

    /// Create a fully initialised swimmer; the population cap is the caller's concern
    fn spawn_at(&mut self, position: Vec2) -> EntityId {
        let id = self.allocate_entity_id();
        let heading = random_heading(&mut self.rng);
        let speed = draw_speed(&self.config, self.speed_factor, &mut self.rng);
        let cell = self.grid.cell_of(position, self.bounds);

        let swimmer = Swimmer::new(id, position, heading, speed, cell);
        let line = StatusLine::for_swimmer(&swimmer, self.now());
        self.swimmers.push(swimmer);
        if let Some(evicted) = self.status_log.push(line) {
            self.pending_expired.push(evicted);
        }

        tracing::info!(
            "Spawned swimmer {} at ({:.2}, {:.2}) in {}",
            id,
            position.x,
            position.y,
            cell
        );
        id
    }

    /// Remove a swimmer and any alert it holds
    pub fn remove(&mut self, id: EntityId) -> Result<Swimmer> {
        let swimmer = self.swimmers.remove(id).ok_or(SimError::EntityNotFound(id))?;
        if let Some(alert_id) = swimmer.alert_id {
            self.alerts.remove(alert_id);
        }
        tracing::info!("Removed swimmer {}", id);
        Ok(swimmer)
    }

    /// Remove the most recently spawned swimmer, if any
    pub fn remove_newest(&mut self) -> Option<Swimmer> {
        let id = self.swimmers.newest()?.id;
        self.remove(id).ok()
    }

    /// Drop every swimmer, log line and alert, then respawn the initial population
    ///
    /// Id counters keep counting so ids from before the reset are never reused.
    pub fn reset(&mut self) {
        self.swimmers.clear();
        self.alerts.clear();
        self.status_log.clear();
        self.pending_expired.clear();
        self.scheduler.reset();
        self.spawn_initial_population();
        tracing::info!("World reset with {} swimmers", self.swimmers.count());
    }

    /// Change the global speed factor; takes effect at each swimmer's next redraw
    pub fn set_speed_factor(&mut self, factor: f32) -> Result<()> {
        if !(factor > 0.0 && factor.is_finite()) {
            return Err(SimError::InvalidSpeedFactor(factor));
        }
        self.speed_factor = factor;
        tracing::debug!("Speed factor set to {:.2}", factor);
        Ok(())
    }

    /// Change the area size
    ///
    /// Invalid bounds are rejected and the old ones kept. Valid bounds are
    /// applied at once; positions are re-clamped and cells recomputed on
    /// the next tick.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        let bounds = Bounds::new(width, height);
        if !bounds.fits_margin(self.config.margin) {
            tracing::warn!("Ignoring invalid bounds {}x{}", width, height);
            return Err(SimError::InvalidBounds { width, height, margin: self.config.margin });
        }
        self.bounds = bounds;
        self.bounds_dirty = true;
        Ok(())
    }

    pub(crate) fn take_bounds_dirty(&mut self) -> bool {
        std::mem::take(&mut self.bounds_dirty)
    }

    /// Flag a swimmer directly, bypassing the dwell check
    pub fn raise_alert(&mut self, id: EntityId, cause: AlertCause) -> Result<Option<Alert>> {
        let now = self.now();
        let swimmer = self.swimmers.get_mut(id).ok_or(SimError::EntityNotFound(id))?;
        Ok(alert::raise(swimmer, now, cause, &mut self.alerts))
    }

    /// Dismiss an alert and resolve its swimmer according to the clear policy
    pub fn dismiss_alert(&mut self, alert_id: AlertId) -> Result<Dismissal> {
        let alert = self.alerts.remove(alert_id).ok_or(SimError::AlertNotFound(alert_id))?;

        let swimmer = self
            .swimmers
            .get_mut(alert.entity)
            .ok_or(SimError::EntityNotFound(alert.entity))?;

        let dismissal = match self.config.clear_policy {
            ClearPolicy::Resume => {
                swimmer.resume(random_heading(&mut self.rng));
                Dismissal::Resumed(alert.entity)
            }
            ClearPolicy::Replace => {
                let near = swimmer.position;
                self.swimmers.remove(alert.entity);
                let position = self.respawn_position(near);
                let new = self.spawn_at(position);
                Dismissal::Replaced { old: alert.entity, new }
            }
        };

        tracing::info!("Dismissed alert {}: {:?}", alert_id, dismissal);
        Ok(dismissal)
    }

    fn respawn_position(&mut self, near: Vec2) -> Vec2 {
        let r = self.config.respawn_radius;
        let offset = if r > 0.0 {
            Vec2::from_angle(random_heading(&mut self.rng)) * self.rng.gen_range(0.0..=r)
        } else {
            Vec2::default()
        };
        self.bounds.clamp(near + offset, self.config.margin)
    }

    /// Dismiss every outstanding alert, oldest first
    pub fn clear_alerts(&mut self) -> Vec<Dismissal> {
        self.alerts
            .ids()
            .into_iter()
            .filter_map(|id| self.dismiss_alert(id).ok())
            .collect()
    }

    /// Queue a command to run at the start of the next tick
    pub fn submit(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Advance the simulation to `now`
    pub fn on_tick(&mut self, now: Millis) -> TickReport {
        run_simulation_tick(self, now)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.current_tick,
            bounds: self.bounds,
            rows: self.grid.rows,
            cols: self.grid.cols,
            speed_factor: self.speed_factor,
            swimmers: self.swimmers.iter().cloned().collect(),
            alerts: self.alerts.iter().cloned().collect(),
        }
    }

    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::build(SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_world() -> World {
        World::new(SimulationConfig {
            initial_population: 0,
            max_population: 5,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_new_spawns_initial_population() {
        let world = World::default();
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.status_log.len(), 1);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SimulationConfig { rows: 0, ..Default::default() };
        assert!(matches!(World::new(config), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_population_cap() {
        let mut world = empty_world();
        for _ in 0..5 {
            world.spawn(None).unwrap();
        }
        let err = world.spawn(None).unwrap_err();
        assert!(matches!(err, SimError::MaxPopulationReached { max: 5 }));
        assert_eq!(world.entity_count(), 5);
    }

    #[test]
    fn test_spawn_clamps_supplied_position() {
        let mut world = empty_world();
        let id = world.spawn(Some(Vec2::new(-100.0, 1_000.0))).unwrap();
        let s = world.get(id).unwrap();
        assert_eq!(s.position, Vec2::new(20.0, 280.0));
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut world = empty_world();
        let a = world.spawn(None).unwrap();
        world.remove(a).unwrap();
        let b = world.spawn(None).unwrap();
        world.reset();
        let c = world.spawn(None).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_remove_unknown_and_newest() {
        let mut world = empty_world();
        assert!(matches!(world.remove(EntityId(42)), Err(SimError::EntityNotFound(_))));
        assert!(world.remove_newest().is_none());

        world.spawn(None).unwrap();
        let newest = world.spawn(None).unwrap();
        assert_eq!(world.remove_newest().map(|s| s.id), Some(newest));
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_remove_drops_alert_record() {
        let mut world = empty_world();
        let id = world.spawn(None).unwrap();
        let alert = world.raise_alert(id, AlertCause::Anomaly).unwrap().unwrap();
        world.remove(id).unwrap();
        assert!(world.alerts.get(alert.id).is_none());
        assert!(matches!(world.dismiss_alert(alert.id), Err(SimError::AlertNotFound(_))));
    }

    #[test]
    fn test_speed_factor_validation() {
        let mut world = empty_world();
        assert!(world.set_speed_factor(2.0).is_ok());
        assert_eq!(world.speed_factor(), 2.0);
        assert!(matches!(world.set_speed_factor(0.0), Err(SimError::InvalidSpeedFactor(_))));
        assert!(world.set_speed_factor(f32::NAN).is_err());
        assert_eq!(world.speed_factor(), 2.0);
    }

    #[test]
    fn test_resize_rejects_invalid_bounds() {
        let mut world = empty_world();
        let err = world.resize(30.0, 300.0).unwrap_err();
        assert!(matches!(err, SimError::InvalidBounds { .. }));
        assert_eq!(world.bounds(), Bounds::new(400.0, 300.0));
        assert!(world.resize(-1.0, 0.0).is_err());
        assert!(world.resize(200.0, 100.0).is_ok());
        assert_eq!(world.bounds(), Bounds::new(200.0, 100.0));
    }

    #[test]
    fn test_spawn_rejects_non_finite_position() {
        let mut world = empty_world();
        let err = world.spawn(Some(Vec2::new(f32::NAN, 100.0))).unwrap_err();
        assert!(matches!(err, SimError::InvalidPosition { .. }));
        assert!(world.spawn(Some(Vec2::new(50.0, f32::INFINITY))).is_err());
        assert_eq!(world.entity_count(), 0);

        let id = world.spawn(Some(Vec2::new(50.0, 100.0))).unwrap();
        world.on_tick(0);
        world.on_tick(1_000);
        let s = world.get(id).unwrap();
        assert!(world.bounds().contains(s.position, world.config.margin));
    }

    #[test]
    fn test_dismiss_resume_keeps_identity() {
        let mut world = empty_world();
        let id = world.spawn(None).unwrap();
        let alert = world.raise_alert(id, AlertCause::Anomaly).unwrap().unwrap();

        assert_eq!(world.dismiss_alert(alert.id).unwrap(), Dismissal::Resumed(id));
        let s = world.get(id).unwrap();
        assert!(!s.is_alerted());
        assert!(s.is_moving());
        assert!(world.alerts.is_empty());
    }

    #[test]
    fn test_dismiss_replace_spawns_nearby() {
        let mut world = World::new(SimulationConfig {
            initial_population: 0,
            clear_policy: ClearPolicy::Replace,
            ..Default::default()
        })
        .unwrap();
        let id = world.spawn(Some(Vec2::new(100.0, 100.0))).unwrap();
        let alert = world.raise_alert(id, AlertCause::Dwell).unwrap().unwrap();

        // the respawn offset is the first thing drawn; no heading is wasted on the old swimmer
        let mut rng = world.rng.clone();
        let angle = random_heading(&mut rng);
        let dist = rng.gen_range(0.0..=10.0f32);
        let expected = world
            .bounds()
            .clamp(Vec2::new(100.0, 100.0) + Vec2::from_angle(angle) * dist, 20.0);

        let Dismissal::Replaced { old, new } = world.dismiss_alert(alert.id).unwrap() else {
            panic!("expected replacement");
        };
        assert_eq!(old, id);
        assert_ne!(new, id);
        assert!(world.get(id).is_none());
        let replacement = world.get(new).unwrap();
        assert!(replacement.position.distance(&Vec2::new(100.0, 100.0)) <= 10.0 + 1e-3);
        assert_eq!(replacement.position, expected);
        assert!(!replacement.is_alerted());
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_clear_alerts() {
        let mut world = empty_world();
        for _ in 0..3 {
            let id = world.spawn(None).unwrap();
            world.raise_alert(id, AlertCause::Anomaly).unwrap();
        }
        assert_eq!(world.clear_alerts().len(), 3);
        assert!(world.alerts.is_empty());
        assert!(world.swimmers.iter().all(|s| !s.is_alerted()));
    }

    #[test]
    fn test_snapshot_json() {
        let world = World::default();
        let json = world.snapshot_json().unwrap();
        assert!(json.contains("\"swimmers\""));
    }
}
