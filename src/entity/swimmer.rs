//! Swimmer records and the ordered pool that owns them

use serde::{Deserialize, Serialize};

use crate::core::types::{AlertId, EntityId, Millis, Vec2};
use crate::spatial::grid::CellCoord;

/// Whether a swimmer is currently travelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionStatus {
    Moving,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    Normal,
    Alerted,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Alerted => "alerted",
        }
    }
}

/// A single monitored swimmer
///
/// The `Option<Millis>` timestamps are `None` until the first tick after
/// spawn; that tick anchors them to its `now`, so no operation outside the
/// tick loop needs to know the time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swimmer {
    pub id: EntityId,
    pub position: Vec2,
    /// Heading angle in radians, counter-clockwise from +x
    pub heading: f32,
    /// Current speed (units/s), already scaled by the global speed factor
    pub speed: f32,
    pub motion: MotionStatus,
    /// When the current moving/paused phase ends
    pub phase_until: Option<Millis>,
    pub next_speed_redraw: Option<Millis>,
    /// Time of this swimmer's previous motion update
    pub last_update: Option<Millis>,
    pub cell: CellCoord,
    /// Start of continuous residence in `cell`
    pub residence_start: Option<Millis>,
    /// Time spent continuously in `cell`
    pub dwell_ms: Millis,
    pub alert: AlertStatus,
    /// Weak reference into the alert log, set only while alerted
    pub alert_id: Option<AlertId>,
}

impl Swimmer {
    pub fn new(id: EntityId, position: Vec2, heading: f32, speed: f32, cell: CellCoord) -> Self {
        Self {
            id,
            position,
            heading,
            speed,
            motion: MotionStatus::Moving,
            phase_until: None,
            next_speed_redraw: None,
            last_update: None,
            cell,
            residence_start: None,
            dwell_ms: 0,
            alert: AlertStatus::Normal,
            alert_id: None,
        }
    }

    #[inline]
    pub fn is_alerted(&self) -> bool {
        self.alert == AlertStatus::Alerted
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.motion == MotionStatus::Moving
    }

    /// Unit vector of the current heading
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// Put the swimmer in the alerted state and stop it where it is
    pub fn mark_alerted(&mut self, alert_id: AlertId) {
        self.alert = AlertStatus::Alerted;
        self.alert_id = Some(alert_id);
        self.motion = MotionStatus::Paused;
        self.phase_until = None;
    }

    /// Return to normal; motion picks up on the next tick and dwell restarts
    ///
    /// This is the one place dwell resets without a cell change. Without it
    /// a dismissed swimmer that is still in the same cell would re-alert on
    /// the very next tick.
    pub fn resume(&mut self, heading: f32) {
        self.alert = AlertStatus::Normal;
        self.alert_id = None;
        self.heading = heading;
        self.motion = MotionStatus::Moving;
        self.phase_until = None;
        self.residence_start = None;
        self.dwell_ms = 0;
    }
}

/// Swimmers in spawn order
///
/// Iteration order is insertion order, which keeps tick output reproducible
/// for a given seed.
#[derive(Debug, Clone, Default)]
pub struct SwimmerPool {
    swimmers: Vec<Swimmer>,
}

impl SwimmerPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.swimmers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swimmers.is_empty()
    }

    pub fn push(&mut self, swimmer: Swimmer) {
        self.swimmers.push(swimmer);
    }

    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.swimmers.iter().position(|s| s.id == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Swimmer> {
        self.swimmers.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Swimmer> {
        self.swimmers.iter_mut().find(|s| s.id == id)
    }

    /// Remove by id, preserving the order of the others
    pub fn remove(&mut self, id: EntityId) -> Option<Swimmer> {
        let idx = self.index_of(id)?;
        Some(self.swimmers.remove(idx))
    }

    /// Most recently spawned swimmer
    pub fn newest(&self) -> Option<&Swimmer> {
        self.swimmers.last()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.swimmers.iter().map(|s| s.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Swimmer> {
        self.swimmers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Swimmer> {
        self.swimmers.iter_mut()
    }

    pub fn iter_normal(&self) -> impl Iterator<Item = &Swimmer> {
        self.swimmers.iter().filter(|s| !s.is_alerted())
    }

    pub fn clear(&mut self) {
        self.swimmers.clear();
    }
}
