//! Alert lifecycle - raising, recording and clearing alerts
//!
//! The alert log owns every `Alert`. A swimmer only keeps the `AlertId` of
//! its outstanding alert, so lookups always go through the log.

use ahash::AHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::config::SimulationConfig;
use crate::core::types::{AlertId, EntityId, Millis, Vec2};
use crate::entity::swimmer::Swimmer;
use crate::simulation::dwell::is_stuck;
use crate::spatial::grid::CellCoord;

/// Why an alert was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertCause {
    /// Dwell time in one cell exceeded the threshold
    Dwell,
    /// Per-tick random chance fired
    Spontaneous,
    /// Picked by the periodic anomaly scan
    Anomaly,
}

/// Snapshot of a swimmer at the moment it was flagged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub entity: EntityId,
    pub timestamp: Millis,
    pub position: Vec2,
    pub cell: CellCoord,
    pub dwell_ms: Millis,
    pub cause: AlertCause,
}

impl Alert {
    pub fn cell_label(&self) -> String {
        self.cell.label()
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[t={:.3}s] alert {}: swimmer {} ",
            self.timestamp as f64 / 1000.0,
            self.id,
            self.entity
        )?;
        match self.cause {
            AlertCause::Dwell => write!(
                f,
                "stayed in {} for {:.1}s",
                self.cell,
                self.dwell_ms as f64 / 1000.0
            )?,
            AlertCause::Spontaneous => write!(f, "raised a spontaneous alert in {}", self.cell)?,
            AlertCause::Anomaly => write!(f, "flagged by anomaly scan in {}", self.cell)?,
        }
        write!(f, " at (X: {:.2}, Y: {:.2})", self.position.x, self.position.y)
    }
}

/// Outstanding alerts in the order they were raised
///
/// Holds at most one alert per swimmer, so its size never exceeds the
/// population cap.
#[derive(Debug, Clone, Default)]
pub struct AlertLog {
    alerts: Vec<Alert>,
    by_entity: AHashMap<EntityId, AlertId>,
    next_id: u64,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next alert id; ids are never reused, even across resets
    fn allocate_id(&mut self) -> AlertId {
        self.next_id += 1;
        AlertId(self.next_id)
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn get(&self, id: AlertId) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    pub fn for_entity(&self, entity: EntityId) -> Option<&Alert> {
        self.by_entity.get(&entity).and_then(|id| self.get(*id))
    }

    pub fn remove(&mut self, id: AlertId) -> Option<Alert> {
        let idx = self.alerts.iter().position(|a| a.id == id)?;
        let alert = self.alerts.remove(idx);
        self.by_entity.remove(&alert.entity);
        Some(alert)
    }

    pub fn ids(&self) -> Vec<AlertId> {
        self.alerts.iter().map(|a| a.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    /// Drop every record but keep the id counter
    pub fn clear(&mut self) {
        self.alerts.clear();
        self.by_entity.clear();
    }

    fn push(&mut self, alert: Alert) {
        self.by_entity.insert(alert.entity, alert.id);
        self.alerts.push(alert);
    }
}

/// Decide whether a normal swimmer should be flagged this tick
pub fn check_alert<R: Rng + ?Sized>(
    swimmer: &Swimmer,
    config: &SimulationConfig,
    rng: &mut R,
) -> Option<AlertCause> {
    if swimmer.is_alerted() {
        return None;
    }
    if is_stuck(swimmer, config.alert_threshold_ms) {
        return Some(AlertCause::Dwell);
    }
    if config.spontaneous_alert_chance > 0.0 && rng.gen_bool(config.spontaneous_alert_chance) {
        return Some(AlertCause::Spontaneous);
    }
    None
}

/// Flag a swimmer: record the alert and freeze the swimmer in place
///
/// Returns `None` if the swimmer already holds an alert.
pub fn raise(
    swimmer: &mut Swimmer,
    now: Millis,
    cause: AlertCause,
    log: &mut AlertLog,
) -> Option<Alert> {
    if swimmer.is_alerted() {
        return None;
    }

    let alert = Alert {
        id: log.allocate_id(),
        entity: swimmer.id,
        timestamp: now,
        position: swimmer.position,
        cell: swimmer.cell,
        dwell_ms: swimmer.dwell_ms,
        cause,
    };

    swimmer.mark_alerted(alert.id);
    log.push(alert.clone());

    tracing::info!("{}", alert);
    Some(alert)
}

/// How a dismissal was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dismissal {
    /// The same swimmer resumed moving
    Resumed(EntityId),
    /// The swimmer was removed and a new one spawned next to it
    Replaced { old: EntityId, new: EntityId },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn swimmer(id: u32) -> Swimmer {
        Swimmer::new(EntityId(id), Vec2::new(30.0, 30.0), 0.0, 10.0, CellCoord::new(1, 1))
    }

    #[test]
    fn test_raise_records_snapshot_and_freezes() {
        let mut log = AlertLog::new();
        let mut s = swimmer(3);
        s.dwell_ms = 10_001;

        let alert = raise(&mut s, 12_000, AlertCause::Dwell, &mut log).unwrap();

        assert_eq!(alert.id, AlertId(1));
        assert_eq!(alert.entity, EntityId(3));
        assert_eq!(alert.cell_label(), "B2");
        assert_eq!(s.alert_id, Some(alert.id));
        assert!(!s.is_moving());
        assert_eq!(log.for_entity(EntityId(3)), Some(&alert));
    }

    #[test]
    fn test_raise_twice_is_rejected() {
        let mut log = AlertLog::new();
        let mut s = swimmer(1);
        assert!(raise(&mut s, 0, AlertCause::Anomaly, &mut log).is_some());
        assert!(raise(&mut s, 1, AlertCause::Anomaly, &mut log).is_none());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_ids_survive_clear() {
        let mut log = AlertLog::new();
        let mut a = swimmer(1);
        raise(&mut a, 0, AlertCause::Dwell, &mut log);
        log.clear();

        let mut b = swimmer(2);
        let alert = raise(&mut b, 0, AlertCause::Dwell, &mut log).unwrap();
        assert_eq!(alert.id, AlertId(2));
    }

    #[test]
    fn test_remove_unknown_alert() {
        let mut log = AlertLog::new();
        assert!(log.remove(AlertId(99)).is_none());
    }

    #[test]
    fn test_check_alert_threshold_is_strict() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let config = SimulationConfig::default();
        let mut s = swimmer(1);

        s.dwell_ms = 10_000;
        assert_eq!(check_alert(&s, &config, &mut rng), None);

        s.dwell_ms = 10_001;
        assert_eq!(check_alert(&s, &config, &mut rng), Some(AlertCause::Dwell));
    }

    #[test]
    fn test_spontaneous_alert_always_fires_at_probability_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let config = SimulationConfig { spontaneous_alert_chance: 1.0, ..Default::default() };
        let s = swimmer(1);
        assert_eq!(check_alert(&s, &config, &mut rng), Some(AlertCause::Spontaneous));
    }

    #[test]
    fn test_alert_line() {
        let alert = Alert {
            id: AlertId(5),
            entity: EntityId(2),
            timestamp: 12_500,
            position: Vec2::new(10.0, 20.0),
            cell: CellCoord::new(1, 1),
            dwell_ms: 10_200,
            cause: AlertCause::Dwell,
        };
        assert_eq!(
            alert.to_string(),
            "[t=12.500s] alert #5: swimmer 2 stayed in B2 for 10.2s at (X: 10.00, Y: 20.00)"
        );
    }
}
