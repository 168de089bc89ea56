//! Dwell tracking - how long a swimmer has stayed in its current cell

use crate::core::types::{AlertId, Millis};
use crate::entity::swimmer::{AlertStatus, Swimmer};
use crate::spatial::grid::CellCoord;

/// Result of observing a swimmer's cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellChange {
    /// Still in the same cell, dwell updated
    Stayed { dwell_ms: Millis },
    /// Crossed into a new cell, dwell reset to zero
    Entered {
        from: CellCoord,
        to: CellCoord,
        /// Alert dropped because of the move, its record must be removed
        cleared_alert: Option<AlertId>,
    },
}

/// Update dwell bookkeeping for the swimmer's newly classified cell
///
/// A cell change resets the accumulator and restarts residence at `now`.
/// With `clear_alert_on_change` set, an outstanding alert is cleared too,
/// since moving to another cell means the swimmer is not stuck.
pub fn observe(
    swimmer: &mut Swimmer,
    new_cell: CellCoord,
    now: Millis,
    clear_alert_on_change: bool,
) -> DwellChange {
    if new_cell != swimmer.cell {
        let from = swimmer.cell;
        swimmer.cell = new_cell;
        swimmer.residence_start = Some(now);
        swimmer.dwell_ms = 0;

        let cleared_alert = if clear_alert_on_change && swimmer.is_alerted() {
            swimmer.alert = AlertStatus::Normal;
            swimmer.alert_id.take()
        } else {
            None
        };

        return DwellChange::Entered { from, to: new_cell, cleared_alert };
    }

    match swimmer.residence_start {
        Some(start) => swimmer.dwell_ms = now.saturating_sub(start),
        None => {
            swimmer.residence_start = Some(now);
            swimmer.dwell_ms = 0;
        }
    }

    DwellChange::Stayed { dwell_ms: swimmer.dwell_ms }
}

/// True once continuous dwell exceeds the threshold
#[inline]
pub fn is_stuck(swimmer: &Swimmer, threshold_ms: Millis) -> bool {
    swimmer.dwell_ms > threshold_ms
}
