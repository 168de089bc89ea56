//! Realtime status log - one line per swimmer at every log interval

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::core::types::{EntityId, Millis, Vec2};
use crate::entity::swimmer::{AlertStatus, Swimmer};
use crate::spatial::grid::CellCoord;

/// An entry in the status log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusLine {
    pub timestamp: Millis,
    pub entity: EntityId,
    pub position: Vec2,
    pub cell: CellCoord,
    pub status: AlertStatus,
}

impl StatusLine {
    pub fn for_swimmer(swimmer: &Swimmer, timestamp: Millis) -> Self {
        Self {
            timestamp,
            entity: swimmer.id,
            position: swimmer.position,
            cell: swimmer.cell,
            status: swimmer.alert,
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[t={:.3}s] swimmer {}: (X: {:.2}, Y: {:.2}) in {}, status: {}",
            self.timestamp as f64 / 1000.0,
            self.entity,
            self.position.x,
            self.position.y,
            self.cell,
            self.status.as_str()
        )
    }
}

/// Bounded append-only log; the oldest line is evicted when full
#[derive(Debug, Clone)]
pub struct StatusLog {
    lines: VecDeque<StatusLine>,
    capacity: usize,
}

impl StatusLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a line, returning the evicted one if the log was full
    pub fn push(&mut self, line: StatusLine) -> Option<StatusLine> {
        let evicted = if self.lines.len() >= self.capacity {
            self.lines.pop_front()
        } else {
            None
        };
        self.lines.push_back(line);
        evicted
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &StatusLine> {
        self.lines.iter()
    }

    /// Newest first, the order hosts display it in
    pub fn newest_first(&self) -> impl Iterator<Item = &StatusLine> {
        self.lines.iter().rev()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ts: Millis) -> StatusLine {
        StatusLine {
            timestamp: ts,
            entity: EntityId(1),
            position: Vec2::new(1.0, 2.0),
            cell: CellCoord::new(0, 0),
            status: AlertStatus::Normal,
        }
    }

    #[test]
    fn test_evicts_oldest() {
        let mut log = StatusLog::new(3);
        for ts in 0..3 {
            assert!(log.push(line(ts)).is_none());
        }
        let evicted = log.push(line(3)).unwrap();
        assert_eq!(evicted.timestamp, 0);
        assert_eq!(log.len(), 3);

        let order: Vec<_> = log.newest_first().map(|l| l.timestamp).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn test_line_format() {
        assert_eq!(
            line(5_000).to_string(),
            "[t=5.000s] swimmer 1: (X: 1.00, Y: 2.00) in A1, status: normal"
        );
    }
}
