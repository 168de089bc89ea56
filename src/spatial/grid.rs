//! Fixed row/column grid laid over the monitored area
//!
//! Cells are derived, never stored: a cell is just the `(row, col)` a
//! position falls into for the current area bounds.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::config::VerticalOrigin;
use crate::core::types::{Bounds, Vec2};

/// Grid cell coordinate. Row 0 is the top display row, column 0 the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Human-readable label: column letter then 1-based row, e.g. `B2`
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = char::from(b'A' + (self.col % 26) as u8);
        write!(f, "{}{}", letter, self.row + 1)
    }
}

/// Maps continuous positions to grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridIndex {
    pub rows: u32,
    pub cols: u32,
    pub origin: VerticalOrigin,
}

impl GridIndex {
    pub fn new(rows: u32, cols: u32, origin: VerticalOrigin) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
            origin,
        }
    }

    /// Cell containing `pos` for the given area bounds
    #[inline]
    pub fn cell_of(&self, pos: Vec2, bounds: Bounds) -> CellCoord {
        cell_of(pos.x, pos.y, bounds.width, bounds.height, self.rows, self.cols, self.origin)
    }

    /// Center of a cell in area coordinates (same vertical convention as positions)
    pub fn cell_center(&self, cell: CellCoord, bounds: Bounds) -> Vec2 {
        let cell_w = bounds.width / self.cols as f32;
        let cell_h = bounds.height / self.rows as f32;
        let band = match self.origin {
            VerticalOrigin::Top => cell.row,
            VerticalOrigin::Bottom => self.rows - 1 - cell.row.min(self.rows - 1),
        };
        Vec2::new(
            (cell.col as f32 + 0.5) * cell_w,
            (band as f32 + 0.5) * cell_h,
        )
    }
}

/// Classify a position into a grid cell
///
/// Out-of-range and non-finite inputs are clamped, never rejected, so this
/// is total over all inputs.
pub fn cell_of(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    rows: u32,
    cols: u32,
    origin: VerticalOrigin,
) -> CellCoord {
    let rows = rows.max(1);
    let cols = cols.max(1);

    let col = band_index(x, width / cols as f32, cols);
    let band = band_index(y, height / rows as f32, rows);

    let row = match origin {
        VerticalOrigin::Top => band,
        VerticalOrigin::Bottom => rows - 1 - band,
    };

    CellCoord { row, col }
}

#[inline]
fn band_index(v: f32, size: f32, count: u32) -> u32 {
    let raw = (v / size).floor();
    // NaN and negative sizes fall through to 0
    if raw.is_nan() || raw < 0.0 {
        0
    } else {
        (raw as u32).min(count - 1)
    }
}
