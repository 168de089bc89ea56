pub mod grid;

pub use grid::{cell_of, CellCoord, GridIndex};
