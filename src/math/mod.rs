//! Mathematical utilities and data structures

pub mod axis;
pub mod cell_box;
pub mod grid;

pub use axis::Axis;
pub use cell_box::CellBox;
pub use grid::{Grid2, Grid3};
