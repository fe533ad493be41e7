//! Per-cell occupancy masks for fractal volumes.
//!
//! A mask records, for every cell of a grown fractal volume, whether the
//! cell takes the volume's fractal material, water, grass or nothing. The
//! compositor builds the mask from the volume's surfaces and hands it to a
//! voxel writer together with the per-cell fractal materials.

pub mod compositor;

pub use compositor::{composite, CompositedVolume};

/// Occupancy class of one mask cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MaskCell {
    /// Left untouched; whatever was written before stays
    #[default]
    Background = 0,
    /// Takes the fractal material of the cell
    Filled = 1,
    Water = 2,
    Vegetation = 3,
}

impl MaskCell {
    /// Numeric code of the class.
    pub fn code(self) -> u8 {
        self as u8
    }
}
