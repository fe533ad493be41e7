//! Axis-aligned box in cell-index space

use crate::core::types::UVec3;
use super::Axis;

/// Axis-aligned box of grid cells, `lo` inclusive and `hi` exclusive.
///
/// A box with `lo == hi` on exactly one axis is a plane (a surface
/// declaration); on no axis it is a volume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellBox {
    pub lo: UVec3,
    pub hi: UVec3,
}

impl CellBox {
    /// Create a box from its lower and upper corners
    pub fn new(lo: UVec3, hi: UVec3) -> Self {
        Self { lo, hi }
    }

    /// Number of cells along each axis
    pub fn size(&self) -> UVec3 {
        self.hi.saturating_sub(self.lo)
    }

    /// Lower bound along an axis
    pub fn lo_on(&self, axis: Axis) -> u32 {
        self.lo[axis.index()]
    }

    /// Upper bound along an axis
    pub fn hi_on(&self, axis: Axis) -> u32 {
        self.hi[axis.index()]
    }

    /// Extent along an axis
    pub fn len_on(&self, axis: Axis) -> u32 {
        self.hi_on(axis).saturating_sub(self.lo_on(axis))
    }

    /// Axes along which the box has zero thickness
    pub fn collapsed_axes(&self) -> Vec<Axis> {
        Axis::ALL
            .into_iter()
            .filter(|a| self.lo_on(*a) == self.hi_on(*a))
            .collect()
    }
}
