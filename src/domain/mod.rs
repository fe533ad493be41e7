//! Rectilinear model domain: physical-to-index conversion and extent checks.

use serde::{Deserialize, Serialize};

use crate::core::types::{BuildResult, DVec3, UVec3};
use crate::core::BuildError;
use crate::math::{Axis, CellBox};

/// Speed of light in vacuum (m/s)
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Whether a declared extent describes a volume or a plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    /// No collapsed axis, strictly positive thickness everywhere
    Volume,
    /// Exactly one collapsed axis
    Surface,
}

/// Grid of `nx × ny × nz` cells of size `dx × dy × dz` metres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Cell counts per axis
    pub cells: [u32; 3],
    /// Cell size per axis in metres
    pub spacing: [f64; 3],
}

impl Domain {
    pub fn new(cells: UVec3, spacing: DVec3) -> Self {
        Self { cells: cells.to_array(), spacing: spacing.to_array() }
    }

    /// Build a domain from its physical size, rounding to whole cells.
    ///
    /// Sizes and cell sizes must be finite and positive, and every axis must
    /// come out with at least one cell.
    pub fn from_size(size: DVec3, spacing: DVec3) -> BuildResult<Self> {
        let mut cells = UVec3::ZERO;
        for axis in Axis::ALL {
            let a = axis.index();
            let (s, d) = (size[a], spacing[a]);
            if !d.is_finite() || d <= 0.0 {
                return Err(BuildError::InvalidParameter(format!(
                    "the {axis} cell size ({d}) must be a positive number"
                )));
            }
            if !s.is_finite() || s <= 0.0 {
                return Err(BuildError::InvalidParameter(format!(
                    "the {axis} domain size ({s}) must be a positive number"
                )));
            }
            let n = round_value(s / d);
            cells[a] = u32::try_from(n).ok().filter(|&n| n > 0).ok_or_else(|| {
                BuildError::InvalidParameter(format!(
                    "a {axis} domain size of {s}m gives {n} cells of {d}m"
                ))
            })?;
        }
        Ok(Self::new(cells, spacing))
    }

    /// Cell count along an axis
    pub fn n(&self, axis: Axis) -> u32 {
        self.cells[axis.index()]
    }

    /// Cell size along an axis
    pub fn d(&self, axis: Axis) -> f64 {
        self.spacing[axis.index()]
    }

    /// Convert a physical coordinate to the nearest cell index (unchecked).
    pub fn to_index(&self, value: f64, axis: Axis) -> i64 {
        round_value(value / self.d(axis))
    }

    /// Convert a cell index back to metres.
    pub fn to_physical(&self, index: i64, axis: Axis) -> f64 {
        index as f64 * self.d(axis)
    }

    /// Check `0 <= index <= n` for one index.
    pub fn validate_index(&self, index: i64, axis: Axis) -> BuildResult<u32> {
        let limit = self.n(axis);
        if index < 0 || index > limit as i64 {
            return Err(BuildError::OutOfDomain { axis, index, limit });
        }
        Ok(index as u32)
    }

    /// Check both ends of an extent lie in the domain and are ordered.
    ///
    /// With `strict`, `lo == hi` is rejected as well.
    pub fn validate_extent(&self, lo: i64, hi: i64, axis: Axis, strict: bool) -> BuildResult<(u32, u32)> {
        let lo_idx = self.validate_index(lo, axis)?;
        let hi_idx = self.validate_index(hi, axis)?;
        if lo > hi || (strict && lo == hi) {
            return Err(BuildError::InvertedExtent { axis, lo, hi });
        }
        Ok((lo_idx, hi_idx))
    }

    /// Convert and validate a physical box into a cell box of the expected shape.
    pub fn cell_box(&self, lo: DVec3, hi: DVec3, kind: ShapeKind) -> BuildResult<CellBox> {
        let strict = kind == ShapeKind::Volume;
        let mut lo_idx = UVec3::ZERO;
        let mut hi_idx = UVec3::ZERO;
        for axis in Axis::ALL {
            let a = axis.index();
            let (l, h) = self.validate_extent(
                self.to_index(lo[a], axis),
                self.to_index(hi[a], axis),
                axis,
                strict,
            )?;
            lo_idx[a] = l;
            hi_idx[a] = h;
        }
        let cell_box = CellBox::new(lo_idx, hi_idx);
        validate_orientation(&cell_box, kind)?;
        Ok(cell_box)
    }

    /// Largest stable time step for the 3-D Yee scheme (Courant limit).
    pub fn courant_dt(&self) -> f64 {
        let [dx, dy, dz] = self.spacing;
        1.0 / (SPEED_OF_LIGHT * (1.0 / (dx * dx) + 1.0 / (dy * dy) + 1.0 / (dz * dz)).sqrt())
    }
}

/// Check how many axes of a box are collapsed.
///
/// Surfaces need exactly one collapsed axis, which is returned; volumes need none.
pub fn validate_orientation(cell_box: &CellBox, kind: ShapeKind) -> BuildResult<Option<Axis>> {
    let collapsed = cell_box.collapsed_axes();
    match (kind, collapsed.as_slice()) {
        (ShapeKind::Volume, []) => Ok(None),
        (ShapeKind::Surface, [axis]) => Ok(Some(*axis)),
        (ShapeKind::Volume, _) => Err(BuildError::MalformedShape(format!(
            "a volume cannot be collapsed along {:?}",
            collapsed
        ))),
        (ShapeKind::Surface, _) => Err(BuildError::MalformedShape(format!(
            "a surface must be collapsed along exactly one axis, found {}",
            collapsed.len()
        ))),
    }
}

/// Round to the nearest integer, with exact halves rounded toward zero.
pub fn round_value(value: f64) -> i64 {
    let truncated = value.trunc();
    if (value - truncated).abs() == 0.5 {
        truncated as i64
    } else {
        value.round() as i64
    }
}
