//! Voxel output: the seam between geometry building and the solver grid.

pub mod solid_grid;

pub use solid_grid::SolidGrid;

use crate::core::types::UVec3;
use crate::mask::MaskCell;
use crate::material::{MaterialId, ResolvedMaterial};
use crate::math::{CellBox, Grid3};

/// Destination for voxelized geometry.
///
/// Writes are applied in scene order and later writes replace earlier ones
/// cell by cell. Cells outside the destination are ignored.
pub trait VoxelWriter {
    /// Write a masked fractal volume whose cell `[0, 0, 0]` sits at `origin`.
    ///
    /// `Filled` cells take their entry from `materials`, `Water` and
    /// `Vegetation` cells the given built-in, and `Background` cells are
    /// left as they were.
    fn write_mask(
        &mut self,
        origin: UVec3,
        mask: &Grid3<MaskCell>,
        materials: &Grid3<MaterialId>,
        water: Option<MaterialId>,
        grass: Option<MaterialId>,
        averaging: bool,
    );

    /// Write every cell of an unmasked fractal volume.
    fn write_field(&mut self, origin: UVec3, materials: &Grid3<MaterialId>, averaging: bool);

    /// Fill a box with one (possibly anisotropic) material.
    fn write_uniform(&mut self, extent: CellBox, material: &ResolvedMaterial);
}
