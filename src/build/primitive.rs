//! Plain box primitive.

use log::info;

use crate::core::logging::smoothing_label;
use crate::core::types::{BuildResult, DVec3, Result};
use crate::domain::ShapeKind;
use crate::material::ResolvedMaterial;
use crate::scene::{BoxDecl, Declaration};
use crate::voxel::VoxelWriter;
use super::BuildContext;

/// Resolve a box's material(s) and stamp it into the writer.
pub fn build_box<W: VoxelWriter + ?Sized>(ctx: &mut BuildContext, writer: &mut W, decl: &BoxDecl) -> Result<ResolvedMaterial> {
    declare_box(ctx, writer, decl).map_err(|e| e.in_command(Declaration::Box(decl.clone()).to_string()))
}

fn declare_box<W: VoxelWriter + ?Sized>(ctx: &mut BuildContext, writer: &mut W, decl: &BoxDecl) -> BuildResult<ResolvedMaterial> {
    let extent = ctx.domain.cell_box(DVec3::from_array(decl.lo), DVec3::from_array(decl.hi), ShapeKind::Volume)?;
    let averaging = decl.averaging.unwrap_or(ctx.average_volume_objects);
    let material = ctx.registry.resolve(&decl.materials, averaging)?;
    writer.write_uniform(extent, &material);
    info!(
        "Box from {:?}m to {:?}m of material(s) {}, dielectric smoothing is {}",
        decl.lo,
        decl.hi,
        decl.materials.join(", "),
        smoothing_label(material.averaging)
    );
    Ok(material)
}
