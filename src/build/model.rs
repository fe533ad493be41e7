//! Whole-scene build: declarations processed strictly in order.

use log::{info, warn};

use crate::core::types::{BuildResult, Result};
use crate::core::BuildError;
use crate::material::{LinearMixture, MaterialProps};
use crate::scene::{Declaration, SceneConfig};
use crate::voxel::VoxelWriter;
use super::fractal_box::build_fractal_box;
use super::primitive::build_box;
use super::BuildContext;

/// Build every declaration of a scene into `writer`.
///
/// Surface modifiers are applied as part of the fractal box they name,
/// wherever they appear in the scene. Modifiers naming a box that is never
/// declared are reported and skipped. The first failure aborts the build.
pub fn build_scene<W: VoxelWriter + ?Sized>(scene: &SceneConfig, writer: &mut W) -> Result<BuildContext> {
    let mut ctx = BuildContext::from_scene(scene)?;
    info!(
        "Domain {:?} cells of {:?}m, time step {:e}s",
        ctx.domain.cells, ctx.domain.spacing, ctx.dt
    );

    for decl in &scene.declarations {
        match decl {
            Declaration::Material(d) => {
                add_material(&mut ctx, &d.id, d.props).map_err(|e| e.in_command(decl.to_string()))?;
                info!(
                    "Material {} with er={}, se={}, mr={}, sm={}",
                    d.id, d.props.er, d.props.se, d.props.mr, d.props.sm
                );
            }
            Declaration::Mixture(d) => {
                ctx.add_mixing_model(Box::new(LinearMixture::new(d.id.clone(), d.dry, d.wet)))
                    .map_err(|e| e.in_command(decl.to_string()))?;
                info!("Mixing model {} between er={} and er={}", d.id, d.dry.er, d.wet.er);
            }
            Declaration::Box(d) => {
                build_box(&mut ctx, writer, d)?;
            }
            Declaration::FractalBox(d) => {
                let modifiers: Vec<&Declaration> = scene
                    .declarations
                    .iter()
                    .filter(|m| m.modifier_target() == Some(d.id.as_str()))
                    .collect();
                build_fractal_box(&mut ctx, writer, d, &modifiers)?;
            }
            Declaration::AddSurfaceRoughness(_) | Declaration::AddSurfaceWater(_) | Declaration::AddGrass(_) => {}
        }
    }

    for decl in &scene.declarations {
        if let Some(target) = decl.modifier_target() {
            if !ctx.has_fractal_box(target) {
                warn!("'{decl}' refers to fractal box {target}, which was never declared; ignored");
            }
        }
    }

    info!("Model built with {} material(s)", ctx.registry.len());
    Ok(ctx)
}

fn add_material(ctx: &mut BuildContext, id: &str, props: MaterialProps) -> BuildResult<()> {
    if ctx.mixing_model(id).is_some() {
        return Err(BuildError::DuplicateMaterial(id.to_string()));
    }
    ctx.registry.add_material(id, props)?;
    Ok(())
}
