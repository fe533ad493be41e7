//! Fractal box orchestration: one declared box plus the modifiers aimed at it.

use log::info;

use crate::core::logging::{seed_label, smoothing_label};
use crate::core::types::{BuildResult, DVec3, Result, UVec3};
use crate::core::BuildError;
use crate::domain::{validate_orientation, Domain, ShapeKind};
use crate::fractal::{FractalVolume, VolumeMaterial};
use crate::mask::{composite, CompositedVolume};
use crate::math::{Axis, CellBox};
use crate::scene::{Declaration, FractalBoxDecl};
use crate::voxel::VoxelWriter;
use super::modifier::{GrassRequest, RoughnessRequest, SurfacePipeline, WaterRequest};
use super::BuildContext;

/// Build a fractal box, apply its modifiers in order, composite and emit it.
///
/// Failures in the box itself carry the box's command text; failures in a
/// modifier carry the modifier's.
pub fn build_fractal_box<W: VoxelWriter + ?Sized>(
    ctx: &mut BuildContext,
    writer: &mut W,
    decl: &FractalBoxDecl,
    modifiers: &[&Declaration],
) -> Result<CompositedVolume> {
    let command = Declaration::FractalBox(decl.clone()).to_string();
    let mut volume = declare_volume(ctx, decl).map_err(|e| e.in_command(&command))?;

    for modifier in modifiers {
        apply_modifier(ctx, &mut volume, modifier).map_err(|e| e.in_command(modifier.to_string()))?;
    }

    let composited = composite(&mut volume, &ctx.registry).map_err(|e| e.in_command(&command))?;
    if volume.extent != volume.original {
        info!(
            "Fractal box {} grown to {:?}m to {:?}m to fit its surfaces",
            decl.id,
            physical(&ctx.domain, volume.extent.lo),
            physical(&ctx.domain, volume.extent.hi)
        );
    }
    composited.emit(writer);
    ctx.fractal_boxes.insert(decl.id.clone());
    Ok(composited)
}

fn declare_volume(ctx: &mut BuildContext, decl: &FractalBoxDecl) -> BuildResult<FractalVolume> {
    let extent = ctx.domain.cell_box(DVec3::from_array(decl.lo), DVec3::from_array(decl.hi), ShapeKind::Volume)?;
    if !decl.dimension.is_finite() || decl.dimension < 0.0 {
        return Err(BuildError::InvalidParameter("requires a positive value for the fractal dimension".to_string()));
    }
    if decl.weighting.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(BuildError::InvalidParameter("requires a positive value for the fractal weighting".to_string()));
    }
    if decl.bins == 0 {
        return Err(BuildError::InvalidParameter("requires a positive value for the number of bins".to_string()));
    }
    if ctx.has_fractal_box(&decl.id) {
        return Err(BuildError::InvalidParameter(format!("a fractal box with ID {} already exists", decl.id)));
    }

    let material = match ctx.mixtures.get(&decl.material) {
        Some(model) => VolumeMaterial::Mixture { start: model.materialize(decl.bins, &mut ctx.registry)? },
        None => match ctx.registry.num_id(&decl.material) {
            Some(_) if decl.bins > 1 => {
                return Err(BuildError::InvalidParameter(format!(
                    "{} is a single material, more than one bin requires a mixing model",
                    decl.material
                )));
            }
            Some(id) => VolumeMaterial::Single(id),
            None => return Err(BuildError::UnknownMaterial(vec![decl.material.clone()])),
        },
    };

    info!(
        "Fractal box {} from {:?}m to {:?}m with {}, fractal dimension {}, fractal weightings {:?}, \
         {} bin(s), seed {}, dielectric smoothing is {}",
        decl.id,
        decl.lo,
        decl.hi,
        decl.material,
        decl.dimension,
        decl.weighting,
        decl.bins,
        seed_label(decl.seed),
        smoothing_label(decl.averaging)
    );

    Ok(FractalVolume::new(decl.id.clone(), extent, decl.dimension, decl.weighting, decl.bins, material)
        .with_seed(decl.seed)
        .with_averaging(decl.averaging))
}

fn physical(domain: &Domain, cell: UVec3) -> [f64; 3] {
    Axis::ALL.map(|axis| domain.to_physical(cell[axis.index()] as i64, axis))
}

/// Plane of a surface declaration and its normal axis.
fn surface_plane(domain: &Domain, lo: [f64; 3], hi: [f64; 3]) -> BuildResult<(CellBox, Axis)> {
    let plane = domain.cell_box(DVec3::from_array(lo), DVec3::from_array(hi), ShapeKind::Surface)?;
    match validate_orientation(&plane, ShapeKind::Surface)? {
        Some(axis) => Ok((plane, axis)),
        None => Err(BuildError::MalformedShape("a surface must be collapsed along one axis".to_string())),
    }
}

fn apply_modifier(ctx: &mut BuildContext, volume: &mut FractalVolume, decl: &Declaration) -> BuildResult<()> {
    let domain = &ctx.domain;
    let mut pipeline = SurfacePipeline::new(domain, &mut ctx.registry, ctx.dt);
    match decl {
        Declaration::AddSurfaceRoughness(d) => {
            let (plane, axis) = surface_plane(domain, d.lo, d.hi)?;
            let range = (domain.to_index(d.range[0], axis), domain.to_index(d.range[1], axis));
            let face = pipeline.add_roughness(
                volume,
                RoughnessRequest { plane, dimension: d.dimension, weighting: d.weighting, range, seed: d.seed },
            )?;
            info!(
                "Fractal surface from {:?}m to {:?}m on {} of {}, fractal dimension {}, fractal weightings {:?}, \
                 fractal range {}m to {}m, seed {}",
                d.lo,
                d.hi,
                face,
                volume.id,
                d.dimension,
                d.weighting,
                d.range[0],
                d.range[1],
                seed_label(d.seed)
            );
        }
        Declaration::AddSurfaceWater(d) => {
            if d.depth.is_nan() || d.depth <= 0.0 {
                return Err(BuildError::InvalidParameter("requires a positive value for the depth of water".to_string()));
            }
            let (plane, axis) = surface_plane(domain, d.lo, d.hi)?;
            let depth = domain.to_index(d.depth, axis);
            let face = pipeline.add_water(volume, WaterRequest { plane, depth })?;
            info!("Water on {} of {} filled to {}m", face, volume.id, d.depth);
        }
        Declaration::AddGrass(d) => {
            let (plane, axis) = surface_plane(domain, d.lo, d.hi)?;
            let heights = (domain.to_index(d.heights[0], axis), domain.to_index(d.heights[1], axis));
            let face = pipeline.add_grass(
                volume,
                GrassRequest { plane, dimension: d.dimension, heights, blades: d.blades, seed: d.seed },
            )?;
            info!(
                "{} blade(s) of grass on {} of {}, fractal dimension {}, blade heights {}m to {}m, seed {}",
                d.blades,
                face,
                volume.id,
                d.dimension,
                d.heights[0],
                d.heights[1],
                seed_label(d.seed)
            );
        }
        Declaration::Material(_) | Declaration::Mixture(_) | Declaration::Box(_) | Declaration::FractalBox(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::mask::MaskCell;
    use crate::material::{LinearMixture, MaterialId, MaterialProps};
    use crate::scene::{GrassDecl, RoughnessDecl, WaterDecl};
    use crate::voxel::SolidGrid;

    // 50 x 50 x 25 cells of 2 mm
    fn ctx() -> BuildContext {
        let mut ctx = BuildContext::new(Domain::new(UVec3::new(50, 50, 25), DVec3::splat(0.002)), 1e-12);
        ctx.registry
            .add_material("sand", MaterialProps { er: 3.0, se: 0.001, mr: 1.0, sm: 0.0 })
            .unwrap();
        ctx
    }

    fn soil_box(bins: usize) -> FractalBoxDecl {
        FractalBoxDecl {
            lo: [0.02, 0.02, 0.0],
            hi: [0.04, 0.04, 0.01],
            dimension: 1.5,
            weighting: [1.0, 1.0, 1.0],
            bins,
            material: "sand".to_string(),
            id: "soil".to_string(),
            seed: Some(17),
            averaging: false,
        }
    }

    fn roughness(range: [f64; 2]) -> Declaration {
        Declaration::AddSurfaceRoughness(RoughnessDecl {
            lo: [0.02, 0.02, 0.01],
            hi: [0.04, 0.04, 0.01],
            dimension: 1.5,
            weighting: [1.0, 1.0],
            range,
            fractal_box: "soil".to_string(),
            seed: Some(23),
        })
    }

    fn water(depth: f64) -> Declaration {
        Declaration::AddSurfaceWater(WaterDecl {
            lo: [0.02, 0.02, 0.01],
            hi: [0.04, 0.04, 0.01],
            depth,
            fractal_box: "soil".to_string(),
        })
    }

    #[test]
    fn test_unmodified_single_material_box_is_degenerate() {
        let mut ctx = ctx();
        let mut grid = SolidGrid::for_domain(&ctx.domain);
        let err = build_fractal_box(&mut ctx, &mut grid, &soil_box(1), &[]).unwrap_err();
        assert_eq!(err.build_error(), Some(&BuildError::DegenerateFractalBox));
        assert!(err.to_string().starts_with("'#fractal_box: 0.02 0.02 0 0.04 0.04 0.01"));
    }

    #[test]
    fn test_roughness_on_top_grows_box() {
        let mut ctx = ctx();
        let mut grid = SolidGrid::for_domain(&ctx.domain);
        let rough = roughness([0.01, 0.016]);
        let out = build_fractal_box(&mut ctx, &mut grid, &soil_box(1), &[&rough]).unwrap();
        let mask = out.mask.as_ref().unwrap();
        assert_eq!(mask.dims(), [10, 10, 8]);
        assert_eq!(out.origin, UVec3::new(10, 10, 0));

        let sand = ctx.registry.num_id("sand").unwrap();
        for ([i, j, k], cell) in mask.indexed_iter() {
            let world = [i + 10, j + 10, k];
            if k < 5 {
                assert_eq!(cell, MaskCell::Filled);
            }
            if cell == MaskCell::Filled {
                assert_eq!(grid.solid(world), sand);
            } else {
                assert_eq!(grid.solid(world), MaterialId::FREE_SPACE);
            }
        }
        assert!(ctx.has_fractal_box("soil"));
    }

    #[test]
    fn test_water_depth_at_range_floor() {
        let mut ctx = ctx();
        let mut grid = SolidGrid::for_domain(&ctx.domain);
        let rough = roughness([0.01, 0.016]);
        let at_floor = water(0.01);
        build_fractal_box(&mut ctx, &mut grid, &soil_box(1), &[&rough, &at_floor]).unwrap();
        assert!(ctx.registry.find("water").is_some());
    }

    #[test]
    fn test_water_depth_below_range_floor() {
        let mut ctx = ctx();
        let mut grid = SolidGrid::for_domain(&ctx.domain);
        let rough = roughness([0.01, 0.016]);
        let below = water(0.008);
        let err = build_fractal_box(&mut ctx, &mut grid, &soil_box(1), &[&rough, &below]).unwrap_err();
        assert_eq!(err.build_error(), Some(&BuildError::DepthOutOfRange { depth: 4, lo: 5, hi: 8 }));
        assert!(err.to_string().starts_with("'#add_surface_water:"));
    }

    #[test]
    fn test_water_requires_positive_depth() {
        let mut ctx = ctx();
        let mut grid = SolidGrid::for_domain(&ctx.domain);
        let rough = roughness([0.01, 0.016]);
        let dry = water(0.0);
        let err = build_fractal_box(&mut ctx, &mut grid, &soil_box(1), &[&rough, &dry]).unwrap_err();
        assert!(matches!(err.build_error(), Some(BuildError::InvalidParameter(_))));
    }

    #[test]
    fn test_grass_builds_vegetation() {
        let mut ctx = ctx();
        let mut grid = SolidGrid::for_domain(&ctx.domain);
        let grass = Declaration::AddGrass(GrassDecl {
            lo: [0.02, 0.02, 0.01],
            hi: [0.04, 0.04, 0.01],
            dimension: 1.5,
            heights: [0.014, 0.02],
            blades: 12,
            fractal_box: "soil".to_string(),
            seed: Some(31),
        });
        let out = build_fractal_box(&mut ctx, &mut grid, &soil_box(1), &[&grass]).unwrap();
        assert!(out.count(MaskCell::Vegetation) > 0);
        let grass_id = ctx.registry.num_id("grass").unwrap();
        assert_eq!(out.grass, Some(grass_id));
        assert!(grid.counts().get(&grass_id).copied().unwrap_or(0) > 0);
    }

    #[test]
    fn test_mixture_box_without_modifiers() {
        let mut ctx = ctx();
        let wet = MaterialProps { er: 20.0, se: 0.05, mr: 1.0, sm: 0.0 };
        ctx.add_mixing_model(Box::new(LinearMixture::new("loam", MaterialProps::FREE_SPACE, wet))).unwrap();
        let mut grid = SolidGrid::for_domain(&ctx.domain);
        let mut decl = soil_box(4);
        decl.material = "loam".to_string();
        let out = build_fractal_box(&mut ctx, &mut grid, &decl, &[]).unwrap();
        assert!(out.mask.is_none());
        let start = ctx.registry.num_id("loam|4:0").unwrap();
        assert!(out.materials.as_slice().iter().all(|m| (start.0..start.0 + 4).contains(&m.0)));
    }

    #[test]
    fn test_single_material_with_bins_rejected() {
        let mut ctx = ctx();
        let mut grid = SolidGrid::for_domain(&ctx.domain);
        let err = build_fractal_box(&mut ctx, &mut grid, &soil_box(3), &[]).unwrap_err();
        assert!(matches!(err.build_error(), Some(BuildError::InvalidParameter(_))));
    }

    #[test]
    fn test_unknown_material() {
        let mut ctx = ctx();
        let mut grid = SolidGrid::for_domain(&ctx.domain);
        let mut decl = soil_box(1);
        decl.material = "clay".to_string();
        let err = build_fractal_box(&mut ctx, &mut grid, &decl, &[]).unwrap_err();
        assert_eq!(err.build_error(), Some(&BuildError::UnknownMaterial(vec!["clay".to_string()])));
    }

    #[test]
    fn test_box_outside_domain() {
        let mut ctx = ctx();
        let mut grid = SolidGrid::for_domain(&ctx.domain);
        let mut decl = soil_box(1);
        decl.hi[2] = 0.2;
        let err = build_fractal_box(&mut ctx, &mut grid, &decl, &[]).unwrap_err();
        assert!(matches!(err, Error::Command { source: BuildError::OutOfDomain { axis: Axis::Z, .. }, .. }));
    }

    #[test]
    fn test_same_seed_same_voxels() {
        let run = || {
            let mut ctx = ctx();
            let mut grid = SolidGrid::for_domain(&ctx.domain);
            let rough = roughness([0.01, 0.016]);
            build_fractal_box(&mut ctx, &mut grid, &soil_box(1), &[&rough]).unwrap();
            grid.counts()
        };
        assert_eq!(run(), run());
    }
}
