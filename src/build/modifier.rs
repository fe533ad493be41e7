//! Surface modifiers: roughness, water and grass on the faces of a fractal volume.
//!
//! Requests are in cell-index units. Positions along the face normal are
//! absolute indices, not offsets from the face.

use log::debug;

use crate::core::types::BuildResult;
use crate::core::BuildError;
use crate::domain::Domain;
use crate::fractal::{seed, spectral, Face, FractalSurface, FractalVolume, SurfaceModifier};
use crate::material::{BuiltinMaterial, MaterialRegistry};
use crate::math::CellBox;
use crate::vegetation::{place_blades, GrassGeometry, GrassPatch};

/// Weighting of the surface used to place grass
const GRASS_WEIGHTING: [f64; 2] = [1.0, 1.0];

#[derive(Clone, Debug, PartialEq)]
pub struct RoughnessRequest {
    pub plane: CellBox,
    pub dimension: f64,
    pub weighting: [f64; 2],
    /// Lower and upper height along the normal
    pub range: (i64, i64),
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WaterRequest {
    pub plane: CellBox,
    /// Index along the normal the water reaches
    pub depth: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GrassRequest {
    pub plane: CellBox,
    pub dimension: f64,
    /// Minimum and maximum blade tip along the normal
    pub heights: (i64, i64),
    pub blades: usize,
    pub seed: Option<u64>,
}

/// Attaches modifiers to fractal volumes against one build's domain,
/// registry and time step.
pub struct SurfacePipeline<'a> {
    domain: &'a Domain,
    registry: &'a mut MaterialRegistry,
    dt: f64,
}

impl<'a> SurfacePipeline<'a> {
    pub fn new(domain: &'a Domain, registry: &'a mut MaterialRegistry, dt: f64) -> Self {
        Self { domain, registry, dt }
    }

    /// Attach a rough surface whose heights span `range`.
    pub fn add_roughness(&mut self, volume: &mut FractalVolume, request: RoughnessRequest) -> BuildResult<Face> {
        let face = volume.face_of(&request.plane)?;
        ensure_unused(volume, face)?;
        let axis = face.axis();
        let range = self.domain.validate_extent(request.range.0, request.range.1, axis, false)?;
        let (lo, hi) = (volume.original.lo_on(axis), volume.original.hi_on(axis));
        if (face.is_plus() && range.0 < lo) || (!face.is_plus() && range.1 > hi) {
            return Err(BuildError::InvalidParameter(format!(
                "the fractal range [{}, {}] must not extend past the opposite face of the fractal box ({lo}..{hi} on {axis})",
                range.0, range.1
            )));
        }

        let mut rng = seed::generator(request.seed);
        let dims = FractalSurface::field_dims(&request.plane, axis);
        let mut field = spectral::surface_field(dims, request.dimension, request.weighting, &mut rng)?;
        spectral::rescale(field.as_mut_slice(), range.0 as f64, range.1 as f64);

        volume.attach(FractalSurface {
            face,
            plane: request.plane,
            dimension: request.dimension,
            weighting: request.weighting,
            seed: request.seed,
            range,
            field,
            modifier: SurfaceModifier::Roughness,
        })?;
        debug!("Roughness on {face} of {} spans {}..{}", volume.id, range.0, range.1);
        Ok(face)
    }

    /// Flood the troughs of an existing rough surface up to `depth`.
    pub fn add_water(&mut self, volume: &mut FractalVolume, request: WaterRequest) -> BuildResult<Face> {
        let face = volume.face_of(&request.plane)?;
        let surface = volume
            .surface_mut(face)
            .filter(|s| !s.is_grass())
            .ok_or_else(|| BuildError::MissingSurface(face.to_string()))?;

        let (lo, hi) = surface.range;
        if request.depth < lo as i64 || request.depth > hi as i64 {
            return Err(BuildError::DepthOutOfRange { depth: request.depth, lo: lo as i64, hi: hi as i64 });
        }

        let water = self.registry.register_builtin(BuiltinMaterial::Water);
        self.registry.check_timestep(water, self.dt)?;
        surface.modifier = SurfaceModifier::Water { fill_depth: request.depth as u32 };
        debug!("Water on {face} of {} filled to {}", volume.id, request.depth);
        Ok(face)
    }

    /// Grow grass on a plus face.
    ///
    /// A fractal surface scaled to `[0, 1]` is the placement probability of
    /// each cell; blade heights are drawn from `heights`. Blades drawn below
    /// the top of the box grow nothing.
    pub fn add_grass(&mut self, volume: &mut FractalVolume, request: GrassRequest) -> BuildResult<Face> {
        let face = volume.face_of(&request.plane)?;
        if !face.is_plus() {
            return Err(BuildError::InvalidOrientation(face.to_string()));
        }
        ensure_unused(volume, face)?;
        if request.blades == 0 {
            return Err(BuildError::InvalidParameter("requires a positive number of blades".to_string()));
        }
        let axis = face.axis();
        let heights = self.domain.validate_extent(request.heights.0, request.heights.1, axis, false)?;

        let mut rng = seed::generator(request.seed);
        let dims = FractalSurface::field_dims(&request.plane, axis);
        let mut probability = spectral::surface_field(dims, request.dimension, GRASS_WEIGHTING, &mut rng)?;
        spectral::rescale(probability.as_mut_slice(), 0.0, 1.0);
        let field = place_blades(&probability, request.blades, heights, &mut rng)?;
        let geometry = GrassGeometry::new(request.blades, &mut rng);

        let grass = self.registry.register_builtin(BuiltinMaterial::Grass);
        self.registry.check_timestep(grass, self.dt)?;

        volume.attach(FractalSurface {
            face,
            plane: request.plane,
            dimension: request.dimension,
            weighting: GRASS_WEIGHTING,
            seed: request.seed,
            range: heights,
            field,
            modifier: SurfaceModifier::Grass(GrassPatch { blades: request.blades, geometry }),
        })?;
        debug!("{} grass blade(s) on {face} of {}", request.blades, volume.id);
        Ok(face)
    }
}

fn ensure_unused(volume: &FractalVolume, face: Face) -> BuildResult<()> {
    match volume.surface(face) {
        Some(_) => Err(BuildError::DuplicateSurface(face.to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DVec3, UVec3};
    use crate::fractal::VolumeMaterial;
    use crate::material::MaterialId;

    fn domain() -> Domain {
        Domain::new(UVec3::new(50, 50, 25), DVec3::splat(0.002))
    }

    fn volume() -> FractalVolume {
        FractalVolume::new(
            "soil",
            CellBox::new(UVec3::new(10, 10, 0), UVec3::new(20, 20, 5)),
            1.5,
            [1.0; 3],
            1,
            VolumeMaterial::Single(MaterialId(2)),
        )
    }

    fn top() -> CellBox {
        CellBox::new(UVec3::new(10, 10, 5), UVec3::new(20, 20, 5))
    }

    fn roughness(range: (i64, i64)) -> RoughnessRequest {
        RoughnessRequest { plane: top(), dimension: 1.5, weighting: [1.0, 1.0], range, seed: Some(3) }
    }

    #[test]
    fn test_roughness_field_within_range() {
        let domain = domain();
        let mut registry = MaterialRegistry::new();
        let mut v = volume();
        SurfacePipeline::new(&domain, &mut registry, 1e-12).add_roughness(&mut v, roughness((5, 8))).unwrap();
        let surface = v.surface(Face::ZPlus).unwrap();
        assert_eq!(surface.field.dims(), [10, 10]);
        assert!(surface.field.as_slice().iter().all(|h| (5.0..=8.0).contains(h)));
        // Growth is deferred to compositing.
        assert_eq!(v.extent, v.original);
    }

    #[test]
    fn test_roughness_rejects_second_on_face() {
        let domain = domain();
        let mut registry = MaterialRegistry::new();
        let mut v = volume();
        let mut pipeline = SurfacePipeline::new(&domain, &mut registry, 1e-12);
        pipeline.add_roughness(&mut v, roughness((5, 8))).unwrap();
        let err = pipeline.add_roughness(&mut v, roughness((4, 9))).unwrap_err();
        assert_eq!(err, BuildError::DuplicateSurface("zplus".into()));
    }

    #[test]
    fn test_roughness_range_outside_domain() {
        let domain = domain();
        let mut registry = MaterialRegistry::new();
        let mut v = volume();
        let err = SurfacePipeline::new(&domain, &mut registry, 1e-12).add_roughness(&mut v, roughness((5, 30))).unwrap_err();
        assert!(matches!(err, BuildError::OutOfDomain { .. }));
    }

    #[test]
    fn test_roughness_range_below_plus_face_box() {
        let domain = domain();
        let mut registry = MaterialRegistry::new();
        let mut v = FractalVolume::new(
            "raised",
            CellBox::new(UVec3::new(10, 10, 4), UVec3::new(20, 20, 8)),
            1.5,
            [1.0; 3],
            1,
            VolumeMaterial::Single(MaterialId(2)),
        );
        let mut request = roughness((2, 9));
        request.plane = CellBox::new(UVec3::new(10, 10, 8), UVec3::new(20, 20, 8));
        let err = SurfacePipeline::new(&domain, &mut registry, 1e-12).add_roughness(&mut v, request).unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter(_)));
    }

    #[test]
    fn test_water_depth_bounds_are_inclusive() {
        let domain = domain();
        let mut registry = MaterialRegistry::new();
        let mut v = volume();
        let mut pipeline = SurfacePipeline::new(&domain, &mut registry, 1e-12);
        pipeline.add_roughness(&mut v, roughness((5, 8))).unwrap();

        let err = pipeline.add_water(&mut v, WaterRequest { plane: top(), depth: 4 }).unwrap_err();
        assert_eq!(err, BuildError::DepthOutOfRange { depth: 4, lo: 5, hi: 8 });
        let err = pipeline.add_water(&mut v, WaterRequest { plane: top(), depth: 9 }).unwrap_err();
        assert_eq!(err, BuildError::DepthOutOfRange { depth: 9, lo: 5, hi: 8 });

        pipeline.add_water(&mut v, WaterRequest { plane: top(), depth: 5 }).unwrap();
        assert_eq!(v.surface(Face::ZPlus).unwrap().fill_depth(), Some(5));
        pipeline.add_water(&mut v, WaterRequest { plane: top(), depth: 8 }).unwrap();
        assert_eq!(v.surface(Face::ZPlus).unwrap().fill_depth(), Some(8));
        assert!(registry.find("water").is_some());
    }

    #[test]
    fn test_water_needs_rough_surface() {
        let domain = domain();
        let mut registry = MaterialRegistry::new();
        let mut v = volume();
        let err = SurfacePipeline::new(&domain, &mut registry, 1e-12)
            .add_water(&mut v, WaterRequest { plane: top(), depth: 5 })
            .unwrap_err();
        assert_eq!(err, BuildError::MissingSurface("zplus".into()));
        assert!(registry.find("water").is_none());
    }

    #[test]
    fn test_water_time_step_too_coarse() {
        let domain = domain();
        let mut registry = MaterialRegistry::new();
        let mut v = volume();
        let mut pipeline = SurfacePipeline::new(&domain, &mut registry, 1e-11);
        pipeline.add_roughness(&mut v, roughness((5, 8))).unwrap();
        let err = pipeline.add_water(&mut v, WaterRequest { plane: top(), depth: 6 }).unwrap_err();
        assert!(matches!(err, BuildError::TimestepTooCoarse { .. }));
    }

    fn grass(plane: CellBox, blades: usize) -> GrassRequest {
        GrassRequest { plane, dimension: 1.5, heights: (7, 10), blades, seed: Some(5) }
    }

    #[test]
    fn test_grass_only_on_plus_faces() {
        let domain = domain();
        let mut registry = MaterialRegistry::new();
        let mut v = volume();
        let bottom = CellBox::new(UVec3::new(10, 10, 0), UVec3::new(20, 20, 0));
        let err = SurfacePipeline::new(&domain, &mut registry, 1e-12).add_grass(&mut v, grass(bottom, 5)).unwrap_err();
        assert_eq!(err, BuildError::InvalidOrientation("zminus".into()));
    }

    #[test]
    fn test_grass_places_blades() {
        let domain = domain();
        let mut registry = MaterialRegistry::new();
        let mut v = volume();
        SurfacePipeline::new(&domain, &mut registry, 1e-12).add_grass(&mut v, grass(top(), 20)).unwrap();
        let surface = v.surface(Face::ZPlus).unwrap();
        assert!(surface.is_grass());
        let placed: Vec<f64> = surface.field.as_slice().iter().copied().filter(|h| *h > 0.0).collect();
        assert!(!placed.is_empty() && placed.len() <= 20);
        assert!(placed.iter().all(|h| (7.0..10.0).contains(h)));
        assert!(registry.find("grass").is_some());
    }

    #[test]
    fn test_grass_too_many_blades() {
        let domain = domain();
        let mut registry = MaterialRegistry::new();
        let mut v = volume();
        // The scaled field has exactly one zero cell, at its minimum.
        let err = SurfacePipeline::new(&domain, &mut registry, 1e-12).add_grass(&mut v, grass(top(), 100)).unwrap_err();
        assert_eq!(err, BuildError::SurfaceTooSmall { blades: 100, cells: 99 });
    }

    #[test]
    fn test_grass_heights_may_start_below_box_top() {
        let domain = domain();
        let mut registry = MaterialRegistry::new();
        let mut v = volume();
        let mut request = grass(top(), 5);
        request.heights = (3, 9);
        SurfacePipeline::new(&domain, &mut registry, 1e-12).add_grass(&mut v, request).unwrap();
        let surface = v.surface(Face::ZPlus).unwrap();
        assert_eq!(surface.range, (3, 9));
        assert!(surface.field.as_slice().iter().all(|h| *h == 0.0 || (3.0..9.0).contains(h)));
    }

    #[test]
    fn test_water_on_grass_is_missing_surface() {
        let domain = domain();
        let mut registry = MaterialRegistry::new();
        let mut v = volume();
        let mut pipeline = SurfacePipeline::new(&domain, &mut registry, 1e-12);
        pipeline.add_grass(&mut v, grass(top(), 5)).unwrap();
        let err = pipeline.add_water(&mut v, WaterRequest { plane: top(), depth: 8 }).unwrap_err();
        assert!(matches!(err, BuildError::MissingSurface(_)));
    }
}
