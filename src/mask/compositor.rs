//! Turns a fractal volume and its surfaces into a material grid and mask.

use log::debug;

use crate::core::types::{BuildResult, UVec3};
use crate::core::BuildError;
use crate::fractal::{FractalSurface, FractalVolume, SurfaceModifier};
use crate::material::{BuiltinMaterial, MaterialId, MaterialRegistry};
use crate::math::{Axis, Grid3};
use crate::vegetation::{GrassPatch, StrandKind, StrandWalk};
use crate::voxel::VoxelWriter;
use super::MaskCell;

/// Final cell data for one fractal volume, ready to be written.
#[derive(Clone, Debug)]
pub struct CompositedVolume {
    pub id: String,
    /// Absolute index of cell `[0, 0, 0]`
    pub origin: UVec3,
    /// Fractal material of every cell
    pub materials: Grid3<MaterialId>,
    /// Occupancy mask; absent when the volume has no surfaces
    pub mask: Option<Grid3<MaskCell>>,
    pub water: Option<MaterialId>,
    pub grass: Option<MaterialId>,
    pub averaging: bool,
}

impl CompositedVolume {
    /// Hand the cells to a writer.
    pub fn emit<W: VoxelWriter + ?Sized>(&self, writer: &mut W) {
        match &self.mask {
            Some(mask) => writer.write_mask(self.origin, mask, &self.materials, self.water, self.grass, self.averaging),
            None => writer.write_field(self.origin, &self.materials, self.averaging),
        }
    }

    /// Number of mask cells of a class.
    pub fn count(&self, class: MaskCell) -> usize {
        self.mask
            .as_ref()
            .map_or(0, |m| m.as_slice().iter().filter(|c| **c == class).count())
    }
}

/// Composite a fractal volume.
///
/// An unmodified volume emits its fractal field directly, and fails with
/// [`BuildError::DegenerateFractalBox`] when it has a single bin. Otherwise
/// the volume is grown to fit its surfaces, the declared box is marked
/// filled, and each surface carves, floods or grows grass in turn.
pub fn composite(volume: &mut FractalVolume, registry: &MaterialRegistry) -> BuildResult<CompositedVolume> {
    if !volume.is_modified() {
        if volume.bins == 1 {
            return Err(BuildError::DegenerateFractalBox);
        }
        let materials = materials(volume)?;
        return Ok(CompositedVolume {
            id: volume.id.clone(),
            origin: volume.extent.lo,
            materials,
            mask: None,
            water: None,
            grass: None,
            averaging: volume.averaging,
        });
    }

    volume.grow_to_fit();
    let materials = materials(volume)?;
    let mut mask = initial_mask(volume);

    let mut water = None;
    let mut grass = None;
    for surface in volume.surfaces() {
        match &surface.modifier {
            SurfaceModifier::Roughness => carve(&mut mask, volume, surface),
            SurfaceModifier::Water { .. } => {
                water = Some(builtin_id(registry, BuiltinMaterial::Water)?);
                carve(&mut mask, volume, surface);
            }
            SurfaceModifier::Grass(patch) => {
                grass = Some(builtin_id(registry, BuiltinMaterial::Grass)?);
                grow_grass(&mut mask, volume, surface, patch);
            }
        }
        debug!("Composited {} surface on {} of {}", surface.modifier.name(), surface.face, volume.id);
    }

    debug!(
        "Fractal box {} composited over cells {:?} to {:?} with {} surface(s)",
        volume.id,
        volume.extent.lo,
        volume.extent.hi,
        volume.surfaces().len()
    );

    Ok(CompositedVolume {
        id: volume.id.clone(),
        origin: volume.extent.lo,
        materials,
        mask: Some(mask),
        water,
        grass,
        averaging: volume.averaging,
    })
}

fn builtin_id(registry: &MaterialRegistry, builtin: BuiltinMaterial) -> BuildResult<MaterialId> {
    registry
        .num_id(builtin.id())
        .ok_or_else(|| BuildError::UnknownMaterial(vec![builtin.id().to_string()]))
}

fn materials(volume: &FractalVolume) -> BuildResult<Grid3<MaterialId>> {
    let levels = volume.levels()?;
    Ok(levels.map(|level| volume.material_for(level)))
}

/// Background everywhere, filled inside the declared box.
fn initial_mask(volume: &FractalVolume) -> Grid3<MaskCell> {
    let mut mask = Grid3::filled(volume.dims(), MaskCell::Background);
    let lo = volume.original.lo - volume.extent.lo;
    let hi = volume.original.hi - volume.extent.lo;
    for i in lo.x..hi.x {
        for j in lo.y..hi.y {
            for k in lo.z..hi.z {
                mask[[i as usize, j as usize, k as usize]] = MaskCell::Filled;
            }
        }
    }
    mask
}

/// Mask index of a surface cell, given its in-plane field coordinates and
/// an absolute index along the normal.
fn surface_cell(volume: &FractalVolume, surface: &FractalSurface, u: usize, v: usize, k: i64) -> [i64; 3] {
    let axis = surface.face.axis();
    let (a, b) = axis.lateral();
    let lo = volume.extent.lo;
    let mut cell = [0i64; 3];
    cell[axis.index()] = k - lo[axis.index()] as i64;
    cell[a.index()] = (surface.plane.lo_on(a) - lo[a.index()]) as i64 + u as i64;
    cell[b.index()] = (surface.plane.lo_on(b) - lo[b.index()]) as i64 + v as i64;
    cell
}

/// Rough surface, optionally flooded.
///
/// On a plus face a cell at normal index `k` is filled below the local
/// height and flooded below the fill depth; on a minus face both comparisons
/// are mirrored. Everything else in the range is cleared.
fn carve(mask: &mut Grid3<MaskCell>, volume: &FractalVolume, surface: &FractalSurface) {
    let plus = surface.face.is_plus();
    let beyond = |k: f64, level: f64| if plus { k < level } else { k > level };
    let fill = surface.fill_depth().filter(|d| *d > 0).map(f64::from);
    let [nu, nv] = surface.field.dims();
    let (lo, hi) = surface.range;

    for u in 0..nu {
        for v in 0..nv {
            let height = surface.field[[u, v]];
            for k in lo..hi {
                let Some(cell) = mask.checked_index(surface_cell(volume, surface, u, v, k as i64)) else {
                    continue;
                };
                let kf = k as f64;
                mask[cell] = if beyond(kf, height) {
                    MaskCell::Filled
                } else if fill.is_some_and(|d| beyond(kf, d)) {
                    MaskCell::Water
                } else {
                    MaskCell::Background
                };
            }
        }
    }
}

/// Blades up from the surface, then roots down into the declared box.
///
/// Blades and roots are numbered in field order over cells with a positive
/// height. Each strand is collected against the current mask before its
/// cells are marked.
fn grow_grass(mask: &mut Grid3<MaskCell>, volume: &FractalVolume, surface: &FractalSurface, patch: &GrassPatch) {
    let axis: Axis = surface.face.axis();
    let origin = volume.extent.lo_on(axis);
    let top = volume.original.hi_on(axis) as f64;
    let mut geometry = patch.geometry.clone();
    let [nu, nv] = surface.field.dims();

    let columns: Vec<([usize; 2], f64)> = (0..nu)
        .flat_map(|u| (0..nv).map(move |v| (u, v)))
        .filter_map(|(u, v)| {
            let height = surface.field[[u, v]];
            if height <= 0.0 {
                return None;
            }
            let cell = surface_cell(volume, surface, u, v, 0);
            let (a, b) = axis.lateral();
            Some(([cell[a.index()] as usize, cell[b.index()] as usize], height))
        })
        .collect();

    let mut blade_cells = 0;
    for (blade, (column, height)) in columns.iter().enumerate() {
        let cells: Vec<[usize; 3]> = StrandWalk::new(mask, axis, *column, origin, StrandKind::Blade { tip: *height }, |grown| {
            geometry.blade_offset(blade, grown)
        })
        .collect();
        blade_cells += cells.len();
        for cell in cells {
            mask[cell] = MaskCell::Vegetation;
        }
    }

    let mut root_cells = 0;
    for (root, (column, height)) in columns.iter().enumerate() {
        let floor = top - (height - top);
        let cells: Vec<[usize; 3]> = StrandWalk::new(mask, axis, *column, origin, StrandKind::Root { floor }, |_| {
            geometry.root_offset(root)
        })
        .collect();
        root_cells += cells.len();
        for cell in cells {
            mask[cell] = MaskCell::Vegetation;
        }
    }

    debug!(
        "Grew {} of {} blade(s) on {}: {} blade cell(s), {} root cell(s)",
        columns.len(),
        patch.blades,
        surface.face,
        blade_cells,
        root_cells
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::fractal::{Face, VolumeMaterial};
    use crate::math::{CellBox, Grid2};
    use crate::vegetation::GrassGeometry;

    fn sand_volume(registry: &mut MaterialRegistry) -> FractalVolume {
        let sand = registry.add_material("sand", Default::default()).unwrap();
        FractalVolume::new(
            "soil",
            CellBox::new(UVec3::new(10, 10, 0), UVec3::new(20, 20, 5)),
            1.5,
            [1.0; 3],
            1,
            VolumeMaterial::Single(sand),
        )
        .with_seed(Some(4))
    }

    fn top_plane() -> CellBox {
        CellBox::new(UVec3::new(10, 10, 5), UVec3::new(20, 20, 5))
    }

    fn flat_surface(face: Face, plane: CellBox, range: (u32, u32), height: f64, modifier: SurfaceModifier) -> FractalSurface {
        FractalSurface {
            face,
            plane,
            dimension: 1.5,
            weighting: [1.0, 1.0],
            seed: Some(1),
            range,
            field: Grid2::filled(FractalSurface::field_dims(&plane, face.axis()), height),
            modifier,
        }
    }

    /// Grass surface with blade heights taken from `field`.
    fn grass_surface(face: Face, plane: CellBox, range: (u32, u32), field: Grid2<f64>) -> FractalSurface {
        let blades = field.as_slice().iter().filter(|h| **h > 0.0).count();
        let patch = GrassPatch { blades, geometry: GrassGeometry::new(blades, &mut StdRng::seed_from_u64(2)) };
        FractalSurface {
            face,
            plane,
            dimension: 1.5,
            weighting: [1.0, 1.0],
            seed: Some(2),
            range,
            field,
            modifier: SurfaceModifier::Grass(patch),
        }
    }

    fn vegetation_cells(mask: &Grid3<MaskCell>) -> Vec<[usize; 3]> {
        let [ni, nj, nk] = mask.dims();
        (0..ni)
            .flat_map(|i| (0..nj).flat_map(move |j| (0..nk).map(move |k| [i, j, k])))
            .filter(|c| mask[*c] == MaskCell::Vegetation)
            .collect()
    }

    #[test]
    fn test_unmodified_single_bin_is_degenerate() {
        let mut registry = MaterialRegistry::new();
        let mut volume = sand_volume(&mut registry);
        assert_eq!(composite(&mut volume, &registry).unwrap_err(), BuildError::DegenerateFractalBox);
    }

    #[test]
    fn test_unmodified_multi_bin_has_no_mask() {
        let mut registry = MaterialRegistry::new();
        let mut volume = sand_volume(&mut registry);
        volume.bins = 3;
        volume.material = VolumeMaterial::Mixture { start: MaterialId(7) };
        let out = composite(&mut volume, &registry).unwrap();
        assert!(out.mask.is_none());
        assert_eq!(out.materials.dims(), [10, 10, 5]);
        assert!(out.materials.as_slice().iter().all(|m| (7..10).contains(&m.0)));
    }

    #[test]
    fn test_zplus_roughness_grows_and_fills_below_height() {
        let mut registry = MaterialRegistry::new();
        let mut volume = sand_volume(&mut registry);
        let mut surface = flat_surface(Face::ZPlus, top_plane(), (5, 8), 6.5, SurfaceModifier::Roughness);
        // One taller column to check per-column heights.
        surface.field[[0, 0]] = 7.5;
        volume.attach(surface).unwrap();

        let out = composite(&mut volume, &registry).unwrap();
        let mask = out.mask.as_ref().unwrap();
        assert_eq!(mask.dims(), [10, 10, 8]);
        assert_eq!(out.origin, UVec3::new(10, 10, 0));

        for k in 0..5 {
            assert_eq!(mask[[3, 3, k]], MaskCell::Filled);
        }
        assert_eq!(mask[[3, 3, 5]], MaskCell::Filled);
        assert_eq!(mask[[3, 3, 6]], MaskCell::Filled);
        assert_eq!(mask[[3, 3, 7]], MaskCell::Background);
        assert_eq!(mask[[0, 0, 7]], MaskCell::Filled);
    }

    #[test]
    fn test_roughness_clears_below_declared_top() {
        let mut registry = MaterialRegistry::new();
        let mut volume = sand_volume(&mut registry);
        volume.attach(flat_surface(Face::ZPlus, top_plane(), (2, 5), 3.0, SurfaceModifier::Roughness)).unwrap();
        let out = composite(&mut volume, &registry).unwrap();
        let mask = out.mask.unwrap();
        assert_eq!(mask.dims(), [10, 10, 5]);
        assert_eq!(mask[[4, 4, 2]], MaskCell::Filled);
        assert_eq!(mask[[4, 4, 3]], MaskCell::Background);
        assert_eq!(mask[[4, 4, 4]], MaskCell::Background);
    }

    #[test]
    fn test_zminus_roughness_mirrors_comparison() {
        let mut registry = MaterialRegistry::new();
        let sand = registry.add_material("sand", Default::default()).unwrap();
        let mut volume = FractalVolume::new(
            "slab",
            CellBox::new(UVec3::new(0, 0, 4), UVec3::new(3, 3, 8)),
            1.5,
            [1.0; 3],
            1,
            VolumeMaterial::Single(sand),
        );
        let bottom = CellBox::new(UVec3::new(0, 0, 4), UVec3::new(3, 3, 4));
        volume.attach(flat_surface(Face::ZMinus, bottom, (1, 4), 2.0, SurfaceModifier::Roughness)).unwrap();
        let out = composite(&mut volume, &registry).unwrap();
        let mask = out.mask.unwrap();
        assert_eq!(out.origin, UVec3::new(0, 0, 1));
        assert_eq!(mask.dims(), [3, 3, 7]);
        // Absolute z = 1, 2 clear, z = 3 filled, declared box filled.
        assert_eq!(mask[[1, 1, 0]], MaskCell::Background);
        assert_eq!(mask[[1, 1, 1]], MaskCell::Background);
        assert_eq!(mask[[1, 1, 2]], MaskCell::Filled);
        assert_eq!(mask[[1, 1, 3]], MaskCell::Filled);
    }

    #[test]
    fn test_water_fills_troughs() {
        let mut registry = MaterialRegistry::new();
        let water = registry.register_builtin(BuiltinMaterial::Water);
        let mut volume = sand_volume(&mut registry);
        let mut surface = flat_surface(Face::ZPlus, top_plane(), (5, 8), 6.0, SurfaceModifier::Water { fill_depth: 7 });
        surface.field[[2, 2]] = 8.0;
        volume.attach(surface).unwrap();

        let out = composite(&mut volume, &registry).unwrap();
        assert_eq!(out.water, Some(water));
        let mask = out.mask.as_ref().unwrap();
        assert_eq!(mask[[1, 1, 5]], MaskCell::Filled);
        assert_eq!(mask[[1, 1, 6]], MaskCell::Water);
        assert_eq!(mask[[1, 1, 7]], MaskCell::Background);
        assert_eq!(mask[[2, 2, 7]], MaskCell::Filled);
        assert_eq!(out.count(MaskCell::Water), 99);
    }

    #[test]
    fn test_grass_grows_blades_and_roots() {
        let mut registry = MaterialRegistry::new();
        let grass = registry.register_builtin(BuiltinMaterial::Grass);
        let mut volume = sand_volume(&mut registry);
        let plane = top_plane();
        let mut field = Grid2::filled(FractalSurface::field_dims(&plane, Axis::Z), 0.0);
        field[[4, 4]] = 8.0;
        volume.attach(grass_surface(Face::ZPlus, plane, (8, 9), field)).unwrap();

        let out = composite(&mut volume, &registry).unwrap();
        assert_eq!(out.grass, Some(grass));
        let mask = out.mask.as_ref().unwrap();
        assert_eq!(mask.dims(), [10, 10, 9]);
        // Blades bend by less than a cell over three cells, so the blade is straight.
        assert_eq!(mask[[4, 4, 5]], MaskCell::Vegetation);
        assert_eq!(mask[[4, 4, 6]], MaskCell::Vegetation);
        assert_eq!(mask[[4, 4, 7]], MaskCell::Vegetation);
        assert_eq!(mask[[4, 4, 8]], MaskCell::Background);
        // Roots reach down to just above 2 * 5 - 8 = 2.
        let roots = vegetation_cells(mask).iter().filter(|c| c[2] < 5).count();
        assert_eq!(roots, 2);
        assert_eq!(out.count(MaskCell::Vegetation), 5);
    }

    #[test]
    fn test_zminus_water_mirrors_fill() {
        let mut registry = MaterialRegistry::new();
        let water = registry.register_builtin(BuiltinMaterial::Water);
        let sand = registry.add_material("sand", Default::default()).unwrap();
        let mut volume = FractalVolume::new(
            "slab",
            CellBox::new(UVec3::new(0, 0, 4), UVec3::new(3, 3, 8)),
            1.5,
            [1.0; 3],
            1,
            VolumeMaterial::Single(sand),
        );
        let bottom = CellBox::new(UVec3::new(0, 0, 4), UVec3::new(3, 3, 4));
        let mut surface = flat_surface(Face::ZMinus, bottom, (1, 4), 3.0, SurfaceModifier::Water { fill_depth: 2 });
        surface.field[[0, 0]] = 1.5;
        volume.attach(surface).unwrap();

        let out = composite(&mut volume, &registry).unwrap();
        assert_eq!(out.water, Some(water));
        assert_eq!(out.origin, UVec3::new(0, 0, 1));
        let mask = out.mask.as_ref().unwrap();
        // Absolute z = 1..8: clear, clear, flooded above the fill depth, then the declared box.
        let column: Vec<MaskCell> = (0..7).map(|k| mask[[1, 1, k]]).collect();
        assert_eq!(
            column,
            vec![
                MaskCell::Background,
                MaskCell::Background,
                MaskCell::Water,
                MaskCell::Filled,
                MaskCell::Filled,
                MaskCell::Filled,
                MaskCell::Filled,
            ]
        );
        // A deeper trough column is solid above its height and never flooded.
        assert_eq!(mask[[0, 0, 0]], MaskCell::Background);
        assert_eq!(mask[[0, 0, 1]], MaskCell::Filled);
        assert_eq!(mask[[0, 0, 2]], MaskCell::Filled);
        assert_eq!(out.count(MaskCell::Water), 8);
    }

    #[test]
    fn test_yplus_grass_grows_along_y() {
        let mut registry = MaterialRegistry::new();
        registry.register_builtin(BuiltinMaterial::Grass);
        let sand = registry.add_material("sand", Default::default()).unwrap();
        let mut volume = FractalVolume::new(
            "bank",
            CellBox::new(UVec3::new(0, 0, 0), UVec3::new(6, 4, 6)),
            1.5,
            [1.0; 3],
            1,
            VolumeMaterial::Single(sand),
        );
        let plane = CellBox::new(UVec3::new(0, 4, 0), UVec3::new(6, 4, 6));
        // Field axes are (x, z) on a y face.
        let mut field = Grid2::filled(FractalSurface::field_dims(&plane, Axis::Y), 0.0);
        field[[3, 2]] = 7.0;
        volume.attach(grass_surface(Face::YPlus, plane, (7, 8), field)).unwrap();

        let out = composite(&mut volume, &registry).unwrap();
        let mask = out.mask.as_ref().unwrap();
        assert_eq!(mask.dims(), [6, 8, 6]);
        let cells = vegetation_cells(mask);
        let blade: Vec<[usize; 3]> = cells.iter().copied().filter(|c| c[1] >= 4).collect();
        assert_eq!(blade, vec![[3, 4, 2], [3, 5, 2], [3, 6, 2]]);
        assert_eq!(mask[[3, 7, 2]], MaskCell::Background);
        // Roots stay above 2 * 4 - 7 = 1.
        let roots: Vec<usize> = cells.iter().filter(|c| c[1] < 4).map(|c| c[1]).collect();
        assert_eq!(roots.len(), 2);
        assert!(roots.iter().all(|y| (2..4).contains(y)));
    }

    #[test]
    fn test_grass_below_box_top_grows_nothing() {
        let mut registry = MaterialRegistry::new();
        registry.register_builtin(BuiltinMaterial::Grass);
        let mut volume = sand_volume(&mut registry);
        let plane = top_plane();
        let mut field = Grid2::filled(FractalSurface::field_dims(&plane, Axis::Z), 0.0);
        field[[2, 2]] = 3.0;
        field[[6, 6]] = 8.0;
        volume.attach(grass_surface(Face::ZPlus, plane, (3, 9), field)).unwrap();

        let out = composite(&mut volume, &registry).unwrap();
        let mask = out.mask.as_ref().unwrap();
        let cells = vegetation_cells(mask);
        assert!(cells.iter().all(|c| (c[0], c[1]) != (2, 2)));
        assert!((0..9).all(|k| mask[[2, 2, k]] != MaskCell::Vegetation));
        // The taller blade still grows its three cells and two roots.
        assert_eq!(mask[[6, 6, 5]], MaskCell::Vegetation);
        assert_eq!(mask[[6, 6, 6]], MaskCell::Vegetation);
        assert_eq!(mask[[6, 6, 7]], MaskCell::Vegetation);
        assert_eq!(cells.len(), 5);
    }

    #[test]
    fn test_missing_water_material_is_reported() {
        let mut registry = MaterialRegistry::new();
        let mut volume = sand_volume(&mut registry);
        volume
            .attach(flat_surface(Face::ZPlus, top_plane(), (5, 8), 6.0, SurfaceModifier::Water { fill_depth: 7 }))
            .unwrap();
        assert!(matches!(composite(&mut volume, &registry), Err(BuildError::UnknownMaterial(_))));
    }
}
