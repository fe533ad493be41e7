//! Fractal volume descriptor and its face bookkeeping.

use log::debug;

use crate::core::types::BuildResult;
use crate::core::BuildError;
use crate::material::MaterialId;
use crate::math::{CellBox, Grid3};
use super::spectral;
use super::surface::{Face, FractalSurface};

/// Where the cells of a fractal volume take their material from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeMaterial {
    /// One material for every cell
    Single(MaterialId),
    /// Contiguous mixture bins starting at this id, one per quantization level
    Mixture { start: MaterialId },
}

/// A box filled with a 3-D fractal field, plus surfaces on its faces.
///
/// `extent` starts equal to the declared box. Surfaces are attached first;
/// the extent is grown to cover them only when the volume is composited,
/// so every growth decision sees every surface.
#[derive(Clone, Debug)]
pub struct FractalVolume {
    pub id: String,
    pub extent: CellBox,
    pub original: CellBox,
    pub dimension: f64,
    pub weighting: [f64; 3],
    pub bins: usize,
    pub seed: Option<u64>,
    pub averaging: bool,
    pub material: VolumeMaterial,
    surfaces: Vec<FractalSurface>,
}

impl FractalVolume {
    pub fn new(
        id: impl Into<String>,
        extent: CellBox,
        dimension: f64,
        weighting: [f64; 3],
        bins: usize,
        material: VolumeMaterial,
    ) -> Self {
        Self {
            id: id.into(),
            extent,
            original: extent,
            dimension,
            weighting,
            bins,
            seed: None,
            averaging: false,
            material,
            surfaces: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_averaging(mut self, averaging: bool) -> Self {
        self.averaging = averaging;
        self
    }

    /// Which outer face a plane lies on.
    ///
    /// The plane must sit on the lower or upper boundary of the declared box
    /// along its normal and stay inside the box laterally.
    pub fn face_of(&self, plane: &CellBox) -> BuildResult<Face> {
        let axis = match plane.collapsed_axes().as_slice() {
            [axis] => *axis,
            other => {
                return Err(BuildError::MalformedShape(format!(
                    "a surface must be collapsed along exactly one axis, found {}",
                    other.len()
                )));
            }
        };
        let at = plane.lo_on(axis);
        let plus = if at == self.original.lo_on(axis) {
            false
        } else if at == self.original.hi_on(axis) {
            true
        } else {
            return Err(BuildError::MalformedShape(
                "can only be used on the external surfaces of a fractal box".to_string(),
            ));
        };
        let (a, b) = axis.lateral();
        for lateral in [a, b] {
            if plane.lo_on(lateral) < self.original.lo_on(lateral)
                || plane.hi_on(lateral) > self.original.hi_on(lateral)
            {
                return Err(BuildError::MalformedShape(format!(
                    "the surface extends beyond the fractal box along {lateral}"
                )));
            }
        }
        Ok(Face::new(axis, plus))
    }

    pub fn surfaces(&self) -> &[FractalSurface] {
        &self.surfaces
    }

    pub fn surface(&self, face: Face) -> Option<&FractalSurface> {
        self.surfaces.iter().find(|s| s.face == face)
    }

    pub fn surface_mut(&mut self, face: Face) -> Option<&mut FractalSurface> {
        self.surfaces.iter_mut().find(|s| s.face == face)
    }

    pub fn is_modified(&self) -> bool {
        !self.surfaces.is_empty()
    }

    /// Attach a surface; each face takes at most one.
    pub fn attach(&mut self, surface: FractalSurface) -> BuildResult<()> {
        if self.surface(surface.face).is_some() {
            return Err(BuildError::DuplicateSurface(surface.face.to_string()));
        }
        self.surfaces.push(surface);
        Ok(())
    }

    /// Grow the extent so every surface's range lies inside it.
    ///
    /// A minus face lowers the lower bound to the bottom of its range, a
    /// plus face raises the upper bound to the top. Growth is computed from
    /// the declared box, so calling this again changes nothing.
    pub fn grow_to_fit(&mut self) {
        let mut extent = self.original;
        for surface in &self.surfaces {
            let a = surface.face.axis().index();
            let (lo, hi) = surface.range;
            if surface.face.is_plus() {
                extent.hi[a] = extent.hi[a].max(hi);
            } else {
                extent.lo[a] = extent.lo[a].min(lo);
            }
        }
        if extent != self.extent {
            debug!("Fractal box {} grown from {:?} to {:?}", self.id, self.original, extent);
        }
        self.extent = extent;
    }

    /// Cell counts of the current extent.
    pub fn dims(&self) -> [usize; 3] {
        let s = self.extent.size();
        [s.x as usize, s.y as usize, s.z as usize]
    }

    /// Quantized fractal levels over the current extent.
    pub fn levels(&self) -> BuildResult<Grid3<u32>> {
        spectral::synthesize_volume(
            self.dims(),
            self.dimension,
            self.weighting,
            self.bins,
            self.seed,
        )
    }

    /// Material of a quantization level.
    pub fn material_for(&self, level: u32) -> MaterialId {
        match self.material {
            VolumeMaterial::Single(id) => id,
            VolumeMaterial::Mixture { start } => MaterialId(start.0 + level),
        }
    }
}
