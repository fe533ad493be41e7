//! Grass: blade placement on a fractal surface, per-blade geometry and the
//! strand walks that grow blades upward and roots downward through a mask.

pub mod geometry;
pub mod placement;
pub mod strand;

pub use geometry::GrassGeometry;
pub use placement::place_blades;
pub use strand::{StrandKind, StrandWalk};

/// Grass attached to a fractal surface.
#[derive(Clone, Debug)]
pub struct GrassPatch {
    /// Requested number of blades
    pub blades: usize,
    pub geometry: GrassGeometry,
}
