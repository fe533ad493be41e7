//! Fractal surfaces attached to the outer faces of a fractal volume.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{Axis, CellBox, Grid2};
use crate::vegetation::GrassPatch;

/// One of the six outer faces of a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    XMinus,
    XPlus,
    YMinus,
    YPlus,
    ZMinus,
    ZPlus,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::XMinus, Face::XPlus, Face::YMinus, Face::YPlus, Face::ZMinus, Face::ZPlus];

    pub fn new(axis: Axis, plus: bool) -> Self {
        match (axis, plus) {
            (Axis::X, false) => Face::XMinus,
            (Axis::X, true) => Face::XPlus,
            (Axis::Y, false) => Face::YMinus,
            (Axis::Y, true) => Face::YPlus,
            (Axis::Z, false) => Face::ZMinus,
            (Axis::Z, true) => Face::ZPlus,
        }
    }

    /// Axis normal to the face
    pub fn axis(self) -> Axis {
        match self {
            Face::XMinus | Face::XPlus => Axis::X,
            Face::YMinus | Face::YPlus => Axis::Y,
            Face::ZMinus | Face::ZPlus => Axis::Z,
        }
    }

    /// Whether the outward normal points along the positive axis
    pub fn is_plus(self) -> bool {
        matches!(self, Face::XPlus | Face::YPlus | Face::ZPlus)
    }

    pub fn name(self) -> &'static str {
        match self {
            Face::XMinus => "xminus",
            Face::XPlus => "xplus",
            Face::YMinus => "yminus",
            Face::YPlus => "yplus",
            Face::ZMinus => "zminus",
            Face::ZPlus => "zplus",
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a fractal surface does to the volume beneath it.
#[derive(Clone, Debug)]
pub enum SurfaceModifier {
    /// Height field carving the face
    Roughness,
    /// Roughness with troughs flooded up to an absolute index along the normal
    Water { fill_depth: u32 },
    /// Blades and roots grown from the face
    Grass(GrassPatch),
}

impl SurfaceModifier {
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceModifier::Roughness => "roughness",
            SurfaceModifier::Water { .. } => "water",
            SurfaceModifier::Grass(_) => "grass",
        }
    }
}

/// A 2-D fractal field bound to one face of a fractal volume.
///
/// `field` holds one value per in-plane cell, indexed by the two lateral
/// axes of the face in ascending order. For roughness and water it is an
/// absolute height along the normal; for grass it is the blade height, with
/// zero meaning no blade.
#[derive(Clone, Debug)]
pub struct FractalSurface {
    pub face: Face,
    /// The declared plane, collapsed along the face normal
    pub plane: CellBox,
    pub dimension: f64,
    pub weighting: [f64; 2],
    pub seed: Option<u64>,
    /// Absolute index range along the normal the field spans
    pub range: (u32, u32),
    pub field: Grid2<f64>,
    pub modifier: SurfaceModifier,
}

impl FractalSurface {
    /// In-plane dimensions of the field for a plane normal to `axis`.
    pub fn field_dims(plane: &CellBox, axis: Axis) -> [usize; 2] {
        let (a, b) = axis.lateral();
        [plane.len_on(a) as usize, plane.len_on(b) as usize]
    }

    /// Flood depth, if this surface carries water.
    pub fn fill_depth(&self) -> Option<u32> {
        match self.modifier {
            SurfaceModifier::Water { fill_depth } => Some(fill_depth),
            _ => None,
        }
    }

    pub fn is_grass(&self) -> bool {
        matches!(self.modifier, SurfaceModifier::Grass(_))
    }
}
