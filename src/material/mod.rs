//! Electromagnetic materials and the registry that owns them.
//!
//! Materials are identified two ways: a unique string ID from the scene
//! description, and a dense numeric ID assigned in registration order. The
//! numeric ID is what ends up in the voxel arrays.

pub mod builtin;
pub mod mixing;
pub mod registry;

pub use builtin::BuiltinMaterial;
pub use mixing::{LinearMixture, MixingModel};
pub use registry::{MaterialRegistry, ResolvedMaterial};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dense numeric material identifier (index into the registry).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MaterialId(pub u32);

impl MaterialId {
    /// Perfect electric conductor, always registered first
    pub const PEC: Self = Self(0);
    /// Free space, always registered second
    pub const FREE_SPACE: Self = Self(1);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a material came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialKind {
    /// Fixed materials present in every model (pec, free_space)
    Builtin,
    /// Built-in dispersive material pulled in by a modifier (water, grass)
    BuiltinDebye,
    /// Declared in the scene
    User,
    /// Mean of three per-axis materials for anisotropic smoothing
    Mixed,
    /// One bin of a mixing model
    Mixture,
}

/// Single-pole Debye relaxation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebyePole {
    /// Permittivity difference (static minus infinite-frequency)
    pub delta_er: f64,
    /// Relaxation time in seconds
    pub tau: f64,
}

/// Non-dispersive electromagnetic constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialProps {
    /// Relative permittivity
    pub er: f64,
    /// Conductivity (S/m)
    pub se: f64,
    /// Relative permeability
    pub mr: f64,
    /// Magnetic loss (Ohm/m)
    pub sm: f64,
}

impl MaterialProps {
    pub const FREE_SPACE: Self = Self { er: 1.0, se: 0.0, mr: 1.0, sm: 0.0 };

    /// Component-wise arithmetic mean.
    pub fn mean(items: &[MaterialProps]) -> Self {
        let n = items.len().max(1) as f64;
        let sum = items.iter().fold(Self { er: 0.0, se: 0.0, mr: 0.0, sm: 0.0 }, |acc, p| Self {
            er: acc.er + p.er,
            se: acc.se + p.se,
            mr: acc.mr + p.mr,
            sm: acc.sm + p.sm,
        });
        Self { er: sum.er / n, se: sum.se / n, mr: sum.mr / n, sm: sum.sm / n }
    }

    /// Linear interpolation between two property sets.
    pub fn lerp(&self, other: &MaterialProps, t: f64) -> Self {
        Self {
            er: self.er + (other.er - self.er) * t,
            se: self.se + (other.se - self.se) * t,
            mr: self.mr + (other.mr - self.mr) * t,
            sm: self.sm + (other.sm - self.sm) * t,
        }
    }
}

impl Default for MaterialProps {
    fn default() -> Self {
        Self::FREE_SPACE
    }
}

/// A registered material.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Unique string identifier
    pub id: String,
    /// Dense numeric identifier, fixed at registration
    pub num_id: MaterialId,
    pub kind: MaterialKind,
    pub props: MaterialProps,
    /// Whether this material may take part in dielectric smoothing
    pub averagable: bool,
    /// Debye poles; empty for non-dispersive materials
    pub poles: Vec<DebyePole>,
}
