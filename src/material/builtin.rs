//! Built-in dispersive materials pulled in by surface modifiers.

use super::{DebyePole, MaterialProps};

/// Dispersive materials the fractal modifiers register on first use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinMaterial {
    Water,
    Grass,
}

impl BuiltinMaterial {
    /// String ID used in the registry
    pub fn id(self) -> &'static str {
        match self {
            BuiltinMaterial::Water => "water",
            BuiltinMaterial::Grass => "grass",
        }
    }

    /// Infinite-frequency relative permittivity and static loss terms
    pub fn props(self) -> MaterialProps {
        let er = match self {
            BuiltinMaterial::Water => 4.9,
            BuiltinMaterial::Grass => 18.5087,
        };
        MaterialProps { er, ..MaterialProps::FREE_SPACE }
    }

    /// Single Debye pole describing the relaxation
    pub fn pole(self) -> DebyePole {
        match self {
            BuiltinMaterial::Water => DebyePole { delta_er: 75.2, tau: 9.231e-12 },
            BuiltinMaterial::Grass => DebyePole { delta_er: 12.7174, tau: 1.0793e-11 },
        }
    }
}
