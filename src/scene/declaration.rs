//! Typed geometry and material declarations.
//!
//! Each declaration renders back to the command text it stands for, which
//! is what error messages quote.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::material::MaterialProps;

/// One scene command, already tokenized into typed fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Declaration {
    Material(MaterialDecl),
    Mixture(MixtureDecl),
    Box(BoxDecl),
    FractalBox(FractalBoxDecl),
    AddSurfaceRoughness(RoughnessDecl),
    AddSurfaceWater(WaterDecl),
    AddGrass(GrassDecl),
}

impl Declaration {
    /// ID of the fractal box a surface modifier targets.
    pub fn modifier_target(&self) -> Option<&str> {
        match self {
            Declaration::AddSurfaceRoughness(d) => Some(&d.fractal_box),
            Declaration::AddSurfaceWater(d) => Some(&d.fractal_box),
            Declaration::AddGrass(d) => Some(&d.fractal_box),
            _ => None,
        }
    }
}

/// `#material: er se mr sm id`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialDecl {
    pub id: String,
    #[serde(flatten)]
    pub props: MaterialProps,
}

/// `#mixture: er se mr sm er se mr sm id`, dry then wet end-member
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MixtureDecl {
    pub id: String,
    pub dry: MaterialProps,
    pub wet: MaterialProps,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxDecl {
    pub lo: [f64; 3],
    pub hi: [f64; 3],
    /// One material, or three for x, y and z edges
    pub materials: Vec<String>,
    /// Falls back to the scene's `average_volume_objects`
    #[serde(default)]
    pub averaging: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FractalBoxDecl {
    pub lo: [f64; 3],
    pub hi: [f64; 3],
    pub dimension: f64,
    pub weighting: [f64; 3],
    pub bins: usize,
    /// A material or a mixture ID
    pub material: String,
    pub id: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub averaging: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoughnessDecl {
    pub lo: [f64; 3],
    pub hi: [f64; 3],
    pub dimension: f64,
    pub weighting: [f64; 2],
    /// Lower and upper extent of the roughness along the face normal, in metres
    pub range: [f64; 2],
    pub fractal_box: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaterDecl {
    pub lo: [f64; 3],
    pub hi: [f64; 3],
    /// Absolute coordinate along the face normal the water reaches, in metres
    pub depth: f64,
    pub fractal_box: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrassDecl {
    pub lo: [f64; 3],
    pub hi: [f64; 3],
    pub dimension: f64,
    /// Minimum and maximum blade height along the face normal, in metres
    pub heights: [f64; 2],
    pub blades: usize,
    pub fractal_box: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

struct Coords<'a>(&'a [f64]);

impl fmt::Display for Coords<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

struct Props<'a>(&'a MaterialProps);

impl fmt::Display for Props<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.0;
        write!(f, "{} {} {} {}", p.er, p.se, p.mr, p.sm)
    }
}

fn write_seed(f: &mut fmt::Formatter<'_>, seed: Option<u64>) -> fmt::Result {
    match seed {
        Some(seed) => write!(f, " {seed}"),
        None => Ok(()),
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Material(d) => write!(f, "#material: {} {}", Props(&d.props), d.id),
            Declaration::Mixture(d) => write!(f, "#mixture: {} {} {}", Props(&d.dry), Props(&d.wet), d.id),
            Declaration::Box(d) => {
                write!(f, "#box: {} {} {}", Coords(&d.lo), Coords(&d.hi), d.materials.join(" "))?;
                match d.averaging {
                    Some(true) => f.write_str(" y"),
                    Some(false) => f.write_str(" n"),
                    None => Ok(()),
                }
            }
            Declaration::FractalBox(d) => {
                write!(
                    f,
                    "#fractal_box: {} {} {} {} {} {} {}",
                    Coords(&d.lo),
                    Coords(&d.hi),
                    d.dimension,
                    Coords(&d.weighting),
                    d.bins,
                    d.material,
                    d.id
                )?;
                write_seed(f, d.seed)?;
                if d.averaging {
                    f.write_str(" y")?;
                }
                Ok(())
            }
            Declaration::AddSurfaceRoughness(d) => {
                write!(
                    f,
                    "#add_surface_roughness: {} {} {} {} {} {}",
                    Coords(&d.lo),
                    Coords(&d.hi),
                    d.dimension,
                    Coords(&d.weighting),
                    Coords(&d.range),
                    d.fractal_box
                )?;
                write_seed(f, d.seed)
            }
            Declaration::AddSurfaceWater(d) => write!(
                f,
                "#add_surface_water: {} {} {} {}",
                Coords(&d.lo),
                Coords(&d.hi),
                d.depth,
                d.fractal_box
            ),
            Declaration::AddGrass(d) => {
                write!(
                    f,
                    "#add_grass: {} {} {} {} {} {}",
                    Coords(&d.lo),
                    Coords(&d.hi),
                    d.dimension,
                    Coords(&d.heights),
                    d.blades,
                    d.fractal_box
                )?;
                write_seed(f, d.seed)
            }
        }
    }
}
