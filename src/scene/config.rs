//! Scene configuration: domain, time step and the ordered declaration list

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::{DVec3, Result};
use crate::core::BuildError;
use crate::domain::Domain;
use super::Declaration;

/// Physical extent and cell size of the model
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Size in metres
    pub size: [f64; 3],
    /// Cell size (dx, dy, dz) in metres
    pub cell: [f64; 3],
}

impl fmt::Display for DomainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.size;
        let [dx, dy, dz] = self.cell;
        write!(f, "#domain: {x} {y} {z} #dx_dy_dz: {dx} {dy} {dz}")
    }
}

/// A full model build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub domain: DomainConfig,
    /// Time step in seconds; the Courant limit when absent
    #[serde(default)]
    pub dt: Option<f64>,
    /// Dielectric smoothing default for plain boxes
    #[serde(default = "default_true")]
    pub average_volume_objects: bool,
    /// Declarations in scene order
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

fn default_true() -> bool {
    true
}

impl SceneConfig {
    /// Read and parse a scene file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validated model domain.
    pub fn domain(&self) -> Result<Domain> {
        Domain::from_size(DVec3::from_array(self.domain.size), DVec3::from_array(self.domain.cell))
            .map_err(|e| e.in_command(self.domain.to_string()))
    }

    /// Time step used for relaxation-time checks.
    pub fn dt(&self) -> Result<f64> {
        match self.dt {
            Some(dt) if !dt.is_finite() || dt <= 0.0 => Err(BuildError::InvalidParameter(format!(
                "the time step ({dt}) must be a positive number"
            ))
            .in_command(format!("#time_step: {dt}"))),
            Some(dt) => Ok(dt),
            None => Ok(self.domain()?.courant_dt()),
        }
    }
}
