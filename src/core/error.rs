//! Error types for the geometry build

use thiserror::Error;

use crate::math::Axis;

/// Validation failures raised while turning declarations into voxels.
///
/// All variants are terminal: the model build aborts and the failure is
/// reported together with the declaration that caused it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("the {axis} index {index} is not within the model domain [0, {limit}]")]
    OutOfDomain { axis: Axis, index: i64, limit: u32 },

    #[error("the lower {axis} coordinate ({lo}) should be less than the upper coordinate ({hi})")]
    InvertedExtent { axis: Axis, lo: i64, hi: i64 },

    #[error("dimensions are not specified correctly: {0}")]
    MalformedShape(String),

    #[error("material(s) {0:?} do not exist")]
    UnknownMaterial(Vec<String>),

    #[error("material with ID {0} already exists")]
    DuplicateMaterial(String),

    #[error("expected one or three materials, {0} given")]
    InvalidMaterialArity(usize),

    #[error("has already been used on the {0} surface")]
    DuplicateSurface(String),

    #[error("specified surface {0} does not have a rough surface applied")]
    MissingSurface(String),

    #[error("requires a depth of water ({depth} cells) within the surface roughness range [{lo}, {hi}]")]
    DepthOutOfRange { depth: i64, lo: i64, hi: i64 },

    #[error("grass can only be specified on surfaces in the positive axis direction, not {0}")]
    InvalidOrientation(String),

    #[error("requires the time step ({dt:e}s) to be less than the relaxation time ({tau:e}s) required to model {material}")]
    TimestepTooCoarse { material: String, dt: f64, tau: f64 },

    #[error("the specified surface ({cells} candidate cells) is not large enough for {blades} grass blades/roots")]
    SurfaceTooSmall { blades: usize, cells: usize },

    #[error("is being used with a single material and no modifications, use a box instead")]
    DegenerateFractalBox,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl BuildError {
    /// Attach the literal declaration text that triggered this failure.
    pub fn in_command(self, command: impl Into<String>) -> Error {
        Error::Command {
            command: command.into(),
            source: self,
        }
    }
}

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("'{command}' {source}")]
    Command {
        command: String,
        #[source]
        source: BuildError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene error: {0}")]
    Scene(#[from] serde_json::Error),
}

impl Error {
    /// The validation failure behind a command error, if any.
    pub fn build_error(&self) -> Option<&BuildError> {
        match self {
            Error::Command { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_carries_text() {
        let err = BuildError::DegenerateFractalBox.in_command("#fractal_box: 0 0 0 1 1 1");
        let msg = err.to_string();
        assert!(msg.starts_with("'#fractal_box: 0 0 0 1 1 1'"));
        assert!(msg.contains("use a box instead"));
        assert_eq!(err.build_error(), Some(&BuildError::DegenerateFractalBox));
    }

    #[test]
    fn test_out_of_domain_message() {
        let err = BuildError::OutOfDomain { axis: Axis::Y, index: 12, limit: 10 };
        assert_eq!(err.to_string(), "the y index 12 is not within the model domain [0, 10]");
    }
}
