//! Fractal field synthesis and the volumes and surfaces built from it.

pub mod seed;
pub mod spectral;
pub mod surface;
pub mod volume;

pub use spectral::{synthesize_surface, synthesize_volume};
pub use surface::{Face, FractalSurface, SurfaceModifier};
pub use volume::{FractalVolume, VolumeMaterial};
