//! Fractvox - fractal geometry to voxel compiler for FDTD models
//!
//! Declarations in physical units go in; per-cell and per-edge material
//! indices come out through a [`voxel::VoxelWriter`].

pub mod core;
pub mod math;
pub mod domain;
pub mod material;
pub mod fractal;
pub mod vegetation;
pub mod mask;
pub mod voxel;
pub mod scene;
pub mod build;

pub use crate::core::{BuildError, Error, Result};
