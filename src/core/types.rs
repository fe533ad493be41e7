//! Core type aliases and re-exports

pub use glam::{DVec3, UVec3};

/// Standard Result type for the crate
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;

/// Result type for component-level operations that have no command context yet
pub type BuildResult<T> = std::result::Result<T, crate::core::error::BuildError>;
