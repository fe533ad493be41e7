//! Model build: turns scene declarations into voxels.
//!
//! Every declaration reads and extends one [`BuildContext`]; nothing is
//! global, so components can be driven in isolation.

pub mod context;
pub mod fractal_box;
pub mod modifier;
pub mod model;
pub mod primitive;

pub use context::BuildContext;
pub use fractal_box::build_fractal_box;
pub use model::build_scene;
pub use modifier::{GrassRequest, RoughnessRequest, SurfacePipeline, WaterRequest};
pub use primitive::build_box;
