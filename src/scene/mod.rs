//! Scene description: the domain plus an ordered list of declarations

pub mod config;
pub mod declaration;

pub use config::{DomainConfig, SceneConfig};
pub use declaration::{
    BoxDecl, Declaration, FractalBoxDecl, GrassDecl, MaterialDecl, MixtureDecl, RoughnessDecl, WaterDecl,
};
