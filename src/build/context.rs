//! Mutable state shared by every declaration of one model build.

use std::collections::{HashMap, HashSet};

use crate::core::types::{BuildResult, Result};
use crate::core::BuildError;
use crate::domain::Domain;
use crate::material::{MaterialRegistry, MixingModel};
use crate::scene::SceneConfig;

/// Everything a declaration may read or extend: the domain, the time step,
/// the material registry, declared mixing models and used fractal box IDs.
pub struct BuildContext {
    pub domain: Domain,
    pub dt: f64,
    pub registry: MaterialRegistry,
    /// Default smoothing for plain boxes that do not say
    pub average_volume_objects: bool,
    pub(crate) mixtures: HashMap<String, Box<dyn MixingModel>>,
    pub(crate) fractal_boxes: HashSet<String>,
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("domain", &self.domain)
            .field("dt", &self.dt)
            .field("registry", &self.registry)
            .field("average_volume_objects", &self.average_volume_objects)
            .field("mixtures", &self.mixtures.keys().collect::<Vec<_>>())
            .field("fractal_boxes", &self.fractal_boxes)
            .finish()
    }
}

impl BuildContext {
    pub fn new(domain: Domain, dt: f64) -> Self {
        Self {
            domain,
            dt,
            registry: MaterialRegistry::new(),
            average_volume_objects: true,
            mixtures: HashMap::new(),
            fractal_boxes: HashSet::new(),
        }
    }

    /// Context for a scene, failing on an invalid domain or time step.
    pub fn from_scene(scene: &SceneConfig) -> Result<Self> {
        let mut ctx = Self::new(scene.domain()?, scene.dt()?);
        ctx.average_volume_objects = scene.average_volume_objects;
        Ok(ctx)
    }

    /// Declare a mixing model. Its ID shares a namespace with materials.
    pub fn add_mixing_model(&mut self, model: Box<dyn MixingModel>) -> BuildResult<()> {
        let id = model.id().to_string();
        if self.mixtures.contains_key(&id) || self.registry.find(&id).is_some() {
            return Err(BuildError::DuplicateMaterial(id));
        }
        self.mixtures.insert(id, model);
        Ok(())
    }

    pub fn mixing_model(&self, id: &str) -> Option<&dyn MixingModel> {
        self.mixtures.get(id).map(|m| m.as_ref())
    }

    /// Whether a fractal box with this ID has been built.
    pub fn has_fractal_box(&self, id: &str) -> bool {
        self.fractal_boxes.contains(id)
    }
}
