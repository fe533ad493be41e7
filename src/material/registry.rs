//! Material arena with string-ID lookup and lazy composite synthesis.

use std::collections::HashMap;

use crate::core::types::BuildResult;
use crate::core::BuildError;
use super::{BuiltinMaterial, Material, MaterialId, MaterialKind, MaterialProps};

/// Outcome of resolving one or three requested material IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedMaterial {
    /// Material stamped into cells
    pub cell: MaterialId,
    /// Materials stamped onto x, y and z edges
    pub edges: [MaterialId; 3],
    /// Whether dielectric smoothing applies
    pub averaging: bool,
}

impl ResolvedMaterial {
    /// Single material on cells and all edges.
    pub fn isotropic(id: MaterialId, averaging: bool) -> Self {
        Self { cell: id, edges: [id; 3], averaging }
    }
}

/// Ordered, append-only collection of materials.
///
/// `MaterialId`s are indices into the arena and are never reused or
/// reordered; a side map answers string-ID lookups.
#[derive(Clone, Debug)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
    by_id: HashMap<String, MaterialId>,
    max_poles: usize,
}

impl MaterialRegistry {
    /// Create a registry holding `pec` and `free_space`.
    pub fn new() -> Self {
        let mut registry = Self {
            materials: Vec::new(),
            by_id: HashMap::new(),
            max_poles: 0,
        };
        registry.push(
            "pec",
            MaterialKind::Builtin,
            MaterialProps { er: 1.0, se: f64::INFINITY, mr: 1.0, sm: 0.0 },
            false,
        );
        registry.push("free_space", MaterialKind::Builtin, MaterialProps::FREE_SPACE, true);
        registry
    }

    /// Number of registered materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Look up a material by numeric ID
    pub fn get(&self, num_id: MaterialId) -> Option<&Material> {
        self.materials.get(num_id.index())
    }

    /// Look up a material by string ID
    pub fn find(&self, id: &str) -> Option<&Material> {
        self.by_id.get(id).and_then(|n| self.get(*n))
    }

    /// Numeric ID for a string ID
    pub fn num_id(&self, id: &str) -> Option<MaterialId> {
        self.by_id.get(id).copied()
    }

    /// Iterate materials in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    /// Largest Debye pole count of any material in the model
    pub fn max_poles(&self) -> usize {
        self.max_poles
    }

    /// Register a user-declared material.
    pub fn add_material(&mut self, id: &str, props: MaterialProps) -> BuildResult<MaterialId> {
        if self.by_id.contains_key(id) {
            return Err(BuildError::DuplicateMaterial(id.to_string()));
        }
        let checks = [
            (props.er, "static (DC) permittivity"),
            (props.se, "conductivity"),
            (props.mr, "permeability"),
            (props.sm, "magnetic conductivity"),
        ];
        for (value, name) in checks {
            if value.is_nan() || value < 0.0 {
                return Err(BuildError::InvalidParameter(format!(
                    "requires a positive value for {name}"
                )));
            }
        }
        Ok(self.push(id, MaterialKind::User, props, true))
    }

    /// Register a mixing-model bin. Returns the existing ID if already present.
    pub fn add_mixture_bin(&mut self, id: &str, props: MaterialProps) -> MaterialId {
        match self.num_id(id) {
            Some(existing) => existing,
            None => self.push(id, MaterialKind::Mixture, props, true),
        }
    }

    /// Resolve one (isotropic) or three (per-axis anisotropic) material IDs.
    ///
    /// Isotropic results smooth only if the material is averagable and the
    /// caller asked for it; anisotropic results never smooth.
    pub fn resolve<S: AsRef<str>>(&mut self, requested: &[S], averaging: bool) -> BuildResult<ResolvedMaterial> {
        let missing: Vec<String> = requested
            .iter()
            .map(|s| s.as_ref())
            .filter(|id| !self.by_id.contains_key(*id))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(BuildError::UnknownMaterial(missing));
        }

        let ids: Vec<MaterialId> = requested
            .iter()
            .filter_map(|s| self.num_id(s.as_ref()))
            .collect();

        match ids.as_slice() {
            [single] => {
                let averagable = self.materials[single.index()].averagable;
                Ok(ResolvedMaterial::isotropic(*single, averagable && averaging))
            }
            [x, y, z] => {
                let edges = [*x, *y, *z];
                let cell = self.composite(edges);
                Ok(ResolvedMaterial { cell, edges, averaging: false })
            }
            other => Err(BuildError::InvalidMaterialArity(other.len())),
        }
    }

    /// Find or create the composite of three per-axis materials.
    ///
    /// The composite's string ID joins the constituent IDs with `+` after
    /// sorting them, so any ordering of the same three materials maps to
    /// one entry.
    pub fn composite(&mut self, edges: [MaterialId; 3]) -> MaterialId {
        let key = self.composite_key(edges);
        if let Some(existing) = self.num_id(&key) {
            return existing;
        }
        let props = MaterialProps::mean(&edges.map(|e| self.materials[e.index()].props));
        let num_id = self.push(&key, MaterialKind::Mixed, props, true);
        log::debug!("Composite material {} created with numID {}", key, num_id);
        num_id
    }

    fn composite_key(&self, edges: [MaterialId; 3]) -> String {
        let mut parts: Vec<&str> = edges
            .iter()
            .map(|e| self.materials[e.index()].id.as_str())
            .collect();
        parts.sort_unstable();
        parts.join("+")
    }

    /// Register a built-in dispersive material on first use.
    pub fn register_builtin(&mut self, builtin: BuiltinMaterial) -> MaterialId {
        if let Some(existing) = self.num_id(builtin.id()) {
            return existing;
        }
        let num_id = self.push(builtin.id(), MaterialKind::BuiltinDebye, builtin.props(), false);
        self.materials[num_id.index()].poles.push(builtin.pole());
        if self.max_poles == 0 {
            self.max_poles = 1;
        }
        num_id
    }

    /// Check the model time step resolves every relaxation time of a material.
    pub fn check_timestep(&self, num_id: MaterialId, dt: f64) -> BuildResult<()> {
        let Some(material) = self.get(num_id) else {
            return Err(BuildError::UnknownMaterial(vec![num_id.to_string()]));
        };
        match material.poles.iter().find(|p| p.tau <= dt) {
            Some(pole) => Err(BuildError::TimestepTooCoarse {
                material: material.id.clone(),
                dt,
                tau: pole.tau,
            }),
            None => Ok(()),
        }
    }

    fn push(&mut self, id: &str, kind: MaterialKind, props: MaterialProps, averagable: bool) -> MaterialId {
        let num_id = MaterialId(self.materials.len() as u32);
        self.materials.push(Material {
            id: id.to_string(),
            num_id,
            kind,
            props,
            averagable,
            poles: Vec::new(),
        });
        self.by_id.insert(id.to_string(), num_id);
        num_id
    }
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::new()
    }
}
