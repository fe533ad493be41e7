//! Mixing models: families of discrete materials approximating a continuous mixture.

use crate::core::types::BuildResult;
use crate::core::BuildError;
use super::{MaterialId, MaterialProps, MaterialRegistry};

/// A policy that materializes `bins` concrete materials for a fractal volume.
///
/// The materials must be registered contiguously so a quantized bin index
/// plus the returned start ID addresses bin `n` directly.
pub trait MixingModel: Send + Sync {
    /// Scene-level identifier
    fn id(&self) -> &str;

    /// Register (or reuse) `bins` materials and return the first one's ID.
    fn materialize(&self, bins: usize, registry: &mut MaterialRegistry) -> BuildResult<MaterialId>;
}

/// Mixture interpolated linearly between a dry and a wet end-member.
///
/// Bin `n` of `bins` sits at `t = n / (bins - 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearMixture {
    id: String,
    dry: MaterialProps,
    wet: MaterialProps,
}

impl LinearMixture {
    pub fn new(id: impl Into<String>, dry: MaterialProps, wet: MaterialProps) -> Self {
        Self { id: id.into(), dry, wet }
    }

    /// Registry ID of one bin
    pub fn bin_id(&self, bins: usize, bin: usize) -> String {
        format!("{}|{}:{}", self.id, bins, bin)
    }
}

impl MixingModel for LinearMixture {
    fn id(&self) -> &str {
        &self.id
    }

    fn materialize(&self, bins: usize, registry: &mut MaterialRegistry) -> BuildResult<MaterialId> {
        if bins < 2 {
            return Err(BuildError::InvalidParameter(format!(
                "mixing model {} must be used with more than one bin",
                self.id
            )));
        }
        if let Some(start) = registry.num_id(&self.bin_id(bins, 0)) {
            return Ok(start);
        }
        let mut start = None;
        for bin in 0..bins {
            let t = bin as f64 / (bins - 1) as f64;
            let num_id = registry.add_mixture_bin(&self.bin_id(bins, bin), self.dry.lerp(&self.wet, t));
            start.get_or_insert(num_id);
        }
        log::debug!("Mixing model {} materialized {} bins", self.id, bins);
        start.ok_or_else(|| BuildError::InvalidParameter("empty mixing model".to_string()))
    }
}
