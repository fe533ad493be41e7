//! In-memory voxel grid covering the whole model domain.

use std::collections::BTreeMap;

use crate::core::types::UVec3;
use crate::domain::Domain;
use crate::mask::MaskCell;
use crate::material::{MaterialId, ResolvedMaterial};
use crate::math::{CellBox, Grid3};
use super::VoxelWriter;

/// Per-cell solid material, per-edge materials and a rigid flag.
///
/// Rigid cells are excluded from dielectric smoothing. Every cell starts as
/// free space.
#[derive(Clone, Debug)]
pub struct SolidGrid {
    solid: Grid3<MaterialId>,
    edges: Grid3<[MaterialId; 3]>,
    rigid: Grid3<bool>,
}

impl SolidGrid {
    pub fn new(dims: [usize; 3]) -> Self {
        Self {
            solid: Grid3::filled(dims, MaterialId::FREE_SPACE),
            edges: Grid3::filled(dims, [MaterialId::FREE_SPACE; 3]),
            rigid: Grid3::filled(dims, false),
        }
    }

    /// Grid sized to a model domain.
    pub fn for_domain(domain: &Domain) -> Self {
        Self::new(domain.cells.map(|n| n as usize))
    }

    pub fn dims(&self) -> [usize; 3] {
        self.solid.dims()
    }

    pub fn solid(&self, cell: [usize; 3]) -> MaterialId {
        self.solid[cell]
    }

    pub fn edges(&self, cell: [usize; 3]) -> [MaterialId; 3] {
        self.edges[cell]
    }

    pub fn is_rigid(&self, cell: [usize; 3]) -> bool {
        self.rigid[cell]
    }

    /// Cell count per solid material.
    pub fn counts(&self) -> BTreeMap<MaterialId, usize> {
        let mut counts = BTreeMap::new();
        for id in self.solid.as_slice() {
            *counts.entry(*id).or_insert(0) += 1;
        }
        counts
    }

    fn set(&mut self, cell: [i64; 3], solid: MaterialId, edges: [MaterialId; 3], rigid: bool) {
        if let Some(cell) = self.solid.checked_index(cell) {
            self.solid[cell] = solid;
            self.edges[cell] = edges;
            self.rigid[cell] = rigid;
        }
    }
}

fn offset(origin: UVec3, [i, j, k]: [usize; 3]) -> [i64; 3] {
    [
        origin.x as i64 + i as i64,
        origin.y as i64 + j as i64,
        origin.z as i64 + k as i64,
    ]
}

impl VoxelWriter for SolidGrid {
    fn write_mask(
        &mut self,
        origin: UVec3,
        mask: &Grid3<MaskCell>,
        materials: &Grid3<MaterialId>,
        water: Option<MaterialId>,
        grass: Option<MaterialId>,
        averaging: bool,
    ) {
        for (cell, class) in mask.indexed_iter() {
            let (id, rigid) = match class {
                MaskCell::Background => continue,
                MaskCell::Filled => (materials[cell], !averaging),
                MaskCell::Water => match water {
                    Some(id) => (id, true),
                    None => continue,
                },
                MaskCell::Vegetation => match grass {
                    Some(id) => (id, true),
                    None => continue,
                },
            };
            self.set(offset(origin, cell), id, [id; 3], rigid);
        }
    }

    fn write_field(&mut self, origin: UVec3, materials: &Grid3<MaterialId>, averaging: bool) {
        for (cell, id) in materials.indexed_iter() {
            self.set(offset(origin, cell), id, [id; 3], !averaging);
        }
    }

    fn write_uniform(&mut self, extent: CellBox, material: &ResolvedMaterial) {
        for i in extent.lo.x..extent.hi.x {
            for j in extent.lo.y..extent.hi.y {
                for k in extent.lo.z..extent.hi.z {
                    self.set([i as i64, j as i64, k as i64], material.cell, material.edges, !material.averaging);
                }
            }
        }
    }
}
