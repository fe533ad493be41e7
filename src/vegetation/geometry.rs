//! Per-blade curvature and per-root random walks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::round_value;

/// Shape parameters for one blade, one value per lateral axis.
#[derive(Clone, Copy, Debug, PartialEq)]
struct BladeShape {
    length: [f64; 2],
    sign: [f64; 2],
}

/// Geometry generator for a patch of grass.
///
/// Blades bend quadratically away from their base with a per-blade length
/// scale and direction. Roots wander by accumulating a uniform step in
/// `[-1, 1)` per lateral axis each time they descend a cell.
#[derive(Clone, Debug)]
pub struct GrassGeometry {
    shapes: Vec<BladeShape>,
    roots: Vec<[f64; 2]>,
    rng: StdRng,
}

impl GrassGeometry {
    /// Draw shapes for `blades` blades.
    pub fn new(blades: usize, rng: &mut StdRng) -> Self {
        let shapes = (0..blades)
            .map(|_| BladeShape {
                length: [10.0 + 20.0 * rng.random::<f64>(), 10.0 + 20.0 * rng.random::<f64>()],
                sign: [random_sign(rng), random_sign(rng)],
            })
            .collect();
        Self {
            shapes,
            roots: vec![[0.0; 2]; blades],
            rng: StdRng::seed_from_u64(rng.random()),
        }
    }

    /// Lateral offset of a blade at `height` cells above its base.
    pub fn blade_offset(&self, blade: usize, height: usize) -> (i64, i64) {
        let Some(shape) = self.shapes.get(blade) else {
            return (0, 0);
        };
        let h = height as f64;
        let bend = |a: usize| round_value(shape.sign[a] * (h / shape.length[a]).powi(2));
        (bend(0), bend(1))
    }

    /// Advance a root's walk one step and return its lateral offset.
    pub fn root_offset(&mut self, root: usize) -> (i64, i64) {
        let Some(walk) = self.roots.get_mut(root) else {
            return (0, 0);
        };
        for w in walk.iter_mut() {
            *w += self.rng.random_range(-1.0..1.0);
        }
        (round_value(walk[0]), round_value(walk[1]))
    }
}

fn random_sign(rng: &mut StdRng) -> f64 {
    if rng.random::<bool>() { 1.0 } else { -1.0 }
}
