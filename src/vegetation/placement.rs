//! Blade placement by sampling a fractal surface as a probability field.

use rand::Rng;
use rand::rngs::StdRng;

use crate::core::types::BuildResult;
use crate::core::BuildError;
use crate::math::Grid2;

/// Place `blades` blades on a surface field already scaled to `[0, 1]`.
///
/// Each cell's chance of receiving a blade is its value over the field sum;
/// cells at zero never receive one. The returned field holds the blade
/// height at placed cells and zero elsewhere. Two draws landing on the same
/// cell keep the later height, so fewer blades than requested may remain.
///
/// Heights are integers drawn from `[lo, hi)`, or `lo` when the range is
/// empty.
pub fn place_blades(
    probability: &Grid2<f64>,
    blades: usize,
    heights: (u32, u32),
    rng: &mut StdRng,
) -> BuildResult<Grid2<f64>> {
    let values = probability.as_slice();
    let candidates = values.iter().filter(|p| **p > 0.0).count();
    if blades > candidates {
        return Err(BuildError::SurfaceTooSmall { blades, cells: candidates });
    }

    let mut placed = Grid2::filled(probability.dims(), 0.0);
    if blades == 0 {
        return Ok(placed);
    }

    let total: f64 = values.iter().filter(|p| **p > 0.0).sum();
    let mut cumulative = Vec::with_capacity(values.len());
    let mut running = 0.0;
    for p in values {
        running += p.max(0.0) / total;
        cumulative.push(running);
    }
    // Float error can leave the last entry short of 1; clamp to the last cell that can hold a blade.
    let last_candidate = values.iter().rposition(|p| *p > 0.0).unwrap_or(0);

    let slots = placed.as_mut_slice();
    for _ in 0..blades {
        let a: f64 = rng.random();
        let index = cumulative.partition_point(|c| *c <= a).min(last_candidate);
        let (lo, hi) = heights;
        let height = if hi > lo { rng.random_range(lo..hi) } else { lo };
        slots[index] = height as f64;
    }
    Ok(placed)
}
