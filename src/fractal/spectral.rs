//! Spectral synthesis of self-affine stochastic fields.
//!
//! Gaussian white noise is transformed to the frequency domain, each
//! coefficient is divided by `|r|^b` where `r` is its weighted distance from
//! the zero-frequency bin and `b = (7 - 2D) / 2` for fractal dimension `D`,
//! and the result is transformed back. A larger axis weighting stretches
//! distances along that axis, attenuating its high frequencies and giving a
//! smoother, longer-range field in that direction.

use rand::Rng;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::{FftDirection, FftPlanner};

use crate::core::types::BuildResult;
use crate::core::BuildError;
use crate::math::{Grid2, Grid3};
use super::seed;

/// Spectral amplitude used at the zero-frequency bin.
const DC_AMPLITUDE: f64 = 0.9;

/// Amplitude falloff exponent for a fractal dimension.
pub fn spectral_exponent(dimension: f64) -> f64 {
    (7.0 - 2.0 * dimension) / 2.0
}

/// Synthesize a 2-D surface field of `dims` cells.
pub fn synthesize_surface(
    dims: [usize; 2],
    dimension: f64,
    weighting: [f64; 2],
    seed: Option<u64>,
) -> BuildResult<Grid2<f64>> {
    surface_field(dims, dimension, weighting, &mut seed::generator(seed))
}

/// Synthesize a 2-D surface field drawing from an existing generator.
pub fn surface_field(
    dims: [usize; 2],
    dimension: f64,
    weighting: [f64; 2],
    rng: &mut StdRng,
) -> BuildResult<Grid2<f64>> {
    validate(&dims, dimension, &weighting)?;
    let data = spectral_field(&dims, dimension, &weighting, rng);
    Grid2::from_vec(dims, data).ok_or_else(|| shape_mismatch(&dims))
}

/// Synthesize the continuous 3-D field of a fractal volume.
pub fn spectral_volume(
    dims: [usize; 3],
    dimension: f64,
    weighting: [f64; 3],
    rng: &mut StdRng,
) -> BuildResult<Grid3<f64>> {
    validate(&dims, dimension, &weighting)?;
    let data = spectral_field(&dims, dimension, &weighting, rng);
    Grid3::from_vec(dims, data).ok_or_else(|| shape_mismatch(&dims))
}

/// Synthesize a fractal volume quantized into `bins` levels.
///
/// With a single bin nothing is synthesized and every cell is level 0.
pub fn synthesize_volume(
    dims: [usize; 3],
    dimension: f64,
    weighting: [f64; 3],
    bins: usize,
    seed: Option<u64>,
) -> BuildResult<Grid3<u32>> {
    match bins {
        0 => Err(BuildError::InvalidParameter(
            "requires a positive value for the number of bins".to_string(),
        )),
        1 => Ok(Grid3::filled(dims, 0)),
        _ => {
            let field = spectral_volume(dims, dimension, weighting, &mut seed::generator(seed))?;
            let levels = quantize(field.as_slice(), bins);
            Grid3::from_vec(dims, levels).ok_or_else(|| shape_mismatch(&dims))
        }
    }
}

/// Map values onto `bins` equal-width levels: `floor(bins * normalized)`,
/// clipped to `[0, bins - 1]`. A constant field lands entirely in level 0.
pub fn quantize(values: &[f64], bins: usize) -> Vec<u32> {
    let (min, max) = min_max(values);
    let range = max - min;
    let top = bins.saturating_sub(1) as f64;
    values
        .iter()
        .map(|v| {
            if range > 0.0 && range.is_finite() {
                (bins as f64 * (v - min) / range).floor().clamp(0.0, top) as u32
            } else {
                0
            }
        })
        .collect()
}

/// Linearly rescale values in place so they span `[lo, hi]`.
///
/// A constant field has no span to stretch and is set to `lo`.
pub fn rescale(values: &mut [f64], lo: f64, hi: f64) {
    let (min, max) = min_max(values);
    let range = max - min;
    if !(range > 0.0 && range.is_finite()) {
        values.iter_mut().for_each(|v| *v = lo);
        return;
    }
    let scale = (hi - lo) / range;
    let (floor, ceil) = (lo.min(hi), lo.max(hi));
    values.iter_mut().for_each(|v| *v = ((*v - min) * scale + lo).clamp(floor, ceil));
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
}

fn validate(dims: &[usize], dimension: f64, weighting: &[f64]) -> BuildResult<()> {
    if dims.iter().any(|d| *d == 0) {
        return Err(BuildError::InvalidParameter(format!("fractal field has an empty axis: {dims:?}")));
    }
    if !dimension.is_finite() || dimension < 0.0 {
        return Err(BuildError::InvalidParameter(
            "requires a positive value for the fractal dimension".to_string(),
        ));
    }
    if weighting.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(BuildError::InvalidParameter(
            "requires a positive value for the fractal weighting".to_string(),
        ));
    }
    Ok(())
}

fn shape_mismatch(dims: &[usize]) -> BuildError {
    BuildError::InvalidParameter(format!("fractal field does not match shape {dims:?}"))
}

/// White noise, filtered in the frequency domain, real part of the inverse.
fn spectral_field(dims: &[usize], dimension: f64, weighting: &[f64], rng: &mut StdRng) -> Vec<f64> {
    let len: usize = dims.iter().product();
    let mut data: Vec<Complex<f64>> = (0..len)
        .map(|_| Complex::new(rng.sample(StandardNormal), 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    transform(&mut data, dims, FftDirection::Forward, &mut planner);
    apply_falloff(&mut data, dims, spectral_exponent(dimension), weighting);
    transform(&mut data, dims, FftDirection::Inverse, &mut planner);

    data.into_iter().map(|c| c.re).collect()
}

/// Divide every coefficient by its weighted radial distance raised to `b`.
///
/// Distances are measured on the centred (fft-shifted) spectrum, with the
/// centre at `n / 2` on each axis.
fn apply_falloff(data: &mut [Complex<f64>], dims: &[usize], b: f64, weighting: &[f64]) {
    let strides = strides(dims);
    data.par_iter_mut().enumerate().for_each(|(flat, coeff)| {
        let mut r2 = 0.0;
        for (axis, n) in dims.iter().enumerate() {
            let i = (flat / strides[axis]) % n;
            let shifted = ((i + n / 2) % n) as f64;
            let d = weighting[axis] * (shifted - *n as f64 / 2.0);
            r2 += d * d;
        }
        let rr = r2.sqrt();
        let amplitude = if rr == 0.0 { DC_AMPLITUDE } else { rr.powf(b) };
        let amplitude = if amplitude == 0.0 || !amplitude.is_finite() { DC_AMPLITUDE } else { amplitude };
        *coeff /= amplitude;
    });
}

fn strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; dims.len()];
    for axis in (0..dims.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * dims[axis + 1];
    }
    strides
}

/// Separable N-D FFT: one 1-D transform per line along every axis.
fn transform(data: &mut [Complex<f64>], dims: &[usize], direction: FftDirection, planner: &mut FftPlanner<f64>) {
    let strides = strides(dims);
    let len = data.len();
    for (axis, &n) in dims.iter().enumerate() {
        if n < 2 {
            continue;
        }
        let fft = planner.plan_fft(n, direction);
        let stride = strides[axis];
        let block = n * stride;
        let mut line = vec![Complex::new(0.0, 0.0); n];
        for base in (0..len).step_by(block) {
            for offset in 0..stride {
                let start = base + offset;
                for (t, slot) in line.iter_mut().enumerate() {
                    *slot = data[start + t * stride];
                }
                fft.process(&mut line);
                for (t, value) in line.iter().enumerate() {
                    data[start + t * stride] = *value;
                }
            }
        }
    }
}
