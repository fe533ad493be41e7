//! Per-component random generators.
//!
//! Every fractal surface, volume and grass patch owns its own generator.
//! Explicit seeds are used verbatim; unset seeds mix fresh entropy with a
//! process-wide counter so two unseeded draws never share a sequence.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

static UNSEEDED_DRAWS: AtomicU64 = AtomicU64::new(0);

/// Pick a seed for a component: the explicit one, or a fresh unique one.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(s) => s,
        None => fresh_seed(),
    }
}

/// Draw a seed no other call in this process will return.
pub fn fresh_seed() -> u64 {
    let draw = UNSEEDED_DRAWS.fetch_add(1, Ordering::Relaxed);
    let entropy: u64 = rand::rng().random();
    splitmix64(entropy ^ splitmix64(draw))
}

/// Generator for a component.
pub fn generator(seed: Option<u64>) -> StdRng {
    StdRng::seed_from_u64(resolve_seed(seed))
}

/// SplitMix64 finalizer.
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
