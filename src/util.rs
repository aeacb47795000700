use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic pseudo-random pair in `[-1, 1]` derived from `key`.
pub fn stable_pair(key: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// Unit direction for index pairs whose positions coincide.
pub fn fallback_direction(a: usize, b: usize) -> (f32, f32) {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214 + 0.11) * std::f32::consts::TAU;
    (angle.cos(), angle.sin())
}
