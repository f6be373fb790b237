//! Injectable randomness for presentation-only values (ratings, default
//! images).

/// Source of uniformly distributed values in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// Thread-local RNG from `rand`. Used outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::random::<f64>()
    }
}

/// Always returns the same value, clamped into `[0, 1)`.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(f64);

impl FixedRandom {
    #[must_use]
    pub fn new(value: f64) -> Self {
        let value = if value.is_finite() { value } else { 0.0 };
        Self(value.clamp(0.0, 1.0 - f64::EPSILON))
    }
}

impl RandomSource for FixedRandom {
    fn next_unit(&self) -> f64 {
        self.0
    }
}

/// Maps a unit draw onto an index in `0..len`. `len` must be non-zero.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub(crate) fn pick_index(random: &dyn RandomSource, len: usize) -> usize {
    let index = (random.next_unit() * len as f64).floor() as usize;
    index.min(len.saturating_sub(1))
}
