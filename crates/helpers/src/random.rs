use std::any::Any;

use doubles::{MethodSlot, SpyTarget};

/// Source of uniformly distributed numbers in `[0, 1)`.
///
/// Exposes its generator as the `"random"` member so tests can spy on it and force values.
#[derive(Clone, Debug)]
pub struct RandomSource {
    random: MethodSlot<(), f64>,
}

impl RandomSource {
    pub fn new() -> Self {
        Self {
            random: MethodSlot::new(|_: ()| rand::random::<f64>()),
        }
    }

    pub fn random(&self) -> f64 {
        self.random.call(())
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SpyTarget for RandomSource {
    fn member(&self, name: &str) -> Option<&dyn Any> {
        match name {
            "random" => Some(&self.random),
            _ => None,
        }
    }
}

/// Picks an integer in `[min, max]` from `source`
pub fn random_between(source: &RandomSource, min: i64, max: i64) -> i64 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    let fraction = source.random().max(0.0);

    // Widened so that spans up to the full i64 range cannot overflow
    let (low, high) = (i128::from(low), i128::from(high));
    let span = (high - low + 1) as f64;
    let picked = (low + (fraction * span).floor() as i128).clamp(low, high);

    i64::try_from(picked).unwrap_or(i64::MAX)
}
