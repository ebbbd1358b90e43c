//! Seeded random stream shared by every sampling call of one generation run.
//!
//! The stream is an explicit handle passed by `&mut` into each sampler, so
//! call order is visible in the code. Reordering calls changes the output for
//! a fixed seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::{Result, ScheduleError};

/// Source of uniform draws in `[0, 1)`
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

/// Inverse-CDF pick over `weights` for a given uniform draw `r`.
///
/// Returns the smallest index whose cumulative weight is `>= r`. When the
/// weights sum to less than `r` the last index is returned; probability tables
/// that do not sum exactly to one rely on this.
pub fn pick_weighted(weights: &[f64], r: f64) -> usize {
    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if r <= cumulative {
            return index;
        }
    }
    weights.len().saturating_sub(1)
}

/// Weighted categorical draw consuming exactly one uniform number
pub fn weighted_draw<S: UniformSource + ?Sized>(source: &mut S, weights: &[f64]) -> usize {
    let r = source.next_uniform();
    pick_weighted(weights, r)
}

/// Scale `weights` so they sum to one
pub fn normalize_weights(weights: &[f64], what: &str) -> Result<Vec<f64>> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(ScheduleError::degenerate(format!(
            "{what} weights sum to {total}"
        )));
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

/// The generator's single deterministic stream
pub struct ScheduleRng {
    inner: StdRng,
}

impl ScheduleRng {
    /// Seed the stream from a building identifier
    pub fn for_building(building_id: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(building_id),
        }
    }

    pub fn uniform(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    pub fn weighted_draw(&mut self, weights: &[f64]) -> usize {
        weighted_draw(self, weights)
    }

    /// Uniform index in `0..len`
    pub fn index(&mut self, len: usize) -> Result<usize> {
        if len == 0 {
            return Err(ScheduleError::range("empty table", 0, 0));
        }
        Ok(self.inner.gen_range(0..len))
    }

    /// Uniform integer offset in `-span..span`
    pub fn offset(&mut self, span: i64) -> i64 {
        if span <= 0 {
            return 0;
        }
        self.inner.gen_range(-span..span)
    }

    /// Gaussian draw, raised to `floor` when given
    pub fn gaussian(&mut self, mean: f64, std_dev: f64, floor: Option<f64>) -> Result<f64> {
        // Normal::new mirrors a negative spread instead of rejecting it
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(ScheduleError::config(format!(
                "invalid normal spread {std_dev} for mean {mean}"
            )));
        }
        let normal = Normal::new(mean, std_dev).map_err(|e| {
            ScheduleError::config(format!("invalid normal distribution ({mean}, {std_dev}): {e}"))
        })?;
        let value = normal.sample(&mut self.inner);
        Ok(match floor {
            Some(min) if value < min => min,
            _ => value,
        })
    }
}

impl UniformSource for ScheduleRng {
    fn next_uniform(&mut self) -> f64 {
        self.uniform()
    }
}
