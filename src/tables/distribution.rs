//! Empirical discrete distributions and their samplers.

use serde::{Deserialize, Serialize};

use crate::activity::{ActivityState, STATE_COUNT};
use crate::calendar::CHAIN_STEPS_PER_DAY;
use crate::error::{checked_get, Result, ScheduleError};
use crate::rng::ScheduleRng;

pub type StateVector = [f64; STATE_COUNT];
pub type StateMatrix = [[f64; STATE_COUNT]; STATE_COUNT];

pub(crate) fn check_probabilities(weights: &[f64], what: &str) -> Result<()> {
    if weights.is_empty() {
        return Err(ScheduleError::config(format!("{what} is empty")));
    }
    if let Some(bad) = weights
        .iter()
        .find(|w| !w.is_finite() || **w < 0.0 || **w > 1.0)
    {
        return Err(ScheduleError::config(format!(
            "{what} contains {bad}, outside [0, 1]"
        )));
    }
    Ok(())
}

/// Paired value/weight table sampled with one weighted draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteDistribution<T> {
    values: Vec<T>,
    weights: Vec<f64>,
}

impl<T: Copy> DiscreteDistribution<T> {
    pub fn new(values: Vec<T>, weights: Vec<f64>, what: &str) -> Result<Self> {
        if values.len() != weights.len() {
            return Err(ScheduleError::config(format!(
                "{what}: {} values but {} probabilities",
                values.len(),
                weights.len()
            )));
        }
        check_probabilities(&weights, what)?;
        Ok(Self { values, weights })
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn sample(&self, rng: &mut ScheduleRng) -> Result<T> {
        let index = rng.weighted_draw(&self.weights);
        checked_get(&self.values, index, "distribution value").copied()
    }
}

impl DiscreteDistribution<usize> {
    /// Count distribution where weight `i` is the probability of `i + 1`
    pub fn counts(weights: Vec<f64>, what: &str) -> Result<Self> {
        let values = (1..=weights.len()).collect();
        Self::new(values, weights, what)
    }
}

/// Per-step 7x7 transition slices for one occupant type and day type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionMatrix {
    slices: Vec<StateMatrix>,
}

impl TransitionMatrix {
    /// Build from stacked rows: rows `j*7 .. (j+1)*7` are the slice for chain step `j`
    pub fn from_rows(rows: &[Vec<f64>], what: &str) -> Result<Self> {
        let expected = CHAIN_STEPS_PER_DAY * STATE_COUNT;
        if rows.len() != expected {
            return Err(ScheduleError::config(format!(
                "{what}: expected {expected} rows, found {}",
                rows.len()
            )));
        }

        let mut slices = Vec::with_capacity(CHAIN_STEPS_PER_DAY);
        for (step, block) in rows.chunks(STATE_COUNT).enumerate() {
            let mut slice = [[0.0; STATE_COUNT]; STATE_COUNT];
            for (from, row) in block.iter().enumerate() {
                if row.len() != STATE_COUNT {
                    return Err(ScheduleError::config(format!(
                        "{what}: row {} has {} columns, expected {STATE_COUNT}",
                        step * STATE_COUNT + from,
                        row.len()
                    )));
                }
                check_probabilities(row, what)?;
                slice[from].copy_from_slice(row);
            }
            slices.push(slice);
        }
        Ok(Self { slices })
    }

    /// Same slice at every chain step
    pub fn uniform(slice: StateMatrix) -> Self {
        Self {
            slices: vec![slice; CHAIN_STEPS_PER_DAY],
        }
    }

    pub fn slice(&self, step: usize) -> Result<&StateMatrix> {
        checked_get(&self.slices, step, "transition matrix step")
    }

    /// State probabilities after leaving `current` at chain step `step`,
    /// computed as the one-hot row vector of `current` times that step's slice
    pub fn next_probabilities(&self, current: ActivityState, step: usize) -> Result<StateVector> {
        let mut one_hot = [0.0; STATE_COUNT];
        one_hot[current.index()] = 1.0;
        Ok(row_times_matrix(&one_hot, self.slice(step)?))
    }
}

pub fn row_times_matrix(row: &StateVector, matrix: &StateMatrix) -> StateVector {
    let mut out = [0.0; STATE_COUNT];
    for (i, weight) in row.iter().enumerate() {
        for (j, cell) in out.iter_mut().enumerate() {
            *cell += weight * matrix[i][j];
        }
    }
    out
}

/// Joint duration/power table for one appliance.
///
/// `durations` rows hold run lengths in chain steps; `powers` holds average
/// power values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceDistribution {
    durations: Vec<Vec<usize>>,
    powers: Vec<f64>,
}

impl ApplianceDistribution {
    pub fn new(durations: Vec<Vec<usize>>, powers: Vec<f64>, what: &str) -> Result<Self> {
        if durations.is_empty() || durations.iter().any(Vec::is_empty) {
            return Err(ScheduleError::config(format!("{what}: empty duration row")));
        }
        if powers.is_empty() || powers.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(ScheduleError::config(format!(
                "{what}: power values must be non-empty and non-negative"
            )));
        }
        Ok(Self { durations, powers })
    }

    pub fn duration_rows(&self) -> usize {
        self.durations.len()
    }

    pub fn power_rows(&self) -> usize {
        self.powers.len()
    }

    pub fn power(&self, row: usize) -> Result<f64> {
        checked_get(&self.powers, row, "appliance power").copied()
    }

    /// Draw one run length from the chosen duration row
    pub fn sample_duration(&self, row: usize, rng: &mut ScheduleRng) -> Result<usize> {
        let durations = checked_get(&self.durations, row, "appliance duration row")?;
        let pick = rng.index(durations.len())?;
        checked_get(durations, pick, "appliance duration").copied()
    }
}
