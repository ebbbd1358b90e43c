//! Error taxonomy for schedule generation.
//!
//! Every failure aborts generation for the whole building; nothing is retried
//! because generation is a pure function of its inputs.

use thiserror::Error;

/// Schedule generation errors
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Malformed or missing probability table, invalid vacancy date, or a
    /// timestep outside the permitted set
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A weight vector that has to be normalized sums to zero
    #[error("Arithmetic degeneracy: {0}")]
    ArithmeticDegeneracy(String),

    /// A sampled index falls outside its table
    #[error("Index {index} out of range for {what} (len {len})")]
    Range {
        what: String,
        index: usize,
        len: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ScheduleError {
    pub fn config(msg: impl Into<String>) -> Self {
        ScheduleError::Configuration(msg.into())
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        ScheduleError::ArithmeticDegeneracy(msg.into())
    }

    pub fn range(what: impl Into<String>, index: usize, len: usize) -> Self {
        ScheduleError::Range {
            what: what.into(),
            index,
            len,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Bounds-checked slice access that reports a [`ScheduleError::Range`]
pub(crate) fn checked_get<'a, T>(slice: &'a [T], index: usize, what: &str) -> Result<&'a T> {
    slice
        .get(index)
        .ok_or_else(|| ScheduleError::range(what, index, slice.len()))
}
