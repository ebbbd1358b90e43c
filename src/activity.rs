//! Occupant activity states simulated by the Markov chain.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// Number of mutually exclusive activity states
pub const STATE_COUNT: usize = ActivityState::COUNT;

/// What one occupant is doing during a 15-minute chain step.
///
/// The discriminant order matches the column order of the source survey
/// tables and must not change.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumCount,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityState {
    Sleeping = 0,
    Showering = 1,
    Laundry = 2,
    Cooking = 3,
    Dishwashing = 4,
    Away = 5,
    IdleAtHome = 6,
}

impl ActivityState {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    /// States whose hold duration is sampled from a table; every other state
    /// lasts exactly one chain step
    pub fn has_duration_table(self) -> bool {
        matches!(
            self,
            ActivityState::Showering
                | ActivityState::Laundry
                | ActivityState::Cooking
                | ActivityState::Dishwashing
        )
    }

    /// Activity name used in duration table file names
    pub fn table_name(self) -> &'static str {
        match self {
            ActivityState::Sleeping => "sleeping",
            ActivityState::Showering => "shower",
            ActivityState::Laundry => "laundry",
            ActivityState::Cooking => "cooking",
            ActivityState::Dishwashing => "dishwashing",
            ActivityState::Away => "absent",
            ActivityState::IdleAtHome => "nothingAtHome",
        }
    }

    /// Occupant is neither asleep nor out of the house
    pub fn is_awake_at_home(self) -> bool {
        !matches!(self, ActivityState::Sleeping | ActivityState::Away)
    }
}
