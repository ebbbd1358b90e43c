//! ProbabilityTableStore: every empirical distribution the generator samples,
//! indexed by strongly typed keys.

pub mod config;
pub mod distribution;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod loader;
pub mod store;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::activity::ActivityState;
use crate::calendar::DayType;

pub use config::ScheduleConfig;
pub use distribution::{
    ApplianceDistribution, DiscreteDistribution, StateMatrix, StateVector, TransitionMatrix,
};
pub use loader::TableLoader;
pub use store::ProbabilityTableStore;

/// Behavioural cluster an occupant is assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccupantType(pub u8);

impl OccupantType {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for OccupantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cluster_{}", self.0)
    }
}

/// Time-of-day bucket for activity durations, on the survey's own clock
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Midday,
    Evening,
}

impl TimeOfDay {
    pub fn from_hour(hour: usize) -> Self {
        if hour < 8 {
            TimeOfDay::Morning
        } else if hour < 16 {
            TimeOfDay::Midday
        } else {
            TimeOfDay::Evening
        }
    }
}

/// Key of an activity-duration distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DurationKey {
    pub occupant: OccupantType,
    pub activity: ActivityState,
    pub day_type: DayType,
    pub time_of_day: TimeOfDay,
}

/// End uses with cluster-size and event-duration tables
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WaterEndUse {
    ClothesWasher,
    Dishwasher,
    Shower,
}

/// Appliances with joint duration/power tables
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Appliance {
    ClothesWasher,
    Dishwasher,
    ClothesDryer,
    Cooking,
}
