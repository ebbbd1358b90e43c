//! Small in-memory table set shared by unit tests.

use strum::IntoEnumIterator;

use super::config::tests::SAMPLE_YAML;
use super::{
    Appliance, ApplianceDistribution, DiscreteDistribution, DurationKey, ProbabilityTableStore,
    ScheduleConfig, StateVector, TimeOfDay, TransitionMatrix, WaterEndUse,
};
use crate::activity::{ActivityState, STATE_COUNT};
use crate::calendar::DayType;

/// Stationary state probabilities used by every initial vector and transition row
pub(crate) const STATIONARY: StateVector = [0.30, 0.02, 0.02, 0.05, 0.03, 0.236, 0.344];

pub(crate) fn synthetic_store() -> ProbabilityTableStore {
    synthetic_store_with(STATIONARY, 1)
}

pub(crate) fn sample_config() -> ScheduleConfig {
    ScheduleConfig::from_yaml(SAMPLE_YAML).unwrap()
}

/// Stationary chains over an edited `config`
pub(crate) fn synthetic_store_from(config: ScheduleConfig) -> ProbabilityTableStore {
    build_store(config, STATIONARY, 1)
}

/// Every chain row equals `probabilities`; every activity lasts `hold` steps
pub(crate) fn synthetic_store_with(
    probabilities: StateVector,
    hold: usize,
) -> ProbabilityTableStore {
    build_store(sample_config(), probabilities, hold)
}

fn build_store(
    config: ScheduleConfig,
    probabilities: StateVector,
    hold: usize,
) -> ProbabilityTableStore {
    let mut store = ProbabilityTableStore::new(config);
    let slice = [probabilities; STATE_COUNT];

    let occupants: Vec<_> = store.occupant_types().collect();
    for occupant in occupants {
        for day_type in [DayType::Weekday, DayType::Weekend] {
            store
                .insert_chain(occupant, day_type, probabilities, TransitionMatrix::uniform(slice))
                .unwrap();
            for activity in ActivityState::iter().filter(|a| a.has_duration_table()) {
                for time_of_day in TimeOfDay::iter() {
                    store.insert_activity_duration(
                        DurationKey {
                            occupant,
                            activity,
                            day_type,
                            time_of_day,
                        },
                        DiscreteDistribution::new(vec![hold], vec![1.0], "hold").unwrap(),
                    );
                }
            }
        }
    }

    for end_use in WaterEndUse::iter() {
        store.insert_cluster_size(
            end_use,
            DiscreteDistribution::counts(vec![0.6, 0.4], "clusters").unwrap(),
        );
        store.insert_event_duration(
            end_use,
            DiscreteDistribution::new(vec![2.5, 6.0], vec![0.5, 0.5], "events").unwrap(),
        );
    }
    for appliance in Appliance::iter() {
        store.insert_appliance(
            appliance,
            ApplianceDistribution::new(vec![vec![2, 3], vec![4]], vec![0.8, 1.2], "power")
                .unwrap(),
        );
    }

    store.validate().unwrap();
    store
}
