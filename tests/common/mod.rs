//! Shared synthetic tables for the integration suites.
#![allow(dead_code)]

use occupant_schedules::activity::{ActivityState, STATE_COUNT};
use occupant_schedules::calendar::DayType;
use occupant_schedules::simulation::GeneratorSettings;
use occupant_schedules::tables::{
    Appliance, ApplianceDistribution, DiscreteDistribution, DurationKey, ProbabilityTableStore,
    ScheduleConfig, StateVector, TimeOfDay, TransitionMatrix, WaterEndUse,
};
use strum::IntoEnumIterator;

pub const SCHEDULE_CONFIG: &str = r#"
occupancy_types_probability: [0.4, 0.6]
plugload:
  weekday_sch: "0.04, 0.037, 0.037, 0.036, 0.033, 0.036, 0.043, 0.047, 0.034, 0.023, 0.024, 0.025, 0.024, 0.028, 0.031, 0.035, 0.037, 0.043, 0.051, 0.055, 0.056, 0.057, 0.053, 0.047"
  weekend_sch: "0.04, 0.037, 0.037, 0.036, 0.033, 0.036, 0.043, 0.047, 0.034, 0.023, 0.024, 0.025, 0.024, 0.028, 0.031, 0.035, 0.037, 0.043, 0.051, 0.055, 0.056, 0.057, 0.053, 0.047"
  monthly_multiplier: [1.137, 1.129, 0.961, 0.969, 0.961, 0.993, 0.996, 0.96, 0.993, 0.867, 0.86, 1.137]
lighting:
  weekday_sch: [0.046, 0.046, 0.046, 0.046, 0.046, 0.037, 0.035, 0.034, 0.033, 0.028, 0.022, 0.015, 0.012, 0.011, 0.011, 0.012, 0.019, 0.037, 0.049, 0.065, 0.091, 0.105, 0.091, 0.063]
  weekend_sch: [0.046, 0.046, 0.045, 0.045, 0.046, 0.045, 0.044, 0.041, 0.036, 0.03, 0.024, 0.016, 0.012, 0.011, 0.011, 0.012, 0.019, 0.038, 0.048, 0.06, 0.083, 0.098, 0.085, 0.059]
  monthly_multiplier: [1.248, 1.257, 0.993, 0.989, 0.993, 0.827, 0.821, 0.821, 0.827, 0.99, 0.987, 1.248]
  holiday_sch: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0.008, 0.098, 0.168, 0.194, 0.284, 0.192, 0.037, 0.019]
ceiling_fan:
  weekday_sch: [0.057, 0.057, 0.057, 0.057, 0.057, 0.057, 0.057, 0.024, 0.024, 0.024, 0.024, 0.024, 0.024, 0.024, 0.024, 0.024, 0.024, 0.024, 0.052, 0.057, 0.057, 0.057, 0.057, 0.057]
  weekend_sch: [0.057, 0.057, 0.057, 0.057, 0.057, 0.057, 0.057, 0.024, 0.024, 0.024, 0.024, 0.024, 0.024, 0.024, 0.024, 0.024, 0.024, 0.024, 0.052, 0.057, 0.057, 0.057, 0.057, 0.057]
  monthly_multiplier: [0, 0, 0, 0, 0, 1, 1, 1, 1, 0, 0, 0]
sink:
  duration_probability: [0.33, 0.25, 0.15, 0.1, 0.07, 0.05, 0.03, 0.02]
  events_per_cluster_probs: [0.62, 0.14, 0.08, 0.05, 0.04, 0.03, 0.02, 0.02]
  hourly_onset_prob: [0.007, 0.018, 0.042, 0.062, 0.066, 0.062, 0.054, 0.05, 0.049, 0.045, 0.041, 0.043, 0.046, 0.051, 0.055, 0.053, 0.042, 0.042, 0.05, 0.057, 0.055, 0.047, 0.031, 0.011]
  total_annual_cluster: 6657
  between_event_gap: 2
  flow_rate_mean: 1.14
  flow_rate_std: 0.61
shower:
  between_event_gap: 0
  flow_rate_mean: 2.25
  flow_rate_std: 0.68
bath:
  bath_to_shower_ratio: 0.078
  duration_mean: 5.65
  duration_std: 2.09
  flow_rate_mean: 4.4
  flow_rate_std: 1.17
dishwasher:
  flow_rate_mean: 1.39
  flow_rate_std: 0.2
  between_event_gap: 10
clothes_washer:
  flow_rate_mean: 2.2
  flow_rate_std: 0.62
  between_event_gap: 4
  load_size_probability: [0.682926829, 0.227642276, 0.056910569, 0.032520325]
"#;

/// Stationary activity mix; 23.6% of chain steps are spent away
pub const STATIONARY: StateVector = [0.30, 0.02, 0.02, 0.05, 0.03, 0.236, 0.344];

pub fn store() -> ProbabilityTableStore {
    store_with(STATIONARY)
}

/// Every initial vector and transition row equals `probabilities`, and every
/// activity lasts one chain step
pub fn store_with(probabilities: StateVector) -> ProbabilityTableStore {
    let config = ScheduleConfig::from_yaml(SCHEDULE_CONFIG).unwrap();
    let mut store = ProbabilityTableStore::new(config);
    let occupants: Vec<_> = store.occupant_types().collect();

    for occupant in occupants {
        for day_type in [DayType::Weekday, DayType::Weekend] {
            store
                .insert_chain(
                    occupant,
                    day_type,
                    probabilities,
                    TransitionMatrix::uniform([probabilities; STATE_COUNT]),
                )
                .unwrap();
            for activity in ActivityState::iter().filter(|a| a.has_duration_table()) {
                for time_of_day in TimeOfDay::iter() {
                    store.insert_activity_duration(
                        DurationKey { occupant, activity, day_type, time_of_day },
                        DiscreteDistribution::new(vec![1], vec![1.0], "hold").unwrap(),
                    );
                }
            }
        }
    }

    for end_use in WaterEndUse::iter() {
        store.insert_cluster_size(
            end_use,
            DiscreteDistribution::counts(vec![0.5, 0.3, 0.2], "cluster size").unwrap(),
        );
        store.insert_event_duration(
            end_use,
            DiscreteDistribution::new(vec![1.5, 4.0, 8.0], vec![0.3, 0.5, 0.2], "event duration")
                .unwrap(),
        );
    }
    for appliance in Appliance::iter() {
        store.insert_appliance(
            appliance,
            ApplianceDistribution::new(vec![vec![3, 5, 2], vec![10]], vec![0.6, 1.0, 1.4], "power")
                .unwrap(),
        );
    }
    store
}

pub fn settings(occupant_count: usize, minutes_per_step: usize) -> GeneratorSettings {
    GeneratorSettings {
        year: 2007,
        minutes_per_step,
        building_id: 1,
        occupant_count,
        ..GeneratorSettings::default()
    }
}
