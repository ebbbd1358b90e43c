use std::collections::HashMap;

use strum::IntoEnumIterator;
use tracing::debug;

use super::config::ScheduleConfig;
use super::distribution::{
    check_probabilities, ApplianceDistribution, DiscreteDistribution, StateVector,
    TransitionMatrix,
};
use super::{Appliance, DurationKey, OccupantType, TimeOfDay, WaterEndUse};
use crate::activity::ActivityState;
use crate::calendar::DayType;
use crate::error::{Result, ScheduleError};

/// In-memory index of all probability tables.
///
/// Filled by the loader (or by hand in tests), then checked once with
/// [`ProbabilityTableStore::validate`] before generation starts. Lookups of a
/// missing table are configuration errors.
#[derive(Debug, Clone)]
pub struct ProbabilityTableStore {
    config: ScheduleConfig,
    initial: HashMap<(OccupantType, DayType), StateVector>,
    transitions: HashMap<(OccupantType, DayType), TransitionMatrix>,
    activity_durations: HashMap<DurationKey, DiscreteDistribution<usize>>,
    event_durations: HashMap<WaterEndUse, DiscreteDistribution<f64>>,
    cluster_sizes: HashMap<WaterEndUse, DiscreteDistribution<usize>>,
    appliances: HashMap<Appliance, ApplianceDistribution>,
}

impl ProbabilityTableStore {
    pub fn new(config: ScheduleConfig) -> Self {
        Self {
            config,
            initial: HashMap::new(),
            transitions: HashMap::new(),
            activity_durations: HashMap::new(),
            event_durations: HashMap::new(),
            cluster_sizes: HashMap::new(),
            appliances: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn occupant_types(&self) -> impl Iterator<Item = OccupantType> {
        (0..self.config.occupant_type_count()).map(|i| OccupantType(i as u8))
    }

    pub fn insert_chain(
        &mut self,
        occupant: OccupantType,
        day_type: DayType,
        initial: StateVector,
        transitions: TransitionMatrix,
    ) -> Result<()> {
        check_probabilities(
            &initial,
            &format!("{occupant} {} initial vector", day_type.as_str()),
        )?;
        self.initial.insert((occupant, day_type), initial);
        self.transitions.insert((occupant, day_type), transitions);
        Ok(())
    }

    pub fn insert_activity_duration(
        &mut self,
        key: DurationKey,
        dist: DiscreteDistribution<usize>,
    ) {
        self.activity_durations.insert(key, dist);
    }

    /// Event durations are in minutes
    pub fn insert_event_duration(&mut self, end_use: WaterEndUse, dist: DiscreteDistribution<f64>) {
        self.event_durations.insert(end_use, dist);
    }

    pub fn insert_cluster_size(&mut self, end_use: WaterEndUse, dist: DiscreteDistribution<usize>) {
        self.cluster_sizes.insert(end_use, dist);
    }

    pub fn insert_appliance(&mut self, appliance: Appliance, dist: ApplianceDistribution) {
        self.appliances.insert(appliance, dist);
    }

    pub fn initial(&self, occupant: OccupantType, day_type: DayType) -> Result<&StateVector> {
        self.initial.get(&(occupant, day_type)).ok_or_else(|| {
            ScheduleError::config(format!(
                "no initial vector for {occupant} {}",
                day_type.as_str()
            ))
        })
    }

    pub fn transitions(
        &self,
        occupant: OccupantType,
        day_type: DayType,
    ) -> Result<&TransitionMatrix> {
        self.transitions.get(&(occupant, day_type)).ok_or_else(|| {
            ScheduleError::config(format!(
                "no transition matrix for {occupant} {}",
                day_type.as_str()
            ))
        })
    }

    pub fn activity_duration(&self, key: &DurationKey) -> Result<&DiscreteDistribution<usize>> {
        self.activity_durations.get(key).ok_or_else(|| {
            ScheduleError::config(format!(
                "no duration table for {} {} {} {}",
                key.occupant,
                key.activity,
                key.day_type.as_str(),
                key.time_of_day
            ))
        })
    }

    pub fn event_duration(&self, end_use: WaterEndUse) -> Result<&DiscreteDistribution<f64>> {
        self.event_durations
            .get(&end_use)
            .ok_or_else(|| ScheduleError::config(format!("no event duration table for {end_use}")))
    }

    pub fn cluster_size(&self, end_use: WaterEndUse) -> Result<&DiscreteDistribution<usize>> {
        self.cluster_sizes
            .get(&end_use)
            .ok_or_else(|| ScheduleError::config(format!("no cluster size table for {end_use}")))
    }

    pub fn appliance(&self, appliance: Appliance) -> Result<&ApplianceDistribution> {
        self.appliances
            .get(&appliance)
            .ok_or_else(|| ScheduleError::config(format!("no power table for {appliance}")))
    }

    /// Check that every table the generator can reach is present
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;

        let day_types = [DayType::Weekday, DayType::Weekend];
        for occupant in self.occupant_types() {
            for day_type in day_types {
                self.initial(occupant, day_type)?;
                self.transitions(occupant, day_type)?;
                for activity in ActivityState::iter().filter(|a| a.has_duration_table()) {
                    for time_of_day in TimeOfDay::iter() {
                        self.activity_duration(&DurationKey {
                            occupant,
                            activity,
                            day_type,
                            time_of_day,
                        })?;
                    }
                }
            }
        }

        for end_use in WaterEndUse::iter() {
            self.event_duration(end_use)?;
            self.cluster_size(end_use)?;
        }
        for appliance in Appliance::iter() {
            self.appliance(appliance)?;
        }

        debug!(
            occupant_types = self.config.occupant_type_count(),
            duration_tables = self.activity_durations.len(),
            "probability tables complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::config::tests::SAMPLE_YAML;

    fn empty_store() -> ProbabilityTableStore {
        ProbabilityTableStore::new(ScheduleConfig::from_yaml(SAMPLE_YAML).unwrap())
    }

    #[test]
    fn test_missing_table_is_configuration_error() {
        let store = empty_store();
        assert!(matches!(
            store.initial(OccupantType(0), DayType::Weekday),
            Err(ScheduleError::Configuration(_))
        ));
        assert!(matches!(
            store.appliance(Appliance::Cooking),
            Err(ScheduleError::Configuration(_))
        ));
        assert!(store.validate().is_err());
    }

    #[test]
    fn test_insert_chain_rejects_bad_initial_vector() {
        let mut store = empty_store();
        let slice = [[1.0 / 7.0; 7]; 7];
        let bad = [0.5, 0.5, 0.5, -0.1, 0.0, 0.0, 0.0];
        assert!(store
            .insert_chain(OccupantType(0), DayType::Weekday, bad, TransitionMatrix::uniform(slice))
            .is_err());

        let good = [1.0 / 7.0; 7];
        store
            .insert_chain(OccupantType(0), DayType::Weekday, good, TransitionMatrix::uniform(slice))
            .unwrap();
        assert_eq!(store.initial(OccupantType(0), DayType::Weekday).unwrap(), &good);
    }

    #[test]
    fn test_occupant_types_follow_config() {
        let store = empty_store();
        let types: Vec<_> = store.occupant_types().collect();
        assert_eq!(types, vec![OccupantType(0), OccupantType(1)]);
    }
}
