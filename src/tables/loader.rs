//! Reads the on-disk table directory into a [`ProbabilityTableStore`].
//!
//! Layout, relative to the table root:
//!
//! ```text
//! schedule_config.yml
//! {weekday,weekend}/mkv_chain_initial_prob_cluster_{k}.csv
//! {weekday,weekend}/mkv_chain_transition_prob_cluster_{k}.csv
//! {weekday,weekend}/duration_probability/cluster_{k}_{activity}_{tod}_duration_probability.csv
//! {end_use}_cluster_size_probability.csv
//! {end_use}_event_duration_probability.csv        (seconds)
//! {appliance}_power_duration_dist.csv
//! {appliance}_power_consumption_dist.csv
//! ```
//!
//! CSV files carry no header row.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use strum::IntoEnumIterator;
use tracing::{debug, info};

use super::config::ScheduleConfig;
use super::distribution::{
    ApplianceDistribution, DiscreteDistribution, StateVector, TransitionMatrix,
};
use super::store::ProbabilityTableStore;
use super::{Appliance, DurationKey, OccupantType, TimeOfDay, WaterEndUse};
use crate::activity::{ActivityState, STATE_COUNT};
use crate::calendar::DayType;
use crate::error::{Result, ScheduleError};

const SECONDS_PER_MINUTE: f64 = 60.0;

/// Parse a headerless numeric CSV; rows may differ in length and blank cells
/// are skipped
pub fn parse_rows<R: Read>(reader: R, what: &str) -> Result<Vec<Vec<f64>>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = record
            .iter()
            .filter(|cell| !cell.is_empty())
            .map(|cell| {
                cell.parse::<f64>().map_err(|e| {
                    ScheduleError::config(format!("{what} line {}: '{cell}': {e}", line + 1))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        if !row.is_empty() {
            rows.push(row);
        }
    }
    if rows.is_empty() {
        return Err(ScheduleError::config(format!("{what} has no rows")));
    }
    Ok(rows)
}

fn first_column(rows: &[Vec<f64>]) -> Vec<f64> {
    rows.iter().map(|row| row[0]).collect()
}

fn column(rows: &[Vec<f64>], index: usize, what: &str) -> Result<Vec<f64>> {
    rows.iter()
        .enumerate()
        .map(|(line, row)| {
            row.get(index).copied().ok_or_else(|| {
                ScheduleError::config(format!(
                    "{what} line {} has no column {}",
                    line + 1,
                    index + 1
                ))
            })
        })
        .collect()
}

fn as_count(value: f64, what: &str) -> Result<usize> {
    if !value.is_finite() || value < 0.0 {
        return Err(ScheduleError::config(format!(
            "{what}: {value} is not a non-negative count"
        )));
    }
    Ok(value.trunc() as usize)
}

fn state_vector(values: &[f64], what: &str) -> Result<StateVector> {
    if values.len() != STATE_COUNT {
        return Err(ScheduleError::config(format!(
            "{what}: expected {STATE_COUNT} states, found {}",
            values.len()
        )));
    }
    let mut vector = [0.0; STATE_COUNT];
    vector.copy_from_slice(values);
    Ok(vector)
}

/// Loads a table directory
pub struct TableLoader {
    root: PathBuf,
}

impl TableLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load(&self) -> Result<ProbabilityTableStore> {
        let config_path = self.root.join("schedule_config.yml");
        let mut text = String::new();
        File::open(&config_path)?.read_to_string(&mut text)?;
        let config = ScheduleConfig::from_yaml(&text)?;

        let mut store = ProbabilityTableStore::new(config);
        let occupant_types: Vec<OccupantType> = store.occupant_types().collect();

        for occupant in &occupant_types {
            for day_type in [DayType::Weekday, DayType::Weekend] {
                self.load_chain(&mut store, *occupant, day_type)?;
                self.load_activity_durations(&mut store, *occupant, day_type)?;
            }
        }
        for end_use in WaterEndUse::iter() {
            self.load_end_use(&mut store, end_use)?;
        }
        for appliance in Appliance::iter() {
            self.load_appliance(&mut store, appliance)?;
        }

        store.validate()?;
        info!(
            root = %self.root.display(),
            occupant_types = occupant_types.len(),
            "loaded probability tables"
        );
        Ok(store)
    }

    fn read(&self, relative: &Path) -> Result<Vec<Vec<f64>>> {
        let path = self.root.join(relative);
        debug!(path = %path.display(), "reading table");
        let file = File::open(&path).map_err(|e| {
            ScheduleError::config(format!("cannot open {}: {e}", path.display()))
        })?;
        parse_rows(BufReader::new(file), &relative.display().to_string())
    }

    fn load_chain(
        &self,
        store: &mut ProbabilityTableStore,
        occupant: OccupantType,
        day_type: DayType,
    ) -> Result<()> {
        let dir = Path::new(day_type.as_str());
        let k = occupant.0;

        let initial_name = format!("mkv_chain_initial_prob_cluster_{k}.csv");
        let initial_rows = self.read(&dir.join(&initial_name))?;
        let initial = state_vector(&first_column(&initial_rows), &initial_name)?;

        let transition_name = format!("mkv_chain_transition_prob_cluster_{k}.csv");
        let transition_rows = self.read(&dir.join(&transition_name))?;
        let transitions = TransitionMatrix::from_rows(&transition_rows, &transition_name)?;

        store.insert_chain(occupant, day_type, initial, transitions)
    }

    fn load_activity_durations(
        &self,
        store: &mut ProbabilityTableStore,
        occupant: OccupantType,
        day_type: DayType,
    ) -> Result<()> {
        let dir = Path::new(day_type.as_str()).join("duration_probability");
        for activity in ActivityState::iter().filter(|a| a.has_duration_table()) {
            for time_of_day in TimeOfDay::iter() {
                let name = format!(
                    "cluster_{}_{}_{}_duration_probability.csv",
                    occupant.0,
                    activity.table_name(),
                    time_of_day
                );
                let rows = self.read(&dir.join(&name))?;
                let durations = column(&rows, 0, &name)?
                    .into_iter()
                    .map(|d| as_count(d, &name))
                    .collect::<Result<Vec<usize>>>()?;
                let weights = column(&rows, 1, &name)?;

                store.insert_activity_duration(
                    DurationKey {
                        occupant,
                        activity,
                        day_type,
                        time_of_day,
                    },
                    DiscreteDistribution::new(durations, weights, &name)?,
                );
            }
        }
        Ok(())
    }

    fn load_end_use(&self, store: &mut ProbabilityTableStore, end_use: WaterEndUse) -> Result<()> {
        let cluster_name = format!("{end_use}_cluster_size_probability.csv");
        let cluster_rows = self.read(Path::new(&cluster_name))?;
        store.insert_cluster_size(
            end_use,
            DiscreteDistribution::counts(first_column(&cluster_rows), &cluster_name)?,
        );

        let duration_name = format!("{end_use}_event_duration_probability.csv");
        let duration_rows = self.read(Path::new(&duration_name))?;
        let minutes = column(&duration_rows, 0, &duration_name)?
            .into_iter()
            .map(|seconds| seconds / SECONDS_PER_MINUTE)
            .collect();
        let weights = column(&duration_rows, 1, &duration_name)?;
        store.insert_event_duration(
            end_use,
            DiscreteDistribution::new(minutes, weights, &duration_name)?,
        );
        Ok(())
    }

    fn load_appliance(
        &self,
        store: &mut ProbabilityTableStore,
        appliance: Appliance,
    ) -> Result<()> {
        let duration_name = format!("{appliance}_power_duration_dist.csv");
        let durations = self
            .read(Path::new(&duration_name))?
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|d| as_count(d, &duration_name))
                    .collect::<Result<Vec<usize>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let power_name = format!("{appliance}_power_consumption_dist.csv");
        let powers = first_column(&self.read(Path::new(&power_name))?);

        store.insert_appliance(
            appliance,
            ApplianceDistribution::new(durations, powers, &duration_name)?,
        );
        Ok(())
    }
}
