//! Finished schedule channels and the analytics applied to them.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use tracing::{debug, info};

use crate::calendar::{parse_month_day, Calendar, PERMITTED_MINUTES_PER_STEP};
use crate::error::{Result, ScheduleError};

pub const KWH_PER_THERM: f64 = 29.3071;
pub const CUBIC_METERS_PER_GALLON: f64 = 0.003785411784;

/// Output channel names, declared in export order
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
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScheduleColumn {
    Occupants,
    CookingRange,
    PlugLoads,
    LightingInterior,
    LightingExterior,
    LightingGarage,
    LightingExteriorHoliday,
    ClothesWasher,
    ClothesDryer,
    Dishwasher,
    Baths,
    Showers,
    Sinks,
    CeilingFan,
    ClothesDryerExhaust,
    ClothesWasherPower,
    DishwasherPower,
    Sleep,
    Vacancy,
}

impl ScheduleColumn {
    /// Flow channels scaled by the reference peak flow rate
    pub fn is_water(self) -> bool {
        matches!(
            self,
            ScheduleColumn::ClothesWasher
                | ScheduleColumn::Dishwasher
                | ScheduleColumn::Baths
                | ScheduleColumn::Showers
                | ScheduleColumn::Sinks
        )
    }

    /// Power channels scaled by the reference peak power
    pub fn is_power(self) -> bool {
        matches!(
            self,
            ScheduleColumn::CookingRange
                | ScheduleColumn::ClothesDryer
                | ScheduleColumn::ClothesDryerExhaust
                | ScheduleColumn::ClothesWasherPower
                | ScheduleColumn::DishwasherPower
        )
    }

    /// Channels divided by their own maximum
    pub fn is_max_normalized(self) -> bool {
        matches!(
            self,
            ScheduleColumn::PlugLoads
                | ScheduleColumn::LightingInterior
                | ScheduleColumn::LightingExterior
                | ScheduleColumn::LightingGarage
                | ScheduleColumn::LightingExteriorHoliday
                | ScheduleColumn::CeilingFan
        )
    }
}

/// Named per-timestep channels for one simulated year
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSet {
    calendar: Calendar,
    columns: BTreeMap<ScheduleColumn, Vec<f64>>,
}

impl ScheduleSet {
    pub fn new(calendar: Calendar) -> Self {
        Self {
            calendar,
            columns: BTreeMap::new(),
        }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn insert(&mut self, column: ScheduleColumn, values: Vec<f64>) -> Result<()> {
        if values.len() != self.calendar.total_steps() {
            return Err(ScheduleError::config(format!(
                "{column} has {} values, expected {}",
                values.len(),
                self.calendar.total_steps()
            )));
        }
        self.columns.insert(column, values);
        Ok(())
    }

    pub fn get(&self, column: ScheduleColumn) -> Option<&[f64]> {
        self.columns.get(&column).map(Vec::as_slice)
    }

    pub fn column(&self, column: ScheduleColumn) -> Result<&[f64]> {
        self.get(column)
            .ok_or_else(|| ScheduleError::config(format!("no '{column}' schedule")))
    }

    fn column_mut(&mut self, column: ScheduleColumn) -> Result<&mut Vec<f64>> {
        self.columns
            .get_mut(&column)
            .ok_or_else(|| ScheduleError::config(format!("no '{column}' schedule")))
    }

    /// Columns in export order
    pub fn columns(&self) -> impl Iterator<Item = (ScheduleColumn, &[f64])> {
        self.columns.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Hours the channel would need at 1.0 to match its annual integral
    pub fn full_load_hours(&self, column: ScheduleColumn) -> Result<f64> {
        let values = self.column(column)?;
        let minutes_per_item = self.calendar.total_hours() as f64 * 60.0 / values.len() as f64;
        Ok(values.iter().sum::<f64>() / (60.0 / minutes_per_item))
    }

    /// Watts at schedule value 1.0 that consume `annual_kwh` over the year
    pub fn design_level_from_annual_kwh(
        &self,
        column: ScheduleColumn,
        annual_kwh: f64,
    ) -> Result<f64> {
        let hours = self.nonzero_full_load_hours(column)?;
        Ok(annual_kwh * 1000.0 / hours)
    }

    pub fn design_level_from_annual_therm(
        &self,
        column: ScheduleColumn,
        annual_therm: f64,
    ) -> Result<f64> {
        self.design_level_from_annual_kwh(column, annual_therm * KWH_PER_THERM)
    }

    /// Watts at schedule value 1.0 that consume `daily_kwh` on an average day
    pub fn design_level_from_daily_kwh(
        &self,
        column: ScheduleColumn,
        daily_kwh: f64,
    ) -> Result<f64> {
        let daily_hours = self.nonzero_full_load_hours(column)? / self.calendar.total_days as f64;
        Ok(daily_kwh / daily_hours * 1000.0)
    }

    pub fn design_level_from_daily_therm(
        &self,
        column: ScheduleColumn,
        daily_therm: f64,
    ) -> Result<f64> {
        self.design_level_from_daily_kwh(column, daily_therm * KWH_PER_THERM)
    }

    /// Peak flow in m³/s that draws `daily_gallons` on an average day
    pub fn peak_flow_from_daily_gallons(
        &self,
        column: ScheduleColumn,
        daily_gallons: f64,
    ) -> Result<f64> {
        let daily_hours = self.nonzero_full_load_hours(column)? / self.calendar.total_days as f64;
        let gallons_per_minute = daily_gallons / daily_hours / 60.0;
        Ok(gallons_per_minute * CUBIC_METERS_PER_GALLON / 60.0)
    }

    /// Average daily gallons drawn at a peak flow given in m³/s
    pub fn daily_gallons_from_peak_flow(
        &self,
        column: ScheduleColumn,
        peak_flow: f64,
    ) -> Result<f64> {
        let hours = self.full_load_hours(column)?;
        let gallons_per_minute = peak_flow * 60.0 / CUBIC_METERS_PER_GALLON;
        Ok(hours * 60.0 * gallons_per_minute / self.calendar.total_days as f64)
    }

    fn nonzero_full_load_hours(&self, column: ScheduleColumn) -> Result<f64> {
        let hours = self.full_load_hours(column)?;
        if hours <= 0.0 {
            return Err(ScheduleError::degenerate(format!(
                "'{column}' has no full-load hours"
            )));
        }
        Ok(hours)
    }

    /// Every channel peaks at most at 1 and has a permitted resolution
    pub fn validate(&self) -> Result<()> {
        for (column, values) in &self.columns {
            if let Some(max) = values.iter().cloned().reduce(f64::max) {
                if max > 1.0 {
                    return Err(ScheduleError::config(format!(
                        "the max value of schedule '{column}' is greater than 1 ({max})"
                    )));
                }
            }
            let hours = self.calendar.total_hours();
            let items_per_hour = values.len() / hours;
            let valid = values.len() % hours == 0
                && items_per_hour > 0
                && 60 % items_per_hour == 0
                && PERMITTED_MINUTES_PER_STEP.contains(&(60 / items_per_hour));
            if !valid {
                return Err(ScheduleError::config(format!(
                    "schedule '{column}' has {} values, not a permitted resolution",
                    values.len()
                )));
            }
        }
        Ok(())
    }

    /// Zero `column` wherever the vacancy channel is set
    pub fn apply_vacancy(&mut self, column: ScheduleColumn) -> Result<()> {
        let Some(vacancy) = self.columns.get(&ScheduleColumn::Vacancy).cloned() else {
            return Ok(());
        };
        if vacancy.iter().all(|v| *v == 0.0) {
            return Ok(());
        }
        let values = self.column_mut(column)?;
        for (value, vacant) in values.iter_mut().zip(&vacancy) {
            *value *= 1.0 - vacant;
        }
        debug!(%column, "vacancy applied");
        Ok(())
    }

    /// Zero `column` from `start_date` (e.g. `"Jul 4"`) at `start_hour` for
    /// `length_hours`, both ends inclusive
    pub fn apply_outage(
        &mut self,
        column: ScheduleColumn,
        start_date: &str,
        start_hour: u32,
        length_hours: u32,
    ) -> Result<()> {
        let (month, day) = parse_month_day(start_date)?;
        let start = NaiveDate::from_ymd_opt(self.calendar.year, month, day)
            .and_then(|date| date.and_hms_opt(start_hour, 0, 0))
            .ok_or_else(|| {
                ScheduleError::config(format!("invalid outage start {start_date} {start_hour}:00"))
            })?;
        let end = start + Duration::hours(length_hours as i64);

        let calendar = self.calendar;
        let values = self.column_mut(column)?;
        for (step, value) in values.iter_mut().enumerate() {
            let timestamp = calendar.timestamp(step);
            if start <= timestamp && timestamp <= end {
                *value = 0.0;
            }
        }
        info!(%column, %start, %end, "outage applied");
        Ok(())
    }

    /// Header row of column names, then one row per timestep
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(self.columns.keys().map(|c| <&'static str>::from(*c)))?;
        for step in 0..self.calendar.total_steps() {
            csv_writer.write_record(self.columns.values().map(|values| values[step].to_string()))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_csv_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.write_csv(File::create(path)?)?;
        info!(path = %path.display(), columns = self.len(), "schedules written");
        Ok(())
    }

    /// Read a schedule file for `year`; the timestep is inferred from the row
    /// count and unknown columns are skipped
    pub fn read_csv<R: Read>(reader: R, year: i32) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let known: Vec<Option<ScheduleColumn>> = headers
            .iter()
            .map(|name| name.trim().parse::<ScheduleColumn>().ok())
            .collect();

        let mut values: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
        for (line, record) in csv_reader.records().enumerate() {
            let record = record?;
            for (index, cell) in record.iter().enumerate() {
                if known.get(index).copied().flatten().is_none() || cell.is_empty() {
                    continue;
                }
                let value = cell.trim().parse::<f64>().map_err(|e| {
                    ScheduleError::config(format!("row {}: '{cell}': {e}", line + 2))
                })?;
                values[index].push(value);
            }
        }

        let rows = values
            .iter()
            .zip(&known)
            .filter(|(_, column)| column.is_some())
            .map(|(v, _)| v.len())
            .max()
            .unwrap_or(0);
        let hours = Calendar::new(year, 60)?.total_hours();
        if rows == 0 || rows % hours != 0 || 60 % (rows / hours) != 0 {
            return Err(ScheduleError::config(format!(
                "{rows} rows is not a whole number of steps per hour for {year}"
            )));
        }
        let mut set = ScheduleSet::new(Calendar::new(year, 60 / (rows / hours))?);
        for (column, column_values) in known.into_iter().zip(values) {
            if let Some(column) = column {
                set.insert(column, column_values)?;
            }
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use strum::IntoEnumIterator;

    fn column_names() -> Vec<&'static str> {
        ScheduleColumn::iter().map(|c| c.into()).collect()
    }

    fn hourly_set(year: i32) -> ScheduleSet {
        ScheduleSet::new(Calendar::new(year, 60).unwrap())
    }

    #[test]
    fn test_column_order_and_names() {
        let names = column_names();
        assert_eq!(names.len(), 19);
        assert_eq!(names[0], "occupants");
        assert_eq!(names[6], "lighting_exterior_holiday");
        assert_eq!(names[18], "vacancy");
        for column in ScheduleColumn::iter() {
            assert_eq!(column.to_string(), <&'static str>::from(column));
            assert_eq!(column.as_ref().parse::<ScheduleColumn>().unwrap(), column);
        }
    }

    #[test]
    fn test_insert_checks_length() {
        let mut set = hourly_set(2007);
        assert!(set.insert(ScheduleColumn::Sleep, vec![0.0; 10]).is_err());
        assert!(set.insert(ScheduleColumn::Sleep, vec![0.0; 8760]).is_ok());
        assert!(set.column(ScheduleColumn::Sinks).is_err());
    }

    #[test]
    fn test_full_load_hours_and_design_levels() {
        let mut set = ScheduleSet::new(Calendar::new(2007, 30).unwrap());
        set.insert(ScheduleColumn::PlugLoads, vec![0.5; 17520]).unwrap();

        let hours = set.full_load_hours(ScheduleColumn::PlugLoads).unwrap();
        assert!((hours - 4380.0).abs() < 1e-6);

        let watts = set
            .design_level_from_annual_kwh(ScheduleColumn::PlugLoads, 438.0)
            .unwrap();
        assert!((watts - 100.0).abs() < 1e-9);

        // 12 full-load hours per day at 100 W is 1.2 kWh per day
        let watts = set
            .design_level_from_daily_kwh(ScheduleColumn::PlugLoads, 1.2)
            .unwrap();
        assert!((watts - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_peak_flow_round_trip() {
        let mut set = hourly_set(2007);
        set.insert(ScheduleColumn::Showers, vec![0.1; 8760]).unwrap();
        let peak = set
            .peak_flow_from_daily_gallons(ScheduleColumn::Showers, 20.0)
            .unwrap();
        let gallons = set
            .daily_gallons_from_peak_flow(ScheduleColumn::Showers, peak)
            .unwrap();
        assert!((gallons - 20.0).abs() < 1e-9);

        set.insert(ScheduleColumn::Baths, vec![0.0; 8760]).unwrap();
        assert!(matches!(
            set.peak_flow_from_daily_gallons(ScheduleColumn::Baths, 20.0),
            Err(ScheduleError::ArithmeticDegeneracy(_))
        ));
    }

    #[test]
    fn test_validate_rejects_values_above_one() {
        let mut set = hourly_set(2007);
        let mut values = vec![0.5; 8760];
        set.insert(ScheduleColumn::Sinks, values.clone()).unwrap();
        assert!(set.validate().is_ok());

        values[100] = 1.5;
        set.insert(ScheduleColumn::Sinks, values).unwrap();
        assert!(matches!(set.validate(), Err(ScheduleError::Configuration(_))));
    }

    #[test]
    fn test_apply_vacancy() {
        let mut set = hourly_set(2007);
        let mut vacancy = vec![0.0; 8760];
        vacancy[24..48].fill(1.0);
        set.insert(ScheduleColumn::Vacancy, vacancy).unwrap();
        set.insert(ScheduleColumn::PlugLoads, vec![0.8; 8760]).unwrap();

        set.apply_vacancy(ScheduleColumn::PlugLoads).unwrap();
        let plug = set.column(ScheduleColumn::PlugLoads).unwrap();
        assert_eq!(plug[23], 0.8);
        assert_eq!(plug[24], 0.0);
        assert_eq!(plug[47], 0.0);
        assert_eq!(plug[48], 0.8);
    }

    #[test]
    fn test_apply_outage_is_inclusive() {
        let mut set = hourly_set(2007);
        set.insert(ScheduleColumn::CeilingFan, vec![1.0; 8760]).unwrap();
        set.apply_outage(ScheduleColumn::CeilingFan, "Jan 2", 5, 3)
            .unwrap();
        let fan = set.column(ScheduleColumn::CeilingFan).unwrap();
        assert_eq!(fan[24 + 4], 1.0);
        assert_eq!(&fan[24 + 5..=24 + 8], &[0.0; 4]);
        assert_eq!(fan[24 + 9], 1.0);

        assert!(set
            .apply_outage(ScheduleColumn::CeilingFan, "Jan 2", 25, 1)
            .is_err());
    }

    #[test]
    fn test_csv_round_trip() {
        let mut set = ScheduleSet::new(Calendar::new(2007, 30).unwrap());
        let values: Vec<f64> = (0..17520).map(|i| (i % 7) as f64 / 8.0).collect();
        set.insert(ScheduleColumn::Sleep, values.clone()).unwrap();
        set.insert(ScheduleColumn::Occupants, vec![1.0; 17520]).unwrap();

        let mut buffer = Vec::new();
        set.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("occupants,sleep\n"));

        let read = ScheduleSet::read_csv(Cursor::new(buffer), 2007).unwrap();
        assert_eq!(read.calendar().minutes_per_step, 30);
        assert_eq!(read, set);
    }
}
