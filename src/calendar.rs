//! Simulation calendar: year, leap flag and output timestep.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Month, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Markov-chain resolution, fixed regardless of the output timestep
pub const CHAIN_STEPS_PER_DAY: usize = 96;
pub const CHAIN_STEPS_PER_HOUR: usize = 4;
pub const MINUTES_PER_CHAIN_STEP: usize = 15;
pub const MINUTES_PER_DAY: usize = 1440;

/// Output timesteps that divide an hour evenly
pub const PERMITTED_MINUTES_PER_STEP: [usize; 12] = [1, 2, 3, 4, 5, 6, 10, 12, 15, 20, 30, 60];

/// Weekday/weekend split used to select probability tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ => DayType::Weekday,
        }
    }

    /// Directory name used by the table layout
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub year: i32,
    pub is_leap: bool,
    pub minutes_per_step: usize,
    pub steps_per_day: usize,
    pub total_days: usize,
    start_date: NaiveDate,
}

impl Calendar {
    /// Build a calendar for `year` at the given output resolution
    pub fn new(year: i32, minutes_per_step: usize) -> Result<Self> {
        if !PERMITTED_MINUTES_PER_STEP.contains(&minutes_per_step) {
            return Err(ScheduleError::config(format!(
                "timestep of {minutes_per_step} minutes is not one of {PERMITTED_MINUTES_PER_STEP:?}"
            )));
        }
        let start_date = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| ScheduleError::config(format!("year {year} is out of range")))?;
        let is_leap = NaiveDate::from_ymd_opt(year, 2, 29).is_some();

        Ok(Self {
            year,
            is_leap,
            minutes_per_step,
            steps_per_day: MINUTES_PER_DAY / minutes_per_step,
            total_days: if is_leap { 366 } else { 365 },
            start_date,
        })
    }

    pub fn total_steps(&self) -> usize {
        self.total_days * self.steps_per_day
    }

    pub fn total_hours(&self) -> usize {
        self.total_days * 24
    }

    pub fn minutes_in_year(&self) -> usize {
        self.total_days * MINUTES_PER_DAY
    }

    pub fn chain_steps(&self) -> usize {
        self.total_days * CHAIN_STEPS_PER_DAY
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Calendar date of a zero-based day index
    pub fn date(&self, day: usize) -> NaiveDate {
        self.start_date() + Duration::days(day as i64)
    }

    /// Start timestamp of an output step
    pub fn timestamp(&self, step: usize) -> NaiveDateTime {
        self.start_date().and_time(chrono::NaiveTime::default())
            + Duration::minutes((step * self.minutes_per_step) as i64)
    }

    pub fn day_type(&self, day: usize) -> DayType {
        DayType::of(self.date(day))
    }

    /// Zero-based month of a zero-based day index
    pub fn month_index(&self, day: usize) -> usize {
        self.date(day).month0() as usize
    }

    pub fn days_in_months(&self) -> [usize; 12] {
        let february = if self.is_leap { 29 } else { 28 };
        [31, february, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    }

    /// Zero-based day-of-year for a month/day, if that date exists in this year
    pub fn day_of_year(&self, month: u32, day: u32) -> Option<usize> {
        NaiveDate::from_ymd_opt(self.year, month, day).map(|date| date.ordinal0() as usize)
    }
}

/// Inclusive month/day range of an unoccupied period, e.g. `Dec 1 - Jan 31`.
///
/// A start after the end wraps across the new year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VacancyWindow {
    start: (u32, u32),
    end: (u32, u32),
}

pub(crate) fn parse_month_day(text: &str) -> Result<(u32, u32)> {
    let mut parts = text.split_whitespace();
    let (Some(month), Some(day), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ScheduleError::config(format!(
            "invalid vacancy date '{text}', expected e.g. 'Dec 1'"
        )));
    };
    let month = Month::from_str(month)
        .map_err(|_| ScheduleError::config(format!("invalid month in vacancy date '{text}'")))?
        .number_from_month();
    let day: u32 = day
        .parse()
        .map_err(|_| ScheduleError::config(format!("invalid day in vacancy date '{text}'")))?;
    // 2000 is a leap year, so Feb 29 passes here and is checked per calendar
    if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
        return Err(ScheduleError::config(format!("vacancy date '{text}' does not exist")));
    }
    Ok((month, day))
}

impl VacancyWindow {
    pub fn new(start: (u32, u32), end: (u32, u32)) -> Result<Self> {
        for (month, day) in [start, end] {
            if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
                return Err(ScheduleError::config(format!(
                    "vacancy date {month}/{day} does not exist"
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Zero-based first and last day of the window in `calendar`'s year
    pub fn day_bounds(&self, calendar: &Calendar) -> Result<(usize, usize)> {
        let resolve = |(month, day): (u32, u32)| {
            calendar.day_of_year(month, day).ok_or_else(|| {
                ScheduleError::config(format!(
                    "vacancy date {month}/{day} does not exist in {}",
                    calendar.year
                ))
            })
        };
        Ok((resolve(self.start)?, resolve(self.end)?))
    }

    /// Per-day membership flags for the whole year
    pub fn days(&self, calendar: &Calendar) -> Result<Vec<bool>> {
        let (first, last) = self.day_bounds(calendar)?;
        Ok((0..calendar.total_days)
            .map(|day| {
                if first <= last {
                    (first..=last).contains(&day)
                } else {
                    day >= first || day <= last
                }
            })
            .collect())
    }
}

impl FromStr for VacancyWindow {
    type Err = ScheduleError;

    fn from_str(text: &str) -> Result<Self> {
        let Some((start, end)) = text.split_once('-') else {
            return Err(ScheduleError::config(format!(
                "invalid vacancy period '{text}', expected 'Mon D - Mon D'"
            )));
        };
        Self::new(parse_month_day(start.trim())?, parse_month_day(end.trim())?)
    }
}

impl TryFrom<String> for VacancyWindow {
    type Error = ScheduleError;

    fn try_from(text: String) -> Result<Self> {
        text.parse()
    }
}

impl From<VacancyWindow> for String {
    fn from(window: VacancyWindow) -> String {
        window.to_string()
    }
}

impl fmt::Display for VacancyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |month: u32| {
            Month::try_from(month as u8)
                .map(|m| m.name()[..3].to_string())
                .unwrap_or_default()
        };
        write!(
            f,
            "{} {} - {} {}",
            name(self.start.0),
            self.start.1,
            name(self.end.0),
            self.end.1
        )
    }
}
