//! # Interior and Holiday Lighting Curves
//!
//! Deterministic lighting shapes derived from solar geometry. No random draws.
//!
//! ## Interior Curve
//!
//! - Monthly sunrise/sunset from declination and the equation of time
//!   (fixed tables above 51.49° latitude)
//! - A 48-point half-hourly day per month: a June baseline, a seasonal
//!   daytime segment and two evening bumps anchored at sunset
//! - Months weighted by energy per day and stitched into one year, max-scaled
//!   to 1
//!
//! ## Holiday Overlay
//!
//! A fixed daily shape on Jan 1-6 and from Nov 27 to year end.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::aggregate::normalize_max;
use crate::calendar::Calendar;
use crate::error::{Result, ScheduleError};

/// Above this latitude the fixed sunrise/sunset tables are used
pub const FALLBACK_LATITUDE_DEG: f64 = 51.49;

pub const FALLBACK_SUNRISE_HOURS: [f64; 12] = [
    8.125726064, 7.449258072, 6.388688653, 6.232405257, 5.27722936, 4.84705384, 5.127512162,
    5.860163988, 6.684378904, 7.521267411, 7.390441945, 8.080667697,
];

pub const FALLBACK_SUNSET_HOURS: [f64; 12] = [
    16.22214058, 17.08642353, 17.98324493, 19.83547864, 20.65149672, 21.20662992, 21.12124777,
    20.37458274, 19.25834757, 18.08155615, 16.14359164, 15.75571306,
];

/// Half-hourly June energy-use baseline
const JUNE_KWS: [f64; 48] = [
    0.060, 0.040, 0.035, 0.025, 0.020, 0.020, 0.020, 0.020, 0.020, 0.020, 0.020, 0.020, 0.020,
    0.025, 0.030, 0.030, 0.025, 0.020, 0.015, 0.015, 0.015, 0.015, 0.015, 0.015, 0.015, 0.015,
    0.015, 0.015, 0.015, 0.015, 0.015, 0.015, 0.020, 0.020, 0.020, 0.025, 0.025, 0.030, 0.030,
    0.035, 0.045, 0.060, 0.085, 0.125, 0.145, 0.130, 0.105, 0.080,
];

const SEASONAL_MULTIPLIER: [f64; 12] = [
    1.075, 1.064951905, 1.0375, 1.0, 0.9625, 0.935048095, 0.925, 0.935048095, 0.9625, 1.0, 1.0375,
    1.064951905,
];

// Evening bump fit: first bump trails sunset, second is fixed in clock time
const AMPLITUDE_1: f64 = 0.929707907917098;
const SUNSET_LAG_1: f64 = 2.45016230615269;
const STD_DEV_1: f64 = 1.58679810983444;
const AMPLITUDE_2: f64 = 1.1372291802273;
const SUNSET_LAG_2: f64 = 20.1501965859073;
const STD_DEV_2: f64 = 2.36567663279954;

/// Holiday lighting starts on this month/day and runs to year end
pub const HOLIDAY_START: (u32, u32) = (11, 27);
/// Holiday lighting covers the first days of January
pub const HOLIDAY_JANUARY_DAYS: usize = 6;

/// How months are weighted against each other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyLightingMultiplier {
    /// Derived from each month's daily energy
    #[default]
    Calculated,
    /// Twelve user-supplied multipliers
    UserSpecified(Vec<f64>),
}

/// Interior lighting curve for one location
#[derive(Debug, Clone)]
pub struct LightingCurveCalculator {
    latitude_deg: f64,
    longitude_deg: f64,
    /// Hours from UTC
    timezone_offset: f64,
    monthly: MonthlyLightingMultiplier,
}

impl LightingCurveCalculator {
    pub fn new(
        latitude_deg: f64,
        longitude_deg: f64,
        timezone_offset: f64,
        monthly: MonthlyLightingMultiplier,
    ) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            timezone_offset,
            monthly,
        }
    }

    /// Sunrise and sunset hours of day for each month
    pub fn sun_times(&self) -> ([f64; 12], [f64; 12]) {
        if self.latitude_deg >= FALLBACK_LATITUDE_DEG {
            return (FALLBACK_SUNRISE_HOURS, FALLBACK_SUNSET_HOURS);
        }

        let deg = PI / 180.0;
        let standard_meridian = -self.timezone_offset * 15.0;
        let mut sunrise = [0.0; 12];
        let mut sunset = [0.0; 12];

        for month in 0..12 {
            let month_number = month as f64 + 1.0;
            let representative_day = month_number * 30.0 - 15.0;
            // Daylight saving from April through October
            let dst = if (4..=10).contains(&(month + 1)) { 1.0 } else { 0.0 };

            let declination = 23.45 * (0.9863 * (284.0 + representative_day) * 0.01745329).sin();
            let b = (representative_day - 1.0) * 0.9863;
            let equation_of_time = 0.01667
                * (0.01719 + 0.42815 * (deg * b).cos()
                    - 7.35205 * (deg * b).sin()
                    - 3.34976 * (deg * 2.0 * b).cos()
                    - 9.37199 * (deg * 2.0 * b).sin());

            let cos_hour_angle = (-(deg * self.latitude_deg).tan() * (deg * declination).tan())
                .clamp(-1.0, 1.0);
            let sunset_hour_angle = cos_hour_angle.acos() / deg;
            let correction = equation_of_time + (standard_meridian + self.longitude_deg) / 15.0;

            sunrise[month] = dst + (12.0 - sunset_hour_angle / 15.0) - correction;
            sunset[month] = dst + (12.0 + sunset_hour_angle / 15.0) - correction;
        }
        (sunrise, sunset)
    }

    /// Half-hourly energy profile of a representative day in `month` (0-based)
    pub fn half_hour_profile(month: usize, sunset_hour: f64) -> [f64; 48] {
        let seasonal = SEASONAL_MULTIPLIER[month];
        let month_number = month as f64 + 1.0;
        let spread_1 = 25.5 / ((6.5 - month_number).abs() + 20.0) * STD_DEV_1;
        let hour_of = |index: usize| (index as f64 + 1.0) * 0.5;

        let sunset_bump = |base: f64, hour: f64| {
            let offset = hour - (sunset_hour + SUNSET_LAG_1);
            let exponent = -offset.powi(2) / (2.0 * spread_1.powi(2));
            base + AMPLITUDE_1 * exponent.exp() / (spread_1 * (2.0 * PI).sqrt())
        };
        let night_bump = |hour: f64| {
            0.04 + AMPLITUDE_2 * (-(hour - SUNSET_LAG_2).powi(2) / (2.0 * STD_DEV_2.powi(2))).exp()
                / (STD_DEV_2 * (2.0 * PI).sqrt())
        };

        let mut kws = [0.0; 48];
        kws[..10].copy_from_slice(&JUNE_KWS[..10]);
        for index in 9..=17 {
            let hour = hour_of(index);
            kws[index] = (kws[8] - (0.15 / (2.0 * PI)) * ((2.0 * PI) * (hour - 4.5) / 3.5).sin()
                + (0.15 / 3.5) * (hour - 4.5))
                * seasonal;
        }
        for index in 17..=29 {
            let hour = hour_of(index);
            kws[index] = (kws[16] - (-0.02 / (2.0 * PI)) * ((2.0 * PI) * (hour - 8.5) / 5.5).sin()
                + (-0.02 / 5.5) * (hour - 8.5))
                * seasonal;
        }
        for index in 29..=45 {
            kws[index] = sunset_bump(kws[28], hour_of(index));
        }
        for index in 45..=46 {
            let hour = hour_of(index);
            let first = sunset_bump(kws[44], hour);
            let second = night_bump(hour);
            kws[index] = if SUNSET_LAG_2 < sunset_hour + SUNSET_LAG_1 {
                first.min(second)
            } else {
                first.max(second)
            };
        }
        for index in 46..=47 {
            kws[index] = night_bump(hour_of(index));
        }
        kws
    }

    /// Hourly interior lighting fraction for every hour of the year
    pub fn annual_curve(&self, calendar: &Calendar) -> Result<Vec<f64>> {
        let days_in_months = calendar.days_in_months();
        let (_, sunset) = self.sun_times();

        let mut hourly_share = [[0.0; 24]; 12];
        let mut kwh_per_day = [0.0; 12];
        let mut weighted_average = 0.0;
        for month in 0..12 {
            let kws = Self::half_hour_profile(month, sunset[month]);
            let total: f64 = kws.iter().sum();
            for (hour, share) in hourly_share[month].iter_mut().enumerate() {
                *share = (kws[hour * 2] + kws[hour * 2 + 1]) / total;
            }
            kwh_per_day[month] = total / 2.0;
            weighted_average +=
                kwh_per_day[month] * days_in_months[month] as f64 / calendar.total_days as f64;
        }

        let multipliers: Vec<f64> = match &self.monthly {
            MonthlyLightingMultiplier::Calculated => {
                kwh_per_day.iter().map(|kwh| kwh / weighted_average).collect()
            }
            MonthlyLightingMultiplier::UserSpecified(values) => {
                if values.len() != 12 || values.iter().any(|v| !v.is_finite()) {
                    return Err(ScheduleError::config(
                        "a monthly lighting schedule needs 12 numbers",
                    ));
                }
                values.clone()
            }
        };

        let weighted_days: f64 = multipliers
            .iter()
            .zip(days_in_months)
            .map(|(m, days)| m * days as f64)
            .sum();
        if weighted_days <= 0.0 {
            return Err(ScheduleError::degenerate(
                "monthly lighting multipliers sum to zero",
            ));
        }

        let mut curve = Vec::with_capacity(calendar.total_hours());
        for month in 0..12 {
            let days = days_in_months[month];
            let month_share = multipliers[month] * days as f64 / weighted_days;
            let day: Vec<f64> = hourly_share[month]
                .iter()
                .map(|share| month_share * share / days as f64)
                .collect();
            for _ in 0..days {
                curve.extend_from_slice(&day);
            }
        }
        Ok(normalize_max(curve))
    }
}

/// Hourly holiday lighting overlay for the year
pub fn holiday_curve(calendar: &Calendar, daily_shape: &[f64]) -> Result<Vec<f64>> {
    if daily_shape.len() != 24 {
        return Err(ScheduleError::config(format!(
            "holiday lighting shape needs 24 values, found {}",
            daily_shape.len()
        )));
    }
    let (month, day) = HOLIDAY_START;
    let start = calendar
        .day_of_year(month, day)
        .ok_or_else(|| ScheduleError::config("holiday start date outside the year"))?;

    let mut curve = vec![0.0; calendar.total_hours()];
    let holiday_days =
        (0..HOLIDAY_JANUARY_DAYS.min(calendar.total_days)).chain(start..calendar.total_days);
    for day in holiday_days {
        curve[day * 24..(day + 1) * 24].copy_from_slice(daily_shape);
    }
    Ok(normalize_max(curve))
}
