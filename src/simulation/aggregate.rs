//! # Resampling and Normalization
//!
//! Converts per-minute event channels and 15-minute occupancy into
//! output-timestep channels.

use super::occupant::Household;
use crate::activity::ActivityState;
use crate::calendar::{Calendar, VacancyWindow, MINUTES_PER_CHAIN_STEP, MINUTES_PER_DAY};
use crate::error::Result;
use crate::tables::config::DailySchedule;

/// Divide by the maximum; all-zero channels are returned unchanged
pub fn normalize_max(mut values: Vec<f64>) -> Vec<f64> {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max > 0.0 && max.is_finite() {
        for value in &mut values {
            *value /= max;
        }
    }
    values
}

/// Sum consecutive blocks of `group` values; a trailing partial block is dropped
pub fn block_sum(values: &[f64], group: usize) -> Vec<f64> {
    if group == 0 {
        return Vec::new();
    }
    values
        .chunks_exact(group)
        .map(|block| block.iter().sum())
        .collect()
}

/// Rotate so that `out[i] = values[(i + offset) mod n]`
pub fn phase_shift(values: &mut [f64], offset: i64) {
    if values.is_empty() {
        return;
    }
    let shift = offset.unsigned_abs() as usize % values.len();
    if offset >= 0 {
        values.rotate_left(shift);
    } else {
        values.rotate_right(shift);
    }
}

pub fn scale(values: &mut [f64], divisor: f64) {
    for value in values {
        *value /= divisor;
    }
}

/// Daily-schedule value scaled between the shape's minimum and its full value
/// by the active occupant fraction
pub fn daily_schedule_value(
    schedule: &DailySchedule,
    month: usize,
    is_weekday: bool,
    minute_of_day: usize,
    active: f64,
) -> f64 {
    let hourly = schedule.hourly(is_weekday);
    let min = hourly.iter().cloned().fold(f64::INFINITY, f64::min);
    let full = hourly[minute_of_day / 60] * schedule.monthly_multiplier[month];
    min + (full - min) * active
}

/// Hourly curve value scaled between the day's minimum and its full value
pub fn scale_by_occupancy(curve: &[f64], minute: usize, active: f64) -> f64 {
    let day_start = (minute / MINUTES_PER_DAY) * 24;
    let day = &curve[day_start..(day_start + 24).min(curve.len())];
    let min = day.iter().cloned().fold(f64::INFINITY, f64::min);
    min + (curve[minute / 60] - min) * active
}

/// Sleeping and away fractions per output step
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyFractions {
    pub sleep: Vec<f64>,
    pub away: Vec<f64>,
}

impl OccupancyFractions {
    pub fn from_household(household: &Household, calendar: &Calendar) -> Self {
        let steps = calendar.total_steps();
        let mut sleep = Vec::with_capacity(steps);
        let mut away = Vec::with_capacity(steps);
        for step in 0..steps {
            let chain_step = step * calendar.minutes_per_step / MINUTES_PER_CHAIN_STEP;
            sleep.push(household.fraction(ActivityState::Sleeping, chain_step));
            away.push(household.fraction(ActivityState::Away, chain_step));
        }
        Self { sleep, away }
    }

    /// Share of occupants awake and at home
    pub fn active(&self, step: usize) -> f64 {
        1.0 - self.away[step] - self.sleep[step]
    }

    pub fn occupants(&self) -> Vec<f64> {
        self.away.iter().map(|away| 1.0 - away).collect()
    }
}

/// 1.0 for every step whose date is inside the window, else 0.0
pub fn vacancy_mask(calendar: &Calendar, window: Option<&VacancyWindow>) -> Result<Vec<f64>> {
    let Some(window) = window else {
        return Ok(vec![0.0; calendar.total_steps()]);
    };
    let days = window.days(calendar)?;
    Ok((0..calendar.total_steps())
        .map(|step| {
            if days[step / calendar.steps_per_day] {
                1.0
            } else {
                0.0
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::occupant::OccupantChain;
    use crate::tables::OccupantType;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_max() {
        assert_eq!(normalize_max(vec![1.0, 4.0, 2.0]), vec![0.25, 1.0, 0.5]);
        assert_eq!(normalize_max(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_block_sum() {
        let minutes = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(block_sum(&minutes, 2), vec![3.0, 7.0, 11.0]);
        assert_eq!(block_sum(&minutes, 1), minutes.to_vec());
        assert_eq!(block_sum(&minutes, 4), vec![10.0]);
    }

    #[test]
    fn test_phase_shift_matches_rotation() {
        let mut values = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        phase_shift(&mut values, 2);
        assert_eq!(values, vec![2.0, 3.0, 4.0, 0.0, 1.0]);

        let mut values = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        phase_shift(&mut values, -1);
        assert_eq!(values, vec![4.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_daily_schedule_value() {
        let mut weekday = vec![0.5; 24];
        weekday[3] = 0.1;
        weekday[10] = 1.0;
        let schedule = DailySchedule {
            weekday_sch: weekday,
            weekend_sch: vec![1.0; 24],
            monthly_multiplier: vec![2.0; 12],
        };
        // hour 10 with nobody active sits at the minimum
        assert_eq!(daily_schedule_value(&schedule, 0, true, 630, 0.0), 0.1);
        assert_eq!(daily_schedule_value(&schedule, 0, true, 630, 1.0), 2.0);
        assert_eq!(daily_schedule_value(&schedule, 0, false, 630, 0.5), 1.5);
    }

    #[test]
    fn test_scale_by_occupancy_uses_day_minimum() {
        let mut curve = vec![0.5; 48];
        curve[24] = 0.2;
        curve[30] = 1.0;
        assert_eq!(scale_by_occupancy(&curve, 1440 + 6 * 60, 0.0), 0.2);
        assert_eq!(scale_by_occupancy(&curve, 1440 + 6 * 60, 1.0), 1.0);
        assert_eq!(scale_by_occupancy(&curve, 60, 0.0), 0.5);
    }

    #[test]
    fn test_occupancy_fractions_resample_chain() {
        let calendar = Calendar::new(2007, 5).unwrap();
        let states: Vec<_> = (0..calendar.chain_steps())
            .map(|step| {
                if step % 2 == 0 {
                    ActivityState::Away
                } else {
                    ActivityState::Sleeping
                }
            })
            .collect();
        let household = Household::new(
            vec![OccupantChain::new(OccupantType(0), states)],
            calendar.chain_steps(),
        )
        .unwrap();

        let fractions = OccupancyFractions::from_household(&household, &calendar);
        assert_eq!(fractions.away.len(), calendar.total_steps());
        // three 5-minute steps per chain step
        assert_eq!(&fractions.away[..6], &[1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(&fractions.sleep[..6], &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert_eq!(fractions.active(0), 0.0);
        assert_eq!(fractions.occupants()[3], 1.0);
    }

    #[test]
    fn test_vacancy_mask() {
        let calendar = Calendar::new(2007, 30).unwrap();
        assert!(vacancy_mask(&calendar, None).unwrap().iter().all(|v| *v == 0.0));

        let window: VacancyWindow = "Jan 2 - Jan 2".parse().unwrap();
        let mask = vacancy_mask(&calendar, Some(&window)).unwrap();
        assert_eq!(mask.iter().sum::<f64>(), 48.0);
        assert_eq!(mask[47], 0.0);
        assert_eq!(mask[48], 1.0);
        assert_eq!(mask[95], 1.0);
        assert_eq!(mask[96], 0.0);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(values in proptest::collection::vec(0.0f64..10.0, 1..64)) {
            let once = normalize_max(values);
            let twice = normalize_max(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_block_sum_preserves_total(
            values in proptest::collection::vec(0.0f64..5.0, 60..61)
        ) {
            let total: f64 = values.iter().sum();
            for group in [1usize, 2, 3, 4, 5, 6, 10, 12, 15, 20, 30, 60] {
                let summed: f64 = block_sum(&values, group).iter().sum();
                prop_assert!((summed - total).abs() < 1e-9);
            }
        }
    }
}
