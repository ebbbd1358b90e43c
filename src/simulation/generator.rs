//! # Schedule Generator
//!
//! Master orchestrator for one building: simulates the occupants, fills the
//! occupancy-driven channels, synthesizes end-use events and assembles the
//! final [`ScheduleSet`].
//!
//! The run is a pure function of the settings and the probability tables;
//! all randomness comes from one stream seeded with the building id.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::aggregate::{
    block_sum, daily_schedule_value, normalize_max, phase_shift, scale, scale_by_occupancy,
    vacancy_mask, OccupancyFractions,
};
use super::events::{EventChannel, EventSynthesizer};
use super::lighting::{holiday_curve, LightingCurveCalculator, MonthlyLightingMultiplier};
use super::occupant::OccupantActivitySimulator;
use crate::calendar::{Calendar, DayType, VacancyWindow, MINUTES_PER_DAY};
use crate::error::{Result, ScheduleError};
use crate::rng::ScheduleRng;
use crate::schedule::{ScheduleColumn, ScheduleSet};
use crate::tables::ProbabilityTableStore;

/// Reference peak flow (gal/min) that water channels are divided by
pub const DEFAULT_PEAK_FLOW_RATE: f64 = 500.0;
/// Reference peak power that power channels are divided by
pub const DEFAULT_PEAK_POWER: f64 = 100.0;
/// Water channels are shifted by up to this many minutes either way
pub const PHASE_OFFSET_MINUTES: i64 = 30;

/// Site location used by the lighting curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees (positive = north)
    pub latitude_deg: f64,
    /// Longitude in degrees (positive = east)
    pub longitude_deg: f64,
    /// Timezone offset from UTC in hours
    pub timezone_offset: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude_deg: 39.83,
            longitude_deg: -104.65,
            timezone_offset: -7.0,
        }
    }
}

/// Everything the engine needs besides the probability tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    pub year: i32,
    pub minutes_per_step: usize,
    /// Seeds the random stream
    pub building_id: u64,
    pub occupant_count: usize,
    pub vacancy: Option<VacancyWindow>,
    pub location: Location,
    pub lighting: MonthlyLightingMultiplier,
    pub peak_flow_rate: f64,
    pub peak_power: f64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            year: 2007,
            minutes_per_step: 60,
            building_id: 1,
            occupant_count: 2,
            vacancy: None,
            location: Location::default(),
            lighting: MonthlyLightingMultiplier::Calculated,
            peak_flow_rate: DEFAULT_PEAK_FLOW_RATE,
            peak_power: DEFAULT_PEAK_POWER,
        }
    }
}

impl From<EventChannel> for ScheduleColumn {
    fn from(channel: EventChannel) -> Self {
        match channel {
            EventChannel::Sinks => ScheduleColumn::Sinks,
            EventChannel::Showers => ScheduleColumn::Showers,
            EventChannel::Baths => ScheduleColumn::Baths,
            EventChannel::Dishwasher => ScheduleColumn::Dishwasher,
            EventChannel::ClothesWasher => ScheduleColumn::ClothesWasher,
            EventChannel::DishwasherPower => ScheduleColumn::DishwasherPower,
            EventChannel::ClothesWasherPower => ScheduleColumn::ClothesWasherPower,
            EventChannel::ClothesDryer => ScheduleColumn::ClothesDryer,
            EventChannel::CookingRange => ScheduleColumn::CookingRange,
        }
    }
}

pub struct ScheduleGenerator<'a> {
    tables: &'a ProbabilityTableStore,
    settings: GeneratorSettings,
    calendar: Calendar,
}

impl<'a> ScheduleGenerator<'a> {
    pub fn new(tables: &'a ProbabilityTableStore, settings: GeneratorSettings) -> Result<Self> {
        let calendar = Calendar::new(settings.year, settings.minutes_per_step)?;
        if settings.peak_flow_rate <= 0.0 || settings.peak_power <= 0.0 {
            return Err(ScheduleError::config(
                "reference peak flow rate and peak power must be positive",
            ));
        }
        tables.validate()?;
        Ok(Self {
            tables,
            settings,
            calendar,
        })
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn generate(&self) -> Result<ScheduleSet> {
        let settings = &self.settings;
        let calendar = self.calendar;
        info!(
            year = calendar.year,
            minutes_per_step = calendar.minutes_per_step,
            building_id = settings.building_id,
            occupants = settings.occupant_count,
            "generating schedules"
        );

        // Deterministic inputs first
        let location = settings.location;
        let interior = LightingCurveCalculator::new(
            location.latitude_deg,
            location.longitude_deg,
            location.timezone_offset,
            settings.lighting.clone(),
        )
        .annual_curve(&calendar)?;
        let holiday = holiday_curve(&calendar, &self.tables.config().lighting.holiday_sch)?;

        let mut rng = ScheduleRng::for_building(settings.building_id);
        let household = OccupantActivitySimulator::new(self.tables, calendar)
            .simulate_household(settings.occupant_count, &mut rng)?;
        let fractions = OccupancyFractions::from_household(&household, &calendar);

        let mut set = ScheduleSet::new(calendar);
        self.fill_occupancy_channels(&mut set, &fractions, &interior, &holiday)?;

        let mut synthesizer = EventSynthesizer::new(self.tables, &household);
        let events = synthesizer.synthesize(&mut rng)?;
        let minutes_in_year = calendar.minutes_in_year();
        for channel in EventChannel::WATER {
            let offset = rng.offset(PHASE_OFFSET_MINUTES);
            let mut minutes = events.render(channel, minutes_in_year);
            phase_shift(&mut minutes, offset);
            let mut values = block_sum(&minutes, calendar.minutes_per_step);
            scale(&mut values, settings.peak_flow_rate);
            debug!(%channel, offset, "water channel resampled");
            set.insert(channel.into(), values)?;
        }
        for channel in EventChannel::POWER {
            let minutes = events.render(channel, minutes_in_year);
            let mut values = block_sum(&minutes, calendar.minutes_per_step);
            scale(&mut values, settings.peak_power);
            set.insert(channel.into(), values)?;
        }
        let dryer = set.column(ScheduleColumn::ClothesDryer)?.to_vec();
        set.insert(ScheduleColumn::ClothesDryerExhaust, dryer)?;

        set.insert(ScheduleColumn::Occupants, fractions.occupants())?;
        set.insert(ScheduleColumn::Sleep, fractions.sleep.clone())?;

        match &settings.vacancy {
            Some(window) => info!(%window, "vacancy period set"),
            None => info!("no vacancy period set"),
        }
        set.insert(
            ScheduleColumn::Vacancy,
            vacancy_mask(&calendar, settings.vacancy.as_ref())?,
        )?;

        for (column, _) in set.columns() {
            debug!(%column, full_load_hours = set.full_load_hours(column)?, "channel complete");
        }
        Ok(set)
    }

    /// Plug loads, lighting and ceiling fan at the output timestep
    fn fill_occupancy_channels(
        &self,
        set: &mut ScheduleSet,
        fractions: &OccupancyFractions,
        interior: &[f64],
        holiday: &[f64],
    ) -> Result<()> {
        let config = self.tables.config();
        let calendar = &self.calendar;
        let steps = calendar.total_steps();

        let mut plug_loads = Vec::with_capacity(steps);
        let mut lighting_interior = Vec::with_capacity(steps);
        let mut lighting_exterior = Vec::with_capacity(steps);
        let mut lighting_holiday = Vec::with_capacity(steps);
        let mut ceiling_fan = Vec::with_capacity(steps);

        for day in 0..calendar.total_days {
            let month = calendar.month_index(day);
            let is_weekday = calendar.day_type(day) == DayType::Weekday;
            for step_of_day in 0..calendar.steps_per_day {
                let step = day * calendar.steps_per_day + step_of_day;
                let minute_of_day = step_of_day * calendar.minutes_per_step;
                let minute = day * MINUTES_PER_DAY + minute_of_day;
                let active = fractions.active(step);

                plug_loads.push(daily_schedule_value(
                    &config.plugload,
                    month,
                    is_weekday,
                    minute_of_day,
                    active,
                ));
                lighting_interior.push(scale_by_occupancy(interior, minute, active));
                lighting_exterior.push(daily_schedule_value(
                    &config.lighting.daily,
                    month,
                    is_weekday,
                    minute_of_day,
                    1.0,
                ));
                lighting_holiday.push(scale_by_occupancy(holiday, minute, 1.0));
                ceiling_fan.push(daily_schedule_value(
                    &config.ceiling_fan,
                    month,
                    is_weekday,
                    minute_of_day,
                    active,
                ));
            }
        }

        let lighting_exterior = normalize_max(lighting_exterior);
        set.insert(ScheduleColumn::PlugLoads, normalize_max(plug_loads))?;
        set.insert(ScheduleColumn::LightingInterior, normalize_max(lighting_interior))?;
        set.insert(ScheduleColumn::LightingGarage, lighting_exterior.clone())?;
        set.insert(ScheduleColumn::LightingExterior, lighting_exterior)?;
        set.insert(ScheduleColumn::LightingExteriorHoliday, normalize_max(lighting_holiday))?;
        set.insert(ScheduleColumn::CeilingFan, normalize_max(ceiling_fan))?;
        Ok(())
    }
}
