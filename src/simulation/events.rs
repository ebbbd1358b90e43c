//! # End-Use Event Synthesis
//!
//! Turns 15-minute occupant activity into minute-resolution water draw and
//! appliance power events.
//!
//! Every walk appends [`SynthesizedEvent`] records to an [`EventLog`];
//! rendering a channel into a flat per-minute array is a separate pass.
//!
//! ## Random Stream Order
//!
//! 1. Sinks: flow rate, then per day and cluster the start slot, event count
//!    and event durations
//! 2. Showers and baths: bath flow, shower flow, then per showering occupant
//!    the bath/shower choice and its durations
//! 3. Dishwasher water, then clothes washer water
//! 4. Dishwasher power, laundry power (washer and dryer), cooking power

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tracing::debug;

use super::occupant::Household;
use crate::activity::ActivityState;
use crate::calendar::{
    CHAIN_STEPS_PER_DAY, CHAIN_STEPS_PER_HOUR, MINUTES_PER_CHAIN_STEP, MINUTES_PER_DAY,
};
use crate::error::Result;
use crate::rng::{normalize_weights, ScheduleRng};
use crate::tables::{Appliance, ProbabilityTableStore, WaterEndUse};

/// Minute-resolution channels filled by event synthesis
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
pub enum EventChannel {
    Sinks,
    Showers,
    Baths,
    Dishwasher,
    ClothesWasher,
    DishwasherPower,
    ClothesWasherPower,
    ClothesDryer,
    CookingRange,
}

impl EventChannel {
    /// Water channels in the order their phase offsets are drawn
    pub const WATER: [EventChannel; 5] = [
        EventChannel::Sinks,
        EventChannel::Dishwasher,
        EventChannel::ClothesWasher,
        EventChannel::Showers,
        EventChannel::Baths,
    ];

    pub const POWER: [EventChannel; 4] = [
        EventChannel::CookingRange,
        EventChannel::ClothesWasherPower,
        EventChannel::ClothesDryer,
        EventChannel::DishwasherPower,
    ];

    pub fn is_water(self) -> bool {
        Self::WATER.contains(&self)
    }
}

/// One water draw or appliance run. `value` is a flow rate (gal/min) or an
/// average power
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedEvent {
    pub channel: EventChannel,
    pub start_minute: usize,
    /// Minutes
    pub duration: usize,
    pub value: f64,
}

impl SynthesizedEvent {
    pub fn end_minute(&self) -> usize {
        self.start_minute + self.duration
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<SynthesizedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event; zero-length events are dropped
    pub fn push(&mut self, event: SynthesizedEvent) {
        if event.duration > 0 {
            self.events.push(event);
        }
    }

    pub fn events(&self) -> &[SynthesizedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn channel(&self, channel: EventChannel) -> impl Iterator<Item = &SynthesizedEvent> {
        self.events.iter().filter(move |e| e.channel == channel)
    }

    /// Sum the channel's events into a per-minute array, clipped at `minutes`
    pub fn render(&self, channel: EventChannel, minutes: usize) -> Vec<f64> {
        let mut values = vec![0.0; minutes];
        for event in self.channel(channel) {
            let end = event.end_minute().min(minutes);
            if event.start_minute >= end {
                continue;
            }
            for value in &mut values[event.start_minute..end] {
                *value += event.value;
            }
        }
        values
    }
}

#[derive(Debug, Clone, Copy)]
struct ApplianceRows {
    power: usize,
    duration: usize,
}

/// Fixes one power row per appliance on first use; durations are redrawn
/// on every run from the fixed duration row
#[derive(Debug, Default)]
struct ApplianceSampler {
    rows: HashMap<Appliance, ApplianceRows>,
}

impl ApplianceSampler {
    /// Run length in chain steps and average power
    fn sample(
        &mut self,
        tables: &ProbabilityTableStore,
        appliance: Appliance,
        rng: &mut ScheduleRng,
    ) -> Result<(usize, f64)> {
        let dist = tables.appliance(appliance)?;
        let rows = match self.rows.get(&appliance) {
            Some(rows) => *rows,
            None => {
                let power = rng.index(dist.power_rows())?;
                let duration = rng.index(dist.duration_rows())?;
                let rows = ApplianceRows { power, duration };
                debug!(
                    %appliance,
                    power_row = power,
                    duration_row = duration,
                    "appliance rows fixed"
                );
                self.rows.insert(appliance, rows);
                rows
            }
        };
        let steps = dist.sample_duration(rows.duration, rng)?;
        Ok((steps, dist.power(rows.power)?))
    }
}

/// Materializes end-use events for one household
pub struct EventSynthesizer<'a> {
    tables: &'a ProbabilityTableStore,
    household: &'a Household,
    total_days: usize,
    appliances: ApplianceSampler,
}

impl<'a> EventSynthesizer<'a> {
    pub fn new(tables: &'a ProbabilityTableStore, household: &'a Household) -> Self {
        Self {
            tables,
            household,
            total_days: household.chain_steps() / CHAIN_STEPS_PER_DAY,
            appliances: ApplianceSampler::default(),
        }
    }

    pub fn minutes_in_year(&self) -> usize {
        self.total_days * MINUTES_PER_DAY
    }

    fn chain_steps(&self) -> usize {
        self.household.chain_steps()
    }

    /// Run every walk in stream order
    pub fn synthesize(&mut self, rng: &mut ScheduleRng) -> Result<EventLog> {
        let mut log = EventLog::new();
        self.sinks(rng, &mut log)?;
        self.showers_and_baths(rng, &mut log)?;
        self.dishwasher_water(rng, &mut log)?;
        self.clothes_washer_water(rng, &mut log)?;
        self.single_appliance_power(
            ActivityState::Dishwashing,
            Appliance::Dishwasher,
            EventChannel::DishwasherPower,
            rng,
            &mut log,
        )?;
        self.laundry_power(rng, &mut log)?;
        self.single_appliance_power(
            ActivityState::Cooking,
            Appliance::Cooking,
            EventChannel::CookingRange,
            rng,
            &mut log,
        )?;
        debug!(events = log.len(), "synthesized end-use events");
        Ok(log)
    }

    /// Sink clusters placed on awake-at-home slots weighted by hourly onset
    pub fn sinks(&mut self, rng: &mut ScheduleRng, log: &mut EventLog) -> Result<()> {
        let sink = &self.tables.config().sink;
        let clusters_per_day = if self.total_days == 0 {
            0
        } else {
            sink.total_annual_cluster / self.total_days
        };
        let flow = rng.gaussian(sink.flow_rate_mean, sink.flow_rate_std, Some(0.1))?;

        let mut candidates: Vec<bool> = (0..self.chain_steps())
            .map(|step| self.household.any_awake_at_home(step))
            .collect();

        for day in 0..self.total_days {
            let base = day * CHAIN_STEPS_PER_DAY;
            for _ in 0..clusters_per_day {
                let today = &candidates[base..base + CHAIN_STEPS_PER_DAY];
                if !today.iter().any(|open| *open) {
                    break;
                }
                let weights: Vec<f64> = today
                    .iter()
                    .enumerate()
                    .map(|(slot, open)| {
                        if *open {
                            sink.hourly_onset_prob[slot / CHAIN_STEPS_PER_HOUR]
                        } else {
                            0.0
                        }
                    })
                    .collect();
                let weights = normalize_weights(&weights, "sink onset")?;

                let slot = rng.weighted_draw(&weights);
                candidates[base + slot] = false;
                let events = rng.weighted_draw(&sink.events_per_cluster_probs) + 1;

                let mut start = slot * MINUTES_PER_CHAIN_STEP;
                let end = start + MINUTES_PER_CHAIN_STEP;
                for _ in 0..events {
                    let drawn = rng.weighted_draw(&sink.duration_probability) + 1;
                    let duration = drawn.min(end - start);
                    log.push(SynthesizedEvent {
                        channel: EventChannel::Sinks,
                        start_minute: day * MINUTES_PER_DAY + start,
                        duration,
                        value: flow,
                    });
                    start += duration + sink.between_event_gap;
                    if start >= end {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Lay `count` events of `end_use` end to end from `start`, each followed
    /// by `gap` idle minutes. Returns minutes used including gaps
    #[allow(clippy::too_many_arguments)]
    fn place_cluster(
        &self,
        end_use: WaterEndUse,
        channel: EventChannel,
        flow: f64,
        start: usize,
        gap: usize,
        count: usize,
        rng: &mut ScheduleRng,
        log: &mut EventLog,
    ) -> Result<usize> {
        let durations = self.tables.event_duration(end_use)?;
        let mut used = 0;
        for _ in 0..count {
            let duration = durations.sample(rng)?;
            let whole = duration.ceil().max(0.0) as usize;
            // whole minutes carry the fractional remainder in the rate
            log.push(SynthesizedEvent {
                channel,
                start_minute: start + used,
                duration: whole,
                value: flow * duration / whole as f64,
            });
            used += whole + gap;
            if start + used >= self.minutes_in_year() {
                break;
            }
        }
        Ok(used)
    }

    pub fn showers_and_baths(&mut self, rng: &mut ScheduleRng, log: &mut EventLog) -> Result<()> {
        let config = self.tables.config();
        let bath = &config.bath;
        let shower = &config.shower;
        let bath_flow = rng.gaussian(bath.flow_rate_mean, bath.flow_rate_std, Some(0.1))?;
        let shower_flow = rng.gaussian(shower.flow_rate_mean, shower.flow_rate_std, Some(0.1))?;
        let cluster_sizes = self.tables.cluster_size(WaterEndUse::Shower)?;

        let mut step = 0;
        while step < self.chain_steps() {
            let showering = self.household.count(ActivityState::Showering, step);
            let start = step * MINUTES_PER_CHAIN_STEP;
            let mut jump = 1;
            for _ in 0..showering {
                let used = if rng.uniform() <= bath.bath_to_shower_ratio {
                    let duration = rng.gaussian(bath.duration_mean, bath.duration_std, Some(0.1))?;
                    let whole = duration.ceil() as usize;
                    log.push(SynthesizedEvent {
                        channel: EventChannel::Baths,
                        start_minute: start,
                        duration: whole,
                        value: bath_flow * duration / whole as f64,
                    });
                    whole
                } else {
                    let count = cluster_sizes.sample(rng)?;
                    self.place_cluster(
                        WaterEndUse::Shower,
                        EventChannel::Showers,
                        shower_flow,
                        start,
                        shower.between_event_gap,
                        count,
                        rng,
                        log,
                    )?
                };
                jump = jump.max(1 + used / MINUTES_PER_CHAIN_STEP);
            }
            step += jump;
        }
        Ok(())
    }

    pub fn dishwasher_water(&mut self, rng: &mut ScheduleRng, log: &mut EventLog) -> Result<()> {
        let dishwasher = &self.tables.config().dishwasher;
        let flow = rng.gaussian(dishwasher.flow_rate_mean, dishwasher.flow_rate_std, Some(0.0))?;
        let cluster_sizes = self.tables.cluster_size(WaterEndUse::Dishwasher)?;

        let mut step = 0;
        while step < self.chain_steps() {
            let mut jump = 1;
            if self.household.clipped(ActivityState::Dishwashing, step) > 0 {
                let count = cluster_sizes.sample(rng)?;
                let used = self.place_cluster(
                    WaterEndUse::Dishwasher,
                    EventChannel::Dishwasher,
                    flow,
                    step * MINUTES_PER_CHAIN_STEP,
                    dishwasher.between_event_gap,
                    count,
                    rng,
                    log,
                )?;
                jump = 1 + used / MINUTES_PER_CHAIN_STEP;
            }
            step += jump;
        }
        Ok(())
    }

    pub fn clothes_washer_water(
        &mut self,
        rng: &mut ScheduleRng,
        log: &mut EventLog,
    ) -> Result<()> {
        let washer = &self.tables.config().clothes_washer;
        let flow = rng.gaussian(washer.flow_rate_mean, washer.flow_rate_std, Some(0.0))?;
        let cluster_sizes = self.tables.cluster_size(WaterEndUse::ClothesWasher)?;

        let mut step = 0;
        while step < self.chain_steps() {
            let mut jump = 1;
            if self.household.clipped(ActivityState::Laundry, step) > 0 {
                let loads = rng.weighted_draw(&washer.load_size_probability) + 1;
                let start = step * MINUTES_PER_CHAIN_STEP;
                let mut used = 0;
                for _ in 0..loads {
                    let count = cluster_sizes.sample(rng)?;
                    used += self.place_cluster(
                        WaterEndUse::ClothesWasher,
                        EventChannel::ClothesWasher,
                        flow,
                        start + used,
                        washer.between_event_gap,
                        count,
                        rng,
                        log,
                    )?;
                    if start + used >= self.minutes_in_year() {
                        break;
                    }
                }
                jump = 1 + used / MINUTES_PER_CHAIN_STEP;
            }
            step += jump;
        }
        Ok(())
    }

    /// Start a run whenever `state` begins after a step without it
    pub fn single_appliance_power(
        &mut self,
        state: ActivityState,
        appliance: Appliance,
        channel: EventChannel,
        rng: &mut ScheduleRng,
        log: &mut EventLog,
    ) -> Result<()> {
        let mut step = 0;
        let mut last = 0;
        while step < self.chain_steps() {
            let active = self.household.clipped(state, step);
            let mut jump = 1;
            if active > 0 && last == 0 {
                let (steps, power) = self.appliances.sample(self.tables, appliance, rng)?;
                log.push(SynthesizedEvent {
                    channel,
                    start_minute: step * MINUTES_PER_CHAIN_STEP,
                    duration: steps * MINUTES_PER_CHAIN_STEP,
                    value: power,
                });
                jump = steps;
            }
            last = active;
            step += jump.max(1);
        }
        Ok(())
    }

    /// Washer runs followed immediately by a dryer run
    pub fn laundry_power(&mut self, rng: &mut ScheduleRng, log: &mut EventLog) -> Result<()> {
        let mut step = 0;
        let mut last = 0;
        while step < self.chain_steps() {
            let active = self.household.clipped(ActivityState::Laundry, step);
            let mut jump = 1;
            if active > 0 && last == 0 {
                let (washer_steps, washer_power) =
                    self.appliances
                        .sample(self.tables, Appliance::ClothesWasher, rng)?;
                let (dryer_steps, dryer_power) =
                    self.appliances
                        .sample(self.tables, Appliance::ClothesDryer, rng)?;

                let start = step * MINUTES_PER_CHAIN_STEP;
                let washer_minutes = washer_steps * MINUTES_PER_CHAIN_STEP;
                log.push(SynthesizedEvent {
                    channel: EventChannel::ClothesWasherPower,
                    start_minute: start,
                    duration: washer_minutes,
                    value: washer_power,
                });
                log.push(SynthesizedEvent {
                    channel: EventChannel::ClothesDryer,
                    start_minute: start + washer_minutes,
                    duration: dryer_steps * MINUTES_PER_CHAIN_STEP,
                    value: dryer_power,
                });
                jump = washer_steps + dryer_steps;
            }
            last = active;
            step += jump.max(1);
        }
        Ok(())
    }
}
