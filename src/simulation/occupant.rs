//! # Occupant Activity Simulation
//!
//! Runs one time-inhomogeneous Markov chain per occupant over the whole year
//! at 15-minute resolution.
//!
//! ## Chain Model
//!
//! - **Initial state**: drawn from the occupant type's weekday or weekend
//!   initial vector at the start of every day
//! - **Hold**: shower, laundry, cooking and dishwashing are held for a sampled
//!   number of steps; every other state lasts one step
//! - **Transition**: the next state vector is the one-hot row of the held
//!   state times the transition slice of the last held step
//!
//! Survey days start at 4am, so each finished chain is shifted 16 steps
//! later to put index 0 at midnight.

use std::iter;

use tracing::debug;

use crate::activity::{ActivityState, STATE_COUNT};
use crate::calendar::{Calendar, DayType, CHAIN_STEPS_PER_DAY, CHAIN_STEPS_PER_HOUR};
use crate::error::{Result, ScheduleError};
use crate::rng::ScheduleRng;
use crate::tables::{DurationKey, OccupantType, ProbabilityTableStore, TimeOfDay};

/// Chain steps between the survey's 4am day start and midnight
pub const SURVEY_DAY_OFFSET_STEPS: usize = 4 * CHAIN_STEPS_PER_HOUR;

/// Midnight-aligned activity sequence of one occupant
#[derive(Debug, Clone, PartialEq)]
pub struct OccupantChain {
    occupant_type: OccupantType,
    states: Vec<ActivityState>,
}

impl OccupantChain {
    pub fn new(occupant_type: OccupantType, states: Vec<ActivityState>) -> Self {
        Self {
            occupant_type,
            states,
        }
    }

    pub fn occupant_type(&self) -> OccupantType {
        self.occupant_type
    }

    pub fn states(&self) -> &[ActivityState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// One-hot indicator row of the state at `step`
    pub fn indicators(&self, step: usize) -> Option<[u8; STATE_COUNT]> {
        self.states.get(step).map(|state| {
            let mut row = [0; STATE_COUNT];
            row[state.index()] = 1;
            row
        })
    }
}

/// All occupant chains of one dwelling
#[derive(Debug, Clone, PartialEq)]
pub struct Household {
    chains: Vec<OccupantChain>,
    chain_steps: usize,
}

impl Household {
    pub fn new(chains: Vec<OccupantChain>, chain_steps: usize) -> Result<Self> {
        if let Some(chain) = chains.iter().find(|c| c.len() != chain_steps) {
            return Err(ScheduleError::config(format!(
                "occupant chain has {} steps, expected {chain_steps}",
                chain.len()
            )));
        }
        Ok(Self {
            chains,
            chain_steps,
        })
    }

    pub fn occupant_count(&self) -> usize {
        self.chains.len()
    }

    pub fn chains(&self) -> &[OccupantChain] {
        &self.chains
    }

    pub fn chain_steps(&self) -> usize {
        self.chain_steps
    }

    /// Occupants in `state` at `step`
    pub fn count(&self, state: ActivityState, step: usize) -> usize {
        self.chains
            .iter()
            .filter(|chain| chain.states.get(step) == Some(&state))
            .count()
    }

    /// Occupant count in `state` clipped to one
    pub fn clipped(&self, state: ActivityState, step: usize) -> usize {
        self.count(state, step).min(1)
    }

    /// Share of occupants in `state`; an empty dwelling counts as fully away
    pub fn fraction(&self, state: ActivityState, step: usize) -> f64 {
        if self.chains.is_empty() {
            return if state == ActivityState::Away { 1.0 } else { 0.0 };
        }
        self.count(state, step) as f64 / self.chains.len() as f64
    }

    pub fn any_awake_at_home(&self, step: usize) -> bool {
        self.chains
            .iter()
            .any(|chain| chain.states.get(step).is_some_and(|s| s.is_awake_at_home()))
    }
}

/// Generates occupant chains from the probability tables
pub struct OccupantActivitySimulator<'a> {
    tables: &'a ProbabilityTableStore,
    calendar: Calendar,
}

impl<'a> OccupantActivitySimulator<'a> {
    pub fn new(tables: &'a ProbabilityTableStore, calendar: Calendar) -> Self {
        Self { tables, calendar }
    }

    /// Simulate `occupant_count` occupants in order on the shared stream.
    ///
    /// Each occupant draws its type and then its whole year before the next
    /// occupant starts.
    pub fn simulate_household(
        &self,
        occupant_count: usize,
        rng: &mut ScheduleRng,
    ) -> Result<Household> {
        let mut chains = Vec::with_capacity(occupant_count);
        for occupant in 0..occupant_count {
            let occupant_type = self.draw_occupant_type(rng);
            debug!(occupant, %occupant_type, "simulating occupant");
            chains.push(self.simulate_occupant(occupant_type, rng)?);
        }
        Household::new(chains, self.calendar.chain_steps())
    }

    pub fn draw_occupant_type(&self, rng: &mut ScheduleRng) -> OccupantType {
        let index = rng.weighted_draw(&self.tables.config().occupancy_types_probability);
        OccupantType(index as u8)
    }

    pub fn simulate_occupant(
        &self,
        occupant_type: OccupantType,
        rng: &mut ScheduleRng,
    ) -> Result<OccupantChain> {
        let mut states = Vec::with_capacity(self.calendar.chain_steps());
        for day in 0..self.calendar.total_days {
            self.simulate_day(occupant_type, self.calendar.day_type(day), rng, &mut states)?;
        }
        let shift = SURVEY_DAY_OFFSET_STEPS.min(states.len());
        states.rotate_right(shift);
        Ok(OccupantChain::new(occupant_type, states))
    }

    fn simulate_day(
        &self,
        occupant_type: OccupantType,
        day_type: DayType,
        rng: &mut ScheduleRng,
        states: &mut Vec<ActivityState>,
    ) -> Result<()> {
        let transitions = self.tables.transitions(occupant_type, day_type)?;
        let mut probabilities = *self.tables.initial(occupant_type, day_type)?;
        let mut step = 0;

        while step < CHAIN_STEPS_PER_DAY {
            let index = rng.weighted_draw(&probabilities);
            let state = ActivityState::from_index(index)
                .ok_or_else(|| ScheduleError::range("activity state", index, STATE_COUNT))?;

            let hour = step / CHAIN_STEPS_PER_HOUR;
            let duration = self.sample_duration(occupant_type, state, day_type, hour, rng)?;
            let hold = duration.max(1).min(CHAIN_STEPS_PER_DAY - step);
            states.extend(iter::repeat(state).take(hold));
            step += hold;

            if step >= CHAIN_STEPS_PER_DAY {
                break;
            }
            probabilities = transitions.next_probabilities(state, step - 1)?;
        }
        Ok(())
    }

    /// Hold length in chain steps; `hour` is on the survey clock
    fn sample_duration(
        &self,
        occupant: OccupantType,
        activity: ActivityState,
        day_type: DayType,
        hour: usize,
        rng: &mut ScheduleRng,
    ) -> Result<usize> {
        if !activity.has_duration_table() {
            return Ok(1);
        }
        let key = DurationKey {
            occupant,
            activity,
            day_type,
            time_of_day: TimeOfDay::from_hour(hour),
        };
        self.tables.activity_duration(&key)?.sample(rng)
    }
}
