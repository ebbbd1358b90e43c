//! # Occupant Schedule Simulation Module
//!
//! Turns probability tables into a year of per-building schedules.
//!
//! ## Components
//!
//! - **Occupant**: Markov activity chains with sampled state durations, one per occupant
//! - **Events**: Water-draw clusters and appliance power cycles placed on a minute timeline
//! - **Lighting**: Sunrise/sunset driven interior curve and the holiday overlay
//! - **Aggregate**: Resampling, normalization and occupancy scaling helpers
//! - **Generator**: Master orchestrator that runs the pieces in a fixed order
//!
//! ## Usage
//!
//! ```rust,no_run
//! use occupant_schedules::simulation::{GeneratorSettings, ScheduleGenerator};
//! use occupant_schedules::tables::TableLoader;
//!
//! let tables = TableLoader::new("resources").load()?;
//! let settings = GeneratorSettings {
//!     occupant_count: 3,
//!     building_id: 42,
//!     ..Default::default()
//! };
//!
//! let schedules = ScheduleGenerator::new(&tables, settings)?.generate()?;
//! schedules.write_csv_file(std::path::Path::new("schedules.csv"))?;
//! # Ok::<(), occupant_schedules::error::ScheduleError>(())
//! ```

pub mod aggregate;
pub mod events;
pub mod generator;
pub mod lighting;
pub mod occupant;

pub use events::{EventChannel, EventLog, EventSynthesizer, SynthesizedEvent};
pub use generator::{GeneratorSettings, Location, ScheduleGenerator};
pub use lighting::{LightingCurveCalculator, MonthlyLightingMultiplier};
pub use occupant::{Household, OccupantActivitySimulator, OccupantChain};
