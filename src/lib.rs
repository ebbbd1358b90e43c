//! Stochastic residential occupant schedule generator.
//!
//! Simulates per-occupant activity chains, places water draws and appliance
//! cycles, derives lighting from sunrise/sunset and writes a year of
//! normalized schedule channels at 1 to 60 minute resolution.

pub mod activity;
pub mod calendar;
pub mod config;
pub mod error;
pub mod rng;
pub mod schedule;
pub mod simulation;
pub mod tables;
pub mod telemetry;
