use anyhow::{Context, Result};
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::path::PathBuf;

use crate::calendar::VacancyWindow;
use crate::simulation::generator::{DEFAULT_PEAK_FLOW_RATE, DEFAULT_PEAK_POWER};
use crate::simulation::{GeneratorSettings, Location, MonthlyLightingMultiplier};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub calendar: CalendarConfig,
    pub household: HouseholdConfig,
    pub location: LocationConfig,
    #[serde(default)]
    pub lighting: LightingConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub normalization: NormalizationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig { pub year: i32, pub minutes_per_step: usize }

#[derive(Debug, Clone, Deserialize)]
pub struct HouseholdConfig {
    pub building_id: u64,
    pub occupant_count: usize,
    /// `"Dec 1 - Jan 31"`, or `"NA"` / absent for none
    #[serde(default)]
    pub vacancy_period: Option<String>,
}

impl HouseholdConfig {
    pub fn vacancy(&self) -> Result<Option<VacancyWindow>> {
        match self.vacancy_period.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) if text.eq_ignore_ascii_case("na") => Ok(None),
            Some(text) => Ok(Some(
                text.parse::<VacancyWindow>().with_context(|| format!("vacancy_period '{text}'"))?,
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub timezone_offset: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LightingConfig {
    /// Twelve monthly multipliers; calculated from daylight when absent
    #[serde(default)]
    pub monthly_multipliers: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig { pub tables_dir: PathBuf, pub output_csv: PathBuf }

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizationConfig { pub peak_flow_rate: f64, pub peak_power: f64 }

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self { peak_flow_rate: DEFAULT_PEAK_FLOW_RATE, peak_power: DEFAULT_PEAK_POWER }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("SCHEDULES__").split("__"));
        Ok(figment.extract()?)
    }

    pub fn generator_settings(&self) -> Result<GeneratorSettings> {
        let lighting = match &self.lighting.monthly_multipliers {
            Some(values) if values.len() == 12 => {
                MonthlyLightingMultiplier::UserSpecified(values.clone())
            }
            Some(values) => anyhow::bail!(
                "lighting.monthly_multipliers needs 12 values, got {}",
                values.len()
            ),
            None => MonthlyLightingMultiplier::Calculated,
        };
        Ok(GeneratorSettings {
            year: self.calendar.year,
            minutes_per_step: self.calendar.minutes_per_step,
            building_id: self.household.building_id,
            occupant_count: self.household.occupant_count,
            vacancy: self.household.vacancy()?,
            location: Location {
                latitude_deg: self.location.latitude_deg,
                longitude_deg: self.location.longitude_deg,
                timezone_offset: self.location.timezone_offset,
            },
            lighting,
            peak_flow_rate: self.normalization.peak_flow_rate,
            peak_power: self.normalization.peak_power,
        })
    }
}
