//! Scalar and small-vector parameters read from `schedule_config.yml`.

use serde::{Deserialize, Deserializer, Serialize};

use super::distribution::check_probabilities;
use crate::error::{Result, ScheduleError};

/// Accept either a YAML sequence or a comma-separated string of numbers
fn number_list<'de, D>(deserializer: D) -> std::result::Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<f64>),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::List(values) => Ok(values),
        Raw::Text(text) => text
            .split(',')
            .map(|part| part.trim().parse::<f64>().map_err(serde::de::Error::custom))
            .collect(),
    }
}

fn check_len(values: &[f64], expected: usize, what: &str) -> Result<()> {
    if values.len() != expected {
        return Err(ScheduleError::config(format!(
            "{what} needs {expected} values, found {}",
            values.len()
        )));
    }
    Ok(())
}

fn check_spread(mean: f64, std_dev: f64, what: &str) -> Result<()> {
    if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
        return Err(ScheduleError::config(format!(
            "{what}: invalid mean/std ({mean}, {std_dev})"
        )));
    }
    Ok(())
}

/// Hourly weekday/weekend shape with a monthly multiplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySchedule {
    #[serde(deserialize_with = "number_list")]
    pub weekday_sch: Vec<f64>,
    #[serde(deserialize_with = "number_list")]
    pub weekend_sch: Vec<f64>,
    #[serde(deserialize_with = "number_list")]
    pub monthly_multiplier: Vec<f64>,
}

impl DailySchedule {
    pub fn validate(&self, what: &str) -> Result<()> {
        check_len(&self.weekday_sch, 24, &format!("{what} weekday_sch"))?;
        check_len(&self.weekend_sch, 24, &format!("{what} weekend_sch"))?;
        check_len(&self.monthly_multiplier, 12, &format!("{what} monthly_multiplier"))
    }

    pub fn hourly(&self, is_weekday: bool) -> &[f64] {
        if is_weekday {
            &self.weekday_sch
        } else {
            &self.weekend_sch
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingSchedule {
    #[serde(flatten)]
    pub daily: DailySchedule,
    /// Daily exterior holiday lighting shape
    #[serde(deserialize_with = "number_list")]
    pub holiday_sch: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Probability of an event lasting `i + 1` minutes
    #[serde(deserialize_with = "number_list")]
    pub duration_probability: Vec<f64>,
    /// Probability of a cluster holding `i + 1` events
    #[serde(deserialize_with = "number_list")]
    pub events_per_cluster_probs: Vec<f64>,
    #[serde(deserialize_with = "number_list")]
    pub hourly_onset_prob: Vec<f64>,
    pub total_annual_cluster: usize,
    /// Minutes between events of one cluster
    pub between_event_gap: usize,
    pub flow_rate_mean: f64,
    pub flow_rate_std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowerConfig {
    pub between_event_gap: usize,
    pub flow_rate_mean: f64,
    pub flow_rate_std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BathConfig {
    pub bath_to_shower_ratio: f64,
    pub duration_mean: f64,
    pub duration_std: f64,
    pub flow_rate_mean: f64,
    pub flow_rate_std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishwasherConfig {
    pub flow_rate_mean: f64,
    pub flow_rate_std: f64,
    pub between_event_gap: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothesWasherConfig {
    pub flow_rate_mean: f64,
    pub flow_rate_std: f64,
    pub between_event_gap: usize,
    /// Probability of `i + 1` loads per laundry session
    #[serde(deserialize_with = "number_list")]
    pub load_size_probability: Vec<f64>,
}

/// Contents of `schedule_config.yml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(deserialize_with = "number_list")]
    pub occupancy_types_probability: Vec<f64>,
    pub plugload: DailySchedule,
    pub lighting: LightingSchedule,
    pub ceiling_fan: DailySchedule,
    pub sink: SinkConfig,
    pub shower: ShowerConfig,
    pub bath: BathConfig,
    pub dishwasher: DishwasherConfig,
    pub clothes_washer: ClothesWasherConfig,
}

impl ScheduleConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: ScheduleConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn occupant_type_count(&self) -> usize {
        self.occupancy_types_probability.len()
    }

    pub fn validate(&self) -> Result<()> {
        check_probabilities(&self.occupancy_types_probability, "occupancy_types_probability")?;
        if self.occupant_type_count() > u8::MAX as usize {
            return Err(ScheduleError::config("too many occupant types"));
        }

        self.plugload.validate("plugload")?;
        self.lighting.daily.validate("lighting")?;
        check_len(&self.lighting.holiday_sch, 24, "lighting holiday_sch")?;
        self.ceiling_fan.validate("ceiling_fan")?;

        let sink = &self.sink;
        check_probabilities(&sink.duration_probability, "sink duration_probability")?;
        check_probabilities(&sink.events_per_cluster_probs, "sink events_per_cluster_probs")?;
        check_len(&sink.hourly_onset_prob, 24, "sink hourly_onset_prob")?;
        check_probabilities(&sink.hourly_onset_prob, "sink hourly_onset_prob")?;
        check_spread(sink.flow_rate_mean, sink.flow_rate_std, "sink flow rate")?;

        check_spread(self.shower.flow_rate_mean, self.shower.flow_rate_std, "shower flow rate")?;

        let bath = &self.bath;
        if !(0.0..=1.0).contains(&bath.bath_to_shower_ratio) {
            return Err(ScheduleError::config(format!(
                "bath_to_shower_ratio {} outside [0, 1]",
                bath.bath_to_shower_ratio
            )));
        }
        check_spread(bath.duration_mean, bath.duration_std, "bath duration")?;
        check_spread(bath.flow_rate_mean, bath.flow_rate_std, "bath flow rate")?;

        check_spread(
            self.dishwasher.flow_rate_mean,
            self.dishwasher.flow_rate_std,
            "dishwasher flow rate",
        )?;
        check_spread(
            self.clothes_washer.flow_rate_mean,
            self.clothes_washer.flow_rate_std,
            "clothes washer flow rate",
        )?;
        check_probabilities(
            &self.clothes_washer.load_size_probability,
            "clothes_washer load_size_probability",
        )
    }
}
