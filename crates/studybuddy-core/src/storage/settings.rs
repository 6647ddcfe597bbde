//! The synced settings bundle: presets, active preset, statistics and
//! user preferences, persisted together under one key.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::stats::Statistics;
use crate::timer::{PresetId, SessionConfig};

/// Accepted daily goal, in minutes.
pub const DAILY_GOAL_RANGE: RangeInclusive<u32> = 15..=480;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "default_volume")]
    pub sound_volume: f64,
    #[serde(default = "default_daily_goal")]
    pub daily_goal_minutes: u32,
    #[serde(default)]
    pub dark_mode: bool,
}

fn default_volume() -> f64 {
    1.0
}
fn default_daily_goal() -> u32 {
    120
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound_volume: default_volume(),
            daily_goal_minutes: default_daily_goal(),
            dark_mode: false,
        }
    }
}

impl Preferences {
    pub fn set_volume(&mut self, volume: f64) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(ValidationError::InvalidValue {
                field: "soundVolume",
                message: format!("must be between 0 and 1, got {volume}"),
            });
        }
        self.sound_volume = volume;
        Ok(())
    }

    pub fn set_daily_goal(&mut self, minutes: u32) -> Result<(), ValidationError> {
        if !DAILY_GOAL_RANGE.contains(&minutes) {
            return Err(ValidationError::InvalidValue {
                field: "dailyGoal",
                message: format!(
                    "must be between {} and {} minutes, got {minutes}",
                    DAILY_GOAL_RANGE.start(),
                    DAILY_GOAL_RANGE.end()
                ),
            });
        }
        self.daily_goal_minutes = minutes;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub session_config: SessionConfig,
    #[serde(default)]
    pub active_preset_id: PresetId,
    pub stats: Statistics,
    #[serde(default)]
    pub preferences: Preferences,
}

impl Settings {
    /// First-run defaults.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            session_config: SessionConfig::default(),
            active_preset_id: PresetId::default(),
            stats: Statistics::new(today),
            preferences: Preferences::default(),
        }
    }
}
