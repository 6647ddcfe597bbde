use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::state::Mode;
use crate::error::ValidationError;

/// Shortest accepted session length: one second, in minutes.
pub const MIN_PRESET_MINUTES: f64 = 1.0 / 60.0;

/// The four built-in presets. Only [`PresetId::Custom`] is user-editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresetId {
    #[default]
    Pomodoro,
    FiftyTen,
    NinetyTwenty,
    Custom,
}

impl PresetId {
    pub const ALL: [PresetId; 4] = [
        PresetId::Pomodoro,
        PresetId::FiftyTen,
        PresetId::NinetyTwenty,
        PresetId::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetId::Pomodoro => "pomodoro",
            PresetId::FiftyTen => "fifty-ten",
            PresetId::NinetyTwenty => "ninety-twenty",
            PresetId::Custom => "custom",
        }
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetId {
    type Err = ValidationError;

    /// Accepts the canonical ids plus the camelCase keys and the
    /// `custom-preset` element id older popups send.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pomodoro" => Ok(PresetId::Pomodoro),
            "fifty-ten" | "fiftyTen" => Ok(PresetId::FiftyTen),
            "ninety-twenty" | "ninetyTwenty" => Ok(PresetId::NinetyTwenty),
            "custom" | "custom-preset" => Ok(PresetId::Custom),
            other => Err(ValidationError::UnknownPreset(other.to_string())),
        }
    }
}

impl Serialize for PresetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PresetId {
    /// Stored records predate validation; anything unrecognized falls back
    /// to the pomodoro preset rather than poisoning the whole record.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}

/// A focus/break duration pair, in fractional minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub focus_minutes: f64,
    pub break_minutes: f64,
}

impl Preset {
    pub const fn new(focus_minutes: f64, break_minutes: f64) -> Self {
        Self {
            focus_minutes,
            break_minutes,
        }
    }

    /// Validated constructor used for user-entered durations.
    pub fn custom(focus_minutes: f64, break_minutes: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            focus_minutes: validate_minutes("focus", focus_minutes)?,
            break_minutes: validate_minutes("break", break_minutes)?,
        })
    }

    pub fn minutes(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Focus => self.focus_minutes,
            Mode::Break => self.break_minutes,
        }
    }

    /// Session length in whole seconds. This is the only place fractional
    /// minutes are rounded.
    pub fn duration_secs(&self, mode: Mode) -> u64 {
        (self.minutes(mode) * 60.0).round().max(0.0) as u64
    }
}

/// Combine a minutes/seconds pair into fractional minutes.
pub fn minutes_from_parts(minutes: u32, seconds: u32) -> f64 {
    f64::from(minutes) + f64::from(seconds) / 60.0
}

/// Split fractional minutes back into whole minutes and rounded seconds.
pub fn split_minutes(minutes: f64) -> (u32, u32) {
    let minutes = minutes.max(0.0);
    let whole = minutes.floor();
    let seconds = ((minutes - whole) * 60.0).round() as u32;
    if seconds >= 60 {
        (whole as u32 + 1, seconds - 60)
    } else {
        (whole as u32, seconds)
    }
}

fn validate_minutes(field: &'static str, minutes: f64) -> Result<f64, ValidationError> {
    // Allow a hair of slack so a 1-second entry (1/60 printed as 0.0167)
    // survives a float round trip.
    if !minutes.is_finite() || minutes < MIN_PRESET_MINUTES - 1e-9 {
        return Err(ValidationError::InvalidValue {
            field,
            message: format!("must be at least one second, got {minutes} minutes"),
        });
    }
    Ok(minutes)
}

/// Durations for every preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default = "default_pomodoro")]
    pub pomodoro: Preset,
    #[serde(default = "default_fifty_ten")]
    pub fifty_ten: Preset,
    #[serde(default = "default_ninety_twenty")]
    pub ninety_twenty: Preset,
    #[serde(default = "default_pomodoro")]
    pub custom: Preset,
}

fn default_pomodoro() -> Preset {
    Preset::new(25.0, 5.0)
}
fn default_fifty_ten() -> Preset {
    Preset::new(50.0, 10.0)
}
fn default_ninety_twenty() -> Preset {
    Preset::new(90.0, 20.0)
}

impl SessionConfig {
    pub fn get(&self, id: PresetId) -> &Preset {
        match id {
            PresetId::Pomodoro => &self.pomodoro,
            PresetId::FiftyTen => &self.fifty_ten,
            PresetId::NinetyTwenty => &self.ninety_twenty,
            PresetId::Custom => &self.custom,
        }
    }

    pub fn set_custom(&mut self, preset: Preset) {
        self.custom = preset;
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pomodoro: default_pomodoro(),
            fifty_ten: default_fifty_ten(),
            ninety_twenty: default_ninety_twenty(),
            custom: default_pomodoro(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_presets() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.get(PresetId::Pomodoro).duration_secs(Mode::Focus), 1500);
        assert_eq!(cfg.get(PresetId::FiftyTen).duration_secs(Mode::Break), 600);
        assert_eq!(cfg.get(PresetId::NinetyTwenty).duration_secs(Mode::Focus), 5400);
        assert_eq!(cfg.get(PresetId::Custom), cfg.get(PresetId::Pomodoro));
    }

    #[test]
    fn preset_ids_accept_aliases() {
        assert_eq!("custom-preset".parse::<PresetId>(), Ok(PresetId::Custom));
        assert_eq!("fiftyTen".parse::<PresetId>(), Ok(PresetId::FiftyTen));
        assert_eq!(
            "hourly".parse::<PresetId>(),
            Err(ValidationError::UnknownPreset("hourly".into()))
        );
    }

    #[test]
    fn unknown_stored_preset_falls_back_to_pomodoro() {
        let id: PresetId = serde_json::from_str("\"legacy\"").unwrap();
        assert_eq!(id, PresetId::Pomodoro);
    }

    #[test]
    fn custom_duration_round_trip() {
        let focus = minutes_from_parts(1, 30);
        assert_eq!(focus, 1.5);
        assert_eq!(split_minutes(focus), (1, 30));

        let preset = Preset::custom(focus, 5.0).unwrap();
        let json = serde_json::to_string(&preset).unwrap();
        let back: Preset = serde_json::from_str(&json).unwrap();
        assert_eq!(back.focus_minutes, 1.5);
        assert_eq!(back.duration_secs(Mode::Focus), 90);
    }

    #[test]
    fn split_carries_rounded_seconds() {
        assert_eq!(split_minutes(2.0 - 1e-6), (2, 0));
        assert_eq!(split_minutes(MIN_PRESET_MINUTES), (0, 1));
    }

    #[test]
    fn custom_rejects_sub_second_and_nan() {
        assert!(Preset::custom(0.0, 5.0).is_err());
        assert!(Preset::custom(25.0, f64::NAN).is_err());
        assert!(Preset::custom(MIN_PRESET_MINUTES, MIN_PRESET_MINUTES).is_ok());
    }

    #[test]
    fn fractional_minutes_round_to_nearest_second() {
        let preset = Preset::new(0.0167, 0.5);
        assert_eq!(preset.duration_secs(Mode::Focus), 1);
        assert_eq!(preset.duration_secs(Mode::Break), 30);
    }
}
