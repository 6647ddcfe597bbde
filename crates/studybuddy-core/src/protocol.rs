//! UI -> background command messages and their acknowledgments.
//!
//! Commands are JSON objects tagged by `action`. Argument fields are
//! optional at the wire level so a missing argument becomes a failure
//! acknowledgment with a reason rather than a decode error.

use serde::{Deserialize, Serialize};

use crate::stats::Statistics;
use crate::timer::TimerState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    GetTimerState,
    StartTimer,
    PauseTimer,
    ResetTimer,
    SkipSession,
    SelectPreset {
        #[serde(default, rename = "presetId")]
        preset_id: Option<String>,
    },
    UpdateVolumeSettings {
        #[serde(default, rename = "soundVolume")]
        sound_volume: Option<f64>,
    },
    UpdateDailyGoal {
        #[serde(default, rename = "dailyGoal")]
        daily_goal: Option<u32>,
    },
    UpdateDarkMode {
        #[serde(default, rename = "darkMode")]
        dark_mode: Option<bool>,
    },
    UpdateCustomTimer {
        #[serde(default, rename = "focusMinutes", alias = "focus")]
        focus_minutes: Option<f64>,
        #[serde(default, rename = "breakMinutes", alias = "break")]
        break_minutes: Option<f64>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetTimerState => "getTimerState",
            Command::StartTimer => "startTimer",
            Command::PauseTimer => "pauseTimer",
            Command::ResetTimer => "resetTimer",
            Command::SkipSession => "skipSession",
            Command::SelectPreset { .. } => "selectPreset",
            Command::UpdateVolumeSettings { .. } => "updateVolumeSettings",
            Command::UpdateDailyGoal { .. } => "updateDailyGoal",
            Command::UpdateDarkMode { .. } => "updateDarkMode",
            Command::UpdateCustomTimer { .. } => "updateCustomTimer",
        }
    }
}

/// Reply to `getTimerState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateReply {
    pub timer_state: TimerState,
    pub stats: Statistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    State(StateReply),
    Ack(Ack),
}

impl Response {
    pub fn ok() -> Self {
        Response::Ack(Ack {
            success: true,
            error: None,
        })
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Response::Ack(Ack {
            success: false,
            error: Some(reason.into()),
        })
    }

    pub fn is_success(&self) -> bool {
        match self {
            Response::State(_) => true,
            Response::Ack(ack) => ack.success,
        }
    }
}
