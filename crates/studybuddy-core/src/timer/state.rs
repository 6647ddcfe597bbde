use std::fmt;

use serde::{Deserialize, Serialize};

use super::preset::PresetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Focus,
    Break,
}

impl Mode {
    pub fn flipped(self) -> Self {
        match self {
            Mode::Focus => Mode::Break,
            Mode::Break => Mode::Focus,
        }
    }

    /// Capitalized name used in notifications.
    pub fn title(self) -> &'static str {
        match self {
            Mode::Focus => "Focus",
            Mode::Break => "Break",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Focus => "focus",
            Mode::Break => "break",
        })
    }
}

/// The single authoritative timer record.
///
/// While `running`, the countdown is defined by `end_epoch_ms`;
/// `time_remaining_secs` is only a cached view refreshed on each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub running: bool,
    pub time_remaining_seconds: u64,
    pub mode: Mode,
    pub active_preset_id: PresetId,
    #[serde(default)]
    pub start_epoch_ms: Option<u64>,
    #[serde(default)]
    pub end_epoch_ms: Option<u64>,
}

impl TimerState {
    /// Whole seconds left at `now_ms`, never negative.
    pub fn remaining_at(&self, now_ms: u64) -> u64 {
        match (self.running, self.end_epoch_ms) {
            (true, Some(end)) => secs_until(end, now_ms),
            _ => self.time_remaining_seconds,
        }
    }

    pub fn has_deadline(&self) -> bool {
        self.start_epoch_ms.is_some() && self.end_epoch_ms.is_some()
    }

    pub(crate) fn clear_deadline(&mut self) {
        self.start_epoch_ms = None;
        self.end_epoch_ms = None;
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            running: false,
            time_remaining_seconds: 25 * 60,
            mode: Mode::Focus,
            active_preset_id: PresetId::Pomodoro,
            start_epoch_ms: None,
            end_epoch_ms: None,
        }
    }
}

/// `max(0, floor((end - now) / 1000))`.
pub(crate) fn secs_until(end_epoch_ms: u64, now_ms: u64) -> u64 {
    end_epoch_ms.saturating_sub(now_ms) / 1000
}
