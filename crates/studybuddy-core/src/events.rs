use serde::{Deserialize, Serialize};

use crate::stats::Statistics;
use crate::timer::TimerState;

/// Why a broadcast was sent. UI surfaces key sounds and redraws off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// Routine state refresh.
    TimerUpdate,
    /// The displayed whole minute changed.
    MinuteTick,
    /// Within the last few seconds of a session.
    FinalCountdown,
    /// A session finished; UIs play the alarm on this.
    TimerComplete,
    /// Statistics changed after a focus session.
    StatsUpdate,
}

/// Timer state as sent to UIs, carrying the volume so an open surface can
/// play cues without asking for preferences separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastTimerState {
    #[serde(flatten)]
    pub timer: TimerState,
    pub sound_volume: f64,
}

/// Background -> UI message. Delivery is best-effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broadcast {
    pub event_kind: EventKind,
    pub timer_state: BroadcastTimerState,
    pub stats: Statistics,
}

impl Broadcast {
    pub fn new(event_kind: EventKind, timer: &TimerState, sound_volume: f64, stats: &Statistics) -> Self {
        Self {
            event_kind,
            timer_state: BroadcastTimerState {
                timer: timer.clone(),
                sound_volume,
            },
            stats: stats.clone(),
        }
    }
}
