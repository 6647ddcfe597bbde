mod engine;
mod preset;
mod state;

pub use engine::{Restore, TickOutcome, TimerEngine, DEFAULT_FINAL_COUNTDOWN_SECS};
pub use preset::{
    minutes_from_parts, split_minutes, Preset, PresetId, SessionConfig, MIN_PRESET_MINUTES,
};
pub use state::{Mode, TimerState};
