//! Timer engine implementation.
//!
//! The engine is a wall-clock-based state machine over [`TimerState`]. It
//! owns no threads and reads no clock: every transition takes `now_ms`, and
//! the caller (the background service) turns the returned outcomes into
//! scheduling, persistence and broadcasts.
//!
//! ## State Transitions
//!
//! ```text
//! Paused --start--> Running --pause/complete--> Paused
//!   ^                                              |
//!   +---------------- reset / skip ----------------+
//! ```
//!
//! Remaining time while running is always derived from `end_epoch_ms`,
//! never decremented, so suspended or throttled ticks cannot drift.

use super::preset::{PresetId, SessionConfig};
use super::state::{secs_until, Mode, TimerState};

/// Default length of the audible final countdown, in seconds.
pub const DEFAULT_FINAL_COUNTDOWN_SECS: u64 = 5;

/// What a periodic tick observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub remaining_secs: u64,
    /// The displayed whole minute changed since the previous tick.
    pub minute_boundary: bool,
    /// `0 < remaining <= final_countdown_secs`.
    pub final_countdown: bool,
    /// The deadline has passed; the session must complete.
    pub expired: bool,
}

/// Result of reconciling a restored record against the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restore {
    /// Nothing was running.
    Idle,
    /// Still before the deadline; schedules must be re-armed.
    Resume { end_epoch_ms: u64 },
    /// The deadline passed while the process was gone.
    Expired,
    /// `running` was set without a deadline; normalized to paused.
    Repaired,
}

#[derive(Debug, Clone)]
pub struct TimerEngine {
    state: TimerState,
    final_countdown_secs: u64,
}

impl TimerEngine {
    pub fn new(state: TimerState) -> Self {
        Self {
            state,
            final_countdown_secs: DEFAULT_FINAL_COUNTDOWN_SECS,
        }
    }

    pub fn with_final_countdown(mut self, secs: u64) -> Self {
        self.final_countdown_secs = secs;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn active_preset(&self) -> PresetId {
        self.state.active_preset_id
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns the deadline to arm, or `None` if already running.
    pub fn start(&mut self, now_ms: u64) -> Option<u64> {
        if self.state.running {
            return None;
        }
        self.state.running = true;
        if self.state.end_epoch_ms.is_none() {
            self.state.start_epoch_ms = Some(now_ms);
            self.state.end_epoch_ms =
                Some(now_ms.saturating_add(self.state.time_remaining_seconds.saturating_mul(1000)));
        }
        self.state.end_epoch_ms
    }

    /// Returns `false` if the timer was not running.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        if !self.state.running {
            return false;
        }
        self.state.running = false;
        if let Some(end) = self.state.end_epoch_ms {
            self.state.time_remaining_seconds = secs_until(end, now_ms);
        }
        self.state.clear_deadline();
        true
    }

    /// Pause, then reload the current mode's duration from the active preset.
    pub fn reset(&mut self, now_ms: u64, config: &SessionConfig) {
        self.pause(now_ms);
        self.state.time_remaining_seconds =
            config.get(self.state.active_preset_id).duration_secs(self.state.mode);
        self.state.clear_deadline();
    }

    pub fn flip_mode(&mut self) {
        self.state.mode = self.state.mode.flipped();
    }

    pub fn skip(&mut self, now_ms: u64, config: &SessionConfig) {
        self.pause(now_ms);
        self.flip_mode();
        self.reset(now_ms, config);
    }

    /// Recompute remaining time from the deadline. `None` when not running.
    pub fn tick(&mut self, now_ms: u64) -> Option<TickOutcome> {
        if !self.state.running {
            return None;
        }
        let end = self.state.end_epoch_ms?;
        let previous = self.state.time_remaining_seconds;
        let remaining = secs_until(end, now_ms);
        self.state.time_remaining_seconds = remaining;

        Some(TickOutcome {
            remaining_secs: remaining,
            minute_boundary: remaining > 0 && remaining.div_ceil(60) != previous.div_ceil(60),
            final_countdown: remaining > 0 && remaining <= self.final_countdown_secs,
            expired: remaining == 0,
        })
    }

    /// First half of completion: pause and report which mode just ended.
    ///
    /// Returns `None` when not running, which makes a second completion
    /// racing the first a no-op.
    pub fn begin_completion(&mut self, now_ms: u64) -> Option<Mode> {
        if !self.state.running {
            return None;
        }
        let completed = self.state.mode;
        self.pause(now_ms);
        Some(completed)
    }

    /// Second half of completion: switch to the other mode at full length.
    pub fn finish_completion(&mut self, now_ms: u64, config: &SessionConfig) {
        self.flip_mode();
        self.reset(now_ms, config);
    }

    pub fn select_preset(&mut self, preset: PresetId, now_ms: u64, config: &SessionConfig) {
        self.pause(now_ms);
        self.state.mode = Mode::Focus;
        self.state.active_preset_id = preset;
        self.state.time_remaining_seconds = config.get(preset).duration_secs(Mode::Focus);
        self.state.clear_deadline();
    }

    /// Reconcile a record loaded at process start.
    pub fn restore(&mut self, now_ms: u64) -> Restore {
        if !self.state.running {
            return Restore::Idle;
        }
        match self.state.end_epoch_ms {
            Some(end) if now_ms < end => {
                if self.state.start_epoch_ms.is_none() {
                    self.state.start_epoch_ms = Some(now_ms);
                }
                Restore::Resume { end_epoch_ms: end }
            }
            Some(_) => {
                self.state.time_remaining_seconds = 0;
                Restore::Expired
            }
            None => {
                self.state.running = false;
                self.state.clear_deadline();
                Restore::Repaired
            }
        }
    }
}
