//! Daily counters and streak tracking.
//!
//! A streak counts consecutive local calendar days with at least one
//! completed focus session. Per-day counters are zeroed the first time a
//! new day is observed, either on load or on the next completion; the
//! streak itself only moves on the day's first completion.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub sessions_today: u64,
    #[serde(default)]
    pub total_focus_minutes: f64,
    #[serde(default)]
    pub all_time_sessions: u64,
    pub last_rollover_date: NaiveDate,
    #[serde(default)]
    pub focus_minutes_today: f64,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub last_active_date: Option<NaiveDate>,
}

/// What [`Statistics::record_focus_session`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRecorded {
    pub rolled_over: bool,
    pub current_streak: u32,
    pub sessions_today: u64,
}

impl Statistics {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            sessions_today: 0,
            total_focus_minutes: 0.0,
            all_time_sessions: 0,
            last_rollover_date: today,
            focus_minutes_today: 0.0,
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
        }
    }

    /// Count one completed focus session of `focus_minutes` on `today`.
    pub fn record_focus_session(&mut self, today: NaiveDate, focus_minutes: f64) -> SessionRecorded {
        let rolled_over = self.last_rollover_date != today;
        // A fresh install starts with today's rollover date but no active
        // day yet; its first completion starts the streak too.
        if rolled_over || self.last_active_date.is_none() {
            let yesterday = today.checked_sub_days(Days::new(1));
            if self.last_active_date.is_some() && self.last_active_date == yesterday {
                self.current_streak = self.current_streak.saturating_add(1);
            } else {
                self.current_streak = 1;
            }
            self.longest_streak = self.longest_streak.max(self.current_streak);
        }
        if rolled_over {
            self.reset_daily(today);
        }
        self.last_active_date = Some(today);

        self.sessions_today += 1;
        self.all_time_sessions += 1;
        self.total_focus_minutes += focus_minutes;
        self.focus_minutes_today += focus_minutes;

        SessionRecorded {
            rolled_over,
            current_streak: self.current_streak,
            sessions_today: self.sessions_today,
        }
    }

    /// Zero stale per-day counters when `today` is a new day.
    ///
    /// `last_rollover_date` is left alone so the day's first completion
    /// still runs the streak calculation. Returns whether anything changed.
    pub fn roll_over_if_new_day(&mut self, today: NaiveDate) -> bool {
        if self.last_rollover_date == today {
            return false;
        }
        let stale = self.sessions_today > 0 || self.focus_minutes_today > 0.0;
        self.sessions_today = 0;
        self.focus_minutes_today = 0.0;
        stale
    }

    /// Progress toward the daily goal, as a whole percentage capped at 100.
    pub fn goal_progress_percent(&self, daily_goal_minutes: u32) -> u8 {
        if daily_goal_minutes == 0 {
            return 100;
        }
        let pct = (self.focus_minutes_today / f64::from(daily_goal_minutes) * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }

    fn reset_daily(&mut self, today: NaiveDate) {
        self.sessions_today = 0;
        self.focus_minutes_today = 0.0;
        self.last_rollover_date = today;
    }
}
