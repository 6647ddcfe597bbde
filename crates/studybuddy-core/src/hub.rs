//! Sync/notification hub.
//!
//! Fans timer state out to UI surfaces and drives the completion side
//! effects. Nothing here can fail an operation: an absent UI is expected,
//! and platform errors are logged and dropped.

use serde::Serialize;

use crate::events::{Broadcast, EventKind};
use crate::platform::{Badge, Cue, Delivery, Notification, Platform};
use crate::stats::Statistics;
use crate::storage::UiConfig;
use crate::timer::{Mode, TimerState};

const FOCUS_DONE_COLOR: &str = "#D35400";
const BREAK_DONE_COLOR: &str = "#27AE60";

/// Unseen-completion flag behind the badge. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeState {
    pub timer_completed: bool,
    pub last_completed_mode: Option<Mode>,
}

pub struct Hub {
    platform: Box<dyn Platform>,
    ui: UiConfig,
    badge: BadgeState,
}

impl Hub {
    pub fn new(platform: Box<dyn Platform>, ui: UiConfig) -> Self {
        Self {
            platform,
            ui,
            badge: BadgeState::default(),
        }
    }

    pub fn badge_state(&self) -> BadgeState {
        self.badge
    }

    pub fn broadcast(&mut self, kind: EventKind, timer: &TimerState, sound_volume: f64, stats: &Statistics) {
        let message = Broadcast::new(kind, timer, sound_volume, stats);
        match self.platform.broadcast(&message) {
            Ok(Delivery::Delivered) => tracing::trace!(?kind, "broadcast delivered"),
            Ok(Delivery::NoListener) => tracing::trace!(?kind, "no UI listening"),
            Err(e) => tracing::warn!(?kind, error = %e, "broadcast failed"),
        }
    }

    /// OS notification naming the finished mode and the one coming next.
    pub fn notify_completion(&mut self, completed: Mode) {
        let next = completed.flipped();
        let notification = Notification {
            title: format!("{} Session Complete!", completed.title()),
            message: format!("Your {completed} session is complete. Starting {next} session."),
        };
        if let Err(e) = self.platform.notify(&notification) {
            tracing::warn!(error = %e, "completion notification failed");
        }
    }

    pub fn set_completion_badge(&mut self, completed: Mode) {
        self.badge = BadgeState {
            timer_completed: true,
            last_completed_mode: Some(completed),
        };
        let badge = match completed {
            Mode::Focus => Badge {
                text: "DONE".into(),
                color: FOCUS_DONE_COLOR.into(),
            },
            Mode::Break => Badge {
                text: "BREAK".into(),
                color: BREAK_DONE_COLOR.into(),
            },
        };
        if let Err(e) = self.platform.set_badge(Some(&badge)) {
            tracing::warn!(error = %e, "badge update failed");
        }
    }

    /// Clear the badge once a UI has seen the completion. Returns whether
    /// there was anything to clear.
    pub fn acknowledge_badge(&mut self) -> bool {
        if !self.badge.timer_completed {
            return false;
        }
        self.badge.timer_completed = false;
        if let Err(e) = self.platform.set_badge(None) {
            tracing::warn!(error = %e, "badge clear failed");
        }
        true
    }

    /// Make sure a UI surface is up and told to play the alarm. Audio needs
    /// a live UI context, so this runs even when nobody had the UI open.
    pub fn activate_ui(&mut self) {
        let url = self.ui.alarm_url();
        let result = match self.platform.find_surface() {
            Some(surface) => {
                tracing::debug!(surface = %surface.0, "focusing open UI surface");
                self.platform.focus_surface(&surface, &url)
            }
            None => {
                tracing::debug!("no UI surface open, creating one");
                self.platform
                    .open_surface(&url, self.ui.popup_width, self.ui.popup_height)
            }
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "UI activation failed");
        }
    }

    pub fn play_cue(&mut self, cue: Cue, volume: f64) {
        if volume <= 0.0 {
            return;
        }
        if let Err(e) = self.platform.play_cue(cue, volume) {
            tracing::warn!(?cue, error = %e, "cue playback failed");
        }
    }
}
