//! Console host for the background service.
//!
//! Under `serve`, every platform effect is written to stdout as one JSON
//! line tagged by `type`, and the stdio client counts as the open UI.
//! One-shot commands have no UI attached; effects are only logged.

use std::io::Write;

use serde::Serialize;
use studybuddy_core::events::Broadcast;
use studybuddy_core::platform::{Badge, Cue, Delivery, Notification, Platform, SurfaceId};
use studybuddy_core::{PlatformError, Response};

/// One line of `serve` output.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outbound<'a> {
    Response(&'a Response),
    Broadcast(&'a Broadcast),
    Notification(&'a Notification),
    Badge { badge: Option<&'a Badge> },
    Focus { url: &'a str },
    Cue { cue: Cue, volume: f64 },
}

/// Write one JSON line to stdout.
pub fn emit(line: &Outbound<'_>) -> Result<(), PlatformError> {
    let json = serde_json::to_string(line).map_err(|e| PlatformError::Channel(e.to_string()))?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "{json}")
        .and_then(|()| out.flush())
        .map_err(|e| PlatformError::Channel(e.to_string()))
}

const STDIO_SURFACE: &str = "stdio";

#[derive(Debug, Clone, Default)]
pub struct ConsolePlatform {
    streaming: bool,
    launch_browser: bool,
}

impl ConsolePlatform {
    /// Platform for `serve`: effects stream to stdout.
    pub fn streaming(launch_browser: bool) -> Self {
        Self {
            streaming: true,
            launch_browser,
        }
    }

    /// Platform for one-shot commands: nobody is listening.
    pub fn detached(launch_browser: bool) -> Self {
        Self {
            streaming: false,
            launch_browser,
        }
    }
}

impl Platform for ConsolePlatform {
    fn broadcast(&mut self, message: &Broadcast) -> Result<Delivery, PlatformError> {
        if !self.streaming {
            return Ok(Delivery::NoListener);
        }
        emit(&Outbound::Broadcast(message))?;
        Ok(Delivery::Delivered)
    }

    fn notify(&mut self, notification: &Notification) -> Result<(), PlatformError> {
        tracing::info!(title = %notification.title, "{}", notification.message);
        if self.streaming {
            emit(&Outbound::Notification(notification))?;
        }
        Ok(())
    }

    fn set_badge(&mut self, badge: Option<&Badge>) -> Result<(), PlatformError> {
        tracing::debug!(text = badge.map(|b| b.text.as_str()), "badge");
        if self.streaming {
            emit(&Outbound::Badge { badge })?;
        }
        Ok(())
    }

    fn find_surface(&mut self) -> Option<SurfaceId> {
        self.streaming.then(|| SurfaceId(STDIO_SURFACE.to_string()))
    }

    fn focus_surface(&mut self, _surface: &SurfaceId, url: &str) -> Result<(), PlatformError> {
        emit(&Outbound::Focus { url })
    }

    fn open_surface(&mut self, url: &str, width: u32, height: u32) -> Result<(), PlatformError> {
        if !self.launch_browser {
            tracing::debug!(url, width, height, "browser launch disabled, not opening UI");
            return Ok(());
        }
        tracing::info!(url, "opening UI");
        open::that(url).map_err(|e| PlatformError::Surface(format!("{url}: {e}")))
    }

    fn play_cue(&mut self, cue: Cue, volume: f64) -> Result<(), PlatformError> {
        if self.streaming {
            emit(&Outbound::Cue { cue, volume })?;
        }
        Ok(())
    }
}
