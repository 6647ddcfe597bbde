//! Host platform capabilities.
//!
//! Everything the background process does to the outside world goes
//! through [`Platform`]: messaging UI surfaces, OS notifications, the badge,
//! bringing a UI surface forward, and short audible cues. Implementations
//! report failures; the [`Hub`](crate::hub::Hub) decides they are never
//! fatal.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;
use crate::events::Broadcast;

/// Outcome of a broadcast. Having nobody listening is normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    NoListener,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub text: String,
    /// `#RRGGBB`
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    /// One-second tick during the final countdown.
    Tick,
}

/// Opaque handle to an open UI surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub String);

pub trait Platform: Send {
    fn broadcast(&mut self, message: &Broadcast) -> Result<Delivery, PlatformError>;

    fn notify(&mut self, notification: &Notification) -> Result<(), PlatformError>;

    /// `None` clears the badge.
    fn set_badge(&mut self, badge: Option<&Badge>) -> Result<(), PlatformError>;

    /// Any currently open UI surface of this app.
    fn find_surface(&mut self) -> Option<SurfaceId>;

    /// Bring `surface` to the foreground and navigate it to `url`.
    fn focus_surface(&mut self, surface: &SurfaceId, url: &str) -> Result<(), PlatformError>;

    /// Open a new fixed-size surface at `url`.
    fn open_surface(&mut self, url: &str, width: u32, height: u32) -> Result<(), PlatformError>;

    fn play_cue(&mut self, cue: Cue, volume: f64) -> Result<(), PlatformError>;
}

/// Everything a [`RecordingPlatform`] saw, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Broadcast(Broadcast),
    Notification(Notification),
    Badge(Option<Badge>),
    FocusedSurface { surface: SurfaceId, url: String },
    OpenedSurface { url: String, width: u32, height: u32 },
    Cue { cue: Cue, volume: f64 },
}

#[derive(Debug, Default)]
struct RecordingInner {
    log: Vec<Recorded>,
    listening: bool,
    surface: Option<SurfaceId>,
    fail_audio: bool,
    fail_channel: bool,
}

/// In-memory platform that records every interaction. Clones share state,
/// so a test keeps one handle and gives the other to the service.
#[derive(Debug, Clone, Default)]
pub struct RecordingPlatform {
    inner: Arc<Mutex<RecordingInner>>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a UI surface is open and listening.
    pub fn with_open_surface(self, id: &str) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.listening = true;
            inner.surface = Some(SurfaceId(id.to_string()));
        }
        self
    }

    /// Make every `play_cue` fail, as with no audio device.
    pub fn with_failing_audio(self) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_audio = true;
        }
        self
    }

    /// Make every `broadcast` fail, as with a broken UI channel.
    pub fn with_failing_channel(self) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_channel = true;
        }
        self
    }

    pub fn log(&self) -> Vec<Recorded> {
        self.inner.lock().map(|i| i.log.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.log.clear();
        }
    }

    pub fn broadcasts(&self) -> Vec<Broadcast> {
        self.log()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Broadcast(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.log()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Notification(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    /// Most recent badge update, if any.
    pub fn last_badge(&self) -> Option<Option<Badge>> {
        self.log().into_iter().rev().find_map(|r| match r {
            Recorded::Badge(b) => Some(b),
            _ => None,
        })
    }

    fn push(&self, entry: Recorded) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.log.push(entry);
        }
    }
}

impl Platform for RecordingPlatform {
    fn broadcast(&mut self, message: &Broadcast) -> Result<Delivery, PlatformError> {
        let (listening, fail) = self
            .inner
            .lock()
            .map(|i| (i.listening, i.fail_channel))
            .unwrap_or((false, false));
        if fail {
            return Err(PlatformError::Channel("port disconnected".into()));
        }
        self.push(Recorded::Broadcast(message.clone()));
        Ok(if listening {
            Delivery::Delivered
        } else {
            Delivery::NoListener
        })
    }

    fn notify(&mut self, notification: &Notification) -> Result<(), PlatformError> {
        self.push(Recorded::Notification(notification.clone()));
        Ok(())
    }

    fn set_badge(&mut self, badge: Option<&Badge>) -> Result<(), PlatformError> {
        self.push(Recorded::Badge(badge.cloned()));
        Ok(())
    }

    fn find_surface(&mut self) -> Option<SurfaceId> {
        self.inner.lock().ok()?.surface.clone()
    }

    fn focus_surface(&mut self, surface: &SurfaceId, url: &str) -> Result<(), PlatformError> {
        self.push(Recorded::FocusedSurface {
            surface: surface.clone(),
            url: url.to_string(),
        });
        Ok(())
    }

    fn open_surface(&mut self, url: &str, width: u32, height: u32) -> Result<(), PlatformError> {
        self.push(Recorded::OpenedSurface {
            url: url.to_string(),
            width,
            height,
        });
        if let Ok(mut inner) = self.inner.lock() {
            inner.listening = true;
            inner.surface = Some(SurfaceId("opened".to_string()));
        }
        Ok(())
    }

    fn play_cue(&mut self, cue: Cue, volume: f64) -> Result<(), PlatformError> {
        let fail = self.inner.lock().map(|i| i.fail_audio).unwrap_or(false);
        if fail {
            return Err(PlatformError::Audio("no output device".into()));
        }
        self.push(Recorded::Cue { cue, volume });
        Ok(())
    }
}
