//! Wake-up scheduling.
//!
//! The timer needs two named schedules: a one-shot `completion` at the
//! session deadline and a repeating `tick` while running. Arming a name
//! replaces whatever was armed under it before.
//!
//! Schedulers keep no memory across process restarts. The background
//! service reconciles the persisted deadline against the wall clock at
//! startup instead of trusting that every wake-up was delivered.

mod manual;
mod runtime;

pub use manual::{Armed, ManualScheduler};
pub use runtime::TokioScheduler;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleName {
    /// One-shot at the session deadline.
    Completion,
    /// Periodic countdown refresh.
    Tick,
}

impl fmt::Display for ScheduleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScheduleName::Completion => "completion",
            ScheduleName::Tick => "tick",
        })
    }
}

/// Delivered to the background service when a schedule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wakeup {
    pub schedule: ScheduleName,
}

pub trait Scheduler: Send {
    /// Fire once at an absolute wall-clock time (ms since epoch).
    fn arm_once(&mut self, name: ScheduleName, at_epoch_ms: u64);

    /// Fire immediately, then every `interval`.
    fn arm_repeating(&mut self, name: ScheduleName, interval: Duration);

    /// Cancel a schedule. Cancelling an unarmed name is a no-op.
    fn cancel(&mut self, name: ScheduleName);

    fn cancel_all(&mut self) {
        self.cancel(ScheduleName::Completion);
        self.cancel(ScheduleName::Tick);
    }
}
