use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{ScheduleName, Scheduler};

/// A recorded schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Armed {
    Once { at_epoch_ms: u64 },
    Repeating { interval: Duration },
}

/// Scheduler that only records what is armed and never fires on its own.
///
/// Used where nothing outlives the current command (one-shot CLI runs rely
/// on startup reconciliation instead) and in tests, which fire wake-ups by
/// hand. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    armed: Arc<Mutex<HashMap<ScheduleName, Armed>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn armed(&self, name: ScheduleName) -> Option<Armed> {
        self.armed.lock().ok()?.get(&name).copied()
    }

    pub fn is_armed(&self, name: ScheduleName) -> bool {
        self.armed(name).is_some()
    }

    /// Deadline of the armed completion, if any.
    pub fn completion_deadline(&self) -> Option<u64> {
        match self.armed(ScheduleName::Completion)? {
            Armed::Once { at_epoch_ms } => Some(at_epoch_ms),
            Armed::Repeating { .. } => None,
        }
    }

    fn record(&self, name: ScheduleName, armed: Option<Armed>) {
        if let Ok(mut map) = self.armed.lock() {
            match armed {
                Some(a) => {
                    map.insert(name, a);
                }
                None => {
                    map.remove(&name);
                }
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn arm_once(&mut self, name: ScheduleName, at_epoch_ms: u64) {
        tracing::trace!(%name, at_epoch_ms, "arm once");
        self.record(name, Some(Armed::Once { at_epoch_ms }));
    }

    fn arm_repeating(&mut self, name: ScheduleName, interval: Duration) {
        tracing::trace!(%name, ?interval, "arm repeating");
        self.record(name, Some(Armed::Repeating { interval }));
    }

    fn cancel(&mut self, name: ScheduleName) {
        self.record(name, None);
    }
}
