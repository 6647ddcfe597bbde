use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{ScheduleName, Scheduler, Wakeup};
use crate::clock::Clock;

/// Scheduler backed by tokio timers.
///
/// Each named schedule is one spawned task that sends [`Wakeup`]s over the
/// channel. Tokio timers run on a monotonic clock that may stall while the
/// host is suspended, so a late completion is expected; the tick path
/// re-derives remaining time from the wall-clock deadline and completes the
/// session itself when it finds the deadline passed.
pub struct TokioScheduler {
    handle: Handle,
    tx: UnboundedSender<Wakeup>,
    clock: Arc<dyn Clock>,
    tasks: HashMap<ScheduleName, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(handle: Handle, tx: UnboundedSender<Wakeup>, clock: Arc<dyn Clock>) -> Self {
        Self {
            handle,
            tx,
            clock,
            tasks: HashMap::new(),
        }
    }

    /// Scheduler on the current runtime. Panics outside a tokio runtime.
    pub fn on_current(tx: UnboundedSender<Wakeup>, clock: Arc<dyn Clock>) -> Self {
        Self::new(Handle::current(), tx, clock)
    }

    pub fn is_armed(&self, name: ScheduleName) -> bool {
        self.tasks.get(&name).is_some_and(|t| !t.is_finished())
    }

    fn replace(&mut self, name: ScheduleName, task: JoinHandle<()>) {
        if let Some(old) = self.tasks.insert(name, task) {
            old.abort();
        }
    }
}

impl Scheduler for TokioScheduler {
    fn arm_once(&mut self, name: ScheduleName, at_epoch_ms: u64) {
        let delay = Duration::from_millis(at_epoch_ms.saturating_sub(self.clock.now_ms()));
        let tx = self.tx.clone();
        tracing::debug!(%name, delay_ms = delay.as_millis() as u64, "arming one-shot schedule");
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the service is shutting down.
            let _ = tx.send(Wakeup { schedule: name });
        });
        self.replace(name, task);
    }

    fn arm_repeating(&mut self, name: ScheduleName, interval: Duration) {
        let tx = self.tx.clone();
        tracing::debug!(%name, interval_ms = interval.as_millis() as u64, "arming repeating schedule");
        let task = self.handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if tx.send(Wakeup { schedule: name }).is_err() {
                    break;
                }
            }
        });
        self.replace(name, task);
    }

    fn cancel(&mut self, name: ScheduleName) {
        if let Some(task) = self.tasks.remove(&name) {
            tracing::debug!(%name, "cancelled schedule");
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
