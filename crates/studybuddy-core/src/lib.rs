//! # Study Buddy Core Library
//!
//! The background half of the Study Buddy focus timer. A single
//! [`Background`] service owns the timer and answers UI commands, while
//! storage, scheduling and the host platform sit behind traits so the same
//! core runs under the CLI, a long-lived `serve` process, or tests.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a wall-clock-based state machine. Remaining time is
//!   derived from an absolute deadline, so suspended processes and late
//!   ticks never drift
//! - **Storage**: two-scope key-value records in SQLite plus a TOML file
//!   for process configuration
//! - **Statistics**: daily counters, all-time totals and the day streak
//! - **Hub**: broadcasts, notifications, badge and UI activation
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core timer state machine
//! - [`Background`]: reconciliation, command dispatch and wake-ups
//! - [`Store`]: scoped persistence, backed by [`SqliteStore`]
//! - [`AppConfig`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod hub;
pub mod platform;
pub mod protocol;
pub mod scheduler;
pub mod service;
pub mod stats;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, PlatformError, StoreError, ValidationError};
pub use events::{Broadcast, EventKind};
pub use hub::{BadgeState, Hub};
pub use platform::{Platform, RecordingPlatform};
pub use protocol::{Command, Response, StateReply};
pub use scheduler::{ManualScheduler, ScheduleName, Scheduler, TokioScheduler, Wakeup};
pub use service::{Background, Host, Reconciliation};
pub use stats::Statistics;
pub use storage::{AppConfig, MemoryStore, Scope, Settings, SqliteStore, Store};
pub use timer::{Mode, PresetId, TimerEngine, TimerState};
