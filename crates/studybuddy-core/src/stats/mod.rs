//! Session statistics: per-day counters, cumulative totals and streaks.

mod daily;

pub use daily::{SessionRecorded, Statistics};
