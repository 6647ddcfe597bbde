pub mod config;
pub mod prefs;
pub mod serve;
pub mod stats;
pub mod timer;
