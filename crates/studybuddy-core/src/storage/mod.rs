//! Persistent key-value storage with two scopes.
//!
//! - [`Scope::Local`]: device-only, fast, holds the live `timerState`.
//! - [`Scope::Synced`]: durable, account-replicated, holds the `settings`
//!   bundle (presets, statistics, preferences).
//!
//! Records are stored as JSON text. [`load_record`] and [`save_record`]
//! do the typed conversion on top of any [`Store`].

mod config;
pub mod database;
mod memory;
mod settings;

pub use config::{AppConfig, LogConfig, TimerConfig, UiConfig};
pub use database::SqliteStore;
pub use memory::MemoryStore;
pub use settings::{Preferences, Settings, DAILY_GOAL_RANGE};

use std::fmt;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, StoreError};

/// Local-scope key of the persisted timer record.
pub const TIMER_STATE_KEY: &str = "timerState";
/// Synced-scope key of the settings bundle.
pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Local,
    Synced,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scope::Local => "local",
            Scope::Synced => "synced",
        })
    }
}

/// Raw key-value access. Failures are fatal to the calling operation.
pub trait Store: Send {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, scope: Scope, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Read and decode a JSON record.
pub fn load_record<T: DeserializeOwned>(
    store: &dyn Store,
    scope: Scope,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(scope, key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                scope,
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode and write a JSON record.
pub fn save_record<T: Serialize>(
    store: &mut dyn Store,
    scope: Scope,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Corrupt {
        scope,
        key: key.to_string(),
        source,
    })?;
    store.set(scope, key, &raw)
}

/// Returns the data directory, creating it if needed.
///
/// `STUDYBUDDY_DATA_DIR` wins when set. Otherwise `~/.config/studybuddy`,
/// or `~/.config/studybuddy-dev` with `STUDYBUDDY_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("STUDYBUDDY_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYBUDDY_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studybuddy-dev")
            } else {
                base_dir.join("studybuddy")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
