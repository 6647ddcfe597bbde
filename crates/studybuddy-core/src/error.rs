//! Core error types for studybuddy-core.
//!
//! Command argument problems are reported back to the UI as failure
//! acknowledgments; everything else surfaces as a [`CoreError`] and aborts
//! the operation that hit it.

use std::path::PathBuf;
use thiserror::Error;

use crate::storage::Scope;

/// Core error type for studybuddy-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistent store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid command arguments
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Persistent store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Read or write failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another process
    #[error("Store is locked")]
    Locked,

    /// A stored record could not be decoded
    #[error("Corrupt record '{key}' in {scope} scope: {source}")]
    Corrupt {
        scope: Scope,
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Invalid command arguments.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required argument was absent
    #[error("{0}")]
    Missing(&'static str),

    /// Preset id not recognized
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),

    /// Value outside its permitted range
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// Failures reported by the host platform. The hub logs these and never
/// propagates them.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("UI channel failed: {0}")]
    Channel(String),

    #[error("notification failed: {0}")]
    Notification(String),

    #[error("badge update failed: {0}")]
    Badge(String),

    #[error("UI surface failed: {0}")]
    Surface(String),

    #[error("audio playback failed: {0}")]
    Audio(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg)
                if code.code == rusqlite::ErrorCode::DatabaseBusy
                    || code.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StoreError::Locked
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_database_maps_to_locked() {
        let busy = rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(5), None);
        assert!(matches!(StoreError::from(busy), StoreError::Locked));
        let core: CoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(core, CoreError::Store(StoreError::QueryFailed(_))));
    }

    #[test]
    fn validation_keeps_its_reason() {
        let err: CoreError = ValidationError::Missing("No preset ID provided").into();
        assert_eq!(err.to_string(), "Validation error: No preset ID provided");
    }
}
