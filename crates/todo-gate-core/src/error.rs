/*
[INPUT]:  Error sources (storage IO, JSON, auth transitions, configuration)
[OUTPUT]: Structured error types for the core crate
[POS]:    Error handling layer - unified error types for the core crate
[UPDATE]: When adding new error sources or improving error messages
*/

use thiserror::Error;

use crate::auth::{ScanAction, ScanStatus};

/// Errors raised by durable key/value storage backends
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem access failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored value is present but not usable
    #[error("Data corruption: {0}")]
    Corrupt(String),

    /// Key cannot be mapped onto the backend
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Backend refused the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Check if the error came from malformed stored data rather than the backend
    pub fn is_corruption(&self) -> bool {
        matches!(self, StorageError::Corrupt(_) | StorageError::Json(_))
    }
}

/// Errors occurring during scan stage transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid transition: {from:?} -> {action:?}")]
    InvalidTransition {
        from: ScanStatus,
        action: ScanAction,
    },
}

/// Errors raised while loading or rendering configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Configuration serialization error: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
