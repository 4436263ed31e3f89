//! Core error types for timenest-core.
//!
//! This module defines the error hierarchy using thiserror. The engines
//! themselves never fail fatally: reminder and storage paths degrade to
//! "no data", and only explicit user operations surface these errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for timenest-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task store errors
    #[error("Task store error: {0}")]
    TaskStore(#[from] TaskStoreError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Notification / speech errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Credential storage errors
    #[error("Credential error: {0}")]
    Credential(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Task store errors.
#[derive(Error, Debug)]
pub enum TaskStoreError {
    /// No bearer credential is available
    #[error("Not authenticated with the task store")]
    NotAuthenticated,

    /// The server answered with a non-success status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The configured base URL is unusable
    #[error("Invalid task store URL: {0}")]
    InvalidUrl(String),

    /// Rejected before sending
    #[error("{0}")]
    InvalidRequest(String),
}

impl TaskStoreError {
    /// HTTP status of the failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            TaskStoreError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Notification and speech service errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The host has no notification / speech backend
    #[error("Service unsupported on this host")]
    Unsupported,

    /// The backend failed to deliver
    #[error("Backend failure: {0}")]
    Backend(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Tool id not present in the focus catalog
    #[error("Unknown focus tool: {0}")]
    UnknownTool(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<keyring::Error> for CoreError {
    fn from(err: keyring::Error) -> Self {
        CoreError::Credential(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
