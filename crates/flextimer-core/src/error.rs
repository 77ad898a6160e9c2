//! Core error types for flextimer-core.
//!
//! Agenda rule violations are recoverable and meant to be shown to the
//! user; storage failures are surfaced to the caller as-is.

use thiserror::Error;

/// Core error type for flextimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Agenda rule violations (duplicate title, busy item, ...)
    #[error(transparent)]
    Agenda(#[from] AgendaError),

    /// Settings-related errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected agenda or timer commands. The agenda is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgendaError {
    /// An item with the same title already exists in the active list
    #[error("An agenda item titled '{title}' already exists")]
    DuplicateTitle { title: String },

    /// The item is the one currently being timed
    #[error("Agenda item {index} is running and cannot be changed")]
    ItemBusy { index: usize },

    /// Archive requested while some items are not done yet
    #[error("Cannot archive: {pending} agenda item(s) are not done")]
    IncompleteAgenda { pending: usize },

    /// Done items keep their position in the list
    #[error("Agenda item {index} is done and cannot be moved past")]
    AnchoredItem { index: usize },

    /// Destructive command issued without confirmation
    #[error("{action} requires confirmation")]
    ConfirmationRequired { action: &'static str },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidInput { field: String, message: String },
}

impl AgendaError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        AgendaError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Settings-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Unknown setting name
    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    /// Value could not be parsed or is out of range
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: std::path::PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
