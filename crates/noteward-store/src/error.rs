//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
///
/// Anticipated uniqueness conflicts (duplicate share, duplicate email,
/// token collision) are not errors; they come back as
/// [`InsertOutcome::Conflict`](crate::traits::InsertOutcome). Everything
/// here is an unrecovered persistence fault.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored value could not be decoded (e.g. unknown visibility string).
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl From<noteward_core::ParseVisibilityError> for StoreError {
    fn from(e: noteward_core::ParseVisibilityError) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

impl From<noteward_core::ParsePermissionError> for StoreError {
    fn from(e: noteward_core::ParsePermissionError) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

impl From<noteward_core::ParseTokenError> for StoreError {
    fn from(e: noteward_core::ParseTokenError) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}
