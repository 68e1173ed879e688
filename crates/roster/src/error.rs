//! Error types for roster.
//!
//! Store and configuration failures live in [`Error`]; form validation
//! failures are kept separate in [`ValidationError`] since they never reach
//! the store.

use std::path::PathBuf;
use thiserror::Error;

use crate::form::Field;

/// The main error type for roster operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The backing store could not be reached.
    #[error("record store unavailable: {message}")]
    StoreUnavailable {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system or terminal operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for roster operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a store unavailable error.
    #[must_use]
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Check if this error means the record store could not service a call.
    ///
    /// Every storage-level failure counts: the user can only retry.
    #[must_use]
    pub fn is_store_unavailable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. }
                | Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::DirectoryCreate { .. }
        )
    }
}

/// Reasons the form refuses to build a student record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A field was empty after trimming.
    #[error("{0} is required")]
    MissingField(Field),

    /// The age field did not parse as an integer.
    #[error("age must be a whole number, got '{0}'")]
    InvalidAge(String),
}
