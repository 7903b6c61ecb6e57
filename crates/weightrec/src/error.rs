//! Error types for weightrec.
//!
//! This module defines all error types used throughout the weightrec crate.
//! Errors fall into three classes that callers treat differently:
//! configuration and connection errors are fatal, validation errors are
//! reported for the single failing operation, and everything else is a
//! store failure. "Not found" is never an error; delete and update report
//! a zero count instead.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for weightrec operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// A required configuration value is absent.
    #[error("missing required configuration value {key}")]
    ConfigMissing {
        /// Name of the missing key.
        key: &'static str,
    },

    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Connection Errors ===
    /// The store could not be reached or the connection string is unusable.
    #[error("failed to connect to {target}: {message}")]
    Connection {
        /// Connection target with credentials redacted.
        target: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Validation Errors ===
    /// An entry identifier is not a well-formed id.
    #[error("invalid entry id '{id}'")]
    InvalidId {
        /// The rejected identifier.
        id: String,
    },

    /// A document was rejected at the store boundary.
    #[error("invalid document: {message}")]
    InvalidDocument {
        /// Why the document was rejected.
        message: String,
    },

    // === Store Errors ===
    /// A MongoDB operation failed.
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Failed to open or create the `SQLite` database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A `SQLite` query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    // === I/O Errors ===
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

/// A specialized Result type for weightrec operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a connection error.
    #[must_use]
    pub fn connection(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create an invalid id error.
    #[must_use]
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId { id: id.into() }
    }

    /// Create an invalid document error.
    #[must_use]
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Check if this error should abort startup or the triggering action.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissing { .. }
                | Self::ConfigLoad(_)
                | Self::ConfigValidation { .. }
                | Self::Connection { .. }
        )
    }

    /// Check if this error rejects a single operation's input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidId { .. } | Self::InvalidDocument { .. })
    }
}
