//! Error types for notesync.
//!
//! Remote failures are caught at the remote backend boundary and never reach
//! the notes service as errors. What does propagate are faults of the local
//! slot store and configuration problems.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for notesync operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the slot database.
    #[error("failed to open slot store at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A slot store query failed.
    #[error("slot store query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run slot store migrations.
    #[error("slot store migration failed: {message}")]
    DatabaseMigration {
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

    // === Remote Errors ===
    /// The remote client could not be constructed.
    #[error("failed to connect remote table: {message}")]
    RemoteConnect {
        /// Description of what went wrong.
        message: String,
    },

    /// The HTTP request to the remote table failed.
    #[error("remote transport error: {0}")]
    RemoteTransport(#[from] reqwest::Error),

    /// The remote table answered with a non-success status.
    #[error("remote {operation} failed with status {status}: {body}")]
    RemoteStatus {
        /// The table operation that was attempted.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, usually a PostgREST error document.
        body: String,
    },

    /// The remote response could not be understood.
    #[error("remote {operation} returned an unexpected payload: {message}")]
    RemoteDecode {
        /// The table operation that was attempted.
        operation: &'static str,
        /// Description of what went wrong.
        message: String,
    },

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

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for notesync operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a remote connection error.
    #[must_use]
    pub fn remote_connect(message: impl Into<String>) -> Self {
        Self::RemoteConnect {
            message: message.into(),
        }
    }

    /// Create a remote decode error for the given table operation.
    #[must_use]
    pub fn remote_decode(operation: &'static str, message: impl Into<String>) -> Self {
        Self::RemoteDecode {
            operation,
            message: message.into(),
        }
    }
}
