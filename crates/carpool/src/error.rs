//! Error types for carpool.
//!
//! This module defines all error types used throughout the carpool crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for carpool operations.
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

    // === Ledger Errors ===
    /// A week with this name is already archived.
    #[error("week \"{name}\" already exists")]
    WeekExists {
        /// The conflicting week name.
        name: String,
    },

    /// No archived or active week has this name.
    #[error("week \"{name}\" not found")]
    WeekNotFound {
        /// The requested week name.
        name: String,
    },

    /// The default placeholder week cannot be renamed.
    #[error("the default week cannot be renamed; create a new week first")]
    DefaultWeekRename,

    /// No trip exists at the given position.
    #[error("trip {index} not found (active week has {len} trips)")]
    TripNotFound {
        /// Zero-based trip index that was requested.
        index: usize,
        /// Number of trips in the active week.
        len: usize,
    },

    /// No participant exists at the given position.
    #[error("participant {index} not found in trip {trip} ({len} participants)")]
    ParticipantNotFound {
        /// Zero-based trip index.
        trip: usize,
        /// Zero-based participant index that was requested.
        index: usize,
        /// Number of participants in the trip.
        len: usize,
    },

    /// A trip was submitted without anyone riding it.
    #[error("a trip needs at least one participant")]
    NoParticipants,

    /// A user-supplied value was rejected.
    #[error("invalid {field}: {message}")]
    InvalidInput {
        /// The field that was rejected.
        field: &'static str,
        /// Why it was rejected.
        message: String,
    },

    // === Import/Export Errors ===
    /// A backup could not be restored.
    #[error("invalid backup: {message}")]
    InvalidBackup {
        /// Description of what is wrong with the backup.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
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

/// A specialized Result type for carpool operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new invalid input error.
    #[must_use]
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Create a new invalid backup error.
    #[must_use]
    pub fn invalid_backup(message: impl Into<String>) -> Self {
        Self::InvalidBackup {
            message: message.into(),
        }
    }

    /// Create a week-exists error.
    #[must_use]
    pub fn week_exists(name: impl Into<String>) -> Self {
        Self::WeekExists { name: name.into() }
    }

    /// Create a week-not-found error.
    #[must_use]
    pub fn week_not_found(name: impl Into<String>) -> Self {
        Self::WeekNotFound { name: name.into() }
    }

    /// Check if this error is a name collision between weeks.
    #[must_use]
    pub fn is_week_conflict(&self) -> bool {
        matches!(self, Self::WeekExists { .. })
    }

    /// Check if this error points at a missing week, trip or participant.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::WeekNotFound { .. }
                | Self::TripNotFound { .. }
                | Self::ParticipantNotFound { .. }
        )
    }
}
