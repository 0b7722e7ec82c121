//! Error types and recovery strategies for Setlist
//!
//! Every error carries a severity tier and a recovery action:
//! - **Recoverable**: the caller can fix the input and try again
//! - **Degraded**: the playlist keeps working from memory or defaults
//!
//! Persistence errors are normally logged and swallowed by the storage
//! layer; the recovery action tells that layer what to fall back to.

use std::fmt;
use std::io;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Discard the stored record and continue from the empty playlist
    ResetToDefaults,
    /// Log the failure and keep the in-memory state
    LogAndContinue,
    /// Ask the user to correct their input
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResetToDefaults => write!(f, "Resetting to defaults"),
            Self::LogAndContinue => write!(f, "Continuing with in-memory state"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Error can be recovered from by the caller
    Recoverable,
    /// Feature degraded but app can continue
    Degraded,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
        }
    }
}

/// Main error type for Setlist
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Persistence Errors =====
    /// Encoding or decoding a stored record failed
    #[error("Serialization failed: {message}")]
    SerializationFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A stored record parsed but its contents are unusable
    #[error("Corrupted record under '{key}': {reason}")]
    CorruptedRecord { key: String, reason: String },

    /// The key-value store failed to read
    #[error("Storage read failed for '{key}': {message}")]
    StorageReadFailed {
        key: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The key-value store rejected a write
    #[error("Storage write failed for '{key}': {message}")]
    StorageWriteFailed {
        key: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// General I/O error
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    // ===== Data Errors =====
    /// A timestamp could not be encoded or parsed
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// History cursor outside `[-1, history_len - 1]`
    #[error("Invalid history index {index} for history of length {history_len}")]
    InvalidHistoryIndex { index: i64, history_len: usize },

    /// User input rejected at the input boundary
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    // ===== Generic Errors =====
    /// Generic internal error
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidInput { .. } => ErrorSeverity::Recoverable,

            Self::SerializationFailed { .. }
            | Self::CorruptedRecord { .. }
            | Self::StorageReadFailed { .. }
            | Self::StorageWriteFailed { .. }
            | Self::IoError { .. }
            | Self::InvalidTimestamp { .. }
            | Self::InvalidHistoryIndex { .. }
            | Self::InternalError { .. } => ErrorSeverity::Degraded,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::SerializationFailed { .. }
            | Self::CorruptedRecord { .. }
            | Self::StorageReadFailed { .. }
            | Self::InvalidTimestamp { .. }
            | Self::InvalidHistoryIndex { .. } => RecoveryAction::ResetToDefaults,

            Self::StorageWriteFailed { .. } | Self::IoError { .. } | Self::InternalError { .. } => {
                RecoveryAction::LogAndContinue
            }

            Self::InvalidInput { .. } => RecoveryAction::UserIntervention,
        }
    }

    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            Self::SerializationFailed { .. }
            | Self::CorruptedRecord { .. }
            | Self::InvalidTimestamp { .. }
            | Self::InvalidHistoryIndex { .. } => {
                "Your saved playlist could not be read and was reset.".to_string()
            }
            Self::StorageReadFailed { .. } => {
                "Your saved playlist is unavailable. Starting with an empty playlist.".to_string()
            }
            Self::StorageWriteFailed { .. } | Self::IoError { .. } => {
                "Your latest playlist change could not be saved.".to_string()
            }
            Self::InvalidInput { reason, .. } => reason.clone(),
            Self::InternalError { .. } => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }

    /// Helper to create a serialization error from any error type
    pub fn serialization<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::SerializationFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create a storage read error from any error type
    pub fn storage_read<E: std::error::Error + Send + Sync + 'static>(
        key: impl Into<String>,
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::StorageReadFailed {
            key: key.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create a storage write error from any error type
    pub fn storage_write<E: std::error::Error + Send + Sync + 'static>(
        key: impl Into<String>,
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::StorageWriteFailed {
            key: key.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create an input validation error
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        Self::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}
