//! Unified error hierarchy for moodrs
//!
//! The analytics engine itself never fails: malformed input degrades the
//! result instead. These errors belong to the layers around it (snapshot
//! loading, CSV import, configuration).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all moodrs operations
#[derive(Debug, Error)]
pub enum MoodRsError {
    /// Snapshot store errors
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Mood entry import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors raised by the snapshot collaborator
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Snapshot file missing
    #[error("Snapshot file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Snapshot document could not be parsed
    #[error("Failed to parse snapshot {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Strict stores refuse users they have never seen
    #[error("Unknown user: {user_id}")]
    UnknownUser { user_id: String },
}

/// Errors raised while importing mood entries
#[derive(Debug, Error)]
pub enum ImportError {
    /// Unsupported format
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// A required column is absent from the header
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    /// A row could not be turned into an entry
    #[error("Invalid row {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    /// File held no entries at all
    #[error("No mood entries found in {path}")]
    Empty { path: PathBuf },

    /// Underlying CSV reader failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for moodrs operations
pub type Result<T> = std::result::Result<T, MoodRsError>;

impl MoodRsError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MoodRsError::Snapshot(SnapshotError::UnknownUser { .. }) => ErrorSeverity::Warning,
            MoodRsError::Import(ImportError::InvalidRow { .. }) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            MoodRsError::Snapshot(SnapshotError::FileNotFound { path }) => {
                format!("Could not find mood data file: {}", path.display())
            }
            MoodRsError::Snapshot(SnapshotError::Parse { path, .. }) => {
                format!(
                    "Mood data file {} is not valid JSON. Please check its contents.",
                    path.display()
                )
            }
            MoodRsError::Import(ImportError::MissingColumn { column }) => {
                format!("The import file needs a '{}' column.", column)
            }
            MoodRsError::Import(ImportError::Empty { path }) => {
                format!("No mood entries were found in {}", path.display())
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Problem with one user or row rather than the whole data set
    Warning,
}
