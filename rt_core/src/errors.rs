//! # Error Types
//!
//! Structured error types for rt_core.
//!
//! The calculation engine itself never fails: bad or missing inputs degrade to
//! zero results plus warnings. Errors only surface at the edges, when reading
//! or writing session stores, loading snapshot and config files, or rendering
//! the PDF report.
//!
//! ## Example
//!
//! ```rust
//! use rt_core::errors::{RtError, RtResult};
//!
//! fn require_path(path: &str) -> RtResult<()> {
//!     if path.is_empty() {
//!         return Err(RtError::invalid_input("path", path, "Path is empty"));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for rt_core operations
pub type RtResult<T> = Result<T, RtError>;

/// Structured error type for I/O and report operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum RtError {
    /// An input value is invalid (unknown field, unparsable identifier, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A layer or shot identifier does not exist in the list
    #[error("No {list} entry with id {id}")]
    EntryNotFound { list: String, id: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// The store file is locked by another process
    #[error("File locked: '{path}' is held by another process")]
    FileLocked { path: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Typst compilation or PDF export failed
    #[error("Report rendering failed: {stage} - {reason}")]
    ReportFailed { stage: String, reason: String },
}

impl RtError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        RtError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an EntryNotFound error
    pub fn entry_not_found(list: impl Into<String>, id: impl ToString) -> Self {
        RtError::EntryNotFound {
            list: list.into(),
            id: id.to_string(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        RtError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a ReportFailed error
    pub fn report_failed(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        RtError::ReportFailed {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a serde_json error
    pub fn serialization(err: impl ToString) -> Self {
        RtError::SerializationError {
            reason: err.to_string(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RtError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            RtError::InvalidInput { .. } => "INVALID_INPUT",
            RtError::EntryNotFound { .. } => "ENTRY_NOT_FOUND",
            RtError::FileError { .. } => "FILE_ERROR",
            RtError::FileLocked { .. } => "FILE_LOCKED",
            RtError::SerializationError { .. } => "SERIALIZATION_ERROR",
            RtError::ReportFailed { .. } => "REPORT_FAILED",
        }
    }
}
