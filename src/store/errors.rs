//! Record store errors
//!
//! Error codes:
//! - LOAN_VALIDATION_FAILED (client input, 400)
//! - LOAN_DUPLICATE_KEY (conflict, 409)
//! - LOAN_NOT_FOUND (unknown key, 404)
//! - LOAN_STORAGE_CORRUPTION (data file unparseable, 500, fatal)
//! - LOAN_STORAGE_IO (read/write failure, 500)

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::application::FieldViolation;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing or malformed field, blank key, or absent record
    #[error("{0}")]
    Validation(String),

    /// Create with an application number already in the store
    #[error("Application number '{0}' already exists.")]
    DuplicateKey(String),

    /// Update or delete of an unknown application number
    #[error("Application '{0}' not found.")]
    NotFound(String),

    /// The data file exists but is not a valid record set
    #[error("Data file {} is corrupt: {reason}", .path.display())]
    StorageCorruption { path: PathBuf, reason: String },

    /// Reading or committing the data file failed
    #[error("Storage I/O error while {context}: {source}")]
    StorageIo {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Field violations reported by validation
    pub fn invalid_fields(violations: &[FieldViolation]) -> Self {
        let details: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
        StoreError::Validation(format!(
            "Invalid application data: {}.",
            details.join("; ")
        ))
    }

    /// Blank application number in a path or argument
    pub fn blank_key() -> Self {
        StoreError::Validation("Application number is required.".to_string())
    }

    /// Update called without a record
    pub fn missing_record() -> Self {
        StoreError::Validation("Invalid application data.".to_string())
    }

    pub fn corruption(path: &Path, reason: impl Into<String>) -> Self {
        StoreError::StorageCorruption {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        StoreError::StorageIo {
            context: context.into(),
            source,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "LOAN_VALIDATION_FAILED",
            StoreError::DuplicateKey(_) => "LOAN_DUPLICATE_KEY",
            StoreError::NotFound(_) => "LOAN_NOT_FOUND",
            StoreError::StorageCorruption { .. } => "LOAN_STORAGE_CORRUPTION",
            StoreError::StorageIo { .. } => "LOAN_STORAGE_IO",
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Validation(_) => 400,
            StoreError::DuplicateKey(_) => 409,
            StoreError::NotFound(_) => 404,
            StoreError::StorageCorruption { .. } => 500,
            StoreError::StorageIo { .. } => 500,
        }
    }

    /// Caller input was rejected; storage is healthy
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(_) | StoreError::DuplicateKey(_) | StoreError::NotFound(_)
        )
    }

    /// The data file cannot be trusted; the process should not keep serving
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::StorageCorruption { .. })
    }
}
