//! Error types for jotdb core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in jotdb core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] jotdb_storage::StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A query referenced a field with no registered index.
    #[error("field [{field}] is not searchable")]
    NotSearchable {
        /// The unregistered field name.
        field: String,
    },

    /// A log line failed to parse or lacked a key during replay.
    #[error("corrupt record on line #{line}: {message}")]
    CorruptRecord {
        /// Zero-based line number within the log file.
        line: usize,
        /// Description of the corruption.
        message: String,
    },

    /// A record could not be serialized for the log.
    #[error("record encoding failed: {message}")]
    EncodeFailed {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Creates a not-searchable error for an unregistered field.
    pub fn not_searchable(field: impl Into<String>) -> Self {
        Self::NotSearchable {
            field: field.into(),
        }
    }

    /// Creates a corrupt record error for a log line.
    pub fn corrupt_record(line: usize, message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            line,
            message: message.into(),
        }
    }

    /// Creates an encoding failure error.
    pub fn encode_failed(message: impl Into<String>) -> Self {
        Self::EncodeFailed {
            message: message.into(),
        }
    }
}
