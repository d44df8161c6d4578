//! Storage error types

use std::io;

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage errors
///
/// An `Io` failure leaves the previous on-disk state intact: the
/// snapshot replace only renames a fully written temporary file over
/// the original, so a failed write never clobbers existing records.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failure: {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("storage corruption at byte {offset}: {reason}")]
    Corruption { offset: u64, reason: String },
}

impl StorageError {
    /// Create an I/O error with context about the failed operation
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        StorageError::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a corruption error at a byte offset in the backing file
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        StorageError::Corruption {
            offset,
            reason: reason.into(),
        }
    }
}
