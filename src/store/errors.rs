//! Store error types
//!
//! Errors surface synchronously to the caller of the triggering
//! operation, including mutations performed through observed handles.
//! There is no retry policy; the caller decides.

use thiserror::Error;

use crate::codec::CodecError;
use crate::storage::StorageError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key (or map entry) does not exist. Never raised by upserts.
    #[error("key not found: {key:?}")]
    NotFound { key: String },

    /// Raw stored text did not decode under the value grammar.
    /// Raised by the structured surface only; `get_raw` never decodes.
    #[error(transparent)]
    Malformed(#[from] CodecError),

    /// The backing file could not be read or replaced. The previous
    /// on-disk state is intact.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// An observed handle's path no longer resolves: the element it
    /// pointed at was removed or replaced through another handle.
    #[error("observed path no longer resolves to a value")]
    PathUnresolved,

    /// Sequence index out of bounds on an observed list handle.
    #[error("index {index} out of bounds for sequence of length {len}")]
    OutOfBounds { index: usize, len: usize },
}

impl StoreError {
    /// Create a not-found error for a key
    pub fn not_found(key: impl Into<String>) -> Self {
        StoreError::NotFound { key: key.into() }
    }

    /// Returns whether this error is a missing-key error
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_names_key() {
        let err = StoreError::not_found("missing");
        assert!(err.to_string().contains("missing"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_wraps_codec_error() {
        let codec_err = crate::codec::decode("not json").unwrap_err();
        let err = StoreError::from(codec_err);
        assert!(!err.is_not_found());
        assert!(matches!(err, StoreError::Malformed(_)));
    }
}
