//! Cart error types.
//!
//! Storage backends report [`StorageError`]; the store wraps those in
//! [`CartError`] with the phase (read or write) that failed. Nothing here is
//! retried: every failure goes straight back to the caller.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by [`CartStore`](crate::CartStore).
#[derive(Debug, Error)]
pub enum CartError {
    /// Persisting the cart to storage failed.
    #[error("Storage write failed: {0}")]
    StorageWrite(#[source] StorageError),

    /// Reading the persisted cart from storage failed.
    #[error("Storage read failed: {0}")]
    StorageRead(#[source] StorageError),

    /// The persisted cart could not be parsed.
    #[error("Malformed persisted cart: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The cart snapshot could not be serialized.
    #[error("Failed to serialize cart: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The store was used in a way its contract does not allow.
    #[error("Usage error: {0}")]
    Usage(String),

    /// The background write was torn down before it reported a result.
    #[error("Storage write aborted before completion")]
    WriteAborted,
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::Usage("no runtime".to_string());
        assert_eq!(err.to_string(), "Usage error: no runtime");

        let err = CartError::StorageWrite(StorageError::Unavailable("disk full".to_string()));
        assert_eq!(
            err.to_string(),
            "Storage write failed: Storage unavailable: disk full"
        );
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let err = CartError::StorageRead(StorageError::Unavailable("locked".to_string()));
        assert!(err.source().is_some());
        assert!(CartError::WriteAborted.source().is_none());
    }
}
