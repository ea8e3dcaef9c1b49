//! Local key-value persistence.
//!
//! The cart only needs a tiny slice of a key-value store: read a string,
//! write a string, drop a key. [`KeyValueStorage`] is that slice, so the
//! store can run against an in-process map in tests and a JSON file on disk
//! in the CLI.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - `HashMap` behind an async lock, shared across clones
//! - [`FileStorage`] - single JSON object file, written via temp file + rename

mod file;
mod memory;

use std::future::Future;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors reported by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the backing document failed.
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing document exists but is not a JSON object of strings.
    #[error("Storage file is corrupt: {0}")]
    Corrupt(String),

    /// The backend refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous string key-value store.
///
/// Implementations must be shareable across tasks: the cart store keeps one
/// behind an `Arc` and hands it to every background write.
pub trait KeyValueStorage: Send + Sync + 'static {
    /// Read the value stored under `key`, or `None` if the key is absent.
    fn get_item(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}
