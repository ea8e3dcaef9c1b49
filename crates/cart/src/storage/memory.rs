//! In-process storage backend.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{KeyValueStorage, StorageError};

/// Key-value storage held entirely in memory.
///
/// Clones share the same map, so a test can keep one handle to inspect what
/// the cart store wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a single entry.
    #[must_use]
    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut items = HashMap::new();
        items.insert(key.into(), value.into());
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("nope").await.unwrap(), None);
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "one").await.unwrap();
        storage.set_item("k", "two").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap().as_deref(), Some("two"));
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let storage = MemoryStorage::with_item("k", "v");
        let other = storage.clone();
        other.remove_item("k").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap(), None);
    }
}
