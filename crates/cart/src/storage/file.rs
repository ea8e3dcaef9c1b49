//! JSON file storage backend.
//!
//! All keys live in one JSON object on disk:
//!
//! ```json
//! { "@GoMarketplace:products": "[{\"id\":\"a\", ...}]" }
//! ```
//!
//! Values are opaque strings, matching what a device key-value store keeps.
//! A missing file reads as an empty store. Every write rewrites the whole
//! document to a sibling temp file and renames it over the original.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use super::{KeyValueStorage, StorageError};

type Document = BTreeMap<String, String>;

/// Key-value storage backed by a single JSON file.
///
/// This struct is cheaply cloneable via `Arc`; clones serialize their access
/// to the file through the same lock.
#[derive(Debug, Clone)]
pub struct FileStorage {
    inner: Arc<FileStorageInner>,
}

#[derive(Debug)]
struct FileStorageInner {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Open storage at `path`. The file is not touched until first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(FileStorageInner {
                path: path.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    async fn read_document(&self) -> Result<Document, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.inner.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Document::new());
        }

        serde_json::from_str(&raw).map_err(|e| {
            StorageError::Corrupt(format!("{}: {e}", self.inner.path.display()))
        })
    }

    async fn write_document(&self, document: &Document) -> Result<(), StorageError> {
        let encoded = serde_json::to_string_pretty(document)?;

        if let Some(parent) = self.inner.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp_path = self
            .inner
            .path
            .with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&tmp_path, encoded).await?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &self.inner.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        debug!(path = %self.inner.path.display(), keys = document.len(), "Storage file written");
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.inner.lock.lock().await;
        let mut document = self.read_document().await?;
        Ok(document.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.inner.lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(key.to_owned(), value.to_owned());
        self.write_document(&document).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.inner.lock.lock().await;
        let mut document = self.read_document().await?;
        if document.remove(key).is_some() {
            self.write_document(&document).await?;
        }
        Ok(())
    }
}
