//! The cart store.
//!
//! [`CartStore`] keeps the cart in memory, publishes a fresh
//! [`CartSnapshot`] on every change, and mirrors the full list into a
//! [`KeyValueStorage`] under a single key.
//!
//! Mutations are two-phase. The in-memory list changes synchronously and
//! subscribers see the new snapshot before the call returns; the storage
//! write runs as a background task whose outcome is delivered through the
//! returned [`PendingWrite`]. Awaiting it is optional and dropping it does
//! not cancel the write.
//!
//! Writes are serialized and gated on snapshot version: a write whose
//! snapshot is not newer than the last one persisted is skipped, so storage
//! never regresses to an older cart when writes finish out of order.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use marketplace_core::ProductId;
use tokio::runtime::Handle;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::CartConfig;
use crate::error::{CartError, Result};
use crate::item::{CartItem, NewCartItem};
use crate::snapshot::CartSnapshot;
use crate::state;
use crate::storage::{FileStorage, KeyValueStorage};

/// Shopping cart with a persistent mirror.
///
/// This struct is cheaply cloneable via `Arc`; every clone reads and mutates
/// the same cart. Hand clones to whichever components need the cart instead
/// of looking one up globally.
pub struct CartStore<S> {
    inner: Arc<CartStoreInner<S>>,
}

struct CartStoreInner<S> {
    storage: S,
    key: String,
    snapshot: watch::Sender<CartSnapshot>,
    /// Highest snapshot version written to storage.
    persisted: Mutex<u64>,
    runtime: Handle,
}

impl<S> Clone for CartStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.inner.snapshot.borrow();
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .field("version", &snapshot.version())
            .field("items", &snapshot.len())
            .finish_non_exhaustive()
    }
}

impl CartStore<FileStorage> {
    /// Create a store backed by the file and key named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Usage`] when called outside a Tokio runtime.
    pub fn open(config: &CartConfig) -> Result<Self> {
        Self::new(
            FileStorage::new(config.storage_path.clone()),
            config.storage_key.clone(),
        )
    }
}

impl<S: KeyValueStorage> CartStore<S> {
    /// Create an empty store persisting under `key`.
    ///
    /// The store captures the current Tokio runtime to run its storage
    /// writes, so it must be created from within one. Call
    /// [`restore`](Self::restore) afterwards to load the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Usage`] when called outside a Tokio runtime.
    pub fn new(storage: S, key: impl Into<String>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            CartError::Usage(format!("CartStore must be created inside a Tokio runtime ({e})"))
        })?;
        let (snapshot, _) = watch::channel(CartSnapshot::default());

        Ok(Self {
            inner: Arc::new(CartStoreInner {
                storage,
                key: key.into(),
                snapshot,
                persisted: Mutex::new(0),
                runtime,
            }),
        })
    }

    /// Current cart contents.
    #[must_use]
    pub fn products(&self) -> CartSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Receive every snapshot published after this call.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// Storage key the cart is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.inner.key
    }

    /// The backing storage.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.inner.storage
    }

    /// Load the persisted cart, replacing the in-memory list wholesale.
    ///
    /// A missing or blank entry leaves the cart as it is. Restoring does not
    /// write back to storage.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::StorageRead`] if storage cannot be read and
    /// [`CartError::Malformed`] if the stored value is not a valid cart. The
    /// in-memory cart is left untouched in both cases.
    #[instrument(skip(self), fields(key = %self.inner.key))]
    pub async fn restore(&self) -> Result<CartSnapshot> {
        let stored = self
            .inner
            .storage
            .get_item(&self.inner.key)
            .await
            .map_err(CartError::StorageRead)?;

        let Some(raw) = stored.filter(|raw| !raw.trim().is_empty()) else {
            debug!("No persisted cart found");
            return Ok(self.products());
        };

        let items: Vec<CartItem> = serde_json::from_str(&raw).map_err(CartError::Malformed)?;
        let (items, folded) = state::merge_duplicates(items);
        if folded > 0 {
            warn!(folded, "Merged duplicate lines in persisted cart");
        }

        let snapshot = self.apply(move |_| items);
        info!(
            version = snapshot.version(),
            items = snapshot.len(),
            "Cart restored"
        );
        Ok(snapshot)
    }

    /// Run [`restore`](Self::restore) in the background.
    ///
    /// Consumers can render the empty cart right away and pick up the
    /// restored one through [`subscribe`](Self::subscribe). Failures are
    /// logged even if the handle is dropped.
    pub fn spawn_restore(&self) -> JoinHandle<Result<CartSnapshot>> {
        let store = self.clone();
        self.inner.runtime.spawn(async move {
            let result = store.restore().await;
            if let Err(e) = &result {
                error!(error = %e, key = %store.inner.key, "Failed to restore cart");
            }
            result
        })
    }

    /// Add one unit of a product, appending it if it is not in the cart yet.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub fn add_to_cart(&self, item: NewCartItem) -> PendingWrite {
        let snapshot = self.apply(move |items| state::add_item(items, item));
        debug!(version = snapshot.version(), "Product added to cart");
        self.persist(snapshot)
    }

    /// Add one unit to the line for `id`.
    ///
    /// An unknown id leaves the cart unchanged but is still persisted.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub fn increment(&self, id: &ProductId) -> PendingWrite {
        let snapshot = self.apply(|items| state::increment_item(items, id));
        debug!(version = snapshot.version(), "Product quantity incremented");
        self.persist(snapshot)
    }

    /// Remove one unit from the line for `id`, dropping the line at zero.
    ///
    /// An unknown id leaves the cart unchanged but is still persisted.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub fn decrement(&self, id: &ProductId) -> PendingWrite {
        let snapshot = self.apply(|items| state::decrement_item(items, id));
        debug!(version = snapshot.version(), "Product quantity decremented");
        self.persist(snapshot)
    }

    /// Derive and publish the next snapshot under the channel lock.
    fn apply<F>(&self, f: F) -> CartSnapshot
    where
        F: FnOnce(&[CartItem]) -> Vec<CartItem>,
    {
        let mut published = CartSnapshot::default();
        self.inner.snapshot.send_modify(|current| {
            let next = CartSnapshot::new(current.version() + 1, f(current.items()));
            published = next.clone();
            *current = next;
        });
        published
    }

    fn persist(&self, snapshot: CartSnapshot) -> PendingWrite {
        let version = snapshot.version();
        let inner = Arc::clone(&self.inner);
        let handle = self.inner.runtime.spawn(async move {
            let result = inner.write_snapshot(snapshot).await;
            if let Err(e) = &result {
                error!(error = %e, version, "Failed to persist cart");
            }
            result
        });
        PendingWrite { version, handle }
    }
}

impl<S: KeyValueStorage> CartStoreInner<S> {
    async fn write_snapshot(&self, snapshot: CartSnapshot) -> Result<()> {
        let mut persisted = self.persisted.lock().await;
        if snapshot.version() <= *persisted {
            debug!(
                version = snapshot.version(),
                persisted = *persisted,
                "Skipping superseded cart write"
            );
            return Ok(());
        }

        let encoded = serde_json::to_string(snapshot.items()).map_err(CartError::Serialize)?;
        self.storage
            .set_item(&self.key, &encoded)
            .await
            .map_err(CartError::StorageWrite)?;

        *persisted = snapshot.version();
        debug!(version = snapshot.version(), items = snapshot.len(), "Cart persisted");
        Ok(())
    }
}

/// Completion signal for a cart persistence write.
///
/// Resolves once the snapshot produced by the mutation has been written (or
/// skipped because a newer one already was). Dropping it detaches the write;
/// failures are logged either way.
#[derive(Debug)]
pub struct PendingWrite {
    version: u64,
    handle: JoinHandle<Result<()>>,
}

impl PendingWrite {
    /// Version of the snapshot this write persists.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Whether the write has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Let the write finish in the background without waiting for it.
    pub fn detach(self) {
        drop(self.handle);
    }
}

impl Future for PendingWrite {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|joined| joined.unwrap_or(Err(CartError::WriteAborted)))
    }
}
