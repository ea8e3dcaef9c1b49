//! Marketplace Cart - Shopping cart state container.
//!
//! Tracks the products a shopper has picked together with their quantities,
//! mirrors the list into a local key-value store after every change, and
//! restores it once at startup.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the in-memory list and is handed to consumers
//!   explicitly; clones share the same state.
//! - Every mutation publishes a new immutable [`CartSnapshot`] over a
//!   `tokio::sync::watch` channel and returns a [`PendingWrite`] for the
//!   persistence write.
//! - Storage backends implement [`KeyValueStorage`]: [`MemoryStorage`] for
//!   tests and throwaway sessions, [`FileStorage`] for on-disk persistence.
//!
//! # Example
//!
//! ```rust,no_run
//! use marketplace_cart::{CartStore, MemoryStorage, NewCartItem};
//! use marketplace_core::{Price, ProductId};
//!
//! # async fn demo() -> Result<(), marketplace_cart::CartError> {
//! let store = CartStore::new(MemoryStorage::new(), "@GoMarketplace:products")?;
//! store.restore().await?;
//!
//! store
//!     .add_to_cart(NewCartItem {
//!         id: ProductId::new("a"),
//!         title: "Shoe".to_owned(),
//!         image_url: "https://cdn.example.com/shoe.png".to_owned(),
//!         price: Price::from_cents(1000),
//!     })
//!     .await?;
//!
//! assert_eq!(store.products().item_count(), 1);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod item;
pub mod snapshot;
pub mod state;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError, DEFAULT_STORAGE_KEY};
pub use error::{CartError, Result};
pub use item::{CartItem, NewCartItem};
pub use snapshot::CartSnapshot;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{CartStore, PendingWrite};
