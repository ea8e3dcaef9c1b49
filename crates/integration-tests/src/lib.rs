//! Integration tests for the marketplace cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - File-backed store across process-like restarts
//! - `cart_scenarios` - End-to-end shopping flows through the public API
//!
//! The helpers below create throwaway storage locations under the system
//! temp directory and sample catalog products.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::{Path, PathBuf};

use marketplace_cart::NewCartItem;
use marketplace_core::{Price, ProductId};

/// Storage key used by the client application.
pub const STORAGE_KEY: &str = marketplace_cart::DEFAULT_STORAGE_KEY;

/// A storage file path inside a fresh temp directory, removed on drop.
#[derive(Debug)]
pub struct TempStorage {
    dir: PathBuf,
    path: PathBuf,
}

impl TempStorage {
    /// Reserve a new, not yet created, storage file path.
    #[must_use]
    pub fn new() -> Self {
        let dir = std::env::temp_dir().join(format!(
            "marketplace-it-{}",
            uuid::Uuid::new_v4().simple()
        ));
        let path = dir.join("cart-storage.json");
        Self { dir, path }
    }

    /// Path of the storage file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for TempStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempStorage {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// Build a catalog product.
#[must_use]
pub fn product(id: &str, title: &str, cents: i64) -> NewCartItem {
    NewCartItem {
        id: ProductId::new(id),
        title: title.to_owned(),
        image_url: format!("https://cdn.example.com/products/{id}.jpg"),
        price: Price::from_cents(cents),
    }
}
