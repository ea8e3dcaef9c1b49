//! Immutable views of the cart.

use std::sync::Arc;

use marketplace_core::Price;
use rust_decimal::Decimal;

use crate::item::CartItem;

/// The cart contents at one point in time.
///
/// Cloning is cheap (the list is shared via `Arc`) and a snapshot never
/// changes after it is published; the store builds a new one per mutation.
/// `version` starts at 0 for the empty cart and grows by one on every
/// restore or mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    version: u64,
    items: Arc<[CartItem]>,
}

impl CartSnapshot {
    pub(crate) fn new(version: u64, items: Vec<CartItem>) -> Self {
        Self {
            version,
            items: items.into(),
        }
    }

    /// Monotonic snapshot counter.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Line items in cart order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterate over line items in cart order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Sum of every line's price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let total = self
            .items
            .iter()
            .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.line_total()));
        Price::new(total)
    }
}

impl Default for CartSnapshot {
    fn default() -> Self {
        Self::new(0, Vec::new())
    }
}

impl<'a> IntoIterator for &'a CartSnapshot {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
