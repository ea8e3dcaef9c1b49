//! Cart line item types.

use marketplace_core::{Price, ProductId, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product in the cart together with how many units were picked.
///
/// Field names match the persisted JSON exactly:
/// `{"id", "title", "image_url", "price", "quantity"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product title as shown in listings.
    pub title: String,
    /// Product image URL. Stored as given, never validated.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
    /// Units in the cart, always at least one.
    pub quantity: Quantity,
}

impl CartItem {
    /// Create a line item with a quantity of one.
    #[must_use]
    pub fn from_new(item: NewCartItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity: Quantity::ONE,
        }
    }

    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity)
    }
}

/// A product being added to the cart; quantity is decided by the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
}

impl From<NewCartItem> for CartItem {
    fn from(item: NewCartItem) -> Self {
        Self::from_new(item)
    }
}
