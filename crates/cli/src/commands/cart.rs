//! Cart commands.
//!
//! Every command restores the persisted cart first, applies its change,
//! waits for the write to land, and prints the resulting cart.
//!
//! # Usage
//!
//! ```bash
//! mp-cart add --id a --title Shoe --price 10
//! mp-cart increment a
//! mp-cart decrement a
//! mp-cart show --json
//! ```

use std::fmt::Write as _;

use marketplace_cart::{CartError, CartSnapshot, CartStore, KeyValueStorage, NewCartItem};
use marketplace_core::ProductId;
use tracing::info;

/// How the resulting cart is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned table with totals.
    Table,
    /// The persisted JSON representation.
    Json,
}

/// Print the restored cart.
///
/// # Errors
///
/// Returns an error if the persisted cart cannot be read.
pub async fn show<S: KeyValueStorage>(
    store: &CartStore<S>,
    format: OutputFormat,
) -> Result<(), CartError> {
    let snapshot = store.restore().await?;
    print_cart(&snapshot, format)
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the cart cannot be restored or persisted.
pub async fn add<S: KeyValueStorage>(
    store: &CartStore<S>,
    item: NewCartItem,
    format: OutputFormat,
) -> Result<(), CartError> {
    store.restore().await?;
    let id = item.id.clone();
    store.add_to_cart(item).await?;
    info!(product_id = %id, "Added to cart");
    print_cart(&store.products(), format)
}

/// Add one unit to an existing line.
///
/// # Errors
///
/// Returns an error if the cart cannot be restored or persisted.
pub async fn increment<S: KeyValueStorage>(
    store: &CartStore<S>,
    id: &ProductId,
    format: OutputFormat,
) -> Result<(), CartError> {
    store.restore().await?;
    store.increment(id).await?;
    print_cart(&store.products(), format)
}

/// Remove one unit from a line.
///
/// # Errors
///
/// Returns an error if the cart cannot be restored or persisted.
pub async fn decrement<S: KeyValueStorage>(
    store: &CartStore<S>,
    id: &ProductId,
    format: OutputFormat,
) -> Result<(), CartError> {
    store.restore().await?;
    store.decrement(id).await?;
    print_cart(&store.products(), format)
}

fn print_cart(snapshot: &CartSnapshot, format: OutputFormat) -> Result<(), CartError> {
    let rendered = match format {
        OutputFormat::Table => render_table(snapshot),
        OutputFormat::Json => {
            serde_json::to_string_pretty(snapshot.items()).map_err(CartError::Serialize)?
        }
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{rendered}");
    }
    Ok(())
}

/// Render the cart as a plain-text table.
#[must_use]
pub fn render_table(snapshot: &CartSnapshot) -> String {
    if snapshot.is_empty() {
        return "Cart is empty".to_string();
    }

    let id_width = snapshot
        .iter()
        .map(|item| item.id.as_str().chars().count())
        .max()
        .unwrap_or(0);
    let title_width = snapshot
        .iter()
        .map(|item| item.title.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Cart ({} products, {} items)",
        snapshot.len(),
        snapshot.item_count()
    );
    for item in snapshot {
        let line_total = marketplace_core::Price::new(item.line_total());
        let _ = writeln!(
            out,
            "  {:<id_width$}  {:<title_width$}  x{:<4} {:>10} {:>10}",
            item.id.as_str(),
            item.title,
            item.quantity.get(),
            item.price.to_string(),
            line_total.to_string(),
        );
    }
    let _ = write!(out, "Subtotal: {}", snapshot.subtotal());
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marketplace_cart::MemoryStorage;
    use marketplace_core::Price;

    use super::*;

    fn shoe() -> NewCartItem {
        NewCartItem {
            id: ProductId::new("a"),
            title: "Shoe".to_string(),
            image_url: String::new(),
            price: Price::from_cents(1000),
        }
    }

    #[tokio::test]
    async fn test_render_empty() {
        let store = CartStore::new(MemoryStorage::new(), "k").unwrap();
        assert_eq!(render_table(&store.products()), "Cart is empty");
    }

    #[tokio::test]
    async fn test_render_totals() {
        let store = CartStore::new(MemoryStorage::new(), "k").unwrap();
        store.add_to_cart(shoe()).await.unwrap();
        store.increment(&ProductId::new("a")).await.unwrap();

        let table = render_table(&store.products());
        assert!(table.starts_with("Cart (1 products, 2 items)"), "{table}");
        assert!(table.contains("Shoe"));
        assert!(table.contains("$20.00"));
        assert!(table.ends_with("Subtotal: $20.00"));
    }

    #[tokio::test]
    async fn test_render_aligns_non_ascii_titles() {
        let store = CartStore::new(MemoryStorage::new(), "k").unwrap();
        let mut acai = shoe();
        acai.id = ProductId::new("b");
        acai.title = "Camiseta Açaí".to_string();
        store.add_to_cart(shoe()).await.unwrap();
        store.add_to_cart(acai).await.unwrap();

        let table = render_table(&store.products());
        let widths: Vec<usize> = table
            .lines()
            .filter(|line| line.starts_with("  "))
            .map(|line| line.chars().count())
            .collect();
        assert_eq!(widths.len(), 2, "{table}");
        assert_eq!(widths.first(), widths.last(), "{table}");
    }

    #[tokio::test]
    async fn test_commands_restore_before_mutating() {
        let storage = MemoryStorage::new();
        let first = CartStore::new(storage.clone(), "k").unwrap();
        add(&first, shoe(), OutputFormat::Json).await.unwrap();

        let second = CartStore::new(storage, "k").unwrap();
        increment(&second, &ProductId::new("a"), OutputFormat::Json)
            .await
            .unwrap();
        assert_eq!(second.products().item_count(), 2);

        decrement(&second, &ProductId::new("a"), OutputFormat::Table)
            .await
            .unwrap();
        assert_eq!(second.products().item_count(), 1);
    }
}
