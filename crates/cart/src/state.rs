//! Pure cart list transitions.
//!
//! Each function takes the current list and returns a freshly built one; the
//! input is never modified. The store runs these under its snapshot lock, so
//! every mutation observes the latest list.
//!
//! All three preserve the invariants: ids stay unique and every quantity
//! stays at or above one.

use marketplace_core::ProductId;

use crate::item::{CartItem, NewCartItem};

/// Add one unit of `item`.
///
/// Bumps the quantity of an existing line with the same id, otherwise
/// appends a new line with a quantity of one.
#[must_use]
pub fn add_item(items: &[CartItem], item: NewCartItem) -> Vec<CartItem> {
    let mut next = items.to_vec();
    match next.iter_mut().find(|line| line.id == item.id) {
        Some(line) => line.quantity = line.quantity.incremented(),
        None => next.push(CartItem::from_new(item)),
    }
    next
}

/// Add one unit to the line matching `id`. Unknown ids leave the list as is.
#[must_use]
pub fn increment_item(items: &[CartItem], id: &ProductId) -> Vec<CartItem> {
    items
        .iter()
        .map(|line| {
            if &line.id == id {
                CartItem {
                    quantity: line.quantity.incremented(),
                    ..line.clone()
                }
            } else {
                line.clone()
            }
        })
        .collect()
}

/// Remove one unit from the line matching `id`, dropping the line at zero.
/// Unknown ids leave the list as is.
#[must_use]
pub fn decrement_item(items: &[CartItem], id: &ProductId) -> Vec<CartItem> {
    items
        .iter()
        .filter_map(|line| {
            if &line.id != id {
                return Some(line.clone());
            }
            line.quantity.decremented().map(|quantity| CartItem {
                quantity,
                ..line.clone()
            })
        })
        .collect()
}

/// Collapse lines that share an id into the first occurrence, summing
/// quantities. Returns the list and how many lines were folded away.
///
/// Only restored data can contain duplicates; the mutators never create them.
#[must_use]
pub fn merge_duplicates(items: Vec<CartItem>) -> (Vec<CartItem>, usize) {
    let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
    let mut folded = 0;
    for item in items {
        match merged.iter_mut().find(|line| line.id == item.id) {
            Some(line) => {
                line.quantity = line.quantity.plus(item.quantity);
                folded += 1;
            }
            None => merged.push(item),
        }
    }
    (merged, folded)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use marketplace_core::{Price, Quantity};

    use super::*;

    fn product(id: &str) -> NewCartItem {
        NewCartItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            image_url: format!("https://cdn.example.com/{id}.png"),
            price: Price::from_cents(1000),
        }
    }

    fn quantities(items: &[CartItem]) -> Vec<(&str, u32)> {
        items
            .iter()
            .map(|i| (i.id.as_str(), i.quantity.get()))
            .collect()
    }

    #[test]
    fn test_add_to_empty_cart() {
        let items = add_item(&[], product("a"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0], CartItem::from_new(product("a")));
    }

    #[test]
    fn test_add_twice_merges() {
        let items = add_item(&add_item(&[], product("a")), product("a"));
        assert_eq!(quantities(&items), vec![("a", 2)]);
    }

    #[test]
    fn test_add_appends_in_order() {
        let items = add_item(&add_item(&[], product("a")), product("b"));
        let items = add_item(&items, product("a"));
        assert_eq!(quantities(&items), vec![("a", 2), ("b", 1)]);
    }

    #[test]
    fn test_add_keeps_existing_details() {
        let items = add_item(&[], product("a"));
        let mut changed = product("a");
        changed.title = "Renamed".to_string();
        let items = add_item(&items, changed);
        assert_eq!(items[0].title, "Product a");
    }

    #[test]
    fn test_increment_only_touches_match() {
        let items = add_item(&add_item(&[], product("a")), product("b"));
        let items = increment_item(&items, &ProductId::new("b"));
        assert_eq!(quantities(&items), vec![("a", 1), ("b", 2)]);
    }

    #[test]
    fn test_increment_missing_is_noop() {
        let items = add_item(&[], product("a"));
        assert_eq!(increment_item(&items, &ProductId::new("zzz")), items);
    }

    #[test]
    fn test_decrement_above_one() {
        let items = increment_item(&add_item(&[], product("a")), &ProductId::new("a"));
        let items = decrement_item(&items, &ProductId::new("a"));
        assert_eq!(quantities(&items), vec![("a", 1)]);
    }

    #[test]
    fn test_decrement_at_one_removes() {
        let items = add_item(&add_item(&[], product("a")), product("b"));
        let items = decrement_item(&items, &ProductId::new("a"));
        assert_eq!(quantities(&items), vec![("b", 1)]);
    }

    #[test]
    fn test_decrement_missing_is_noop() {
        let items = add_item(&[], product("a"));
        assert_eq!(decrement_item(&items, &ProductId::new("zzz")), items);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let before = add_item(&[], product("a"));
        let snapshot = before.clone();
        let _ = increment_item(&before, &ProductId::new("a"));
        let _ = decrement_item(&before, &ProductId::new("a"));
        let _ = add_item(&before, product("a"));
        assert_eq!(before, snapshot);
    }

    #[test]
    fn test_merge_duplicates() {
        let a = CartItem::from_new(product("a"));
        let b = CartItem::from_new(product("b"));
        let mut a_again = a.clone();
        a_again.quantity = Quantity::new(4).unwrap();
        a_again.title = "Other title".to_string();

        let (items, folded) = merge_duplicates(vec![a, b, a_again]);
        assert_eq!(folded, 1);
        assert_eq!(quantities(&items), vec![("a", 5), ("b", 1)]);
        assert_eq!(items[0].title, "Product a");
    }

    #[test]
    fn test_merge_without_duplicates_is_identity() {
        let items = add_item(&add_item(&[], product("a")), product("b"));
        let (merged, folded) = merge_duplicates(items.clone());
        assert_eq!(folded, 0);
        assert_eq!(merged, items);
    }

    #[test]
    fn test_invariants_hold_over_mixed_sequence() {
        let ids = ["a", "b", "c"];
        let mut items = Vec::new();
        for step in 0..60_usize {
            let id = ids[step % ids.len()];
            items = match step % 4 {
                0 | 1 => add_item(&items, product(id)),
                2 => increment_item(&items, &ProductId::new(id)),
                _ => decrement_item(&items, &ProductId::new(id)),
            };

            let mut seen: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), items.len(), "duplicate id at step {step}");
            assert!(items.iter().all(|i| i.quantity >= Quantity::ONE));
        }
    }
}
