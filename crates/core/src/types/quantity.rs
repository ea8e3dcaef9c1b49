//! Line item quantity.

use core::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Number of units of a product in the cart.
///
/// Always at least one. A line whose quantity would reach zero is removed
/// instead, which is why [`Quantity::decremented`] returns an `Option`.
/// Deserializing `0` fails, so the invariant also holds for restored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(n: u32) -> Option<Self> {
        match NonZeroU32::new(n) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0.get()
    }

    /// One more unit, saturating at `u32::MAX`.
    #[must_use]
    pub const fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Combined quantity of two lines, saturating at `u32::MAX`.
    #[must_use]
    pub const fn plus(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }

    /// One fewer unit, or `None` when the line should be removed.
    #[must_use]
    pub const fn decremented(self) -> Option<Self> {
        Self::new(self.0.get() - 1)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.get()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_rejected() {
        assert!(Quantity::new(0).is_none());
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }

    #[test]
    fn test_increment_and_decrement() {
        let one = Quantity::ONE;
        let two = one.incremented();
        assert_eq!(two.get(), 2);
        assert_eq!(two.decremented(), Some(one));
        assert_eq!(one.decremented(), None);
    }

    #[test]
    fn test_increment_saturates() {
        let max = Quantity::new(u32::MAX).unwrap();
        assert_eq!(max.incremented(), max);
    }

    #[test]
    fn test_plus() {
        let two = Quantity::new(2).unwrap();
        let three = Quantity::new(3).unwrap();
        assert_eq!(two.plus(three).get(), 5);
        let max = Quantity::new(u32::MAX).unwrap();
        assert_eq!(max.plus(two), max);
    }

    #[test]
    fn test_serde_plain_number() {
        let q = Quantity::new(7).unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), "7");
        assert_eq!(serde_json::from_str::<Quantity>("7").unwrap(), q);
    }
}
