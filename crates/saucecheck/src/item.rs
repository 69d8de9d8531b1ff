//! Items chosen during a scenario.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A product as displayed: name and unit price
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Display name
    pub name: String,
    /// Unit price
    pub price: Decimal,
}

impl Item {
    /// Create an item
    #[must_use]
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    /// Same product: case-insensitive name and exact price
    #[must_use]
    pub fn matches(&self, name: &str, price: Decimal) -> bool {
        self.name.to_lowercase() == name.to_lowercase() && self.price == price
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (${})", self.name, self.price)
    }
}

/// Ordered items picked on the inventory page, threaded through cart and
/// checkout as the expected state.
pub type CartSelection = Vec<Item>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_matches_ignores_name_case() {
        let item = Item::new("Sauce Labs Onesie", dec!(7.99));
        assert!(item.matches("sauce labs onesie", dec!(7.99)));
        assert!(item.matches("SAUCE LABS ONESIE", dec!(7.990)));
    }

    #[test]
    fn test_matches_requires_exact_price() {
        let item = Item::new("Sauce Labs Onesie", dec!(7.99));
        assert!(!item.matches("Sauce Labs Onesie", dec!(8.99)));
        assert!(!item.matches("Sauce Labs Onesie Deluxe", dec!(7.99)));
    }

    #[test]
    fn test_display() {
        let item = Item::new("Sauce Labs Backpack", dec!(29.99));
        assert_eq!(item.to_string(), "Sauce Labs Backpack ($29.99)");
    }
}
