//! Monetary values read from the storefront.
//!
//! Prices are displayed as `$12.34`; summary labels as `Tax: $2.40`. All
//! arithmetic is exact decimal so a `29.98 * 0.08` subtotal rounds the way
//! the storefront rounds, half away from zero to the cent.

use crate::item::Item;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::str::FromStr;

/// Sales tax applied at checkout
pub const DEFAULT_TAX_RATE: Decimal = dec!(0.08);

/// Parse an item price such as `$29.99`.
///
/// Every `$` is dropped and surrounding whitespace ignored. Empty text reads
/// as zero; anything else that is not a number is `None`.
#[must_use]
pub fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned = text.replace('$', "");
    parse_number(&cleaned)
}

/// Parse the amount of a summary label such as `Item total: $39.98`.
///
/// Only the text after the first `$` counts; a label without `$` is parsed
/// whole.
#[must_use]
pub fn parse_amount(label: &str) -> Option<Decimal> {
    let amount = label.find('$').map_or(label, |idx| &label[idx + 1..]);
    parse_number(amount)
}

fn parse_number(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(trimmed).ok()
}

/// Round to whole cents, half away from zero
#[must_use]
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Tax owed on a subtotal: `round(subtotal * rate, 2)`
#[must_use]
pub fn tax_for(subtotal: Decimal, rate: Decimal) -> Decimal {
    round_cents(subtotal * rate)
}

/// Grand total: subtotal plus rounded tax
#[must_use]
pub fn grand_total(subtotal: Decimal, rate: Decimal) -> Decimal {
    subtotal + tax_for(subtotal, rate)
}

/// Sum of item prices
#[must_use]
pub fn sum_prices(items: &[Item]) -> Decimal {
    items.iter().map(|item| item.price).sum()
}

/// Display form used by the storefront (`$29.99`)
#[must_use]
pub fn format_price(value: Decimal) -> String {
    format!("${:.2}", round_cents(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod parsing {
        use super::*;

        #[test]
        fn test_parse_price() {
            assert_eq!(parse_price("$29.99"), Some(dec!(29.99)));
            assert_eq!(parse_price(" $7.99 "), Some(dec!(7.99)));
            assert_eq!(parse_price(""), Some(Decimal::ZERO));
            assert_eq!(parse_price("$abc"), None);
        }

        #[test]
        fn test_parse_amount_takes_text_after_symbol() {
            assert_eq!(parse_amount("Item total: $39.98"), Some(dec!(39.98)));
            assert_eq!(parse_amount("Tax: $3.20"), Some(dec!(3.20)));
            assert_eq!(parse_amount("43.18"), Some(dec!(43.18)));
            assert_eq!(parse_amount("Total: $"), Some(Decimal::ZERO));
            assert_eq!(parse_amount("Total: n/a"), None);
        }
    }

    mod arithmetic {
        use super::*;

        #[test]
        fn test_documented_example() {
            let subtotal = dec!(29.98);
            assert_eq!(tax_for(subtotal, DEFAULT_TAX_RATE), dec!(2.40));
            assert_eq!(grand_total(subtotal, DEFAULT_TAX_RATE), dec!(32.38));
        }

        #[test]
        fn test_half_cent_rounds_up() {
            // 0.0625 * 0.08 = 0.005
            assert_eq!(tax_for(dec!(0.0625), DEFAULT_TAX_RATE), dec!(0.01));
        }

        #[test]
        fn test_two_items() {
            let items = vec![
                Item::new("Sauce Labs Backpack", dec!(29.99)),
                Item::new("Sauce Labs Bike Light", dec!(9.99)),
            ];
            let subtotal = sum_prices(&items);
            assert_eq!(subtotal, dec!(39.98));
            assert_eq!(tax_for(subtotal, DEFAULT_TAX_RATE), dec!(3.20));
            assert_eq!(grand_total(subtotal, DEFAULT_TAX_RATE), dec!(43.18));
        }

        #[test]
        fn test_empty_selection_sums_to_zero() {
            assert_eq!(sum_prices(&[]), Decimal::ZERO);
            assert_eq!(grand_total(Decimal::ZERO, DEFAULT_TAX_RATE), Decimal::ZERO);
        }

        #[test]
        fn test_format_price() {
            assert_eq!(format_price(dec!(29.99)), "$29.99");
            assert_eq!(format_price(dec!(3.2)), "$3.20");
            assert_eq!(format_price(dec!(43)), "$43.00");
        }
    }

    proptest! {
        #[test]
        fn prop_grand_total_is_subtotal_plus_tax(cents in 0i64..10_000_000) {
            let subtotal = Decimal::new(cents, 2);
            let tax = tax_for(subtotal, DEFAULT_TAX_RATE);
            prop_assert_eq!(grand_total(subtotal, DEFAULT_TAX_RATE), subtotal + tax);
            prop_assert!(tax.scale() <= 2);
            prop_assert!((tax - subtotal * DEFAULT_TAX_RATE).abs() <= dec!(0.005));
        }

        #[test]
        fn prop_formatted_price_parses_back(cents in 0i64..10_000_000) {
            let price = Decimal::new(cents, 2);
            prop_assert_eq!(parse_price(&format_price(price)), Some(price));
        }
    }
}
