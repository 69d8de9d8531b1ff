//! Inventory page (`/inventory.html`): product listing, cart controls, sort.

use crate::assertion::ensure;
use crate::driver::PageDriver;
use crate::fixture::Session;
use crate::item::{CartSelection, Item};
use crate::locator::Locator;
use crate::money::parse_price;
use crate::page_object::NavigablePage;
use crate::result::SauceResult;
use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::Collator;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const ITEM: &str = "div.inventory_item";
const ITEM_NAME: &str = "div.inventory_item_name";
const ITEM_PRICE: &str = "div.inventory_item_price";
const ITEM_DESC: &str = "div.inventory_item_desc";
const ITEM_IMAGE: &str = "img.inventory_item_img";
const SORT_SELECT: &str = "select.product_sort_container";
const SORT_ACTIVE: &str = "span.active_option";
const CART_ICON: &str = "div.shopping_cart_container";
const TITLE: &str = ".title";
const TITLE_TEXT: &str = "Products";
const ADD_LABEL: &str = "Add to cart";
const REMOVE_LABEL: &str = "Remove";

// =============================================================================
// SORT MODES
// =============================================================================

/// Ordering offered by the sort control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortMode {
    /// Name (A to Z)
    #[serde(rename = "az")]
    NameAscending,
    /// Name (Z to A)
    #[serde(rename = "za")]
    NameDescending,
    /// Price (low to high)
    #[serde(rename = "lohi")]
    PriceAscending,
    /// Price (high to low)
    #[serde(rename = "hilo")]
    PriceDescending,
}

impl SortMode {
    /// Every mode, in the order the control lists them
    pub const ALL: [Self; 4] = [
        Self::NameAscending,
        Self::NameDescending,
        Self::PriceAscending,
        Self::PriceDescending,
    ];

    /// Option value sent to the control
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::NameAscending => "az",
            Self::NameDescending => "za",
            Self::PriceAscending => "lohi",
            Self::PriceDescending => "hilo",
        }
    }

    /// Label the control shows once the mode is active
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NameAscending => "Name (A to Z)",
            Self::NameDescending => "Name (Z to A)",
            Self::PriceAscending => "Price (low to high)",
            Self::PriceDescending => "Price (high to low)",
        }
    }

    /// Whether the mode orders by price rather than name
    #[must_use]
    pub const fn is_price(self) -> bool {
        matches!(self, Self::PriceAscending | Self::PriceDescending)
    }

    /// Whether larger values come first
    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::NameDescending | Self::PriceDescending)
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.value() == s)
            .ok_or_else(|| format!("unknown sort mode {s:?}, expected one of az, za, lohi, hilo"))
    }
}

/// Root-locale collation at tertiary strength, the ordering a browser's
/// `localeCompare` gives with no locale argument
fn name_order() -> impl Fn(&str, &str) -> Ordering {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Tertiary);
    let collator = Collator::try_new(Default::default(), options)
        .map_err(|err| tracing::warn!(%err, "root collation unavailable, comparing code points"))
        .ok();
    move |a: &str, b: &str| collator.as_ref().map_or_else(|| a.cmp(b), |c| c.compare(a, b))
}

/// Locale string comparison: punctuation before digits before letters,
/// accents and case only break ties, lowercase first
#[must_use]
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    name_order()(a, b)
}

/// Adjacent-pair check of a name listing; zero or one names are sorted
#[must_use]
pub fn names_sorted(names: &[String], descending: bool) -> bool {
    let order = name_order();
    names.windows(2).all(|pair| {
        let ord = order(&pair[0], &pair[1]);
        if descending {
            ord != Ordering::Less
        } else {
            ord != Ordering::Greater
        }
    })
}

/// Adjacent-pair check of a price listing; zero or one prices are sorted
#[must_use]
pub fn prices_sorted(prices: &[Decimal], descending: bool) -> bool {
    prices.windows(2).all(|pair| {
        if descending {
            pair[0] >= pair[1]
        } else {
            pair[0] <= pair[1]
        }
    })
}

// =============================================================================
// PAGE MODEL
// =============================================================================

/// Product listing
#[derive(Debug)]
pub struct InventoryPage<'s, D> {
    session: &'s Session<D>,
}

impl<'s, D: PageDriver> InventoryPage<'s, D> {
    /// Bind to a session
    pub const fn new(session: &'s Session<D>) -> Self {
        Self { session }
    }

    /// Locator of the item card at `index`, in display order
    #[must_use]
    pub fn item(index: usize) -> Locator {
        Locator::css(ITEM).nth(index)
    }

    /// Number of item cards
    pub async fn count_items(&self) -> SauceResult<usize> {
        self.session.count(&Locator::css(ITEM)).await
    }

    /// Cart badge number, 0 when absent
    pub async fn cart_count(&self) -> u32 {
        self.session.badge_count().await
    }

    /// Name of the item at `index`
    pub async fn item_name(&self, index: usize) -> SauceResult<String> {
        self.session
            .text(&Self::item(index).css_within(ITEM_NAME))
            .await
    }

    /// Price of the item at `index`; `None` when the text is not a number
    pub async fn item_price(&self, index: usize) -> SauceResult<Option<Decimal>> {
        let text = self
            .session
            .text(&Self::item(index).css_within(ITEM_PRICE))
            .await?;
        Ok(parse_price(&text))
    }

    /// Name and price of the item at `index`; an unreadable price reads as zero
    pub async fn read_item(&self, index: usize) -> SauceResult<Item> {
        let name = self.item_name(index).await?;
        let price = self.item_price(index).await?.unwrap_or(Decimal::ZERO);
        Ok(Item::new(name, price))
    }

    /// Whether the item's image has a non-empty source
    pub async fn is_shown_image(&self, index: usize) -> SauceResult<bool> {
        let src = self
            .session
            .attribute(&Self::item(index).css_within(ITEM_IMAGE), "src")
            .await?;
        Ok(src.is_some_and(|src| !src.is_empty()))
    }

    /// Whether the item has a non-empty name
    pub async fn has_title(&self, index: usize) -> SauceResult<bool> {
        Ok(!self.item_name(index).await?.is_empty())
    }

    /// Whether the item has a non-empty description
    pub async fn has_description(&self, index: usize) -> SauceResult<bool> {
        let text = self
            .session
            .text(&Self::item(index).css_within(ITEM_DESC))
            .await?;
        Ok(!text.is_empty())
    }

    /// Every item shows an image
    pub async fn is_shown_all_item_image(&self) -> SauceResult<bool> {
        for index in 0..self.count_items().await? {
            if !self.is_shown_image(index).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Every item shows a numeric price
    pub async fn is_shown_all_item_price(&self) -> SauceResult<bool> {
        for index in 0..self.count_items().await? {
            if self.item_price(index).await?.is_none() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Every item shows a name
    pub async fn is_shown_all_item_title(&self) -> SauceResult<bool> {
        for index in 0..self.count_items().await? {
            if !self.has_title(index).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Every item shows a description
    pub async fn is_shown_all_item_description(&self) -> SauceResult<bool> {
        for index in 0..self.count_items().await? {
            if !self.has_description(index).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Cart controls
    // -------------------------------------------------------------------------

    /// Press "Add to cart" on the item
    ///
    /// # Errors
    ///
    /// Fails if the button is not visible within the critical bound
    pub async fn add_to_cart(&self, index: usize) -> SauceResult<()> {
        self.session
            .click(&Self::item(index).button_within(ADD_LABEL))
            .await
    }

    /// Press "Remove" on the item
    ///
    /// # Errors
    ///
    /// Fails if the button is not visible within the critical bound
    pub async fn remove_from_cart(&self, index: usize) -> SauceResult<()> {
        self.session
            .click(&Self::item(index).button_within(REMOVE_LABEL))
            .await
    }

    /// Whether the item's control reads "Remove" right now
    pub async fn is_item_added(&self, index: usize) -> SauceResult<bool> {
        self.session
            .is_visible(&Self::item(index).button_within(REMOVE_LABEL))
            .await
    }

    /// Whether the item's control reads "Add to cart" right now
    pub async fn is_item_removed(&self, index: usize) -> SauceResult<bool> {
        self.session
            .is_visible(&Self::item(index).button_within(ADD_LABEL))
            .await
    }

    /// Whether the control flips to "Remove" within the probe bound
    async fn flipped_to_remove(&self, index: usize) -> bool {
        self.session
            .probe_visible(&Self::item(index).button_within(REMOVE_LABEL))
            .await
    }

    /// Whether the control flips to "Add to cart" within the probe bound
    async fn flipped_to_add(&self, index: usize) -> bool {
        self.session
            .probe_visible(&Self::item(index).button_within(ADD_LABEL))
            .await
    }

    /// Add every item whose name contains one of `targets`
    /// (case-insensitive), checking that each add bumps the badge by one and
    /// flips the control. Items already in the cart are skipped.
    ///
    /// Returns the added items in display order.
    ///
    /// # Errors
    ///
    /// Fails if the listing never loads or an add button is missing
    pub async fn select_items(&self, targets: &[String]) -> SauceResult<CartSelection> {
        self.session.wait_visible(&Locator::css(ITEM).first()).await?;
        let targets: Vec<String> = targets.iter().map(|t| t.to_lowercase()).collect();
        let mut selection = CartSelection::new();

        for index in 0..self.count_items().await? {
            let name = self.item_name(index).await?;
            let lowered = name.to_lowercase();
            for target in &targets {
                if !lowered.contains(target.as_str()) || self.is_item_added(index).await? {
                    continue;
                }
                let before = self.cart_count().await;
                self.add_to_cart(index).await?;
                let after = self.cart_count().await;
                self.session.soft_eq(
                    &after,
                    &(before + 1),
                    &format!("Count badge should change from {before} to {}", before + 1),
                );
                let added = self.flipped_to_remove(index).await;
                self.session
                    .soft_true(added, "Button should change to 'Remove'");

                let price = self.item_price(index).await?.unwrap_or(Decimal::ZERO);
                tracing::debug!(%name, %price, "selected");
                selection.push(Item::new(name.clone(), price));
            }
        }

        tracing::info!(selected = selection.len(), "select items by name");
        Ok(selection)
    }

    /// Add the first `n` items in display order; items whose control does
    /// not flip to "Remove" are left out of the result
    ///
    /// # Errors
    ///
    /// Fails if the listing never loads or an add button is missing
    pub async fn select_item(&self, n: usize) -> SauceResult<CartSelection> {
        self.session.wait_visible(&Locator::css(ITEM).first()).await?;
        let count = self.count_items().await?;
        let mut selection = CartSelection::new();

        for index in 0..count.min(n) {
            self.add_to_cart(index).await?;
            if !self.flipped_to_remove(index).await {
                tracing::debug!(index, "add to cart did not stick");
                continue;
            }
            selection.push(self.read_item(index).await?);
        }

        Ok(selection)
    }

    /// Add then remove each item in turn; stops at the first mismatch of
    /// badge count or control state, recording it as a soft failure
    ///
    /// # Errors
    ///
    /// Fails if a cart button is missing
    pub async fn can_add_remove_to_cart(&self) -> SauceResult<bool> {
        for index in 0..self.count_items().await? {
            let mut expected = self.cart_count().await;

            self.add_to_cart(index).await?;
            expected += 1;
            let added = self.cart_count().await;
            if added != expected {
                self.session.soft_eq(
                    &added,
                    &expected,
                    &format!("Count badge should change from {} to {expected}", expected - 1),
                );
                return Ok(false);
            }
            if !self.flipped_to_remove(index).await {
                self.session.soft_fail("Button should change to 'Remove'");
                return Ok(false);
            }

            self.remove_from_cart(index).await?;
            expected -= 1;
            let removed = self.cart_count().await;
            if removed != expected {
                self.session.soft_eq(
                    &removed,
                    &expected,
                    &format!("Count badge should change from {} to {expected}", expected + 1),
                );
                return Ok(false);
            }
            if !self.flipped_to_add(index).await {
                self.session.soft_fail("Button should change to 'Add to cart'");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Add every item, then remove every item, tracking the expected badge
    /// count. Mismatches are recorded as soft failures and the expected count
    /// resyncs to what is displayed; the scan always runs to the end.
    ///
    /// # Errors
    ///
    /// Fails if a cart button is missing
    pub async fn can_add_and_remove_all(&self) -> SauceResult<bool> {
        let count = self.count_items().await?;
        let mut expected = self.cart_count().await;
        let mut clean = true;

        for index in 0..count {
            self.add_to_cart(index).await?;
            expected += 1;
            let shown = self.cart_count().await;
            if shown != expected {
                self.session.soft_eq(
                    &shown,
                    &expected,
                    &format!("Count badge should change from {} to {expected}", expected - 1),
                );
                clean = false;
                expected = shown;
            }
            if !self.flipped_to_remove(index).await {
                self.session.soft_fail("Button should change to 'Remove'");
                clean = false;
            }
        }

        for index in 0..count {
            self.remove_from_cart(index).await?;
            expected = expected.saturating_sub(1);
            let shown = self.cart_count().await;
            if shown != expected {
                self.session.soft_eq(
                    &shown,
                    &expected,
                    &format!("Count badge should change from {} to {expected}", expected + 1),
                );
                clean = false;
                expected = shown;
            }
            if !self.flipped_to_add(index).await {
                self.session.soft_fail("Button should change to 'Add to cart'");
                clean = false;
            }
        }

        Ok(clean)
    }

    /// Click the cart icon and require the browser to leave this page
    ///
    /// # Errors
    ///
    /// Fails if the icon is missing or the URL does not change
    pub async fn go_to_cart_page(&self) -> SauceResult<()> {
        self.session.click(&Locator::css(CART_ICON)).await?;
        ensure(self.wait_until_left().await, "Should leave the inventory page")
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Choose a sort mode and require the control to show its label
    ///
    /// # Errors
    ///
    /// Fails if the control is missing or shows another label
    pub async fn select_sort(&self, mode: SortMode) -> SauceResult<()> {
        let select = Locator::css(SORT_SELECT);
        self.session.wait_visible(&select).await?;
        self.session
            .driver()
            .select_option(&select, mode.value())
            .await?;
        let active = self.session.text(&Locator::css(SORT_ACTIVE)).await?;
        ensure(
            active.contains(mode.label()),
            format!("Active sort should read {:?}, got {active:?}", mode.label()),
        )
    }

    /// Item names in display order
    pub async fn item_names(&self) -> SauceResult<Vec<String>> {
        let mut names = Vec::new();
        for index in 0..self.count_items().await? {
            names.push(self.item_name(index).await?);
        }
        Ok(names)
    }

    /// Item prices in display order; unreadable prices read as zero
    pub async fn item_prices(&self) -> SauceResult<Vec<Decimal>> {
        let mut prices = Vec::new();
        for index in 0..self.count_items().await? {
            prices.push(self.item_price(index).await?.unwrap_or(Decimal::ZERO));
        }
        Ok(prices)
    }

    /// Whether the displayed order satisfies `mode`
    pub async fn is_sorted(&self, mode: SortMode) -> SauceResult<bool> {
        if self.count_items().await? <= 1 {
            return Ok(true);
        }
        let sorted = match mode {
            SortMode::NameAscending | SortMode::NameDescending => {
                names_sorted(&self.item_names().await?, mode.is_descending())
            }
            SortMode::PriceAscending | SortMode::PriceDescending => {
                prices_sorted(&self.item_prices().await?, mode.is_descending())
            }
        };
        Ok(sorted)
    }

    /// Names ascend
    pub async fn is_sort_a_to_z(&self) -> SauceResult<bool> {
        self.is_sorted(SortMode::NameAscending).await
    }

    /// Names descend
    pub async fn is_sort_z_to_a(&self) -> SauceResult<bool> {
        self.is_sorted(SortMode::NameDescending).await
    }

    /// Prices ascend
    pub async fn is_sort_low_to_high(&self) -> SauceResult<bool> {
        self.is_sorted(SortMode::PriceAscending).await
    }

    /// Prices descend
    pub async fn is_sort_high_to_low(&self) -> SauceResult<bool> {
        self.is_sorted(SortMode::PriceDescending).await
    }
}

impl<'s, D: PageDriver> NavigablePage for InventoryPage<'s, D> {
    type Driver = D;
    const PATH: &'static str = "/inventory.html";

    fn session(&self) -> &Session<D> {
        self.session
    }

    fn ready_marker(&self) -> Locator {
        Locator::css(TITLE).text_within(TITLE_TEXT)
    }

    fn page_name(&self) -> &'static str {
        "inventory"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    mod sort_mode {
        use super::*;

        #[test]
        fn test_values_and_labels() {
            assert_eq!(SortMode::NameAscending.value(), "az");
            assert_eq!(SortMode::NameDescending.label(), "Name (Z to A)");
            assert_eq!(SortMode::PriceAscending.label(), "Price (low to high)");
            assert_eq!(SortMode::PriceDescending.value(), "hilo");
        }

        #[test]
        fn test_from_str_round_trips_all() {
            for mode in SortMode::ALL {
                assert_eq!(mode.value().parse::<SortMode>().unwrap(), mode);
            }
            assert!("price".parse::<SortMode>().is_err());
        }

        #[test]
        fn test_serde_uses_short_values() {
            let json = serde_json::to_string(&SortMode::PriceDescending).unwrap();
            assert_eq!(json, "\"hilo\"");
        }
    }

    mod ordering {
        use super::*;

        #[test]
        fn test_locale_compare_ignores_case_first() {
            assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
            assert_eq!(locale_compare("Zebra", "apple"), Ordering::Greater);
            assert_eq!(locale_compare("same", "same"), Ordering::Equal);
        }

        #[test]
        fn test_locale_compare_lowercase_first_on_tie() {
            assert_eq!(locale_compare("a", "A"), Ordering::Less);
            assert_eq!(locale_compare("Sauce", "sauce"), Ordering::Greater);
        }

        #[test]
        fn test_punctuation_sorts_before_digits_and_letters() {
            assert_eq!(locale_compare("a_b", "a1b"), Ordering::Less);
            assert_eq!(locale_compare("a1b", "aab"), Ordering::Less);
            assert_eq!(locale_compare("T-Shirt", "T1"), Ordering::Less);
            assert!(names_sorted(&names(&["a_b", "a1b", "ab"]), false));
        }

        #[test]
        fn test_accents_only_break_ties() {
            assert_eq!(locale_compare("éclair", "fig"), Ordering::Less);
            assert_eq!(locale_compare("eclair", "éclair"), Ordering::Less);
            assert_eq!(locale_compare("éclair", "eclairs"), Ordering::Less);
            assert!(names_sorted(&names(&["éclair", "fig"]), false));
            assert!(!names_sorted(&names(&["fig", "éclair"]), false));
        }

        #[test]
        fn test_storefront_names_ascending() {
            let listing = names(&[
                "Sauce Labs Backpack",
                "Sauce Labs Bike Light",
                "Sauce Labs Bolt T-Shirt",
                "Sauce Labs Fleece Jacket",
                "Sauce Labs Onesie",
                "Test.allTheThings() T-Shirt (Red)",
            ]);
            assert!(names_sorted(&listing, false));
            assert!(!names_sorted(&listing, true));
        }

        #[test]
        fn test_first_out_of_order_pair_fails() {
            assert!(!names_sorted(&names(&["b", "a", "c"]), false));
            assert!(!prices_sorted(&[dec!(7.99), dec!(29.99), dec!(9.99)], false));
            assert!(prices_sorted(&[dec!(49.99), dec!(15.99), dec!(15.99)], true));
        }

        #[test]
        fn test_short_listings_are_sorted() {
            assert!(names_sorted(&[], false));
            assert!(names_sorted(&names(&["only"]), true));
            assert!(prices_sorted(&[], true));
            assert!(prices_sorted(&[dec!(1)], false));
        }
    }

    proptest! {
        #[test]
        fn prop_sorted_names_pass_both_directions(mut list in proptest::collection::vec("[a-zA-Z .()-]{0,12}", 0..12)) {
            list.sort_by(|a, b| locale_compare(a, b));
            prop_assert!(names_sorted(&list, false));
            list.reverse();
            prop_assert!(names_sorted(&list, true));
        }

        #[test]
        fn prop_sorted_prices_pass_both_directions(mut cents in proptest::collection::vec(0i64..100_000, 0..12)) {
            cents.sort_unstable();
            let mut prices: Vec<Decimal> = cents.iter().map(|c| Decimal::new(*c, 2)).collect();
            prop_assert!(prices_sorted(&prices, false));
            prices.reverse();
            prop_assert!(prices_sorted(&prices, true));
        }

        #[test]
        fn prop_short_price_listing_is_vacuously_sorted(cents in proptest::option::of(0i64..100_000), descending: bool) {
            let prices: Vec<Decimal> = cents.into_iter().map(|c| Decimal::new(c, 2)).collect();
            prop_assert!(prices_sorted(&prices, descending));
        }
    }
}
