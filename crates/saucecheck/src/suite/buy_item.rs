//! Purchase scenario: one buyer walks from login to the order confirmation.
//!
//! The steps run serially on one [`Purchase`] context, which carries the
//! selection made on the inventory page through cart and checkout.

use crate::config::TestData;
use crate::driver::PageDriver;
use crate::fixture::Session;
use crate::harness::{CaseContext, TestGroup, TestSuite};
use crate::item::CartSelection;
use crate::money::sum_prices;
use crate::page_object::NavigablePage;
use crate::pages::{COMPLETE_HEADER, COMPLETE_TEXT};
use crate::result::SauceResult;
use async_trait::async_trait;
use futures::FutureExt;
use std::sync::{Arc, Mutex, PoisonError};

/// Title of the purchase suite in reports
pub const BUY_ITEM_SUITE_TITLE: &str = "buy-item.spec";

/// Scenario title; step titles are prefixed with it
pub const BUY_ITEM_SCENARIO: &str = "Buy item from search";

/// Session plus the state threaded between purchase steps
#[derive(Debug)]
pub struct Purchase<D> {
    session: Session<D>,
    data: Arc<TestData>,
    selection: Mutex<CartSelection>,
}

impl<D: PageDriver> Purchase<D> {
    /// Start a purchase on `session` with `data`
    pub fn new(session: Session<D>, data: Arc<TestData>) -> Self {
        Self {
            session,
            data,
            selection: Mutex::new(Vec::new()),
        }
    }

    /// Underlying session
    pub fn session(&self) -> &Session<D> {
        &self.session
    }

    /// Items picked so far
    pub fn selection(&self) -> CartSelection {
        self.selection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_selection(&self, items: CartSelection) {
        *self.selection.lock().unwrap_or_else(PoisonError::into_inner) = items;
    }
}

#[async_trait]
impl<D: PageDriver> CaseContext for Purchase<D> {
    fn finish(&self) -> SauceResult<()> {
        self.session.finish()
    }

    async fn close(&self) -> SauceResult<()> {
        self.session.close().await
    }
}

/// Build the purchase suite
pub fn buy_item_suite<D: PageDriver + 'static>() -> TestSuite<Purchase<D>> {
    let step = |name: &str| format!("{BUY_ITEM_SCENARIO} > {name}");
    let group = TestGroup::new("Buy item")
        .serial()
        .case(step("Log in"), |p: &Purchase<D>| log_in(p).boxed())
        .case(step("Navigate to the product page"), |p: &Purchase<D>| {
            open_inventory(p).boxed()
        })
        .case(step("Search for an item and add it to the cart"), |p: &Purchase<D>| {
            search_and_add(p).boxed()
        })
        .case(step("Is item found"), |p: &Purchase<D>| item_found(p).boxed())
        .case(step("Proceed to the cart page"), |p: &Purchase<D>| {
            leave_inventory(p).boxed()
        })
        .case(step("Navigate to the cart page"), |p: &Purchase<D>| open_cart(p).boxed())
        .case(step("Verify the item count matches the badge number"), |p: &Purchase<D>| {
            badge_matches(p).boxed()
        })
        .case(step("Verify the item count matches the item element"), |p: &Purchase<D>| {
            rows_match(p).boxed()
        })
        .case(
            step("Confirm the item name and price are displayed correctly"),
            |p: &Purchase<D>| adjust_cart(p).boxed(),
        )
        .case(step("Proceed to the checkout information page"), |p: &Purchase<D>| {
            leave_cart(p).boxed()
        })
        .case(step("Navigate to the checkout information page"), |p: &Purchase<D>| {
            open_information(p).boxed()
        })
        .case(step("Fill in the client information"), |p: &Purchase<D>| {
            fill_information(p).boxed()
        })
        .case(step("Proceed to the checkout overview page"), |p: &Purchase<D>| {
            leave_information(p).boxed()
        })
        .case(step("Navigate to the checkout overview page"), |p: &Purchase<D>| {
            open_overview(p).boxed()
        })
        .case(step("Verify the cart item list"), |p: &Purchase<D>| {
            verify_overview_items(p).boxed()
        })
        .case(step("Confirm the price is calculated correctly"), |p: &Purchase<D>| {
            verify_prices(p).boxed()
        })
        .case(step("Proceed to the checkout complete page"), |p: &Purchase<D>| {
            leave_overview(p).boxed()
        })
        .case(step("Navigate to the checkout complete page"), |p: &Purchase<D>| {
            open_complete(p).boxed()
        })
        .case(step("Verify the completion message is displayed"), |p: &Purchase<D>| {
            verify_message(p).boxed()
        })
        .case(step("Return to the product page"), |p: &Purchase<D>| return_home(p).boxed());

    TestSuite::new(BUY_ITEM_SUITE_TITLE).group(group)
}

async fn log_in<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let s = &p.session;
    let login = &s.pages().login;
    login.goto().await?;
    s.soft_true(login.is_valid_page().await?, "Login page should be valid");
    login.login(&p.data.buyer.username, &p.data.buyer.password).await?;
    s.soft_true(!login.is_valid_url().await, "Should leave the login page");
    Ok(())
}

async fn open_inventory<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let inventory = &p.session.pages().inventory;
    inventory.goto().await?;
    p.session
        .soft_true(inventory.is_valid_page().await?, "Inventory page should be valid");
    Ok(())
}

async fn search_and_add<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let inventory = &p.session.pages().inventory;
    p.session
        .soft_true(inventory.is_valid_page().await?, "correct page");
    let selection = inventory.select_items(&p.data.search_items).await?;
    tracing::info!(found = selection.len(), "items selected");
    p.set_selection(selection);
    Ok(())
}

async fn item_found<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let found = p.selection().len();
    p.session.soft_true(found > 0, &format!("Found {found} item"));
    Ok(())
}

async fn leave_inventory<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let inventory = &p.session.pages().inventory;
    inventory.go_to_cart_page().await?;
    p.session
        .soft_true(!inventory.is_valid_url().await, "Should leave the inventory page");
    Ok(())
}

async fn open_cart<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let cart = &p.session.pages().cart;
    cart.goto().await?;
    p.session
        .soft_true(cart.is_valid_page().await?, "Cart page should be valid");
    Ok(())
}

async fn badge_matches<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let badge = p.session.pages().cart.cart_count().await as usize;
    p.session
        .soft_eq(&badge, &p.selection().len(), "Cart badge against selection");
    Ok(())
}

async fn rows_match<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let rows = p.session.pages().cart.count_items().await?;
    p.session
        .soft_eq(&rows, &p.selection().len(), "Cart rows against selection");
    Ok(())
}

async fn adjust_cart<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    p.session
        .pages()
        .cart
        .adjust_cart_item(&p.selection())
        .await
}

async fn leave_cart<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let cart = &p.session.pages().cart;
    cart.go_to_checkout().await?;
    crate::assertion::ensure(!cart.is_valid_url().await, "Should leave the cart page")
}

async fn open_information<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let information = &p.session.pages().checkout_information;
    information.goto().await?;
    p.session.soft_true(
        information.is_valid_page().await?,
        "Checkout information page should be valid",
    );
    Ok(())
}

async fn fill_information<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    p.session
        .pages()
        .checkout_information
        .fill_information(&p.data.customer)
        .await
}

async fn leave_information<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let information = &p.session.pages().checkout_information;
    information.go_to_checkout_overview_page().await?;
    p.session.soft_true(
        !information.is_valid_url().await,
        "Should leave the checkout information page",
    );
    Ok(())
}

async fn open_overview<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let overview = &p.session.pages().checkout_overview;
    overview.goto().await?;
    p.session
        .soft_true(overview.is_valid_page().await?, "Overview page should be valid");
    Ok(())
}

async fn verify_overview_items<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let corrected = p
        .session
        .pages()
        .checkout_overview
        .is_corrected_cart_item(&p.selection())
        .await?;
    p.session.soft_true(corrected, "Incorrect cart item list");
    Ok(())
}

async fn verify_prices<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let overview = &p.session.pages().checkout_overview;
    let total = sum_prices(&p.selection());
    p.session.soft_true(
        overview.is_corrected_total_price(total).await?,
        "Incorrect total price",
    );
    p.session.soft_true(
        overview.is_corrected_grand_total_price(total).await?,
        "Incorrect grand total",
    );
    p.session
        .soft_true(overview.is_corrected_tax(total).await?, "Incorrect tax");
    Ok(())
}

async fn leave_overview<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let overview = &p.session.pages().checkout_overview;
    overview.go_to_checkout_complete_page().await?;
    p.session
        .soft_true(!overview.is_valid_url().await, "Should leave the overview page");
    Ok(())
}

async fn open_complete<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let complete = &p.session.pages().checkout_complete;
    complete.goto().await?;
    p.session
        .soft_true(complete.is_valid_page().await?, "Complete page should be valid");
    Ok(())
}

async fn verify_message<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let complete = &p.session.pages().checkout_complete;
    let header = complete.complete_header_text().await?;
    p.session.soft_eq(&header.as_str(), &COMPLETE_HEADER, "Header");
    let text = complete.complete_text().await?;
    p.session.soft_eq(&text.as_str(), &COMPLETE_TEXT, "Message");
    Ok(())
}

async fn return_home<D: PageDriver>(p: &Purchase<D>) -> SauceResult<()> {
    let pages = p.session.pages();
    pages.checkout_complete.go_to_home_page().await?;
    p.session.soft_true(
        pages.inventory.is_valid_page().await?,
        "Inventory page should be valid",
    );
    Ok(())
}
