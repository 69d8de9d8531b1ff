//! Page-by-page UI suite (`TC-001`..`TC-034`).
//!
//! Every case starts from a fresh session. Groups that need a filled cart
//! build it in the case itself so the selection is at hand for the checks.

use crate::assertion::{ensure, ensure_eq};
use crate::config::{Credentials, CustomerInfo, TestData};
use crate::driver::PageDriver;
use crate::fixture::Session;
use crate::harness::{TestGroup, TestSuite};
use crate::item::CartSelection;
use crate::money::{grand_total, sum_prices, tax_for};
use crate::page_object::NavigablePage;
use crate::pages::{
    FormState, SortMode, SubmitOutcome, COMPLETE_HEADER, COMPLETE_TEXT, COMPLETE_TITLE,
};
use crate::result::SauceResult;
use futures::FutureExt;
use std::sync::Arc;

/// Title of the UI suite in reports
pub const UI_SUITE_TITLE: &str = "ui.spec";

/// Build the UI suite over `data`
pub fn ui_suite<D: PageDriver + 'static>(data: &TestData) -> TestSuite<Session<D>> {
    let data = Arc::new(data.clone());
    TestSuite::new(UI_SUITE_TITLE)
        .group(login_group(&data))
        .group(product_group(&data))
        .group(cart_group(&data))
        .group(information_group(&data))
        .group(overview_group(&data))
        .group(complete_group(&data))
}

// =============================================================================
// Setup
// =============================================================================

/// Open the login page and submit `user` without judging the outcome
async fn sign_in<D: PageDriver>(session: &Session<D>, user: &Credentials) -> SauceResult<()> {
    let login = &session.pages().login;
    login.goto().await?;
    login.fill_username(&user.username).await?;
    login.fill_password(&user.password).await?;
    login.click_login().await
}

/// Signed in, on the inventory page
async fn open_inventory<D: PageDriver>(session: &Session<D>, data: &TestData) -> SauceResult<()> {
    sign_in(session, &data.suite_user).await?;
    session.pages().inventory.goto().await
}

/// Signed in with a few items in the cart, on the cart page
async fn open_cart<D: PageDriver>(session: &Session<D>, data: &TestData) -> SauceResult<CartSelection> {
    open_inventory(session, data).await?;
    let inventory = &session.pages().inventory;
    let selection = inventory.select_item(data.preselect_count).await?;
    inventory.go_to_cart_page().await?;
    Ok(selection)
}

async fn open_information<D: PageDriver>(session: &Session<D>, data: &TestData) -> SauceResult<CartSelection> {
    let selection = open_cart(session, data).await?;
    session.pages().cart.go_to_checkout().await?;
    Ok(selection)
}

async fn open_overview<D: PageDriver>(session: &Session<D>, data: &TestData) -> SauceResult<CartSelection> {
    let selection = open_cart(session, data).await?;
    session.pages().checkout_overview.goto().await?;
    Ok(selection)
}

async fn open_complete<D: PageDriver>(session: &Session<D>, data: &TestData) -> SauceResult<()> {
    open_information(session, data).await?;
    let pages = session.pages();
    pages.checkout_information.fill_information(&data.customer).await?;
    pages.checkout_information.go_to_checkout_overview_page().await?;
    pages.checkout_overview.go_to_checkout_complete_page().await?;
    pages.checkout_complete.goto().await
}

// =============================================================================
// LOGIN PAGE
// =============================================================================

fn login_group<D: PageDriver + 'static>(data: &Arc<TestData>) -> TestGroup<Session<D>> {
    let mut group = TestGroup::new("LOGIN PAGE")
        .before_each(|s: &Session<D>| open_login(s).boxed())
        .case(
            "TC-001: Input fields display as the data that was filled",
            with_data!(data, tc_001),
        )
        .case(
            "TC-002: Show an error message if attempting to log in without a username",
            with_data!(data, tc_002),
        )
        .case(
            "TC-003: Show an error message if attempting to log in without a password",
            with_data!(data, tc_003),
        )
        .case(
            "TC-004: Show an error message if attempting to log in with both fields blank",
            |s: &Session<D>| tc_004(s).boxed(),
        );

    for user in &data.valid_users {
        let title = format!(
            "TC-005: Should logged in successfully with valid credentials :\"{}\"",
            user.username
        );
        let user = user.clone();
        group = group.case(title, move |s: &Session<D>| tc_005(s, user.clone()).boxed());
    }
    for user in &data.locked_users {
        let title = format!(
            "TC-006: Should logged in fails with a error message when using locked credentials :\"{}\"",
            user.username
        );
        let user = user.clone();
        group = group.case(title, move |s: &Session<D>| tc_006(s, user.clone()).boxed());
    }
    group
}

async fn open_login<D: PageDriver>(s: &Session<D>) -> SauceResult<()> {
    let login = &s.pages().login;
    login.goto().await?;
    let valid = login.is_valid_page().await?;
    s.soft_true(valid, "Login page should be valid");
    Ok(())
}

async fn tc_001<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    let login = &s.pages().login;
    login.fill_username(&data.suite_user.username).await?;
    login.fill_password(&data.suite_user.password).await
}

async fn tc_002<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    let login = &s.pages().login;
    login.fill_password(&data.suite_user.password).await?;
    login.click_login().await?;
    let message = login.error_message().await;
    ensure(
        message.contains("Username is required"),
        format!("Error should ask for a username, got {message:?}"),
    )
}

async fn tc_003<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    let login = &s.pages().login;
    login.fill_username(&data.suite_user.username).await?;
    login.click_login().await?;
    let message = login.error_message().await;
    ensure(
        message.contains("Password is required"),
        format!("Error should ask for a password, got {message:?}"),
    )
}

async fn tc_004<D: PageDriver>(s: &Session<D>) -> SauceResult<()> {
    let login = &s.pages().login;
    login.fill_username("").await?;
    login.fill_password("").await?;
    login.click_login().await?;
    let message = login.error_message().await;
    ensure(
        message.contains("Username is required"),
        format!("Error should ask for a username, got {message:?}"),
    )
}

async fn tc_005<D: PageDriver>(s: &Session<D>, user: Credentials) -> SauceResult<()> {
    let login = &s.pages().login;
    login.fill_username(&user.username).await?;
    login.fill_password(&user.password).await?;
    login.click_login().await?;
    ensure_eq(&login.error_message().await, &String::new(), "Login error")?;
    ensure(!login.is_valid_url().await, "Should leave the login page")
}

async fn tc_006<D: PageDriver>(s: &Session<D>, user: Credentials) -> SauceResult<()> {
    let login = &s.pages().login;
    login.fill_username(&user.username).await?;
    login.fill_password(&user.password).await?;
    login.click_login().await?;
    let message = login.error_message().await;
    ensure(
        message.contains("user has been locked out"),
        format!("Error should report the lock, got {message:?}"),
    )?;
    ensure(login.is_valid_url().await, "Should stay on the login page")
}

// =============================================================================
// PRODUCT PAGE
// =============================================================================

fn product_group<D: PageDriver + 'static>(data: &Arc<TestData>) -> TestGroup<Session<D>> {
    let setup = Arc::clone(data);
    TestGroup::new("PRODUCT PAGE")
        .before_each(move |s: &Session<D>| {
            let data = Arc::clone(&setup);
            async move { open_inventory(s, &data).await }.boxed()
        })
        .case("TC-007: More than 0 products are displayed", |s: &Session<D>| tc_007(s).boxed())
        .case("TC-008: Each Item displays a picture", |s: &Session<D>| tc_008(s).boxed())
        .case("TC-009: Each item displays a price", |s: &Session<D>| tc_009(s).boxed())
        .case("TC-010: Each item displays a title", |s: &Session<D>| tc_010(s).boxed())
        .case("TC-011: Each item displays a description", |s: &Session<D>| tc_011(s).boxed())
        .case(
            "TC-012: Add all items to the cart, then remove all items from the cart",
            |s: &Session<D>| tc_012(s).boxed(),
        )
        .case("TC-013: items are sorted by title from A to Z", |s: &Session<D>| {
            tc_sort(s, SortMode::NameAscending).boxed()
        })
        .case("TC-014: items are sorted by title from Z to A", |s: &Session<D>| {
            tc_sort(s, SortMode::NameDescending).boxed()
        })
        .case("TC-015: items are sorted by price from low to high", |s: &Session<D>| {
            tc_sort(s, SortMode::PriceAscending).boxed()
        })
        .case("TC-016: items are sorted by price from high to low", |s: &Session<D>| {
            tc_sort(s, SortMode::PriceDescending).boxed()
        })
        .case(
            "TC-017: Navigate to the cart page when clicking the cart icon",
            |s: &Session<D>| tc_017(s).boxed(),
        )
}

async fn tc_007<D: PageDriver>(s: &Session<D>) -> SauceResult<()> {
    let count = s.pages().inventory.count_items().await?;
    ensure(count > 0, "Inventory should list products")
}

async fn tc_008<D: PageDriver>(s: &Session<D>) -> SauceResult<()> {
    ensure(
        s.pages().inventory.is_shown_all_item_image().await?,
        "Every item should show a picture",
    )
}

async fn tc_009<D: PageDriver>(s: &Session<D>) -> SauceResult<()> {
    ensure(
        s.pages().inventory.is_shown_all_item_price().await?,
        "Every item should show a price",
    )
}

async fn tc_010<D: PageDriver>(s: &Session<D>) -> SauceResult<()> {
    ensure(
        s.pages().inventory.is_shown_all_item_title().await?,
        "Every item should show a title",
    )
}

async fn tc_011<D: PageDriver>(s: &Session<D>) -> SauceResult<()> {
    ensure(
        s.pages().inventory.is_shown_all_item_description().await?,
        "Every item should show a description",
    )
}

async fn tc_012<D: PageDriver>(s: &Session<D>) -> SauceResult<()> {
    ensure(
        s.pages().inventory.can_add_and_remove_all().await?,
        "Every item should add and remove cleanly",
    )
}

async fn tc_sort<D: PageDriver>(s: &Session<D>, mode: SortMode) -> SauceResult<()> {
    let inventory = &s.pages().inventory;
    inventory.select_sort(mode).await?;
    ensure(
        inventory.is_sorted(mode).await?,
        format!("Items should be sorted {}", mode.label()),
    )
}

async fn tc_017<D: PageDriver>(s: &Session<D>) -> SauceResult<()> {
    let pages = s.pages();
    pages.inventory.go_to_cart_page().await?;
    ensure(pages.cart.is_valid_page().await?, "Cart page should be valid")
}

// =============================================================================
// CART PAGE
// =============================================================================

fn cart_group<D: PageDriver + 'static>(data: &Arc<TestData>) -> TestGroup<Session<D>> {
    TestGroup::new("CART PAGE")
        .case(
            "TC-018: Display the number of items as the cart badge number",
            with_data!(data, tc_018),
        )
        .case(
            "TC-019: Item name and price match the selection from the product page",
            with_data!(data, tc_019),
        )
        .case(
            "TC-020: When clicking \"Remove\", the item should be removed from the cart",
            with_data!(data, tc_020),
        )
        .case(
            "TC-021: When clicking \"Continue Shopping\", navigate back to the product page",
            with_data!(data, tc_021),
        )
        .case(
            "TC-022: When clicking \"Checkout\", proceed to the checkout information page",
            with_data!(data, tc_022),
        )
}

async fn tc_018<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    open_cart(s, &data).await?;
    ensure(
        s.pages().cart.is_cart_badge_equal_to_item().await?,
        "Badge should equal the number of cart rows",
    )
}

async fn tc_019<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    let selection = open_cart(s, &data).await?;
    ensure(
        s.pages().cart.is_cart_match_cart_item(&selection).await?,
        "Cart should list the selected items",
    )
}

async fn tc_020<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    open_cart(s, &data).await?;
    let cart = &s.pages().cart;
    cart.remove_all_items().await?;
    ensure_eq(&cart.cart_count().await, &0, "Cart badge")?;
    ensure_eq(&cart.count_items().await?, &0, "Cart rows")
}

async fn tc_021<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    open_cart(s, &data).await?;
    let pages = s.pages();
    pages.cart.go_to_continue_shopping().await?;
    ensure(pages.inventory.is_valid_url().await, "Should be back on the inventory page")
}

async fn tc_022<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    open_cart(s, &data).await?;
    let pages = s.pages();
    pages.cart.go_to_checkout().await?;
    ensure(
        pages.checkout_information.is_valid_url().await,
        "Should be on the checkout information page",
    )
}

// =============================================================================
// CHECKOUT INFORMATION PAGE
// =============================================================================

fn information_group<D: PageDriver + 'static>(data: &Arc<TestData>) -> TestGroup<Session<D>> {
    TestGroup::new("CHECKOUT INFORMATION PAGE")
        .case(
            "TC-023: When clicking \"Cancel\", navigate back to the cart page",
            with_data!(data, tc_023),
        )
        .case(
            "TC-024: When clicking \"Continue\" without any client information, display an error message",
            with_data!(data, tc_024),
        )
        .case(
            "TC-025: When clicking \"Continue\" with some client information, display an error message",
            with_data!(data, tc_025),
        )
        .case(
            "TC-026: When clicking \"Continue\" with all client information, proceed to the checkout overview page",
            with_data!(data, tc_026),
        )
}

/// The five ways to leave at least one required field blank while filling
/// another
fn partial_forms(customer: &CustomerInfo) -> Vec<CustomerInfo> {
    let form = |first: &str, last: &str, post: &str| CustomerInfo {
        first_name: first.to_string(),
        last_name: last.to_string(),
        post_code: post.to_string(),
    };
    let (first, last, post) = (
        customer.first_name.as_str(),
        customer.last_name.as_str(),
        customer.post_code.as_str(),
    );
    vec![
        form(first, "", ""),
        form("", last, ""),
        form("", "", post),
        form(first, "", post),
        form(first, last, ""),
    ]
}

async fn tc_023<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    open_information(s, &data).await?;
    let pages = s.pages();
    pages.checkout_information.go_to_cancel().await?;
    ensure(pages.cart.is_valid_url().await, "Should be back on the cart page")
}

async fn tc_024<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    open_information(s, &data).await?;
    let information = &s.pages().checkout_information;
    information.go_to_continue().await?;
    ensure(
        information.is_found_error_message().await,
        "Should show error message",
    )
}

async fn tc_025<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    open_information(s, &data).await?;
    let information = &s.pages().checkout_information;
    for form in partial_forms(&data.customer) {
        let state = FormState::of_customer(&form);
        s.soft_eq(
            &state.expected_outcome(),
            &SubmitOutcome::ErrorShown,
            "partial form should be rejected",
        );
        information.goto().await?;
        information.fill_information(&form).await?;
        information.go_to_continue().await?;
        let shown = information.is_found_error_message().await;
        s.soft_true(shown, &format!("Should show error message for {state:?} form {form:?}"));
        s.soft_true(
            information.is_valid_url().await,
            "Should stay on the checkout information page",
        );
    }
    Ok(())
}

async fn tc_026<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    open_information(s, &data).await?;
    let pages = s.pages();
    pages.checkout_information.fill_information(&data.customer).await?;
    pages.checkout_information.go_to_checkout_overview_page().await?;
    ensure(
        pages.checkout_overview.is_valid_url().await,
        "Should be on the checkout overview page",
    )
}

// =============================================================================
// CHECKOUT OVERVIEW PAGE
// =============================================================================

fn overview_group<D: PageDriver + 'static>(data: &Arc<TestData>) -> TestGroup<Session<D>> {
    TestGroup::new("CHECKOUT OVERVIEW PAGE")
        .case(
            "TC-027: Display the number of items as the cart badge number",
            with_data!(data, tc_027),
        )
        .case(
            "TC-028: Item name and price match the selection from the product page",
            with_data!(data, tc_028),
        )
        .case(
            "TC-029: Correctly calculate the total, tax, and grand total",
            with_data!(data, tc_029),
        )
        .case(
            "TC-030: When clicking \"Cancel\", navigate back to the product page",
            with_data!(data, tc_030),
        )
        .case(
            "TC-031: When clicking \"Finish\", process to the checkout complete page",
            with_data!(data, tc_031),
        )
}

async fn tc_027<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    open_overview(s, &data).await?;
    let overview = &s.pages().checkout_overview;
    let badge = overview.cart_count().await as usize;
    ensure_eq(&badge, &overview.count_items().await?, "Badge against overview rows")
}

async fn tc_028<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    let selection = open_overview(s, &data).await?;
    ensure(
        s.pages().checkout_overview.is_corrected_cart_item(&selection).await?,
        "Overview should list the selected items",
    )
}

async fn tc_029<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    let selection = open_overview(s, &data).await?;
    let overview = &s.pages().checkout_overview;
    let rate = s.config().tax_rate;
    let total = sum_prices(&selection);

    let tax = tax_for(total, rate);
    let with_tax = grand_total(total, rate);
    s.soft_eq(&overview.subtotal().await?, &Some(total), &format!("Total price :{total}"));
    s.soft_eq(&overview.tax().await?, &Some(tax), &format!("Tax :{tax}"));
    s.soft_eq(
        &overview.grand_total().await?,
        &Some(with_tax),
        &format!("Total price with tax :{with_tax}"),
    );
    Ok(())
}

async fn tc_030<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    open_overview(s, &data).await?;
    let pages = s.pages();
    pages.checkout_overview.go_to_cancel().await?;
    ensure(pages.inventory.is_valid_url().await, "Should be back on the inventory page")
}

async fn tc_031<D: PageDriver>(s: &Session<D>, data: Arc<TestData>) -> SauceResult<()> {
    open_overview(s, &data).await?;
    let pages = s.pages();
    pages.checkout_overview.go_to_checkout_complete_page().await?;
    ensure(
        pages.checkout_complete.is_valid_url().await,
        "Should be on the checkout complete page",
    )
}

// =============================================================================
// CHECKOUT COMPLETE PAGE
// =============================================================================

fn complete_group<D: PageDriver + 'static>(data: &Arc<TestData>) -> TestGroup<Session<D>> {
    let setup = Arc::clone(data);
    TestGroup::new("CHECKOUT COMPLETE PAGE")
        .before_each(move |s: &Session<D>| {
            let data = Arc::clone(&setup);
            async move { open_complete(s, &data).await }.boxed()
        })
        .case("TC-032: Remove the cart badge number", |s: &Session<D>| tc_032(s).boxed())
        .case("TC-033: Display the complete message correctly", |s: &Session<D>| tc_033(s).boxed())
        .case(
            "TC-034: When clicking \"Back Home\", navigate back to the product page",
            |s: &Session<D>| tc_034(s).boxed(),
        )
}

async fn tc_032<D: PageDriver>(s: &Session<D>) -> SauceResult<()> {
    ensure_eq(&s.pages().checkout_complete.cart_count().await, &0, "Cart badge")
}

async fn tc_033<D: PageDriver>(s: &Session<D>) -> SauceResult<()> {
    let complete = &s.pages().checkout_complete;
    s.soft_eq(&complete.title_text().await?.as_str(), &COMPLETE_TITLE, "Title");
    s.soft_eq(&complete.complete_header_text().await?.as_str(), &COMPLETE_HEADER, "Header");
    s.soft_eq(&complete.complete_text().await?.as_str(), &COMPLETE_TEXT, "Message");
    Ok(())
}

async fn tc_034<D: PageDriver>(s: &Session<D>) -> SauceResult<()> {
    let pages = s.pages();
    pages.checkout_complete.go_to_home_page().await?;
    ensure(pages.inventory.is_valid_url().await, "Should be back on the inventory page")
}
