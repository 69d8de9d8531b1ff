//! In-memory Swag Labs storefront.
//!
//! [`StoreSimulator`] keeps the store state (session user, cart, sort, form
//! fields) and renders it to a fresh [`Dom`] on every driver call, using the
//! same element structure, classes and ids as the live site. Clicks dispatch
//! the `data-action` of the clicked element or its first descendant that has
//! one.

use super::dom::{Dom, Element, NodeId};
use crate::config::{DEFAULT_BASE_URL, DEMO_PASSWORD};
use crate::driver::PageDriver;
use crate::item::Item;
use crate::locator::Locator;
use crate::money::{format_price, grand_total, tax_for, DEFAULT_TAX_RATE};
use crate::pages::{locale_compare, SortMode};
use crate::result::{SauceError, SauceResult};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A product in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    /// Display name
    pub name: &'static str,
    /// Unit price
    pub price: Decimal,
    /// Description text
    pub description: &'static str,
    /// Image path
    pub image: &'static str,
}

/// The six products the store sells, in catalog order
pub const CATALOG: [Product; 6] = [
    Product {
        name: "Sauce Labs Backpack",
        price: dec!(29.99),
        description: "Sly Pack with unequaled laptop and tablet protection.",
        image: "/static/media/sauce-backpack-1200x1500.jpg",
    },
    Product {
        name: "Sauce Labs Bike Light",
        price: dec!(9.99),
        description: "A red light isn't the desired state in testing but it sure helps when riding your bike at night.",
        image: "/static/media/bike-light-1200x1500.jpg",
    },
    Product {
        name: "Sauce Labs Bolt T-Shirt",
        price: dec!(15.99),
        description: "Get your testing superhero on with the Sauce Labs bolt T-shirt.",
        image: "/static/media/bolt-shirt-1200x1500.jpg",
    },
    Product {
        name: "Sauce Labs Fleece Jacket",
        price: dec!(49.99),
        description: "It's not every day that you come across a midweight quarter-zip fleece jacket.",
        image: "/static/media/sauce-pullover-1200x1500.jpg",
    },
    Product {
        name: "Sauce Labs Onesie",
        price: dec!(7.99),
        description: "Rib snap infant onesie for the junior automation engineer in development.",
        image: "/static/media/red-onesie-1200x1500.jpg",
    },
    Product {
        name: "Test.allTheThings() T-Shirt (Red)",
        price: dec!(15.99),
        description: "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard to automate a few tests.",
        image: "/static/media/red-tatt-1200x1500.jpg",
    },
];

/// Accounts that can sign in with the demo password
pub const ACCOUNTS: [&str; 5] = [
    "standard_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];

/// Account that exists but is refused
pub const LOCKED_ACCOUNT: &str = "locked_out_user";

/// Deliberate misbehavior, for exercising failure paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreFaults {
    /// Products whose "Add to cart" button does nothing
    pub stuck_add: BTreeSet<String>,
    /// Amount added to a product's price when shown in the cart and overview
    pub cart_markup: BTreeMap<String, Decimal>,
    /// Products rendered without an image source
    pub missing_image: BTreeSet<String>,
    /// The sort control updates its label but not the listing
    pub ignore_sort: bool,
    /// Tax rate used for the overview labels instead of the default
    pub tax_rate: Option<Decimal>,
}

impl StoreFaults {
    /// No faults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the product's add button inert
    #[must_use]
    pub fn with_stuck_add(mut self, name: impl Into<String>) -> Self {
        self.stuck_add.insert(name.into());
        self
    }

    /// Show the product in the cart with `markup` added to its price
    #[must_use]
    pub fn with_cart_markup(mut self, name: impl Into<String>, markup: Decimal) -> Self {
        self.cart_markup.insert(name.into(), markup);
        self
    }

    /// Drop the product's image source
    #[must_use]
    pub fn with_missing_image(mut self, name: impl Into<String>) -> Self {
        self.missing_image.insert(name.into());
        self
    }

    /// Keep catalog order whatever sort is chosen
    #[must_use]
    pub const fn with_ignored_sort(mut self) -> Self {
        self.ignore_sort = true;
        self
    }

    /// Compute overview tax at `rate`
    #[must_use]
    pub const fn with_tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = Some(rate);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Login,
    Inventory,
    Cart,
    Information,
    Overview,
    Complete,
}

impl Screen {
    const fn path(self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Inventory => "/inventory.html",
            Self::Cart => "/cart.html",
            Self::Information => "/checkout-step-one.html",
            Self::Overview => "/checkout-step-two.html",
            Self::Complete => "/checkout-complete.html",
        }
    }

    fn from_path(path: &str) -> Option<Self> {
        match path {
            "" | "/" => Some(Self::Login),
            "/inventory.html" => Some(Self::Inventory),
            "/cart.html" => Some(Self::Cart),
            "/checkout-step-one.html" => Some(Self::Information),
            "/checkout-step-two.html" => Some(Self::Overview),
            "/checkout-complete.html" => Some(Self::Complete),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct StoreState {
    screen: Screen,
    user: Option<String>,
    cart: Vec<usize>,
    sort: SortMode,
    fields: BTreeMap<String, String>,
    error: Option<String>,
}

impl StoreState {
    fn new() -> Self {
        Self {
            screen: Screen::Login,
            user: None,
            cart: Vec::new(),
            sort: SortMode::NameAscending,
            fields: BTreeMap::new(),
            error: None,
        }
    }

    fn show(&mut self, screen: Screen) {
        self.screen = screen;
        self.fields.clear();
        self.error = None;
    }

    fn field(&self, id: &str) -> &str {
        self.fields.get(id).map_or("", String::as_str)
    }
}

/// In-memory storefront implementing [`PageDriver`]
///
/// # Example
///
/// ```
/// use saucecheck::mock::StoreSimulator;
/// use saucecheck::{Locator, PageDriver};
///
/// # let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # runtime.block_on(async {
/// let store = StoreSimulator::new();
/// store.goto("https://www.saucedemo.com/").await?;
/// assert!(store.is_visible(&Locator::css("#login-button")).await?);
/// # Ok::<(), saucecheck::SauceError>(())
/// # }).unwrap();
/// ```
#[derive(Debug)]
pub struct StoreSimulator {
    base_url: String,
    faults: StoreFaults,
    state: Mutex<StoreState>,
}

impl Default for StoreSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreSimulator {
    /// Store at the live site's origin, no faults
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            faults: StoreFaults::default(),
            state: Mutex::new(StoreState::new()),
        }
    }

    /// Serve under another origin
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Inject faults
    #[must_use]
    pub fn with_faults(mut self, faults: StoreFaults) -> Self {
        self.faults = faults;
        self
    }

    /// Catalog as items
    #[must_use]
    pub fn catalog() -> Vec<Item> {
        CATALOG.iter().map(|p| Item::new(p.name, p.price)).collect()
    }

    /// Cart contents in the order they were added
    pub fn cart(&self) -> Vec<Item> {
        self.lock()
            .cart
            .iter()
            .filter_map(|&i| CATALOG.get(i))
            .map(|p| Item::new(p.name, p.price))
            .collect()
    }

    /// Account currently signed in
    pub fn signed_in_user(&self) -> Option<String> {
        self.lock().user.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tax_rate(&self) -> Decimal {
        self.faults.tax_rate.unwrap_or(DEFAULT_TAX_RATE)
    }

    fn shown_price(&self, product: &Product) -> Decimal {
        product.price
            + self
                .faults
                .cart_markup
                .get(product.name)
                .copied()
                .unwrap_or(Decimal::ZERO)
    }

    /// Catalog indices in display order
    fn display_order(&self, sort: SortMode) -> Vec<usize> {
        let mut order: Vec<usize> = (0..CATALOG.len()).collect();
        if self.faults.ignore_sort {
            return order;
        }
        match sort {
            SortMode::NameAscending => {
                order.sort_by(|&a, &b| locale_compare(CATALOG[a].name, CATALOG[b].name));
            }
            SortMode::NameDescending => {
                order.sort_by(|&a, &b| locale_compare(CATALOG[b].name, CATALOG[a].name));
            }
            SortMode::PriceAscending => order.sort_by_key(|&i| CATALOG[i].price),
            SortMode::PriceDescending => {
                order.sort_by(|&a, &b| CATALOG[b].price.cmp(&CATALOG[a].price));
            }
        }
        order
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn render(&self, state: &StoreState) -> Dom {
        let mut dom = Dom::new();
        let body = dom.append(Dom::ROOT, Element::new("div").id("root"));
        match state.screen {
            Screen::Login => Self::render_login(&mut dom, body, state),
            Screen::Inventory => self.render_inventory(&mut dom, body, state),
            Screen::Cart => self.render_cart(&mut dom, body, state),
            Screen::Information => Self::render_information(&mut dom, body, state),
            Screen::Overview => self.render_overview(&mut dom, body, state),
            Screen::Complete => Self::render_complete(&mut dom, body, state),
        }
        dom
    }

    fn render_header(dom: &mut Dom, body: NodeId, state: &StoreState, title: &str) {
        let header = dom.append(body, Element::new("div").class("primary_header"));
        dom.append(header, Element::new("div").class("app_logo").text("Swag Labs"));
        let container = dom.append(header, Element::new("div").class("shopping_cart_container"));
        let link = dom.append(
            container,
            Element::new("a")
                .class("shopping_cart_link")
                .attr("data-action", "open-cart"),
        );
        if !state.cart.is_empty() {
            dom.append(
                link,
                Element::new("span")
                    .class("shopping_cart_badge")
                    .text(state.cart.len().to_string()),
            );
        }
        let secondary = dom.append(body, Element::new("div").class("header_secondary_container"));
        dom.append(secondary, Element::new("span").class("title").text(title));
    }

    fn render_error(dom: &mut Dom, parent: NodeId, state: &StoreState) {
        let container = dom.append(parent, Element::new("div").class("error-message-container"));
        if let Some(error) = &state.error {
            dom.append(
                container,
                Element::new("h3").attr("data-test", "error").text(error.as_str()),
            );
        }
    }

    fn render_input(dom: &mut Dom, parent: NodeId, state: &StoreState, id: &str, kind: &str) {
        dom.append(
            parent,
            Element::new("input")
                .id(id)
                .class("input_error")
                .attr("type", kind)
                .attr("value", state.field(id)),
        );
    }

    fn render_login(dom: &mut Dom, body: NodeId, state: &StoreState) {
        dom.append(body, Element::new("div").class("login_logo").text("Swag Labs"));
        let form = dom.append(body, Element::new("form"));
        Self::render_input(dom, form, state, "user-name", "text");
        Self::render_input(dom, form, state, "password", "password");
        Self::render_error(dom, form, state);
        dom.append(
            form,
            Element::new("input")
                .id("login-button")
                .class("submit-button")
                .attr("type", "submit")
                .attr("value", "Login")
                .attr("data-action", "login"),
        );
    }

    fn render_inventory(&self, dom: &mut Dom, body: NodeId, state: &StoreState) {
        Self::render_header(dom, body, state, "Products");
        let sorter = dom.append(body, Element::new("span").class("select_container"));
        let select = dom.append(
            sorter,
            Element::new("select")
                .class("product_sort_container")
                .attr("value", state.sort.value()),
        );
        for mode in SortMode::ALL {
            dom.append(
                select,
                Element::new("option").attr("value", mode.value()).text(mode.label()),
            );
        }
        dom.append(
            sorter,
            Element::new("span").class("active_option").text(state.sort.label()),
        );

        let list = dom.append(body, Element::new("div").class("inventory_list"));
        for index in self.display_order(state.sort) {
            let product = &CATALOG[index];
            let item = dom.append(list, Element::new("div").class("inventory_item"));

            let image_box = dom.append(item, Element::new("div").class("inventory_item_img"));
            let src = if self.faults.missing_image.contains(product.name) {
                ""
            } else {
                product.image
            };
            dom.append(
                image_box,
                Element::new("img")
                    .class("inventory_item_img")
                    .attr("src", src)
                    .attr("alt", product.name),
            );

            let description = dom.append(item, Element::new("div").class("inventory_item_description"));
            let label = dom.append(description, Element::new("div").class("inventory_item_label"));
            let link = dom.append(label, Element::new("a"));
            dom.append(link, Element::new("div").class("inventory_item_name").text(product.name));
            dom.append(
                label,
                Element::new("div").class("inventory_item_desc").text(product.description),
            );

            let bar = dom.append(description, Element::new("div").class("pricebar"));
            dom.append(
                bar,
                Element::new("div")
                    .class("inventory_item_price")
                    .text(format_price(product.price)),
            );
            let (text, action) = if state.cart.contains(&index) {
                ("Remove", format!("remove:{index}"))
            } else {
                ("Add to cart", format!("add:{index}"))
            };
            dom.append(
                bar,
                Element::new("button")
                    .class("btn_inventory")
                    .attr("data-action", action)
                    .text(text),
            );
        }
    }

    fn render_cart_rows(&self, dom: &mut Dom, parent: NodeId, state: &StoreState, removable: bool) {
        let list = dom.append(parent, Element::new("div").class("cart_list"));
        for &index in &state.cart {
            let Some(product) = CATALOG.get(index) else {
                continue;
            };
            let row = dom.append(list, Element::new("div").class("cart_item"));
            dom.append(row, Element::new("div").class("cart_quantity").text("1"));
            let label = dom.append(row, Element::new("div").class("cart_item_label"));
            let link = dom.append(label, Element::new("a"));
            dom.append(link, Element::new("div").class("inventory_item_name").text(product.name));
            dom.append(
                label,
                Element::new("div").class("inventory_item_desc").text(product.description),
            );
            let bar = dom.append(label, Element::new("div").class("item_pricebar"));
            dom.append(
                bar,
                Element::new("div")
                    .class("inventory_item_price")
                    .text(format_price(self.shown_price(product))),
            );
            if removable {
                dom.append(
                    bar,
                    Element::new("button")
                        .class("cart_button")
                        .attr("data-action", format!("remove:{index}"))
                        .text("Remove"),
                );
            }
        }
    }

    fn render_cart(&self, dom: &mut Dom, body: NodeId, state: &StoreState) {
        Self::render_header(dom, body, state, "Your Cart");
        self.render_cart_rows(dom, body, state, true);
        let footer = dom.append(body, Element::new("div").class("cart_footer"));
        dom.append(
            footer,
            Element::new("button")
                .id("continue-shopping")
                .attr("data-action", "continue-shopping")
                .text("Continue Shopping"),
        );
        dom.append(
            footer,
            Element::new("button")
                .id("checkout")
                .attr("data-action", "checkout")
                .text("Checkout"),
        );
    }

    fn render_information(dom: &mut Dom, body: NodeId, state: &StoreState) {
        Self::render_header(dom, body, state, "Checkout: Your Information");
        let form = dom.append(body, Element::new("form").class("checkout_info"));
        Self::render_input(dom, form, state, "first-name", "text");
        Self::render_input(dom, form, state, "last-name", "text");
        Self::render_input(dom, form, state, "postal-code", "text");
        Self::render_error(dom, form, state);
        let buttons = dom.append(body, Element::new("div").class("checkout_buttons"));
        dom.append(
            buttons,
            Element::new("button")
                .id("cancel")
                .attr("data-action", "cancel-information")
                .text("Cancel"),
        );
        dom.append(
            buttons,
            Element::new("input")
                .id("continue")
                .attr("type", "submit")
                .attr("value", "Continue")
                .attr("data-action", "continue"),
        );
    }

    fn render_overview(&self, dom: &mut Dom, body: NodeId, state: &StoreState) {
        Self::render_header(dom, body, state, "Checkout: Overview");
        self.render_cart_rows(dom, body, state, false);

        let subtotal: Decimal = state
            .cart
            .iter()
            .filter_map(|&i| CATALOG.get(i))
            .map(|p| p.price)
            .sum();
        let rate = self.tax_rate();
        let summary = dom.append(body, Element::new("div").class("summary_info"));
        for (class, label) in [
            ("summary_subtotal_label", format!("Item total: {}", format_price(subtotal))),
            ("summary_tax_label", format!("Tax: {}", format_price(tax_for(subtotal, rate)))),
            ("summary_total_label", format!("Total: {}", format_price(grand_total(subtotal, rate)))),
        ] {
            dom.append(summary, Element::new("div").class(class).text(label));
        }

        let buttons = dom.append(body, Element::new("div").class("cart_footer"));
        dom.append(
            buttons,
            Element::new("button")
                .id("cancel")
                .attr("data-action", "cancel-overview")
                .text("Cancel"),
        );
        dom.append(
            buttons,
            Element::new("button")
                .id("finish")
                .attr("data-action", "finish")
                .text("Finish"),
        );
    }

    fn render_complete(dom: &mut Dom, body: NodeId, state: &StoreState) {
        Self::render_header(dom, body, state, crate::pages::COMPLETE_TITLE);
        let container = dom.append(body, Element::new("div").class("checkout_complete_container"));
        dom.append(
            container,
            Element::new("img")
                .class("pony_express")
                .attr("src", "/static/media/pony-express.png"),
        );
        dom.append(
            container,
            Element::new("h2")
                .class("complete-header")
                .text(crate::pages::COMPLETE_HEADER),
        );
        dom.append(
            container,
            Element::new("div")
                .class("complete-text")
                .text(crate::pages::COMPLETE_TEXT),
        );
        dom.append(
            container,
            Element::new("button")
                .id("back-to-products")
                .attr("data-action", "back-home")
                .text("Back Home"),
        );
    }

    // =========================================================================
    // Behavior
    // =========================================================================

    fn open(&self, state: &mut StoreState, path: &str) -> SauceResult<()> {
        let Some(screen) = Screen::from_path(path) else {
            return Err(SauceError::NavigationError {
                url: format!("{}{path}", self.base_url),
                message: "404 Not Found".to_string(),
            });
        };
        if screen != Screen::Login && state.user.is_none() {
            state.show(Screen::Login);
            state.error = Some(format!(
                "Epic sadface: You can only access '{path}' when you are logged in."
            ));
            return Ok(());
        }
        state.show(screen);
        Ok(())
    }

    fn sign_in(state: &mut StoreState) {
        let username = state.field("user-name").to_string();
        let password = state.field("password").to_string();
        let refusal = if username.is_empty() {
            Some("Epic sadface: Username is required")
        } else if password.is_empty() {
            Some("Epic sadface: Password is required")
        } else if password != DEMO_PASSWORD
            || !(ACCOUNTS.contains(&username.as_str()) || username == LOCKED_ACCOUNT)
        {
            Some("Epic sadface: Username and password do not match any user in this service")
        } else if username == LOCKED_ACCOUNT {
            Some("Epic sadface: Sorry, this user has been locked out.")
        } else {
            None
        };

        match refusal {
            Some(message) => {
                tracing::debug!(%username, message, "login refused");
                state.error = Some(message.to_string());
            }
            None => {
                state.user = Some(username);
                state.show(Screen::Inventory);
            }
        }
    }

    fn submit_information(state: &mut StoreState) {
        let missing = [
            ("first-name", "Error: First Name is required"),
            ("last-name", "Error: Last Name is required"),
            ("postal-code", "Error: Postal Code is required"),
        ]
        .into_iter()
        .find(|(id, _)| state.field(id).is_empty());

        match missing {
            Some((_, message)) => state.error = Some(message.to_string()),
            None => state.show(Screen::Overview),
        }
    }

    fn dispatch(&self, state: &mut StoreState, action: &str) -> SauceResult<()> {
        tracing::trace!(action, "store action");
        if let Some((verb, index)) = action.split_once(':') {
            let index: usize = index
                .parse()
                .map_err(|_| SauceError::driver(format!("bad action {action:?}")))?;
            let product = CATALOG
                .get(index)
                .ok_or_else(|| SauceError::driver(format!("no product {index}")))?;
            match verb {
                "add" if self.faults.stuck_add.contains(product.name) => {
                    tracing::debug!(product = product.name, "add ignored");
                }
                "add" if !state.cart.contains(&index) => state.cart.push(index),
                "add" => {}
                "remove" => state.cart.retain(|&i| i != index),
                _ => return Err(SauceError::driver(format!("unknown action {action:?}"))),
            }
            return Ok(());
        }

        match action {
            "login" => Self::sign_in(state),
            "open-cart" => state.show(Screen::Cart),
            "checkout" => state.show(Screen::Information),
            "continue-shopping" | "cancel-overview" | "back-home" => state.show(Screen::Inventory),
            "cancel-information" => state.show(Screen::Cart),
            "continue" => Self::submit_information(state),
            "finish" => {
                state.cart.clear();
                state.show(Screen::Complete);
            }
            other => return Err(SauceError::driver(format!("unknown action {other:?}"))),
        }
        Ok(())
    }

    fn first(dom: &Dom, locator: &Locator) -> SauceResult<Option<NodeId>> {
        Ok(dom.resolve(locator)?.first().copied())
    }

    fn form_control(dom: &Dom, locator: &Locator) -> SauceResult<Option<(NodeId, String)>> {
        let Some(id) = Self::first(dom, locator)? else {
            return Ok(None);
        };
        let node = dom
            .node(id)
            .ok_or_else(|| SauceError::driver("dangling node"))?;
        if !matches!(node.tag(), "input" | "textarea" | "select") {
            return Err(SauceError::driver(format!("{locator} is not a form control")));
        }
        Ok(Some((id, node.attr("value").unwrap_or_default().to_string())))
    }
}

#[async_trait]
impl PageDriver for StoreSimulator {
    async fn goto(&self, url: &str) -> SauceResult<()> {
        let base = self.base_url.trim_end_matches('/');
        let path = url.strip_prefix(base).ok_or_else(|| SauceError::NavigationError {
            url: url.to_string(),
            message: format!("outside {base}"),
        })?;
        let mut state = self.lock();
        self.open(&mut state, path)
    }

    async fn current_url(&self) -> SauceResult<String> {
        let state = self.lock();
        Ok(format!("{}{}", self.base_url, state.screen.path()))
    }

    async fn count(&self, locator: &Locator) -> SauceResult<usize> {
        let state = self.lock();
        Ok(self.render(&state).resolve(locator)?.len())
    }

    async fn is_visible(&self, locator: &Locator) -> SauceResult<bool> {
        let state = self.lock();
        let dom = self.render(&state);
        Ok(Self::first(&dom, locator)?.is_some_and(|id| dom.is_visible(id)))
    }

    async fn text_content(&self, locator: &Locator) -> SauceResult<Option<String>> {
        let state = self.lock();
        let dom = self.render(&state);
        Ok(Self::first(&dom, locator)?.map(|id| dom.text_content(id)))
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> SauceResult<Option<String>> {
        let state = self.lock();
        let dom = self.render(&state);
        Ok(Self::first(&dom, locator)?
            .and_then(|id| dom.node(id))
            .and_then(|node| node.attr(name))
            .map(str::to_string))
    }

    async fn input_value(&self, locator: &Locator) -> SauceResult<Option<String>> {
        let state = self.lock();
        let dom = self.render(&state);
        Ok(Self::form_control(&dom, locator)?.map(|(_, value)| value))
    }

    async fn fill(&self, locator: &Locator, value: &str) -> SauceResult<()> {
        let mut state = self.lock();
        let dom = self.render(&state);
        let (id, _) = Self::form_control(&dom, locator)?.ok_or_else(|| SauceError::ElementNotFound {
            locator: locator.to_string(),
        })?;
        let field = dom
            .node(id)
            .and_then(|node| node.attr("id"))
            .ok_or_else(|| SauceError::driver(format!("{locator} has no id")))?
            .to_string();
        state.fields.insert(field, value.to_string());
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> SauceResult<()> {
        let mut state = self.lock();
        let dom = self.render(&state);
        let id = Self::first(&dom, locator)?.ok_or_else(|| SauceError::ElementNotFound {
            locator: locator.to_string(),
        })?;
        if !dom.is_visible(id) {
            return Err(SauceError::driver(format!("{locator} is not visible")));
        }
        match dom.find_attr(id, "data-action") {
            Some((_, action)) => self.dispatch(&mut state, &action),
            None => Ok(()),
        }
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> SauceResult<()> {
        let mut state = self.lock();
        let dom = self.render(&state);
        let id = Self::first(&dom, locator)?.ok_or_else(|| SauceError::ElementNotFound {
            locator: locator.to_string(),
        })?;
        if dom.node(id).map(|node| node.tag()) != Some("select") {
            return Err(SauceError::driver(format!("{locator} is not a select")));
        }
        state.sort = value.parse::<SortMode>().map_err(SauceError::driver)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.saucedemo.com";

    async fn signed_in(faults: StoreFaults) -> StoreSimulator {
        let store = StoreSimulator::new().with_faults(faults);
        store.goto(&format!("{BASE}/")).await.unwrap();
        store.fill(&Locator::css("#user-name"), "standard_user").await.unwrap();
        store.fill(&Locator::css("#password"), DEMO_PASSWORD).await.unwrap();
        store.click(&Locator::css("#login-button")).await.unwrap();
        store
    }

    async fn names(store: &StoreSimulator) -> Vec<String> {
        let count = store.count(&Locator::css("div.inventory_item")).await.unwrap();
        let mut names = Vec::new();
        for i in 0..count {
            let loc = Locator::css("div.inventory_item")
                .nth(i)
                .css_within("div.inventory_item_name");
            names.push(store.text_content(&loc).await.unwrap().unwrap());
        }
        names
    }

    async fn error_text(store: &StoreSimulator) -> Option<String> {
        store
            .text_content(&Locator::css(".error-message-container h3"))
            .await
            .unwrap()
    }

    mod session {
        use super::*;

        #[tokio::test]
        async fn test_login_lands_on_inventory() {
            let store = signed_in(StoreFaults::new()).await;
            assert_eq!(store.current_url().await.unwrap(), format!("{BASE}/inventory.html"));
            assert_eq!(store.signed_in_user().as_deref(), Some("standard_user"));
            assert_eq!(names(&store).await.len(), 6);
        }

        #[tokio::test]
        async fn test_login_errors() {
            let store = StoreSimulator::new();
            store.goto(&format!("{BASE}/")).await.unwrap();
            store.click(&Locator::button("Login")).await.unwrap();
            assert_eq!(
                error_text(&store).await.as_deref(),
                Some("Epic sadface: Username is required")
            );

            store.fill(&Locator::css("#user-name"), LOCKED_ACCOUNT).await.unwrap();
            store.fill(&Locator::css("#password"), DEMO_PASSWORD).await.unwrap();
            store.click(&Locator::css("#login-button")).await.unwrap();
            assert_eq!(
                error_text(&store).await.as_deref(),
                Some("Epic sadface: Sorry, this user has been locked out.")
            );
            assert_eq!(store.current_url().await.unwrap(), format!("{BASE}/"));
        }

        #[tokio::test]
        async fn test_auth_guard_redirects_to_login() {
            let store = StoreSimulator::new();
            store.goto(&format!("{BASE}/cart.html")).await.unwrap();
            assert_eq!(store.current_url().await.unwrap(), format!("{BASE}/"));
            assert_eq!(
                error_text(&store).await.as_deref(),
                Some("Epic sadface: You can only access '/cart.html' when you are logged in.")
            );
        }

        #[tokio::test]
        async fn test_unknown_path_is_navigation_error() {
            let store = StoreSimulator::new();
            let err = store.goto(&format!("{BASE}/nope.html")).await.unwrap_err();
            assert!(matches!(err, SauceError::NavigationError { .. }));
        }
    }

    mod cart {
        use super::*;

        #[tokio::test]
        async fn test_add_remove_and_badge() {
            let store = signed_in(StoreFaults::new()).await;
            let first = Locator::css("div.inventory_item").nth(0);
            store
                .click(&first.clone().button_within("Add to cart"))
                .await
                .unwrap();
            let badge = Locator::css("span.shopping_cart_badge");
            assert_eq!(store.text_content(&badge).await.unwrap().as_deref(), Some("1"));
            assert!(store.is_visible(&first.clone().button_within("Remove")).await.unwrap());

            store.click(&first.button_within("Remove")).await.unwrap();
            assert_eq!(store.count(&badge).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_stuck_add_keeps_cart_empty() {
            let store =
                signed_in(StoreFaults::new().with_stuck_add("Sauce Labs Backpack")).await;
            store
                .click(&Locator::css("div.inventory_item").nth(0).button_within("Add to cart"))
                .await
                .unwrap();
            assert!(store.cart().is_empty());
        }

        #[tokio::test]
        async fn test_cart_markup_shows_in_cart_only() {
            let store = signed_in(
                StoreFaults::new().with_cart_markup("Sauce Labs Backpack", dec!(1.00)),
            )
            .await;
            store
                .click(&Locator::css("div.inventory_item").nth(0).button_within("Add to cart"))
                .await
                .unwrap();
            store.click(&Locator::css("div.shopping_cart_container")).await.unwrap();
            let price = Locator::css("div.cart_item").nth(0).css_within("div.inventory_item_price");
            assert_eq!(store.text_content(&price).await.unwrap().as_deref(), Some("$30.99"));
        }
    }

    mod sorting {
        use super::*;

        #[tokio::test]
        async fn test_price_low_to_high() {
            let store = signed_in(StoreFaults::new()).await;
            store
                .select_option(&Locator::css("select.product_sort_container"), "lohi")
                .await
                .unwrap();
            let names = names(&store).await;
            assert_eq!(names.first().map(String::as_str), Some("Sauce Labs Onesie"));
            assert_eq!(names.last().map(String::as_str), Some("Sauce Labs Fleece Jacket"));
            let active = store.text_content(&Locator::css("span.active_option")).await.unwrap();
            assert_eq!(active.as_deref(), Some("Price (low to high)"));
        }

        #[tokio::test]
        async fn test_ignored_sort_keeps_catalog_order() {
            let store = signed_in(StoreFaults::new().with_ignored_sort()).await;
            store
                .select_option(&Locator::css("select.product_sort_container"), "za")
                .await
                .unwrap();
            assert_eq!(names(&store).await[0], "Sauce Labs Backpack");
        }

        #[tokio::test]
        async fn test_unknown_sort_value_rejected() {
            let store = signed_in(StoreFaults::new()).await;
            let err = store
                .select_option(&Locator::css("select.product_sort_container"), "price")
                .await
                .unwrap_err();
            assert!(matches!(err, SauceError::DriverError { .. }));
        }
    }

    mod checkout {
        use super::*;

        #[tokio::test]
        async fn test_information_validation_then_overview_totals() {
            let store = signed_in(StoreFaults::new()).await;
            for i in 0..2 {
                store
                    .click(&Locator::css("div.inventory_item").nth(i).button_within("Add to cart"))
                    .await
                    .unwrap();
            }
            store.goto(&format!("{BASE}/checkout-step-one.html")).await.unwrap();
            store.click(&Locator::css("#continue")).await.unwrap();
            assert_eq!(
                error_text(&store).await.as_deref(),
                Some("Error: First Name is required")
            );

            store.fill(&Locator::css("#first-name"), "John").await.unwrap();
            store.fill(&Locator::css("#last-name"), "Doe").await.unwrap();
            store.fill(&Locator::css("#postal-code"), "10110").await.unwrap();
            assert_eq!(
                store.input_value(&Locator::css("#last-name")).await.unwrap().as_deref(),
                Some("Doe")
            );
            store.click(&Locator::css("#continue")).await.unwrap();
            assert_eq!(
                store.current_url().await.unwrap(),
                format!("{BASE}/checkout-step-two.html")
            );

            let label = |class: &str| Locator::css(format!("div.{class}"));
            assert_eq!(
                store.text_content(&label("summary_subtotal_label")).await.unwrap().as_deref(),
                Some("Item total: $39.98")
            );
            assert_eq!(
                store.text_content(&label("summary_tax_label")).await.unwrap().as_deref(),
                Some("Tax: $3.20")
            );
            assert_eq!(
                store.text_content(&label("summary_total_label")).await.unwrap().as_deref(),
                Some("Total: $43.18")
            );

            store.click(&Locator::css("#finish")).await.unwrap();
            assert!(store.cart().is_empty());
            assert_eq!(
                store.text_content(&Locator::css(".complete-header")).await.unwrap().as_deref(),
                Some("Thank you for your order!")
            );
        }

        #[tokio::test]
        async fn test_fill_rejects_non_form_control() {
            let store = signed_in(StoreFaults::new()).await;
            let err = store.fill(&Locator::css("span.title"), "x").await.unwrap_err();
            assert!(matches!(err, SauceError::DriverError { .. }));
        }
    }
}
