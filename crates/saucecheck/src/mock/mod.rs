//! In-memory storefront for driving page models without a browser.
//!
//! ## Example
//!
//! ```rust,ignore
//! use saucecheck::mock::{StoreFaults, StoreSimulator};
//! use saucecheck::{Session, SuiteConfig};
//!
//! let store = StoreSimulator::new().with_faults(StoreFaults::new().with_ignored_sort());
//! let session = Session::new(store, SuiteConfig::default());
//! let pages = session.pages();
//! pages.login.goto().await?;
//! ```

pub mod dom;
mod store;

pub use dom::{Dom, Element, Node, NodeId};
pub use store::{Product, StoreFaults, StoreSimulator, ACCOUNTS, CATALOG, LOCKED_ACCOUNT};
