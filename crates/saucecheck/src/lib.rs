//! Saucecheck: page-object end-to-end and REST contract suites for the
//! Swag Labs demo store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SAUCECHECK Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Suites     │    │ Page       │    │ PageDriver │            │
//! │   │ (harness)  │───►│ Models     │───►│ CDP / sim  │            │
//! │   └─────┬──────┘    └────────────┘    └────────────┘            │
//! │         │ TestReport                                            │
//! │         ▼                                                       │
//! │   ┌────────────┐    ┌────────────┐                              │
//! │   │ Result     │───►│ Sheet      │                              │
//! │   │ Sync       │    │ Transport  │                              │
//! │   └────────────┘    └────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use saucecheck::mock::StoreSimulator;
//! use saucecheck::page_object::NavigablePage;
//! use saucecheck::{Session, SuiteConfig};
//!
//! # let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
//! # runtime.block_on(async {
//! let session = Session::new(StoreSimulator::new(), SuiteConfig::default());
//! let pages = session.pages();
//! pages.login.goto().await?;
//! pages.login.login("standard_user", "secret_sauce").await?;
//! assert!(pages.inventory.is_valid_page().await?);
//! # Ok::<(), saucecheck::SauceError>(())
//! # }).unwrap();
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// REST contract client and response schemas
pub mod api;
/// Hard and soft assertions
pub mod assertion;
/// Real browser control over CDP
pub mod browser;
/// Suite configuration and test data
pub mod config;
/// Browser driver seam
pub mod driver;
/// Scenario session and page wiring
pub mod fixture;
/// Suites, groups, cases and the runner
pub mod harness;
/// Items and cart selections
pub mod item;
/// Element addressing
pub mod locator;
/// In-memory storefront
pub mod mock;
/// Price parsing and checkout arithmetic
pub mod money;
/// Page Object Model contract
pub mod page_object;
/// Page models
pub mod pages;
/// Structured test report
pub mod report;
mod result;
/// Shipped suites
pub mod suite;
/// Result sync into a spreadsheet
pub mod sync;
/// Bounded waits
pub mod wait;

pub use assertion::{ensure, ensure_eq, AssertionSummary, SoftAssertionError, SoftAssertions};
#[cfg(feature = "browser")]
pub use browser::{Browser, CdpDriver};
pub use browser::BrowserConfig;
pub use config::{Credentials, CustomerInfo, SuiteConfig, TestData, Timeouts};
pub use driver::PageDriver;
pub use fixture::{Pages, Session};
pub use harness::{run_suite, CaseContext, ContextFactory, GroupMode, RunOptions, TestCase, TestGroup, TestSuite};
pub use item::{CartSelection, Item};
pub use locator::Locator;
pub use page_object::NavigablePage;
pub use report::{ReportSpec, ReportSuite, TestReport};
pub use result::{SauceError, SauceResult};
pub use suite::SuiteKind;
pub use wait::WaitOptions;
