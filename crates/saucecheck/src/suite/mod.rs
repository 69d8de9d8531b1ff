//! The shipped suites.
//!
//! - [`ui_suite`]: one case per page behavior, fresh session each
//! - [`buy_item_suite`]: the purchase scenario, steps sharing a session
//! - [`api_suite`]: REST contract cases, fresh client each

/// Case closure handing a shared [`crate::config::TestData`] to an async case
/// function taking `(&Session<D>, Arc<TestData>)`
macro_rules! with_data {
    ($data:expr, $case:ident) => {{
        let data = ::std::sync::Arc::clone($data);
        move |session| $case(session, ::std::sync::Arc::clone(&data)).boxed()
    }};
}

mod api;
mod buy_item;
mod ui;

pub use api::{api_suite, create_payload, update_payload, API_SUITE_TITLE, KNOWN_ID, UNKNOWN_ID};
pub use buy_item::{buy_item_suite, Purchase, BUY_ITEM_SCENARIO, BUY_ITEM_SUITE_TITLE};
pub use ui::{ui_suite, UI_SUITE_TITLE};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which suite to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuiteKind {
    /// Page-by-page UI cases
    Ui,
    /// Purchase scenario
    BuyItem,
    /// REST contract cases
    Api,
}

impl SuiteKind {
    /// Every suite, in run order
    pub const ALL: [Self; 3] = [Self::Ui, Self::BuyItem, Self::Api];

    /// Command-line name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ui => "ui",
            Self::BuyItem => "buy-item",
            Self::Api => "api",
        }
    }

    /// Whether the suite drives a storefront
    #[must_use]
    pub const fn needs_driver(self) -> bool {
        !matches!(self, Self::Api)
    }
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SuiteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown suite {s:?}, expected one of ui, buy-item, api"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_kind_names() {
        for kind in SuiteKind::ALL {
            assert_eq!(kind.name().parse::<SuiteKind>().unwrap(), kind);
        }
        assert!("smoke".parse::<SuiteKind>().is_err());
        assert!(!SuiteKind::Api.needs_driver());
    }
}
