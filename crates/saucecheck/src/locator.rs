//! Locators: scoped, chainable element addresses.
//!
//! A [`Locator`] is a chain of [`Step`]s. Each step searches inside the
//! elements matched by the previous one (the first step searches the whole
//! document) and may narrow the result to a single index with `nth`.
//!
//! Locators are plain data. Drivers interpret them: the CDP driver compiles
//! them to a JavaScript resolver via [`Locator::to_js`], the store simulator
//! matches them against its own DOM.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How one step of a locator selects elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector, matched against descendants of the scope
    Css(String),
    /// Smallest element whose whitespace-normalized text contains the
    /// needle, case-insensitively
    Text(String),
    /// Element with an ARIA role whose accessible name contains `name`,
    /// case-insensitively
    Role {
        /// ARIA role, e.g. `button`
        role: String,
        /// Accessible name fragment
        name: String,
    },
}

impl Selector {
    /// CSS that finds candidate elements for a role
    #[must_use]
    pub fn role_css(role: &str) -> String {
        match role {
            "button" => "button, input[type=button], input[type=submit], [role=button]".to_string(),
            "link" => "a[href], [role=link]".to_string(),
            "textbox" => "input[type=text], input[type=password], input:not([type]), textarea, [role=textbox]".to_string(),
            other => format!("[role={other}]"),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::Text(text) => write!(f, "text={text:?}"),
            Self::Role { role, name } => write!(f, "role={role}[name={name:?}]"),
        }
    }
}

/// One link in a locator chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    /// Selector applied inside the current scope
    pub selector: Selector,
    /// Keep only the n-th match (zero based)
    pub nth: Option<usize>,
}

/// Chainable element address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    steps: Vec<Step>,
}

impl Locator {
    fn single(selector: Selector) -> Self {
        Self {
            steps: vec![Step {
                selector,
                nth: None,
            }],
        }
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::single(Selector::Css(selector.into()))
    }

    /// Locate by visible text
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::single(Selector::Text(text.into()))
    }

    /// Locate by ARIA role and accessible name
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::single(Selector::Role {
            role: role.into(),
            name: name.into(),
        })
    }

    /// Shorthand for a button located by its label
    #[must_use]
    pub fn button(name: impl Into<String>) -> Self {
        Self::role("button", name)
    }

    /// Append a step searching inside the current matches
    #[must_use]
    pub fn then(mut self, selector: Selector) -> Self {
        self.steps.push(Step {
            selector,
            nth: None,
        });
        self
    }

    /// Search for a CSS selector inside the current matches
    #[must_use]
    pub fn css_within(self, selector: impl Into<String>) -> Self {
        self.then(Selector::Css(selector.into()))
    }

    /// Search for text inside the current matches
    #[must_use]
    pub fn text_within(self, text: impl Into<String>) -> Self {
        self.then(Selector::Text(text.into()))
    }

    /// Search for a button inside the current matches
    #[must_use]
    pub fn button_within(self, name: impl Into<String>) -> Self {
        self.then(Selector::Role {
            role: "button".to_string(),
            name: name.into(),
        })
    }

    /// Narrow the last step to its n-th match
    #[must_use]
    pub fn nth(mut self, index: usize) -> Self {
        if let Some(last) = self.steps.last_mut() {
            last.nth = Some(index);
        }
        self
    }

    /// Narrow the last step to its first match
    #[must_use]
    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// Steps in application order
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Compile to a JavaScript expression evaluating to an array of elements
    #[must_use]
    pub fn to_js(&self) -> String {
        let mut body = String::from("let els = [document];\n");
        for step in &self.steps {
            let call = match &step.selector {
                Selector::Css(css) => format!("byCss(els, {})", js_string(css)),
                Selector::Text(text) => format!("byText(els, {})", js_string(text)),
                Selector::Role { role, name } => format!(
                    "byRole(els, {}, {})",
                    js_string(&Selector::role_css(role)),
                    js_string(name)
                ),
            };
            let nth = step
                .nth
                .map_or_else(|| "null".to_string(), |n| n.to_string());
            body.push_str(&format!("els = pick({call}, {nth});\n"));
        }
        body.push_str("return els;");
        format!("(() => {{\n{JS_PRELUDE}\n{body}\n}})()")
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " >> ")?;
            }
            write!(f, "{}", step.selector)?;
            if let Some(n) = step.nth {
                write!(f, " >> nth={n}")?;
            }
        }
        Ok(())
    }
}

/// Quote a Rust string as a JavaScript string literal
#[must_use]
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

const JS_PRELUDE: &str = r"const norm = (s) => (s || '').replace(/\s+/g, ' ').trim().toLowerCase();
const uniq = (list) => list.filter((el, i) => list.indexOf(el) === i);
const byCss = (roots, sel) => uniq(roots.flatMap((r) => Array.from(r.querySelectorAll(sel))));
const scopeAll = (roots) => uniq(roots.flatMap((r) => (r === document ? [] : [r]).concat(Array.from(r.querySelectorAll('*')))));
const byText = (roots, text) => {
  const needle = norm(text);
  return scopeAll(roots).filter((el) => norm(el.textContent).includes(needle)
    && !Array.from(el.children).some((c) => norm(c.textContent).includes(needle)));
};
const accName = (el) => norm(el.getAttribute('aria-label') || el.textContent || el.value || '');
const byRole = (roots, css, name) => {
  const needle = norm(name);
  return scopeAll(roots).filter((el) => el.matches(css) && accName(el).includes(needle));
};
const pick = (els, nth) => (nth === null ? els : (els[nth] ? [els[nth]] : []));";

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod building {
        use super::*;

        #[test]
        fn test_css_single_step() {
            let loc = Locator::css("div.inventory_item");
            assert_eq!(loc.steps().len(), 1);
            assert_eq!(
                loc.steps()[0].selector,
                Selector::Css("div.inventory_item".to_string())
            );
            assert_eq!(loc.steps()[0].nth, None);
        }

        #[test]
        fn test_nth_applies_to_last_step() {
            let loc = Locator::css("div.cart_item")
                .nth(2)
                .css_within("div.inventory_item_name");
            assert_eq!(loc.steps()[0].nth, Some(2));
            assert_eq!(loc.steps()[1].nth, None);
        }

        #[test]
        fn test_button_is_role_step() {
            let loc = Locator::css("div.inventory_item").button_within("Add to cart");
            assert_eq!(
                loc.steps()[1].selector,
                Selector::Role {
                    role: "button".to_string(),
                    name: "Add to cart".to_string()
                }
            );
        }

        #[test]
        fn test_display_chain() {
            let loc = Locator::css(".title").text_within("Products").first();
            assert_eq!(loc.to_string(), ".title >> text=\"Products\" >> nth=0");
        }
    }

    mod javascript {
        use super::*;

        #[test]
        fn test_js_string_escapes_quotes() {
            assert_eq!(js_string(r#"a"b"#), r#""a\"b""#);
        }

        #[test]
        fn test_to_js_contains_each_step() {
            let js = Locator::css("div.inventory_item")
                .nth(1)
                .button_within("Remove")
                .to_js();
            assert!(js.contains(r#"els = pick(byCss(els, "div.inventory_item"), 1);"#));
            assert!(js.contains(r#"byRole(els, "button, input[type=button], input[type=submit], [role=button]", "Remove")"#));
            assert!(js.trim_end().ends_with("})()"));
        }

        #[test]
        fn test_unknown_role_falls_back_to_attribute() {
            assert_eq!(Selector::role_css("dialog"), "[role=dialog]");
        }
    }
}
