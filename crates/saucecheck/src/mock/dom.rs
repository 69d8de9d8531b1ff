//! Minimal DOM tree and locator resolution.
//!
//! Resolution follows the same rules as the JavaScript resolver the CDP
//! driver injects, so a locator that works against the simulator works
//! against a real page:
//!
//! - CSS steps search descendants of each scope (`querySelectorAll`)
//! - text and role steps search the scope itself plus its descendants
//! - text steps keep the deepest element containing the needle
//! - results are de-duplicated in first-seen order, then narrowed by `nth`
//!
//! Supported CSS: type, `#id`, `.class`, `[attr]`, `[attr=value]`,
//! `:not(compound)`, `*`, descendant and `>` combinators, and `,` lists.

use crate::locator::{Locator, Selector};
use crate::result::{SauceError, SauceResult};
use std::collections::{BTreeMap, HashSet};
use std::iter::Peekable;
use std::str::Chars;

/// Index of a node in its [`Dom`]
pub type NodeId = usize;

/// Element description used to build a tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    hidden: bool,
}

impl Element {
    /// Element with the given tag name
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_lowercase(),
            ..Self::default()
        }
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Add a class
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        let entry = self.attrs.entry("class".to_string()).or_default();
        if !entry.is_empty() {
            entry.push(' ');
        }
        entry.push_str(class);
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set the element's own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Mark as not rendered
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Node stored in a [`Dom`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    element: Element,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Lowercase tag name; the root is `#document`
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.element.tag
    }

    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.attrs.get(name).map(String::as_str)
    }

    /// Whether the `class` attribute lists `class`
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }
}

/// Arena-backed element tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// The document node
    pub const ROOT: NodeId = 0;

    /// Tree holding only the document node
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                element: Element::new("#document"),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Append `element` as last child of `parent`
    pub fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            element,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(id);
        }
        id
    }

    /// Node by id
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Own text followed by every descendant's text, in document order
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(node) = self.nodes.get(id) {
            out.push_str(&node.element.text);
            for &child in &node.children {
                self.collect_text(child, out);
            }
        }
    }

    /// Descendants of `id` in document order, `id` excluded
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(id)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(node) = self.nodes.get(next) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Rendered: neither the node nor an ancestor is hidden
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(idx) = current {
            match self.nodes.get(idx) {
                Some(node) if node.element.hidden => return false,
                Some(node) => current = node.parent,
                None => return false,
            }
        }
        id != Self::ROOT
    }

    /// First descendant-or-self carrying `attr`
    #[must_use]
    pub fn find_attr(&self, id: NodeId, attr: &str) -> Option<(NodeId, String)> {
        std::iter::once(id)
            .chain(self.descendants(id))
            .find_map(|n| {
                self.nodes
                    .get(n)
                    .and_then(|node| node.attr(attr))
                    .map(|value| (n, value.to_string()))
            })
    }

    /// Descendants of `scope` matching `selector`
    ///
    /// # Errors
    ///
    /// Returns [`SauceError::DriverError`] for unsupported CSS
    pub fn query_all(&self, scope: NodeId, selector: &str) -> SauceResult<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|&n| list.matches(self, n))
            .collect())
    }

    /// Resolve a locator from the document
    ///
    /// # Errors
    ///
    /// Returns [`SauceError::DriverError`] for unsupported CSS
    pub fn resolve(&self, locator: &Locator) -> SauceResult<Vec<NodeId>> {
        let mut scopes = vec![Self::ROOT];
        for step in locator.steps() {
            let found = match &step.selector {
                Selector::Css(css) => {
                    let mut all = Vec::new();
                    for &scope in &scopes {
                        all.extend(self.query_all(scope, css)?);
                    }
                    all
                }
                Selector::Text(text) => {
                    let needle = normalize(text);
                    self.scope_all(&scopes)
                        .into_iter()
                        .filter(|&n| self.deepest_with_text(n, &needle))
                        .collect()
                }
                Selector::Role { role, name } => {
                    let list = SelectorList::parse(&Selector::role_css(role))?;
                    let needle = normalize(name);
                    self.scope_all(&scopes)
                        .into_iter()
                        .filter(|&n| list.matches(self, n) && self.accessible_name(n).contains(&needle))
                        .collect()
                }
            };
            let found = unique(found);
            scopes = match step.nth {
                Some(index) => found.get(index).copied().into_iter().collect(),
                None => found,
            };
        }
        Ok(scopes)
    }

    fn scope_all(&self, scopes: &[NodeId]) -> Vec<NodeId> {
        let mut all = Vec::new();
        for &scope in scopes {
            if scope != Self::ROOT {
                all.push(scope);
            }
            all.extend(self.descendants(scope));
        }
        unique(all)
    }

    fn deepest_with_text(&self, id: NodeId, needle: &str) -> bool {
        if !normalize(&self.text_content(id)).contains(needle) {
            return false;
        }
        self.nodes.get(id).is_some_and(|node| {
            !node
                .children
                .iter()
                .any(|&c| normalize(&self.text_content(c)).contains(needle))
        })
    }

    fn accessible_name(&self, id: NodeId) -> String {
        let Some(node) = self.nodes.get(id) else {
            return String::new();
        };
        let text = self.text_content(id);
        let name = [node.attr("aria-label"), Some(text.as_str()), node.attr("value")]
            .into_iter()
            .flatten()
            .find(|candidate| !candidate.is_empty())
            .unwrap_or_default();
        normalize(name)
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn unique(ids: Vec<NodeId>) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

// =============================================================================
// CSS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrTest {
    Exists(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
    not: Vec<Compound>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if node.tag() == "#document" {
            return false;
        }
        self.tag.as_deref().map_or(true, |tag| tag == node.tag())
            && self
                .id
                .as_deref()
                .map_or(true, |id| node.attr("id") == Some(id))
            && self.classes.iter().all(|c| node.has_class(c))
            && self.attrs.iter().all(|test| match test {
                AttrTest::Exists(name) => node.attr(name).is_some(),
                AttrTest::Equals(name, value) => node.attr(name) == Some(value.as_str()),
            })
            && !self.not.iter().any(|inner| inner.matches(node))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// `a b > c` as (combinator-before, compound) pairs
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

impl Complex {
    fn matches(&self, dom: &Dom, id: NodeId) -> bool {
        self.parts
            .len()
            .checked_sub(1)
            .is_some_and(|last| self.matches_from(dom, last, id))
    }

    fn matches_from(&self, dom: &Dom, index: usize, id: NodeId) -> bool {
        let Some(node) = dom.node(id) else {
            return false;
        };
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => node
                .parent
                .is_some_and(|parent| self.matches_from(dom, index - 1, parent)),
            Combinator::Descendant => {
                let mut ancestor = node.parent;
                while let Some(candidate) = ancestor {
                    if self.matches_from(dom, index - 1, candidate) {
                        return true;
                    }
                    ancestor = dom.node(candidate).and_then(|n| n.parent);
                }
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorList(Vec<Complex>);

impl SelectorList {
    fn parse(selector: &str) -> SauceResult<Self> {
        let invalid = |reason: &str| SauceError::driver(format!("unsupported selector {selector:?}: {reason}"));
        let mut list = Vec::new();
        for part in split_top_level(selector) {
            list.push(parse_complex(part).map_err(|reason| invalid(&reason))?);
        }
        if list.is_empty() {
            return Err(invalid("empty"));
        }
        Ok(Self(list))
    }

    fn matches(&self, dom: &Dom, id: NodeId) -> bool {
        self.0.iter().any(|complex| complex.matches(dom, id))
    }
}

fn split_top_level(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in selector.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&selector[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&selector[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}

fn parse_complex(text: &str) -> Result<Complex, String> {
    let mut chars = text.trim().chars().peekable();
    let mut parts = Vec::new();
    let mut combinator = Combinator::Descendant;
    loop {
        while let Some(&c) = chars.peek() {
            if c == '>' {
                combinator = Combinator::Child;
            } else if !c.is_whitespace() {
                break;
            }
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }
        parts.push((combinator, parse_compound(&mut chars)?));
        combinator = Combinator::Descendant;
    }
    if parts.is_empty() {
        return Err("empty".to_string());
    }
    Ok(Complex { parts })
}

fn parse_compound(chars: &mut Peekable<Chars<'_>>) -> Result<Compound, String> {
    let mut compound = Compound::default();
    let mut universal = false;

    let tag = take_ident(chars);
    if !tag.is_empty() {
        compound.tag = Some(tag.to_lowercase());
    } else if chars.peek() == Some(&'*') {
        chars.next();
        universal = true;
    }

    loop {
        match chars.peek() {
            Some('#') => {
                chars.next();
                compound.id = Some(non_empty(take_ident(chars), "id")?);
            }
            Some('.') => {
                chars.next();
                compound.classes.push(non_empty(take_ident(chars), "class")?);
            }
            Some('[') => {
                chars.next();
                let inner = take_until(chars, ']')?;
                compound.attrs.push(parse_attr(&inner)?);
            }
            Some(':') => {
                chars.next();
                let pseudo = take_ident(chars);
                if pseudo != "not" || chars.next() != Some('(') {
                    return Err(format!("pseudo-class :{pseudo}"));
                }
                let inner = take_until(chars, ')')?;
                let mut inner_chars = inner.trim().chars().peekable();
                compound.not.push(parse_compound(&mut inner_chars)?);
            }
            _ => break,
        }
    }

    let empty = compound.tag.is_none()
        && compound.id.is_none()
        && compound.classes.is_empty()
        && compound.attrs.is_empty()
        && compound.not.is_empty();
    if empty && !universal {
        return Err(format!("unexpected {:?}", chars.peek()));
    }
    Ok(compound)
}

fn take_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            ident.push(c);
            chars.next();
        } else {
            break;
        }
    }
    ident
}

fn take_until(chars: &mut Peekable<Chars<'_>>, end: char) -> Result<String, String> {
    let mut inner = String::new();
    for c in chars.by_ref() {
        if c == end {
            return Ok(inner);
        }
        inner.push(c);
    }
    Err(format!("missing {end:?}"))
}

fn non_empty(value: String, what: &str) -> Result<String, String> {
    if value.is_empty() {
        Err(format!("empty {what}"))
    } else {
        Ok(value)
    }
}

fn parse_attr(inner: &str) -> Result<AttrTest, String> {
    match inner.split_once('=') {
        None => Ok(AttrTest::Exists(non_empty(inner.trim().to_string(), "attribute")?)),
        Some((name, value)) => {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            Ok(AttrTest::Equals(
                non_empty(name.trim().to_string(), "attribute")?,
                value.to_string(),
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    /// ```text
    /// div.inventory_item
    ///   div.inventory_item_name  "Sauce Labs Backpack"
    ///   div.pricebar
    ///     div.inventory_item_price "$29.99"
    ///     button "Add to cart"
    /// div.inventory_item
    ///   div.inventory_item_name  "Sauce Labs Onesie"
    ///   div.pricebar
    ///     div.inventory_item_price "$7.99"
    ///     button "Remove"
    /// input#login-button[type=submit][value=Login]
    /// span.title "Products" (hidden)
    /// ```
    fn listing() -> Dom {
        let mut dom = Dom::new();
        for (name, price, label) in [
            ("Sauce Labs Backpack", "$29.99", "Add to cart"),
            ("Sauce Labs Onesie", "$7.99", "Remove"),
        ] {
            let item = dom.append(Dom::ROOT, Element::new("div").class("inventory_item"));
            dom.append(item, Element::new("div").class("inventory_item_name").text(name));
            let bar = dom.append(item, Element::new("div").class("pricebar"));
            dom.append(bar, Element::new("div").class("inventory_item_price").text(price));
            dom.append(bar, Element::new("button").class("btn").text(label));
        }
        dom.append(
            Dom::ROOT,
            Element::new("input")
                .id("login-button")
                .attr("type", "submit")
                .attr("value", "Login"),
        );
        dom.append(
            Dom::ROOT,
            Element::new("span").class("title").text("Products").hidden(),
        );
        dom
    }

    mod css {
        use super::*;

        #[test]
        fn test_type_and_class() {
            let dom = listing();
            assert_eq!(dom.query_all(Dom::ROOT, "div.inventory_item").unwrap().len(), 2);
            assert_eq!(dom.query_all(Dom::ROOT, ".pricebar button").unwrap().len(), 2);
            assert!(dom.query_all(Dom::ROOT, "span.inventory_item").unwrap().is_empty());
        }

        #[test]
        fn test_child_combinator() {
            let dom = listing();
            assert_eq!(
                dom.query_all(Dom::ROOT, "div.inventory_item > button").unwrap().len(),
                0
            );
            assert_eq!(
                dom.query_all(Dom::ROOT, "div.inventory_item > .pricebar > button")
                    .unwrap()
                    .len(),
                2
            );
        }

        #[test]
        fn test_id_attribute_and_not() {
            let dom = listing();
            assert_eq!(dom.query_all(Dom::ROOT, "#login-button").unwrap().len(), 1);
            assert_eq!(dom.query_all(Dom::ROOT, "input[type=submit]").unwrap().len(), 1);
            assert_eq!(dom.query_all(Dom::ROOT, "input[type=\"submit\"]").unwrap().len(), 1);
            assert!(dom.query_all(Dom::ROOT, "input:not([type])").unwrap().is_empty());
            assert_eq!(dom.query_all(Dom::ROOT, "[value]").unwrap().len(), 1);
        }

        #[test]
        fn test_selector_list() {
            let dom = listing();
            let found = dom
                .query_all(Dom::ROOT, "button, input[type=submit]")
                .unwrap();
            assert_eq!(found.len(), 3);
        }

        #[test]
        fn test_unsupported_selector_is_driver_error() {
            let dom = listing();
            let err = dom.query_all(Dom::ROOT, "div:hover").unwrap_err();
            assert!(matches!(err, SauceError::DriverError { .. }));
            assert!(dom.query_all(Dom::ROOT, "div[class").is_err());
        }
    }

    mod locators {
        use super::*;

        #[test]
        fn test_nth_then_descendant() {
            let dom = listing();
            let loc = Locator::css("div.inventory_item")
                .nth(1)
                .css_within("div.inventory_item_name");
            let found = dom.resolve(&loc).unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(dom.text_content(found[0]), "Sauce Labs Onesie");
        }

        #[test]
        fn test_button_by_label_within_item() {
            let dom = listing();
            let add = Locator::css("div.inventory_item").nth(0).button_within("add to CART");
            assert_eq!(dom.resolve(&add).unwrap().len(), 1);
            let remove = Locator::css("div.inventory_item").nth(0).button_within("Remove");
            assert!(dom.resolve(&remove).unwrap().is_empty());
        }

        #[test]
        fn test_input_button_named_by_value() {
            let dom = listing();
            assert_eq!(dom.resolve(&Locator::button("Login")).unwrap().len(), 1);
        }

        #[test]
        fn test_text_keeps_deepest_and_includes_scope() {
            let dom = listing();
            let found = dom.resolve(&Locator::text("Backpack")).unwrap();
            assert_eq!(found.len(), 1);
            assert!(dom.node(found[0]).unwrap().has_class("inventory_item_name"));

            let scoped = dom
                .resolve(&Locator::css(".title").text_within("Products"))
                .unwrap();
            assert_eq!(scoped.len(), 1);
        }

        #[test]
        fn test_visibility_follows_hidden_flag() {
            let dom = listing();
            let title = dom.resolve(&Locator::css(".title")).unwrap()[0];
            assert!(!dom.is_visible(title));
            let button = dom.resolve(&Locator::css("#login-button")).unwrap()[0];
            assert!(dom.is_visible(button));
            assert!(!dom.is_visible(Dom::ROOT));
        }

        #[test]
        fn test_out_of_range_nth_is_empty() {
            let dom = listing();
            let loc = Locator::css("div.inventory_item").nth(5);
            assert!(dom.resolve(&loc).unwrap().is_empty());
        }
    }
}
