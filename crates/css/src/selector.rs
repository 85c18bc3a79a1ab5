//! Pre-parsed CSS selectors
//!
//! A [`CssSelector`] is one compound selector (`div.note[title]:first-child`)
//! together with the combinator that links it to the next one. A
//! [`SelectorGroup`] is a whole chain such as `ul > li a`; a selector list
//! (`a, b`) is a slice of groups.

use lacerta_dom::{Document, NodeId};
use std::fmt;

use crate::pseudo::{PseudoClass, PseudoFunction};

/// A chain of compound selectors, left to right
pub type SelectorGroup = Vec<CssSelector>;

/// Selector combinators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (space)
    #[default]
    Descendant,
    /// Child combinator (>)
    Child,
    /// Next sibling combinator (+)
    AdjacentSibling,
    /// Subsequent sibling combinator (~)
    GeneralSibling,
}

impl Combinator {
    pub fn sign(self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => ">",
            Combinator::AdjacentSibling => "+",
            Combinator::GeneralSibling => "~",
        }
    }
}

/// Attribute selector operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOp {
    /// [attr=value] - exact match
    Equals,
    /// [attr~=value] - contains word
    Includes,
    /// [attr|=value] - starts with value or value-
    DashMatch,
    /// [attr^=value] - starts with
    PrefixMatch,
    /// [attr$=value] - ends with
    SuffixMatch,
    /// [attr*=value] - contains
    SubstringMatch,
}

impl AttributeOp {
    pub fn sign(self) -> &'static str {
        match self {
            AttributeOp::Equals => "=",
            AttributeOp::Includes => "~=",
            AttributeOp::DashMatch => "|=",
            AttributeOp::PrefixMatch => "^=",
            AttributeOp::SuffixMatch => "$=",
            AttributeOp::SubstringMatch => "*=",
        }
    }

    fn matches(self, actual: &str, expected: &str) -> bool {
        match self {
            AttributeOp::Equals => actual == expected,
            AttributeOp::Includes => actual.split_whitespace().any(|w| w == expected),
            AttributeOp::DashMatch => {
                actual == expected
                    || (actual.starts_with(expected) && actual[expected.len()..].starts_with('-'))
            }
            AttributeOp::PrefixMatch => !expected.is_empty() && actual.starts_with(expected),
            AttributeOp::SuffixMatch => !expected.is_empty() && actual.ends_with(expected),
            AttributeOp::SubstringMatch => !expected.is_empty() && actual.contains(expected),
        }
    }
}

/// `[name]` or `[name op value]`, optionally case-insensitive (`[name=value i]`)
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub op: Option<(AttributeOp, String)>,
    pub case_insensitive: bool,
}

impl AttributeSelector {
    pub fn accept(&self, doc: &Document, id: NodeId) -> bool {
        if !doc.has_attribute(id, &self.name) {
            return false;
        }
        let Some((op, expected)) = &self.op else {
            return true;
        };
        let actual = doc.get_attribute(id, &self.name).unwrap_or_default();

        if self.case_insensitive {
            op.matches(&actual.to_lowercase(), &expected.to_lowercase())
        } else {
            op.matches(actual, expected)
        }
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name.as_str(), &self.op) {
            ("id", Some((AttributeOp::Equals, value))) if !self.case_insensitive => {
                write!(f, "#{}", value)
            }
            ("class", Some((AttributeOp::Includes, value))) if !self.case_insensitive => {
                write!(f, ".{}", value)
            }
            (name, None) => write!(f, "[{}]", name),
            (name, Some((op, value))) => {
                write!(f, "[{}{}\"{}\"", name, op.sign(), value)?;
                if self.case_insensitive {
                    write!(f, " i")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A simple selector inside a compound selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPart {
    Attribute(AttributeSelector),
    PseudoClass(PseudoClass),
    PseudoFunction(PseudoFunction),
}

/// Predicate over nodes
pub trait NodeFilter {
    fn accept(&self, doc: &Document, id: NodeId) -> bool;
}

impl<F> NodeFilter for F
where
    F: Fn(&Document, NodeId) -> bool,
{
    fn accept(&self, doc: &Document, id: NodeId) -> bool {
        self(doc, id)
    }
}

/// A selector step the engine can evaluate
pub trait Selector: NodeFilter {
    /// How the next step of the group relates to nodes matched by this one
    fn combinator(&self) -> Combinator;

    /// Second-level check against the de-duplicated candidates of a step;
    /// `index` is the position of the node among the candidates.
    fn accept_in_results(&self, _doc: &Document, _results: &[NodeId], _id: NodeId, _index: usize) -> bool {
        true
    }
}

/// One compound selector
#[derive(Debug, Clone, PartialEq)]
pub struct CssSelector {
    /// Element name, `*` for any element
    element: String,
    parts: Vec<SelectorPart>,
    combinator: Combinator,
}

impl CssSelector {
    /// Selector for an element name; `*` selects every element
    pub fn new(element: &str) -> Self {
        Self {
            element: unescape(element),
            parts: Vec::new(),
            combinator: Combinator::Descendant,
        }
    }

    /// `*`
    pub fn universal() -> Self {
        Self::new("*")
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.push_attribute("id", Some((AttributeOp::Equals, unescape(id))), false);
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.push_attribute("class", Some((AttributeOp::Includes, unescape(class))), false);
        self
    }

    /// `[name]`
    pub fn with_attribute(mut self, name: &str) -> Self {
        self.push_attribute(name, None, false);
        self
    }

    /// `[name op value]`
    pub fn with_attribute_value(mut self, name: &str, op: AttributeOp, value: &str) -> Self {
        self.push_attribute(name, Some((op, value.to_string())), false);
        self
    }

    /// `[name op value i]`
    pub fn with_attribute_value_ci(mut self, name: &str, op: AttributeOp, value: &str) -> Self {
        self.push_attribute(name, Some((op, value.to_string())), true);
        self
    }

    pub fn with_pseudo_class(mut self, pseudo_class: PseudoClass) -> Self {
        self.parts.push(SelectorPart::PseudoClass(pseudo_class));
        self
    }

    pub fn with_pseudo_function(mut self, pseudo_function: PseudoFunction) -> Self {
        self.parts.push(SelectorPart::PseudoFunction(pseudo_function));
        self
    }

    /// Set the combinator linking this selector to the next one
    pub fn with_combinator(mut self, combinator: Combinator) -> Self {
        self.combinator = combinator;
        self
    }

    fn push_attribute(&mut self, name: &str, op: Option<(AttributeOp, String)>, case_insensitive: bool) {
        self.parts.push(SelectorPart::Attribute(AttributeSelector {
            name: unescape(name),
            op,
            case_insensitive,
        }));
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn parts(&self) -> &[SelectorPart] {
        &self.parts
    }

    fn matches_element(&self, doc: &Document, id: NodeId) -> bool {
        let Some(element) = doc.element(id) else {
            return false;
        };
        self.element == "*" || *element.name == *doc.config().canonical_name(&self.element)
    }
}

impl NodeFilter for CssSelector {
    fn accept(&self, doc: &Document, id: NodeId) -> bool {
        if !self.matches_element(doc, id) {
            return false;
        }
        self.parts.iter().all(|part| match part {
            SelectorPart::Attribute(attribute) => attribute.accept(doc, id),
            SelectorPart::PseudoClass(pseudo_class) => pseudo_class.accept(doc, id),
            SelectorPart::PseudoFunction(pseudo_function) => pseudo_function.accept(doc, id),
        })
    }
}

impl Selector for CssSelector {
    fn combinator(&self) -> Combinator {
        self.combinator
    }

    fn accept_in_results(&self, _doc: &Document, results: &[NodeId], id: NodeId, index: usize) -> bool {
        self.parts.iter().all(|part| match part {
            SelectorPart::Attribute(_) => true,
            SelectorPart::PseudoClass(pseudo_class) => {
                pseudo_class.accept_in_results(results, id, index)
            }
            SelectorPart::PseudoFunction(pseudo_function) => {
                pseudo_function.accept_in_results(results, id, index)
            }
        })
    }
}

impl fmt::Display for CssSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element)?;
        for part in &self.parts {
            match part {
                SelectorPart::Attribute(attribute) => write!(f, "{}", attribute)?,
                SelectorPart::PseudoClass(pseudo_class) => write!(f, ":{}", pseudo_class.name())?,
                SelectorPart::PseudoFunction(pseudo_function) => write!(f, ":{}", pseudo_function)?,
            }
        }
        Ok(())
    }
}

/// Render a selector group back to selector syntax, e.g. `div > p.note`
pub fn group_to_string(group: &[CssSelector]) -> String {
    let mut out = String::new();
    for (i, selector) in group.iter().enumerate() {
        out.push_str(&selector.to_string());
        if i + 1 < group.len() {
            match selector.combinator {
                Combinator::Descendant => out.push(' '),
                combinator => {
                    out.push(' ');
                    out.push_str(combinator.sign());
                    out.push(' ');
                }
            }
        }
    }
    out
}

/// Render a selector list, e.g. `h1, h2`
pub fn groups_to_string(groups: &[SelectorGroup]) -> String {
    groups
        .iter()
        .map(|group| group_to_string(group))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Backslash escapes are dropped
fn unescape(value: &str) -> String {
    value.replace('\\', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lacerta_dom::DocumentConfig;

    fn element_with(doc: &mut Document, name: &str, attributes: &[(&str, Option<&str>)]) -> NodeId {
        let id = doc.create_element(name);
        for (attr, value) in attributes {
            doc.set_attribute(id, attr, *value).unwrap();
        }
        doc.add_child(doc.document_id(), id).unwrap();
        id
    }

    #[test]
    fn test_type_selector() {
        let mut doc = Document::default();
        let div = element_with(&mut doc, "div", &[]);
        let text = doc.create_text("x");

        assert!(CssSelector::new("div").accept(&doc, div));
        assert!(CssSelector::new("DIV").accept(&doc, div));
        assert!(CssSelector::universal().accept(&doc, div));
        assert!(!CssSelector::new("span").accept(&doc, div));
        assert!(!CssSelector::universal().accept(&doc, text));
    }

    #[test]
    fn test_type_selector_case_sensitive() {
        let mut doc = Document::new(DocumentConfig::xml());
        let item = element_with(&mut doc, "Item", &[]);
        assert!(CssSelector::new("Item").accept(&doc, item));
        assert!(!CssSelector::new("item").accept(&doc, item));
    }

    #[test]
    fn test_id_and_class() {
        let mut doc = Document::default();
        let div = element_with(&mut doc, "div", &[("id", Some("main")), ("class", Some("box wide"))]);

        assert!(CssSelector::new("div").with_id("main").accept(&doc, div));
        assert!(CssSelector::universal().with_class("wide").with_class("box").accept(&doc, div));
        assert!(!CssSelector::universal().with_class("wid").accept(&doc, div));
        assert!(!CssSelector::universal().with_id("other").accept(&doc, div));
    }

    #[test]
    fn test_attribute_selector() {
        let mut doc = Document::default();
        let a = element_with(
            &mut doc,
            "a",
            &[("href", Some("https://example.com/doc.pdf")), ("lang", Some("en-US")), ("download", None)],
        );

        let sel = |name: &str, op: AttributeOp, value: &str| {
            CssSelector::universal().with_attribute_value(name, op, value)
        };

        assert!(CssSelector::universal().with_attribute("download").accept(&doc, a));
        assert!(CssSelector::universal().with_attribute("HREF").accept(&doc, a));
        assert!(!CssSelector::universal().with_attribute("title").accept(&doc, a));

        assert!(sel("href", AttributeOp::PrefixMatch, "https://").accept(&doc, a));
        assert!(sel("href", AttributeOp::SuffixMatch, ".pdf").accept(&doc, a));
        assert!(sel("href", AttributeOp::SubstringMatch, "example").accept(&doc, a));
        assert!(sel("lang", AttributeOp::DashMatch, "en").accept(&doc, a));
        assert!(!sel("lang", AttributeOp::DashMatch, "e").accept(&doc, a));
        assert!(sel("lang", AttributeOp::Equals, "en-US").accept(&doc, a));
        assert!(!sel("lang", AttributeOp::Equals, "en-us").accept(&doc, a));
        assert!(CssSelector::universal()
            .with_attribute_value_ci("lang", AttributeOp::Equals, "en-us")
            .accept(&doc, a));
        assert!(!sel("download", AttributeOp::Equals, "x").accept(&doc, a));
        assert!(sel("download", AttributeOp::Equals, "").accept(&doc, a));
    }

    #[test]
    fn test_display() {
        let group = vec![
            CssSelector::new("ul").with_id("menu").with_combinator(Combinator::Child),
            CssSelector::new("li")
                .with_class("item")
                .with_pseudo_class(PseudoClass::FirstChild),
            CssSelector::new("a").with_attribute_value("href", AttributeOp::PrefixMatch, "http"),
        ];
        assert_eq!(
            group_to_string(&group),
            "ul#menu > li.item:first-child a[href^=\"http\"]"
        );
        assert_eq!(
            groups_to_string(&[vec![CssSelector::new("h1")], vec![CssSelector::new("h2")]]),
            "h1, h2"
        );
    }

    #[test]
    fn test_closure_filter() {
        let mut doc = Document::default();
        let div = element_with(&mut doc, "div", &[]);
        let filter = |doc: &Document, id: NodeId| doc.node_name(id) == Some("div");
        assert!(filter.accept(&doc, div));
    }
}
