//! Pseudo-classes and pseudo-functions
//!
//! Structural pseudo-classes (`:first-child`, `:nth-of-type(2n)`, ...) are
//! decided per node from the sibling indices the document keeps. The
//! positional extensions (`:first`, `:even`, `:eq(n)`, ...) accept every node
//! during traversal and are decided afterwards against the candidate list of
//! the selector step.

use lacerta_dom::{Document, NodeId, NodeType};
use std::fmt;

use crate::error::{CssError, CssResult};
use crate::select::{self, NodeSelector};
use crate::selector::{groups_to_string, SelectorGroup};

/// Argument-less pseudo-classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Root,
    Empty,
    Parent,
    Checked,
    Selected,
    Header,
    Button,
    Checkbox,
    File,
    Image,
    Input,
    Password,
    Radio,
    Reset,
    Submit,
    Text,
    First,
    Last,
    Even,
    Odd,
}

const PSEUDO_CLASSES: &[PseudoClass] = &[
    PseudoClass::FirstChild,
    PseudoClass::LastChild,
    PseudoClass::OnlyChild,
    PseudoClass::FirstOfType,
    PseudoClass::LastOfType,
    PseudoClass::OnlyOfType,
    PseudoClass::Root,
    PseudoClass::Empty,
    PseudoClass::Parent,
    PseudoClass::Checked,
    PseudoClass::Selected,
    PseudoClass::Header,
    PseudoClass::Button,
    PseudoClass::Checkbox,
    PseudoClass::File,
    PseudoClass::Image,
    PseudoClass::Input,
    PseudoClass::Password,
    PseudoClass::Radio,
    PseudoClass::Reset,
    PseudoClass::Submit,
    PseudoClass::Text,
    PseudoClass::First,
    PseudoClass::Last,
    PseudoClass::Even,
    PseudoClass::Odd,
];

impl PseudoClass {
    /// Look a pseudo-class up by name, without the leading colon
    pub fn from_name(name: &str) -> CssResult<Self> {
        PSEUDO_CLASSES
            .iter()
            .copied()
            .find(|pc| pc.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| CssError::UnknownPseudoClass(name.to_string()))
    }

    pub fn name(self) -> &'static str {
        match self {
            PseudoClass::FirstChild => "first-child",
            PseudoClass::LastChild => "last-child",
            PseudoClass::OnlyChild => "only-child",
            PseudoClass::FirstOfType => "first-of-type",
            PseudoClass::LastOfType => "last-of-type",
            PseudoClass::OnlyOfType => "only-of-type",
            PseudoClass::Root => "root",
            PseudoClass::Empty => "empty",
            PseudoClass::Parent => "parent",
            PseudoClass::Checked => "checked",
            PseudoClass::Selected => "selected",
            PseudoClass::Header => "header",
            PseudoClass::Button => "button",
            PseudoClass::Checkbox => "checkbox",
            PseudoClass::File => "file",
            PseudoClass::Image => "image",
            PseudoClass::Input => "input",
            PseudoClass::Password => "password",
            PseudoClass::Radio => "radio",
            PseudoClass::Reset => "reset",
            PseudoClass::Submit => "submit",
            PseudoClass::Text => "text",
            PseudoClass::First => "first",
            PseudoClass::Last => "last",
            PseudoClass::Even => "even",
            PseudoClass::Odd => "odd",
        }
    }

    /// Per-node test, applied during traversal
    pub fn accept(self, doc: &Document, id: NodeId) -> bool {
        match self {
            PseudoClass::FirstChild => doc.sibling_element_index(id) == Some(0),
            PseudoClass::LastChild => match (doc.sibling_element_index(id), doc.parent(id)) {
                (Some(index), Some(parent)) => index + 1 == doc.child_element_count(parent),
                _ => false,
            },
            PseudoClass::OnlyChild => match (doc.sibling_element_index(id), doc.parent(id)) {
                (Some(0), Some(parent)) => doc.child_element_count(parent) == 1,
                _ => false,
            },
            PseudoClass::FirstOfType => doc.sibling_name_index(id) == Some(0),
            PseudoClass::LastOfType => {
                doc.parent(id).is_some() && doc.next_sibling_same_name(id).is_none()
            }
            PseudoClass::OnlyOfType => {
                doc.sibling_name_index(id) == Some(0) && doc.next_sibling_same_name(id).is_none()
            }
            PseudoClass::Root => doc
                .parent(id)
                .and_then(|parent| doc.get(parent))
                .map(|parent| parent.node_type() == NodeType::Document)
                .unwrap_or(false),
            PseudoClass::Empty => doc.child_count(id) == 0,
            PseudoClass::Parent => doc.child_count(id) != 0,
            PseudoClass::Checked => doc.has_attribute(id, "checked"),
            PseudoClass::Selected => doc.has_attribute(id, "selected"),
            PseudoClass::Header => is_header(doc.node_name(id)),
            PseudoClass::Input => matches!(
                doc.node_name(id),
                Some("button" | "input" | "select" | "textarea")
            ),
            PseudoClass::Button
            | PseudoClass::Checkbox
            | PseudoClass::File
            | PseudoClass::Image
            | PseudoClass::Password
            | PseudoClass::Radio
            | PseudoClass::Reset
            | PseudoClass::Submit
            | PseudoClass::Text => doc.get_attribute(id, "type") == Some(self.name()),
            PseudoClass::First | PseudoClass::Last | PseudoClass::Even | PseudoClass::Odd => true,
        }
    }

    /// Positional test against the candidates of the current selector step
    pub fn accept_in_results(self, results: &[NodeId], id: NodeId, index: usize) -> bool {
        match self {
            PseudoClass::First => results.first() == Some(&id),
            PseudoClass::Last => results.last() == Some(&id),
            PseudoClass::Even => index % 2 == 0,
            PseudoClass::Odd => index % 2 != 0,
            _ => true,
        }
    }
}

fn is_header(name: Option<&str>) -> bool {
    match name.map(str::as_bytes) {
        Some([h, level]) => matches!(h, b'h' | b'H') && (b'1'..=b'6').contains(level),
        _ => false,
    }
}

/// The `an+b` argument of the nth pseudo-functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpression {
    pub a: i32,
    pub b: i32,
}

impl NthExpression {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse `odd`, `even`, `b`, `an`, `an+b`, `-n+b` ...
    pub fn parse(expression: &str) -> CssResult<Self> {
        let compact: String = expression
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        let invalid = || CssError::InvalidNthExpression(expression.to_string());

        match compact.as_str() {
            "odd" => return Ok(Self::new(2, 1)),
            "even" => return Ok(Self::new(2, 0)),
            "" => return Err(invalid()),
            _ => {}
        }

        let Some(n_pos) = compact.find('n') else {
            let b = compact.parse().map_err(|_| invalid())?;
            return Ok(Self::new(0, b));
        };

        let a = match &compact[..n_pos] {
            "" | "+" => 1,
            "-" => -1,
            a_part => a_part.parse().map_err(|_| invalid())?,
        };
        let b = match &compact[n_pos + 1..] {
            "" => 0,
            b_part if b_part.starts_with('+') || b_part.starts_with('-') => {
                b_part.trim_start_matches('+').parse().map_err(|_| invalid())?
            }
            _ => return Err(invalid()),
        };

        Ok(Self::new(a, b))
    }

    /// Check a 1-based position against the formula
    pub fn matches(&self, value: i32) -> bool {
        if self.a == 0 {
            return value == self.b;
        }

        let (a, diff) = (i64::from(self.a), i64::from(value) - i64::from(self.b));
        if a > 0 {
            diff >= 0 && diff % a == 0
        } else {
            diff <= 0 && diff % a == 0
        }
    }
}

impl fmt::Display for NthExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (0, b) => write!(f, "{}", b),
            (a, 0) => write!(f, "{}n", a),
            (a, b) => write!(f, "{}n{:+}", a, b),
        }
    }
}

/// Pseudo-classes with an argument
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoFunction {
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),
    /// Position in the step's candidates; negative values count from the end
    Eq(i32),
    Gt(i32),
    Lt(i32),
    /// Text content contains the string
    Contains(String),
    /// Some descendant matches one of the groups
    Has(Vec<SelectorGroup>),
    /// The node is not matched by any of the groups.
    ///
    /// Each check runs the groups from the node's topmost ancestor, so a
    /// `:not` step costs a full selection per candidate.
    Not(Vec<SelectorGroup>),
}

impl PseudoFunction {
    /// Build a pseudo-function from its name and raw argument.
    ///
    /// `has` and `not` take selector groups; use the variants directly.
    pub fn parse(name: &str, expression: &str) -> CssResult<Self> {
        let name = name.to_ascii_lowercase();
        let integer = |expression: &str| {
            expression
                .trim()
                .parse::<i32>()
                .map_err(|_| CssError::invalid_argument(&name, expression))
        };

        match name.as_str() {
            "nth-child" => Ok(PseudoFunction::NthChild(NthExpression::parse(expression)?)),
            "nth-last-child" => Ok(PseudoFunction::NthLastChild(NthExpression::parse(expression)?)),
            "nth-of-type" => Ok(PseudoFunction::NthOfType(NthExpression::parse(expression)?)),
            "nth-last-of-type" => {
                Ok(PseudoFunction::NthLastOfType(NthExpression::parse(expression)?))
            }
            "eq" => Ok(PseudoFunction::Eq(integer(expression)?)),
            "gt" => Ok(PseudoFunction::Gt(integer(expression)?)),
            "lt" => Ok(PseudoFunction::Lt(integer(expression)?)),
            "contains" => Ok(PseudoFunction::Contains(unquote(expression).to_string())),
            "has" | "not" => Err(CssError::SelectorArgument(name.clone())),
            _ => Err(CssError::UnknownPseudoFunction(name.clone())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PseudoFunction::NthChild(_) => "nth-child",
            PseudoFunction::NthLastChild(_) => "nth-last-child",
            PseudoFunction::NthOfType(_) => "nth-of-type",
            PseudoFunction::NthLastOfType(_) => "nth-last-of-type",
            PseudoFunction::Eq(_) => "eq",
            PseudoFunction::Gt(_) => "gt",
            PseudoFunction::Lt(_) => "lt",
            PseudoFunction::Contains(_) => "contains",
            PseudoFunction::Has(_) => "has",
            PseudoFunction::Not(_) => "not",
        }
    }

    /// Per-node test, applied during traversal
    pub fn accept(&self, doc: &Document, id: NodeId) -> bool {
        match self {
            PseudoFunction::NthChild(nth) => doc
                .sibling_element_index(id)
                .map(|index| nth.matches(index as i32 + 1))
                .unwrap_or(false),
            PseudoFunction::NthLastChild(nth) => {
                match (doc.sibling_element_index(id), doc.parent(id)) {
                    (Some(index), Some(parent)) => {
                        nth.matches((doc.child_element_count(parent) - index) as i32)
                    }
                    _ => false,
                }
            }
            PseudoFunction::NthOfType(nth) => doc
                .sibling_name_index(id)
                .map(|index| nth.matches(index as i32 + 1))
                .unwrap_or(false),
            PseudoFunction::NthLastOfType(nth) => {
                let (Some(index), Some(parent), Some(name)) =
                    (doc.sibling_name_index(id), doc.parent(id), doc.node_name(id))
                else {
                    return false;
                };
                let count = doc.child_elements_named_count(parent, name);
                nth.matches((count - index) as i32)
            }
            PseudoFunction::Eq(_) | PseudoFunction::Gt(_) | PseudoFunction::Lt(_) => true,
            PseudoFunction::Contains(text) => doc.text_content(id).contains(text.as_str()),
            PseudoFunction::Has(groups) => NodeSelector::new(doc, id).select_first(groups).is_some(),
            PseudoFunction::Not(groups) => !select::matches(doc, id, groups),
        }
    }

    /// Positional test against the candidates of the current selector step
    pub fn accept_in_results(&self, results: &[NodeId], _id: NodeId, index: usize) -> bool {
        let index = index as i64;
        match *self {
            PseudoFunction::Eq(value) if value >= 0 => index == value as i64,
            PseudoFunction::Eq(value) => index == results.len() as i64 + value as i64,
            PseudoFunction::Gt(value) => index > value as i64,
            PseudoFunction::Lt(value) => index < value as i64,
            _ => true,
        }
    }
}

impl fmt::Display for PseudoFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        match self {
            PseudoFunction::NthChild(nth)
            | PseudoFunction::NthLastChild(nth)
            | PseudoFunction::NthOfType(nth)
            | PseudoFunction::NthLastOfType(nth) => write!(f, "{}", nth)?,
            PseudoFunction::Eq(value) | PseudoFunction::Gt(value) | PseudoFunction::Lt(value) => {
                write!(f, "{}", value)?
            }
            PseudoFunction::Contains(text) => write!(f, "{}", text)?,
            PseudoFunction::Has(groups) | PseudoFunction::Not(groups) => {
                write!(f, "{}", groups_to_string(groups))?
            }
        }
        write!(f, ")")
    }
}

/// Strip one pair of matching quotes
fn unquote(expression: &str) -> &str {
    let bytes = expression.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(b'\''), Some(b'\'')) | (Some(b'"'), Some(b'"')) if bytes.len() >= 2 => {
            &expression[1..expression.len() - 1]
        }
        _ => expression,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lacerta_dom::DocumentConfig;

    /// `<ul><li/><li/><p/><li/></ul>` with a text node between the first two items
    fn list() -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::new(DocumentConfig::html());
        let ul = doc.create_element("ul");
        doc.add_child(doc.document_id(), ul).unwrap();

        let first = doc.create_element("li");
        let text = doc.create_text(" ");
        let second = doc.create_element("li");
        let p = doc.create_element("p");
        let third = doc.create_element("li");
        doc.add_children(ul, &[first, text, second, p, third]).unwrap();
        (doc, ul, vec![first, second, p, third])
    }

    #[test]
    fn test_from_name() {
        assert_eq!(PseudoClass::from_name("first-child"), Ok(PseudoClass::FirstChild));
        assert_eq!(PseudoClass::from_name("ODD"), Ok(PseudoClass::Odd));
        assert_eq!(
            PseudoClass::from_name("hover"),
            Err(CssError::UnknownPseudoClass("hover".to_string()))
        );
    }

    #[test]
    fn test_child_pseudo_classes() {
        let (doc, ul, items) = list();
        let (first, second, p, third) = (items[0], items[1], items[2], items[3]);

        assert!(PseudoClass::FirstChild.accept(&doc, first));
        assert!(!PseudoClass::FirstChild.accept(&doc, second));
        assert!(PseudoClass::LastChild.accept(&doc, third));
        assert!(!PseudoClass::LastChild.accept(&doc, p));
        assert!(!PseudoClass::OnlyChild.accept(&doc, first));
        assert!(PseudoClass::OnlyChild.accept(&doc, ul));
        assert!(PseudoClass::Root.accept(&doc, ul));
        assert!(!PseudoClass::Root.accept(&doc, first));
    }

    #[test]
    fn test_type_pseudo_classes() {
        let (doc, _, items) = list();
        let (first, second, p, third) = (items[0], items[1], items[2], items[3]);

        assert!(PseudoClass::FirstOfType.accept(&doc, first));
        assert!(!PseudoClass::FirstOfType.accept(&doc, second));
        assert!(PseudoClass::FirstOfType.accept(&doc, p));
        assert!(PseudoClass::LastOfType.accept(&doc, third));
        assert!(!PseudoClass::LastOfType.accept(&doc, second));
        assert!(PseudoClass::OnlyOfType.accept(&doc, p));
        assert!(!PseudoClass::OnlyOfType.accept(&doc, first));
    }

    #[test]
    fn test_content_pseudo_classes() {
        let (doc, ul, items) = list();
        assert!(PseudoClass::Empty.accept(&doc, items[0]));
        assert!(!PseudoClass::Parent.accept(&doc, items[0]));
        assert!(PseudoClass::Parent.accept(&doc, ul));
    }

    #[test]
    fn test_form_pseudo_classes() {
        let mut doc = Document::default();
        let input = doc.create_element("input");
        doc.set_attribute(input, "type", Some("checkbox")).unwrap();
        doc.set_attribute(input, "checked", None).unwrap();
        let h3 = doc.create_element("H3");
        let hr = doc.create_element("hr");
        doc.add_children(doc.document_id(), &[input, h3, hr]).unwrap();

        assert!(PseudoClass::Checkbox.accept(&doc, input));
        assert!(!PseudoClass::Radio.accept(&doc, input));
        assert!(PseudoClass::Checked.accept(&doc, input));
        assert!(!PseudoClass::Selected.accept(&doc, input));
        assert!(PseudoClass::Input.accept(&doc, input));
        assert!(!PseudoClass::Input.accept(&doc, h3));
        assert!(PseudoClass::Header.accept(&doc, h3));
        assert!(!PseudoClass::Header.accept(&doc, hr));
    }

    #[test]
    fn test_positional_pseudo_classes() {
        let results = [NodeId(3), NodeId(5), NodeId(8)];
        assert!(PseudoClass::First.accept_in_results(&results, NodeId(3), 0));
        assert!(!PseudoClass::First.accept_in_results(&results, NodeId(5), 1));
        assert!(PseudoClass::Last.accept_in_results(&results, NodeId(8), 2));
        assert!(PseudoClass::Even.accept_in_results(&results, NodeId(8), 2));
        assert!(PseudoClass::Odd.accept_in_results(&results, NodeId(5), 1));
        assert!(!PseudoClass::Last.accept_in_results(&[], NodeId(8), 0));
    }

    #[test]
    fn test_nth_expression_parse() {
        assert_eq!(NthExpression::parse("odd"), Ok(NthExpression::new(2, 1)));
        assert_eq!(NthExpression::parse("even"), Ok(NthExpression::new(2, 0)));
        assert_eq!(NthExpression::parse("3"), Ok(NthExpression::new(0, 3)));
        assert_eq!(NthExpression::parse("2n + 1"), Ok(NthExpression::new(2, 1)));
        assert_eq!(NthExpression::parse("-n+3"), Ok(NthExpression::new(-1, 3)));
        assert_eq!(NthExpression::parse("n"), Ok(NthExpression::new(1, 0)));
        assert_eq!(NthExpression::parse("3n-2"), Ok(NthExpression::new(3, -2)));
        assert!(NthExpression::parse("x").is_err());
        assert!(NthExpression::parse("2n1").is_err());
        assert!(NthExpression::parse("").is_err());
    }

    #[test]
    fn test_nth_expression_matches() {
        let odd = NthExpression::new(2, 1);
        assert!(odd.matches(1));
        assert!(!odd.matches(2));
        assert!(odd.matches(3));

        let first_three = NthExpression::new(-1, 3);
        assert!(first_three.matches(1));
        assert!(first_three.matches(3));
        assert!(!first_three.matches(4));

        assert!(NthExpression::new(0, 2).matches(2));
        assert!(!NthExpression::new(0, 2).matches(4));
        assert_eq!(NthExpression::new(3, -2).to_string(), "3n-2");
    }

    #[test]
    fn test_nth_expression_extreme_offsets() {
        let low = NthExpression::parse("n-2147483648").unwrap();
        assert!(low.matches(1));
        assert!(low.matches(i32::MAX));

        let high = NthExpression::parse("-n+2147483647").unwrap();
        assert!(high.matches(1));

        let exact = NthExpression::parse("-2147483648").unwrap();
        assert!(!exact.matches(1));

        let steep = NthExpression::parse("-2147483648n+2147483647").unwrap();
        assert!(!steep.matches(1));
        assert!(steep.matches(i32::MAX));
    }

    #[test]
    fn test_nth_functions() {
        let (doc, _, items) = list();
        let (first, second, p, third) = (items[0], items[1], items[2], items[3]);

        let nth_child = PseudoFunction::parse("nth-child", "2").unwrap();
        assert!(nth_child.accept(&doc, second));
        assert!(!nth_child.accept(&doc, first));

        let nth_last_child = PseudoFunction::parse("nth-last-child", "2").unwrap();
        assert!(nth_last_child.accept(&doc, p));

        let nth_of_type = PseudoFunction::parse("nth-of-type", "3").unwrap();
        assert!(nth_of_type.accept(&doc, third));
        assert!(!nth_of_type.accept(&doc, p));

        let nth_last_of_type = PseudoFunction::parse("nth-last-of-type", "3").unwrap();
        assert!(nth_last_of_type.accept(&doc, first));
        assert!(!nth_last_of_type.accept(&doc, third));
    }

    #[test]
    fn test_positional_functions() {
        let results = [NodeId(1), NodeId(2), NodeId(3), NodeId(4)];
        let eq = PseudoFunction::parse("eq", " 1 ").unwrap();
        assert!(eq.accept_in_results(&results, NodeId(2), 1));
        assert!(!eq.accept_in_results(&results, NodeId(3), 2));

        let eq_last = PseudoFunction::Eq(-1);
        assert!(eq_last.accept_in_results(&results, NodeId(4), 3));

        let gt = PseudoFunction::Gt(1);
        assert!(!gt.accept_in_results(&results, NodeId(2), 1));
        assert!(gt.accept_in_results(&results, NodeId(3), 2));

        let lt = PseudoFunction::Lt(1);
        assert!(lt.accept_in_results(&results, NodeId(1), 0));
        assert!(!lt.accept_in_results(&results, NodeId(2), 1));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            PseudoFunction::parse("eq", "x"),
            Err(CssError::invalid_argument("eq", "x"))
        );
        assert_eq!(
            PseudoFunction::parse("nth-child", "abc"),
            Err(CssError::InvalidNthExpression("abc".to_string()))
        );
        assert_eq!(
            PseudoFunction::parse("lang", "en"),
            Err(CssError::UnknownPseudoFunction("lang".to_string()))
        );
        assert_eq!(
            PseudoFunction::parse("not", "p"),
            Err(CssError::SelectorArgument("not".to_string()))
        );
    }

    #[test]
    fn test_contains() {
        let mut doc = Document::default();
        let p = doc.create_element("p");
        let b = doc.create_element("b");
        let hello = doc.create_text("Hello ");
        let world = doc.create_text("world");
        doc.add_child(doc.document_id(), p).unwrap();
        doc.add_children(p, &[hello, b]).unwrap();
        doc.add_child(b, world).unwrap();

        assert!(PseudoFunction::parse("contains", "'lo wor'").unwrap().accept(&doc, p));
        assert!(PseudoFunction::parse("contains", "world").unwrap().accept(&doc, b));
        assert!(!PseudoFunction::parse("contains", "\"Hello\"").unwrap().accept(&doc, b));
    }

    #[test]
    fn test_display() {
        assert_eq!(PseudoFunction::NthChild(NthExpression::new(2, 1)).to_string(), "nth-child(2n+1)");
        assert_eq!(PseudoFunction::Eq(-1).to_string(), "eq(-1)");
        assert_eq!(PseudoFunction::Contains("x".to_string()).to_string(), "contains(x)");
    }
}
