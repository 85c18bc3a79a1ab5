//! Implied end tag rules
//!
//! Each rule pairs a set of open (parent) tags with the set of tags that
//! close them implicitly. Names are matched case-insensitively whatever the
//! document mode is: these are HTML heuristics.

use rustc_hash::FxHashSet;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Tags that close an open `<p>` when they start
const P_CLOSERS_ON_OPEN: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "dir", "div", "dl", "dd",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "li", "main", "menu", "nav", "ol", "p", "pre", "section",
    "table", "ul",
];

/// End tags that close an open `<p>` on their way up
const P_CLOSERS_ON_CLOSE: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "footer", "header", "main", "nav",
    "section", "form", "fieldset", "figure", "li", "dd", "dt", "td", "th", "ul", "ol", "dl",
];

/// `(open tags, tags that implicitly close them when starting)`
const IMPLIED_ON_OPEN: &[(&[&str], &[&str])] = &[
    (&["p"], P_CLOSERS_ON_OPEN),
    (&["li"], &["li"]),
    (&["dt", "dd"], &["dt", "dd"]),
    (&["rt", "rp"], &["rt", "rp"]),
    (&["optgroup"], &["optgroup"]),
    (&["option"], &["option", "optgroup"]),
    (&["tr", "td", "th", "colgroup"], &["tr"]),
    (&["td", "th"], &["td", "th"]),
    (
        &["thead", "tbody", "tfoot", "tr", "td", "th", "colgroup", "caption"],
        &["tbody", "thead", "tfoot"],
    ),
];

/// `(open tags, end tags that implicitly close them)`
const IMPLIED_ON_CLOSE: &[(&[&str], &[&str])] = &[
    (&["dd", "dt"], &["dl"]),
    (&["li"], &["ul", "ol"]),
    (&["option"], &["optgroup", "select"]),
    (&["optgroup"], &["select"]),
    (&["td", "th"], &["tr"]),
    (&["td", "tr", "th"], &["tbody", "tfoot", "thead"]),
    (
        &["td", "tr", "tbody", "tfoot", "thead", "th", "caption", "colgroup"],
        &["table"],
    ),
    (
        &["dd", "dt", "li", "p", "tbody", "td", "tfoot", "th", "thead", "tr", "body"],
        &["body", "html"],
    ),
    (&["p"], P_CLOSERS_ON_CLOSE),
];

/// Tags closed silently when still open at end of input
const CLOSED_ON_EOF: &[&str] = &[
    "dd", "dt", "li", "p", "tbody", "td", "tfoot", "th", "thead", "tr", "body", "html",
];

struct Rule {
    parents: FxHashSet<&'static str>,
    triggers: FxHashSet<&'static str>,
}

impl Rule {
    fn matches(&self, parent: &str, trigger: &str) -> bool {
        self.parents.contains(parent) && self.triggers.contains(trigger)
    }
}

fn build(table: &[(&[&'static str], &[&'static str])]) -> Vec<Rule> {
    table
        .iter()
        .map(|(parents, triggers)| Rule {
            parents: parents.iter().copied().collect(),
            triggers: triggers.iter().copied().collect(),
        })
        .collect()
}

fn on_open_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| build(IMPLIED_ON_OPEN))
}

fn on_close_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| build(IMPLIED_ON_CLOSE))
}

fn on_eof_tags() -> &'static FxHashSet<&'static str> {
    static TAGS: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    TAGS.get_or_init(|| CLOSED_ON_EOF.iter().copied().collect())
}

pub(crate) fn lowercase(name: &str) -> Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

/// Does starting `child` implicitly close the open `parent`?
pub fn implicitly_close_parent_on_open(parent: &str, child: &str) -> bool {
    let (parent, child) = (lowercase(parent), lowercase(child));
    on_open_rules().iter().any(|rule| rule.matches(&parent, &child))
}

/// Does the end tag `end_tag` implicitly close the open `parent` on its way up?
pub fn implicitly_close_parent_on_close(parent: &str, end_tag: &str) -> bool {
    let (parent, end_tag) = (lowercase(parent), lowercase(end_tag));
    on_close_rules().iter().any(|rule| rule.matches(&parent, &end_tag))
}

/// May `name` be left open at end of input without an error?
pub fn implicitly_close_on_eof(name: &str) -> bool {
    on_eof_tags().contains(&*lowercase(name))
}
