//! Lacerta CSS selector engine
//!
//! Pre-parsed selector objects and the engine that evaluates them over a
//! [`lacerta_dom::Document`]. Selector text parsing is not part of this
//! crate: callers build [`CssSelector`] chains directly.

pub mod error;
pub mod pseudo;
pub mod select;
pub mod selector;

pub use error::{CssError, CssResult};
pub use pseudo::{NthExpression, PseudoClass, PseudoFunction};
pub use select::{matches, NodeSelector};
pub use selector::{
    group_to_string, groups_to_string, AttributeOp, AttributeSelector, Combinator, CssSelector,
    NodeFilter, Selector, SelectorGroup, SelectorPart,
};

use lacerta_dom::{Document, NodeId};

/// Select from the whole document
pub fn select(doc: &Document, groups: &[SelectorGroup]) -> Vec<NodeId> {
    NodeSelector::document(doc).select(groups)
}

/// First node [`select`] would return
pub fn select_first(doc: &Document, groups: &[SelectorGroup]) -> Option<NodeId> {
    NodeSelector::document(doc).select_first(groups)
}
