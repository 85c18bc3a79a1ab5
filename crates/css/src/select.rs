//! Selector engine
//!
//! Evaluates selector groups against a subtree. Every step of a group
//! threads a working set of nodes: the combinator of the previous step
//! decides which nodes around each working node are candidates, the
//! step's selector filters them, and the de-duplicated survivors become
//! the next working set.

use lacerta_dom::{Document, NodeId};
use rustc_hash::FxHashSet;

use crate::selector::{Combinator, NodeFilter, Selector};

/// Runs selector queries below a root node
#[derive(Debug, Clone, Copy)]
pub struct NodeSelector<'a> {
    doc: &'a Document,
    root: NodeId,
}

impl<'a> NodeSelector<'a> {
    pub fn new(doc: &'a Document, root: NodeId) -> Self {
        Self { doc, root }
    }

    /// Query the whole document
    pub fn document(doc: &'a Document) -> Self {
        Self::new(doc, doc.document_id())
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// All nodes matched by any of the groups, without duplicates, in the
    /// order they were first found.
    pub fn select<S: Selector>(&self, groups: &[Vec<S>]) -> Vec<NodeId> {
        let mut results = Vec::new();
        let mut seen = FxHashSet::default();

        for group in groups {
            for id in self.select_group(group) {
                if seen.insert(id) {
                    results.push(id);
                }
            }
        }

        log::trace!(
            "selected {} node(s) below {} with {} group(s)",
            results.len(),
            self.root,
            groups.len()
        );
        results
    }

    pub fn select_first<S: Selector>(&self, groups: &[Vec<S>]) -> Option<NodeId> {
        self.select(groups).into_iter().next()
    }

    /// Nodes matched by one chain of selectors
    pub fn select_group<S: Selector>(&self, group: &[S]) -> Vec<NodeId> {
        if group.is_empty() {
            return Vec::new();
        }

        let mut current = vec![self.root];

        for (i, selector) in group.iter().enumerate() {
            let combinator = if i == 0 {
                Combinator::Descendant
            } else {
                group[i - 1].combinator()
            };

            let mut candidates = Vec::new();
            let mut seen = FxHashSet::default();
            for &node in &current {
                self.walk(node, combinator, selector, &mut candidates, &mut seen);
            }

            current = candidates
                .iter()
                .enumerate()
                .filter(|&(index, &id)| selector.accept_in_results(self.doc, &candidates, id, index))
                .map(|(_, &id)| id)
                .collect();

            log::trace!("step {} ({:?}): {} node(s)", i, combinator, current.len());
            if current.is_empty() {
                break;
            }
        }

        current
    }

    /// Every element below the root accepted by `filter`, in document order
    pub fn select_with<F: NodeFilter + ?Sized>(&self, filter: &F) -> Vec<NodeId> {
        let mut results = Vec::new();
        let mut seen = FxHashSet::default();
        self.walk_descendants(self.root, filter, &mut results, &mut seen);
        results
    }

    pub fn select_first_with<F: NodeFilter + ?Sized>(&self, filter: &F) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.doc.children(self.root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.is_element(id) && filter.accept(self.doc, id) {
                return Some(id);
            }
            stack.extend(self.doc.children(id).iter().rev().copied());
        }
        None
    }

    fn walk<F: NodeFilter + ?Sized>(
        &self,
        node: NodeId,
        combinator: Combinator,
        filter: &F,
        results: &mut Vec<NodeId>,
        seen: &mut FxHashSet<NodeId>,
    ) {
        match combinator {
            Combinator::Descendant => self.walk_descendants(node, filter, results, seen),
            Combinator::Child => {
                for &child in self.doc.children(node) {
                    self.select_and_add(child, filter, results, seen);
                }
            }
            Combinator::AdjacentSibling => {
                if let Some(sibling) = self.doc.next_sibling_element(node) {
                    self.select_and_add(sibling, filter, results, seen);
                }
            }
            Combinator::GeneralSibling => {
                let mut sibling = self.doc.next_sibling_element(node);
                while let Some(id) = sibling {
                    self.select_and_add(id, filter, results, seen);
                    sibling = self.doc.next_sibling_element(id);
                }
            }
        }
    }

    /// Pre-order walk with an explicit stack
    fn walk_descendants<F: NodeFilter + ?Sized>(
        &self,
        node: NodeId,
        filter: &F,
        results: &mut Vec<NodeId>,
        seen: &mut FxHashSet<NodeId>,
    ) {
        let mut stack: Vec<NodeId> = self.doc.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            self.select_and_add(id, filter, results, seen);
            stack.extend(self.doc.children(id).iter().rev().copied());
        }
    }

    fn select_and_add<F: NodeFilter + ?Sized>(
        &self,
        id: NodeId,
        filter: &F,
        results: &mut Vec<NodeId>,
        seen: &mut FxHashSet<NodeId>,
    ) {
        if !self.is_element(id) || !filter.accept(self.doc, id) {
            return;
        }
        if seen.insert(id) {
            results.push(id);
        }
    }

    fn is_element(&self, id: NodeId) -> bool {
        self.doc.get(id).map(|n| n.is_element()).unwrap_or(false)
    }
}

/// Check whether `id` is among the nodes the groups select from its
/// topmost ancestor.
///
/// Every call selects over the whole tree, which makes per-candidate use
/// (as in `:not`) quadratic in the document size.
pub fn matches<S: Selector>(doc: &Document, id: NodeId, groups: &[Vec<S>]) -> bool {
    let top = doc.ancestors(id).last().unwrap_or(id);
    let selector = NodeSelector::new(doc, top);
    groups
        .iter()
        .any(|group| selector.select_group(group).contains(&id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{CssSelector, SelectorGroup};

    /// `<div><p class="x"/><p/><span/></div><p/>`
    fn page() -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::default();
        let div = doc.create_element("div");
        let p1 = doc.create_element("p");
        doc.set_attribute(p1, "class", Some("x")).unwrap();
        let p2 = doc.create_element("p");
        let span = doc.create_element("span");
        let p3 = doc.create_element("p");
        doc.add_children(doc.document_id(), &[div, p3]).unwrap();
        doc.add_children(div, &[p1, p2, span]).unwrap();
        (doc, div, vec![p1, p2, span, p3])
    }

    fn group(selectors: &[CssSelector]) -> SelectorGroup {
        selectors.to_vec()
    }

    #[test]
    fn test_select_descendants() {
        let (doc, div, nodes) = page();
        let selector = NodeSelector::document(&doc);

        let all_p = selector.select(&[group(&[CssSelector::new("p")])]);
        assert_eq!(all_p, vec![nodes[0], nodes[1], nodes[3]]);

        let inner_p = selector.select(&[group(&[CssSelector::new("div"), CssSelector::new("p")])]);
        assert_eq!(inner_p, vec![nodes[0], nodes[1]]);

        let below_div = NodeSelector::new(&doc, div).select(&[group(&[CssSelector::universal()])]);
        assert_eq!(below_div, vec![nodes[0], nodes[1], nodes[2]]);
    }

    #[test]
    fn test_select_siblings() {
        let (doc, _, nodes) = page();
        let selector = NodeSelector::document(&doc);

        let adjacent = selector.select(&[group(&[
            CssSelector::new("p").with_combinator(Combinator::AdjacentSibling),
            CssSelector::universal(),
        ])]);
        assert_eq!(adjacent, vec![nodes[1], nodes[2]]);

        let general = selector.select(&[group(&[
            CssSelector::new("p")
                .with_class("x")
                .with_combinator(Combinator::GeneralSibling),
            CssSelector::universal(),
        ])]);
        assert_eq!(general, vec![nodes[1], nodes[2]]);
    }

    #[test]
    fn test_union_keeps_first_seen_order() {
        let (doc, _, nodes) = page();
        let selector = NodeSelector::document(&doc);

        let results = selector.select(&[
            group(&[CssSelector::new("span")]),
            group(&[CssSelector::new("p")]),
            group(&[CssSelector::new("span")]),
        ]);
        assert_eq!(results, vec![nodes[2], nodes[0], nodes[1], nodes[3]]);
    }

    #[test]
    fn test_empty_group_selects_nothing() {
        let (doc, _, _) = page();
        let selector = NodeSelector::document(&doc);
        assert!(selector.select::<CssSelector>(&[vec![]]).is_empty());
        assert!(selector.select::<CssSelector>(&[]).is_empty());
        assert_eq!(selector.select_first::<CssSelector>(&[]), None);
    }

    #[test]
    fn test_select_with_filter() {
        let (doc, div, nodes) = page();
        let selector = NodeSelector::document(&doc);

        let childless = |doc: &Document, id: NodeId| doc.child_count(id) == 0;
        assert_eq!(selector.select_with(&childless), vec![nodes[0], nodes[1], nodes[2], nodes[3]]);
        assert_eq!(selector.select_first_with(&childless), Some(nodes[0]));

        let is_div = |doc: &Document, id: NodeId| doc.node_name(id) == Some("div");
        assert_eq!(selector.select_first_with(&is_div), Some(div));
    }

    #[test]
    fn test_matches() {
        let (doc, _, nodes) = page();
        let inner_p = vec![group(&[
            CssSelector::new("div").with_combinator(Combinator::Child),
            CssSelector::new("p"),
        ])];
        assert!(matches(&doc, nodes[0], &inner_p));
        assert!(matches(&doc, nodes[1], &inner_p));
        assert!(!matches(&doc, nodes[3], &inner_p));
        assert!(!matches(&doc, nodes[2], &inner_p));
    }
}
