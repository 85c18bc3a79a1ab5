//! DOM Tree structure
//!
//! The [`Document`] owns every node in an arena indexed by [`NodeId`].
//! Children are owned by their parent through id lists; the parent link is a
//! plain id. Three sibling indices are kept per node: the position among all
//! children (always current), the position among element children (always
//! current) and the position among same-name element siblings (lazy, reset by
//! any structural change). The array of element children is cached lazily as
//! well and dropped on mutation, except when nodes are appended.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use string_cache::DefaultAtom;

use crate::config::DocumentConfig;
use crate::error::{DomError, DomResult};
use crate::node::{Attribute, ElementData, Node, NodeId, NodeKind};

type Batch = SmallVec<[NodeId; 8]>;

/// A document tree: the node arena plus its configuration and diagnostics
pub struct Document {
    /// All nodes ever created for this document, attached or not
    nodes: Vec<Node>,
    config: DocumentConfig,
    errors: Vec<String>,
    started: Instant,
    elapsed: Option<Duration>,
}

impl Document {
    /// Create a new empty document
    pub fn new(config: DocumentConfig) -> Self {
        Self {
            nodes: vec![Node::new(NodeId::ROOT, NodeKind::Document)],
            config,
            errors: Vec::new(),
            started: Instant::now(),
            elapsed: None,
        }
    }

    /// Get the document (root) node ID
    pub fn document_id(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Diagnostics recorded while building; empty unless `collect_errors` is set
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Record a diagnostic
    pub fn add_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        if self.config.collect_errors {
            self.errors.push(message);
        }
    }

    /// Stop the elapsed-time measurement started when the document was created
    pub fn end(&mut self) {
        self.elapsed = Some(self.started.elapsed());
    }

    /// Time between creation and [`Document::end`]
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NodeNotFound(id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.nodes.get_mut(id.index()).ok_or(DomError::NodeNotFound(id.0))
    }

    /// Get element data by ID
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| n.as_element())
    }

    /// Get mutable element data by ID
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.nodes.get_mut(id.index()).and_then(|n| n.as_element_mut())
    }

    /// Canonical node name, see [`Node::node_name`]
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| n.node_name())
    }

    fn is_element(&self, id: NodeId) -> bool {
        self.get(id).map(|n| n.is_element()).unwrap_or(false)
    }

    // ---------------------------------------------------------------- factory

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node::new(id, kind));
        id
    }

    /// Create a new, detached element node
    pub fn create_element(&mut self, raw_name: &str) -> NodeId {
        let name = DefaultAtom::from(&*self.config.canonical_name(raw_name));
        self.alloc(NodeKind::Element(ElementData::new(name, raw_name)))
    }

    /// Create a new text node
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(content.into()))
    }

    /// Create a new comment node
    pub fn create_comment(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Comment(content.into()))
    }

    /// Create a new CDATA node
    pub fn create_cdata(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::CData(content.into()))
    }

    /// Create a DOCTYPE node
    pub fn create_doctype(
        &mut self,
        name: impl Into<String>,
        public_id: Option<String>,
        system_id: Option<String>,
    ) -> NodeId {
        self.alloc(NodeKind::DocumentType {
            name: name.into(),
            public_id,
            system_id,
        })
    }

    /// Create an XML declaration node
    pub fn create_xml_declaration(
        &mut self,
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<String>,
    ) -> NodeId {
        self.alloc(NodeKind::XmlDeclaration {
            version,
            encoding,
            standalone,
        })
    }

    /// Replace the payload of a text, comment or CDATA node
    pub fn set_node_value(&mut self, id: NodeId, value: impl Into<String>) -> DomResult<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(v) | NodeKind::Comment(v) | NodeKind::CData(v) => {
                *v = value.into();
                Ok(())
            }
            _ => Err(DomError::InvalidNodeType),
        }
    }

    /// Append to the payload of a text node
    pub fn append_text(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(value) => {
                value.push_str(text);
                Ok(())
            }
            _ => Err(DomError::InvalidNodeType),
        }
    }

    // ---------------------------------------------------------------- attributes

    /// All attributes of an element, in insertion order
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.element(id).map(|e| &e.attributes[..]).unwrap_or(&[])
    }

    /// Get an attribute value; names are folded per the document config
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let name = self.config.canonical_name(name);
        self.element(id)?.get_attribute(&name)
    }

    /// Check for an attribute, with or without a value
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        let name = self.config.canonical_name(name);
        self.element(id).map(|e| e.has_attribute(&name)).unwrap_or(false)
    }

    /// Set an attribute; an existing attribute is updated in place
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: Option<&str>) -> DomResult<()> {
        let canonical = DefaultAtom::from(&*self.config.canonical_name(name));
        let element = self
            .node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)?;
        element.set_attribute(name, canonical, value.map(str::to_string));
        Ok(())
    }

    /// Remove an attribute, returning whether it existed
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        let name = self.config.canonical_name(name).into_owned();
        self.element_mut(id)
            .map(|e| e.remove_attribute(&name))
            .unwrap_or(false)
    }

    // ---------------------------------------------------------------- structure

    fn check_insertable(&self, parent_id: NodeId, child_id: NodeId) -> DomResult<()> {
        let parent = self.node(parent_id)?;
        self.node(child_id)?;

        if !parent.is_document() && !parent.is_element() {
            return Err(DomError::HierarchyRequest(format!(
                "{} cannot have children",
                parent_id
            )));
        }
        if child_id == NodeId::ROOT {
            return Err(DomError::HierarchyRequest(
                "the document node cannot be inserted".to_string(),
            ));
        }

        let mut current = Some(parent_id);
        while let Some(id) = current {
            if id == child_id {
                return Err(DomError::HierarchyRequest(format!(
                    "{} cannot be inserted into itself or its descendants",
                    child_id
                )));
            }
            current = self.nodes[id.index()].parent;
        }
        Ok(())
    }

    fn prepare_batch(&self, parent_id: NodeId, nodes: &[NodeId]) -> DomResult<Batch> {
        let mut batch = Batch::new();
        for &id in nodes {
            self.check_insertable(parent_id, id)?;
            if !batch.contains(&id) {
                batch.push(id);
            }
        }
        Ok(batch)
    }

    /// Remove a node from its parent; detached and root nodes are left alone
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        let node = self.node(id)?;
        let Some(parent_id) = node.parent else {
            return Ok(());
        };
        let index = node.sibling_index;

        let parent = self.node_mut(parent_id)?;
        debug_assert_eq!(parent.children.get(index), Some(&id));
        parent.children.remove(index);

        self.reset_position(id);
        self.reindex_children(parent_id);
        Ok(())
    }

    fn reset_position(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.index()];
        node.parent = None;
        node.sibling_index = 0;
        node.sibling_element_index = None;
        node.sibling_name_index = OnceLock::new();
    }

    /// Append a child node, detaching it from its previous parent first
    pub fn add_child(&mut self, parent_id: NodeId, child_id: NodeId) -> DomResult<()> {
        self.add_children(parent_id, &[child_id])
    }

    /// Append several nodes in order
    pub fn add_children(&mut self, parent_id: NodeId, nodes: &[NodeId]) -> DomResult<()> {
        let batch = self.prepare_batch(parent_id, nodes)?;
        if batch.is_empty() {
            return Ok(());
        }
        for &id in &batch {
            self.detach(id)?;
        }
        for &id in &batch {
            self.nodes[id.index()].parent = Some(parent_id);
            self.nodes[parent_id.index()].children.push(id);
        }
        self.reindex_children_on_add(parent_id, batch.len());
        Ok(())
    }

    /// Insert a node at the given child position
    pub fn insert_child(&mut self, parent_id: NodeId, child_id: NodeId, index: usize) -> DomResult<()> {
        self.insert_children(parent_id, &[child_id], index)
    }

    /// Insert several nodes, in order, starting at the given child position.
    ///
    /// The position is interpreted after the nodes have been detached.
    pub fn insert_children(&mut self, parent_id: NodeId, nodes: &[NodeId], index: usize) -> DomResult<()> {
        let batch = self.prepare_batch(parent_id, nodes)?;
        let own = batch
            .iter()
            .filter(|id| self.nodes[id.index()].parent == Some(parent_id))
            .count();
        let len = self.nodes[parent_id.index()].children.len() - own;
        if index > len {
            return Err(DomError::InvalidIndex { index, len });
        }
        for &id in &batch {
            self.detach(id)?;
        }
        self.splice_at(parent_id, &batch, index);
        Ok(())
    }

    /// Insert a node right before a reference node
    pub fn insert_before(&mut self, new_id: NodeId, ref_id: NodeId) -> DomResult<()> {
        self.insert_before_all(&[new_id], ref_id)
    }

    /// Insert several nodes, in order, right before a reference node
    pub fn insert_before_all(&mut self, nodes: &[NodeId], ref_id: NodeId) -> DomResult<()> {
        let parent_id = self.node(ref_id)?.parent.ok_or(DomError::Detached)?;
        let nodes: Batch = nodes.iter().copied().filter(|&id| id != ref_id).collect();
        let batch = self.prepare_batch(parent_id, &nodes)?;
        if batch.is_empty() {
            return Ok(());
        }
        for &id in &batch {
            self.detach(id)?;
        }
        let index = self.nodes[ref_id.index()].sibling_index;
        self.splice_at(parent_id, &batch, index);
        Ok(())
    }

    /// Insert a node right after a reference node
    pub fn insert_after(&mut self, new_id: NodeId, ref_id: NodeId) -> DomResult<()> {
        self.insert_after_all(&[new_id], ref_id)
    }

    /// Insert several nodes, in order, right after a reference node
    pub fn insert_after_all(&mut self, nodes: &[NodeId], ref_id: NodeId) -> DomResult<()> {
        let parent_id = self.node(ref_id)?.parent.ok_or(DomError::Detached)?;
        let nodes: Batch = nodes.iter().copied().filter(|&id| id != ref_id).collect();
        let batch = self.prepare_batch(parent_id, &nodes)?;
        if batch.is_empty() {
            return Ok(());
        }
        for &id in &batch {
            self.detach(id)?;
        }
        let index = self.nodes[ref_id.index()].sibling_index + 1;
        if index == self.nodes[parent_id.index()].children.len() {
            for &id in &batch {
                self.nodes[id.index()].parent = Some(parent_id);
                self.nodes[parent_id.index()].children.push(id);
            }
            self.reindex_children_on_add(parent_id, batch.len());
        } else {
            self.splice_at(parent_id, &batch, index);
        }
        Ok(())
    }

    /// Attach already detached nodes at `index` and reindex the whole child list
    fn splice_at(&mut self, parent_id: NodeId, batch: &[NodeId], index: usize) {
        for (offset, &id) in batch.iter().enumerate() {
            self.nodes[id.index()].parent = Some(parent_id);
            self.nodes[parent_id.index()]
                .children
                .insert(index + offset, id);
        }
        self.reindex_children(parent_id);
    }

    /// Remove the child at `index`, returning it
    pub fn remove_child_at(&mut self, parent_id: NodeId, index: usize) -> Option<NodeId> {
        let child_id = *self.get(parent_id)?.children.get(index)?;
        self.detach(child_id).ok()?;
        Some(child_id)
    }

    /// Remove a node if it is a child of `parent_id`
    pub fn remove_child(&mut self, parent_id: NodeId, child_id: NodeId) -> bool {
        if self.parent(child_id) != Some(parent_id) {
            return false;
        }
        self.detach(child_id).is_ok()
    }

    /// Remove every child, returning them in their former order
    pub fn remove_all_children(&mut self, parent_id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.nodes.get_mut(parent_id.index()) else {
            return Vec::new();
        };
        let removed: Vec<NodeId> = parent.children.drain(..).collect();
        parent.child_element_count = 0;
        parent.child_elements = OnceLock::new();

        for &id in &removed {
            self.reset_position(id);
        }
        removed
    }

    /// Recompute the indices of every child of `parent_id`
    fn reindex_children(&mut self, parent_id: NodeId) {
        let len = self.nodes[parent_id.index()].children.len();
        let mut element_index = 0;

        for i in 0..len {
            let child_id = self.nodes[parent_id.index()].children[i];
            let child = &mut self.nodes[child_id.index()];
            child.sibling_index = i;
            child.sibling_name_index = OnceLock::new();
            if child.is_element() {
                child.sibling_element_index = Some(element_index);
                element_index += 1;
            } else {
                child.sibling_element_index = None;
            }
        }

        let parent = &mut self.nodes[parent_id.index()];
        parent.child_element_count = element_index;
        parent.child_elements = OnceLock::new();
    }

    /// Index only the `added` trailing children; earlier indices are unaffected by an append
    fn reindex_children_on_add(&mut self, parent_id: NodeId, added: usize) {
        let len = self.nodes[parent_id.index()].children.len();
        let mut element_index = self.nodes[parent_id.index()].child_element_count;
        let mut appended_elements = Batch::new();

        for i in len - added..len {
            let child_id = self.nodes[parent_id.index()].children[i];
            let child = &mut self.nodes[child_id.index()];
            child.sibling_index = i;
            child.sibling_name_index = OnceLock::new();
            if child.is_element() {
                child.sibling_element_index = Some(element_index);
                element_index += 1;
                appended_elements.push(child_id);
            } else {
                child.sibling_element_index = None;
            }
        }

        let parent = &mut self.nodes[parent_id.index()];
        parent.child_element_count = element_index;
        if let Some(cache) = parent.child_elements.get_mut() {
            cache.extend(appended_elements);
        }
    }

    // ---------------------------------------------------------------- navigation

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Get all children of a node
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| &n.children[..]).unwrap_or(&[])
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Child at position `index`, of any type
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Follow a path of child positions, e.g. `[0, 2]` is the third child of the first child
    pub fn child_at_path(&self, id: NodeId, path: &[usize]) -> Option<NodeId> {
        path.iter()
            .try_fold(id, |current, &index| self.child(current, index))
    }

    pub fn child_element_count(&self, id: NodeId) -> usize {
        self.get(id).map(|n| n.child_element_count).unwrap_or(0)
    }

    /// Element children, computed on first use and cached until the next mutation
    pub fn child_elements(&self, id: NodeId) -> &[NodeId] {
        let Some(node) = self.get(id) else {
            return &[];
        };
        node.child_elements.get_or_init(|| {
            node.children
                .iter()
                .copied()
                .filter(|&child| self.is_element(child))
                .collect()
        })
    }

    pub fn first_child_element(&self, id: NodeId) -> Option<NodeId> {
        self.child_elements(id).first().copied()
    }

    pub fn last_child_element(&self, id: NodeId) -> Option<NodeId> {
        self.child_elements(id).last().copied()
    }

    /// Element child at position `index` among element children
    pub fn child_element(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.child_elements(id).get(index).copied()
    }

    /// First element child with the given name
    pub fn first_child_element_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let name = self.config.canonical_name(name);
        let found = self
            .children(id)
            .iter()
            .copied()
            .find(|&child| self.node_tag_is(child, &name))?;
        self.init_sibling_names(found);
        Some(found)
    }

    /// Last element child with the given name
    pub fn last_child_element_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let name = self.config.canonical_name(name);
        let found = self
            .children(id)
            .iter()
            .rev()
            .copied()
            .find(|&child| self.node_tag_is(child, &name))?;
        self.init_sibling_names(found);
        Some(found)
    }

    /// Number of element children with the given name
    pub fn child_elements_named_count(&self, id: NodeId, name: &str) -> usize {
        self.last_child_element_named(id, name)
            .and_then(|last| self.sibling_name_index(last))
            .map(|index| index + 1)
            .unwrap_or(0)
    }

    fn node_tag_is(&self, id: NodeId, name: &str) -> bool {
        self.get(id).and_then(|n| n.tag_name()) == Some(name)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        self.child(node.parent?, node.sibling_index + 1)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        let index = node.sibling_index.checked_sub(1)?;
        self.child(node.parent?, index)
    }

    pub fn next_sibling_element(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        let parent = node.parent?;
        match node.sibling_element_index {
            Some(index) => self.child_element(parent, index + 1),
            None => self.children(parent)[node.sibling_index + 1..]
                .iter()
                .copied()
                .find(|&sibling| self.is_element(sibling)),
        }
    }

    pub fn previous_sibling_element(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        let parent = node.parent?;
        match node.sibling_element_index {
            Some(index) => self.child_element(parent, index.checked_sub(1)?),
            None => self.children(parent)[..node.sibling_index]
                .iter()
                .rev()
                .copied()
                .find(|&sibling| self.is_element(sibling)),
        }
    }

    /// Next element sibling with the same tag name
    pub fn next_sibling_same_name(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        let name = node.tag_name()?;
        self.children(node.parent?)[node.sibling_index + 1..]
            .iter()
            .copied()
            .find(|&sibling| self.node_tag_is(sibling, name))
    }

    /// Previous element sibling with the same tag name
    pub fn previous_sibling_same_name(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        let name = node.tag_name()?;
        self.children(node.parent?)[..node.sibling_index]
            .iter()
            .rev()
            .copied()
            .find(|&sibling| self.node_tag_is(sibling, name))
    }

    /// Position among all siblings
    pub fn sibling_index(&self, id: NodeId) -> Option<usize> {
        let node = self.get(id)?;
        node.parent.map(|_| node.sibling_index)
    }

    /// Position among element siblings
    pub fn sibling_element_index(&self, id: NodeId) -> Option<usize> {
        self.get(id)?.sibling_element_index
    }

    /// Position among element siblings sharing the tag name
    pub fn sibling_name_index(&self, id: NodeId) -> Option<usize> {
        self.init_sibling_names(id);
        self.get(id)?.sibling_name_index.get().copied()
    }

    /// Number the whole same-name sibling group of `id` the first time it is needed
    fn init_sibling_names(&self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        if node.sibling_name_index.get().is_some() {
            return;
        }
        let (Some(parent), Some(name)) = (node.parent, node.tag_name()) else {
            return;
        };

        let mut index = 0;
        for &sibling_id in self.children(parent) {
            let sibling = &self.nodes[sibling_id.index()];
            if sibling.tag_name() == Some(name) {
                // already numbered siblings keep their value, which is the same
                let _ = sibling.sibling_name_index.set(index);
                index += 1;
            }
        }
    }

    // ---------------------------------------------------------------- content

    /// Iterate over all descendants of a node (pre-order)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Concatenated text and CDATA of a node and all its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            if let NodeKind::Text(text) | NodeKind::CData(text) = &node.kind {
                result.push_str(text);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        result
    }

    /// Simple CSS path of a node, e.g. `html body div#main`
    pub fn css_path(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else {
                break;
            };
            if let Some(elem) = node.as_element() {
                let mut part = elem.name.to_string();
                if let Some(element_id) = elem.id() {
                    part.push('#');
                    part.push_str(element_id);
                }
                parts.push(part);
            }
            current = node.parent;
        }
        parts.reverse();
        parts.join(" ")
    }

    /// Get the number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (only has document node)
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    // ---------------------------------------------------------------- audit

    /// Verify every structural invariant of the attached tree
    pub fn check(&self) -> bool {
        let root = &self.nodes[NodeId::ROOT.index()];
        if !root.is_document() || root.parent.is_some() {
            return false;
        }

        let mut visited = 0;
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            visited += 1;
            if visited > self.nodes.len() || !self.check_children(id) {
                return false;
            }
            stack.extend(self.children(id).iter().copied());
        }
        true
    }

    fn check_children(&self, id: NodeId) -> bool {
        let node = &self.nodes[id.index()];
        let mut element_index = 0;
        let mut name_counters: FxHashMap<&str, usize> = FxHashMap::default();

        for (i, &child_id) in node.children.iter().enumerate() {
            let Some(child) = self.get(child_id) else {
                return false;
            };
            if child.parent != Some(id) || child.sibling_index != i || child.is_document() {
                return false;
            }

            if child.is_element() {
                if child.sibling_element_index != Some(element_index) {
                    return false;
                }
                element_index += 1;
            } else if child.sibling_element_index.is_some() {
                return false;
            }

            match child.tag_name() {
                Some(name) => {
                    let counter = name_counters.entry(name).or_insert(0);
                    if let Some(&cached) = child.sibling_name_index.get() {
                        if cached != *counter {
                            return false;
                        }
                    }
                    *counter += 1;
                }
                None => {
                    if child.sibling_name_index.get().is_some() {
                        return false;
                    }
                }
            }
        }

        if node.child_element_count != element_index {
            return false;
        }

        if let Some(cache) = node.child_elements.get() {
            if cache.len() != element_index {
                return false;
            }
            for &child_id in &node.children {
                if let Some(index) = self.nodes[child_id.index()].sibling_element_index {
                    if cache[index] != child_id {
                        return false;
                    }
                }
            }
        }
        true
    }

    // ---------------------------------------------------------------- debug

    /// Pretty print the tree for debugging
    pub fn pretty_print(&self) -> String {
        let mut output = String::new();
        self.print_node(NodeId::ROOT, 0, &mut output);
        output
    }

    fn print_node(&self, id: NodeId, depth: usize, output: &mut String) {
        let indent = "  ".repeat(depth);

        if let Some(node) = self.get(id) {
            match &node.kind {
                NodeKind::Document => {
                    output.push_str("#document\n");
                }
                NodeKind::DocumentType { name, .. } => {
                    output.push_str(&format!("{}<!DOCTYPE {}>\n", indent, name));
                }
                NodeKind::XmlDeclaration { version, .. } => {
                    output.push_str(&format!(
                        "{}<?xml {}?>\n",
                        indent,
                        version.as_deref().unwrap_or("")
                    ));
                }
                NodeKind::Element(elem) => {
                    let attrs: Vec<String> = elem
                        .attributes
                        .iter()
                        .map(|a| match &a.value {
                            Some(v) => format!("{}=\"{}\"", a.name, v),
                            None => a.name.to_string(),
                        })
                        .collect();
                    let attrs_str = if attrs.is_empty() {
                        String::new()
                    } else {
                        format!(" {}", attrs.join(" "))
                    };
                    output.push_str(&format!("{}<{}{}>\n", indent, elem.name, attrs_str));
                }
                NodeKind::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        output.push_str(&format!("{}#text: {:?}\n", indent, trimmed));
                    }
                }
                NodeKind::Comment(text) => {
                    output.push_str(&format!("{}<!-- {} -->\n", indent, text));
                }
                NodeKind::CData(text) => {
                    output.push_str(&format!("{}#cdata: {:?}\n", indent, text));
                }
            }

            for &child_id in &node.children {
                self.print_node(child_id, depth + 1, output);
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DocumentConfig::default())
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty_print())
    }
}
