//! DOM query functionality (getElementById, getElementsByClassName, etc.)

use crate::node::NodeId;
use crate::tree::Document;

/// Trait for querying the DOM
pub trait Queryable {
    /// Find an element by its ID attribute
    fn get_element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Find elements by tag name
    fn get_elements_by_tag_name(&self, tag_name: &str) -> Vec<NodeId>;

    /// Find elements by class name
    fn get_elements_by_class_name(&self, class_name: &str) -> Vec<NodeId>;
}

impl Queryable for Document {
    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.document_id())
            .into_iter()
            .find(|&node_id| self.element(node_id).and_then(|e| e.id()) == Some(id))
    }

    fn get_elements_by_tag_name(&self, tag_name: &str) -> Vec<NodeId> {
        let tag_name = self.config().canonical_name(tag_name);
        self.descendants(self.document_id())
            .into_iter()
            .filter(|&node_id| {
                self.element(node_id)
                    .map(|e| &*e.name == tag_name)
                    .unwrap_or(false)
            })
            .collect()
    }

    fn get_elements_by_class_name(&self, class_name: &str) -> Vec<NodeId> {
        self.descendants(self.document_id())
            .into_iter()
            .filter(|&node_id| {
                self.element(node_id)
                    .map(|e| e.has_class(class_name))
                    .unwrap_or(false)
            })
            .collect()
    }
}
