//! Double-dispatch traversal over a document
//!
//! A [`NodeVisitor`] gets one callback per node kind. The default callbacks
//! for the document and for elements simply descend into the children; an
//! implementation that overrides them decides itself whether, and when, to
//! call [`Document::visit_children`].

use crate::node::{ElementData, NodeId, NodeKind};
use crate::tree::Document;

/// Callbacks for every node kind
pub trait NodeVisitor {
    fn document(&mut self, doc: &Document, id: NodeId) {
        doc.visit_children(id, self);
    }

    fn element(&mut self, doc: &Document, id: NodeId, _element: &ElementData) {
        doc.visit_children(id, self);
    }

    fn text(&mut self, _text: &str) {}

    fn comment(&mut self, _comment: &str) {}

    fn cdata(&mut self, _cdata: &str) {}

    fn doctype(&mut self, _name: &str, _public_id: Option<&str>, _system_id: Option<&str>) {}

    fn xml_declaration(
        &mut self,
        _version: Option<&str>,
        _encoding: Option<&str>,
        _standalone: Option<&str>,
    ) {
    }
}

impl Document {
    /// Dispatch a single node to the matching visitor callback
    pub fn visit<V: NodeVisitor + ?Sized>(&self, id: NodeId, visitor: &mut V) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Document => visitor.document(self, id),
            NodeKind::Element(element) => visitor.element(self, id, element),
            NodeKind::Text(text) => visitor.text(text),
            NodeKind::Comment(comment) => visitor.comment(comment),
            NodeKind::CData(cdata) => visitor.cdata(cdata),
            NodeKind::DocumentType {
                name,
                public_id,
                system_id,
            } => visitor.doctype(name, public_id.as_deref(), system_id.as_deref()),
            NodeKind::XmlDeclaration {
                version,
                encoding,
                standalone,
            } => visitor.xml_declaration(
                version.as_deref(),
                encoding.as_deref(),
                standalone.as_deref(),
            ),
        }
    }

    /// Visit every child of a node, in order
    pub fn visit_children<V: NodeVisitor + ?Sized>(&self, id: NodeId, visitor: &mut V) {
        for &child in self.children(id) {
            self.visit(child, visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collector {
        events: Vec<String>,
    }

    impl NodeVisitor for Collector {
        fn element(&mut self, doc: &Document, id: NodeId, element: &ElementData) {
            self.events.push(format!("<{}>", element.name));
            doc.visit_children(id, self);
            self.events.push(format!("</{}>", element.name));
        }

        fn text(&mut self, text: &str) {
            self.events.push(text.to_string());
        }

        fn comment(&mut self, comment: &str) {
            self.events.push(format!("#{}", comment));
        }
    }

    #[test]
    fn test_visit_in_document_order() {
        let mut doc = Document::default();
        let ul = doc.create_element("ul");
        let li = doc.create_element("li");
        let text = doc.create_text("one");
        let comment = doc.create_comment("c");

        doc.add_child(doc.document_id(), ul).unwrap();
        doc.add_children(ul, &[li, comment]).unwrap();
        doc.add_child(li, text).unwrap();

        let mut collector = Collector::default();
        doc.visit(doc.document_id(), &mut collector);

        assert_eq!(
            collector.events,
            vec!["<ul>", "<li>", "one", "</li>", "#c", "</ul>"]
        );
    }
}
