//! HTML serialization
//!
//! [`HtmlRenderer`] is a [`NodeVisitor`] writing markup into a string.
//! Text nodes hold decoded text, so the renderer escapes it again.

use lacerta_dom::{Attribute, Document, ElementData, NodeId, NodeVisitor};

/// Letter case of rendered tag and attribute names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Case {
    /// Canonical name, which depends on the document case sensitivity
    #[default]
    Default,
    /// Name as it appeared in the source
    Raw,
    Lowercase,
    Uppercase,
}

impl Case {
    fn apply(self, canonical: &str, raw: &str) -> String {
        match self {
            Case::Default => canonical.to_string(),
            Case::Raw => raw.to_string(),
            Case::Lowercase => raw.to_lowercase(),
            Case::Uppercase => raw.to_uppercase(),
        }
    }
}

/// Renders nodes back to HTML
#[derive(Debug, Default)]
pub struct HtmlRenderer {
    tag_case: Case,
    attribute_case: Case,
    out: String,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag_case(mut self, case: Case) -> Self {
        self.tag_case = case;
        self
    }

    pub fn with_attribute_case(mut self, case: Case) -> Self {
        self.attribute_case = case;
        self
    }

    /// Render a node including its own markup
    pub fn render(mut self, doc: &Document, id: NodeId) -> String {
        doc.visit(id, &mut self);
        self.out
    }

    /// Render only the children of a node
    pub fn render_children(mut self, doc: &Document, id: NodeId) -> String {
        doc.visit_children(id, &mut self);
        self.out
    }

    fn write_attribute(&mut self, attribute: &Attribute) {
        self.out.push(' ');
        self.out
            .push_str(&self.attribute_case.apply(&attribute.name, &attribute.raw_name));
        if let Some(value) = &attribute.value {
            self.out.push_str("=\"");
            escape_attribute(value, &mut self.out);
            self.out.push('"');
        }
    }
}

impl NodeVisitor for HtmlRenderer {
    fn element(&mut self, doc: &Document, id: NodeId, element: &ElementData) {
        let name = self.tag_case.apply(&element.name, &element.raw_name);

        self.out.push('<');
        self.out.push_str(&name);
        for attribute in &element.attributes {
            self.write_attribute(attribute);
        }

        let children = doc.children(id);
        if element.self_closed && children.is_empty() {
            self.out.push_str("/>");
            return;
        }
        self.out.push('>');
        if element.is_void {
            return;
        }

        if element.raw_text {
            for &child in children {
                match doc.get(child).and_then(|n| n.as_text()) {
                    Some(text) => self.out.push_str(text),
                    None => doc.visit(child, self),
                }
            }
        } else {
            doc.visit_children(id, self);
        }

        self.out.push_str("</");
        self.out.push_str(&name);
        self.out.push('>');
    }

    fn text(&mut self, text: &str) {
        escape_text(text, &mut self.out);
    }

    fn comment(&mut self, comment: &str) {
        self.out.push_str("<!--");
        self.out.push_str(comment);
        self.out.push_str("-->");
    }

    fn cdata(&mut self, cdata: &str) {
        self.out.push_str("<![CDATA[");
        self.out.push_str(cdata);
        self.out.push_str("]]>");
    }

    fn doctype(&mut self, name: &str, public_id: Option<&str>, system_id: Option<&str>) {
        self.out.push_str("<!DOCTYPE ");
        self.out.push_str(name);
        match (public_id, system_id) {
            (Some(public_id), system_id) => {
                self.out.push_str(&format!(" PUBLIC \"{}\"", public_id));
                if let Some(system_id) = system_id {
                    self.out.push_str(&format!(" \"{}\"", system_id));
                }
            }
            (None, Some(system_id)) => {
                self.out.push_str(&format!(" SYSTEM \"{}\"", system_id));
            }
            (None, None) => {}
        }
        self.out.push('>');
    }

    fn xml_declaration(
        &mut self,
        version: Option<&str>,
        encoding: Option<&str>,
        standalone: Option<&str>,
    ) {
        self.out.push_str("<?xml");
        for (name, value) in [
            ("version", version),
            ("encoding", encoding),
            ("standalone", standalone),
        ] {
            if let Some(value) = value {
                self.out.push_str(&format!(" {}=\"{}\"", name, value));
            }
        }
        self.out.push_str("?>");
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Outer HTML of a node with the default renderer
pub fn to_html(doc: &Document, id: NodeId) -> String {
    HtmlRenderer::new().render(doc, id)
}

/// Inner HTML of a node with the default renderer
pub fn to_inner_html(doc: &Document, id: NodeId) -> String {
    HtmlRenderer::new().render_children(doc, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;
    use crate::tree_builder::parse;
    use lacerta_dom::DocumentConfig;

    fn render(tokens: Vec<Token>) -> String {
        let doc = parse(tokens, DocumentConfig::default()).unwrap();
        to_html(&doc, doc.document_id())
    }

    #[test]
    fn test_render_elements_and_attributes() {
        let html = render(vec![
            Token::start_with("div", &[("id", Some("a")), ("title", Some("x \"y\" & z"))]),
            Token::start_with("input", &[("disabled", None)]),
            Token::text("1 < 2 & 3 > 2"),
            Token::end("div"),
        ]);
        assert_eq!(
            html,
            "<div id=\"a\" title=\"x &quot;y&quot; &amp; z\"><input disabled>1 &lt; 2 &amp; 3 &gt; 2</div>"
        );
    }

    #[test]
    fn test_render_raw_text() {
        let html = render(vec![
            Token::start("script"),
            Token::text("if (a < b && c) {}"),
            Token::end("script"),
        ]);
        assert_eq!(html, "<script>if (a < b && c) {}</script>");
    }

    #[test]
    fn test_render_self_closed() {
        let doc = parse(
            vec![Token::start("br"), Token::start("p"), Token::end("p")],
            DocumentConfig::xhtml(),
        )
        .unwrap();
        assert_eq!(to_html(&doc, doc.document_id()), "<br/><p></p>");

        let doc = parse(
            vec![Token::start("item"), Token::end("item")],
            DocumentConfig {
                self_close_void_tags: true,
                ..DocumentConfig::xml()
            },
        )
        .unwrap();
        assert_eq!(to_html(&doc, doc.document_id()), "<item/>");
    }

    #[test]
    fn test_render_special_nodes() {
        let html = render(vec![
            Token::Doctype {
                name: "html".to_string(),
                public_id: Some("-//W3C//DTD XHTML 1.0 Strict//EN".to_string()),
                system_id: Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd".to_string()),
            },
            Token::comment(" note "),
            Token::CData("a<b".to_string()),
        ]);
        assert_eq!(
            html,
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \
             \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\"><!-- note --><![CDATA[a<b]]>"
        );

        let doc = parse(
            vec![Token::XmlDeclaration {
                version: Some("1.0".to_string()),
                encoding: Some("UTF-8".to_string()),
                standalone: None,
            }],
            DocumentConfig::xml(),
        )
        .unwrap();
        assert_eq!(
            to_html(&doc, doc.document_id()),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>"
        );
    }

    #[test]
    fn test_name_case_policy() {
        let doc = parse(
            vec![
                Token::start_with("DiV", &[("Data-X", Some("1"))]),
                Token::end("div"),
            ],
            DocumentConfig::default(),
        )
        .unwrap();
        let root = doc.document_id();

        assert_eq!(to_html(&doc, root), "<div data-x=\"1\"></div>");
        assert_eq!(
            HtmlRenderer::new()
                .with_tag_case(Case::Raw)
                .with_attribute_case(Case::Raw)
                .render(&doc, root),
            "<DiV Data-X=\"1\"></DiV>"
        );
        assert_eq!(
            HtmlRenderer::new()
                .with_tag_case(Case::Uppercase)
                .with_attribute_case(Case::Lowercase)
                .render(&doc, root),
            "<DIV data-x=\"1\"></DIV>"
        );
    }

    #[test]
    fn test_inner_html() {
        let doc = parse(
            vec![
                Token::start("ul"),
                Token::start("li"),
                Token::text("a"),
                Token::start("li"),
                Token::text("b"),
                Token::end("ul"),
            ],
            DocumentConfig::default(),
        )
        .unwrap();
        let ul = doc.first_child(doc.document_id()).unwrap();
        assert_eq!(to_inner_html(&doc, ul), "<li>a</li><li>b</li>");
        assert_eq!(to_html(&doc, ul), "<ul><li>a</li><li>b</li></ul>");
    }
}
