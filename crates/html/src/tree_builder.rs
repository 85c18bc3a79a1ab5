//! HTML Tree Builder
//!
//! Constructs a DOM tree from lexer events. There is no separate stack of
//! open elements: the insertion point is the `current` node and the chain of
//! its ancestors is the stack.

use lacerta_dom::{Document, DocumentConfig, NodeId, NodeKind, SourceLocation};

use crate::closing;
use crate::cond_comment::ConditionalCommentMatcher;
use crate::error::HtmlResult;
use crate::foster;
use crate::token::{Attributes, Token};
use crate::void;

/// Streaming tree builder
pub struct DomBuilder {
    doc: Document,
    /// Node that new content is appended to
    current: NodeId,
    /// False while skipping a conditional comment branch
    enabled: bool,
    finished: bool,
    matcher: ConditionalCommentMatcher,
    /// Location of the event being processed
    location: Option<SourceLocation>,
}

impl DomBuilder {
    /// Create a builder producing a document with the given configuration
    pub fn new(config: DocumentConfig) -> Self {
        log::debug!("Starting DOM tree construction");
        let matcher = ConditionalCommentMatcher::new(config.cond_comment_ie_version);
        let doc = Document::new(config);
        Self {
            current: doc.document_id(),
            doc,
            enabled: true,
            finished: false,
            matcher,
            location: None,
        }
    }

    /// Document built so far
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Current insertion point
    pub fn current_node(&self) -> NodeId {
        self.current
    }

    /// Process a single token
    pub fn process_token(&mut self, token: Token) -> HtmlResult<()> {
        self.process_token_at(token, None)
    }

    /// Process a single token that the lexer located in the source
    pub fn process_token_at(&mut self, token: Token, location: Option<SourceLocation>) -> HtmlResult<()> {
        if self.finished {
            return Ok(());
        }
        self.location = location;

        match token {
            Token::ConditionalComment { expression, .. } => {
                self.conditional_comment(&expression)?;
            }
            Token::Eof => {
                self.end()?;
            }
            _ if !self.enabled => {}

            Token::StartTag { name, attributes } => {
                self.handle_start_tag(&name, attributes, false)?;
            }
            Token::SelfClosingTag { name, attributes } => {
                self.handle_start_tag(&name, attributes, true)?;
            }
            Token::EndTag { name } => {
                self.handle_end_tag(&name)?;
            }
            Token::Text(text) => {
                self.handle_text(&text)?;
            }
            Token::CData(text) => {
                let cdata = self.doc.create_cdata(text);
                self.doc.add_child(self.current, cdata)?;
            }
            Token::Comment(text) => {
                if self.doc.config().ignore_whitespace_between_tags {
                    self.remove_last_child_if_blank_text(false)?;
                }
                if !self.doc.config().ignore_comments {
                    let comment = self.doc.create_comment(text);
                    self.doc.add_child(self.current, comment)?;
                }
            }
            Token::Doctype {
                name,
                public_id,
                system_id,
            } => {
                let doctype = self.doc.create_doctype(name, public_id, system_id);
                self.doc.add_child(self.current, doctype)?;
            }
            Token::XmlDeclaration {
                version,
                encoding,
                standalone,
            } => {
                let declaration = self.doc.create_xml_declaration(version, encoding, standalone);
                self.doc.add_child(self.current, declaration)?;
            }
        }
        Ok(())
    }

    /// Close the input if the lexer did not send `Eof` and return the document
    pub fn finish(mut self) -> HtmlResult<Document> {
        self.end()?;
        Ok(self.doc)
    }

    // ---------------------------------------------------------------- tags

    /// Handle a start tag; a self-closing tag never becomes the insertion point
    fn handle_start_tag(&mut self, name: &str, attributes: Attributes, self_closing: bool) -> HtmlResult<()> {
        if self.doc.config().ignore_whitespace_between_tags {
            self.remove_last_child_if_blank_text(false)?;
        }

        let element = self.create_element(name, attributes)?;
        let is_void = self.doc.element(element).map(|e| e.is_void).unwrap_or(false);

        if !self_closing && self.doc.config().implied_end_tags {
            while let Some(parent) = self.closable_current(|open| {
                closing::implicitly_close_parent_on_open(open, name)
            }) {
                log::debug!("Implicitly closed tag <{}> by <{}>", self.tag_name(self.current), name);
                self.current = parent;
            }
        }

        self.doc.add_child(self.current, element)?;

        if !self_closing && !is_void {
            self.current = element;
        }
        Ok(())
    }

    /// Create an element with attributes and flags resolved from the config
    fn create_element(&mut self, name: &str, attributes: Attributes) -> HtmlResult<NodeId> {
        let element = self.doc.create_element(name);
        for (attr_name, value) in &attributes {
            self.doc.set_attribute(element, attr_name, value.as_deref())?;
        }

        let config = self.doc.config();
        let is_void = config.enable_void_tags && void::is_void_tag(name);
        let self_closed = if config.enable_void_tags {
            is_void && config.self_close_void_tags
        } else {
            config.self_close_void_tags
        };
        let location = self.location;

        if let Some(data) = self.doc.element_mut(element) {
            data.is_void = is_void;
            data.self_closed = self_closed;
            data.raw_text = void::is_raw_text_tag(name);
            data.location = location;
        }
        Ok(element)
    }

    /// Parent of the current element when `rule` says the current element closes
    fn closable_current(&self, rule: impl Fn(&str) -> bool) -> Option<NodeId> {
        let open = self.doc.element(self.current)?;
        if rule(&*open.name) {
            self.doc.parent(self.current)
        } else {
            None
        }
    }

    fn handle_end_tag(&mut self, name: &str) -> HtmlResult<()> {
        if self.doc.config().ignore_whitespace_between_tags {
            self.remove_last_child_if_blank_text(true)?;
        }

        let Some(matching) = self.find_matching_open_tag(name) else {
            self.orphan_error(name);
            return Ok(());
        };

        if matching == self.current {
            self.current = self.parent_or_root(matching);
            return Ok(());
        }

        if self.doc.config().implied_end_tags {
            while let Some(parent) = self.closable_current(|open| {
                closing::implicitly_close_parent_on_close(open, name)
            }) {
                log::debug!("Implicitly closed tag <{}> by </{}>", self.tag_name(self.current), name);
                self.current = parent;
                if self.current == matching {
                    self.current = self.parent_or_root(matching);
                    return Ok(());
                }
            }
        }

        self.fix_unclosed_tags_up_to(name, matching)
    }

    /// Nearest open element, starting at the current one, named `name`
    fn find_matching_open_tag(&self, name: &str) -> Option<NodeId> {
        let name = self.doc.config().canonical_name(name);
        std::iter::once(self.current)
            .chain(self.doc.ancestors(self.current))
            .find(|&id| self.doc.element(id).map(|e| *e.name == *name).unwrap_or(false))
    }

    /// Close every open element between the current one and `matching`.
    ///
    /// An element that could not be nested in its parent anyway is moved out
    /// to become the parent's next sibling.
    fn fix_unclosed_tags_up_to(&mut self, name: &str, matching: NodeId) -> HtmlResult<()> {
        if self.doc.config().unclosed_tag_as_orphan_check && !name.eq_ignore_ascii_case("table") {
            let mut node = self.current;
            while node != matching {
                let open = closing::lowercase(self.tag_name(node)).into_owned();
                if matches!(open.as_str(), "table" | "ul" | "ol") {
                    self.orphan_error(name);
                    return Ok(());
                }
                node = self.parent_or_root(node);
            }
        }

        loop {
            if self.current == matching {
                self.current = self.parent_or_root(matching);
                return Ok(());
            }

            let node = self.current;
            let parent = self.parent_or_root(node);

            if self.doc.config().implied_end_tags
                && closing::implicitly_close_parent_on_open(self.tag_name(parent), self.tag_name(node))
            {
                self.doc.insert_after(node, parent)?;
            }

            let message = format!(
                "Unclosed tag closed: <{}>{}",
                self.tag_name(node),
                self.position_of(node)
            );
            self.doc.add_error(message);

            self.current = parent;
        }
    }

    // ---------------------------------------------------------------- content

    fn handle_text(&mut self, text: &str) -> HtmlResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let node = self.doc.create_text(text);
        self.doc.add_child(self.current, node)?;
        Ok(())
    }

    /// Drop a trailing whitespace-only text child of the current node.
    ///
    /// Before an end tag the only child of an element is kept.
    fn remove_last_child_if_blank_text(&mut self, closing_tag: bool) -> HtmlResult<()> {
        let Some(last) = self.doc.last_child(self.current) else {
            return Ok(());
        };
        if !self.doc.get(last).map(|n| n.is_blank_text()).unwrap_or(false) {
            return Ok(());
        }
        if closing_tag && self.doc.child_count(self.current) == 1 {
            return Ok(());
        }
        self.doc.detach(last)?;
        Ok(())
    }

    fn conditional_comment(&mut self, expression: &str) -> HtmlResult<()> {
        let expression = expression.trim();
        self.enabled = if expression == "endif" {
            true
        } else {
            self.matcher.matches(expression)?
        };
        log::trace!("Conditional comment [{}], content enabled: {}", expression, self.enabled);
        Ok(())
    }

    // ---------------------------------------------------------------- end

    /// Close everything still open, run the foster fixer and stop the clock
    fn end(&mut self) -> HtmlResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let root = self.doc.document_id();
        let implied_end_tags = self.doc.config().implied_end_tags;

        let mut node = self.current;
        while node != root {
            let name = self.tag_name(node);
            if !(implied_end_tags && closing::implicitly_close_on_eof(name)) {
                let message = format!("Unclosed tag closed: <{}>{}", name, self.position_of(node));
                self.doc.add_error(message);
            }
            node = self.parent_or_root(node);
        }

        if self.doc.config().ignore_whitespace_between_tags {
            self.remove_last_child_if_blank_text(true)?;
        }
        self.current = root;

        if self.doc.config().use_foster_rules {
            foster::fix_foster_elements(&mut self.doc)?;
        }

        self.doc.end();
        if let Some(elapsed) = self.doc.elapsed() {
            log::debug!("DOM tree created in {:?}", elapsed);
        }
        Ok(())
    }

    // ---------------------------------------------------------------- util

    fn tag_name(&self, id: NodeId) -> &str {
        self.doc.node_name(id).unwrap_or_default()
    }

    fn parent_or_root(&self, id: NodeId) -> NodeId {
        self.doc.parent(id).unwrap_or(self.doc.document_id())
    }

    fn orphan_error(&mut self, name: &str) {
        let position = self
            .location
            .map(|location| format!(" {}", location))
            .unwrap_or_default();
        self.doc
            .add_error(format!("Orphan closed tag ignored: </{}>{}", name, position));
    }

    fn position_of(&self, id: NodeId) -> String {
        match self.doc.get(id).map(|n| &n.kind) {
            Some(NodeKind::Element(data)) => data
                .location
                .map(|location| format!(" {}", location))
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}

/// Build a document from a complete token stream
pub fn parse<I>(tokens: I, config: DocumentConfig) -> HtmlResult<Document>
where
    I: IntoIterator<Item = Token>,
{
    let mut builder = DomBuilder::new(config);
    for token in tokens {
        builder.process_token(token)?;
    }
    builder.finish()
}
