//! DOM Node representation

use smallvec::SmallVec;
use std::fmt;
use std::sync::OnceLock;
use string_cache::DefaultAtom;

/// Unique identifier for a node in the DOM tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The document node is always the first node of the arena.
    pub const ROOT: NodeId = NodeId(0);

    /// Create a new node ID
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Position of a lexer event in the source text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset from start
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Discriminant of a node, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
    CData,
    DocumentType,
    XmlDeclaration,
}

/// Node payload
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Document root node
    Document,
    /// Element node (HTML tag)
    Element(ElementData),
    /// Text content
    Text(String),
    /// HTML comment
    Comment(String),
    /// CDATA section
    CData(String),
    /// DOCTYPE declaration
    DocumentType {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
    },
    /// `<?xml ...?>` declaration
    XmlDeclaration {
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<String>,
    },
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Document => NodeType::Document,
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
            NodeKind::CData(_) => NodeType::CData,
            NodeKind::DocumentType { .. } => NodeType::DocumentType,
            NodeKind::XmlDeclaration { .. } => NodeType::XmlDeclaration,
        }
    }
}

/// A single attribute: as-typed name, canonical name and optional value
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub raw_name: String,
    pub name: DefaultAtom,
    pub value: Option<String>,
}

impl Attribute {
    /// Check whether the value, split on whitespace, contains `word`
    pub fn contains_word(&self, word: &str) -> bool {
        self.value
            .as_deref()
            .map(|v| v.split_whitespace().any(|w| w == word))
            .unwrap_or(false)
    }
}

/// Element-specific data
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Canonical tag name (lowercase unless the document is case sensitive)
    pub name: DefaultAtom,
    /// Tag name as it appeared in the source
    pub raw_name: String,
    /// Element attributes, unique by canonical name, in insertion order
    pub attributes: SmallVec<[Attribute; 4]>,
    /// Void elements have neither content nor an end tag
    pub is_void: bool,
    /// Rendered as `<tag/>` when childless
    pub self_closed: bool,
    /// Children are emitted verbatim (script, style)
    pub raw_text: bool,
    /// Where the start tag was seen, if the lexer reported it
    pub location: Option<SourceLocation>,
}

impl ElementData {
    /// Create a new element; `name` must already be canonical
    pub fn new(name: DefaultAtom, raw_name: impl Into<String>) -> Self {
        Self {
            name,
            raw_name: raw_name.into(),
            attributes: SmallVec::new(),
            is_void: false,
            self_closed: false,
            raw_text: false,
            location: None,
        }
    }

    /// Find an attribute by canonical name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| &*a.name == name)
    }

    /// Get an attribute value by canonical name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(|a| a.value.as_deref())
    }

    /// Check for an attribute by canonical name
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Set an attribute value, updating an existing one in place
    pub fn set_attribute(&mut self, raw_name: &str, name: DefaultAtom, value: Option<String>) {
        if let Some(attr) = self.attributes.iter_mut().find(|a| a.name == name) {
            attr.value = value;
            return;
        }
        self.attributes.push(Attribute {
            raw_name: raw_name.to_string(),
            name,
            value,
        });
    }

    /// Remove an attribute by canonical name
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        match self.attributes.iter().position(|a| &*a.name == name) {
            Some(index) => {
                self.attributes.remove(index);
                true
            }
            None => false,
        }
    }

    /// Check if the element has a class
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .map(|a| a.contains_word(class))
            .unwrap_or(false)
    }

    /// Get the element's ID
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Get all classes as a vector
    pub fn classes(&self) -> Vec<&str> {
        self.get_attribute("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// A node in the DOM tree
///
/// Structure fields are private: they are maintained by [`crate::Document`],
/// which keeps the sibling indices consistent across every mutation.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,
    /// Node type and associated data
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 8]>,
    pub(crate) sibling_index: usize,
    pub(crate) sibling_element_index: Option<usize>,
    pub(crate) sibling_name_index: OnceLock<usize>,
    pub(crate) child_element_count: usize,
    pub(crate) child_elements: OnceLock<Vec<NodeId>>,
}

impl Node {
    /// Create a new, detached node
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            parent: None,
            children: SmallVec::new(),
            sibling_index: 0,
            sibling_element_index: None,
            sibling_name_index: OnceLock::new(),
            child_element_count: 0,
            child_elements: OnceLock::new(),
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Parent node ID (None for the root and for detached nodes)
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child node IDs in document order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Check if this is a document node
    pub fn is_document(&self) -> bool {
        matches!(self.kind, NodeKind::Document)
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    /// Check if this is a comment node
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, NodeKind::Comment(_))
    }

    /// Get element data if this is an element
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Get mutable element data if this is an element
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Canonical name; `None` for text, comment and CDATA nodes
    pub fn node_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Document => Some("#document"),
            NodeKind::Element(elem) => Some(&*elem.name),
            NodeKind::DocumentType { name, .. } => Some(name.as_str()),
            NodeKind::XmlDeclaration { .. } => Some("xml"),
            _ => None,
        }
    }

    /// Name as it appeared in the source
    pub fn node_raw_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(elem) => Some(elem.raw_name.as_str()),
            _ => self.node_name(),
        }
    }

    /// Textual payload of text-like nodes and the doctype name
    pub fn node_value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(value) | NodeKind::Comment(value) | NodeKind::CData(value) => {
                Some(value.as_str())
            }
            NodeKind::DocumentType { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Get the tag name if this is an element
    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|e| &*e.name)
    }

    /// A text node made of whitespace only
    pub fn is_blank_text(&self) -> bool {
        self.as_text()
            .map(|t| t.chars().all(char::is_whitespace))
            .unwrap_or(false)
    }

    /// Position among all siblings
    pub fn sibling_index(&self) -> usize {
        self.sibling_index
    }

    /// Position among element siblings; `None` for non-elements and detached nodes
    pub fn sibling_element_index(&self) -> Option<usize> {
        self.sibling_element_index
    }

    /// Number of element children
    pub fn child_element_count(&self) -> usize {
        self.child_element_count
    }
}
