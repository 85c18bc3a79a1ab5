//! Lexer events consumed by the tree builder
//!
//! Scanning markup is the job of an external lexer; it hands the builder an
//! ordered stream of these events. Text payloads are already decoded.

use smallvec::SmallVec;

/// Attribute list of a tag: `(raw name, value)` pairs, in source order
pub type Attributes = SmallVec<[(String, Option<String>); 4]>;

/// HTML token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Opening tag
    StartTag {
        name: String,
        attributes: Attributes,
    },
    /// Closing tag
    EndTag { name: String },
    /// `<tag/>`
    SelfClosingTag {
        name: String,
        attributes: Attributes,
    },
    /// Character data
    Text(String),
    /// Comment body, without the `<!--` `-->` markers
    Comment(String),
    /// CDATA section body
    CData(String),
    /// DOCTYPE declaration
    Doctype {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
    },
    /// `<?xml ...?>`
    XmlDeclaration {
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<String>,
    },
    /// `<!--[if expr]>` or `<![endif]-->`
    ConditionalComment {
        expression: String,
        is_start: bool,
        is_hidden: bool,
    },
    /// End of input
    Eof,
}

impl Token {
    /// Start tag without attributes
    pub fn start(name: &str) -> Self {
        Token::StartTag {
            name: name.to_string(),
            attributes: Attributes::new(),
        }
    }

    /// Start tag with attributes
    pub fn start_with(name: &str, attributes: &[(&str, Option<&str>)]) -> Self {
        Token::StartTag {
            name: name.to_string(),
            attributes: to_attributes(attributes),
        }
    }

    pub fn end(name: &str) -> Self {
        Token::EndTag {
            name: name.to_string(),
        }
    }

    /// Self-closing tag without attributes
    pub fn self_closing(name: &str) -> Self {
        Token::SelfClosingTag {
            name: name.to_string(),
            attributes: Attributes::new(),
        }
    }

    /// Self-closing tag with attributes
    pub fn self_closing_with(name: &str, attributes: &[(&str, Option<&str>)]) -> Self {
        Token::SelfClosingTag {
            name: name.to_string(),
            attributes: to_attributes(attributes),
        }
    }

    pub fn text(text: &str) -> Self {
        Token::Text(text.to_string())
    }

    pub fn comment(text: &str) -> Self {
        Token::Comment(text.to_string())
    }

    /// Opening conditional comment, e.g. `Token::cond_comment("if lt IE 9")`
    pub fn cond_comment(expression: &str) -> Self {
        Token::ConditionalComment {
            expression: expression.to_string(),
            is_start: true,
            is_hidden: true,
        }
    }

    /// Closing `endif` conditional comment
    pub fn cond_comment_end() -> Self {
        Token::ConditionalComment {
            expression: "endif".to_string(),
            is_start: false,
            is_hidden: true,
        }
    }
}

fn to_attributes(attributes: &[(&str, Option<&str>)]) -> Attributes {
    attributes
        .iter()
        .map(|(name, value)| (name.to_string(), value.map(str::to_string)))
        .collect()
}
