//! Lacerta HTML tree construction
//!
//! Builds a [`lacerta_dom::Document`] from lexer events, applying implied
//! end tags, void elements, conditional comments and table foster
//! parenting, and renders documents back to HTML.

mod closing;
mod cond_comment;
mod error;
mod foster;
mod render;
mod token;
mod tree_builder;
mod void;

pub use closing::{
    implicitly_close_on_eof, implicitly_close_parent_on_close, implicitly_close_parent_on_open,
};
pub use cond_comment::ConditionalCommentMatcher;
pub use error::{HtmlError, HtmlResult};
pub use foster::fix_foster_elements;
pub use render::{to_html, to_inner_html, Case, HtmlRenderer};
pub use token::{Attributes, Token};
pub use tree_builder::{parse, DomBuilder};
pub use void::{is_raw_text_tag, is_void_tag, RAW_TEXT_TAGS, VOID_TAGS};
