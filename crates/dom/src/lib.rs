//! Lacerta DOM - Document Object Model
//!
//! Arena-backed document tree with cached sibling indices, the parsing
//! configuration shared by the builder and a visitor for traversals.

mod config;
mod error;
mod node;
mod query;
mod tree;
mod visitor;

pub use config::DocumentConfig;
pub use error::{DomError, DomResult};
pub use node::{Attribute, ElementData, Node, NodeId, NodeKind, NodeType, SourceLocation};
pub use query::Queryable;
pub use tree::Document;
pub use visitor::NodeVisitor;
