//! DOM error types

use thiserror::Error;

/// DOM operation result type
pub type DomResult<T> = Result<T, DomError>;

/// DOM errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Invalid node index {index}, node has {len} children")]
    InvalidIndex { index: usize, len: usize },

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    #[error("Node is detached from the tree")]
    Detached,

    #[error("Invalid node type for operation")]
    InvalidNodeType,
}
