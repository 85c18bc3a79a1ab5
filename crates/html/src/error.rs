//! HTML tree construction error types

use lacerta_dom::DomError;
use thiserror::Error;

/// HTML tree construction result type
pub type HtmlResult<T> = Result<T, HtmlError>;

/// Hard failures of tree construction.
///
/// Malformed markup never ends up here; it is recorded on the document.
#[derive(Debug, Error, PartialEq)]
pub enum HtmlError {
    #[error("Invalid conditional comment expression: {0}")]
    InvalidConditionalComment(String),

    #[error(transparent)]
    Dom(#[from] DomError),
}
