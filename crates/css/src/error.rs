//! CSS selector error types

use thiserror::Error;

/// CSS selector result type
pub type CssResult<T> = Result<T, CssError>;

/// Errors raised while building selector objects
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CssError {
    #[error("Unknown pseudo-class ':{0}'")]
    UnknownPseudoClass(String),

    #[error("Unknown pseudo-function ':{0}()'")]
    UnknownPseudoFunction(String),

    #[error("Invalid nth expression '{0}'")]
    InvalidNthExpression(String),

    #[error("Invalid argument '{argument}' for ':{function}()'")]
    InvalidArgument { function: String, argument: String },

    #[error("':{0}()' takes pre-parsed selector groups")]
    SelectorArgument(String),
}

impl CssError {
    pub fn invalid_argument(function: &str, argument: &str) -> Self {
        Self::InvalidArgument {
            function: function.to_string(),
            argument: argument.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CssError::invalid_argument("eq", "x");
        assert_eq!(format!("{}", err), "Invalid argument 'x' for ':eq()'");
        assert_eq!(
            format!("{}", CssError::UnknownPseudoClass("hover".to_string())),
            "Unknown pseudo-class ':hover'"
        );
    }
}
