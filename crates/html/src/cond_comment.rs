//! Internet Explorer conditional comment expressions
//!
//! `if lt IE 9`, `if (gt IE 5)&(lt IE 7)`, `if IE 6 | IE 7`, `if !IE` ...
//! An expression is split on `&` first and every AND term on `|`; atoms are
//! compared against a fixed IE version.

use crate::error::{HtmlError, HtmlResult};

/// Evaluates conditional comment expressions against one IE version
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionalCommentMatcher {
    ie_version: f32,
}

impl ConditionalCommentMatcher {
    pub fn new(ie_version: f32) -> Self {
        Self { ie_version }
    }

    /// Evaluate an expression; a leading `if` is optional.
    ///
    /// Fails when a version number is not a number or an atom is not recognized.
    pub fn matches(&self, expression: &str) -> HtmlResult<bool> {
        let expression = expression.trim();
        let body = expression
            .strip_prefix("if")
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with(['(', '!']))
            .unwrap_or(expression);

        for and_term in body.split('&') {
            let mut any = false;
            for or_term in and_term.split('|') {
                if self.matches_term(or_term, expression)? {
                    any = true;
                }
            }
            if !any {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn matches_term(&self, term: &str, expression: &str) -> HtmlResult<bool> {
        let term = term.trim();

        if let Some(inner) = term.strip_prefix("!(") {
            return self.matches_term(&format!("({}", inner), expression).map(|m| !m);
        }
        let term = strip_parentheses(term);

        let words: Vec<&str> = term.split_whitespace().collect();
        let invalid = || HtmlError::InvalidConditionalComment(expression.to_string());

        let (operator, version) = match words.as_slice() {
            ["IE"] => return Ok(true),
            ["!IE"] => return Ok(false),
            ["IE", version] => ("eq", *version),
            ["!IE", version] => ("ne", *version),
            [operator, "IE", version] => (*operator, *version),
            _ => return Err(invalid()),
        };

        let target: f32 = version.parse().map_err(|_| invalid())?;
        let current = if target.fract() == 0.0 {
            self.ie_version.trunc()
        } else {
            self.ie_version
        };

        match operator {
            "eq" => Ok(current == target),
            "ne" => Ok(current != target),
            "lt" => Ok(current < target),
            "lte" => Ok(current <= target),
            "gt" => Ok(current > target),
            "gte" => Ok(current >= target),
            _ => Err(invalid()),
        }
    }
}

fn strip_parentheses(mut term: &str) -> &str {
    while let Some(inner) = term.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        term = inner.trim();
    }
    term
}
