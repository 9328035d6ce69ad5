mod error;
mod grammar;

pub use error::ParseError;
pub use grammar::MAX_NESTING;
pub(crate) use grammar::is_identifier;

use crate::Expr;

/// Parse a single rule expression.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a complete, valid expression,
/// or if parentheses and negations nest more than [`MAX_NESTING`] levels
/// deep.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    use winnow::Parser;
    grammar::rule_expr.parse(grammar::input(input)).map_err(|e| {
        if grammar::nesting_exceeded(e.inner()) {
            ParseError::new(format!(
                "expression nested too deeply (limit {MAX_NESTING})"
            ))
        } else {
            ParseError::new(e.to_string())
        }
    })
}
