use std::fmt;

use super::error::EvalError;
use super::expr::CompiledExpr;
use super::record::Record;

/// An executable predicate produced by the [`Compiler`](crate::Compiler).
///
/// Immutable once built and freely shared across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub(crate) expr: CompiledExpr,
    pub(crate) fields: Vec<String>,
}

impl Predicate {
    /// Evaluate against a record.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] when a field that decides the result is missing
    /// from the record or holds a value of the wrong kind.
    pub fn evaluate(&self, record: &Record) -> Result<bool, EvalError> {
        crate::evaluate::eval_expr(&self.expr, record)
    }

    /// Field names referenced by the predicate, in first-use order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// An identified predicate together with the text it was compiled from.
///
/// Only ever constructed from a successful compilation; replacing a rule in a
/// [`RuleRepository`](crate::RuleRepository) swaps in a new `Rule` rather
/// than mutating this one.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    id: String,
    source: String,
    predicate: Predicate,
}

impl Rule {
    pub(crate) fn new(id: String, source: String, predicate: Predicate) -> Self {
        Self {
            id,
            source,
            predicate,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The rule text exactly as it was supplied.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.source)
    }
}
