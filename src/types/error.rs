use thiserror::Error;

use super::schema::FieldKind;

/// Errors produced when turning rule text into a predicate.
///
/// Every variant carries the offending rule text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("syntax error in '{text}': {reason}")]
    Syntax { text: String, reason: String },

    #[error("unknown field '{field}' in '{text}'")]
    UnknownField { text: String, field: String },

    #[error("type mismatch in '{text}': field '{field}' expected {expected}, got {found}")]
    TypeMismatch {
        text: String,
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },
}

impl CompileError {
    /// The rule text that failed to compile.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            CompileError::Syntax { text, .. }
            | CompileError::UnknownField { text, .. }
            | CompileError::TypeMismatch { text, .. } => text,
        }
    }
}

/// A [`CompileError`] tagged with the id of the rule being installed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rule '{id}' failed to compile: {error}")]
pub struct RuleError {
    pub id: String,
    #[source]
    pub error: CompileError,
}

/// Errors raised while evaluating a predicate against a record.
///
/// The matcher absorbs these and counts the rule as a non-match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("field '{field}' is missing from the record")]
    MissingField { field: String },

    #[error("field '{field}' expected {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema has no fields")]
    Empty,

    #[error("duplicate field name '{field}'")]
    DuplicateField { field: String },

    #[error("'{field}' cannot be written as a field name in rule text")]
    InvalidName { field: String },

    #[error("field '{field}' needs at least one sample value")]
    EmptyDomain { field: String },

    #[error("boolean field '{field}' must not declare a domain")]
    BooleanDomain { field: String },

    #[error("field '{field}' is {expected} but its domain holds a {found} value")]
    DomainKindMismatch {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },
}
