use std::fmt;
use std::ops::Not;

use super::Value;
use crate::config::Dialect;

/// Parsed rule expression. Field names are plain strings.
/// Lowered into a [`CompiledExpr`] by the compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `field == literal`
    Eq { field: String, value: Value },
    /// A boolean field used bare: `is_vip`.
    Flag(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

/// Compiled expression. Same-operator chains are flattened into n-ary
/// `All`/`Any` nodes and double negations are removed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CompiledExpr {
    Eq { field: Box<str>, value: Value },
    Flag(Box<str>),
    All(Vec<CompiledExpr>),
    Any(Vec<CompiledExpr>),
    Not(Box<CompiledExpr>),
}

impl Expr {
    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    /// Render as rule text in the given dialect. Every binary node is
    /// parenthesised, so the text parses back to an identical tree.
    #[must_use]
    pub fn to_source(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        self.render(dialect, &mut out);
        out
    }

    fn render(&self, dialect: Dialect, out: &mut String) {
        match self {
            Expr::Eq { field, value } => {
                out.push_str(field);
                out.push_str(" == ");
                out.push_str(&value.to_string());
            }
            Expr::Flag(field) => out.push_str(field),
            Expr::And(a, b) | Expr::Or(a, b) => {
                let op = match (self, dialect) {
                    (Expr::And(..), Dialect::Keyword) => " and ",
                    (Expr::And(..), Dialect::Symbolic) => " && ",
                    (_, Dialect::Keyword) => " or ",
                    (_, Dialect::Symbolic) => " || ",
                };
                out.push('(');
                a.render(dialect, out);
                out.push_str(op);
                b.render(dialect, out);
                out.push(')');
            }
            Expr::Not(inner) => {
                out.push_str(match dialect {
                    Dialect::Keyword => "not ",
                    Dialect::Symbolic => "!",
                });
                if matches!(inner.as_ref(), Expr::And(..) | Expr::Or(..)) {
                    inner.render(dialect, out);
                } else {
                    out.push('(');
                    inner.render(dialect, out);
                    out.push(')');
                }
            }
        }
    }

    /// Field names referenced by this expression, in first-use order.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Eq { field, .. } | Expr::Flag(field) => {
                if !out.contains(&field.as_str()) {
                    out.push(field);
                }
            }
            Expr::And(a, b) | Expr::Or(a, b) => {
                a.collect_fields(out);
                b.collect_fields(out);
            }
            Expr::Not(inner) => inner.collect_fields(out),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source(Dialect::Keyword))
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

/// Intermediate builder for field comparisons.
/// Created by [`field()`]; call [`eq`](Self::eq) to produce an [`Expr`].
#[derive(Debug, Clone)]
pub struct FieldExpr {
    name: String,
}

impl FieldExpr {
    #[must_use]
    pub fn eq(self, value: impl Into<Value>) -> Expr {
        Expr::Eq {
            field: self.name,
            value: value.into(),
        }
    }
}

#[must_use]
pub fn field(name: &str) -> FieldExpr {
    FieldExpr {
        name: name.to_owned(),
    }
}

/// A bare boolean field reference.
#[must_use]
pub fn flag(name: &str) -> Expr {
    Expr::Flag(name.to_owned())
}
