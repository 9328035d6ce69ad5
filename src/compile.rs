use std::sync::Arc;

use crate::types::CompiledExpr;
use crate::{CompileError, Expr, FieldKind, Predicate, Schema};

/// Turns rule text into an executable [`Predicate`].
///
/// An untyped compiler (`Compiler::new()`) only checks syntax; field names
/// and value kinds are then checked when a record is evaluated. A compiler
/// built with [`with_schema`](Self::with_schema) also rejects unknown fields
/// and literals whose kind differs from the field's.
///
/// Compilation is pure: the same text always yields an equal predicate.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    schema: Option<Arc<Schema>>,
}

impl Compiler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_schema(schema: Arc<Schema>) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    #[must_use]
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_deref()
    }

    /// Parse and compile one rule.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Syntax`] when the text does not parse, and,
    /// for a schema-checked compiler, [`CompileError::UnknownField`] or
    /// [`CompileError::TypeMismatch`].
    pub fn compile(&self, text: &str) -> Result<Predicate, CompileError> {
        let expr = crate::parse::parse(text).map_err(|e| CompileError::Syntax {
            text: text.to_owned(),
            reason: e.message().to_owned(),
        })?;
        self.lower(text, &expr)
    }

    /// Compile an already-built expression. Errors report the expression's
    /// keyword rendering as the offending text.
    ///
    /// # Errors
    ///
    /// See [`compile`](Self::compile); syntax errors cannot occur here.
    pub fn compile_expr(&self, expr: &Expr) -> Result<Predicate, CompileError> {
        self.lower(&expr.to_string(), expr)
    }

    fn lower(&self, text: &str, expr: &Expr) -> Result<Predicate, CompileError> {
        if let Some(schema) = &self.schema {
            check_fields(schema, text, expr)?;
        }
        Ok(Predicate {
            expr: lower_expr(expr),
            fields: expr.fields().into_iter().map(str::to_owned).collect(),
        })
    }
}

fn check_fields(schema: &Schema, text: &str, expr: &Expr) -> Result<(), CompileError> {
    match expr {
        Expr::Eq { field, value } => {
            let kind = field_kind(schema, text, field)?;
            if value.kind() == kind {
                Ok(())
            } else {
                Err(CompileError::TypeMismatch {
                    text: text.to_owned(),
                    field: field.clone(),
                    expected: kind,
                    found: value.kind(),
                })
            }
        }
        Expr::Flag(field) => match field_kind(schema, text, field)? {
            FieldKind::Boolean => Ok(()),
            other => Err(CompileError::TypeMismatch {
                text: text.to_owned(),
                field: field.clone(),
                expected: FieldKind::Boolean,
                found: other,
            }),
        },
        Expr::And(a, b) | Expr::Or(a, b) => {
            check_fields(schema, text, a)?;
            check_fields(schema, text, b)
        }
        Expr::Not(inner) => check_fields(schema, text, inner),
    }
}

fn field_kind(schema: &Schema, text: &str, field: &str) -> Result<FieldKind, CompileError> {
    schema
        .field(field)
        .map(crate::FieldSpec::kind)
        .ok_or_else(|| CompileError::UnknownField {
            text: text.to_owned(),
            field: field.to_owned(),
        })
}

fn lower_expr(expr: &Expr) -> CompiledExpr {
    match expr {
        Expr::Eq { field, value } => CompiledExpr::Eq {
            field: field.as_str().into(),
            value: value.clone(),
        },
        Expr::Flag(field) => CompiledExpr::Flag(field.as_str().into()),
        Expr::And(a, b) => {
            let mut parts = Vec::new();
            push_flat(&mut parts, lower_expr(a), true);
            push_flat(&mut parts, lower_expr(b), true);
            CompiledExpr::All(parts)
        }
        Expr::Or(a, b) => {
            let mut parts = Vec::new();
            push_flat(&mut parts, lower_expr(a), false);
            push_flat(&mut parts, lower_expr(b), false);
            CompiledExpr::Any(parts)
        }
        Expr::Not(inner) => match lower_expr(inner) {
            CompiledExpr::Not(x) => *x,
            other => CompiledExpr::Not(Box::new(other)),
        },
    }
}

/// Splice a child of the same combinator into its parent, keeping
/// left-to-right order.
fn push_flat(parts: &mut Vec<CompiledExpr>, node: CompiledExpr, all: bool) {
    match node {
        CompiledExpr::All(children) if all => parts.extend(children),
        CompiledExpr::Any(children) if !all => parts.extend(children),
        other => parts.push(other),
    }
}
