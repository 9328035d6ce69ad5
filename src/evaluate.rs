use std::time::Instant;

use tracing::trace;

use crate::types::CompiledExpr;
use crate::{EvalError, FieldKind, MatchReport, Record, Rule};

/// Evaluate a compiled expression.
///
/// `All`/`Any` short-circuit left to right, so an operand that would fail is
/// never reached once the result is decided. `Not` propagates its operand's
/// error.
pub(crate) fn eval_expr(expr: &CompiledExpr, record: &Record) -> Result<bool, EvalError> {
    match expr {
        CompiledExpr::Eq { field, value } => {
            let actual = lookup(record, field)?;
            actual
                .equals(value)
                .ok_or_else(|| EvalError::TypeMismatch {
                    field: field.to_string(),
                    expected: value.kind(),
                    found: actual.kind(),
                })
        }
        CompiledExpr::Flag(field) => {
            let actual = lookup(record, field)?;
            actual.as_bool().ok_or_else(|| EvalError::TypeMismatch {
                field: field.to_string(),
                expected: FieldKind::Boolean,
                found: actual.kind(),
            })
        }
        CompiledExpr::All(parts) => {
            for part in parts {
                if !eval_expr(part, record)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        CompiledExpr::Any(parts) => {
            for part in parts {
                if eval_expr(part, record)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        CompiledExpr::Not(inner) => eval_expr(inner, record).map(|b| !b),
    }
}

fn lookup<'r>(record: &'r Record, field: &str) -> Result<&'r crate::Value, EvalError> {
    record.get(field).ok_or_else(|| EvalError::MissingField {
        field: field.to_owned(),
    })
}

/// Evaluate a single rule for the matcher. Evaluation errors count as a
/// non-match; they are traced and never surfaced.
#[inline]
pub(crate) fn is_hit(rule: &Rule, record: &Record) -> bool {
    match rule.predicate().evaluate(record) {
        Ok(hit) => hit,
        Err(error) => {
            trace!(rule_id = rule.id(), %error, "rule evaluation failed, treating as no match");
            false
        }
    }
}

/// Accumulates one full match pass, also counting evaluation failures.
pub(crate) struct MatchPass<'r> {
    record: &'r Record,
    hits: Vec<String>,
    evaluated: usize,
    failed: usize,
    start: Instant,
}

impl<'r> MatchPass<'r> {
    pub(crate) fn new(record: &'r Record) -> Self {
        Self {
            record,
            hits: Vec::new(),
            evaluated: 0,
            failed: 0,
            start: Instant::now(),
        }
    }

    pub(crate) fn visit(&mut self, rule: &Rule) {
        self.evaluated += 1;
        match rule.predicate().evaluate(self.record) {
            Ok(true) => self.hits.push(rule.id().to_owned()),
            Ok(false) => {}
            Err(error) => {
                trace!(rule_id = rule.id(), %error, "rule evaluation failed, treating as no match");
                self.failed += 1;
            }
        }
    }

    pub(crate) fn finish(self) -> MatchReport {
        MatchReport::new(self.hits, self.evaluated, self.failed, self.start.elapsed())
    }
}
