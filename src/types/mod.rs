mod error;
mod expr;
mod match_report;
mod record;
mod repository;
mod rule;
mod schema;
mod value;

pub use error::{CompileError, EvalError, RuleError, SchemaError};
pub(crate) use expr::CompiledExpr;
pub use expr::{Expr, FieldExpr, field, flag};
pub use match_report::MatchReport;
pub use record::Record;
pub use repository::{Consistency, RuleRepository};
pub use rule::{Predicate, Rule};
pub use schema::{FieldKind, FieldSpec, Schema, SchemaBuilder};
pub use value::Value;
