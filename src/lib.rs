//! Rule matching over typed records.
//!
//! Rules are boolean expressions over named fields (`is_vip and env ==
//! "prod"`). A [`RuleRepository`] compiles and stores them by id; matching a
//! [`Record`] returns the ids of every rule it satisfies. The [`synth`] and
//! [`generate`](mod@generate) modules produce random rules and records over a
//! [`Schema`], and [`harness`] measures per-record matching latency.

mod compile;
pub mod config;
mod error;
mod evaluate;
pub mod generate;
pub mod harness;
pub mod parse;
pub mod synth;
mod types;

pub use compile::Compiler;
pub use config::{BoolStyle, ConfigError, Dialect, InputConfig, SynthConfig};
pub use error::RulematchError;
pub use generate::{InputGenerator, generate};
pub use harness::{
    BenchmarkError, BenchmarkReport, benchmark, benchmark_detailed, benchmark_parallel,
};
pub use synth::{Synthesizer, inject_random_rules, synthesize};
pub use types::{
    CompileError, Consistency, EvalError, Expr, FieldExpr, FieldKind, FieldSpec, MatchReport,
    Predicate, Record, Rule, RuleError, RuleRepository, Schema, SchemaBuilder, SchemaError, Value,
    field, flag,
};
