use thiserror::Error;

use crate::config::ConfigError;
use crate::harness::BenchmarkError;
use crate::parse::ParseError;
use crate::{CompileError, EvalError, RuleError, SchemaError};

/// Unified error type for callers that want a single error to propagate.
///
/// Each module keeps its own narrow error; this wraps all of them with
/// `From` conversions so `?` works across module boundaries.
#[derive(Debug, Error)]
pub enum RulematchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Benchmark(#[from] BenchmarkError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RuleRepository, Schema};

    fn load(repo: &RuleRepository, text: &str) -> Result<usize, RulematchError> {
        repo.put("r", text)?;
        Ok(repo.len())
    }

    #[test]
    fn question_mark_converts_module_errors() {
        let repo = RuleRepository::new();
        assert_eq!(load(&repo, "is_vip").unwrap(), 1);
        let err = load(&repo, "is_vip and").unwrap_err();
        assert!(matches!(err, RulematchError::Rule(_)));
        assert!(err.to_string().starts_with("rule 'r' failed to compile"));
    }

    #[test]
    fn schema_error_is_transparent() {
        let err: RulematchError = Schema::builder().build().unwrap_err().into();
        assert_eq!(err.to_string(), "schema has no fields");
    }
}
