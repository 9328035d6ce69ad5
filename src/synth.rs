//! Random rule synthesis.
//!
//! Rules are built by picking a handful of distinct schema fields, turning
//! each into a literal comparison, and recursively joining random splits of
//! them with `and`/`or`. Every random choice goes through the caller's
//! [`Rng`], so a seeded generator reproduces the same rules.

use rand::Rng;
use rand::seq::{IndexedRandom, index};
use tracing::{info, instrument, trace};

use crate::config::{BoolStyle, ConfigError, SynthConfig};
use crate::{Expr, FieldKind, FieldSpec, RuleError, RuleRepository, Schema, field, flag};

/// Synthesize one rule over `schema` with the default settings and up to
/// `max_factors` distinct fields.
///
/// The text always compiles, including against a schema-checked compiler
/// for the same schema.
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use rulematch::{Compiler, Schema, synthesize};
///
/// let schema = Schema::factor_pool();
/// let mut rng = StdRng::seed_from_u64(7);
/// let text = synthesize(&schema, 5, &mut rng);
/// assert!(Compiler::new().compile(&text).is_ok());
/// ```
pub fn synthesize<R: Rng + ?Sized>(schema: &Schema, max_factors: usize, rng: &mut R) -> String {
    let synthesizer = Synthesizer {
        schema,
        config: SynthConfig {
            max_factors,
            ..SynthConfig::default()
        },
    };
    synthesizer.synthesize(rng)
}

/// A configured rule synthesizer bound to a schema.
#[derive(Debug, Clone)]
pub struct Synthesizer<'s> {
    schema: &'s Schema,
    config: SynthConfig,
}

impl<'s> Synthesizer<'s> {
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn new(schema: &'s Schema, config: SynthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { schema, config })
    }

    #[must_use]
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Synthesize rule text in the configured dialect.
    pub fn synthesize<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.synthesize_expr(rng).to_source(self.config.dialect)
    }

    /// Synthesize a rule as an expression tree.
    pub fn synthesize_expr<R: Rng + ?Sized>(&self, rng: &mut R) -> Expr {
        let upper = self.config.max_factors.clamp(1, self.schema.len().max(1));
        let n = rng.random_range(1..=upper);
        let fields = self.schema.fields();
        let picked: Vec<&FieldSpec> = index::sample(rng, fields.len(), n)
            .into_iter()
            .map(|i| &fields[i])
            .collect();
        self.combine(&picked, rng)
    }

    fn combine<R: Rng + ?Sized>(&self, fields: &[&FieldSpec], rng: &mut R) -> Expr {
        if let [only] = fields {
            let leaf = self.snippet(only, rng);
            return if rng.random_bool(self.config.not_probability) {
                !leaf
            } else {
                leaf
            };
        }
        let split = rng.random_range(1..fields.len());
        let left = self.combine(&fields[..split], rng);
        let right = self.combine(&fields[split..], rng);
        if rng.random_bool(self.config.or_probability) {
            left.or(right)
        } else {
            left.and(right)
        }
    }

    fn snippet<R: Rng + ?Sized>(&self, spec: &FieldSpec, rng: &mut R) -> Expr {
        match (spec.kind(), self.config.bool_style) {
            (FieldKind::Boolean, BoolStyle::Bare) => flag(spec.name()),
            (FieldKind::Boolean, BoolStyle::Explicit) => {
                field(spec.name()).eq(rng.random::<bool>())
            }
            // Built schemas guarantee a non-empty domain here.
            (FieldKind::String | FieldKind::Integer, _) => spec
                .domain()
                .choose(rng)
                .map_or_else(|| flag(spec.name()), |v| field(spec.name()).eq(v.clone())),
        }
    }
}

/// Synthesize `count` rules and install them as `auto-1` ..= `auto-{count}`.
///
/// Stops at the first rule the repository rejects.
///
/// # Errors
///
/// Returns the repository's [`RuleError`] for the rejected rule.
#[instrument(skip(repo, synthesizer, rng))]
pub fn inject_random_rules<R: Rng + ?Sized>(
    repo: &RuleRepository,
    synthesizer: &Synthesizer<'_>,
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>, RuleError> {
    let mut ids = Vec::with_capacity(count);
    for i in 1..=count {
        let id = format!("auto-{i}");
        let text = synthesizer.synthesize(rng);
        repo.put(&id, &text)?;
        trace!(rule_id = %id, rule = %text, "injected rule");
        ids.push(id);
    }
    info!(count, total = repo.len(), "injected random rules");
    Ok(ids)
}
