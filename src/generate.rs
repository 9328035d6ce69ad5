use rand::Rng;
use rand::seq::IndexedRandom;

use crate::config::{ConfigError, InputConfig};
use crate::{FieldKind, FieldSpec, Record, Schema, Value};

/// Generate `count` schema-complete records with the default settings.
///
/// Booleans are a fair coin, strings come uniformly from the field's domain,
/// and integers come from the domain 80% of the time and otherwise from
/// `10000..=99999`.
pub fn generate<R: Rng + ?Sized>(schema: &Schema, count: usize, rng: &mut R) -> Vec<Record> {
    let generator = InputGenerator {
        schema,
        config: InputConfig::default(),
    };
    generator.generate(count, rng)
}

/// A configured random record generator bound to a schema.
#[derive(Debug, Clone)]
pub struct InputGenerator<'s> {
    schema: &'s Schema,
    config: InputConfig,
}

impl<'s> InputGenerator<'s> {
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn new(schema: &'s Schema, config: InputConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { schema, config })
    }

    #[must_use]
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Record> {
        (0..count).map(|_| self.record(rng)).collect()
    }

    /// One record with every schema field populated.
    pub fn record<R: Rng + ?Sized>(&self, rng: &mut R) -> Record {
        let mut record = Record::with_capacity(self.schema.len());
        for spec in self.schema.fields() {
            let value = match spec.kind() {
                FieldKind::Boolean => Some(Value::Bool(rng.random())),
                FieldKind::String => pick(spec, rng),
                FieldKind::Integer => {
                    if rng.random_bool(self.config.domain_probability) {
                        pick(spec, rng)
                    } else {
                        Some(self.outside(spec, rng))
                    }
                }
            };
            if let Some(value) = value {
                record.insert(spec.name(), value);
            }
        }
        record
    }
}

impl InputGenerator<'_> {
    /// Draw from the out-of-domain band, redrawing up to [`OUTSIDE_DRAWS`]
    /// times while the value lands in the field's domain. The last draw is
    /// kept even if it collides, so a band covered by the domain still
    /// terminates.
    fn outside<R: Rng + ?Sized>(&self, spec: &FieldSpec, rng: &mut R) -> Value {
        let mut value = Value::Int(rng.random_range(self.config.out_of_domain.clone()));
        for _ in 1..OUTSIDE_DRAWS {
            if !spec.domain().contains(&value) {
                break;
            }
            value = Value::Int(rng.random_range(self.config.out_of_domain.clone()));
        }
        value
    }
}

/// Draws per out-of-domain integer before a domain collision is accepted.
const OUTSIDE_DRAWS: usize = 8;

fn pick<R: Rng + ?Sized>(spec: &FieldSpec, rng: &mut R) -> Option<Value> {
    spec.domain().choose(rng).cloned()
}
