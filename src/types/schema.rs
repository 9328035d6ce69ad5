use std::collections::HashSet;
use std::fmt;

use super::error::SchemaError;
use super::value::Value;
use crate::parse::is_identifier;

/// The type of a schema field. Fixed for the lifetime of the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldKind {
    Boolean,
    String,
    Integer,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Boolean => write!(f, "boolean"),
            FieldKind::String => write!(f, "string"),
            FieldKind::Integer => write!(f, "integer"),
        }
    }
}

/// A field usable in rules, with the sample domain that the synthesizer and
/// input generator draw literals from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    domain: Vec<Value>,
}

impl FieldSpec {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Sample values for string and integer fields. Always empty for booleans.
    #[must_use]
    pub fn domain(&self) -> &[Value] {
        &self.domain
    }
}

/// An ordered, immutable set of fields with unique names.
///
/// Built with [`SchemaBuilder`], which rejects empty schemas, duplicate names,
/// and domains that are empty or hold values of the wrong kind.
///
/// # Example
///
/// ```
/// use rulematch::Schema;
///
/// let schema = Schema::builder()
///     .boolean("is_vip")
///     .string("env", ["prod", "staging"])
///     .integer("user_id", [12345, 67890])
///     .build()
///     .unwrap();
/// assert_eq!(schema.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// The realistic factor pool used by the benchmark workload: four boolean
    /// flags, two enumerated strings and one integer id.
    #[must_use]
    pub fn factor_pool() -> Self {
        let fields = vec![
            spec("is_vip", FieldKind::Boolean, Vec::new()),
            spec("blacklisted", FieldKind::Boolean, Vec::new()),
            spec("email_verified", FieldKind::Boolean, Vec::new()),
            spec("high_risk_ip", FieldKind::Boolean, Vec::new()),
            spec(
                "env",
                FieldKind::String,
                ["prod", "staging", "test_env"].map(Value::from).to_vec(),
            ),
            spec(
                "payment_method",
                FieldKind::String,
                ["ABCD", "XYZ", "PAYPAL", "STRIPE"].map(Value::from).to_vec(),
            ),
            spec(
                "user_id",
                FieldKind::Integer,
                [12345_i64, 67890, 13579, 24680].map(Value::from).to_vec(),
            ),
        ];
        Self { fields }
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false` for a built schema; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn spec(name: &str, kind: FieldKind, domain: Vec<Value>) -> FieldSpec {
    FieldSpec {
        name: name.to_owned(),
        kind,
        domain,
    }
}

/// Builder for a [`Schema`]. Validation happens in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldSpec>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn boolean(mut self, name: &str) -> Self {
        self.fields.push(spec(name, FieldKind::Boolean, Vec::new()));
        self
    }

    #[must_use]
    pub fn string<I, S>(mut self, name: &str, domain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domain = domain.into_iter().map(|s| Value::String(s.into())).collect();
        self.fields.push(spec(name, FieldKind::String, domain));
        self
    }

    #[must_use]
    pub fn integer(mut self, name: &str, domain: impl IntoIterator<Item = i64>) -> Self {
        let domain = domain.into_iter().map(Value::Int).collect();
        self.fields.push(spec(name, FieldKind::Integer, domain));
        self
    }

    /// Add a field with an explicit kind and domain. Unlike the typed helpers
    /// this can describe an invalid field; `build` reports it.
    #[must_use]
    pub fn field(mut self, name: &str, kind: FieldKind, domain: Vec<Value>) -> Self {
        self.fields.push(spec(name, kind, domain));
        self
    }

    /// Validate and freeze the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the schema is empty, a name is not a valid
    /// rule identifier or is a keyword, a name repeats, a string/integer
    /// domain is empty, a boolean field carries a domain, or a
    /// domain value has the wrong kind.
    pub fn build(self) -> Result<Schema, SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !is_identifier(&field.name) {
                return Err(SchemaError::InvalidName {
                    field: field.name.clone(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    field: field.name.clone(),
                });
            }
            check_domain(field)?;
        }
        Ok(Schema {
            fields: self.fields,
        })
    }
}

fn check_domain(field: &FieldSpec) -> Result<(), SchemaError> {
    match field.kind {
        FieldKind::Boolean if !field.domain.is_empty() => Err(SchemaError::BooleanDomain {
            field: field.name.clone(),
        }),
        FieldKind::Boolean => Ok(()),
        FieldKind::String | FieldKind::Integer if field.domain.is_empty() => {
            Err(SchemaError::EmptyDomain {
                field: field.name.clone(),
            })
        }
        kind => match field.domain.iter().find(|v| v.kind() != kind) {
            Some(bad) => Err(SchemaError::DomainKindMismatch {
                field: field.name.clone(),
                expected: kind,
                found: bad.kind(),
            }),
            None => Ok(()),
        },
    }
}
