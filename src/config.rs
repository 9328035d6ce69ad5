//! Tunables for the synthetic workload.
//!
//! Defaults reproduce the reference workload: up to five factors per rule, a
//! 30% chance of negating each leaf, an even and/or split, and integer inputs
//! that fall outside the sample domain one time in five.

use std::ops::RangeInclusive;

use thiserror::Error;

/// Spelling of the combinators in synthesized rule text.
///
/// The parser accepts both; this only affects rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dialect {
    /// `and`, `or`, `not (...)`
    #[default]
    Keyword,
    /// `&&`, `||`, `!(...)`
    Symbolic,
}

/// How the synthesizer writes a boolean factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoolStyle {
    /// `is_vip`
    #[default]
    Bare,
    /// `is_vip == true` or `is_vip == false`, chosen uniformly.
    Explicit,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SynthConfig {
    /// Upper bound on distinct fields per rule. Clamped to `[1, schema.len()]`.
    pub max_factors: usize,
    /// Probability of wrapping each leaf in a negation.
    pub not_probability: f64,
    /// Probability of joining two subtrees with `or` rather than `and`.
    pub or_probability: f64,
    pub bool_style: BoolStyle,
    pub dialect: Dialect,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            max_factors: 5,
            not_probability: 0.3,
            or_probability: 0.5,
            bool_style: BoolStyle::default(),
            dialect: Dialect::default(),
        }
    }
}

impl SynthConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Probability`] if either probability lies
    /// outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("not_probability", self.not_probability)?;
        check_probability("or_probability", self.or_probability)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InputConfig {
    /// Probability that an integer field takes a value from its domain.
    pub domain_probability: f64,
    /// Band that out-of-domain integers are drawn from. A draw that lands
    /// in the field's domain is redrawn a bounded number of times, so a band
    /// that overlaps the domain mostly yields values outside it and a band
    /// the domain covers yields domain values.
    pub out_of_domain: RangeInclusive<i64>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            domain_probability: 0.8,
            out_of_domain: 10_000..=99_999,
        }
    }
}

impl InputConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the probability lies outside `[0, 1]` or
    /// the out-of-domain band is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("domain_probability", self.domain_probability)?;
        if self.out_of_domain.is_empty() {
            return Err(ConfigError::EmptyRange {
                start: *self.out_of_domain.start(),
                end: *self.out_of_domain.end(),
            });
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },

    #[error("out-of-domain range {start}..={end} is empty")]
    EmptyRange { start: i64, end: i64 },
}
