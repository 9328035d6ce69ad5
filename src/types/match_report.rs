use std::fmt;
use std::time::Duration;

/// Detailed result of one match pass, returned by
/// [`RuleRepository::match_detailed()`](super::repository::RuleRepository::match_detailed).
///
/// Besides the matching rule ids it reports how many rules were evaluated,
/// how many of those failed to evaluate (and were therefore counted as
/// non-matches), and the wall-clock duration of the pass.
#[derive(Debug, Clone)]
#[must_use]
pub struct MatchReport {
    hits: Vec<String>,
    evaluated: usize,
    failed: usize,
    duration: Duration,
}

impl MatchReport {
    pub(crate) fn new(hits: Vec<String>, evaluated: usize, failed: usize, duration: Duration) -> Self {
        Self {
            hits,
            evaluated,
            failed,
            duration,
        }
    }

    /// Ids of matching rules, in repository enumeration order.
    #[must_use]
    pub fn hits(&self) -> &[String] {
        &self.hits
    }

    #[must_use]
    pub fn into_hits(self) -> Vec<String> {
        self.hits
    }

    /// Number of rules evaluated in the pass.
    #[must_use]
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Number of rules whose evaluation failed (missing field, wrong kind).
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hits: [{}]", self.hits.join(", "))?;
        write!(f, ", evaluated: {}", self.evaluated)?;
        write!(f, ", failed: {}", self.failed)?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
