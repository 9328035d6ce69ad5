//! Matching latency measurement.

use std::fmt;
use std::hint::black_box;
use std::panic;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::info;

use crate::{Record, RuleRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BenchmarkError {
    #[error("benchmark needs at least one input record")]
    EmptyInput,

    #[error("benchmark needs at least one thread")]
    NoThreads,
}

/// Summary of one benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct BenchmarkReport {
    records: usize,
    rules: usize,
    threads: usize,
    total: Duration,
    average: Duration,
    hits: usize,
}

impl BenchmarkReport {
    /// Number of input records matched.
    #[must_use]
    pub fn records(&self) -> usize {
        self.records
    }

    /// Repository size when the run started.
    #[must_use]
    pub fn rules(&self) -> usize {
        self.rules
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Wall-clock time of the whole run.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.total
    }

    /// `total / records`.
    #[must_use]
    pub fn average(&self) -> Duration {
        self.average
    }

    /// Matching rule ids summed over all records.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records x {} rules on {} thread(s): total {:?}, average {:?}, {} hits",
            self.records, self.rules, self.threads, self.total, self.average, self.hits
        )
    }
}

/// Match every input against `repo` sequentially and return the average
/// wall time per input.
///
/// # Errors
///
/// Returns [`BenchmarkError::EmptyInput`] if `inputs` is empty.
pub fn benchmark(repo: &RuleRepository, inputs: &[Record]) -> Result<Duration, BenchmarkError> {
    benchmark_detailed(repo, inputs).map(|report| report.average)
}

/// Sequential benchmark returning the full [`BenchmarkReport`].
///
/// # Errors
///
/// Returns [`BenchmarkError::EmptyInput`] if `inputs` is empty.
pub fn benchmark_detailed(
    repo: &RuleRepository,
    inputs: &[Record],
) -> Result<BenchmarkReport, BenchmarkError> {
    if inputs.is_empty() {
        return Err(BenchmarkError::EmptyInput);
    }
    let rules = repo.len();
    let start = Instant::now();
    let hits = match_all(repo, inputs);
    Ok(finish(inputs.len(), rules, 1, start.elapsed(), hits))
}

/// Split `inputs` into `threads` contiguous chunks and match each chunk on
/// its own scoped thread. The average is total wall time over the record
/// count, so it shrinks as threads are added.
///
/// # Errors
///
/// Returns [`BenchmarkError::NoThreads`] if `threads` is zero and
/// [`BenchmarkError::EmptyInput`] if `inputs` is empty.
pub fn benchmark_parallel(
    repo: &RuleRepository,
    inputs: &[Record],
    threads: usize,
) -> Result<BenchmarkReport, BenchmarkError> {
    if threads == 0 {
        return Err(BenchmarkError::NoThreads);
    }
    if inputs.is_empty() {
        return Err(BenchmarkError::EmptyInput);
    }
    let rules = repo.len();
    let chunk = inputs.len().div_ceil(threads);
    let start = Instant::now();
    let hits = thread::scope(|scope| {
        let workers: Vec<_> = inputs
            .chunks(chunk)
            .map(|part| scope.spawn(move || match_all(repo, part)))
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .sum()
    });
    Ok(finish(inputs.len(), rules, threads, start.elapsed(), hits))
}

fn match_all(repo: &RuleRepository, inputs: &[Record]) -> usize {
    inputs
        .iter()
        .map(|record| black_box(repo.match_record(black_box(record))).len())
        .sum()
}

fn finish(
    records: usize,
    rules: usize,
    threads: usize,
    total: Duration,
    hits: usize,
) -> BenchmarkReport {
    let per_record = total.as_nanos() / records as u128;
    let average = Duration::from_nanos(u64::try_from(per_record).unwrap_or(u64::MAX));
    info!(records, rules, threads, ?total, ?average, hits, "benchmark finished");
    BenchmarkReport {
        records,
        rules,
        threads,
        total,
        average,
        hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Consistency;

    fn repo() -> RuleRepository {
        let repo = RuleRepository::with_consistency(Consistency::Phased);
        repo.put("vip", "is_vip").unwrap();
        repo.put("prod", r#"env == "prod""#).unwrap();
        repo
    }

    fn inputs(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                Record::new()
                    .set("is_vip", i % 2 == 0)
                    .set("env", if i % 3 == 0 { "prod" } else { "test_env" })
            })
            .collect()
    }

    #[test]
    fn empty_input_is_error() {
        assert_eq!(benchmark(&repo(), &[]), Err(BenchmarkError::EmptyInput));
        assert_eq!(
            benchmark_parallel(&repo(), &[], 4),
            Err(BenchmarkError::EmptyInput)
        );
    }

    #[test]
    fn zero_threads_is_error() {
        assert_eq!(
            benchmark_parallel(&repo(), &inputs(3), 0),
            Err(BenchmarkError::NoThreads)
        );
    }

    #[test]
    fn average_bounded_by_elapsed() {
        let repo = repo();
        let inputs = inputs(1);
        let start = Instant::now();
        let average = benchmark(&repo, &inputs).unwrap();
        assert!(average <= start.elapsed());
    }

    #[test]
    fn detailed_counts_hits() {
        let report = benchmark_detailed(&repo(), &inputs(6)).unwrap();
        // vip on i = 0, 2, 4; prod on i = 0, 3
        assert_eq!(report.hits(), 5);
        assert_eq!(report.records(), 6);
        assert_eq!(report.rules(), 2);
        assert_eq!(report.threads(), 1);
        assert!(report.average() <= report.total());
    }

    #[test]
    fn parallel_matches_sequential_hits() {
        let repo = repo();
        let inputs = inputs(31);
        let sequential = benchmark_detailed(&repo, &inputs).unwrap();
        for threads in [1, 2, 4, 64] {
            let parallel = benchmark_parallel(&repo, &inputs, threads).unwrap();
            assert_eq!(parallel.hits(), sequential.hits());
            assert_eq!(parallel.records(), 31);
            assert_eq!(parallel.threads(), threads);
        }
    }

    #[test]
    fn empty_repository_still_measures() {
        let repo = RuleRepository::new();
        let report = benchmark_detailed(&repo, &inputs(2)).unwrap();
        assert_eq!(report.rules(), 0);
        assert_eq!(report.hits(), 0);
    }

    #[test]
    fn report_display() {
        let report = benchmark_detailed(&repo(), &inputs(2)).unwrap();
        let s = report.to_string();
        assert!(s.starts_with("2 records x 2 rules on 1 thread(s)"), "{s}");
    }
}
