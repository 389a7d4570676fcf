// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregation of final session statistics and retry data.

use crate::{
    events::{SessionStats, TestId, TestOutcome, TestReport},
    helpers::first_line,
    tracker::RetryTable,
};

/// Per-category test counts at session end.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CategoryCounts {
    /// The number of tests that passed.
    pub passed: usize,

    /// The number of tests that failed.
    pub failed: usize,

    /// The number of tests that were skipped.
    pub skipped: usize,

    /// The number of tests that errored.
    pub errors: usize,
}

impl CategoryCounts {
    /// The total number of tests reported by the runner.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped + self.errors
    }
}

/// Retry statistics over a session's retry table.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RetryStats {
    /// The number of tests that ran more than once.
    pub retried_test_count: usize,

    /// Attempts beyond each retried test's first, summed.
    pub total_extra_attempts: u32,
}

/// Ternary status of a retried test, derived from its final outcome.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RetryStatus {
    /// The final attempt passed.
    EventuallyPassed,

    /// The final attempt failed or errored.
    StillFailing,

    /// No terminal outcome was observed for the test.
    Unknown,
}

impl RetryStatus {
    pub(crate) fn from_outcome(outcome: Option<TestOutcome>) -> Self {
        match outcome {
            Some(TestOutcome::Passed) => RetryStatus::EventuallyPassed,
            Some(TestOutcome::Failed | TestOutcome::Error) => RetryStatus::StillFailing,
            Some(TestOutcome::Skipped) | None => RetryStatus::Unknown,
        }
    }

    /// The human-readable tag used in the retry report.
    pub fn tag(self) -> &'static str {
        match self {
            RetryStatus::EventuallyPassed => "eventually passed",
            RetryStatus::StillFailing => "still failing",
            RetryStatus::Unknown => "unknown",
        }
    }
}

/// One entry of the retry report.
#[derive(Clone, Debug)]
pub struct RetriedTest<'a> {
    /// The test's identity.
    pub id: &'a TestId,

    /// Total observed attempts. Always greater than 1.
    pub attempts: u32,

    /// Whether the test eventually passed.
    pub status: RetryStatus,
}

/// Read-only view over the runner's final statistics and the tracker's retry
/// table.
///
/// Reads everything once at session end; mutates nothing and performs no
/// I/O.
pub struct ResultAggregator<'a> {
    stats: &'a SessionStats,
    retry_table: &'a RetryTable,
}

impl<'a> ResultAggregator<'a> {
    /// Creates an aggregator over the given session data.
    pub fn new(stats: &'a SessionStats, retry_table: &'a RetryTable) -> Self {
        Self { stats, retry_table }
    }

    /// Per-category counts.
    pub fn counts(&self) -> CategoryCounts {
        CategoryCounts {
            passed: self.stats.passed.len(),
            failed: self.stats.failed.len(),
            skipped: self.stats.skipped.len(),
            errors: self.stats.errors.len(),
        }
    }

    /// True if any test failed or errored.
    pub fn has_failures(&self) -> bool {
        let counts = self.counts();
        counts.failed > 0 || counts.errors > 0
    }

    /// Retry statistics over tests that ran more than once.
    pub fn retry_stats(&self) -> RetryStats {
        let mut stats = RetryStats::default();
        for (_, record) in self.retry_table.retried() {
            stats.retried_test_count += 1;
            stats.total_extra_attempts += record.attempts() - 1;
        }
        stats
    }

    /// The retried tests, in first-occurrence order, with their status tags.
    pub fn retried_tests(&self) -> Vec<RetriedTest<'a>> {
        self.retry_table
            .retried()
            .map(|(id, record)| RetriedTest {
                id,
                attempts: record.attempts(),
                status: RetryStatus::from_outcome(record.final_outcome()),
            })
            .collect()
    }

    /// Up to `limit` single-line descriptions of failed and errored tests, in
    /// session order.
    ///
    /// Longer failure messages are deliberately truncated to their first line
    /// for legibility. When more than `limit` tests failed, an explicit
    /// truncation marker line is appended.
    pub fn failed_detail(&self, limit: usize) -> Vec<String> {
        let failures: Vec<&TestReport> = self
            .stats
            .failed
            .iter()
            .chain(self.stats.errors.iter())
            .collect();

        let mut lines: Vec<String> = failures
            .iter()
            .take(limit)
            .map(|report| format!("{}: {}", report.id, failure_line(report)))
            .collect();
        if failures.len() > limit {
            lines.push(format!("... and {} more", failures.len() - limit));
        }
        lines
    }
}

fn failure_line(report: &TestReport) -> &str {
    report
        .failure_message
        .as_deref()
        .or(report.failure_text.as_deref())
        .map(first_line)
        .unwrap_or("(no failure message)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::AttemptEvent,
        tracker::AttemptTracker,
    };

    fn stats(passed: usize, failed: usize, skipped: usize, errors: usize) -> SessionStats {
        let mut stats = SessionStats::default();
        for i in 0..passed {
            stats.push(TestReport::new(format!("p::{i}").as_str(), TestOutcome::Passed));
        }
        for i in 0..failed {
            let mut report = TestReport::new(format!("f::{i}").as_str(), TestOutcome::Failed);
            report.failure_message = Some(format!("assertion {i} failed\nleft: 1\nright: 2"));
            stats.push(report);
        }
        for i in 0..skipped {
            stats.push(TestReport::new(format!("s::{i}").as_str(), TestOutcome::Skipped));
        }
        for i in 0..errors {
            stats.push(TestReport::new(format!("e::{i}").as_str(), TestOutcome::Error));
        }
        stats
    }

    fn table_with_retries(entries: &[(&str, u32, TestOutcome)]) -> AttemptTracker {
        let mut tracker = AttemptTracker::new();
        for (id, attempts, outcome) in entries {
            let test_id = TestId::new(id);
            for _ in 0..*attempts {
                tracker.attempt_started(&test_id);
            }
            tracker.attempt_finished(&AttemptEvent::new(*id, *outcome));
        }
        tracker
    }

    #[test]
    fn counts_match_bucket_lengths() {
        let stats = stats(3, 1, 2, 1);
        let tracker = AttemptTracker::new();
        let aggregator = ResultAggregator::new(&stats, tracker.table());

        let counts = aggregator.counts();
        assert_eq!(
            counts,
            CategoryCounts {
                passed: 3,
                failed: 1,
                skipped: 2,
                errors: 1
            }
        );
        assert_eq!(counts.total(), 7);
    }

    #[test]
    fn has_failures_iff_failed_or_errored() {
        let tracker = AttemptTracker::new();

        let clean = stats(3, 0, 1, 0);
        assert!(!ResultAggregator::new(&clean, tracker.table()).has_failures());

        let failed = stats(3, 1, 0, 0);
        assert!(ResultAggregator::new(&failed, tracker.table()).has_failures());

        let errored = stats(3, 0, 0, 1);
        assert!(ResultAggregator::new(&errored, tracker.table()).has_failures());
    }

    #[test]
    fn retry_stats_count_extra_attempts() {
        let stats = stats(2, 1, 0, 0);
        let tracker = table_with_retries(&[
            ("suite::flaky", 3, TestOutcome::Passed),
            ("suite::stable", 1, TestOutcome::Passed),
            ("suite::broken", 2, TestOutcome::Failed),
        ]);
        let aggregator = ResultAggregator::new(&stats, tracker.table());

        assert_eq!(
            aggregator.retry_stats(),
            RetryStats {
                retried_test_count: 2,
                total_extra_attempts: 3
            }
        );
    }

    #[test]
    fn single_attempt_excluded_from_retry_report() {
        let stats = stats(1, 0, 0, 0);
        let tracker = table_with_retries(&[("suite::stable", 1, TestOutcome::Passed)]);
        let aggregator = ResultAggregator::new(&stats, tracker.table());

        assert_eq!(aggregator.retry_stats(), RetryStats::default());
        assert!(aggregator.retried_tests().is_empty());
    }

    #[test]
    fn retried_tests_carry_status_tags() {
        let stats = stats(1, 1, 0, 0);
        let tracker = table_with_retries(&[
            ("suite::flaky", 3, TestOutcome::Passed),
            ("suite::broken", 2, TestOutcome::Failed),
        ]);
        let aggregator = ResultAggregator::new(&stats, tracker.table());

        let retried = aggregator.retried_tests();
        assert_eq!(retried.len(), 2);
        assert_eq!(retried[0].id.as_str(), "suite::flaky");
        assert_eq!(retried[0].attempts, 3);
        assert_eq!(retried[0].status, RetryStatus::EventuallyPassed);
        assert_eq!(retried[1].status, RetryStatus::StillFailing);
    }

    #[test]
    fn retry_status_from_outcome() {
        let tests: &[(Option<TestOutcome>, RetryStatus)] = &[
            (Some(TestOutcome::Passed), RetryStatus::EventuallyPassed),
            (Some(TestOutcome::Failed), RetryStatus::StillFailing),
            (Some(TestOutcome::Error), RetryStatus::StillFailing),
            (Some(TestOutcome::Skipped), RetryStatus::Unknown),
            (None, RetryStatus::Unknown),
        ];

        for (outcome, status) in tests {
            assert_eq!(
                RetryStatus::from_outcome(*outcome),
                *status,
                "for outcome {outcome:?}"
            );
        }
    }

    #[test]
    fn failed_detail_truncates_with_marker() {
        let stats = stats(0, 5, 0, 0);
        let tracker = AttemptTracker::new();
        let aggregator = ResultAggregator::new(&stats, tracker.table());

        let detail = aggregator.failed_detail(3);
        assert_eq!(detail.len(), 4);
        assert_eq!(detail[0], "f::0: assertion 0 failed");
        assert_eq!(detail[2], "f::2: assertion 2 failed");
        assert_eq!(detail[3], "... and 2 more");
    }

    #[test]
    fn failed_detail_under_limit_has_no_marker() {
        let stats = stats(0, 2, 0, 0);
        let tracker = AttemptTracker::new();
        let aggregator = ResultAggregator::new(&stats, tracker.table());

        let detail = aggregator.failed_detail(3);
        assert_eq!(detail.len(), 2);
        assert!(detail.iter().all(|line| !line.contains("more")));
    }

    #[test]
    fn failed_detail_includes_errors_after_failures() {
        let stats = stats(0, 1, 0, 2);
        let tracker = AttemptTracker::new();
        let aggregator = ResultAggregator::new(&stats, tracker.table());

        let detail = aggregator.failed_detail(10);
        assert_eq!(detail.len(), 3);
        assert!(detail[0].starts_with("f::0: "));
        assert!(detail[1].starts_with("e::0: "));
        assert!(detail[2].starts_with("e::1: "));
    }

    #[test]
    fn failure_line_prefers_structured_message() {
        let mut report = TestReport::new("suite::case", TestOutcome::Failed);
        assert_eq!(failure_line(&report), "(no failure message)");

        report.failure_text = Some("thread panicked at foo\nbacktrace:\n...".to_owned());
        assert_eq!(failure_line(&report), "thread panicked at foo");

        report.failure_message = Some("assertion failed: got 2".to_owned());
        assert_eq!(failure_line(&report), "assertion failed: got 2");
    }
}
