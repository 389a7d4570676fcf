// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events and report data consumed from the external test runner.
//!
//! The reporter does not run tests. The embedding runner produces
//! [`SessionEvent`]s over the lifetime of one test session and feeds them to
//! [`TelegramReporter`](crate::reporter::TelegramReporter); the types in this
//! module are that collaborator contract.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// A stable key identifying one test case across repeated attempts within a
/// session.
///
/// Typically a suite-qualified test name such as `suite::module::case`. The
/// reporter treats the key as opaque: only equality matters.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(SmolStr);

impl TestId {
    /// Creates a new test ID.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id.as_ref()))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TestId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Terminal classification of a test attempt, or of a test's session-level
/// result.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestOutcome {
    /// The test passed.
    Passed,

    /// The test failed an assertion.
    Failed,

    /// An error occurred outside the test's own assertions, for example in a
    /// fixture.
    Error,

    /// The test was skipped.
    Skipped,
}

impl TestOutcome {
    /// Returns true if this outcome is a success.
    pub fn is_success(self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    /// Returns true if this outcome counts as a failure.
    pub fn is_failure(self) -> bool {
        matches!(self, TestOutcome::Failed | TestOutcome::Error)
    }
}

/// The phase of a test attempt a completion belongs to.
///
/// Only [`Execute`](Self::Execute) completions carry the test's core logic;
/// the attempt tracker ignores the others.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExecutionPhase {
    /// Fixture and environment setup.
    Setup,

    /// The test body itself.
    Execute,

    /// Fixture and environment teardown.
    Teardown,
}

/// A single test's report as produced by the runner at session end.
#[derive(Clone, Debug)]
pub struct TestReport {
    /// The test's identity.
    pub id: TestId,

    /// The test's session-level outcome.
    pub outcome: TestOutcome,

    /// Short structured failure summary, if the runner produced one.
    pub failure_message: Option<String>,

    /// Raw long-form failure text.
    pub failure_text: Option<String>,

    /// Captured stdout/stderr, if the runner captures output.
    pub captured_output: Option<String>,
}

impl TestReport {
    /// Creates a report with no failure information or captured output.
    pub fn new(id: impl Into<TestId>, outcome: TestOutcome) -> Self {
        Self {
            id: id.into(),
            outcome,
            failure_message: None,
            failure_text: None,
            captured_output: None,
        }
    }
}

/// Final per-category statistics for one session.
///
/// Owned and produced entirely by the external test runner; the reporter
/// reads it once, at session end. Each bucket is in session order.
#[derive(Clone, Debug, Default)]
pub struct SessionStats {
    /// Reports for tests that passed.
    pub passed: Vec<TestReport>,

    /// Reports for tests that failed.
    pub failed: Vec<TestReport>,

    /// Reports for tests that were skipped.
    pub skipped: Vec<TestReport>,

    /// Reports for tests that errored.
    pub errors: Vec<TestReport>,
}

impl SessionStats {
    /// Adds a report to the bucket matching its outcome.
    pub fn push(&mut self, report: TestReport) {
        match report.outcome {
            TestOutcome::Passed => self.passed.push(report),
            TestOutcome::Failed => self.failed.push(report),
            TestOutcome::Skipped => self.skipped.push(report),
            TestOutcome::Error => self.errors.push(report),
        }
    }
}

/// A completed phase of a single test attempt, as observed by the tracker.
#[derive(Clone, Debug)]
pub struct AttemptEvent {
    /// The identity of the test that ran.
    pub test_id: TestId,

    /// The phase this completion belongs to.
    pub phase: ExecutionPhase,

    /// The outcome of this attempt.
    pub outcome: TestOutcome,

    /// Attributes attached to the attempt by the runner or its plugins.
    /// Retry mechanisms conventionally record their attempt counter here.
    pub attributes: IndexMap<String, String>,

    /// Captured output for this attempt, scanned for retry phrasings.
    pub captured_output: Option<String>,
}

impl AttemptEvent {
    /// Creates an execute-phase event with no attributes or captured output.
    pub fn new(test_id: impl Into<TestId>, outcome: TestOutcome) -> Self {
        Self {
            test_id: test_id.into(),
            phase: ExecutionPhase::Execute,
            outcome,
            attributes: IndexMap::new(),
            captured_output: None,
        }
    }
}

/// A session lifecycle notification fed to the reporter by the runner.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// The session started.
    SessionStarted,

    /// A test attempt began its execute phase.
    AttemptStarted {
        /// The identity of the test.
        test_id: TestId,
    },

    /// A test attempt finished a phase.
    AttemptFinished(AttemptEvent),

    /// The session ended and final statistics are available.
    SessionFinished {
        /// Final per-category statistics for the whole session.
        stats: SessionStats,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_push_routes_by_outcome() {
        let mut stats = SessionStats::default();
        stats.push(TestReport::new("a::one", TestOutcome::Passed));
        stats.push(TestReport::new("a::two", TestOutcome::Failed));
        stats.push(TestReport::new("a::three", TestOutcome::Skipped));
        stats.push(TestReport::new("a::four", TestOutcome::Error));
        stats.push(TestReport::new("a::five", TestOutcome::Passed));

        assert_eq!(stats.passed.len(), 2);
        assert_eq!(stats.failed.len(), 1);
        assert_eq!(stats.skipped.len(), 1);
        assert_eq!(stats.errors.len(), 1);
        assert_eq!(stats.passed[1].id, TestId::new("a::five"));
    }

    #[test]
    fn outcome_classification() {
        assert!(TestOutcome::Passed.is_success());
        assert!(!TestOutcome::Passed.is_failure());
        assert!(TestOutcome::Failed.is_failure());
        assert!(TestOutcome::Error.is_failure());
        assert!(!TestOutcome::Skipped.is_success());
        assert!(!TestOutcome::Skipped.is_failure());
    }
}
