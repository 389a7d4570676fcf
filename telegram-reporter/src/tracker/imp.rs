// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::signals::{ADAPTERS, AttemptSignal, SignalSource};
use crate::events::{AttemptEvent, ExecutionPhase, TestId, TestOutcome};
use indexmap::IndexMap;

/// A single test's accumulated attempt history.
#[derive(Clone, Debug)]
pub struct AttemptRecord {
    attempts: u32,
    final_outcome: Option<TestOutcome>,
    outcome_source: Option<SignalSource>,
}

impl AttemptRecord {
    /// The number of attempts observed for this test. At least 1.
    ///
    /// Always the maximum across signal sources, never a sum: the sources all
    /// describe the same executions.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The most recently observed terminal outcome, if any signal carried
    /// one. `None` means the test is only known through scraped output.
    pub fn final_outcome(&self) -> Option<TestOutcome> {
        self.final_outcome
    }

    /// True if this test ran more than once.
    ///
    /// Presence in the table alone does not imply a retry; a test that ran
    /// exactly once stays out of all retry reporting.
    pub fn is_retried(&self) -> bool {
        self.attempts > 1
    }

    fn apply(&mut self, signal: &AttemptSignal) {
        self.attempts = self.attempts.max(signal.attempts);
        if let Some(outcome) = signal.outcome {
            // Direct signals overwrite freely; a scraped outcome only fills
            // in for a record no direct source has written to.
            let direct_already_set = matches!(self.outcome_source, Some(source) if source.is_direct());
            if signal.source.is_direct() || !direct_already_set {
                self.final_outcome = Some(outcome);
                self.outcome_source = Some(signal.source);
            }
        }
    }
}

/// Mapping from test identity to attempt record, in first-occurrence order.
///
/// Created empty at session start, mutated once per observed attempt
/// completion, read once at session end, and discarded with the session.
#[derive(Clone, Debug, Default)]
pub struct RetryTable {
    records: IndexMap<TestId, AttemptRecord>,
}

impl RetryTable {
    /// The number of identities in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no attempts have been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the record for one identity.
    pub fn get(&self, test_id: &TestId) -> Option<&AttemptRecord> {
        self.records.get(test_id)
    }

    /// Iterates over all records in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&TestId, &AttemptRecord)> {
        self.records.iter()
    }

    /// Iterates over the records of tests that ran more than once.
    pub fn retried(&self) -> impl Iterator<Item = (&TestId, &AttemptRecord)> {
        self.iter().filter(|(_, record)| record.is_retried())
    }

    fn apply(&mut self, signal: AttemptSignal) {
        let record = self
            .records
            .entry(signal.test_id.clone())
            .or_insert_with(|| AttemptRecord {
                attempts: 1,
                final_outcome: None,
                outcome_source: None,
            });
        record.apply(&signal);
    }
}

/// Accumulates per-test attempt counts and final outcomes for one session.
///
/// The tracker is session-scoped state owned by the reporter, updated once
/// per observed attempt completion. Three signal sources feed the same
/// record, in fixed priority order: the tracker's own started-attempt
/// counter, retry-count attributes on the event, and retry phrasings scraped
/// from captured output. Updates are infallible and never affect the test
/// run itself.
#[derive(Clone, Debug, Default)]
pub struct AttemptTracker {
    started: IndexMap<TestId, u32>,
    table: RetryTable,
}

impl AttemptTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the start of an attempt's execute phase.
    ///
    /// The first call for an identity initializes its counter to 1.
    pub fn attempt_started(&mut self, test_id: &TestId) {
        *self.started.entry(test_id.clone()).or_insert(0) += 1;
    }

    /// Records a completed attempt.
    ///
    /// Completions outside the execute phase are ignored, so setup and
    /// teardown reports cannot inflate the count. Attempt counts from
    /// different sources merge by maximum, never by sum.
    pub fn attempt_finished(&mut self, event: &AttemptEvent) {
        if event.phase != ExecutionPhase::Execute {
            return;
        }

        let counter = self
            .started
            .get(&event.test_id)
            .copied()
            .unwrap_or(1)
            .max(1);
        self.table.apply(AttemptSignal {
            test_id: event.test_id.clone(),
            attempts: counter,
            outcome: Some(event.outcome),
            source: SignalSource::Counter,
        });

        for adapter in ADAPTERS {
            for signal in adapter.extract(event) {
                log::trace!(
                    "{} signal for {}: {} attempts",
                    adapter.name(),
                    signal.test_id,
                    signal.attempts
                );
                self.table.apply(signal);
            }
        }
    }

    /// The retry table accumulated so far.
    pub fn table(&self) -> &RetryTable {
        &self.table
    }

    /// Clears all state for a fresh session.
    pub fn reset(&mut self) {
        self.started.clear();
        self.table = RetryTable::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> TestId {
        TestId::new(s)
    }

    fn run_attempt(tracker: &mut AttemptTracker, test_id: &str, outcome: TestOutcome) {
        tracker.attempt_started(&id(test_id));
        tracker.attempt_finished(&AttemptEvent::new(test_id, outcome));
    }

    #[test]
    fn counter_tracks_repeated_attempts() {
        let mut tracker = AttemptTracker::new();
        run_attempt(&mut tracker, "suite::flaky", TestOutcome::Failed);
        run_attempt(&mut tracker, "suite::flaky", TestOutcome::Failed);
        run_attempt(&mut tracker, "suite::flaky", TestOutcome::Passed);

        let record = tracker.table().get(&id("suite::flaky")).expect("recorded");
        assert_eq!(record.attempts(), 3);
        assert_eq!(record.final_outcome(), Some(TestOutcome::Passed));
        assert!(record.is_retried());
    }

    #[test]
    fn single_attempt_is_not_retried() {
        let mut tracker = AttemptTracker::new();
        run_attempt(&mut tracker, "suite::stable", TestOutcome::Passed);

        let record = tracker.table().get(&id("suite::stable")).expect("recorded");
        assert_eq!(record.attempts(), 1);
        assert!(!record.is_retried());
        assert_eq!(tracker.table().retried().count(), 0);
    }

    #[test]
    fn non_execute_phases_are_ignored() {
        let mut tracker = AttemptTracker::new();
        tracker.attempt_started(&id("suite::case"));

        let mut setup = AttemptEvent::new("suite::case", TestOutcome::Error);
        setup.phase = ExecutionPhase::Setup;
        tracker.attempt_finished(&setup);

        let mut teardown = AttemptEvent::new("suite::case", TestOutcome::Error);
        teardown.phase = ExecutionPhase::Teardown;
        tracker.attempt_finished(&teardown);

        assert!(tracker.table().is_empty());

        tracker.attempt_finished(&AttemptEvent::new("suite::case", TestOutcome::Passed));
        assert_eq!(tracker.table().len(), 1);
    }

    #[test]
    fn marker_and_counter_merge_by_max() {
        let mut tracker = AttemptTracker::new();
        tracker.attempt_started(&id("suite::case"));

        // The marker reports more attempts than the counter has seen, e.g.
        // because earlier attempts ran before the reporter was attached.
        let mut event = AttemptEvent::new("suite::case", TestOutcome::Passed);
        event
            .attributes
            .insert("execution_count".to_owned(), "3".to_owned());
        tracker.attempt_finished(&event);

        let record = tracker.table().get(&id("suite::case")).expect("recorded");
        assert_eq!(record.attempts(), 3);

        // A lower marker on a later attempt must not shrink the count.
        let mut event = AttemptEvent::new("suite::case", TestOutcome::Passed);
        event
            .attributes
            .insert("execution_count".to_owned(), "2".to_owned());
        tracker.attempt_finished(&event);

        let record = tracker.table().get(&id("suite::case")).expect("recorded");
        assert_eq!(record.attempts(), 3, "attempts are monotonic");
    }

    #[test]
    fn sources_never_sum() {
        let mut tracker = AttemptTracker::new();
        tracker.attempt_started(&id("suite::case"));
        tracker.attempt_started(&id("suite::case"));

        // Counter says 2, marker says 2, log line says 2: all describe the
        // same executions.
        let mut event = AttemptEvent::new("suite::case", TestOutcome::Passed);
        event
            .attributes
            .insert("retry_count".to_owned(), "2".to_owned());
        event.captured_output = Some("Retrying suite::case, attempt 2".to_owned());
        tracker.attempt_finished(&event);

        let record = tracker.table().get(&id("suite::case")).expect("recorded");
        assert_eq!(record.attempts(), 2);
    }

    #[test]
    fn log_scan_creates_records_for_other_identities() {
        let mut tracker = AttemptTracker::new();
        tracker.attempt_started(&id("suite::case"));

        let mut event = AttemptEvent::new("suite::case", TestOutcome::Passed);
        event.captured_output = Some("Retrying suite::other, attempt 2".to_owned());
        tracker.attempt_finished(&event);

        let other = tracker.table().get(&id("suite::other")).expect("recorded");
        assert_eq!(other.attempts(), 2);
        assert_eq!(other.final_outcome(), None, "scraped records have no outcome");
    }

    #[test]
    fn direct_outcome_wins_over_scraped_record() {
        let mut tracker = AttemptTracker::new();

        // First the test is only known through another test's output.
        let mut event = AttemptEvent::new("suite::noisy", TestOutcome::Passed);
        event.captured_output = Some("Retrying suite::quiet, attempt 2".to_owned());
        tracker.attempt_finished(&event);

        // Then a direct completion arrives for it.
        tracker.attempt_started(&id("suite::quiet"));
        tracker.attempt_finished(&AttemptEvent::new("suite::quiet", TestOutcome::Failed));

        let record = tracker.table().get(&id("suite::quiet")).expect("recorded");
        assert_eq!(record.final_outcome(), Some(TestOutcome::Failed));
        assert_eq!(record.attempts(), 2, "scraped count survives the merge");
    }

    #[test]
    fn final_outcome_reflects_latest_direct_result() {
        let mut tracker = AttemptTracker::new();
        run_attempt(&mut tracker, "suite::case", TestOutcome::Failed);
        run_attempt(&mut tracker, "suite::case", TestOutcome::Error);
        run_attempt(&mut tracker, "suite::case", TestOutcome::Passed);

        let record = tracker.table().get(&id("suite::case")).expect("recorded");
        assert_eq!(record.final_outcome(), Some(TestOutcome::Passed));
    }

    #[test]
    fn table_preserves_first_occurrence_order() {
        let mut tracker = AttemptTracker::new();
        run_attempt(&mut tracker, "suite::b", TestOutcome::Passed);
        run_attempt(&mut tracker, "suite::a", TestOutcome::Passed);
        run_attempt(&mut tracker, "suite::b", TestOutcome::Passed);

        let order: Vec<_> = tracker.table().iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, ["suite::b", "suite::a"]);
    }

    #[test]
    fn reset_clears_all_state() {
        let mut tracker = AttemptTracker::new();
        run_attempt(&mut tracker, "suite::case", TestOutcome::Passed);
        tracker.reset();

        assert!(tracker.table().is_empty());

        // Counters restart from scratch too.
        run_attempt(&mut tracker, "suite::case", TestOutcome::Passed);
        let record = tracker.table().get(&id("suite::case")).expect("recorded");
        assert_eq!(record.attempts(), 1);
    }
}
