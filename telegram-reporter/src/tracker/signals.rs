// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::events::{AttemptEvent, TestId, TestOutcome};
use regex::Regex;
use std::sync::LazyLock;

/// Where an attempt signal came from.
///
/// Direct sources observe the attempt itself; the log scanner infers it from
/// text and is inherently lossy. When both report a final outcome for the
/// same identity, direct wins.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum SignalSource {
    /// The tracker's own per-test attempt counter.
    Counter,

    /// A retry-count attribute attached to the attempt.
    Marker,

    /// A retry phrasing scraped from captured output.
    LogScan,
}

impl SignalSource {
    pub(crate) fn is_direct(self) -> bool {
        match self {
            SignalSource::Counter | SignalSource::Marker => true,
            SignalSource::LogScan => false,
        }
    }
}

/// One source's view of a single attempt.
#[derive(Clone, Debug)]
pub(crate) struct AttemptSignal {
    pub(crate) test_id: TestId,
    pub(crate) attempts: u32,
    pub(crate) outcome: Option<TestOutcome>,
    pub(crate) source: SignalSource,
}

/// An adapter that extracts attempt signals from a completed attempt event.
///
/// Adapters are infallible: an event they cannot interpret yields no signals,
/// never an error. Tracking must not be able to interrupt test execution.
pub(crate) trait SignalAdapter {
    /// The name of this adapter, for trace logging.
    fn name(&self) -> &'static str;

    /// Extracts zero or more attempt signals from `event`.
    fn extract(&self, event: &AttemptEvent) -> Vec<AttemptSignal>;
}

/// The event-derived adapters, in fixed priority order.
///
/// The tracker's own attempt counter is the highest-priority source; it is
/// produced by the tracker itself since only the tracker owns the counters.
pub(crate) static ADAPTERS: [&(dyn SignalAdapter + Sync); 2] = [&MarkerAdapter, &LogScanAdapter];

/// Attribute names conventionally used by retry mechanisms to record the
/// attempt count, in priority order.
const MARKER_PRIORITY: [&str; 4] = ["execution_count", "retry_count", "rerun_count", "attempt"];

/// Extracts the attempt count from runner-provided attempt attributes.
///
/// The first attribute in [`MARKER_PRIORITY`] that is present and parses as
/// an integer wins. A present but unparsable value is skipped, so it never
/// shadows a well-formed lower-priority one.
pub(crate) struct MarkerAdapter;

impl SignalAdapter for MarkerAdapter {
    fn name(&self) -> &'static str {
        "marker"
    }

    fn extract(&self, event: &AttemptEvent) -> Vec<AttemptSignal> {
        for name in MARKER_PRIORITY {
            let Some(value) = event.attributes.get(name) else {
                continue;
            };
            match value.parse::<u32>() {
                Ok(attempts) => {
                    return vec![AttemptSignal {
                        test_id: event.test_id.clone(),
                        attempts,
                        outcome: Some(event.outcome),
                        source: SignalSource::Marker,
                    }];
                }
                Err(_) => {
                    log::trace!(
                        "ignoring unparsable retry marker {name}={value:?} for {}",
                        event.test_id
                    );
                }
            }
        }
        Vec::new()
    }
}

/// Keyword pairs recognized as retry phrasings in captured output. A line
/// matches when it contains the pair's keywords in order, case-insensitively.
const LOG_PHRASE_PAIRS: [(&str, &str); 4] = [
    ("retrying", "attempt"),
    ("failed on attempt", "retrying"),
    ("retry", "of"),
    ("rerun", "attempt"),
];

/// Scope separator expected inside a test identity token.
const SCOPE_SEPARATOR: &str = "::";

static TRAILING_INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\D*$").expect("trailing-integer regex is valid"));

/// Scrapes retry phrasings out of captured output, line by line.
///
/// For each matching line the trailing integer is taken as the attempt
/// number, and the first whitespace-separated token containing `::` as the
/// identity. With several such tokens on one line the first wins, which can
/// misattribute the count; this is a known limitation of text scraping, and
/// why these signals carry no outcome and always lose to direct sources.
pub(crate) struct LogScanAdapter;

impl SignalAdapter for LogScanAdapter {
    fn name(&self) -> &'static str {
        "log-scan"
    }

    fn extract(&self, event: &AttemptEvent) -> Vec<AttemptSignal> {
        let Some(output) = &event.captured_output else {
            return Vec::new();
        };
        output.lines().filter_map(scan_line).collect()
    }
}

fn scan_line(line: &str) -> Option<AttemptSignal> {
    let lower = line.to_lowercase();
    if !matches_phrase_pair(&lower) {
        return None;
    }

    let attempts = TRAILING_INT_RE
        .captures(line)?
        .get(1)?
        .as_str()
        .parse::<u32>()
        .ok()?;
    let identity = line
        .split_whitespace()
        .map(trim_token)
        .find(|token| token.contains(SCOPE_SEPARATOR))?;

    Some(AttemptSignal {
        test_id: TestId::new(identity),
        attempts,
        outcome: None,
        source: SignalSource::LogScan,
    })
}

fn matches_phrase_pair(lower: &str) -> bool {
    LOG_PHRASE_PAIRS.iter().any(|(first, second)| {
        lower
            .find(first)
            .is_some_and(|idx| lower[idx + first.len()..].contains(second))
    })
}

fn trim_token(token: &str) -> &str {
    token.trim_matches(|c: char| {
        matches!(c, '!' | '.' | ',' | ';' | ':' | '"' | '\'' | '(' | ')' | '[' | ']')
    })
}
