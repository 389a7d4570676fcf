// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of notification messages.
//!
//! Everything in this module is pure: the session start time and duration
//! are inputs, never read from a clock, and nothing here performs I/O. The
//! output is Telegram-flavored Markdown.

mod duration;

pub use duration::DisplayHhMmSs;

use crate::aggregate::{CategoryCounts, RetriedTest, RetryStats};
use chrono::{DateTime, Local};
use std::time::Duration;
use swrite::{SWrite, swrite, swriteln};

/// Inputs for the summary block.
#[derive(Clone, Debug)]
pub struct SummaryInputs<'a> {
    /// Final per-category counts.
    pub counts: CategoryCounts,

    /// Session start time, in the local time zone of the executing host.
    pub start_time: DateTime<Local>,

    /// Elapsed wall-clock duration of the session.
    pub duration: Duration,

    /// Free-text environment label, if configured.
    pub env_label: Option<&'a str>,

    /// URL of an externally hosted report, if configured.
    pub report_url: Option<&'a str>,
}

/// Renders the summary block sent as the main notification message.
pub fn summary_message(inputs: &SummaryInputs<'_>) -> String {
    let mut out = String::new();
    swriteln!(out, " 🚀 Passed: *{}*", inputs.counts.passed);
    swriteln!(out, " ☠ Failed: *{}*", inputs.counts.failed);
    swriteln!(out, " 😐 Skipped: *{}*", inputs.counts.skipped);
    swriteln!(out, " 🗿 Errors: *{}*", inputs.counts.errors);
    swrite!(
        out,
        "\n ⌛ Start time: *{}*",
        inputs.start_time.format("%d-%m-%Y %H:%M:%S")
    );
    swrite!(out, "\n ⏰ Time taken: *{}*", DisplayHhMmSs(inputs.duration));
    if let Some(env_label) = inputs.env_label {
        swrite!(out, "\n ⛺ Environment: *{env_label}*");
    }
    if let Some(report_url) = inputs.report_url {
        swrite!(out, "\n 🤓 Report url: *{report_url}*");
    }
    out
}

/// Renders the retry report, or `None` when no test was retried.
pub fn retry_message(retried: &[RetriedTest<'_>], stats: &RetryStats) -> Option<String> {
    if retried.is_empty() {
        return None;
    }

    let mut out = String::new();
    swriteln!(out, "*The following tests were retried:*");
    swriteln!(out, "");
    for test in retried {
        swriteln!(
            out,
            "    {}: {} attempts ({})",
            test.id,
            test.attempts,
            test.status.tag()
        );
    }
    swriteln!(out, "");
    swriteln!(
        out,
        "Retried tests: *{}*, extra attempts: *{}*",
        stats.retried_test_count,
        stats.total_extra_attempts
    );
    swrite!(out, "*End of test retry report.*");
    Some(out)
}

/// Renders the failed-test block, or `None` when nothing failed.
pub fn failed_message(detail: &[String]) -> Option<String> {
    if detail.is_empty() {
        return None;
    }

    let mut out = String::new();
    swrite!(out, "*Failed tests:*");
    for line in detail {
        swrite!(out, "\n    {line}");
    }
    Some(out)
}
