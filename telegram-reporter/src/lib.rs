// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Telegram notifications for test runs.
//!
//! This crate is a hook-driven add-on for a test runner it does not control.
//! The runner feeds it session lifecycle events — attempt completions while
//! the session runs, final statistics at the end — and the reporter posts a
//! short Markdown summary, plus optional retry and failure reports, to a
//! Telegram chat.
//!
//! Reporting is strictly observational and best-effort: if the destination
//! is not configured the reporter is inert, and if delivery fails the error
//! is logged and swallowed. The test run's exit status is never affected.
//!
//! ```no_run
//! use telegram_reporter::{
//!     events::{AttemptEvent, SessionEvent, SessionStats, TestOutcome, TestReport},
//!     reporter::TelegramReporter,
//! };
//!
//! let mut reporter = TelegramReporter::from_env();
//! reporter.report_event(SessionEvent::SessionStarted);
//!
//! // ... once per test attempt, as the runner executes tests ...
//! reporter.report_event(SessionEvent::AttemptStarted {
//!     test_id: "suite::case".into(),
//! });
//! reporter.report_event(SessionEvent::AttemptFinished(AttemptEvent::new(
//!     "suite::case",
//!     TestOutcome::Passed,
//! )));
//!
//! // ... at session end ...
//! let mut stats = SessionStats::default();
//! stats.push(TestReport::new("suite::case", TestOutcome::Passed));
//! reporter.report_event(SessionEvent::SessionFinished { stats });
//! ```

pub mod aggregate;
pub mod config;
pub mod deliver;
pub mod errors;
pub mod events;
pub mod format;
mod helpers;
pub mod reporter;
mod time;
pub mod tracker;
