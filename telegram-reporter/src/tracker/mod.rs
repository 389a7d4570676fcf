// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attempt tracking across test retries.
//!
//! An external retry mechanism may execute one test several times within a
//! session, and it may surface the attempt count through different channels:
//! the reporter's own observation of repeated starts, a retry-count attribute
//! attached by a plugin, or a retry phrasing in captured output. The tracker
//! reconciles all of these into one [`AttemptRecord`] per test identity.

mod imp;
mod signals;

pub use imp::{AttemptRecord, AttemptTracker, RetryTable};
