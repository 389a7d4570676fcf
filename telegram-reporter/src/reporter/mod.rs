// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session-scoped reporter that ties tracking, aggregation, formatting
//! and delivery together.

mod imp;

pub use imp::TelegramReporter;
