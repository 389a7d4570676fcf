// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timekeeping for a test session.

mod stopwatch;

pub(crate) use stopwatch::*;
