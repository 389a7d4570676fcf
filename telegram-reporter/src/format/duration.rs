// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display helpers for durations.

use std::{fmt, time::Duration};

/// Formats a duration as `HH:MM:SS`.
///
/// Hours are unbounded: a 25-hour session renders as `25:00:00`. Sub-second
/// precision is dropped.
pub struct DisplayHhMmSs(pub Duration);

impl fmt::Display for DisplayHhMmSs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.0.as_secs();
        let secs = total_secs % 60;
        let total_mins = total_secs / 60;
        let mins = total_mins % 60;
        let hours = total_mins / 60;

        write!(f, "{hours:02}:{mins:02}:{secs:02}")
    }
}
