// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Returns the first line of `s`, without the line terminator.
///
/// Returns the whole string if it contains no newline.
pub(crate) fn first_line(s: &str) -> &str {
    match s.find('\n') {
        Some(idx) => s[..idx].trim_end_matches('\r'),
        None => s,
    }
}
