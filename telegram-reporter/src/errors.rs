// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the reporter.

use std::{error::Error, fmt};
use thiserror::Error;

/// An error that occurred while delivering a message to the Telegram Bot API.
///
/// Delivery errors never propagate to the test session: the reporting layer
/// logs them and carries on with the remaining sends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeliveryError {
    /// The HTTP client could not be constructed.
    #[error("failed to construct HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// The request could not be sent, or the server answered with a
    /// non-success status.
    #[error("request to `{endpoint}` failed")]
    Request {
        /// The API endpoint path.
        endpoint: &'static str,

        /// The underlying transport error.
        #[source]
        error: reqwest::Error,
    },

    /// The server answered the call with `ok: false`.
    #[error("API rejected the call to `{endpoint}`: {description}")]
    Api {
        /// The API endpoint path.
        endpoint: &'static str,

        /// The server-provided description of the rejection.
        description: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response from `{endpoint}`")]
    Decode {
        /// The API endpoint path.
        endpoint: &'static str,

        /// The underlying decode error.
        #[source]
        error: serde_json::Error,
    },
}

/// Displays an error together with its chain of sources, separated by `: `.
///
/// Used when logging swallowed delivery failures, so that the cause is not
/// lost to the log reader.
pub struct DisplayErrorChain<'a>(pub &'a dyn Error);

impl fmt::Display for DisplayErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(error) = source {
            write!(f, ": {error}")?;
            source = error.source();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn error_chain_includes_sources() {
        let error = Outer(Inner);
        assert_eq!(DisplayErrorChain(&error).to_string(), "outer: inner");
        assert_eq!(DisplayErrorChain(&Inner).to_string(), "inner");
    }
}
