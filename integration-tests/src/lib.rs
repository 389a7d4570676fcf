// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test helpers for exercising the reporter end to end.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};
use telegram_reporter::{
    deliver::{ApiMessage, ApiResponse, MessageId, Transport},
    errors::DeliveryError,
};

/// One call observed by the [`RecordingTransport`].
#[derive(Clone, Debug)]
pub struct RecordedCall {
    /// The API endpoint path, e.g. `/sendMessage`.
    pub endpoint: &'static str,

    /// The full request URL.
    pub url: String,

    /// The JSON payload that was posted.
    pub payload: serde_json::Value,
}

/// Shared, inspectable log of recorded calls.
pub type CallLog = Arc<Mutex<Vec<RecordedCall>>>;

/// A [`Transport`] stub that records every call instead of hitting the
/// network.
///
/// Successful calls answer with incrementing message IDs starting at 1.
/// Calls to endpoints registered via [`fail_endpoint`](Self::fail_endpoint)
/// are still recorded, but answer with an API rejection.
pub struct RecordingTransport {
    calls: CallLog,
    fail_endpoints: HashSet<&'static str>,
    next_message_id: Mutex<i64>,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingTransport {
    /// Creates a transport where every call succeeds.
    pub fn new() -> Self {
        Self {
            calls: CallLog::default(),
            fail_endpoints: HashSet::new(),
            next_message_id: Mutex::new(0),
        }
    }

    /// Makes every call to `endpoint` answer with an API rejection.
    pub fn fail_endpoint(mut self, endpoint: &'static str) -> Self {
        self.fail_endpoints.insert(endpoint);
        self
    }

    /// A handle onto the call log, kept by the test before the transport is
    /// boxed and handed to the reporter.
    pub fn call_log(&self) -> CallLog {
        Arc::clone(&self.calls)
    }
}

impl Transport for RecordingTransport {
    fn post(
        &self,
        endpoint: &'static str,
        url: &str,
        payload: serde_json::Value,
    ) -> Result<ApiResponse, DeliveryError> {
        self.calls
            .lock()
            .expect("call log lock is never poisoned")
            .push(RecordedCall {
                endpoint,
                url: url.to_owned(),
                payload,
            });

        if self.fail_endpoints.contains(endpoint) {
            return Err(DeliveryError::Api {
                endpoint,
                description: "stubbed failure".to_owned(),
            });
        }

        let mut next = self
            .next_message_id
            .lock()
            .expect("message ID lock is never poisoned");
        *next += 1;
        Ok(ApiResponse {
            ok: true,
            result: Some(ApiMessage {
                message_id: MessageId(*next),
            }),
            description: None,
        })
    }
}
