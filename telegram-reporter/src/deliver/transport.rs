// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::DeliveryError;
use serde::{Deserialize, Serialize};

/// A message ID returned by the Bot API, used to thread replies.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

/// Request body for `sendMessage`.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub(crate) chat_id: &'a str,
    pub(crate) text: &'a str,
    pub(crate) parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reply_to_message_id: Option<MessageId>,
}

/// Request body for `sendSticker`.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct SendStickerRequest<'a> {
    pub(crate) chat_id: &'a str,
    pub(crate) sticker: &'a str,
}

/// Envelope of every Bot API response.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiResponse {
    /// Whether the call succeeded.
    pub ok: bool,

    /// The sent message, on success.
    #[serde(default)]
    pub result: Option<ApiMessage>,

    /// Human-readable description of a failure.
    #[serde(default)]
    pub description: Option<String>,
}

/// The `result` object of a successful send.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiMessage {
    /// The ID of the sent message.
    pub message_id: MessageId,
}

/// Transport over which API calls are issued.
///
/// The production implementation is [`HttpTransport`]; tests substitute a
/// recording stub to observe calls without network access.
pub trait Transport {
    /// Posts a JSON payload and decodes the response envelope.
    ///
    /// `endpoint` is the API path (for error context); `url` is the full
    /// request URL.
    fn post(
        &self,
        endpoint: &'static str,
        url: &str,
        payload: serde_json::Value,
    ) -> Result<ApiResponse, DeliveryError>;
}

/// Blocking HTTP transport backed by `reqwest`.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Creates a transport with a default client.
    pub fn new() -> Result<Self, DeliveryError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(DeliveryError::ClientBuild)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(
        &self,
        endpoint: &'static str,
        url: &str,
        payload: serde_json::Value,
    ) -> Result<ApiResponse, DeliveryError> {
        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|error| DeliveryError::Request { endpoint, error })?;
        let body = response
            .text()
            .map_err(|error| DeliveryError::Request { endpoint, error })?;
        serde_json::from_str(&body).map_err(|error| DeliveryError::Decode { endpoint, error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_envelope_decodes() {
        let body = r#"{"ok":true,"result":{"message_id":42,"date":1700000000}}"#;
        let response: ApiResponse = serde_json::from_str(body).expect("decodes");
        assert!(response.ok);
        assert_eq!(
            response.result.expect("result present").message_id,
            MessageId(42)
        );
        assert_eq!(response.description, None);
    }

    #[test]
    fn error_envelope_decodes() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        let response: ApiResponse = serde_json::from_str(body).expect("decodes");
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(
            response.description.as_deref(),
            Some("Bad Request: chat not found")
        );
    }

    #[test]
    fn reply_to_is_omitted_when_unset() {
        let request = SendMessageRequest {
            chat_id: "c",
            text: "t",
            parse_mode: "Markdown",
            reply_to_message_id: None,
        };
        let value = serde_json::to_value(&request).expect("serializes");
        assert!(value.get("reply_to_message_id").is_none());
    }
}
