// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery of rendered messages to the Telegram Bot API.
//!
//! Delivery is best-effort by design: every call returns a [`Result`] and
//! the reporting layer logs failures and moves on. A notifier must never
//! block or fail the test run it is reporting on, so there are no retries,
//! no backoff and no timeout configuration here.

mod transport;

pub use transport::{ApiMessage, ApiResponse, HttpTransport, MessageId, Transport};

use crate::errors::DeliveryError;
use transport::{SendMessageRequest, SendStickerRequest};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Endpoint path for posting a sticker.
pub const SEND_STICKER: &str = "/sendSticker";

/// Endpoint path for posting a text message.
pub const SEND_MESSAGE: &str = "/sendMessage";

/// Text-formatting mode sent with every message.
const PARSE_MODE: &str = "Markdown";

/// Client for one destination chat.
pub struct TelegramClient {
    base_url: String,
    chat_id: String,
    transport: Box<dyn Transport>,
}

impl TelegramClient {
    /// Creates a client over the real HTTP transport.
    pub fn new(token: &str, chat_id: &str) -> Result<Self, DeliveryError> {
        Ok(Self::with_transport(
            token,
            chat_id,
            Box::new(HttpTransport::new()?),
        ))
    }

    /// Creates a client over a custom transport.
    ///
    /// Tests use this to observe calls without network access.
    pub fn with_transport(token: &str, chat_id: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            base_url: format!("{TELEGRAM_API_BASE}/bot{token}"),
            chat_id: chat_id.to_owned(),
            transport,
        }
    }

    /// Posts a sticker to the chat.
    ///
    /// The returned message ID can be used to thread a later message as a
    /// reply to the sticker.
    pub fn send_sticker(&self, sticker_id: &str) -> Result<MessageId, DeliveryError> {
        let payload = serde_json::to_value(SendStickerRequest {
            chat_id: &self.chat_id,
            sticker: sticker_id,
        })
        .expect("sticker request is serializable");
        self.call(SEND_STICKER, payload)
    }

    /// Posts a Markdown text message to the chat, optionally as a reply.
    pub fn send_message(
        &self,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, DeliveryError> {
        let payload = serde_json::to_value(SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: PARSE_MODE,
            reply_to_message_id: reply_to,
        })
        .expect("message request is serializable");
        self.call(SEND_MESSAGE, payload)
    }

    fn call(
        &self,
        endpoint: &'static str,
        payload: serde_json::Value,
    ) -> Result<MessageId, DeliveryError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.transport.post(endpoint, &url, payload)?;
        if !response.ok {
            return Err(DeliveryError::Api {
                endpoint,
                description: response
                    .description
                    .unwrap_or_else(|| "no description".to_owned()),
            });
        }
        match response.result {
            Some(message) => Ok(message.message_id),
            None => Err(DeliveryError::Api {
                endpoint,
                description: "response carried no message".to_owned(),
            }),
        }
    }
}
