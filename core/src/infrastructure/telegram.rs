//! Telegram Bot API transport.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{ChatTransport, OutboundMessage, SendStatus};
use crate::error::{ConfigError, TransportError};

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    parameters: Option<ErrorParameters>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorParameters {
    retry_after: Option<u64>,
}

/// Posts HTML messages to one chat via `sendMessage`.
#[derive(Clone)]
pub struct TelegramTransport {
    http: reqwest::Client,
    endpoint: String,
    chat_id: String,
    timeout: Duration,
}

impl TelegramTransport {
    pub fn new(
        api_url: &str,
        bot_token: &str,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(TelegramTransport {
            http,
            endpoint: format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), bot_token),
            chat_id: chat_id.into(),
            timeout,
        })
    }
}

// The endpoint embeds the bot token.
impl fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramTransport")
            .field("chat_id", &self.chat_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn post(&self, message: &OutboundMessage) -> Result<SendStatus, TransportError> {
        let body = json!({
            "chat_id": self.chat_id,
            "text": message.text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
            "disable_notification": message.silent,
        });
        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.timeout)
                } else {
                    TransportError::from(e)
                }
            })?;
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(SendStatus::Delivered);
        }
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Decode(e.without_url().to_string()))?;
        Ok(classify_response(status, &text))
    }
}

/// Map a non-success answer to a `SendStatus`. 429 bodies may carry
/// `parameters.retry_after` in seconds.
pub fn classify_response(status: u16, body: &str) -> SendStatus {
    if (200..300).contains(&status) {
        return SendStatus::Delivered;
    }
    if status == 429 {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let retry_after = parsed
            .parameters
            .and_then(|p| p.retry_after)
            .map(Duration::from_secs);
        return SendStatus::RateLimited { retry_after };
    }
    SendStatus::Rejected {
        status,
        body: body.to_string(),
    }
}
