//! reqwest-backed Bot API client.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

use crate::types::ChatId;

use super::error::BotApiError;
use super::messenger::{Messenger, Update, parse_updates};

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_TELEGRAM_TIMEOUT_SECS: u64 = 10;

/// Seconds the server holds a `getUpdates` request open when idle.
pub const DEFAULT_LONG_POLL_SECS: u64 = 25;

#[derive(Clone)]
pub struct BotConfig {
    pub api_url: String,
    pub token: String,
    /// Timeout for `sendMessage`. `getUpdates` gets this plus the long-poll
    /// window.
    pub timeout: Duration,
    pub long_poll_secs: u64,
}

impl BotConfig {
    pub fn new(token: impl Into<String>) -> Self {
        BotConfig {
            api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_TELEGRAM_TIMEOUT_SECS),
            long_poll_secs: DEFAULT_LONG_POLL_SECS,
        }
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("long_poll_secs", &self.long_poll_secs)
            .finish()
    }
}

/// The Bot API response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BotClient {
    config: BotConfig,
    client: Client,
}

impl BotClient {
    pub fn new(config: BotConfig) -> Result<Self, BotApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(BotApiError::from_reqwest)?;
        Ok(BotClient { config, client })
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.token,
            method
        )
    }

    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Option<T>, BotApiError> {
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(BotApiError::from_reqwest)?;

        let envelope: Envelope<T> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(e) if (200..300).contains(&status) => {
                return Err(BotApiError::permanent_without_source(format!(
                    "malformed response: {e}"
                )));
            }
            Err(_) => {
                return Err(BotApiError::from_response(
                    status,
                    String::from_utf8_lossy(&body).into_owned(),
                ));
            }
        };

        if envelope.ok {
            Ok(envelope.result)
        } else {
            Err(BotApiError::from_response(
                envelope.error_code.unwrap_or(status),
                envelope.description.unwrap_or_default(),
            ))
        }
    }
}

impl Messenger for BotClient {
    #[instrument(skip(self, text), fields(chat_id = %chat, len = text.len()))]
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<(), BotApiError> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({
                "chat_id": chat.0,
                "text": text,
                "parse_mode": "HTML",
                "disable_web_page_preview": true,
            }))
            .send()
            .await
            .map_err(BotApiError::from_reqwest)?;

        Self::read_envelope::<serde_json::Value>(response).await?;
        debug!("Message sent");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, BotApiError> {
        let mut query = vec![("timeout", self.config.long_poll_secs.to_string())];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let response = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&query)
            .timeout(self.config.timeout + Duration::from_secs(self.config.long_poll_secs))
            .send()
            .await
            .map_err(BotApiError::from_reqwest)?;

        let updates: Vec<serde_json::Value> =
            Self::read_envelope(response).await?.unwrap_or_default();
        Ok(parse_updates(updates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::messenger::RawUpdate;

    #[test]
    fn debug_redacts_token() {
        let config = BotConfig::new("123456:secret-token");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn method_url_tolerates_trailing_slash() {
        let mut config = BotConfig::new("T");
        config.api_url = "http://localhost:8081/".to_string();
        let client = BotClient::new(config).unwrap();
        assert_eq!(
            client.method_url("getUpdates"),
            "http://localhost:8081/botT/getUpdates"
        );
    }

    #[test]
    fn error_envelope_parses() {
        let envelope: Envelope<serde_json::Value> = serde_json::from_str(
            r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#,
        )
        .unwrap();
        assert!(!envelope.ok);
        assert_eq!(envelope.error_code, Some(403));
        assert!(envelope.result.is_none());
    }

    #[test]
    fn update_batch_envelope_parses() {
        let envelope: Envelope<Vec<RawUpdate>> = serde_json::from_str(
            r#"{"ok":true,"result":[
                {"update_id":41,"message":{"message_id":1,"chat":{"id":777},"text":"/start"}},
                {"update_id":42}
            ]}"#,
        )
        .unwrap();
        assert!(envelope.ok);
        let updates: Vec<Update> = envelope
            .result
            .unwrap()
            .into_iter()
            .map(Update::from)
            .collect();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].message.as_ref().unwrap().text, "/start");
        assert_eq!(updates[1].message, None);
    }

    #[test]
    fn success_envelope_without_result_parses() {
        let envelope: Envelope<Vec<serde_json::Value>> =
            serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(envelope.ok);
        assert!(envelope.result.is_none());
    }
}
