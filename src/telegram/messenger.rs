//! The messaging abstraction used by the dispatcher and the command listener.

use std::future::Future;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::types::ChatId;

use super::error::BotApiError;

/// An inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    /// Monotonically increasing per bot.
    pub update_id: i64,
    /// `None` for update kinds the relay does not handle.
    pub message: Option<IncomingMessage>,
}

/// A text message sent to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    /// Empty for stickers, photos and other non-text messages.
    pub text: String,
}

/// Sends messages and receives inbound updates.
///
/// Implemented by [`super::BotClient`] for the real API and by in-memory fakes
/// in tests.
pub trait Messenger {
    /// Sends an HTML-formatted message to one chat.
    fn send_message(
        &self,
        chat: ChatId,
        text: &str,
    ) -> impl Future<Output = Result<(), BotApiError>> + Send;

    /// Retrieves updates with `update_id >= offset`.
    ///
    /// Passing an offset confirms every earlier update, so the API will not
    /// return it again.
    fn get_updates(
        &self,
        offset: Option<i64>,
    ) -> impl Future<Output = Result<Vec<Update>, BotApiError>> + Send;
}

// ─── Wire format ───

#[derive(Debug, Deserialize)]
pub(super) struct RawUpdate {
    update_id: i64,
    #[serde(default)]
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    chat: RawChat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    id: i64,
}

/// Decodes a `getUpdates` result one entry at a time.
///
/// An entry that does not match the expected shape but still carries an
/// `update_id` becomes an update without a message, so the offset moves past
/// it. Entries without an id are dropped.
pub(super) fn parse_updates(values: Vec<Value>) -> Vec<Update> {
    values
        .into_iter()
        .filter_map(|value| {
            let update_id = value.get("update_id").and_then(Value::as_i64);
            match serde_json::from_value::<RawUpdate>(value) {
                Ok(raw) => Some(Update::from(raw)),
                Err(e) => {
                    warn!(?update_id, error = %e, "Skipping malformed update");
                    update_id.map(|update_id| Update {
                        update_id,
                        message: None,
                    })
                }
            }
        })
        .collect()
}

impl From<RawUpdate> for Update {
    fn from(raw: RawUpdate) -> Self {
        Update {
            update_id: raw.update_id,
            message: raw.message.map(|m| IncomingMessage {
                chat_id: ChatId(m.chat.id),
                text: m.text.unwrap_or_default(),
            }),
        }
    }
}
