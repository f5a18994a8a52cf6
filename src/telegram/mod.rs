//! Telegram Bot API integration.
//!
//! Only two methods are used: `sendMessage` for notifications and replies, and
//! `getUpdates` for receiving subscription commands.

mod client;
mod error;
mod messenger;

pub use client::{
    BotClient, BotConfig, DEFAULT_LONG_POLL_SECS, DEFAULT_TELEGRAM_API_URL,
    DEFAULT_TELEGRAM_TIMEOUT_SECS,
};
pub use error::{BotApiError, BotErrorKind};
pub use messenger::{IncomingMessage, Messenger, Update};
