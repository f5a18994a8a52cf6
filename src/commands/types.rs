//! Command types for chat commands sent to the bot.

use serde::{Deserialize, Serialize};

/// A parsed chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// `/start` or `/subscribe`: add the chat to the subscriber registry and
    /// send the recent-tickets list.
    Subscribe,

    /// `/stop` or `/unsubscribe`: remove the chat from the registry.
    Unsubscribe,

    /// `/recent` or `/last`: list tickets created within the recent window.
    Recent,

    /// Anything else, including empty and non-text messages.
    Help,
}

impl Command {
    /// Returns the canonical command word, without the leading slash.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Subscribe => "start",
            Command::Unsubscribe => "stop",
            Command::Recent => "recent",
            Command::Help => "help",
        }
    }
}
