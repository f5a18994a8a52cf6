//! Newtype wrappers for external identifiers.
//!
//! Ticket ids come from ServiceDesk Plus and chat ids from Telegram. Keeping them
//! as distinct types prevents passing one where the other is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ServiceDesk Plus request id.
///
/// The API returns ids as strings; they are stable for the life of a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub String);

impl TicketId {
    pub fn new(s: impl Into<String>) -> Self {
        TicketId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TicketId {
    fn from(s: String) -> Self {
        TicketId(s)
    }
}

impl From<&str> for TicketId {
    fn from(s: &str) -> Self {
        TicketId(s.to_string())
    }
}

/// A Telegram chat id.
///
/// Private chats have positive ids, groups and channels negative ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(n: i64) -> Self {
        ChatId(n)
    }
}
