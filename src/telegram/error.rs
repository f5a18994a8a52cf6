//! Telegram Bot API error types.
//!
//! The distinction that matters to the relay is whether a failed send means
//! the recipient is gone for good:
//!
//! - **RecipientUnreachable**: the user blocked the bot, deleted their account,
//!   or the chat no longer exists. The chat is unsubscribed.
//! - **Transient**: timeouts, connection errors, 429 and 5xx. Logged; the next
//!   notification is the retry.
//! - **Permanent**: any other rejection (bad token, malformed markup).

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotErrorKind {
    RecipientUnreachable,
    Transient,
    Permanent,
}

impl BotErrorKind {
    /// Returns true if the recipient should be removed from the registry.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, BotErrorKind::RecipientUnreachable)
    }
}

/// An error from the Bot API.
#[derive(Debug, Error)]
pub struct BotApiError {
    pub kind: BotErrorKind,

    /// HTTP status or the API's `error_code`.
    pub status_code: Option<u16>,

    /// The API's `description`, or the transport error text.
    pub message: String,

    #[source]
    pub source: Option<reqwest::Error>,
}

impl fmt::Display for BotApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "Telegram API error ({}): {}", code, self.message),
            None => write!(f, "Telegram API error: {}", self.message),
        }
    }
}

impl BotApiError {
    /// Categorizes a transport-level reqwest error.
    ///
    /// The request URL is stripped because it embeds the bot token.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let status_code = err.status().map(|s| s.as_u16());
        let kind = match status_code {
            Some(code) => kind_for_response(code, ""),
            None if err.is_decode() => BotErrorKind::Permanent,
            None => BotErrorKind::Transient,
        };
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }

    /// Builds an error from an `{"ok": false}` response.
    pub fn from_response(status: u16, description: impl Into<String>) -> Self {
        let message = description.into();
        Self {
            kind: kind_for_response(status, &message),
            status_code: Some(status),
            message,
            source: None,
        }
    }

    pub fn unreachable_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: BotErrorKind::RecipientUnreachable,
            status_code: Some(403),
            message: message.into(),
            source: None,
        }
    }

    pub fn transient_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: BotErrorKind::Transient,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn permanent_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: BotErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }
}

/// Classifies an API rejection by status code and description.
///
/// 403 always means the bot may no longer write to the chat ("bot was blocked
/// by the user", "user is deactivated", "bot was kicked"). A 400 is only
/// treated the same way when the description says the chat is gone.
fn kind_for_response(code: u16, description: &str) -> BotErrorKind {
    match code {
        403 => BotErrorKind::RecipientUnreachable,
        400 if is_gone_chat_message(description) => BotErrorKind::RecipientUnreachable,
        429 => BotErrorKind::Transient,
        500..=599 => BotErrorKind::Transient,
        _ => BotErrorKind::Permanent,
    }
}

fn is_gone_chat_message(description: &str) -> bool {
    let description = description.to_lowercase();
    description.contains("chat not found")
        || description.contains("user is deactivated")
        || description.contains("peer_id_invalid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_is_unreachable() {
        let err = BotApiError::from_response(403, "Forbidden: bot was blocked by the user");
        assert!(err.kind.is_unreachable());
    }

    #[test]
    fn chat_not_found_is_unreachable() {
        let err = BotApiError::from_response(400, "Bad Request: chat not found");
        assert_eq!(err.kind, BotErrorKind::RecipientUnreachable);
    }

    #[test]
    fn other_bad_requests_are_permanent() {
        let err = BotApiError::from_response(400, "Bad Request: can't parse entities");
        assert_eq!(err.kind, BotErrorKind::Permanent);
    }

    #[test]
    fn rate_limit_and_server_errors_are_transient() {
        assert_eq!(
            BotApiError::from_response(429, "Too Many Requests: retry after 5").kind,
            BotErrorKind::Transient
        );
        assert_eq!(
            BotApiError::from_response(502, "Bad Gateway").kind,
            BotErrorKind::Transient
        );
    }

    #[test]
    fn display_includes_code() {
        let err = BotApiError::from_response(401, "Unauthorized");
        assert_eq!(err.to_string(), "Telegram API error (401): Unauthorized");
    }
}
