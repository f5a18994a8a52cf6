//! ServiceDesk Plus API error types.
//!
//! Failures are categorized so the poll loop can log them meaningfully:
//!
//! - **Transient** errors clear up on their own (timeouts, connection resets,
//!   5xx, rate limits). The next scheduled cycle is the retry.
//! - **Permanent** errors need an operator (bad API key, wrong URL, 4xx).
//! - **Malformed** means the response arrived but was not a request list.
//!
//! None of these is fatal: the cycle that hit one becomes a no-op.

use std::fmt;
use thiserror::Error;

/// The kind of ticket source error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Network failure, timeout, HTTP 429 or 5xx.
    Transient,

    /// HTTP 4xx other than 429 (authentication, missing endpoint, bad query).
    Permanent,

    /// The response body was not a JSON request list.
    Malformed,
}

impl SourceErrorKind {
    /// Returns true if waiting for the next cycle is likely to help.
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceErrorKind::Transient)
    }
}

/// An error fetching tickets.
#[derive(Debug, Error)]
pub struct SourceError {
    pub kind: SourceErrorKind,

    /// The HTTP status code, if a response was received.
    pub status_code: Option<u16>,

    pub message: String,

    #[source]
    pub source: Option<reqwest::Error>,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "ServiceDesk API error (HTTP {}): {}", code, self.message),
            None => write!(f, "ServiceDesk API error: {}", self.message),
        }
    }
}

impl SourceError {
    /// Categorizes a transport-level reqwest error.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        let kind = match status_code {
            Some(code) => kind_for_status(code),
            None if err.is_decode() => SourceErrorKind::Malformed,
            // Timeouts, connect failures and anything else without a status.
            None => SourceErrorKind::Transient,
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

    /// Builds an error for a non-2xx response.
    pub fn from_status(status: u16, body: &str) -> Self {
        Self {
            kind: kind_for_status(status),
            status_code: Some(status),
            message: truncate_body(body),
            source: None,
        }
    }

    /// Builds an error for a response body that could not be parsed.
    pub fn malformed(err: serde_json::Error) -> Self {
        Self {
            kind: SourceErrorKind::Malformed,
            status_code: None,
            message: format!("response is not a request list: {}", err),
            source: None,
        }
    }

    pub fn permanent_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn transient_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transient,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }
}

fn kind_for_status(code: u16) -> SourceErrorKind {
    match code {
        429 => SourceErrorKind::Transient,
        500..=599 => SourceErrorKind::Transient,
        _ => SourceErrorKind::Permanent,
    }
}

/// Error bodies from the helpdesk can be whole HTML pages.
fn truncate_body(body: &str) -> String {
    const MAX_LEN: usize = 300;
    let body = body.trim();
    if body.len() <= MAX_LEN {
        return body.to_string();
    }
    let mut end = MAX_LEN;
    while end > 0 && !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
