//! Raw ServiceDesk Plus payload structures.
//!
//! These mirror the `/api/v3/requests` JSON loosely: every field is optional and
//! number/string representations are both accepted, because the API is not
//! consistent across versions. Defaulting to display values happens later, in
//! [`super::normalize`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// One request record as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawTicket {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub requester: Option<RawNamed>,
    #[serde(default)]
    pub technician: Option<RawNamed>,
    #[serde(default)]
    pub status: Option<RawNamed>,
    #[serde(default)]
    pub created_time: Option<RawTime>,
    #[serde(default)]
    pub assigned_time: Option<RawTime>,
    #[serde(default)]
    pub resolved_time: Option<RawTime>,
    #[serde(default)]
    pub completed_time: Option<RawTime>,
}

/// Any sub-object identified by a display name (requester, technician, status).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawNamed {
    #[serde(default)]
    pub name: Option<String>,
}

/// A timestamp as the API renders it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawTime {
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "lenient_millis")]
    pub value: Option<i64>,
    /// Localized rendering, e.g. `"12/03/2025 10:15 AM"`.
    #[serde(default)]
    pub display_value: Option<String>,
}

/// One page of a request listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPage {
    pub tickets: Vec<RawTicket>,
    /// Number of records in the page before per-record parsing.
    pub record_count: usize,
    pub has_more_rows: bool,
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    requests: Vec<Value>,
    #[serde(default)]
    list_info: Option<RawListInfo>,
}

#[derive(Debug, Deserialize)]
struct RawListInfo {
    #[serde(default)]
    has_more_rows: Option<bool>,
}

/// Parses a page envelope.
///
/// The envelope itself must be valid JSON; individual records that fail to
/// deserialize are logged and dropped so one bad record never discards the
/// rest of the batch.
pub fn parse_page(body: &[u8]) -> Result<RawPage, serde_json::Error> {
    let envelope: RawEnvelope = serde_json::from_slice(body)?;
    let record_count = envelope.requests.len();

    let tickets = envelope
        .requests
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<RawTicket>(value) {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed request record");
                None
            }
        })
        .collect();

    Ok(RawPage {
        tickets,
        record_count,
        has_more_rows: envelope
            .list_info
            .and_then(|info| info.has_more_rows)
            .unwrap_or(false),
    })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(Value::Number(n)) => n.as_i64(),
        _ => None,
    })
}
