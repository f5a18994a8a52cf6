//! The ticket source abstraction.
//!
//! The poll loop and the command listener depend on [`TicketSource`] rather
//! than on the HTTP client, so tests can feed them canned batches.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tracing::warn;

use crate::types::TicketSnapshot;

use super::error::SourceError;
use super::normalize::normalize;
use super::raw::RawTicket;

/// Status name the helpdesk uses for its terminal state.
pub const CLOSED_STATUS: &str = "Closed";

/// Which tickets to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketFilter {
    /// Everything the listing returns.
    All,
    /// Tickets whose status is not [`CLOSED_STATUS`].
    NotClosed,
    /// Tickets modified after the given instant.
    ModifiedSince(DateTime<Utc>),
    /// Tickets created after the given instant.
    CreatedSince(DateTime<Utc>),
}

impl TicketFilter {
    /// The `list_info.search_criteria` object for this filter, if any.
    pub fn search_criteria(&self) -> Option<Value> {
        match self {
            TicketFilter::All => None,
            TicketFilter::NotClosed => Some(json!({
                "field": "status.name",
                "condition": "is not",
                "value": CLOSED_STATUS,
            })),
            TicketFilter::ModifiedSince(t) => Some(json!({
                "field": "last_updated_time",
                "condition": "greater than",
                "value": t.timestamp_millis().to_string(),
            })),
            TicketFilter::CreatedSince(t) => Some(json!({
                "field": "created_time",
                "condition": "greater than",
                "value": t.timestamp_millis().to_string(),
            })),
        }
    }
}

/// Fetches raw ticket records.
///
/// Implementations must return either the complete result or an error, never a
/// partial batch.
pub trait TicketSource {
    fn fetch(
        &self,
        filter: TicketFilter,
    ) -> impl Future<Output = Result<Vec<RawTicket>, SourceError>> + Send;
}

/// Fetches and normalizes in one step.
///
/// Records without an id are dropped: they cannot be told apart from one
/// another, so they cannot be tracked.
pub async fn fetch_snapshots<S>(
    source: &S,
    filter: TicketFilter,
) -> Result<Vec<TicketSnapshot>, SourceError>
where
    S: TicketSource + Sync,
{
    let raw = source.fetch(filter).await?;
    let mut skipped = 0usize;
    let snapshots = raw
        .iter()
        .filter(|ticket| {
            let has_id = ticket.id.as_deref().is_some_and(|id| !id.trim().is_empty());
            if !has_id {
                skipped += 1;
            }
            has_id
        })
        .map(normalize)
        .collect();
    if skipped > 0 {
        warn!(skipped, ?filter, "Dropped request records without an id");
    }
    Ok(snapshots)
}
