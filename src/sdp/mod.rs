//! ServiceDesk Plus ticket source.
//!
//! Fetches request listings from the helpdesk REST API and turns each record
//! into a [`crate::types::TicketSnapshot`].
//!
//! Key behaviours:
//! - Pages are followed via `list_info.has_more_rows` and concatenated
//! - A failure on any page fails the whole fetch (no partial batches)
//! - Malformed individual records are skipped, not fatal
//! - All defaulting of missing fields happens in [`normalize`]

mod client;
mod error;
mod normalize;
mod raw;
mod source;

pub use client::{
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_SDP_TIMEOUT_SECS, DEFAULT_SDP_URL, SdpClient,
    SdpConfig, collect_pages, input_data,
};
pub use error::{SourceError, SourceErrorKind};
pub use normalize::normalize;
pub use raw::{RawNamed, RawPage, RawTicket, RawTime, parse_page};
pub use source::{CLOSED_STATUS, TicketFilter, TicketSource, fetch_snapshots};
