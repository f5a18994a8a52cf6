//! reqwest-based ServiceDesk Plus client.
//!
//! Lists requests through `GET /api/v3/requests?input_data=...`, following
//! `list_info.has_more_rows` across pages.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::{Client, header};
use serde_json::json;
use tracing::{debug, instrument, warn};

use super::error::SourceError;
use super::raw::{RawPage, RawTicket, parse_page};
use super::source::{TicketFilter, TicketSource};

pub const DEFAULT_SDP_URL: &str = "https://sd.sadykhan.kz/api/v3/requests";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_PAGES: u32 = 10;
pub const DEFAULT_SDP_TIMEOUT_SECS: u64 = 30;

/// The media type ServiceDesk Plus v3 expects in `Accept`.
const SDP_ACCEPT: &str = "application/vnd.manageengine.sdp.v3+json";

/// Connection settings for the helpdesk API.
#[derive(Clone, PartialEq, Eq)]
pub struct SdpConfig {
    /// Full URL of the requests endpoint.
    pub url: String,
    pub api_key: String,
    /// Records requested per page (`list_info.row_count`).
    pub page_size: u32,
    /// Upper bound on pages read in one fetch.
    pub max_pages: u32,
    pub timeout: Duration,
}

impl fmt::Debug for SdpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdpConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SdpConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        SdpConfig {
            url: DEFAULT_SDP_URL.to_string(),
            api_key: api_key.into(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            timeout: Duration::from_secs(DEFAULT_SDP_TIMEOUT_SECS),
        }
    }
}

/// A ServiceDesk Plus client bound to one requests endpoint.
#[derive(Clone)]
pub struct SdpClient {
    config: SdpConfig,
    client: Client,
}

impl SdpClient {
    /// Builds a client with the auth token installed as a default header.
    pub fn new(config: SdpConfig) -> Result<Self, SourceError> {
        let mut headers = header::HeaderMap::new();
        let token = header::HeaderValue::from_str(config.api_key.trim()).map_err(|e| {
            SourceError::permanent_without_source(format!("API key is not a valid header: {e}"))
        })?;
        headers.insert("authtoken", token);
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(SDP_ACCEPT));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(SourceError::from_reqwest)?;

        Ok(SdpClient { config, client })
    }

    pub fn config(&self) -> &SdpConfig {
        &self.config
    }

    async fn fetch_page(
        &self,
        filter: TicketFilter,
        start_index: u32,
    ) -> Result<RawPage, SourceError> {
        let input_data = input_data(filter, start_index, self.config.page_size);
        let response = self
            .client
            .get(&self.config.url)
            .query(&[("input_data", input_data)])
            .send()
            .await
            .map_err(SourceError::from_reqwest)?;

        let status = response.status();
        let body = response.bytes().await.map_err(SourceError::from_reqwest)?;

        if !status.is_success() {
            return Err(SourceError::from_status(
                status.as_u16(),
                &String::from_utf8_lossy(&body),
            ));
        }

        parse_page(&body).map_err(SourceError::malformed)
    }
}

impl fmt::Debug for SdpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TicketSource for SdpClient {
    #[instrument(skip(self))]
    async fn fetch(&self, filter: TicketFilter) -> Result<Vec<RawTicket>, SourceError> {
        collect_pages(self.config.page_size, self.config.max_pages, |start| {
            self.fetch_page(filter, start)
        })
        .await
    }
}

/// Serializes the `input_data` query parameter for one page.
pub fn input_data(filter: TicketFilter, start_index: u32, row_count: u32) -> String {
    let mut list_info = json!({
        "row_count": row_count,
        "start_index": start_index,
        "sort_field": "created_time",
        "sort_order": "desc",
        "get_total_count": false,
    });
    if let Some(criteria) = filter.search_criteria() {
        list_info["search_criteria"] = criteria;
    }
    json!({ "list_info": list_info }).to_string()
}

/// Reads pages until the listing is exhausted.
///
/// `fetch_page` receives the 1-based start index of each page. Reading stops
/// when a page says there are no more rows, when it returns fewer records than
/// requested, or after `max_pages` pages. Any page error fails the whole call.
pub async fn collect_pages<F, Fut>(
    page_size: u32,
    max_pages: u32,
    mut fetch_page: F,
) -> Result<Vec<RawTicket>, SourceError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<RawPage, SourceError>>,
{
    let page_size = page_size.max(1);
    let mut tickets = Vec::new();
    let mut start_index = 1;

    for page_number in 0..max_pages.max(1) {
        let page = fetch_page(start_index).await?;
        let short_page = page.record_count < page_size as usize;
        debug!(
            page = page_number,
            start_index,
            records = page.record_count,
            has_more_rows = page.has_more_rows,
            "Fetched request page"
        );
        tickets.extend(page.tickets);

        if !page.has_more_rows || short_page {
            return Ok(tickets);
        }
        let Some(next) = start_index.checked_add(page_size) else {
            warn!(start_index, page_size, "Stopped paging at the index limit");
            return Ok(tickets);
        };
        start_index = next;
    }

    debug!(max_pages, "Stopped paging at page limit");
    Ok(tickets)
}
