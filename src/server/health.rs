//! Liveness endpoints.
//!
//! Both return 200 while the process is up. They say nothing about whether
//! the helpdesk or the Bot API are reachable.

use axum::http::StatusCode;

/// The text served at `/`.
pub const ROOT_BODY: &str = "SDP Bot is running!";

/// Root handler, kept for hosting platforms that probe `/`.
pub async fn root_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, ROOT_BODY)
}

/// Health check handler.
///
/// # Example
///
/// ```ignore
/// GET /health HTTP/1.1
///
/// HTTP/1.1 200 OK
/// Content-Type: text/plain
///
/// OK
/// ```
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
