//! Status inspection endpoint for observability.
//!
//! Provides a read-only summary of the relay's in-memory state.

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;

/// Response body of `GET /api/v1/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayStatus {
    pub started_at: DateTime<Utc>,
    pub subscribers: usize,
    pub tracked_tickets: usize,
}

/// Status handler.
///
/// # Example
///
/// ```ignore
/// GET /api/v1/status HTTP/1.1
///
/// HTTP/1.1 200 OK
/// Content-Type: application/json
///
/// {"started_at":"2025-03-12T06:00:00Z","subscribers":4,"tracked_tickets":312}
/// ```
pub async fn status_handler(State(app_state): State<AppState>) -> Json<RelayStatus> {
    Json(RelayStatus {
        started_at: app_state.started_at(),
        subscribers: app_state.registry().len().await,
        tracked_tickets: app_state.store().len().await,
    })
}
