//! HTTP server for the relay.
//!
//! The relay does its work in background loops; the server only exists so
//! that hosting platforms can probe liveness, plus one read-only status view.
//!
//! # Endpoints
//!
//! - `GET /` - Returns "SDP Bot is running!"
//! - `GET /health` - Returns 200 if server is running
//! - `GET /api/v1/status` - Returns subscriber and ticket counts as JSON

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::store::SnapshotStore;
use crate::subscribers::SubscriberRegistry;

pub mod health;
pub mod status;

pub use health::{ROOT_BODY, health_handler, root_handler};
pub use status::{RelayStatus, status_handler};

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor. It holds
/// handles to the same store and registry the loops use.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: SnapshotStore,
    registry: SubscriberRegistry,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: SnapshotStore,
        registry: SubscriberRegistry,
        started_at: DateTime<Utc>,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                store,
                registry,
                started_at,
            }),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.inner.store
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.inner.registry
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::get;

    axum::Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/v1/status", get(status_handler))
        .with_state(app_state)
}
