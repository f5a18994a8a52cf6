//! In-memory snapshot store.
//!
//! Maps ticket ids to the last observed [`TicketSnapshot`]. Nothing is persisted:
//! a restart begins with an empty store (see the bootstrap load in
//! [`crate::worker::PollLoop`]). Entries are never removed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::types::{TicketId, TicketSnapshot};

/// Shared handle to the snapshot map.
///
/// Cloning yields another handle to the same map.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<HashMap<TicketId, TicketSnapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the stored snapshot for `id`.
    pub async fn get(&self, id: &TicketId) -> Option<TicketSnapshot> {
        self.inner.read().await.get(id).cloned()
    }

    pub async fn contains(&self, id: &TicketId) -> bool {
        self.inner.read().await.contains_key(id)
    }

    /// Stores `snapshot`, replacing any previous entry for the same id.
    ///
    /// Returns the previous entry.
    pub async fn insert(&self, snapshot: TicketSnapshot) -> Option<TicketSnapshot> {
        self.inner
            .write()
            .await
            .insert(snapshot.id.clone(), snapshot)
    }

    /// Stores every snapshot under a single write lock.
    pub async fn insert_all(&self, snapshots: impl IntoIterator<Item = TicketSnapshot>) {
        let mut map = self.inner.write().await;
        for snapshot in snapshots {
            map.insert(snapshot.id.clone(), snapshot);
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
