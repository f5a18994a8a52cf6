//! Subscriber registry.
//!
//! The set of chats that asked for notifications. Membership is added by the
//! subscribe command and removed by unsubscribe or by a delivery that reports
//! the chat as unreachable. Empty on every start.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::types::ChatId;

/// Shared handle to the subscriber set.
#[derive(Debug, Clone, Default)]
pub struct SubscriberRegistry {
    inner: Arc<RwLock<BTreeSet<ChatId>>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `chat`. Returns true if it was not already subscribed.
    pub async fn subscribe(&self, chat: ChatId) -> bool {
        let added = self.inner.write().await.insert(chat);
        if added {
            info!(chat_id = %chat, "Chat subscribed");
        }
        added
    }

    /// Removes `chat`. Returns true if it was subscribed.
    pub async fn unsubscribe(&self, chat: ChatId) -> bool {
        let removed = self.inner.write().await.remove(&chat);
        if removed {
            info!(chat_id = %chat, "Chat unsubscribed");
        }
        removed
    }

    pub async fn is_subscribed(&self, chat: ChatId) -> bool {
        self.inner.read().await.contains(&chat)
    }

    /// A point-in-time copy of the members.
    ///
    /// Callers iterate the copy, so concurrent subscribe/unsubscribe calls never
    /// wait on a broadcast.
    pub async fn all(&self) -> Vec<ChatId> {
        self.inner.read().await.iter().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
