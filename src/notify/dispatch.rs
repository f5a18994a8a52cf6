//! Fan-out of notifications to subscribed chats.

use tracing::{debug, info, instrument, warn};

use crate::subscribers::SubscriberRegistry;
use crate::telegram::{BotApiError, Messenger};
use crate::types::ChatId;

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Chats unsubscribed because they can no longer be reached.
    pub removed: usize,
    /// Sends that failed for any other reason.
    pub failed: usize,
}

/// Sends messages through a [`Messenger`] and prunes unreachable chats from
/// the registry.
#[derive(Debug, Clone)]
pub struct Notifier<M> {
    messenger: M,
    registry: SubscriberRegistry,
}

impl<M: Messenger + Sync> Notifier<M> {
    pub fn new(messenger: M, registry: SubscriberRegistry) -> Self {
        Notifier {
            messenger,
            registry,
        }
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    /// Sends `text` to every current subscriber.
    ///
    /// Each send is independent: one failure does not stop the rest, and
    /// nothing is retried. Never fails as a whole.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn broadcast(&self, text: &str) -> BroadcastReport {
        let recipients = self.registry.all().await;
        let mut report = BroadcastReport::default();

        for chat in recipients {
            match self.send(chat, text).await {
                Ok(()) => report.delivered += 1,
                Err(e) if e.kind.is_unreachable() => report.removed += 1,
                Err(_) => report.failed += 1,
            }
        }

        if report.removed > 0 || report.failed > 0 {
            info!(
                delivered = report.delivered,
                removed = report.removed,
                failed = report.failed,
                "Broadcast finished with failures"
            );
        } else {
            debug!(delivered = report.delivered, "Broadcast finished");
        }
        report
    }

    /// Sends `text` to one chat.
    ///
    /// An unreachable recipient is unsubscribed before the error is returned.
    /// Other failures are logged and returned unchanged.
    pub async fn send(&self, chat: ChatId, text: &str) -> Result<(), BotApiError> {
        match self.messenger.send_message(chat, text).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind.is_unreachable() => {
                warn!(chat_id = %chat, error = %e, "Recipient unreachable, unsubscribing");
                self.registry.unsubscribe(chat).await;
                Err(e)
            }
            Err(e) => {
                warn!(chat_id = %chat, error = %e, "Failed to send message");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::BotErrorKind;
    use crate::test_utils::RecordingMessenger;

    async fn registry_with(chats: &[i64]) -> SubscriberRegistry {
        let registry = SubscriberRegistry::new();
        for &chat in chats {
            registry.subscribe(ChatId(chat)).await;
        }
        registry
    }

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let messenger = RecordingMessenger::new();
        let notifier = Notifier::new(messenger.clone(), registry_with(&[1, 2, 3]).await);

        let report = notifier.broadcast("hello").await;

        assert_eq!(
            report,
            BroadcastReport {
                delivered: 3,
                removed: 0,
                failed: 0
            }
        );
        let mut sent: Vec<_> = messenger.sent().into_iter().map(|(c, _)| c).collect();
        sent.sort();
        assert_eq!(sent, vec![ChatId(1), ChatId(2), ChatId(3)]);
    }

    #[tokio::test]
    async fn blocked_recipient_is_removed_and_others_still_delivered() {
        let messenger = RecordingMessenger::new();
        messenger.fail_chat(ChatId(1), BotErrorKind::RecipientUnreachable);
        let registry = registry_with(&[1, 2]).await;
        let notifier = Notifier::new(messenger.clone(), registry.clone());

        let report = notifier.broadcast("New ticket").await;

        assert_eq!(report.delivered, 1);
        assert_eq!(report.removed, 1);
        assert!(!registry.is_subscribed(ChatId(1)).await);
        assert!(registry.is_subscribed(ChatId(2)).await);
        assert_eq!(messenger.sent_to(ChatId(2)), vec!["New ticket".to_string()]);
    }

    #[tokio::test]
    async fn transient_failure_keeps_subscription() {
        let messenger = RecordingMessenger::new();
        messenger.fail_chat(ChatId(1), BotErrorKind::Transient);
        let registry = registry_with(&[1, 2]).await;
        let notifier = Notifier::new(messenger, registry.clone());

        let report = notifier.broadcast("x").await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 1);
        assert!(registry.is_subscribed(ChatId(1)).await);
    }

    #[tokio::test]
    async fn broadcast_to_nobody_is_empty_report() {
        let notifier = Notifier::new(RecordingMessenger::new(), SubscriberRegistry::new());
        assert_eq!(notifier.broadcast("x").await, BroadcastReport::default());
    }

    #[tokio::test]
    async fn unsubscribed_chat_misses_later_broadcasts() {
        let messenger = RecordingMessenger::new();
        let registry = registry_with(&[1, 2]).await;
        let notifier = Notifier::new(messenger.clone(), registry.clone());

        notifier.broadcast("first").await;
        registry.unsubscribe(ChatId(1)).await;
        notifier.broadcast("second").await;

        assert_eq!(messenger.sent_to(ChatId(1)), vec!["first".to_string()]);
        assert_eq!(
            messenger.sent_to(ChatId(2)),
            vec!["first".to_string(), "second".to_string()]
        );
    }
}
