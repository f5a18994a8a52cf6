//! The chat command listener.
//!
//! Long-polls the Bot API for updates and handles subscription commands.
//! The offset is advanced past every received update, including ones without
//! a text message, so nothing is processed twice.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::commands::{Command, parse_command};
use crate::notify::{MessageFormatter, Notifier};
use crate::sdp::{TicketFilter, TicketSource, fetch_snapshots};
use crate::telegram::{BotApiError, Messenger, Update};
use crate::types::ChatId;

use super::clock::{Clock, SystemClock};

pub const SUBSCRIBED_REPLY: &str = "✅ Подписка активна.";
pub const UNSUBSCRIBED_REPLY: &str = "❌ Подписка отключена.";
pub const HELP_REPLY: &str = "Используйте /start, /stop или /recent.";
pub const RECENT_UNAVAILABLE_REPLY: &str =
    "⚠️ Не удалось получить список заявок. Попробуйте позже.";

const DEFAULT_ERROR_BACKOFF_SECS: u64 = 5;
const DEFAULT_IDLE_SECS: u64 = 2;
const DEFAULT_RECENT_WINDOW_MINS: i64 = 60;

/// Configuration for the command listener.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Pause after a failed `getUpdates`. Default: 5 seconds.
    pub error_backoff: Duration,

    /// Pause after a successful `getUpdates`. Default: 2 seconds.
    pub idle: Duration,

    /// How far back `/recent` looks. Default: 60 minutes. Configure via
    /// `RECENT_WINDOW_MINS`.
    pub recent_window: TimeDelta,

    /// The bot's username, for recognizing `/cmd@botname` in group chats.
    pub bot_name: Option<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerConfig {
    pub fn new() -> Self {
        ListenerConfig {
            error_backoff: Duration::from_secs(DEFAULT_ERROR_BACKOFF_SECS),
            idle: Duration::from_secs(DEFAULT_IDLE_SECS),
            recent_window: TimeDelta::minutes(DEFAULT_RECENT_WINDOW_MINS),
            bot_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerPhase {
    Idle,
    Receiving,
    DispatchingCommand,
}

impl fmt::Display for ListenerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListenerPhase::Idle => "idle",
            ListenerPhase::Receiving => "receiving",
            ListenerPhase::DispatchingCommand => "dispatching-command",
        };
        f.write_str(name)
    }
}

/// Receives chat commands and maintains the subscriber registry.
pub struct CommandListener<S, M, C = SystemClock> {
    source: S,
    notifier: Notifier<M>,
    formatter: MessageFormatter,
    clock: C,
    config: ListenerConfig,
    offset: Option<i64>,
    phase: ListenerPhase,
}

impl<S, M, C> CommandListener<S, M, C>
where
    S: TicketSource + Send + Sync,
    M: Messenger + Send + Sync,
    C: Clock,
{
    pub fn new(
        source: S,
        notifier: Notifier<M>,
        formatter: MessageFormatter,
        clock: C,
        config: ListenerConfig,
    ) -> Self {
        CommandListener {
            source,
            notifier,
            formatter,
            clock,
            config,
            offset: None,
            phase: ListenerPhase::Idle,
        }
    }

    /// The next `getUpdates` offset: one past the last update seen.
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    fn set_phase(&mut self, phase: ListenerPhase) {
        trace!(from = %self.phase, to = %phase, "Listener phase");
        self.phase = phase;
    }

    /// Receives one batch of updates and handles each in order.
    ///
    /// Returns the number of updates received.
    pub async fn receive_once(&mut self) -> Result<usize, BotApiError> {
        self.set_phase(ListenerPhase::Receiving);
        let updates = self.notifier.messenger().get_updates(self.offset).await;
        let updates = match updates {
            Ok(updates) => updates,
            Err(e) => {
                self.set_phase(ListenerPhase::Idle);
                return Err(e);
            }
        };

        let count = updates.len();
        for update in updates {
            self.offset = Some(match self.offset {
                Some(offset) => offset.max(update.update_id + 1),
                None => update.update_id + 1,
            });
            self.set_phase(ListenerPhase::DispatchingCommand);
            self.handle_update(update).await;
        }
        self.set_phase(ListenerPhase::Idle);
        Ok(count)
    }

    async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            trace!(update_id = update.update_id, "Skipping update without message");
            return;
        };

        let Some(command) = parse_command(&message.text, self.config.bot_name.as_deref()) else {
            trace!(update_id = update.update_id, "Command addressed to another bot");
            return;
        };

        debug!(
            chat_id = %message.chat_id,
            command = command.name(),
            "Handling command"
        );
        self.handle_command(message.chat_id, command).await;
    }

    /// Applies a command for one chat and sends the replies.
    ///
    /// Reply failures are logged by the notifier and otherwise ignored.
    pub async fn handle_command(&self, chat: ChatId, command: Command) {
        let registry = self.notifier.registry();
        match command {
            Command::Subscribe => {
                registry.subscribe(chat).await;
                if self.notifier.send(chat, SUBSCRIBED_REPLY).await.is_ok() {
                    self.reply_recent(chat).await;
                }
            }
            Command::Unsubscribe => {
                registry.unsubscribe(chat).await;
                let _ = self.notifier.send(chat, UNSUBSCRIBED_REPLY).await;
            }
            Command::Recent => self.reply_recent(chat).await,
            Command::Help => {
                let _ = self.notifier.send(chat, HELP_REPLY).await;
            }
        }
    }

    async fn reply_recent(&self, chat: ChatId) {
        let since = self
            .clock
            .now()
            .checked_sub_signed(self.config.recent_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let text = match fetch_snapshots(&self.source, TicketFilter::CreatedSince(since)).await {
            Ok(tickets) => self.formatter.format_recent_list(&tickets),
            Err(e) => {
                warn!(error = %e, "Recent tickets unavailable");
                RECENT_UNAVAILABLE_REPLY.to_string()
            }
        };
        let _ = self.notifier.send(chat, &text).await;
    }

    /// Receives and handles updates until `shutdown` is cancelled.
    #[instrument(skip_all)]
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(bot_name = ?self.config.bot_name, "Command listener started");

        loop {
            let result = tokio::select! {
                _ = shutdown.cancelled() => break,
                result = self.receive_once() => result,
            };
            let pause = match result {
                Ok(_) => self.config.idle,
                Err(e) => {
                    warn!(error = %e, "Failed to receive updates");
                    self.config.error_backoff
                }
            };

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        info!("Shutdown signal received, command listener stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = ListenerConfig::new();
        assert_eq!(config.error_backoff, Duration::from_secs(5));
        assert_eq!(config.idle, Duration::from_secs(2));
        assert_eq!(config.recent_window, TimeDelta::hours(1));
        assert!(config.bot_name.is_none());
    }

    #[test]
    fn phases_display() {
        assert_eq!(
            ListenerPhase::DispatchingCommand.to_string(),
            "dispatching-command"
        );
    }
}
