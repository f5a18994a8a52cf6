//! Notification texts and their delivery to subscribers.

mod dispatch;
mod format;

pub use dispatch::{BroadcastReport, Notifier};
pub use format::{
    DEFAULT_LINK_TEMPLATE, LinkTemplate, MessageFormatter, NO_RECENT_TICKETS,
    TELEGRAM_MESSAGE_LIMIT, escape_html, format_duration,
};
