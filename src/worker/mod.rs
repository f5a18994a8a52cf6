//! The two long-running tasks of the relay.
//!
//! - [`PollLoop`]: polls the helpdesk every interval, diffs against the
//!   snapshot store, and broadcasts notifications
//! - [`CommandListener`]: long-polls the Bot API for chat commands and keeps
//!   the subscriber registry current
//!
//! Both share the [`crate::store::SnapshotStore`] and
//! [`crate::subscribers::SubscriberRegistry`] handles they are built with, and
//! both stop when the shared `CancellationToken` is cancelled.
//!
//! # Module Structure
//!
//! - [`clock`]: injectable "now" for duration metrics
//! - [`poll`]: the poll loop and its configuration
//! - [`listener`]: the command listener and its replies

mod clock;
mod listener;
mod poll;


pub use clock::{Clock, FixedClock, SystemClock};
pub use listener::{
    CommandListener, HELP_REPLY, ListenerConfig, ListenerPhase, RECENT_UNAVAILABLE_REPLY,
    SUBSCRIBED_REPLY, UNSUBSCRIBED_REPLY,
};
pub use poll::{CycleReport, DEFAULT_POLL_INTERVAL_SECS, PollConfig, PollLoop, PollPhase};
