//! Chat command parsing.
//!
//! Users manage their subscription by messaging the bot.
//!
//! # Supported Commands
//!
//! - `/start`, `/subscribe` - Subscribe this chat to ticket notifications
//! - `/stop`, `/unsubscribe` - Unsubscribe this chat
//! - `/recent`, `/last` - List tickets created in the last hour
//!
//! Anything else is answered with a short help text.
//!
//! # Example
//!
//! ```
//! use helpdesk_relay::commands::{parse_command, Command};
//!
//! assert_eq!(parse_command("/start", None), Some(Command::Subscribe));
//! assert_eq!(parse_command("/start@sdp_bot", Some("sdp_bot")), Some(Command::Subscribe));
//! assert_eq!(parse_command("what is this?", Some("sdp_bot")), Some(Command::Help));
//! ```

mod parser;
mod types;

pub use parser::parse_command;
pub use types::Command;
