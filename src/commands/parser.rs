//! Parser for chat command text.
//!
//! A pure function from message text to [`Command`]. Replying and touching the
//! registry are the listener's job.

use super::types::Command;

/// Parses a chat message into a command.
///
/// # Arguments
///
/// * `text` - The message text
/// * `bot_name` - The bot's username without the `@` prefix, if known
///
/// # Parsing Rules
///
/// - Surrounding whitespace is ignored, and only the first word counts
/// - The leading `/` is optional
/// - Command words are case-insensitive
/// - A `@botname` suffix on the command word (`/start@sdp_bot`) is stripped.
///   When `bot_name` is known and the suffix names a different bot, the
///   message is not for us and `None` is returned
/// - Unrecognized or empty text yields [`Command::Help`]
///
/// # Examples
///
/// ```
/// use helpdesk_relay::commands::{parse_command, Command};
///
/// assert_eq!(parse_command("/start", None), Some(Command::Subscribe));
/// assert_eq!(parse_command("  STOP ", None), Some(Command::Unsubscribe));
/// assert_eq!(parse_command("/recent@sdp_bot", Some("sdp_bot")), Some(Command::Recent));
/// assert_eq!(parse_command("/start@other_bot", Some("sdp_bot")), None);
/// assert_eq!(parse_command("hello", None), Some(Command::Help));
/// ```
pub fn parse_command(text: &str, bot_name: Option<&str>) -> Option<Command> {
    let (word, _rest) = split_first_word(text.trim());
    let word = word.strip_prefix('/').unwrap_or(word);

    let word = match word.split_once('@') {
        Some((word, addressee)) => {
            if let Some(bot_name) = bot_name
                && !addressee.eq_ignore_ascii_case(bot_name)
            {
                return None;
            }
            word
        }
        None => word,
    };

    let command = match word.to_lowercase().as_str() {
        "start" | "subscribe" => Command::Subscribe,
        "stop" | "unsubscribe" => Command::Unsubscribe,
        "recent" | "last" => Command::Recent,
        _ => Command::Help,
    };
    Some(command)
}

/// Splits text at the first whitespace, returning (word, rest).
/// If no whitespace, returns (text, "").
fn split_first_word(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(pos) => (&text[..pos], &text[pos..]),
        None => (text, ""),
    }
}
