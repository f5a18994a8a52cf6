//! Process configuration from environment variables.
//!
//! Everything is read and validated once at startup, before any task is
//! spawned. A missing credential or an unparsable number is fatal.
//!
//! | Variable | Default |
//! |---|---|
//! | `BOT_TOKEN` | required |
//! | `SDP_API_KEY` | required |
//! | `SDP_URL` | `https://sd.sadykhan.kz/api/v3/requests` |
//! | `CHECK_INTERVAL` | 60 (seconds) |
//! | `PORT` | 5000 |
//! | `SDP_PAGE_SIZE` | 100 |
//! | `SDP_MAX_PAGES` | 10 |
//! | `SDP_TIMEOUT_SECS` | 30 |
//! | `TELEGRAM_TIMEOUT_SECS` | 10 |
//! | `TELEGRAM_API_URL` | `https://api.telegram.org` |
//! | `TICKET_LINK_TEMPLATE` | helpdesk deep link with `{id}` |
//! | `BOOTSTRAP_OPEN_TICKETS` | true |
//! | `RECENT_WINDOW_MINS` | 60 (at most 10080) |
//! | `BOT_USERNAME` | unset |

use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use thiserror::Error;

use crate::notify::{DEFAULT_LINK_TEMPLATE, LinkTemplate};
use crate::sdp::{
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_SDP_TIMEOUT_SECS, DEFAULT_SDP_URL, SdpConfig,
};
use crate::telegram::{BotConfig, DEFAULT_TELEGRAM_API_URL, DEFAULT_TELEGRAM_TIMEOUT_SECS};
use crate::worker::{DEFAULT_POLL_INTERVAL_SECS, ListenerConfig, PollConfig};

pub const DEFAULT_PORT: u16 = 5000;
const DEFAULT_RECENT_WINDOW_MINS: i64 = 60;
/// One week.
const MAX_RECENT_WINDOW_MINS: i64 = 7 * 24 * 60;

/// Errors detected while reading the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable is set but cannot be used.
    #[error("{name}={value:?} is invalid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Validated relay configuration.
///
/// `Debug` output never contains the bot token or the API key.
#[derive(Debug, Clone)]
pub struct Config {
    pub sdp: SdpConfig,
    pub telegram: BotConfig,
    pub poll: PollConfig,
    pub listener: ListenerConfig,
    pub link_template: LinkTemplate,
    pub port: u16,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let bot_token = env.required("BOT_TOKEN")?;
        let api_key = env.required("SDP_API_KEY")?;

        let check_interval: u64 = env.positive("CHECK_INTERVAL", DEFAULT_POLL_INTERVAL_SECS)?;
        let recent_window = env.recent_window()?;

        let sdp = SdpConfig {
            url: env.string("SDP_URL", DEFAULT_SDP_URL),
            api_key,
            page_size: env.positive("SDP_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            max_pages: env.positive("SDP_MAX_PAGES", DEFAULT_MAX_PAGES)?,
            timeout: Duration::from_secs(env.positive("SDP_TIMEOUT_SECS", DEFAULT_SDP_TIMEOUT_SECS)?),
        };

        let telegram = BotConfig {
            api_url: env.string("TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL),
            timeout: Duration::from_secs(
                env.positive("TELEGRAM_TIMEOUT_SECS", DEFAULT_TELEGRAM_TIMEOUT_SECS)?,
            ),
            ..BotConfig::new(bot_token)
        };

        let poll = PollConfig {
            poll_interval: Duration::from_secs(check_interval),
            bootstrap: env.flag("BOOTSTRAP_OPEN_TICKETS", true)?,
        };

        let listener = ListenerConfig {
            recent_window,
            bot_name: env
                .optional("BOT_USERNAME")
                .map(|name| name.trim_start_matches('@').to_string()),
            ..ListenerConfig::new()
        };

        let link_template = env.string("TICKET_LINK_TEMPLATE", DEFAULT_LINK_TEMPLATE);
        if !link_template.contains("{id}") {
            return Err(ConfigError::Invalid {
                name: "TICKET_LINK_TEMPLATE",
                value: link_template,
                reason: "must contain {id}".to_string(),
            });
        }

        Ok(Config {
            sdp,
            telegram,
            poll,
            listener,
            link_template: LinkTemplate::new(link_template),
            port: env.parse("PORT", DEFAULT_PORT)?,
        })
    }
}

/// Typed accessors over a variable lookup. Blank values count as unset.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn string(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
                value,
            }),
        }
    }

    fn positive<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + PartialOrd + Default + ToString,
        T::Err: std::fmt::Display,
    {
        let value = self.parse(name, default)?;
        if value <= T::default() {
            return Err(ConfigError::Invalid {
                name,
                value: value.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    }

    fn recent_window(&self) -> Result<TimeDelta, ConfigError> {
        const NAME: &str = "RECENT_WINDOW_MINS";
        let mins: i64 = self.positive(NAME, DEFAULT_RECENT_WINDOW_MINS)?;
        TimeDelta::try_minutes(mins)
            .filter(|_| mins <= MAX_RECENT_WINDOW_MINS)
            .ok_or_else(|| ConfigError::Invalid {
                name: NAME,
                value: mins.to_string(),
                reason: format!("must be at most {MAX_RECENT_WINDOW_MINS}"),
            })
    }

    fn flag(&self, name: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = self.optional(name) else {
            return Ok(default);
        };
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                name,
                value,
                reason: "expected true or false".to_string(),
            }),
        }
    }
}
