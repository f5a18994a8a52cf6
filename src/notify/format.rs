//! Notification text formatting.
//!
//! Every message is Telegram HTML (`parse_mode: "HTML"`), so any value that
//! comes from the helpdesk is escaped before interpolation.

use std::borrow::Cow;
use std::fmt::Write as _;

use chrono::TimeDelta;

use crate::diff::{DerivedMetric, FieldChange, TrackedField};
use crate::types::{TicketId, TicketSnapshot};

/// Telegram's maximum message length, in characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// The default deep link into the helpdesk web UI.
pub const DEFAULT_LINK_TEMPLATE: &str =
    "https://sd.sadykhan.kz/WorkOrder.do?woMode=viewWO&woID={id}&PORTALID=1";

/// Reply sent when the recent-tickets list is empty.
pub const NO_RECENT_TICKETS: &str = "За последний час заявок не найдено.";

const RECENT_HEADER: &str = "Заявки за последний час:";

/// Longest helpdesk value rendered verbatim. Five changed fields with both
/// sides at this length still fit in one message.
const MAX_FIELD_CHARS: usize = 300;

/// A URL template with an `{id}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTemplate(String);

impl Default for LinkTemplate {
    fn default() -> Self {
        LinkTemplate(DEFAULT_LINK_TEMPLATE.to_string())
    }
}

impl LinkTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        LinkTemplate(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitutes every `{id}` with the ticket id. The result is not escaped.
    pub fn render(&self, id: &TicketId) -> String {
        self.0.replace("{id}", id.as_str())
    }
}

/// Builds notification and reply texts.
#[derive(Debug, Clone, Default)]
pub struct MessageFormatter {
    link: LinkTemplate,
}

impl MessageFormatter {
    pub fn new(link: LinkTemplate) -> Self {
        MessageFormatter { link }
    }

    /// Formats the notification for a ticket seen for the first time.
    ///
    /// The creation line is left out when the helpdesk gave no display value.
    pub fn format_new(&self, ticket: &TicketSnapshot) -> String {
        let mut out = format!(
            "🆕 <b>Новая заявка #{}</b>\n",
            escape_html(ticket.id.as_str())
        );
        for field in TrackedField::ALL {
            let value = field.value(ticket);
            if value.trim().is_empty() {
                continue;
            }
            let _ = writeln!(
                out,
                "{} <b>{}:</b> {}",
                field_icon(field),
                field_label(field),
                field_text(value)
            );
        }
        out.push_str(&self.link_line(&ticket.id));
        out
    }

    /// Formats the notification for a ticket whose tracked fields changed.
    pub fn format_changed(
        &self,
        id: &TicketId,
        changes: &[FieldChange],
        metrics: &[DerivedMetric],
    ) -> String {
        let mut out = format!(
            "✏️ <b>Изменения по заявке #{}</b>\n",
            escape_html(id.as_str())
        );
        for change in changes {
            let _ = writeln!(
                out,
                "{}: {} → {}",
                field_label(change.field),
                field_text(&change.old),
                field_text(&change.new)
            );
        }
        for metric in metrics {
            let (label, duration) = match metric {
                DerivedMetric::ReactionTime(d) => ("⏱ Время реакции", d),
                DerivedMetric::ResolutionTime(d) => ("✅ Время решения", d),
            };
            let _ = writeln!(out, "{}: {}", label, format_duration(*duration));
        }
        out.push_str(&self.link_line(id));
        out
    }

    /// Formats the reply listing recently created tickets.
    ///
    /// Lines that would push the message past [`TELEGRAM_MESSAGE_LIMIT`] are
    /// dropped and replaced by a count.
    pub fn format_recent_list(&self, tickets: &[TicketSnapshot]) -> String {
        if tickets.is_empty() {
            return NO_RECENT_TICKETS.to_string();
        }

        let mut out = RECENT_HEADER.to_string();
        let mut used = out.chars().count();
        for (index, ticket) in tickets.iter().enumerate() {
            let line = recent_line(ticket);
            let line_len = line.chars().count() + 1;
            let remaining = tickets.len() - index;
            let overflow = format!("\n… и ещё {}", remaining);
            let fits = if remaining == 1 {
                used + line_len <= TELEGRAM_MESSAGE_LIMIT
            } else {
                used + line_len + overflow.chars().count() <= TELEGRAM_MESSAGE_LIMIT
            };
            if !fits {
                out.push_str(&overflow);
                return out;
            }
            out.push('\n');
            out.push_str(&line);
            used += line_len;
        }
        out
    }

    fn link_line(&self, id: &TicketId) -> String {
        format!(
            "🔗 <a href=\"{}\">Открыть заявку</a>",
            escape_html(&self.link.render(id))
        )
    }
}

fn recent_line(ticket: &TicketSnapshot) -> String {
    format!(
        "🔹 #{} | {} | {} | {} | {} | {}",
        escape_html(ticket.id.as_str()),
        field_text(&ticket.subject),
        field_text(&ticket.requester_name),
        field_text(&ticket.technician_name),
        field_text(&ticket.status_name),
        field_text(&ticket.created_display),
    )
}

/// Escapes a helpdesk value, cutting it to [`MAX_FIELD_CHARS`] first.
fn field_text(value: &str) -> String {
    escape_html(&clip(value, MAX_FIELD_CHARS))
}

/// Shortens `value` to at most `max` characters, ending in `…` when cut.
fn clip(value: &str, max: usize) -> Cow<'_, str> {
    match value.char_indices().nth(max) {
        None => Cow::Borrowed(value),
        Some(_) => {
            let keep: String = value.chars().take(max.saturating_sub(1)).collect();
            Cow::Owned(format!("{keep}…"))
        }
    }
}

fn field_label(field: TrackedField) -> &'static str {
    match field {
        TrackedField::Subject => "Тема",
        TrackedField::Requester => "Автор",
        TrackedField::Technician => "Назначено",
        TrackedField::Status => "Статус",
        TrackedField::CreatedTime => "Дата создания",
    }
}

fn field_icon(field: TrackedField) -> &'static str {
    match field {
        TrackedField::Subject => "📌",
        TrackedField::Requester => "👤",
        TrackedField::Technician => "🔧",
        TrackedField::Status => "⚙️",
        TrackedField::CreatedTime => "📅",
    }
}

/// Escapes text for Telegram HTML.
///
/// Covers the three characters Telegram requires plus `"`, so the result is
/// also safe inside a double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders a duration as `1 д 2 ч 3 мин`.
///
/// Leading zero units are omitted and minutes are always shown. Durations
/// under a minute render in seconds. Negative durations render as zero.
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    if total < 60 {
        return format!("{} сек", total);
    }

    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{} д", days));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{} ч", hours));
    }
    parts.push(format!("{} мин", minutes));
    parts.join(" ")
}
