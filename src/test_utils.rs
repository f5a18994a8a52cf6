//! Shared test utilities: fixtures, arbitrary generators for property-based
//! testing, and in-memory fakes for the two external APIs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use proptest::prelude::*;

use crate::sdp::{RawNamed, RawTicket, RawTime, SourceError, TicketFilter, TicketSource};
use crate::telegram::{BotApiError, BotErrorKind, IncomingMessage, Messenger, Update};
use crate::types::{ChatId, TicketId, TicketSnapshot, UNASSIGNED_TECHNICIAN};

/// Creation instant of every fixture ticket.
pub const FIXTURE_CREATED_SECS: i64 = 1_700_000_000;

/// `created_display` matching [`FIXTURE_CREATED_SECS`] in the helpdesk's format.
pub const FIXTURE_CREATED_DISPLAY: &str = "14/11/2023 10:13 PM";

pub const FIXTURE_REQUESTER: &str = "Асель Нурланова";

/// Converts epoch seconds to a UTC instant.
pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

/// An open, unassigned ticket created at [`FIXTURE_CREATED_SECS`].
///
/// Equal to `normalize(&raw_ticket(id, subject))`.
pub fn open_ticket(id: &str, subject: &str) -> TicketSnapshot {
    TicketSnapshot {
        id: TicketId::new(id),
        subject: subject.to_string(),
        requester_name: FIXTURE_REQUESTER.to_string(),
        technician_name: UNASSIGNED_TECHNICIAN.to_string(),
        status_name: "Open".to_string(),
        created_at: Some(at(FIXTURE_CREATED_SECS)),
        created_display: FIXTURE_CREATED_DISPLAY.to_string(),
        assigned_at: None,
        resolved_at: None,
        completed_at: None,
    }
}

/// The raw API record for [`open_ticket`].
pub fn raw_ticket(id: &str, subject: &str) -> RawTicket {
    RawTicket {
        id: Some(id.to_string()),
        subject: Some(subject.to_string()),
        requester: Some(named(FIXTURE_REQUESTER)),
        technician: None,
        status: Some(named("Open")),
        created_time: Some(RawTime {
            value: Some(FIXTURE_CREATED_SECS * 1000),
            display_value: Some(FIXTURE_CREATED_DISPLAY.to_string()),
        }),
        assigned_time: None,
        resolved_time: None,
        completed_time: None,
    }
}

pub fn named(name: &str) -> RawNamed {
    RawNamed {
        name: Some(name.to_string()),
    }
}

pub fn raw_time_secs(secs: i64) -> RawTime {
    RawTime {
        value: Some(secs * 1000),
        display_value: None,
    }
}

// ─── Generators ───

fn arb_instant() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    prop::option::of((1_600_000_000i64..1_800_000_000).prop_map(at))
}

/// Snapshots of one ticket id drawn from small value pools, so that two
/// independent draws often agree on some fields and differ on others.
pub fn arb_snapshot(id: &str) -> impl Strategy<Value = TicketSnapshot> {
    let id = TicketId::new(id);
    (
        prop_oneof![
            Just("Printer down".to_string()),
            Just("VPN".to_string()),
            "[a-zA-Z ]{0,12}"
        ],
        prop_oneof![Just(FIXTURE_REQUESTER), Just("Болат")],
        prop_oneof![
            Just(UNASSIGNED_TECHNICIAN),
            Just(""),
            Just("Серик"),
            Just("Айгуль")
        ],
        prop_oneof![
            Just("Open"),
            Just("In Progress"),
            Just("Resolved"),
            Just("Closed"),
            Just("closed"),
            Just("Закрыта")
        ],
        arb_instant(),
        prop_oneof![Just(""), Just(FIXTURE_CREATED_DISPLAY), Just("01/01/2024 09:00 AM")],
        arb_instant(),
        arb_instant(),
        arb_instant(),
    )
        .prop_map(
            move |(
                subject,
                requester,
                technician,
                status,
                created_at,
                created_display,
                assigned_at,
                resolved_at,
                completed_at,
            )| TicketSnapshot {
                id: id.clone(),
                subject,
                requester_name: requester.to_string(),
                technician_name: technician.to_string(),
                status_name: status.to_string(),
                created_at,
                created_display: created_display.to_string(),
                assigned_at,
                resolved_at,
                completed_at,
            },
        )
}

// ─── Fakes ───

#[derive(Default)]
struct MockSourceInner {
    responses: VecDeque<Result<Vec<RawTicket>, SourceError>>,
    filters: Vec<TicketFilter>,
}

/// A [`TicketSource`] that replays queued responses in order.
///
/// Returns an empty listing once the queue is drained. Every filter it is
/// called with is recorded.
#[derive(Clone, Default)]
pub struct MockTicketSource {
    inner: Arc<Mutex<MockSourceInner>>,
}

impl MockTicketSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, tickets: Vec<RawTicket>) {
        self.inner.lock().unwrap().responses.push_back(Ok(tickets));
    }

    pub fn push_err(&self, err: SourceError) {
        self.inner.lock().unwrap().responses.push_back(Err(err));
    }

    pub fn filters(&self) -> Vec<TicketFilter> {
        self.inner.lock().unwrap().filters.clone()
    }
}

impl TicketSource for MockTicketSource {
    async fn fetch(&self, filter: TicketFilter) -> Result<Vec<RawTicket>, SourceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.filters.push(filter);
        inner.responses.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Default)]
struct RecordingInner {
    sent: Vec<(ChatId, String)>,
    failing: Vec<(ChatId, BotErrorKind)>,
    updates: VecDeque<Result<Vec<Update>, BotApiError>>,
    offsets: Vec<Option<i64>>,
}

/// A [`Messenger`] that records sends and replays queued updates.
///
/// Sends to chats registered with [`fail_chat`](Self::fail_chat) fail with
/// the given kind and are not recorded.
#[derive(Clone, Default)]
pub struct RecordingMessenger {
    inner: Arc<Mutex<RecordingInner>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_chat(&self, chat: ChatId, kind: BotErrorKind) {
        self.inner.lock().unwrap().failing.push((chat, kind));
    }

    /// Queues a `getUpdates` result containing one text message per entry.
    pub fn push_messages(&self, messages: &[(i64, i64, &str)]) {
        let updates = messages
            .iter()
            .map(|&(update_id, chat, text)| Update {
                update_id,
                message: Some(IncomingMessage {
                    chat_id: ChatId(chat),
                    text: text.to_string(),
                }),
            })
            .collect();
        self.push_updates(Ok(updates));
    }

    pub fn push_updates(&self, result: Result<Vec<Update>, BotApiError>) {
        self.inner.lock().unwrap().updates.push_back(result);
    }

    /// All successful sends, in order.
    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.inner.lock().unwrap().sent.clone()
    }

    pub fn sent_to(&self, chat: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(c, _)| *c == chat)
            .map(|(_, text)| text)
            .collect()
    }

    /// Offsets passed to each `get_updates` call.
    pub fn offsets(&self) -> Vec<Option<i64>> {
        self.inner.lock().unwrap().offsets.clone()
    }
}

impl Messenger for RecordingMessenger {
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<(), BotApiError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some((_, kind)) = inner.failing.iter().find(|(c, _)| *c == chat) {
            return Err(match kind {
                BotErrorKind::RecipientUnreachable => {
                    BotApiError::unreachable_without_source("Forbidden: bot was blocked by the user")
                }
                BotErrorKind::Transient => BotApiError::transient_without_source("timed out"),
                BotErrorKind::Permanent => {
                    BotApiError::permanent_without_source("Bad Request: can't parse entities")
                }
            });
        }
        inner.sent.push((chat, text.to_string()));
        Ok(())
    }

    async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, BotApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.offsets.push(offset);
        inner.updates.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdp::normalize;

    #[test]
    fn raw_fixture_normalizes_to_snapshot_fixture() {
        assert_eq!(
            normalize(&raw_ticket("100", "Printer down")),
            open_ticket("100", "Printer down")
        );
    }
}
