//! Ticket classification.
//!
//! Compares a freshly fetched snapshot with the stored one and decides whether
//! the ticket is new, unchanged, or changed (and in which fields).

use chrono::{DateTime, Utc};

use crate::types::TicketSnapshot;

use super::metrics::{DerivedMetric, reaction_time, resolution_time};

/// Status names treated as terminal by default.
pub const DEFAULT_CLOSED_STATUSES: &[&str] = &["Closed", "Закрыта"];

/// A field compared between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedField {
    Subject,
    Requester,
    Technician,
    Status,
    /// The creation time as displayed by the helpdesk.
    CreatedTime,
}

impl TrackedField {
    /// Comparison order, which is also the order of lines in a notification.
    pub const ALL: [TrackedField; 5] = [
        TrackedField::Subject,
        TrackedField::Requester,
        TrackedField::Technician,
        TrackedField::Status,
        TrackedField::CreatedTime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TrackedField::Subject => "subject",
            TrackedField::Requester => "requester",
            TrackedField::Technician => "technician",
            TrackedField::Status => "status",
            TrackedField::CreatedTime => "created_time",
        }
    }

    pub fn value<'a>(&self, ticket: &'a TicketSnapshot) -> &'a str {
        match self {
            TrackedField::Subject => &ticket.subject,
            TrackedField::Requester => &ticket.requester_name,
            TrackedField::Technician => &ticket.technician_name,
            TrackedField::Status => &ticket.status_name,
            TrackedField::CreatedTime => &ticket.created_display,
        }
    }
}

/// One changed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: TrackedField,
    pub old: String,
    pub new: String,
}

/// The verdict for one ticket in one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// First observation of this ticket id.
    New,

    /// Every tracked field matches the stored snapshot.
    Unchanged,

    /// At least one tracked field differs.
    Changed {
        /// Non-empty, in [`TrackedField::ALL`] order.
        changes: Vec<FieldChange>,
        metrics: Vec<DerivedMetric>,
        /// The snapshot to store: incoming values with fill-only timestamps
        /// and the original creation instant preserved.
        merged: TicketSnapshot,
    },
}

impl Classification {
    /// Returns true if this classification produces a notification.
    pub fn is_notable(&self) -> bool {
        !matches!(self, Classification::Unchanged)
    }
}

/// Stateless comparison rules.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    closed_statuses: Vec<String>,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CLOSED_STATUSES.iter().copied())
    }
}

impl DiffEngine {
    pub fn new<S: Into<String>>(closed_statuses: impl IntoIterator<Item = S>) -> Self {
        DiffEngine {
            closed_statuses: closed_statuses.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `status` is one of the terminal statuses (case-insensitive).
    pub fn is_closed(&self, status: &str) -> bool {
        let status = status.trim().to_lowercase();
        self.closed_statuses
            .iter()
            .any(|closed| closed.to_lowercase() == status)
    }

    /// Classifies `incoming` against the stored snapshot.
    ///
    /// `now` stands in for missing assignment or completion timestamps when
    /// computing durations. The result depends only on the arguments.
    pub fn classify(
        &self,
        incoming: &TicketSnapshot,
        previous: Option<&TicketSnapshot>,
        now: DateTime<Utc>,
    ) -> Classification {
        let Some(previous) = previous else {
            return Classification::New;
        };

        let changes = diff_fields(previous, incoming);
        if changes.is_empty() {
            return Classification::Unchanged;
        }

        let merged = merge(previous, incoming);
        let mut metrics = Vec::new();

        if previous.is_unassigned()
            && !incoming.is_unassigned()
            && let Some(d) = reaction_time(&merged, now)
        {
            metrics.push(DerivedMetric::ReactionTime(d));
        }

        if !self.is_closed(&previous.status_name)
            && self.is_closed(&incoming.status_name)
            && let Some(d) = resolution_time(&merged, now)
        {
            metrics.push(DerivedMetric::ResolutionTime(d));
        }

        Classification::Changed {
            changes,
            metrics,
            merged,
        }
    }
}

/// Lists tracked fields whose values differ, in [`TrackedField::ALL`] order.
pub fn diff_fields(previous: &TicketSnapshot, incoming: &TicketSnapshot) -> Vec<FieldChange> {
    TrackedField::ALL
        .iter()
        .filter_map(|field| {
            let old = field.value(previous);
            let new = field.value(incoming);
            (old != new).then(|| FieldChange {
                field: *field,
                old: old.to_string(),
                new: new.to_string(),
            })
        })
        .collect()
}

/// Combines a stored snapshot with a newer observation.
///
/// Text fields come from `incoming`. The creation instant keeps the stored
/// value once known, and lifecycle timestamps are never cleared.
pub fn merge(previous: &TicketSnapshot, incoming: &TicketSnapshot) -> TicketSnapshot {
    TicketSnapshot {
        created_at: previous.created_at.or(incoming.created_at),
        assigned_at: incoming.assigned_at.or(previous.assigned_at),
        resolved_at: incoming.resolved_at.or(previous.resolved_at),
        completed_at: incoming.completed_at.or(previous.completed_at),
        ..incoming.clone()
    }
}
