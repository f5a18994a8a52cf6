//! Derived duration metrics.
//!
//! Reaction time measures creation → assignment, resolution time measures
//! creation → completion. Both are only meaningful on the cycle where the
//! corresponding transition is observed.

use chrono::{DateTime, TimeDelta, Utc};

use crate::types::TicketSnapshot;

/// A duration annotation attached to a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedMetric {
    /// Time from creation until a technician was assigned.
    ReactionTime(TimeDelta),

    /// Time from creation until the ticket was closed.
    ResolutionTime(TimeDelta),
}

impl DerivedMetric {
    pub fn duration(&self) -> TimeDelta {
        match self {
            DerivedMetric::ReactionTime(d) | DerivedMetric::ResolutionTime(d) => *d,
        }
    }
}

/// Reaction time for a ticket that has just been assigned.
///
/// Uses the assignment timestamp when the API reports one, otherwise `now`.
/// Returns `None` when the creation time is unknown or the result would be
/// negative.
pub fn reaction_time(ticket: &TicketSnapshot, now: DateTime<Utc>) -> Option<TimeDelta> {
    let end = ticket.assigned_at.unwrap_or(now);
    elapsed_since_creation(ticket, end)
}

/// Resolution time for a ticket that has just been closed.
///
/// Prefers the completion timestamp, then the resolution timestamp, then `now`.
pub fn resolution_time(ticket: &TicketSnapshot, now: DateTime<Utc>) -> Option<TimeDelta> {
    let end = ticket.completed_at.or(ticket.resolved_at).unwrap_or(now);
    elapsed_since_creation(ticket, end)
}

fn elapsed_since_creation(ticket: &TicketSnapshot, end: DateTime<Utc>) -> Option<TimeDelta> {
    let created = ticket.created_at?;
    let elapsed = end - created;
    (elapsed >= TimeDelta::zero()).then_some(elapsed)
}
