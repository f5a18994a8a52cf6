//! The locally cached view of a helpdesk ticket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::TicketId;

/// Technician name used when a ticket has no assignee.
pub const UNASSIGNED_TECHNICIAN: &str = "Не назначен";

/// Subject used when the API omits one.
pub const NO_SUBJECT: &str = "Без темы";

/// Requester name used when the API omits one.
pub const UNKNOWN_REQUESTER: &str = "Неизвестный автор";

/// Status name used when the API omits one.
pub const NO_STATUS: &str = "N/A";

/// Id used for records that arrive without one. Such records are never
/// tracked; [`crate::sdp::fetch_snapshots`] drops them.
pub const UNKNOWN_ID: &str = "???";

/// The tracked state of one ticket at its last observation.
///
/// Built only by [`crate::sdp::normalize`], so every string field is already
/// defaulted and never needs null handling downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSnapshot {
    pub id: TicketId,
    pub subject: String,
    pub requester_name: String,
    /// [`UNASSIGNED_TECHNICIAN`] when nobody is assigned.
    pub technician_name: String,
    pub status_name: String,
    /// Creation instant. Never changes once known.
    pub created_at: Option<DateTime<Utc>>,
    /// Creation time as rendered by the helpdesk (localized).
    pub created_display: String,
    pub assigned_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TicketSnapshot {
    /// Creates a snapshot with default field values for the given id.
    pub fn new(id: impl Into<TicketId>) -> Self {
        TicketSnapshot {
            id: id.into(),
            subject: NO_SUBJECT.to_string(),
            requester_name: UNKNOWN_REQUESTER.to_string(),
            technician_name: UNASSIGNED_TECHNICIAN.to_string(),
            status_name: NO_STATUS.to_string(),
            created_at: None,
            created_display: String::new(),
            assigned_at: None,
            resolved_at: None,
            completed_at: None,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        is_unassigned(&self.technician_name)
    }
}

/// Returns true if the technician name denotes "nobody".
pub fn is_unassigned(technician_name: &str) -> bool {
    let name = technician_name.trim();
    name.is_empty() || name == UNASSIGNED_TECHNICIAN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snapshot_uses_sentinels() {
        let snapshot = TicketSnapshot::new("100");
        assert_eq!(snapshot.id, TicketId::new("100"));
        assert_eq!(snapshot.subject, NO_SUBJECT);
        assert_eq!(snapshot.requester_name, UNKNOWN_REQUESTER);
        assert!(snapshot.is_unassigned());
        assert_eq!(snapshot.status_name, NO_STATUS);
        assert!(snapshot.created_at.is_none());
    }

    #[test]
    fn blank_technician_counts_as_unassigned() {
        assert!(is_unassigned(""));
        assert!(is_unassigned("   "));
        assert!(is_unassigned(UNASSIGNED_TECHNICIAN));
        assert!(!is_unassigned("Иван Петров"));
    }
}
