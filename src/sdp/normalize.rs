//! Conversion of raw API records into [`TicketSnapshot`]s.
//!
//! This is the only place where missing or null fields are replaced with
//! display defaults. Everything downstream works with fully populated values.

use chrono::{DateTime, Utc};

use crate::types::{
    NO_STATUS, NO_SUBJECT, TicketId, TicketSnapshot, UNASSIGNED_TECHNICIAN, UNKNOWN_ID,
    UNKNOWN_REQUESTER,
};

use super::raw::{RawNamed, RawTicket, RawTime};

/// Normalizes a raw record. Never fails.
pub fn normalize(raw: &RawTicket) -> TicketSnapshot {
    TicketSnapshot {
        id: TicketId::new(non_blank(raw.id.as_deref()).unwrap_or(UNKNOWN_ID)),
        subject: non_blank(raw.subject.as_deref())
            .unwrap_or(NO_SUBJECT)
            .to_string(),
        requester_name: name_or(raw.requester.as_ref(), UNKNOWN_REQUESTER),
        technician_name: name_or(raw.technician.as_ref(), UNASSIGNED_TECHNICIAN),
        status_name: name_or(raw.status.as_ref(), NO_STATUS),
        created_at: instant(raw.created_time.as_ref()),
        created_display: raw
            .created_time
            .as_ref()
            .and_then(|t| t.display_value.clone())
            .unwrap_or_default(),
        assigned_at: instant(raw.assigned_time.as_ref()),
        resolved_at: instant(raw.resolved_time.as_ref()),
        completed_at: instant(raw.completed_time.as_ref()),
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn name_or(named: Option<&RawNamed>, default: &str) -> String {
    non_blank(named.and_then(|n| n.name.as_deref()))
        .unwrap_or(default)
        .to_string()
}

/// Zero and negative epoch values are how the API says "not set".
fn instant(time: Option<&RawTime>) -> Option<DateTime<Utc>> {
    let millis = time?.value?;
    if millis <= 0 {
        return None;
    }
    DateTime::from_timestamp_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawTicket {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_record_gets_all_defaults() {
        let snapshot = normalize(&RawTicket::default());
        assert_eq!(snapshot.id.as_str(), UNKNOWN_ID);
        assert_eq!(snapshot.subject, NO_SUBJECT);
        assert_eq!(snapshot.requester_name, UNKNOWN_REQUESTER);
        assert_eq!(snapshot.technician_name, UNASSIGNED_TECHNICIAN);
        assert_eq!(snapshot.status_name, NO_STATUS);
        assert_eq!(snapshot.created_display, "");
        assert!(snapshot.created_at.is_none());
    }

    #[test]
    fn null_technician_object_is_unassigned() {
        let snapshot = normalize(&raw(json!({ "id": "100", "technician": null })));
        assert!(snapshot.is_unassigned());
    }

    #[test]
    fn technician_without_name_is_unassigned() {
        let snapshot = normalize(&raw(json!({ "id": "100", "technician": { "id": "7" } })));
        assert_eq!(snapshot.technician_name, UNASSIGNED_TECHNICIAN);
    }

    #[test]
    fn blank_subject_falls_back() {
        let snapshot = normalize(&raw(json!({ "id": "100", "subject": "   " })));
        assert_eq!(snapshot.subject, NO_SUBJECT);
    }

    #[test]
    fn timestamps_are_converted_from_millis() {
        let snapshot = normalize(&raw(json!({
            "id": "100",
            "created_time": { "value": "1700000000000", "display_value": "14/11/2023 10:13 PM" },
            "assigned_time": { "value": "1700000600000" },
            "resolved_time": { "value": "0" },
            "completed_time": { "value": "-1" }
        })));
        assert_eq!(
            snapshot.created_at,
            DateTime::from_timestamp_millis(1_700_000_000_000)
        );
        assert_eq!(
            snapshot.assigned_at,
            DateTime::from_timestamp_millis(1_700_000_600_000)
        );
        assert!(snapshot.resolved_at.is_none());
        assert!(snapshot.completed_at.is_none());
        assert_eq!(snapshot.created_display, "14/11/2023 10:13 PM");
    }

    #[test]
    fn populated_fields_are_kept_verbatim() {
        let snapshot = normalize(&raw(json!({
            "id": "100",
            "subject": "Printer down",
            "requester": { "name": "Алия" },
            "technician": { "name": "Серик" },
            "status": { "name": "Open" }
        })));
        assert_eq!(snapshot.subject, "Printer down");
        assert_eq!(snapshot.requester_name, "Алия");
        assert_eq!(snapshot.technician_name, "Серик");
        assert_eq!(snapshot.status_name, "Open");
    }
}
