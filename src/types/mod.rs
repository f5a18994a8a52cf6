//! Core domain types for the relay.

pub mod ids;
pub mod ticket;

pub use ids::{ChatId, TicketId};
pub use ticket::{
    NO_STATUS, NO_SUBJECT, TicketSnapshot, UNASSIGNED_TECHNICIAN, UNKNOWN_ID, UNKNOWN_REQUESTER,
    is_unassigned,
};
