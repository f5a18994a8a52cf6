//! Change detection between poll cycles.
//!
//! The engine is pure: given an incoming snapshot, the stored one (if any), and
//! the current time, it produces a [`Classification`]. Writing the store and
//! sending notifications are the poll loop's job.
//!
//! # Rules
//!
//! 1. **First observation is New**, regardless of how old the ticket is.
//! 2. **Tracked fields** are compared by value in a fixed order: subject,
//!    requester, technician, status, created time (display form).
//! 3. **Timestamps are fill-only**: once the store has seen an assignment,
//!    resolution, or completion time it is never replaced by "absent", and the
//!    creation instant never changes.
//! 4. **Metrics** are attached only on the cycle that observes the transition
//!    (unassigned → assigned, open → closed) and only if the creation time is
//!    known.

mod engine;
mod metrics;


pub use engine::{
    Classification, DEFAULT_CLOSED_STATUSES, DiffEngine, FieldChange, TrackedField, diff_fields,
    merge,
};
pub use metrics::{DerivedMetric, reaction_time, resolution_time};
