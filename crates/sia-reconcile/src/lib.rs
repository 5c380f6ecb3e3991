//! Notification reconciliation engine for the scheduling admin console.
//!
//! The append-only notification log contains many overlapping
//! representations of the same real-world fact (who teaches a session,
//! whether a lecturer confirmed, whether a reschedule was approved). This
//! crate collapses a snapshot of that log into one canonical entry per
//! dedup key: classify each event, fold last-write-wins per key, then run
//! a second pass that resolves the unavailable-vs-replacement conflict per
//! (schedule, recipient) slot. Everything here is pure and synchronous;
//! re-running on the same snapshot yields an identical result.

mod classify;
mod fold;
mod key;
mod pipeline;
mod reconcile;
mod status;

pub use classify::classify;
pub use fold::fold;
pub use key::build_key;
pub use pipeline::{paginate, reconcile, KindFilter, ReadFilter, ReconcileFilter};
pub use reconcile::reconcile_replacements;
pub use status::{derive_status, MemoryStatusLookup, NoStatusLookup, StatusLookup};
