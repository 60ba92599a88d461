//! Attendance aggregation
//!
//! Turns raw punches plus a roster into per-member monthly statistics and
//! today's per-day status. Pure computation over already-fetched data; the
//! port traits in [`ports`] define where that data comes from.

pub mod aggregator;
pub mod ports;

pub use aggregator::aggregate_month;
