//! # OpsBoard Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The attendance aggregation pipeline
//! - The calendar reconciler (optimistic mutations with rollback)
//! - Port/adapter interfaces (traits) the infrastructure implements
//!
//! ## Architecture Principles
//! - Only depends on `opsboard-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod attendance;
pub mod calendar;

// Re-export specific items to avoid ambiguity
pub use attendance::aggregator::aggregate_month;
pub use attendance::ports::{AttendanceRepository, RosterRepository};
pub use calendar::filter::EventFilter;
pub use calendar::ports::{ChangeFeed, ChangeListener, EventStore, SubscriptionHandle};
pub use calendar::reconciler::{CalendarEntry, CalendarReconciler, MutationKind};
