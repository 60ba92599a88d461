//! Calendar reconciliation
//!
//! Maintains a local view of calendar events over a hosted store. Mutations
//! apply optimistically to the local view, then settle against the store:
//! success keeps the optimistic state, failure rolls back to the snapshot
//! taken before the mutation.

pub mod filter;
pub mod ports;
pub mod reconciler;

pub use filter::EventFilter;
pub use ports::{ChangeFeed, ChangeListener, EventStore, SubscriptionHandle};
pub use reconciler::{CalendarEntry, CalendarReconciler, MutationKind};
