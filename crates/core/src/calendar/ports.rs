//! Port interfaces for the calendar store and its change feed

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opsboard_domain::{CalendarEvent, EventDraft, EventPatch, Result, StoreTable};

/// Callback invoked when a watched store table reports a change.
pub type ChangeListener = std::sync::Arc<dyn Fn() + Send + Sync>;

/// Trait for the hosted event store.
///
/// Implementations translate these calls into remote requests. `fetch_range`
/// is also the reconciliation primitive: after any settled mutation the
/// reconciler re-fetches the watched range rather than patching its view
/// from the mutation result.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Fetch events overlapping `start <= event.end && event.start < end`.
    async fn fetch_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>>;

    /// Persist a new event; returns the stored form.
    async fn insert(&self, draft: EventDraft) -> Result<CalendarEvent>;

    /// Apply a partial update to the event with `id`.
    async fn update(&self, id: &str, patch: EventPatch) -> Result<CalendarEvent>;

    /// Remove the event with `id`.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Trait for subscribing to store change notifications.
///
/// The returned [`SubscriptionHandle`] unregisters the listener when
/// dropped, so a subscriber cannot leak its callback past its own lifetime.
pub trait ChangeFeed: Send + Sync {
    /// Register `listener` for changes on `table`.
    fn subscribe(&self, table: StoreTable, listener: ChangeListener) -> SubscriptionHandle;
}

/// RAII guard for a change-feed subscription.
///
/// Dropping the handle tears the subscription down exactly once.
pub struct SubscriptionHandle {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    /// Build a handle around a teardown closure.
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self { teardown: Some(Box::new(teardown)) }
    }

    /// A handle with no teardown, for tests and no-op feeds.
    #[must_use]
    pub fn noop() -> Self {
        Self { teardown: None }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("active", &self.teardown.is_some())
            .finish()
    }
}
