//! Per-table change notifications
//!
//! The hosted store pushes coarse change events per table; subscribers react
//! by re-fetching, not by applying deltas. This hub mirrors that model
//! in-process: `notify` fans out to every listener registered for a table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use opsboard_core::{ChangeFeed, ChangeListener, SubscriptionHandle};
use opsboard_domain::StoreTable;
use parking_lot::Mutex;
use tracing::debug;

#[derive(Default)]
struct Registry {
    listeners: Mutex<HashMap<StoreTable, HashMap<u64, ChangeListener>>>,
    next_id: AtomicU64,
}

/// Fan-out hub for store change notifications.
///
/// Subscriptions are owned by their [`SubscriptionHandle`]: dropping the
/// handle removes the listener, so no callback outlives its subscriber.
#[derive(Clone, Default)]
pub struct ChangeHub {
    registry: Arc<Registry>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify every listener registered for `table`.
    ///
    /// Listeners run synchronously on the caller's thread; they are expected
    /// to do no more than schedule a refresh.
    pub fn notify(&self, table: StoreTable) {
        let listeners: Vec<ChangeListener> = {
            let registry = self.registry.listeners.lock();
            registry.get(&table).map(|l| l.values().cloned().collect()).unwrap_or_default()
        };
        debug!(table = table.as_str(), count = listeners.len(), "store change notification");
        for listener in listeners {
            listener();
        }
    }

    /// Number of live subscriptions for `table`.
    pub fn subscriber_count(&self, table: StoreTable) -> usize {
        self.registry.listeners.lock().get(&table).map_or(0, HashMap::len)
    }
}

impl ChangeFeed for ChangeHub {
    fn subscribe(&self, table: StoreTable, listener: ChangeListener) -> SubscriptionHandle {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.listeners.lock().entry(table).or_default().insert(id, listener);

        // Weak: a leaked handle must not keep the hub alive.
        let registry: Weak<Registry> = Arc::downgrade(&self.registry);
        SubscriptionHandle::new(move || {
            if let Some(registry) = registry.upgrade() {
                if let Some(listeners) = registry.listeners.lock().get_mut(&table) {
                    listeners.remove(&id);
                }
            }
        })
    }
}
