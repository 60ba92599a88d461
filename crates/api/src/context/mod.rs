//! Application context - dependency injection container

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use opsboard_core::{CalendarReconciler, ChangeFeed, EventStore, RosterRepository, SubscriptionHandle};
use opsboard_domain::{Config, OpsBoardError, Result, RosterMember, StoreTable};
use opsboard_infra::{ChangeHub, MemoryStore};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Application context - holds all services and dependencies.
///
/// Owns the refresh worker that reacts to store change notifications by
/// re-fetching the reconciler's watched range. The worker and the change
/// subscriptions live exactly as long as the context; [`AppContext::shutdown`]
/// stops the worker and is safe to call more than once.
pub struct AppContext {
    pub config: Config,
    pub tz: Tz,
    pub store: Arc<MemoryStore>,
    pub hub: ChangeHub,
    pub reconciler: Arc<CalendarReconciler>,

    shutdown_token: CancellationToken,
    refresh_worker: Mutex<Option<JoinHandle<()>>>,
    shut_down: AtomicBool,

    // Keep the change-feed subscriptions alive for the context's lifetime;
    // dropping them unregisters the listeners.
    _subscriptions: Vec<SubscriptionHandle>,
}

impl AppContext {
    /// Create a new application context with configuration from the loader.
    pub fn new() -> Result<Self> {
        Self::with_config(opsboard_infra::config::load()?)
    }

    /// Create a new application context with custom configuration.
    ///
    /// Primarily for tests, which pass a fixed config instead of reading the
    /// environment.
    pub fn with_config(config: Config) -> Result<Self> {
        let tz = config.tz()?;
        let hub = ChangeHub::new();
        let store = Arc::new(MemoryStore::new(tz, hub.clone()));
        let reconciler =
            Arc::new(CalendarReconciler::new(store.clone() as Arc<dyn EventStore>, tz));

        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let subscriptions = subscribe_refresh_tables(&hub, &refresh_tx);

        let shutdown_token = CancellationToken::new();
        let worker =
            spawn_refresh_worker(reconciler.clone(), refresh_rx, shutdown_token.clone());

        info!(timezone = %config.timezone, "application context initialized");
        Ok(Self {
            config,
            tz,
            store,
            hub,
            reconciler,
            shutdown_token,
            refresh_worker: Mutex::new(Some(worker)),
            shut_down: AtomicBool::new(false),
            _subscriptions: subscriptions,
        })
    }

    /// Today's date in the configured local time zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    /// Resolve a roster member by id.
    ///
    /// # Errors
    /// `OpsBoardError::NotFound` for an id absent from the roster.
    pub async fn member(&self, user_id: &str) -> Result<RosterMember> {
        let roster = self.store.fetch_roster().await?;
        roster
            .into_iter()
            .find(|m| m.id == user_id)
            .ok_or_else(|| OpsBoardError::NotFound(format!("roster member {user_id}")))
    }

    /// Check the health of the context's components.
    pub async fn health_check(&self) -> HealthStatus {
        let mut status = HealthStatus::new();

        status = match self.config.tz() {
            Ok(_) => status.add_component(ComponentHealth::healthy("config")),
            Err(e) => status.add_component(ComponentHealth::unhealthy("config", e.to_string())),
        };

        status = match self.store.fetch_roster().await {
            Ok(_) => status.add_component(ComponentHealth::healthy("store")),
            Err(e) => status.add_component(ComponentHealth::unhealthy("store", e.to_string())),
        };

        let worker_alive = self
            .refresh_worker
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished());
        status = if worker_alive {
            status.add_component(ComponentHealth::healthy("refresh_worker"))
        } else {
            status.add_component(ComponentHealth::unhealthy("refresh_worker", "not running"))
        };

        status.calculate_score();
        status
    }

    /// Stop the refresh worker. Idempotent.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shutdown_token.cancel();
        let worker = self.refresh_worker.lock().take();
        if let Some(handle) = worker {
            if let Err(e) = handle.await {
                warn!(error = %e, "refresh worker did not stop cleanly");
            }
        }
        info!("application context shut down");
    }
}

fn subscribe_refresh_tables(
    hub: &ChangeHub,
    refresh_tx: &mpsc::UnboundedSender<StoreTable>,
) -> Vec<SubscriptionHandle> {
    // The calendar view re-fetches on event and task changes; attendance and
    // notification tables are polled per command instead.
    [StoreTable::Events, StoreTable::Tasks]
        .into_iter()
        .map(|table| {
            let tx = refresh_tx.clone();
            hub.subscribe(
                table,
                Arc::new(move || {
                    // The worker may already be gone during shutdown.
                    let _ = tx.send(table);
                }),
            )
        })
        .collect()
}

fn spawn_refresh_worker(
    reconciler: Arc<CalendarReconciler>,
    mut refresh_rx: mpsc::UnboundedReceiver<StoreTable>,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = token.cancelled() => break,
                changed = refresh_rx.recv() => {
                    let Some(table) = changed else { break };
                    // Coalesce bursts: one refresh covers queued notifications.
                    while refresh_rx.try_recv().is_ok() {}
                    if let Err(e) = reconciler.refresh().await {
                        warn!(table = table.as_str(), error = %e, "view refresh failed");
                    }
                }
            }
        }
    })
}
