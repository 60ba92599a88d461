//! In-process hosted-store adapter
//!
//! Keeps rows as `serde_json::Value` in the same loose camelCase shape the
//! hosted store serves, including its quirks (assignee lists arriving as a
//! bare string or number, missing optional fields). Fetches normalize rows
//! into domain types; everything downstream sees one canonical shape.
//!
//! Mutations notify the [`ChangeHub`] for the touched table, driving the
//! same refresh path a production realtime feed would. Failure injection
//! flags let tests exercise rollback without a network.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use opsboard_core::{AttendanceRepository, EventStore, RosterRepository};
use opsboard_domain::{
    CalendarEvent, ClockTime, EventDraft, EventPatch, OpsBoardError, PunchRecord,
    RawEventRecord, Result, Role, RosterMember, StoreTable,
};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Roster row as served: camelCase keys, sparse optional fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRosterRow {
    id: Value,
    name: String,
    #[serde(default)]
    department: String,
    #[serde(default)]
    position: String,
    #[serde(default)]
    username: String,
    #[serde(default = "default_role")]
    role: Role,
    #[serde(default = "default_show")]
    show: bool,
}

fn default_role() -> Role {
    Role::Member
}

const fn default_show() -> bool {
    true
}

impl RawRosterRow {
    fn normalize(self) -> Option<RosterMember> {
        Some(RosterMember {
            id: coerce_id(self.id)?,
            name: self.name,
            department: self.department,
            position: self.position,
            username: self.username,
            role: self.role,
            show: self.show,
        })
    }
}

/// Punch row as served; `userId` may be a string or a number.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPunchRow {
    user_id: Value,
    date: NaiveDate,
    time: ClockTime,
}

impl RawPunchRow {
    fn normalize(self) -> Option<PunchRecord> {
        Some(PunchRecord { user_id: coerce_id(self.user_id)?, date: self.date, time: self.time })
    }
}

fn coerce_id(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// In-process store holding loosely-typed JSON rows per table.
pub struct MemoryStore {
    tz: Tz,
    hub: super::ChangeHub,
    events: Mutex<Vec<Value>>,
    roster: Mutex<Vec<Value>>,
    punches: Mutex<Vec<Value>>,
    fail_next_fetch: AtomicBool,
    fail_next_mutation: AtomicBool,
}

impl MemoryStore {
    pub fn new(tz: Tz, hub: super::ChangeHub) -> Self {
        Self {
            tz,
            hub,
            events: Mutex::new(Vec::new()),
            roster: Mutex::new(Vec::new()),
            punches: Mutex::new(Vec::new()),
            fail_next_fetch: AtomicBool::new(false),
            fail_next_mutation: AtomicBool::new(false),
        }
    }

    /// Replace the event rows wholesale, as a remote sync would.
    pub fn seed_events(&self, rows: Vec<Value>) {
        *self.events.lock() = rows;
        self.hub.notify(StoreTable::Events);
    }

    pub fn seed_roster(&self, rows: Vec<Value>) {
        *self.roster.lock() = rows;
    }

    pub fn seed_punches(&self, rows: Vec<Value>) {
        *self.punches.lock() = rows;
        self.hub.notify(StoreTable::Attendance);
    }

    /// Make the next read fail with a `RemoteFetch` error.
    pub fn fail_next_fetch(&self) {
        self.fail_next_fetch.store(true, Ordering::SeqCst);
    }

    /// Make the next write fail with a `RemoteMutation` error.
    pub fn fail_next_mutation(&self) {
        self.fail_next_mutation.store(true, Ordering::SeqCst);
    }

    fn check_fetch(&self) -> Result<()> {
        if self.fail_next_fetch.swap(false, Ordering::SeqCst) {
            return Err(OpsBoardError::RemoteFetch("simulated read failure".into()));
        }
        Ok(())
    }

    fn check_mutation(&self) -> Result<()> {
        if self.fail_next_mutation.swap(false, Ordering::SeqCst) {
            return Err(OpsBoardError::RemoteMutation("simulated write failure".into()));
        }
        Ok(())
    }

    fn parse_event_row(&self, row: Value) -> Option<CalendarEvent> {
        match serde_json::from_value::<RawEventRecord>(row) {
            Ok(raw) => Some(raw.normalize(self.tz)),
            Err(e) => {
                // Malformed rows are dropped, not fatal; the store is not
                // under our schema control.
                warn!(error = %e, "skipping malformed event row");
                None
            }
        }
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn fetch_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        self.check_fetch()?;
        let rows = self.events.lock().clone();
        Ok(rows
            .into_iter()
            .filter_map(|row| self.parse_event_row(row))
            .filter(|e| e.start_time < end && start <= e.end_time)
            .collect())
    }

    async fn insert(&self, draft: EventDraft) -> Result<CalendarEvent> {
        self.check_mutation()?;
        let event = draft.into_event(self.tz)?;
        let row = serde_json::to_value(&event)
            .map_err(|e| OpsBoardError::Internal(format!("event row encoding failed: {e}")))?;
        self.events.lock().push(row);
        self.hub.notify(StoreTable::Events);
        Ok(event)
    }

    async fn update(&self, id: &str, patch: EventPatch) -> Result<CalendarEvent> {
        self.check_mutation()?;
        let updated_row = {
            let mut rows = self.events.lock();
            let row = rows
                .iter_mut()
                .find(|row| row.get("id").and_then(Value::as_str) == Some(id))
                .ok_or_else(|| OpsBoardError::NotFound(format!("event {id}")))?;

            let patch_value = serde_json::to_value(&patch)
                .map_err(|e| OpsBoardError::Internal(format!("patch encoding failed: {e}")))?;
            if let (Value::Object(target), Value::Object(fields)) = (&mut *row, patch_value) {
                for (key, value) in fields {
                    target.insert(key, value);
                }
            }
            row.clone()
        };
        self.hub.notify(StoreTable::Events);
        self.parse_event_row(updated_row)
            .ok_or_else(|| OpsBoardError::Internal(format!("event {id} row became unreadable")))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check_mutation()?;
        {
            let mut rows = self.events.lock();
            let before = rows.len();
            rows.retain(|row| row.get("id").and_then(Value::as_str) != Some(id));
            if rows.len() == before {
                return Err(OpsBoardError::NotFound(format!("event {id}")));
            }
        }
        self.hub.notify(StoreTable::Events);
        Ok(())
    }
}

#[async_trait]
impl RosterRepository for MemoryStore {
    async fn fetch_roster(&self) -> Result<Vec<RosterMember>> {
        self.check_fetch()?;
        let rows = self.roster.lock().clone();
        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<RawRosterRow>(row) {
                Ok(raw) => raw.normalize(),
                Err(e) => {
                    warn!(error = %e, "skipping malformed roster row");
                    None
                }
            })
            .collect())
    }
}

#[async_trait]
impl AttendanceRepository for MemoryStore {
    async fn fetch_punches(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PunchRecord>> {
        self.check_fetch()?;
        let rows = self.punches.lock().clone();
        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<RawPunchRow>(row) {
                Ok(raw) => raw.normalize(),
                Err(e) => {
                    warn!(error = %e, "skipping malformed punch row");
                    None
                }
            })
            .filter(|p| start <= p.date && p.date <= end)
            .collect())
    }
}
