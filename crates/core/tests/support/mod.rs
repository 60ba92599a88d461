//! Shared test doubles for core integration tests

// Each test target compiles this module; not every target uses every helper.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use opsboard_core::{AttendanceRepository, EventStore, RosterRepository};
use opsboard_domain::{
    CalendarEvent, ClockTime, EventCategory, EventDraft, EventPatch, OpsBoardError, PunchRecord,
    Result, Role, RosterMember,
};
use parking_lot::Mutex;
use tokio::sync::Notify;

pub fn member(id: &str, name: &str, role: Role) -> RosterMember {
    RosterMember {
        id: id.into(),
        name: name.into(),
        department: "Operations".into(),
        position: "Technician".into(),
        username: name.to_lowercase(),
        role,
        show: true,
    }
}

pub fn admin() -> RosterMember {
    member("1", "Admin", Role::Admin)
}

pub fn punch(user_id: &str, date: &str, time: &str) -> PunchRecord {
    PunchRecord {
        user_id: user_id.into(),
        date: date.parse().unwrap(),
        time: ClockTime::parse(time).unwrap(),
    }
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub fn event(id: &str, title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
    CalendarEvent {
        id: id.into(),
        title: title.into(),
        description: None,
        start_time: start,
        end_time: end,
        all_day: false,
        location: None,
        category: EventCategory::Meeting,
        is_done: false,
        client_name: None,
        assigned_user_ids: vec![],
    }
}

/// In-memory roster source.
pub struct MockRosterRepository {
    pub roster: Vec<RosterMember>,
}

#[async_trait]
impl RosterRepository for MockRosterRepository {
    async fn fetch_roster(&self) -> Result<Vec<RosterMember>> {
        Ok(self.roster.clone())
    }
}

/// In-memory punch source.
pub struct MockAttendanceRepository {
    pub punches: Vec<PunchRecord>,
}

#[async_trait]
impl AttendanceRepository for MockAttendanceRepository {
    async fn fetch_punches(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PunchRecord>> {
        Ok(self
            .punches
            .iter()
            .filter(|p| start <= p.date && p.date <= end)
            .cloned()
            .collect())
    }
}

/// Scriptable in-memory event store.
///
/// Failure flags make the next read or write reject; the mutation gate lets
/// a test hold a write in flight while it issues a competing one.
pub struct MockEventStore {
    pub tz: Tz,
    events: Mutex<Vec<CalendarEvent>>,
    fail_next_fetch: AtomicBool,
    fail_next_mutation: AtomicBool,
    hold_mutations: AtomicBool,
    gate: Notify,
    pub fetch_calls: AtomicUsize,
}

impl MockEventStore {
    pub fn new(tz: Tz, seed: Vec<CalendarEvent>) -> Arc<Self> {
        Arc::new(Self {
            tz,
            events: Mutex::new(seed),
            fail_next_fetch: AtomicBool::new(false),
            fail_next_mutation: AtomicBool::new(false),
            hold_mutations: AtomicBool::new(false),
            gate: Notify::new(),
            fetch_calls: AtomicUsize::new(0),
        })
    }

    pub fn fail_next_fetch(&self) {
        self.fail_next_fetch.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_mutation(&self) {
        self.fail_next_mutation.store(true, Ordering::SeqCst);
    }

    /// Make subsequent mutations park until [`Self::release_mutations`].
    pub fn hold_mutations(&self) {
        self.hold_mutations.store(true, Ordering::SeqCst);
    }

    pub fn release_mutations(&self) {
        self.hold_mutations.store(false, Ordering::SeqCst);
        self.gate.notify_waiters();
    }

    pub fn stored_event(&self, id: &str) -> Option<CalendarEvent> {
        self.events.lock().iter().find(|e| e.id == id).cloned()
    }

    async fn before_mutation(&self) -> Result<()> {
        loop {
            // Register interest before re-checking the flag so a release
            // between the check and the await is not lost.
            let released = self.gate.notified();
            if !self.hold_mutations.load(Ordering::SeqCst) {
                break;
            }
            released.await;
        }
        if self.fail_next_mutation.swap(false, Ordering::SeqCst) {
            return Err(OpsBoardError::RemoteMutation("injected write failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for MockEventStore {
    async fn fetch_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_fetch.swap(false, Ordering::SeqCst) {
            return Err(OpsBoardError::RemoteFetch("injected read failure".into()));
        }
        Ok(self
            .events
            .lock()
            .iter()
            .filter(|e| e.start_time < end && start <= e.end_time)
            .cloned()
            .collect())
    }

    async fn insert(&self, draft: EventDraft) -> Result<CalendarEvent> {
        self.before_mutation().await?;
        let stored = draft.into_event(self.tz)?;
        self.events.lock().push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &str, patch: EventPatch) -> Result<CalendarEvent> {
        self.before_mutation().await?;
        let mut events = self.events.lock();
        let event = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| OpsBoardError::NotFound(format!("event {id}")))?;
        patch.apply_to(event);
        Ok(event.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.before_mutation().await?;
        let mut events = self.events.lock();
        let before = events.len();
        events.retain(|e| e.id != id);
        if events.len() == before {
            return Err(OpsBoardError::NotFound(format!("event {id}")));
        }
        Ok(())
    }
}
