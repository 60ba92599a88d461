//! Optimistic calendar view reconciliation
//!
//! The reconciler keeps a local copy of the events in a watched time range.
//! Mutations follow one pattern: validate, snapshot, apply locally, send the
//! remote write, then settle. A successful write keeps the optimistic state
//! (the stored form replaces the local guess); a failed write restores the
//! snapshot. At most one mutation may be in flight per event id; a second
//! mutation against the same id is rejected with `Conflict` instead of
//! racing the first.
//!
//! The local view is a disposable cache. The store is the source of truth,
//! and `refresh` (full re-fetch of the watched range) is the reconciliation
//! primitive driven by the change feed.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use opsboard_domain::{
    local_day, CalendarEvent, EventDraft, EventPatch, OpsBoardError, Result, RosterMember,
};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::filter::EventFilter;
use super::ports::EventStore;

/// Kind of mutation in flight for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Move,
    Resize,
    ToggleDone,
    Delete,
}

/// A renderable calendar entry: the event plus its resolved display color.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEntry {
    pub event: CalendarEvent,
    pub color: &'static str,
}

impl From<CalendarEvent> for CalendarEntry {
    fn from(event: CalendarEvent) -> Self {
        let color = event.display_color();
        Self { event, color }
    }
}

/// How to undo an optimistic mutation if the remote write fails.
enum Rollback {
    /// Put the snapshot back in place of the optimistic version.
    Restore(CalendarEvent),
    /// Remove the optimistically inserted event.
    Remove(String),
    /// Re-insert the optimistically deleted event.
    Reinsert(CalendarEvent),
}

struct PendingMutation {
    kind: MutationKind,
    rollback: Rollback,
}

#[derive(Default)]
struct ViewState {
    entries: Vec<CalendarEvent>,
    watched: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pending: HashMap<String, PendingMutation>,
}

/// Local view of a calendar range with optimistic mutations.
pub struct CalendarReconciler {
    store: Arc<dyn EventStore>,
    tz: Tz,
    state: Mutex<ViewState>,
}

impl CalendarReconciler {
    pub fn new(store: Arc<dyn EventStore>, tz: Tz) -> Self {
        Self { store, tz, state: Mutex::new(ViewState::default()) }
    }

    /// Load (or switch to) a watched range, replacing the local view.
    ///
    /// Clears any pending mutation bookkeeping: the fetched rows are the
    /// store's truth, so there is nothing left to roll back to.
    pub async fn load_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<usize> {
        let mut events = self.store.fetch_range(start, end).await?;
        events.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        let count = events.len();

        let mut state = self.state.lock();
        state.entries = events;
        state.watched = Some((start, end));
        state.pending.clear();
        debug!(count, "calendar range loaded");
        Ok(count)
    }

    /// Re-fetch the watched range. No-op when nothing has been loaded yet.
    ///
    /// On fetch failure the prior view stays intact.
    pub async fn refresh(&self) -> Result<()> {
        let watched = self.state.lock().watched;
        if let Some((start, end)) = watched {
            self.load_range(start, end).await?;
        }
        Ok(())
    }

    /// All entries currently in view that pass `filter`, with resolved
    /// colors, ordered by start time.
    pub fn entries(&self, filter: &EventFilter) -> Vec<CalendarEntry> {
        let state = self.state.lock();
        state
            .entries
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .map(CalendarEntry::from)
            .collect()
    }

    /// Entries whose start falls on the local calendar day `day`.
    ///
    /// Day membership is local-day equality of the start in the configured
    /// zone, not UTC dates: a UTC-evening event can belong to the next local
    /// day. Multi-day events appear only in their start-day cell.
    pub fn entries_for_day(&self, day: NaiveDate, filter: &EventFilter) -> Vec<CalendarEntry> {
        let state = self.state.lock();
        state
            .entries
            .iter()
            .filter(|event| local_day(event.start_time, self.tz) == day && filter.matches(event))
            .cloned()
            .map(CalendarEntry::from)
            .collect()
    }

    /// Event ids with a mutation currently awaiting remote confirmation.
    pub fn pending_ids(&self) -> Vec<String> {
        self.state.lock().pending.keys().cloned().collect()
    }

    /// Create an event: validate the draft, show it immediately, persist it.
    ///
    /// On success the optimistic event is replaced by the stored form (the
    /// store may assign its own id); on failure it is removed again.
    pub async fn create_event(&self, actor: &RosterMember, draft: EventDraft) -> Result<String> {
        require_admin(actor, "create events")?;
        let optimistic = draft.clone().into_event(self.tz)?;
        let optimistic_id = optimistic.id.clone();

        {
            let mut state = self.state.lock();
            state.pending.insert(
                optimistic_id.clone(),
                PendingMutation {
                    kind: MutationKind::Create,
                    rollback: Rollback::Remove(optimistic_id.clone()),
                },
            );
            insert_sorted(&mut state.entries, optimistic);
        }

        let outcome = self.store.insert(draft).await;
        match outcome {
            Ok(stored) => {
                let stored_id = stored.id.clone();
                let mut state = self.state.lock();
                state.pending.remove(&optimistic_id);
                state.entries.retain(|e| e.id != optimistic_id);
                insert_sorted(&mut state.entries, stored);
                Ok(stored_id)
            }
            Err(err) => {
                self.settle_failure(&optimistic_id, &err);
                Err(mutation_error(err))
            }
        }
    }

    /// Apply an arbitrary partial edit to an event.
    pub async fn update_event(
        &self,
        actor: &RosterMember,
        id: &str,
        patch: EventPatch,
    ) -> Result<()> {
        require_admin(actor, "edit events")?;
        if let (Some(start), Some(end)) = (patch.start_time, patch.end_time) {
            if end < start {
                return Err(OpsBoardError::Validation(
                    "event end time must not be before its start time".into(),
                ));
            }
        }
        self.patch_event(id, MutationKind::Update, patch).await
    }

    /// Move an event to a new start, preserving its duration.
    pub async fn move_event(
        &self,
        actor: &RosterMember,
        id: &str,
        new_start: DateTime<Utc>,
    ) -> Result<()> {
        require_admin(actor, "move events")?;
        let duration = {
            let state = self.state.lock();
            find_event(&state.entries, id)?.duration()
        };
        let patch = EventPatch {
            start_time: Some(new_start),
            end_time: Some(new_start + duration),
            ..EventPatch::default()
        };
        self.patch_event(id, MutationKind::Move, patch).await
    }

    /// Change an event's end time, keeping the start fixed.
    pub async fn resize_event(
        &self,
        actor: &RosterMember,
        id: &str,
        new_end: DateTime<Utc>,
    ) -> Result<()> {
        require_admin(actor, "resize events")?;
        {
            let state = self.state.lock();
            let event = find_event(&state.entries, id)?;
            if new_end < event.start_time {
                return Err(OpsBoardError::Validation(
                    "event end time must not be before its start time".into(),
                ));
            }
        }
        let patch = EventPatch { end_time: Some(new_end), ..EventPatch::default() };
        self.patch_event(id, MutationKind::Resize, patch).await
    }

    /// Flip an event's done flag.
    ///
    /// The one mutation open to non-admins, and only on events assigned to
    /// them. Touches `is_done` alone; timing fields are never involved.
    pub async fn toggle_done(&self, actor: &RosterMember, id: &str) -> Result<()> {
        let next = {
            let state = self.state.lock();
            let event = find_event(&state.entries, id)?;
            if !actor.is_admin() && !event.is_assigned_to(&actor.id) {
                return Err(OpsBoardError::Forbidden(
                    "only assigned members may change an event's done status".into(),
                ));
            }
            !event.is_done
        };
        let patch = EventPatch { is_done: Some(next), ..EventPatch::default() };
        self.patch_event(id, MutationKind::ToggleDone, patch).await
    }

    /// Delete an event: hide it immediately, then remove it remotely.
    pub async fn delete_event(&self, actor: &RosterMember, id: &str) -> Result<()> {
        require_admin(actor, "delete events")?;
        {
            let mut state = self.state.lock();
            ensure_idle(&state, id)?;
            let snapshot = find_event(&state.entries, id)?.clone();
            state.pending.insert(
                id.to_string(),
                PendingMutation {
                    kind: MutationKind::Delete,
                    rollback: Rollback::Reinsert(snapshot),
                },
            );
            state.entries.retain(|e| e.id != id);
        }

        match self.store.delete(id).await {
            Ok(()) => {
                self.state.lock().pending.remove(id);
                Ok(())
            }
            Err(err) => {
                self.settle_failure(id, &err);
                Err(mutation_error(err))
            }
        }
    }

    /// Shared optimistic-patch path for update/move/resize/toggle.
    async fn patch_event(&self, id: &str, kind: MutationKind, patch: EventPatch) -> Result<()> {
        {
            let mut state = self.state.lock();
            ensure_idle(&state, id)?;
            let index = find_index(&state.entries, id)?;
            let snapshot = state.entries[index].clone();
            patch.apply_to(&mut state.entries[index]);
            if state.entries[index].all_day {
                state.entries[index].pin_all_day_bounds(self.tz);
            }
            state.pending.insert(
                id.to_string(),
                PendingMutation { kind, rollback: Rollback::Restore(snapshot) },
            );
        }

        match self.store.update(id, patch).await {
            Ok(stored) => {
                let mut state = self.state.lock();
                state.pending.remove(id);
                if let Ok(index) = find_index(&state.entries, id) {
                    state.entries[index] = stored;
                }
                Ok(())
            }
            Err(err) => {
                self.settle_failure(id, &err);
                Err(mutation_error(err))
            }
        }
    }

    /// Undo the optimistic half of a failed mutation.
    ///
    /// Safe to call after the view was replaced underneath the in-flight
    /// write: a `load_range` clears `pending`, making this a no-op.
    fn settle_failure(&self, id: &str, err: &OpsBoardError) {
        let mut state = self.state.lock();
        let Some(pending) = state.pending.remove(id) else {
            return;
        };
        warn!(event_id = id, kind = ?pending.kind, error = %err, "mutation failed, rolling back");
        match pending.rollback {
            Rollback::Restore(snapshot) => {
                state.entries.retain(|e| e.id != id);
                insert_sorted(&mut state.entries, snapshot);
            }
            Rollback::Remove(optimistic_id) => {
                state.entries.retain(|e| e.id != optimistic_id);
            }
            Rollback::Reinsert(snapshot) => {
                insert_sorted(&mut state.entries, snapshot);
            }
        }
    }
}

fn require_admin(actor: &RosterMember, action: &str) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(OpsBoardError::Forbidden(format!("only admins may {action}")))
    }
}

fn ensure_idle(state: &ViewState, id: &str) -> Result<()> {
    if state.pending.contains_key(id) {
        return Err(OpsBoardError::Conflict(format!(
            "a mutation for event {id} is already awaiting confirmation"
        )));
    }
    Ok(())
}

fn find_index(entries: &[CalendarEvent], id: &str) -> Result<usize> {
    entries
        .iter()
        .position(|e| e.id == id)
        .ok_or_else(|| OpsBoardError::NotFound(format!("event {id} is not in the loaded range")))
}

fn find_event<'a>(entries: &'a [CalendarEvent], id: &str) -> Result<&'a CalendarEvent> {
    find_index(entries, id).map(|index| &entries[index])
}

fn insert_sorted(entries: &mut Vec<CalendarEvent>, event: CalendarEvent) {
    let at = entries.partition_point(|e| {
        (e.start_time, e.id.as_str()) < (event.start_time, event.id.as_str())
    });
    entries.insert(at, event);
}

/// Remote write failures surface as `RemoteMutation`; local rejections
/// (validation, conflict, permissions) pass through unchanged.
fn mutation_error(err: OpsBoardError) -> OpsBoardError {
    match err {
        OpsBoardError::Validation(_)
        | OpsBoardError::Forbidden(_)
        | OpsBoardError::Conflict(_)
        | OpsBoardError::NotFound(_)
        | OpsBoardError::RemoteMutation(_) => err,
        other => OpsBoardError::RemoteMutation(other.to_string()),
    }
}
