//! Calendar domain types
//!
//! Events are owned by the hosted store and arrive as loosely-typed JSON
//! rows ([`RawEventRecord`]). They are normalized into [`CalendarEvent`] at
//! the fetch boundary; business logic never branches on wire shape.
//!
//! Day bucketing is done in the configured local time zone, not UTC: the
//! store keeps UTC timestamps, the dashboard renders local calendar days.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants;
use crate::errors::{OpsBoardError, Result};

/// Category of a calendar event, driving its display color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Meeting,
    SiteVisit,
    Deadline,
    Personal,
    #[default]
    #[serde(other)]
    Other,
}

/// Resolve the display color for a `(category, is_done)` pair.
///
/// Done events always render in the single completed color, regardless of
/// category.
pub fn display_color(category: EventCategory, is_done: bool) -> &'static str {
    if is_done {
        return constants::COLOR_COMPLETED;
    }
    match category {
        EventCategory::Meeting => constants::COLOR_MEETING,
        EventCategory::SiteVisit => constants::COLOR_SITE_VISIT,
        EventCategory::Deadline => constants::COLOR_DEADLINE,
        EventCategory::Personal => constants::COLOR_PERSONAL,
        EventCategory::Other => constants::COLOR_OTHER,
    }
}

/// Local calendar day of a UTC timestamp in the given zone.
pub fn local_day(timestamp: DateTime<Utc>, tz: Tz) -> NaiveDate {
    timestamp.with_timezone(&tz).date_naive()
}

/// Full-day bounds of a local calendar day, as UTC instants.
///
/// The bounds are pinned to `00:00:00.000` and `23:59:59.999` of the local
/// day rather than relying on timezone-implicit midnight.
pub fn local_day_bounds(day: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let end_of_day =
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    let start = local_to_utc(day.and_time(NaiveTime::MIN), tz);
    let end = local_to_utc(day.and_time(end_of_day), tz);
    (start, end)
}

/// Map a naive local datetime to UTC.
///
/// DST ambiguity resolves to the earlier instant; a nonexistent local time
/// (spring-forward gap) falls back to reading the value as UTC.
fn local_to_utc(naive: chrono::NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => dt.with_timezone(&Utc),
        chrono::LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        chrono::LocalResult::None => DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc),
    }
}

/// A calendar event in its canonical, normalized shape.
///
/// Invariant: `end_time` is never before `start_time`. All-day events carry
/// local full-day bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: EventCategory,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub assigned_user_ids: Vec<String>,
}

impl CalendarEvent {
    /// Duration of the event; invariant across a move, changed only by a
    /// resize.
    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }

    /// Resolved display color for the current `(category, is_done)` pair.
    pub fn display_color(&self) -> &'static str {
        display_color(self.category, self.is_done)
    }

    /// True when `user_id` appears in the normalized assignee list.
    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assigned_user_ids.iter().any(|id| id == user_id)
    }

    /// Pin the time bounds to the full local day containing `start_time`.
    pub fn pin_all_day_bounds(&mut self, tz: Tz) {
        let day = local_day(self.start_time, tz);
        let (start, end) = local_day_bounds(day, tz);
        self.start_time = start;
        self.end_time = end;
    }
}

/// Payload for creating a new event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: EventCategory,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub assigned_user_ids: Vec<String>,
}

impl EventDraft {
    /// Validate the draft and build the event that will be written remotely.
    ///
    /// # Errors
    /// `OpsBoardError::Validation` for an empty title or inverted time
    /// bounds.
    pub fn into_event(self, tz: Tz) -> Result<CalendarEvent> {
        if self.title.trim().is_empty() {
            return Err(OpsBoardError::Validation("event title is required".into()));
        }
        if !self.all_day && self.end_time < self.start_time {
            return Err(OpsBoardError::Validation(
                "event end time must not be before its start time".into(),
            ));
        }
        let mut event = CalendarEvent {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            all_day: self.all_day,
            location: self.location,
            category: self.category,
            is_done: false,
            client_name: self.client_name,
            assigned_user_ids: self.assigned_user_ids,
        };
        if event.all_day {
            event.pin_all_day_bounds(tz);
        }
        Ok(event)
    }
}

/// Partial update for an event; unset fields are left untouched.
///
/// Serializes with unset fields skipped so it can be merged generically
/// into the remote row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user_ids: Option<Vec<String>>,
}

impl EventPatch {
    /// Apply the set fields to a local event (the optimistic half of a
    /// mutation; the same patch is sent to the store).
    pub fn apply_to(&self, event: &mut CalendarEvent) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = Some(description.clone());
        }
        if let Some(start_time) = self.start_time {
            event.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            event.end_time = end_time;
        }
        if let Some(all_day) = self.all_day {
            event.all_day = all_day;
        }
        if let Some(location) = &self.location {
            event.location = Some(location.clone());
        }
        if let Some(category) = self.category {
            event.category = category;
        }
        if let Some(is_done) = self.is_done {
            event.is_done = is_done;
        }
        if let Some(client_name) = &self.client_name {
            event.client_name = Some(client_name.clone());
        }
        if let Some(ids) = &self.assigned_user_ids {
            event.assigned_user_ids = ids.clone();
        }
    }
}

/// An event row exactly as the hosted store returns it.
///
/// The store is loosely typed: `assignedUserIds` arrives as a single string,
/// a number, an array of either, or not at all. [`RawEventRecord::normalize`]
/// collapses all of those into one canonical shape immediately after fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: EventCategory,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub assigned_user_ids: Option<serde_json::Value>,
}

impl RawEventRecord {
    /// Normalize the raw row into the canonical event shape.
    ///
    /// Assignee ids are coerced to strings whatever their wire shape; an
    /// end before the start is clamped to the start; all-day rows get their
    /// bounds pinned to the full local day.
    pub fn normalize(self, tz: Tz) -> CalendarEvent {
        let assigned_user_ids =
            self.assigned_user_ids.map(coerce_id_list).unwrap_or_default();
        let mut event = CalendarEvent {
            id: self.id,
            title: self.title,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time.max(self.start_time),
            all_day: self.all_day,
            location: self.location,
            category: self.category,
            is_done: self.is_done,
            client_name: self.client_name,
            assigned_user_ids,
        };
        if event.all_day {
            event.pin_all_day_bounds(tz);
        }
        event
    }
}

fn coerce_id_list(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => {
            items.into_iter().filter_map(coerce_id).collect()
        }
        other => coerce_id(other).into_iter().collect(),
    }
}

fn coerce_id(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
