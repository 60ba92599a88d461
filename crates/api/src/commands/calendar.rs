//! Calendar view and mutation commands

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use opsboard_core::{CalendarEntry, EventFilter};
use opsboard_domain::{
    local_day_bounds, EventCategory, EventDraft, EventPatch, OpsBoardError, Result,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::utils::logging::log_command_execution;
use crate::AppContext;

/// A calendar entry shaped for rendering: event fields plus resolved color.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntryDto {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub all_day: bool,
    pub location: Option<String>,
    pub category: EventCategory,
    pub is_done: bool,
    pub client_name: Option<String>,
    pub assigned_user_ids: Vec<String>,
    pub color: String,
}

impl From<CalendarEntry> for CalendarEntryDto {
    fn from(entry: CalendarEntry) -> Self {
        let event = entry.event;
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            start_time: event.start_time,
            end_time: event.end_time,
            all_day: event.all_day,
            location: event.location,
            category: event.category,
            is_done: event.is_done,
            client_name: event.client_name,
            assigned_user_ids: event.assigned_user_ids,
            color: entry.color.to_string(),
        }
    }
}

/// Load the calendar view for one month.
///
/// The watched range spans the full local days of the month, so events near
/// midnight land in the correct local day cells.
pub async fn load_calendar_month(ctx: &Arc<AppContext>, year: i32, month: u32) -> Result<usize> {
    let command_name = "calendar::load_calendar_month";
    let start = Instant::now();

    info!(command = command_name, year, month, "Loading calendar month");
    let result = match month_range(ctx, year, month) {
        Ok((range_start, range_end)) => ctx.reconciler.load_range(range_start, range_end).await,
        Err(e) => Err(e),
    };

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}

/// All loaded entries passing `filter`, ordered by start time.
pub fn get_calendar_entries(ctx: &Arc<AppContext>, filter: &EventFilter) -> Vec<CalendarEntryDto> {
    ctx.reconciler.entries(filter).into_iter().map(CalendarEntryDto::from).collect()
}

/// Entries for one local calendar day cell.
pub fn get_day_entries(
    ctx: &Arc<AppContext>,
    day: NaiveDate,
    filter: &EventFilter,
) -> Vec<CalendarEntryDto> {
    ctx.reconciler.entries_for_day(day, filter).into_iter().map(CalendarEntryDto::from).collect()
}

/// Create a new event as `actor_id`. Returns the stored event id.
pub async fn create_event(
    ctx: &Arc<AppContext>,
    actor_id: &str,
    draft: EventDraft,
) -> Result<String> {
    let command_name = "calendar::create_event";
    let start = Instant::now();

    let result = async {
        let actor = ctx.member(actor_id).await?;
        ctx.reconciler.create_event(&actor, draft).await
    }
    .await;

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}

/// Apply a partial edit to an event.
pub async fn update_event(
    ctx: &Arc<AppContext>,
    actor_id: &str,
    event_id: &str,
    patch: EventPatch,
) -> Result<()> {
    let command_name = "calendar::update_event";
    let start = Instant::now();

    let result = async {
        let actor = ctx.member(actor_id).await?;
        ctx.reconciler.update_event(&actor, event_id, patch).await
    }
    .await;

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}

/// Delete an event.
pub async fn delete_event(ctx: &Arc<AppContext>, actor_id: &str, event_id: &str) -> Result<()> {
    let command_name = "calendar::delete_event";
    let start = Instant::now();

    let result = async {
        let actor = ctx.member(actor_id).await?;
        ctx.reconciler.delete_event(&actor, event_id).await
    }
    .await;

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}

/// Drag handler: move an event to a new start, keeping its duration.
pub async fn move_event(
    ctx: &Arc<AppContext>,
    actor_id: &str,
    event_id: &str,
    new_start: DateTime<Utc>,
) -> Result<()> {
    let command_name = "calendar::move_event";
    let start = Instant::now();

    let result = async {
        let actor = ctx.member(actor_id).await?;
        ctx.reconciler.move_event(&actor, event_id, new_start).await
    }
    .await;

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}

/// Resize handler: change an event's end time.
pub async fn resize_event(
    ctx: &Arc<AppContext>,
    actor_id: &str,
    event_id: &str,
    new_end: DateTime<Utc>,
) -> Result<()> {
    let command_name = "calendar::resize_event";
    let start = Instant::now();

    let result = async {
        let actor = ctx.member(actor_id).await?;
        ctx.reconciler.resize_event(&actor, event_id, new_end).await
    }
    .await;

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}

/// Toggle an event's completion flag.
pub async fn toggle_event_done(
    ctx: &Arc<AppContext>,
    actor_id: &str,
    event_id: &str,
) -> Result<()> {
    let command_name = "calendar::toggle_event_done";
    let start = Instant::now();

    let result = async {
        let actor = ctx.member(actor_id).await?;
        ctx.reconciler.toggle_done(&actor, event_id).await
    }
    .await;

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}

fn month_range(
    ctx: &Arc<AppContext>,
    year: i32,
    month: u32,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| OpsBoardError::Validation(format!("invalid month: {year}-{month:02}")))?;
    let last = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .and_then(|d| d.pred_opt())
    .ok_or_else(|| OpsBoardError::Validation(format!("invalid month: {year}-{month:02}")))?;

    let (start, _) = local_day_bounds(first, ctx.tz);
    let (_, end) = local_day_bounds(last, ctx.tz);
    Ok((start, end))
}
