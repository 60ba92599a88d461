//! Domain types and models
//!
//! Split by dashboard area: attendance, roster, and calendar. All types are
//! plain serde-friendly data; derived view models are recomputed from store
//! reads and never persisted.

pub mod attendance;
pub mod calendar;
pub mod roster;

pub use attendance::{
    ClockTime, DailyAttendance, DayStatus, MemberAttendanceReport, MonthlyAttendance, PunchRecord,
};
pub use calendar::{
    display_color, local_day, local_day_bounds, CalendarEvent, EventCategory, EventDraft,
    EventPatch, RawEventRecord,
};
pub use roster::{Role, RosterMember};

use serde::{Deserialize, Serialize};

use crate::constants;

/// Tables the hosted store pushes change notifications for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreTable {
    Events,
    Attendance,
    Tasks,
    Notifications,
}

impl StoreTable {
    /// Wire name of the table as the hosted store reports it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Events => constants::TABLE_EVENTS,
            Self::Attendance => constants::TABLE_ATTENDANCE,
            Self::Tasks => constants::TABLE_TASKS,
            Self::Notifications => constants::TABLE_NOTIFICATIONS,
        }
    }
}
