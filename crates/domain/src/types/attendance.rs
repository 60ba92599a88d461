//! Attendance domain types
//!
//! A punch is a single check-in or check-out record; everything else here is
//! derived per aggregation pass and never written back to the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{OpsBoardError, Result};

/// Wall-clock time of day as a zero-padded `"HH:MM"` string.
///
/// Ordering is the lexicographic compare of the inner string. For zero-padded
/// `"HH:MM"` values this coincides with chronological order, and it is kept
/// as a string compare deliberately: the lateness cutoff is
/// boundary-inclusive at equality (`"10:10"` vs threshold `"10:10"` is
/// on-time; only a strictly greater value is late), and the store records
/// punch times in exactly this shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(String);

impl ClockTime {
    /// Parse and validate a `"HH:MM"` string.
    ///
    /// # Errors
    /// Returns `OpsBoardError::Validation` unless the input is exactly five
    /// characters, zero-padded, with a valid hour and minute.
    pub fn parse(value: &str) -> Result<Self> {
        let bytes = value.as_bytes();
        let valid = bytes.len() == 5
            && bytes[2] == b':'
            && bytes[0].is_ascii_digit()
            && bytes[1].is_ascii_digit()
            && bytes[3].is_ascii_digit()
            && bytes[4].is_ascii_digit();
        if !valid {
            return Err(OpsBoardError::Validation(format!(
                "invalid clock time {value:?}: expected zero-padded \"HH:MM\""
            )));
        }
        let (hour, minute) = (digits(bytes[0], bytes[1]), digits(bytes[3], bytes[4]));
        if hour > 23 || minute > 59 {
            return Err(OpsBoardError::Validation(format!(
                "invalid clock time {value:?}: hour or minute out of range"
            )));
        }
        Ok(Self(value.to_string()))
    }

    /// Build from numeric hour and minute.
    ///
    /// # Errors
    /// Returns `OpsBoardError::Validation` when hour or minute is out of range.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(OpsBoardError::Validation(format!(
                "invalid clock time {hour:02}:{minute:02}"
            )));
        }
        Ok(Self(format!("{hour:02}:{minute:02}")))
    }

    /// The underlying `"HH:MM"` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hour component (0..=23).
    pub fn hour(&self) -> u32 {
        let bytes = self.0.as_bytes();
        digits(bytes[0], bytes[1])
    }

    /// Minute component (0..=59).
    pub fn minute(&self) -> u32 {
        let bytes = self.0.as_bytes();
        digits(bytes[3], bytes[4])
    }

    /// Decimal-hour value used for averaging (`hour + minute / 60`).
    pub fn to_decimal_hours(&self) -> f64 {
        f64::from(self.hour()) + f64::from(self.minute()) / 60.0
    }

    /// Convert a decimal-hour value back to a clock time, rounding to the
    /// nearest minute and clamping to the day.
    pub fn from_decimal_hours(hours: f64) -> Self {
        let max_minutes = 24 * 60 - 1;
        let total = (hours * 60.0).round().clamp(0.0, f64::from(max_minutes)) as u32;
        Self(format!("{:02}:{:02}", total / 60, total % 60))
    }
}

fn digits(tens: u8, ones: u8) -> u32 {
    u32::from(tens - b'0') * 10 + u32::from(ones - b'0')
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = OpsBoardError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.0
    }
}

/// A single recorded check-in or check-out punch.
///
/// Immutable once created; a user may have several per day. Owned by the
/// hosted store, read-only here. Source order is assumed chronological:
/// the first punch of a day is the check-in, the last the check-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub time: ClockTime,
}

/// Attendance outcome for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Present,
    Late,
    Absent,
}

/// Derived per-day status for display. Recomputed on every aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAttendance {
    pub user_id: String,
    pub date: NaiveDate,
    pub status: DayStatus,
    pub check_in: Option<ClockTime>,
    pub check_out: Option<ClockTime>,
}

/// Derived monthly totals for one roster member.
///
/// Invariants: `days_present + days_absent` equals the number of days
/// considered (the month clamped to today), and `days_late` counts a subset
/// of the present days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAttendance {
    pub user_id: String,
    pub days_present: u32,
    pub days_late: u32,
    pub days_absent: u32,
    pub average_check_in: Option<ClockTime>,
}

/// Aggregation output: one roster member with monthly totals and, when the
/// viewed month contains it, today's status for the day view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAttendanceReport {
    pub member: super::roster::RosterMember,
    pub monthly: MonthlyAttendance,
    pub today: Option<DailyAttendance>,
}
