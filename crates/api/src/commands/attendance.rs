//! Attendance reporting commands

use std::sync::Arc;
use std::time::Instant;

use chrono::{Datelike, NaiveDate};
use opsboard_core::{aggregate_month, AttendanceRepository, RosterRepository};
use opsboard_domain::{
    constants::MISSING_AVERAGE_PLACEHOLDER, DayStatus, MemberAttendanceReport, Result,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::utils::logging::log_command_execution;
use crate::AppContext;

/// One roster member's monthly attendance, shaped for the dashboard table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReportDto {
    pub user_id: String,
    pub name: String,
    pub department: String,
    pub position: String,
    pub days_present: u32,
    pub days_late: u32,
    pub days_absent: u32,
    /// `"HH:MM"`, or `"-"` when the member has no present days.
    pub average_check_in: String,
    pub today: Option<TodayStatusDto>,
}

/// Today's row for the day view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayStatusDto {
    pub status: DayStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

/// One roster member's status for today, shaped for the day view list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayAttendanceDto {
    pub user_id: String,
    pub name: String,
    pub department: String,
    pub position: String,
    pub status: DayStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

impl From<MemberAttendanceReport> for AttendanceReportDto {
    fn from(report: MemberAttendanceReport) -> Self {
        Self {
            user_id: report.member.id,
            name: report.member.name,
            department: report.member.department,
            position: report.member.position,
            days_present: report.monthly.days_present,
            days_late: report.monthly.days_late,
            days_absent: report.monthly.days_absent,
            average_check_in: report
                .monthly
                .average_check_in
                .map_or_else(|| MISSING_AVERAGE_PLACEHOLDER.to_string(), |t| t.to_string()),
            today: report.today.map(|day| TodayStatusDto {
                status: day.status,
                check_in: day.check_in.map(|t| t.to_string()),
                check_out: day.check_out.map(|t| t.to_string()),
            }),
        }
    }
}

/// Monthly attendance report for the whole roster.
///
/// Fetches the roster and the month's punches (clamped to today), aggregates,
/// then sorts by member name. `search` narrows the rows with a
/// case-insensitive substring match on the name.
pub async fn get_monthly_attendance(
    ctx: &Arc<AppContext>,
    year: i32,
    month: u32,
    search: Option<String>,
) -> Result<Vec<AttendanceReportDto>> {
    let command_name = "attendance::get_monthly_attendance";
    let start = Instant::now();

    info!(command = command_name, year, month, "Building monthly attendance report");
    let result = build_monthly_report(ctx, year, month, search).await;

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}

/// Today's status for every visible roster member.
///
/// Empty when today falls outside the requested month; a member with no
/// punches today reports [`DayStatus::Absent`].
pub async fn get_today_attendance(
    ctx: &Arc<AppContext>,
    year: i32,
    month: u32,
) -> Result<Vec<TodayAttendanceDto>> {
    let command_name = "attendance::get_today_attendance";
    let start = Instant::now();

    info!(command = command_name, year, month, "Building today's attendance list");
    let result = build_monthly_report(ctx, year, month, None).await.map(|rows| {
        rows.into_iter()
            .filter_map(|row| {
                row.today.map(|today| TodayAttendanceDto {
                    user_id: row.user_id,
                    name: row.name,
                    department: row.department,
                    position: row.position,
                    status: today.status,
                    check_in: today.check_in,
                    check_out: today.check_out,
                })
            })
            .collect()
    });

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    result
}

async fn build_monthly_report(
    ctx: &Arc<AppContext>,
    year: i32,
    month: u32,
    search: Option<String>,
) -> Result<Vec<AttendanceReportDto>> {
    let today = ctx.today();
    let month_start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        opsboard_domain::OpsBoardError::Validation(format!("invalid month: {year}-{month:02}"))
    })?;
    let fetch_end = month_end(month_start).min(today).max(month_start);

    let roster = ctx.store.fetch_roster().await?;
    let punches = ctx.store.fetch_punches(month_start, fetch_end).await?;

    let threshold = &ctx.config.attendance.late_threshold;
    let reports = aggregate_month(&roster, &punches, year, month, today, threshold)?;

    let needle = search.map(|s| s.to_lowercase()).filter(|s| !s.is_empty());
    let mut rows: Vec<AttendanceReportDto> = reports
        .into_iter()
        .filter(|r| {
            needle.as_ref().map_or(true, |n| r.member.name.to_lowercase().contains(n))
        })
        .map(AttendanceReportDto::from)
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.user_id.cmp(&b.user_id)));
    Ok(rows)
}

fn month_end(month_start: NaiveDate) -> NaiveDate {
    let (year, month) = (month_start.year(), month_start.month());
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).unwrap_or(month_start)
}
