//! Attendance pipeline integration tests
//!
//! Drive the aggregator through the repository ports the way the app layer
//! does: fetch the roster and the clamped punch range, then aggregate.

mod support;

use chrono::NaiveDate;
use opsboard_core::{aggregate_month, AttendanceRepository, RosterRepository};
use opsboard_domain::{ClockTime, DayStatus, Role};
use support::{member, punch, MockAttendanceRepository, MockRosterRepository};

fn threshold() -> ClockTime {
    ClockTime::parse("10:10").unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn full_pipeline_reports_every_roster_member() {
    let roster_repo = MockRosterRepository {
        roster: vec![
            member("1", "Ava", Role::Admin),
            member("2", "Ben", Role::Member),
            member("3", "Cleo", Role::Member),
        ],
    };
    let attendance_repo = MockAttendanceRepository {
        punches: vec![
            punch("1", "2024-05-01", "09:58"),
            punch("1", "2024-05-01", "18:03"),
            punch("2", "2024-05-01", "10:31"),
            // Out of range, must be excluded by the fetch window.
            punch("2", "2024-04-30", "09:00"),
        ],
    };

    let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    let month_start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let roster = roster_repo.fetch_roster().await.unwrap();
    let punches = attendance_repo.fetch_punches(month_start, today).await.unwrap();
    let reports = aggregate_month(&roster, &punches, 2024, 5, today, &threshold()).unwrap();

    assert_eq!(reports.len(), 3);

    let ava = &reports[0];
    assert_eq!(ava.monthly.days_present, 1);
    assert_eq!(ava.monthly.days_late, 0);
    assert_eq!(ava.monthly.days_absent, 1);

    let ben = &reports[1];
    assert_eq!(ben.monthly.days_present, 1);
    assert_eq!(ben.monthly.days_late, 1);
    assert_eq!(ben.monthly.average_check_in.as_ref().unwrap().as_str(), "10:31");

    // No punches at all still yields a full report.
    let cleo = &reports[2];
    assert_eq!(cleo.monthly.days_present, 0);
    assert_eq!(cleo.monthly.days_absent, 2);
    assert!(cleo.monthly.average_check_in.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn todays_status_comes_from_todays_punches() {
    let roster_repo = MockRosterRepository { roster: vec![member("7", "Dana", Role::Member)] };
    let attendance_repo = MockAttendanceRepository {
        punches: vec![
            punch("7", "2024-05-02", "08:45"),
            punch("7", "2024-05-02", "17:59"),
        ],
    };

    let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    let month_start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let roster = roster_repo.fetch_roster().await.unwrap();
    let punches = attendance_repo.fetch_punches(month_start, today).await.unwrap();
    let reports = aggregate_month(&roster, &punches, 2024, 5, today, &threshold()).unwrap();

    let day = reports[0].today.as_ref().unwrap();
    assert_eq!(day.status, DayStatus::Present);
    assert_eq!(day.check_in.as_ref().unwrap().as_str(), "08:45");
    assert_eq!(day.check_out.as_ref().unwrap().as_str(), "17:59");
}
