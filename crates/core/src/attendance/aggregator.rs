//! Monthly attendance aggregation - core business logic

use std::collections::HashMap;

use chrono::NaiveDate;
use opsboard_domain::{
    ClockTime, DailyAttendance, DayStatus, MemberAttendanceReport, MonthlyAttendance,
    OpsBoardError, PunchRecord, Result, RosterMember,
};

/// Aggregate one month of punches into per-member reports.
///
/// The considered range is the month clamped to `today`: days strictly after
/// today are excluded from both numerator and denominator, so a month viewed
/// mid-way only counts the elapsed days. A member with no punches on a
/// considered day is absent for that day; otherwise the day is present, and
/// additionally late when the first punch is strictly later than
/// `late_threshold` (equal to the threshold is on time - the comparison is
/// the lexicographic [`ClockTime`] ordering).
///
/// For the day equal to `today` the first and last punches are captured as
/// check-in/check-out for the day view. The average check-in is the mean of
/// first-punch decimal hours over present days, rounded to the minute.
///
/// Pure function: no side effects, identical inputs produce identical
/// output. Output order follows roster order; callers re-sort and filter.
/// Hidden roster members (`show == false`) are skipped.
///
/// # Errors
/// `OpsBoardError::Validation` when `month` is not a valid month number.
pub fn aggregate_month(
    roster: &[RosterMember],
    punches: &[PunchRecord],
    year: i32,
    month: u32,
    today: NaiveDate,
    late_threshold: &ClockTime,
) -> Result<Vec<MemberAttendanceReport>> {
    let month_start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        OpsBoardError::Validation(format!("invalid month: {year}-{month:02}"))
    })?;
    let range_end = last_day_of_month(year, month)?.min(today);

    let mut by_user_day: HashMap<(&str, NaiveDate), Vec<&PunchRecord>> = HashMap::new();
    for punch in punches {
        by_user_day.entry((punch.user_id.as_str(), punch.date)).or_default().push(punch);
    }

    let mut reports = Vec::with_capacity(roster.len());
    for member in roster.iter().filter(|m| m.show) {
        reports.push(aggregate_member(member, &by_user_day, month_start, range_end, today, late_threshold));
    }
    Ok(reports)
}

fn aggregate_member(
    member: &RosterMember,
    by_user_day: &HashMap<(&str, NaiveDate), Vec<&PunchRecord>>,
    month_start: NaiveDate,
    range_end: NaiveDate,
    today: NaiveDate,
    late_threshold: &ClockTime,
) -> MemberAttendanceReport {
    let mut days_present = 0u32;
    let mut days_late = 0u32;
    let mut days_absent = 0u32;
    let mut check_in_hours_sum = 0f64;
    let mut today_status = None;

    let mut day = month_start;
    while day <= range_end {
        let day_punches = by_user_day
            .get(&(member.id.as_str(), day))
            .map(Vec::as_slice)
            .unwrap_or_default();

        let (status, check_in, check_out) = match (day_punches.first(), day_punches.last()) {
            (Some(first), Some(last)) => {
                days_present += 1;
                check_in_hours_sum += first.time.to_decimal_hours();
                // Boundary inclusive: equal to the threshold is on time.
                let status = if first.time > *late_threshold {
                    days_late += 1;
                    DayStatus::Late
                } else {
                    DayStatus::Present
                };
                (status, Some(first.time.clone()), Some(last.time.clone()))
            }
            _ => {
                days_absent += 1;
                (DayStatus::Absent, None, None)
            }
        };

        if day == today {
            today_status = Some(DailyAttendance {
                user_id: member.id.clone(),
                date: day,
                status,
                check_in,
                check_out,
            });
        }

        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    let average_check_in = (days_present > 0)
        .then(|| ClockTime::from_decimal_hours(check_in_hours_sum / f64::from(days_present)));

    MemberAttendanceReport {
        member: member.clone(),
        monthly: MonthlyAttendance {
            user_id: member.id.clone(),
            days_present,
            days_late,
            days_absent,
            average_check_in,
        },
        today: today_status,
    }
}

fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .ok_or_else(|| OpsBoardError::Validation(format!("invalid month: {year}-{month:02}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, name: &str) -> RosterMember {
        RosterMember {
            id: id.into(),
            name: name.into(),
            department: "Operations".into(),
            position: "Technician".into(),
            username: name.to_lowercase(),
            role: opsboard_domain::Role::Member,
            show: true,
        }
    }

    fn punch(user_id: &str, date: &str, time: &str) -> PunchRecord {
        PunchRecord {
            user_id: user_id.into(),
            date: date.parse().unwrap(),
            time: ClockTime::parse(time).unwrap(),
        }
    }

    fn threshold(value: &str) -> ClockTime {
        ClockTime::parse(value).unwrap()
    }

    #[test]
    fn single_late_punch_scenario() {
        let roster = vec![member("1", "A")];
        let punches = vec![punch("1", "2024-05-01", "10:15")];
        let today = "2024-05-01".parse().unwrap();

        let reports =
            aggregate_month(&roster, &punches, 2024, 5, today, &threshold("10:10")).unwrap();

        assert_eq!(reports.len(), 1);
        let monthly = &reports[0].monthly;
        assert_eq!(monthly.days_present, 1);
        assert_eq!(monthly.days_late, 1);
        assert_eq!(monthly.days_absent, 0);
        assert_eq!(monthly.average_check_in.as_ref().unwrap().as_str(), "10:15");

        let today_status = reports[0].today.as_ref().unwrap();
        assert_eq!(today_status.status, DayStatus::Late);
        assert_eq!(today_status.check_in.as_ref().unwrap().as_str(), "10:15");
        assert_eq!(today_status.check_out.as_ref().unwrap().as_str(), "10:15");
    }

    #[test]
    fn no_punches_means_every_elapsed_day_absent() {
        let roster = vec![member("1", "A")];
        let today = "2024-05-10".parse().unwrap();

        let reports = aggregate_month(&roster, &[], 2024, 5, today, &threshold("10:10")).unwrap();

        let monthly = &reports[0].monthly;
        assert_eq!(monthly.days_absent, 10);
        assert_eq!(monthly.days_present, 0);
        assert_eq!(monthly.days_late, 0);
        assert!(monthly.average_check_in.is_none());
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let roster = vec![member("1", "A")];
        let punches = vec![punch("1", "2024-05-01", "10:10")];
        let today = "2024-05-01".parse().unwrap();

        let reports =
            aggregate_month(&roster, &punches, 2024, 5, today, &threshold("10:10")).unwrap();

        assert_eq!(reports[0].monthly.days_present, 1);
        assert_eq!(reports[0].monthly.days_late, 0);
        assert_eq!(reports[0].today.as_ref().unwrap().status, DayStatus::Present);
    }

    #[test]
    fn days_after_today_are_excluded_from_the_denominator() {
        let roster = vec![member("1", "A")];
        let punches = vec![punch("1", "2024-05-02", "09:00")];
        let today = "2024-05-03".parse().unwrap();

        let reports =
            aggregate_month(&roster, &punches, 2024, 5, today, &threshold("10:10")).unwrap();

        let monthly = &reports[0].monthly;
        // Three elapsed days: one present, two absent. May 4-31 do not count.
        assert_eq!(monthly.days_present + monthly.days_absent, 3);
        assert_eq!(monthly.days_present, 1);
        assert_eq!(monthly.days_absent, 2);
    }

    #[test]
    fn month_entirely_in_the_future_counts_nothing() {
        let roster = vec![member("1", "A")];
        let today = "2024-04-30".parse().unwrap();

        let reports = aggregate_month(&roster, &[], 2024, 5, today, &threshold("10:10")).unwrap();

        let monthly = &reports[0].monthly;
        assert_eq!(monthly.days_present, 0);
        assert_eq!(monthly.days_absent, 0);
        assert!(monthly.average_check_in.is_none());
        assert!(reports[0].today.is_none());
    }

    #[test]
    fn first_punch_is_check_in_and_last_is_check_out() {
        let roster = vec![member("1", "A")];
        let punches = vec![
            punch("1", "2024-05-01", "09:02"),
            punch("1", "2024-05-01", "12:30"),
            punch("1", "2024-05-01", "18:11"),
        ];
        let today = "2024-05-01".parse().unwrap();

        let reports =
            aggregate_month(&roster, &punches, 2024, 5, today, &threshold("10:10")).unwrap();

        let today_status = reports[0].today.as_ref().unwrap();
        assert_eq!(today_status.check_in.as_ref().unwrap().as_str(), "09:02");
        assert_eq!(today_status.check_out.as_ref().unwrap().as_str(), "18:11");
        assert_eq!(today_status.status, DayStatus::Present);
    }

    #[test]
    fn average_check_in_is_the_rounded_mean_of_first_punches() {
        let roster = vec![member("1", "A")];
        let punches = vec![
            punch("1", "2024-05-01", "09:00"),
            punch("1", "2024-05-02", "10:00"),
        ];
        let today = "2024-05-02".parse().unwrap();

        let reports =
            aggregate_month(&roster, &punches, 2024, 5, today, &threshold("10:10")).unwrap();

        assert_eq!(
            reports[0].monthly.average_check_in.as_ref().unwrap().as_str(),
            "09:30"
        );
    }

    #[test]
    fn aggregation_is_pure_and_idempotent() {
        let roster = vec![member("1", "A"), member("2", "B")];
        let punches = vec![
            punch("1", "2024-05-01", "10:15"),
            punch("2", "2024-05-01", "08:55"),
            punch("2", "2024-05-01", "17:40"),
        ];
        let today = "2024-05-02".parse().unwrap();

        let first =
            aggregate_month(&roster, &punches, 2024, 5, today, &threshold("10:10")).unwrap();
        let second =
            aggregate_month(&roster, &punches, 2024, 5, today, &threshold("10:10")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn present_plus_absent_always_equals_days_considered() {
        let roster = vec![member("1", "A"), member("2", "B"), member("3", "C")];
        let punches = vec![
            punch("1", "2024-05-01", "09:00"),
            punch("1", "2024-05-05", "11:00"),
            punch("2", "2024-05-03", "10:10"),
        ];
        let today = "2024-05-07".parse().unwrap();

        let reports =
            aggregate_month(&roster, &punches, 2024, 5, today, &threshold("10:10")).unwrap();

        for report in &reports {
            assert_eq!(
                report.monthly.days_present + report.monthly.days_absent,
                7,
                "member {}",
                report.member.id
            );
            assert!(report.monthly.days_late <= report.monthly.days_present);
        }
    }

    #[test]
    fn hidden_members_are_skipped() {
        let mut hidden = member("9", "Ghost");
        hidden.show = false;
        let roster = vec![member("1", "A"), hidden];
        let today = "2024-05-01".parse().unwrap();

        let reports = aggregate_month(&roster, &[], 2024, 5, today, &threshold("10:10")).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].member.id, "1");
    }

    #[test]
    fn invalid_month_is_rejected() {
        let roster = vec![member("1", "A")];
        let today = "2024-05-01".parse().unwrap();
        let result = aggregate_month(&roster, &[], 2024, 13, today, &threshold("10:10"));
        assert!(matches!(result, Err(OpsBoardError::Validation(_))));
    }

    #[test]
    fn december_clamps_to_its_own_last_day() {
        let roster = vec![member("1", "A")];
        let today = "2025-01-15".parse().unwrap();

        let reports = aggregate_month(&roster, &[], 2024, 12, today, &threshold("10:10")).unwrap();

        // Viewing December from January: all 31 days elapsed.
        assert_eq!(reports[0].monthly.days_absent, 31);
        assert!(reports[0].today.is_none());
    }
}
