//! Pure calendar arithmetic shared by the dashboard and scheduling views.

use crate::db::models::Session;
use chrono::{Datelike, Duration, Months, NaiveDate};
use std::collections::BTreeMap;

/// Monday-anchored start of the ISO week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

/// Every day shown in a month view: the month itself padded to full
/// Monday..Sunday weeks on both sides. The result length is a multiple of 7.
pub fn month_grid(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);

    let grid_start = week_start(first);
    let grid_end = week_start(last) + Duration::days(6);

    let mut days = Vec::new();
    let mut day = grid_start;
    while day <= grid_end {
        days.push(day);
        day += Duration::days(1);
    }
    days
}

/// Group sessions by the calendar day they start on, in day order.
pub fn group_by_day(sessions: Vec<Session>) -> BTreeMap<NaiveDate, Vec<Session>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<Session>> = BTreeMap::new();
    for session in sessions {
        grouped
            .entry(session.scheduled_at.date_naive())
            .or_default()
            .push(session);
    }
    grouped
}

pub fn filter_by_teacher(sessions: Vec<Session>, teacher_id: &str) -> Vec<Session> {
    sessions
        .into_iter()
        .filter(|s| s.teacher_id == teacher_id)
        .collect()
}
