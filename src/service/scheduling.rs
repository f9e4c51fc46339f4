//! Slot computation for the scheduling wizard.
//!
//! Candidate slots come from a teacher's weekly availability blocks, aligned
//! to half-hour boundaries, with anything overlapping a calendar-blocking
//! session or starting in the past removed. Bulk booking expands a weekly
//! recurrence and drops holidays.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::db::models::AvailabilityBlock;

/// Candidate starts are offered on this grid within an availability block.
const SLOT_STEP_MINUTES: u16 = 30;

/// Session lengths the wizard may ask for.
pub const ALLOWED_DURATIONS: [i64; 4] = [30, 45, 60, 90];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A time range already taken on the teacher's calendar.
#[derive(Debug, Clone, Copy)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

pub fn is_allowed_duration(minutes: i64) -> bool {
    ALLOWED_DURATIONS.contains(&minutes)
}

/// All bookable slots of `duration_minutes` for one teacher on one date.
///
/// `now` is passed in rather than read from the clock so callers (and tests)
/// control what "in the past" means.
pub fn available_slots(
    date: NaiveDate,
    duration_minutes: i64,
    blocks: &[AvailabilityBlock],
    busy: &[BusyInterval],
    now: DateTime<Utc>,
) -> Vec<Slot> {
    let weekday = date.weekday().num_days_from_monday() as u8;
    let mut slots = Vec::new();

    for block in blocks.iter().filter(|b| b.weekday == weekday) {
        let mut start_minute = block.start_minute;
        loop {
            let end_minute = start_minute as i64 + duration_minutes;
            if end_minute > block.end_minute as i64 {
                break;
            }
            if let Some(start) = minute_of_day(date, start_minute) {
                let end = start + Duration::minutes(duration_minutes);
                let taken = busy.iter().any(|b| b.overlaps(start, end));
                if !taken && start > now {
                    slots.push(Slot { start, end });
                }
            }
            start_minute += SLOT_STEP_MINUTES;
        }
    }

    slots.sort_by_key(|s| s.start);
    slots
}

fn minute_of_day(date: NaiveDate, minute: u16) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(minute as u32 / 60, minute as u32 % 60, 0)?;
    Some(date.and_time(time).and_utc())
}

/// Weekly recurrence of `count` occurrences from `start`, with holidays
/// dropped (not substituted). Returns kept and skipped dates in order.
pub fn weekly_dates(
    start: NaiveDate,
    count: u32,
    holidays: &HashSet<NaiveDate>,
) -> (Vec<NaiveDate>, Vec<NaiveDate>) {
    let mut kept = Vec::new();
    let mut skipped = Vec::new();
    for i in 0..count {
        let day = start + Duration::weeks(i as i64);
        if holidays.contains(&day) {
            skipped.push(day);
        } else {
            kept.push(day);
        }
    }
    (kept, skipped)
}
