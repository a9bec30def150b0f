use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub const FIVE_DAY_LENGTH: usize = 5;
pub const WEEK_LENGTH: usize = 7;
/// Six rows of seven days, whatever the month's shape.
pub const MONTH_GRID_LENGTH: usize = 42;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DayCell {
    pub date: NaiveDate,
    /// False only for the leading/trailing days of a month grid.
    pub is_current_month: bool,
}

/// Saturates at `NaiveDate::MIN`/`MAX` instead of overflowing.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let delta = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(delta).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(delta).unwrap_or(NaiveDate::MIN)
    }
}

/// Moves by whole months keeping the day-of-month. A day past the end of the
/// target month overflows into the next one: Jan 31 + 1 month = Mar 3 in a
/// non-leap year. Saturates at the ends of the supported date range.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let first = i32::try_from(total.div_euclid(12))
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, total.rem_euclid(12) as u32 + 1, 1));
    match first {
        Some(first) => add_days(first, i64::from(date.day()) - 1),
        None if months >= 0 => NaiveDate::MAX,
        None => NaiveDate::MIN,
    }
}

/// The Sunday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    add_days(date, -i64::from(date.weekday().num_days_from_sunday()))
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn consecutive_days(start: NaiveDate, length: usize) -> Vec<DayCell> {
    (0..length as i64)
        .map(|offset| DayCell {
            date: add_days(start, offset),
            is_current_month: true,
        })
        .collect()
}

pub fn build_five_day_range(anchor: NaiveDate) -> Vec<DayCell> {
    consecutive_days(anchor, FIVE_DAY_LENGTH)
}

pub fn build_week_range(anchor: NaiveDate) -> Vec<DayCell> {
    consecutive_days(start_of_week(anchor), WEEK_LENGTH)
}

pub fn build_month_grid(anchor: NaiveDate) -> Vec<DayCell> {
    let grid_start = start_of_week(start_of_month(anchor));
    (0..MONTH_GRID_LENGTH as i64)
        .map(|offset| {
            let date = add_days(grid_start, offset);
            DayCell {
                date,
                is_current_month: date.year() == anchor.year() && date.month() == anchor.month(),
            }
        })
        .collect()
}
