use chrono::{Datelike, NaiveDate};

/// Column headers for the month grid, Sunday first.
pub const WEEKDAY_INITIALS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

const WEEKDAY_SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn weekday_short(date: NaiveDate) -> &'static str {
    WEEKDAY_SHORT[date.weekday().num_days_from_sunday() as usize]
}

/// `November 2025`
pub fn month_year_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// `Sat, Nov 15, 2025`
pub fn full_date_label(date: NaiveDate) -> String {
    date.format("%a, %b %-d, %Y").to_string()
}
