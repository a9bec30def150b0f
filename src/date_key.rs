//! Canonical `YYYY-MM-DD` keys for loosely formatted due dates.
//!
//! Due dates arrive as whatever the user typed (`11/30`, `11/30/25`,
//! `2025-11-30`, ...). Anything that does not name a real calendar day maps to
//! `None`, which callers treat as "unscheduled".

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const CANONICAL_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey {
    date: NaiveDate,
}

impl DateKey {
    pub fn as_date(&self) -> NaiveDate {
        self.date
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl FromStr for DateKey {
    type Err = String;

    /// Strict parse of the canonical form only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_canonical(s).ok_or_else(|| format!("invalid date key: {s:?}"))
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.date.format(CANONICAL_FORMAT))
    }
}

impl Serialize for DateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D>(deserializer: D) -> Result<DateKey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Normalizes a due date, resolving a missing year to `current_year`.
pub fn normalize_due_date(raw: Option<&str>, current_year: i32) -> Option<DateKey> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if looks_canonical(raw) {
        return parse_canonical(&raw[..10]);
    }
    parse_month_first(raw, current_year)
}

/// [`normalize_due_date`] against the local clock's year.
pub fn to_date_key(raw: Option<&str>) -> Option<DateKey> {
    normalize_due_date(raw, Local::now().year())
}

// `YYYY-MM-DD`, optionally followed by a `T...` time part.
fn looks_canonical(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.len() < 10 || (bytes.len() > 10 && bytes[10] != b'T') {
        return false;
    }
    bytes[..10].iter().enumerate().all(|(index, byte)| match index {
        4 | 7 => *byte == b'-',
        _ => byte.is_ascii_digit(),
    })
}

fn parse_canonical(raw: &str) -> Option<DateKey> {
    if raw.len() != 10 || !looks_canonical(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, CANONICAL_FORMAT)
        .ok()
        .map(DateKey::from)
}

// `M/D`, `M/D/YY`, `M/D/YYYY` or the same with `-`.
fn parse_month_first(raw: &str, current_year: i32) -> Option<DateKey> {
    let separator = if raw.contains('/') { '/' } else { '-' };
    let parts: Vec<&str> = raw.split(separator).collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }
    if !parts
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }
    if parts[0].len() > 2 || parts[1].len() > 2 {
        return None;
    }

    let month: u32 = parts[0].parse().ok()?;
    let day: u32 = parts[1].parse().ok()?;
    let year = match parts.get(2) {
        None => current_year,
        Some(year) if year.len() <= 2 => 2000 + year.parse::<i32>().ok()?,
        Some(year) if year.len() == 4 => year.parse::<i32>().ok()?,
        Some(_) => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day).map(DateKey::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> Option<String> {
        normalize_due_date(Some(raw), 2025).map(|key| key.to_string())
    }

    #[test]
    fn canonical_keys_are_returned_unchanged() {
        assert_eq!(key("2025-11-30").as_deref(), Some("2025-11-30"));
        assert_eq!(key("2024-02-29").as_deref(), Some("2024-02-29"));
    }

    #[test]
    fn iso_datetime_keeps_its_date_part() {
        assert_eq!(key("2025-11-18T09:30:00Z").as_deref(), Some("2025-11-18"));
        assert_eq!(key("2025-11-18 09:30"), None);
    }

    #[test]
    fn month_first_formats() {
        assert_eq!(key("11/30/2025").as_deref(), Some("2025-11-30"));
        assert_eq!(key("1/5/2026").as_deref(), Some("2026-01-05"));
        assert_eq!(key("12-01-2025").as_deref(), Some("2025-12-01"));
        assert_eq!(key(" 3/4/24 ").as_deref(), Some("2024-03-04"));
        assert_eq!(key("3-4-24").as_deref(), Some("2024-03-04"));
    }

    #[test]
    fn missing_year_uses_current_year() {
        assert_eq!(key("11/30").as_deref(), Some("2025-11-30"));
        assert_eq!(
            normalize_due_date(Some("2-29"), 2028).map(|k| k.to_string()).as_deref(),
            Some("2028-02-29")
        );
    }

    #[test]
    fn to_date_key_uses_local_year_for_short_form() {
        let expected = format!("{}-11-30", Local::now().year());
        assert_eq!(to_date_key(Some("11/30")).map(|k| k.to_string()), Some(expected));
    }

    #[test]
    fn empty_or_invalid_input_is_unscheduled() {
        assert_eq!(normalize_due_date(None, 2025), None);
        assert_eq!(key(""), None);
        assert_eq!(key("   "), None);
        assert_eq!(key("13/40"), None);
        assert_eq!(key("2/30/2025"), None);
        assert_eq!(key("2/29/2025"), None);
        assert_eq!(key("2025-13-01"), None);
        assert_eq!(key("tomorrow"), None);
        assert_eq!(key("11/30/202"), None);
        assert_eq!(key("11/30/2025/1"), None);
        assert_eq!(key("11/-3"), None);
        assert_eq!(key("11/30-2025"), None);
    }

    #[test]
    fn date_key_serializes_as_string() {
        let key = DateKey::from(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(serde_json::to_value(key).unwrap(), serde_json::json!("2025-12-01"));
        let back: DateKey = serde_json::from_value(serde_json::json!("2025-12-01")).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_value::<DateKey>(serde_json::json!("12/01/2025")).is_err());
    }
}
