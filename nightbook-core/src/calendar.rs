//! Calendar utilities: ISO day keys and Monday-based week windows.
//!
//! Everything here works at calendar-day granularity in local wall-clock
//! time. There is no timezone conversion and no time-of-day.

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar day, displayed and serialized as `YYYY-MM-DD`.
///
/// Ordering is chronological, which matches the lexicographic order of the
/// ISO string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    /// Parse a `YYYY-MM-DD` key. Blank or malformed input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(raw, Self::FORMAT).ok().map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid day key '{s}' (expected YYYY-MM-DD)"))
    }
}

/// Today's calendar day from the local wall clock.
pub fn today_key() -> DayKey {
    DayKey(Local::now().date_naive())
}

/// The Monday on or before `day`.
pub fn week_start(day: DayKey) -> DayKey {
    let offset = day.0.weekday().num_days_from_monday();
    add_days(day, -i64::from(offset))
}

/// Sunday of the week that starts at `week_start`.
pub fn week_end(week_start: DayKey) -> DayKey {
    add_days(week_start, 6)
}

/// Shift a day key by `n` calendar days (negative goes back).
///
/// Saturates at the input day if the result would leave chrono's date range.
pub fn add_days(day: DayKey, n: i64) -> DayKey {
    let shifted = if n >= 0 {
        day.0.checked_add_days(Days::new(n.unsigned_abs()))
    } else {
        day.0.checked_sub_days(Days::new(n.unsigned_abs()))
    };
    shifted.map(DayKey).unwrap_or(day)
}

/// Inclusive range membership.
pub fn in_range(day: DayKey, start: DayKey, end: DayKey) -> bool {
    day >= start && day <= end
}

/// `YYYY-MM` month key for a day.
pub fn month_key(day: DayKey) -> String {
    day.0.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DayKey {
        DayKey::parse(s).unwrap()
    }

    #[test]
    fn test_parse_and_display_roundtrip() {
        let day = key("2024-03-09");
        assert_eq!(day.to_string(), "2024-03-09");
        assert_eq!(" 2024-03-09 ".parse::<DayKey>().unwrap(), day);
    }

    #[test]
    fn test_parse_rejects_blank_and_garbage() {
        assert_eq!(DayKey::parse(""), None);
        assert_eq!(DayKey::parse("   "), None);
        assert_eq!(DayKey::parse("not a date"), None);
        assert_eq!(DayKey::parse("2024-02-30"), None);
        assert!("03/09/2024".parse::<DayKey>().is_err());
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-01-01 was a Monday
        assert_eq!(week_start(key("2024-01-01")), key("2024-01-01"));
        assert_eq!(week_start(key("2024-01-03")), key("2024-01-01"));
        assert_eq!(week_start(key("2024-01-07")), key("2024-01-01"));
        assert_eq!(week_start(key("2024-01-08")), key("2024-01-08"));
    }

    #[test]
    fn test_week_start_crosses_year() {
        // Sunday 2023-01-01 belongs to the week starting Monday 2022-12-26
        assert_eq!(week_start(key("2023-01-01")), key("2022-12-26"));
    }

    #[test]
    fn test_week_end_is_six_days_later() {
        assert_eq!(week_end(key("2024-01-29")), key("2024-02-04"));
    }

    #[test]
    fn test_add_days_rollover() {
        assert_eq!(add_days(key("2024-02-28"), 1), key("2024-02-29"));
        assert_eq!(add_days(key("2023-02-28"), 1), key("2023-03-01"));
        assert_eq!(add_days(key("2024-12-31"), 1), key("2025-01-01"));
        assert_eq!(add_days(key("2024-01-10"), -29), key("2023-12-12"));
        assert_eq!(add_days(key("2024-01-10"), 0), key("2024-01-10"));
    }

    #[test]
    fn test_in_range_inclusive() {
        let start = key("2024-01-01");
        let end = key("2024-01-07");
        assert!(in_range(start, start, end));
        assert!(in_range(end, start, end));
        assert!(in_range(key("2024-01-04"), start, end));
        assert!(!in_range(key("2023-12-31"), start, end));
        assert!(!in_range(key("2024-01-08"), start, end));
    }

    #[test]
    fn test_ordering_matches_iso_strings() {
        let a = key("2023-12-31");
        let b = key("2024-01-01");
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn test_month_key() {
        assert_eq!(month_key(key("2024-07-04")), "2024-07");
    }

    #[test]
    fn test_serde_as_iso_string() {
        let day = key("2024-05-06");
        assert_eq!(serde_json::to_string(&day).unwrap(), "\"2024-05-06\"");
        let back: DayKey = serde_json::from_str("\"2024-05-06\"").unwrap();
        assert_eq!(back, day);
    }
}
