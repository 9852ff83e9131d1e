//! Calendar helpers shared by the streak engine and the report builders.
//!
//! All dates are plain calendar days (`NaiveDate`). Weekdays are indexed
//! 0-6 starting at Sunday, month days 1-31, matching the stored
//! `specific_days` values on a habit.

use chrono::{Datelike, NaiveDate, Utc};

use crate::error::ValidationError;

/// Today's calendar date (UTC).
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a `YYYY-MM-DD` string into a date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        value: value.to_string(),
    })
}

/// All dates from `start` through `end`, inclusive and ascending.
/// Empty when `end` precedes `start`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if end < start {
        return Vec::new();
    }

    let span = end.signed_duration_since(start).num_days() as usize + 1;
    let mut dates = Vec::with_capacity(span);
    let mut current = start;
    loop {
        dates.push(current);
        if current == end {
            break;
        }
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    dates
}

/// Whole days from `earlier` to `later`; negative when `later` precedes it.
pub fn gap_days(earlier: NaiveDate, later: NaiveDate) -> i64 {
    later.signed_duration_since(earlier).num_days()
}

/// Weekday index of a date, 0 = Sunday through 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Day of the month, 1-31.
pub fn day_of_month(date: NaiveDate) -> u32 {
    date.day()
}

/// English name for a 0-based weekday index.
pub fn day_name(day_of_week: u32) -> &'static str {
    match day_of_week {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Unknown",
    }
}

/// English name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        parse_date(value).unwrap()
    }

    #[test]
    fn test_format_and_parse_round_trip() {
        let day = date("2025-03-09");
        assert_eq!(format_date(day), "2025-03-09");
        assert_eq!(parse_date("2025-03-09").unwrap(), day);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(parse_date("2025-3-9").is_err());
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("2025-13-01").is_err());
    }

    #[test]
    fn test_days_between_is_inclusive_and_ascending() {
        let dates = days_between(date("2025-02-27"), date("2025-03-02"));
        assert_eq!(
            dates,
            vec![
                date("2025-02-27"),
                date("2025-02-28"),
                date("2025-03-01"),
                date("2025-03-02"),
            ]
        );
    }

    #[test]
    fn test_days_between_single_day() {
        assert_eq!(
            days_between(date("2025-01-15"), date("2025-01-15")),
            vec![date("2025-01-15")]
        );
    }

    #[test]
    fn test_days_between_empty_when_reversed() {
        assert!(days_between(date("2025-01-16"), date("2025-01-15")).is_empty());
    }

    #[test]
    fn test_days_between_spans_leap_day() {
        let dates = days_between(date("2024-02-28"), date("2024-03-01"));
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[1], date("2024-02-29"));
    }

    #[test]
    fn test_gap_days() {
        assert_eq!(gap_days(date("2025-01-01"), date("2025-01-08")), 7);
        assert_eq!(gap_days(date("2025-01-08"), date("2025-01-01")), -7);
        assert_eq!(gap_days(date("2025-01-01"), date("2025-01-01")), 0);
    }

    #[test]
    fn test_day_of_week_is_sunday_based() {
        // 2025-03-09 is a Sunday.
        assert_eq!(day_of_week(date("2025-03-09")), 0);
        assert_eq!(day_of_week(date("2025-03-10")), 1);
        assert_eq!(day_of_week(date("2025-03-15")), 6);
    }

    #[test]
    fn test_day_of_month() {
        assert_eq!(day_of_month(date("2025-03-09")), 9);
        assert_eq!(day_of_month(date("2025-01-31")), 31);
    }

    #[test]
    fn test_names() {
        assert_eq!(day_name(0), "Sunday");
        assert_eq!(day_name(6), "Saturday");
        assert_eq!(day_name(7), "Unknown");
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "Unknown");
    }
}
