//! Calendar helpers shared by the fetcher, the aggregator and the week picker.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;
use std::fmt;

/// Weekdays in reporting order.
pub const WEEKDAY_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// An inclusive `[start, end]` span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, counting both ends. Zero for an inverted range.
    pub fn num_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// An ISO week, identified by the Monday it starts on.
///
/// Ordering follows the calendar, so the minimum over a set of keys is the
/// earliest week even when the set spans a year boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WeekKey {
    monday: NaiveDate,
}

impl WeekKey {
    /// The ISO week `date` falls in.
    pub fn of(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        Self {
            monday: date - Duration::days(offset),
        }
    }

    pub fn monday(&self) -> NaiveDate {
        self.monday
    }

    /// ISO week number (1..=53).
    pub fn number(&self) -> u32 {
        self.monday.iso_week().week()
    }

    /// Whole weeks from `self` to `later`; negative when `later` is earlier.
    pub fn weeks_until(&self, later: WeekKey) -> i64 {
        (later.monday - self.monday).num_days() / 7
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Parses the day an event happened on.
///
/// Accepts plain `YYYY-MM-DD`, RFC 3339 timestamps and `YYYY-MM-DD HH:MM:SS`;
/// any time-of-day component is dropped.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.date());
    }

    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Full English weekday name, e.g. `"Monday"`.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_key_starts_on_monday() {
        // 2024-01-07 is a Sunday in ISO week 1
        let week = WeekKey::of(d(2024, 1, 7));
        assert_eq!(week.monday(), d(2024, 1, 1));
        assert_eq!(week.number(), 1);
        assert_eq!(WeekKey::of(d(2024, 1, 8)).number(), 2);
    }

    #[test]
    fn test_week_key_orders_across_year_boundary() {
        let late = WeekKey::of(d(2023, 12, 27));
        let early = WeekKey::of(d(2024, 1, 3));
        assert!(late < early);
        assert_eq!(late.weeks_until(early), 1);
        assert_eq!(early.weeks_until(late), -1);
    }

    #[test]
    fn test_parse_event_date_formats() {
        assert_eq!(parse_event_date("2024-02-29"), Some(d(2024, 2, 29)));
        assert_eq!(
            parse_event_date("2024-02-29T23:10:00.000Z"),
            Some(d(2024, 2, 29))
        );
        assert_eq!(
            parse_event_date("2024-02-29 08:00:00"),
            Some(d(2024, 2, 29))
        );
        assert_eq!(parse_event_date("not a date"), None);
    }

    #[test]
    fn test_date_range_bounds() {
        let range = DateRange::new(d(2024, 1, 1), d(2024, 3, 3));
        assert_eq!(range.num_days(), 63);
        assert!(range.contains(d(2024, 1, 1)));
        assert!(range.contains(d(2024, 3, 3)));
        assert!(!range.contains(d(2024, 3, 4)));
        assert_eq!(range.to_string(), "2024-01-01 to 2024-03-03");
    }
}
