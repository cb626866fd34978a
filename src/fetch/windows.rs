use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::dates::DateRange;

/// Largest span the endpoint serves in one call.
pub const DEFAULT_WINDOW_DAYS: u32 = 20;

/// One inclusive request window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    /// Value sent as `end_date`; the endpoint treats it as exclusive.
    pub fn query_end(&self) -> NaiveDate {
        self.end + Duration::days(1)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Finite iterator of consecutive windows covering a date range.
///
/// Cloning yields an independent iterator that starts from the same
/// position, so a sequence can be replayed.
#[derive(Debug, Clone)]
pub struct DateWindows {
    next_start: NaiveDate,
    end: NaiveDate,
    span_days: i64,
}

impl DateWindows {
    /// Windows of at most `window_days` days. A zero size is treated as one day.
    pub fn new(range: DateRange, window_days: u32) -> Self {
        Self {
            next_start: range.start,
            end: range.end,
            span_days: i64::from(window_days.max(1)),
        }
    }
}

impl Iterator for DateWindows {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        if self.next_start > self.end {
            return None;
        }

        let start = self.next_start;
        let end = (start + Duration::days(self.span_days - 1)).min(self.end);
        self.next_start = end + Duration::days(1);

        Some(Window { start, end })
    }
}
