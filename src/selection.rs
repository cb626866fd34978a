//! Week picker: lists the selectable weeks of the report period and turns
//! a selection into the date range used by the KPI views.

use anyhow::{Result, bail};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::dates::DateRange;

/// A selectable week, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekOption {
    pub index: usize,
    pub monday: NaiveDate,
}

impl WeekOption {
    pub fn label(&self) -> String {
        format!("Week {}", self.index)
    }
}

/// One option per Monday inside `range`.
pub fn week_options(range: DateRange) -> Vec<WeekOption> {
    let offset = (7 - range.start.weekday().num_days_from_monday()) % 7;
    let first = range.start + Duration::days(i64::from(offset));
    debug_assert_eq!(first.weekday(), Weekday::Mon);

    first
        .iter_weeks()
        .take_while(|monday| *monday <= range.end)
        .enumerate()
        .map(|(i, monday)| WeekOption { index: i + 1, monday })
        .collect()
}

/// Parses `"3"` or `"Week 3"` into a week index.
pub fn parse_week_label(raw: &str) -> Result<usize> {
    let trimmed = raw.trim();
    let number = trimmed
        .strip_prefix("Week")
        .or_else(|| trimmed.strip_prefix("week"))
        .unwrap_or(trimmed)
        .trim();

    match number.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => bail!("invalid week '{raw}', expected a number such as 3 or 'Week 3'"),
    }
}

/// Range spanning the Monday of the earliest selected week through the
/// Sunday of the latest one. `None` when nothing is selected.
pub fn selected_range(options: &[WeekOption], selected: &[usize]) -> Result<Option<DateRange>> {
    if selected.is_empty() {
        return Ok(None);
    }

    let mut picked = Vec::with_capacity(selected.len());
    for index in selected {
        match options.iter().find(|o| o.index == *index) {
            Some(option) => picked.push(option),
            None => bail!("Week {index} is not available (1..={})", options.len()),
        }
    }

    let first = picked.iter().map(|o| o.monday).min();
    let last = picked.iter().map(|o| o.monday).max();
    match (first, last) {
        (Some(start), Some(last)) => Ok(Some(DateRange::new(start, last + Duration::days(6)))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn nine_weeks() -> Vec<WeekOption> {
        week_options(DateRange::new(d(1, 1), d(3, 3)))
    }

    #[test]
    fn test_nine_mondays_in_period() {
        let options = nine_weeks();
        assert_eq!(options.len(), 9);
        assert_eq!(options[0].monday, d(1, 1));
        assert_eq!(options[8].monday, d(2, 26));
        assert_eq!(options[8].label(), "Week 9");
    }

    #[test]
    fn test_options_skip_to_first_monday() {
        let options = week_options(DateRange::new(d(1, 3), d(1, 31)));
        assert_eq!(options[0].monday, d(1, 8));
        assert_eq!(options.len(), 4);
    }

    #[test]
    fn test_selection_spans_min_to_max_week() {
        let range = selected_range(&nine_weeks(), &[4, 2]).unwrap().unwrap();
        assert_eq!(range, DateRange::new(d(1, 8), d(1, 28)));
    }

    #[test]
    fn test_empty_selection() {
        assert_eq!(selected_range(&nine_weeks(), &[]).unwrap(), None);
    }

    #[test]
    fn test_unknown_week_rejected() {
        assert!(selected_range(&nine_weeks(), &[10]).is_err());
    }

    #[test]
    fn test_parse_week_label() {
        assert_eq!(parse_week_label("3").unwrap(), 3);
        assert_eq!(parse_week_label("Week 7").unwrap(), 7);
        assert_eq!(parse_week_label(" week 2 ").unwrap(), 2);
        assert!(parse_week_label("0").is_err());
        assert!(parse_week_label("Tuesday").is_err());
    }
}
