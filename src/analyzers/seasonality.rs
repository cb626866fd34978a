use crate::analyzers::activity::distinct_users_by;
use crate::analyzers::types::WeekdayActivity;
use crate::dates::{WEEKDAY_ORDER, weekday_name};
use crate::events::EnrichedEvent;

/// Distinct users and first-day sign-ups per weekday, Monday first.
/// Weekdays with no activity at all are left out.
pub fn weekday_activity(events: &[EnrichedEvent]) -> Vec<WeekdayActivity> {
    let totals = distinct_users_by(events, |e| e.weekday().num_days_from_monday());
    let signups = distinct_users_by(events.iter().filter(|e| e.is_new_user), |e| {
        e.weekday().num_days_from_monday()
    });

    WEEKDAY_ORDER
        .iter()
        .filter_map(|day| {
            let idx = day.num_days_from_monday();
            let total_users = *totals.get(&idx)?;
            Some(WeekdayActivity {
                weekday: weekday_name(*day),
                total_users,
                new_signups: signups.get(&idx).copied().unwrap_or(0),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventRecord, UsageData};
    use chrono::NaiveDate;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[test]
    fn test_weekdays_ordered_monday_first() {
        // Sunday, Wednesday, Monday, Friday in scrambled input order
        let data = UsageData::from_records(vec![
            EventRecord::new("a", d(1, 7)),
            EventRecord::new("b", d(1, 3)),
            EventRecord::new("c", d(1, 1)),
            EventRecord::new("d", d(1, 5)),
        ]);

        let names: Vec<&str> = weekday_activity(data.events())
            .iter()
            .map(|w| w.weekday)
            .collect();
        assert_eq!(names, vec!["Monday", "Wednesday", "Friday", "Sunday"]);
    }

    #[test]
    fn test_signups_counted_only_on_first_day() {
        let data = UsageData::from_records(vec![
            EventRecord::new("a", d(1, 1)),
            EventRecord::new("a", d(1, 8)),
            EventRecord::new("b", d(1, 8)),
        ]);

        let rows = weekday_activity(data.events());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].weekday, "Monday");
        assert_eq!(rows[0].total_users, 2);
        assert_eq!(rows[0].new_signups, 2);
    }
}
