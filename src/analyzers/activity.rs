//! Daily and weekly active users, new users, and the weekly growth table.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use crate::analyzers::types::{DailyActive, WeeklyGrowth};
use crate::analyzers::utility::{pct_change, round_to};
use crate::dates::WeekKey;
use crate::events::EnrichedEvent;

/// Counts distinct users per key, keys in ascending order.
pub(crate) fn distinct_users_by<'a, K, I, F>(events: I, key: F) -> BTreeMap<K, usize>
where
    K: Ord + Hash + Clone,
    I: IntoIterator<Item = &'a EnrichedEvent>,
    F: Fn(&EnrichedEvent) -> K,
{
    let mut seen: BTreeMap<K, HashSet<&'a str>> = BTreeMap::new();
    for event in events {
        seen.entry(key(event)).or_default().insert(event.user_id());
    }
    seen.into_iter().map(|(k, users)| (k, users.len())).collect()
}

/// DAU per calendar date.
pub fn daily_active(events: &[EnrichedEvent]) -> Vec<DailyActive> {
    distinct_users_by(events, |e| e.date())
        .into_iter()
        .map(|(date, dau): (NaiveDate, usize)| DailyActive { date, dau })
        .collect()
}

/// WAU per ISO week.
pub fn weekly_active(events: &[EnrichedEvent]) -> BTreeMap<WeekKey, usize> {
    distinct_users_by(events, |e| e.week)
}

/// Distinct users seen on their first-ever day, per week.
pub fn new_users_by_week(events: &[EnrichedEvent]) -> BTreeMap<WeekKey, usize> {
    distinct_users_by(events.iter().filter(|e| e.is_new_user), |e| e.week)
}

/// Growth table over the weeks that have any activity in `events`.
///
/// The first row's previous WAU is 0, so its inactive count is
/// `new_users - wau`.
pub fn weekly_growth(events: &[EnrichedEvent]) -> Vec<WeeklyGrowth> {
    let wau = weekly_active(events);
    let new_users = new_users_by_week(events);

    let mut rows: Vec<WeeklyGrowth> = Vec::with_capacity(wau.len());
    for (week, wau) in wau {
        let new_users = new_users.get(&week).copied().unwrap_or(0);
        let prev = rows.last();
        let prev_wau = prev.map_or(0, |r| r.wau);
        let inactive = prev_wau as i64 + new_users as i64 - wau as i64;

        let wau_pct_change = pct_change(prev.map(|r| r.wau as f64), wau as f64);
        let new_users_pct_change = pct_change(prev.map(|r| r.new_users as f64), new_users as f64);
        let inactive_pct_change = pct_change(prev.map(|r| r.inactive as f64), inactive as f64);

        rows.push(WeeklyGrowth {
            week,
            wau,
            new_users,
            prev_wau,
            inactive,
            wau_pct_change: round_to(wau_pct_change, 0),
            new_users_pct_change: round_to(new_users_pct_change, 0),
            inactive_pct_change: round_to(inactive_pct_change, 0),
        });
    }

    rows
}
