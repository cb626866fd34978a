//! Cohort matrix and retention-based churn.

use std::collections::{BTreeMap, BTreeSet};

use crate::analyzers::activity::distinct_users_by;
use crate::analyzers::types::{CohortCell, CohortRetention};
use crate::analyzers::utility::mean;
use crate::dates::WeekKey;
use crate::events::EnrichedEvent;

/// Distinct active users per (cohort, week), ordered by cohort then week.
pub fn cohort_matrix(events: &[EnrichedEvent]) -> Vec<CohortCell> {
    cohort_counts(events)
        .into_iter()
        .map(|((cohort, week), active_users)| CohortCell {
            cohort,
            week,
            active_users,
        })
        .collect()
}

fn cohort_counts(events: &[EnrichedEvent]) -> BTreeMap<(WeekKey, WeekKey), usize> {
    distinct_users_by(events, |e| (e.cohort, e.week))
}

/// Weekly churn implied by decay from `initial` to `remaining` users over
/// `weeks_elapsed` weeks: `1 - (remaining / initial)^(1 / weeks_elapsed)`.
///
/// Zero when either count is zero or no time has passed.
pub fn implied_churn(initial: usize, remaining: usize, weeks_elapsed: i64) -> f64 {
    if initial == 0 || remaining == 0 || weeks_elapsed <= 0 {
        return 0.0;
    }
    1.0 - (remaining as f64 / initial as f64).powf(1.0 / weeks_elapsed as f64)
}

/// Retention and churn per cohort, measured against the last week present
/// in `events`.
///
/// A cohort that starts in that last week has nothing to measure yet; its
/// churn is the mean of the `lookback` cohorts before it.
pub fn cohort_retention(events: &[EnrichedEvent], lookback: usize) -> Vec<CohortRetention> {
    let Some(terminal) = events.iter().map(|e| e.week).max() else {
        return Vec::new();
    };

    let counts = cohort_counts(events);
    let cohorts: BTreeSet<WeekKey> = events.iter().map(|e| e.cohort).collect();

    let mut rows: Vec<CohortRetention> = cohorts
        .into_iter()
        .map(|cohort| {
            let initial_users = counts.get(&(cohort, cohort)).copied().unwrap_or(0);
            let final_users = counts.get(&(cohort, terminal)).copied().unwrap_or(0);
            let weeks_elapsed = cohort.weeks_until(terminal);
            CohortRetention {
                cohort,
                initial_users,
                final_users,
                weeks_elapsed,
                churn: implied_churn(initial_users, final_users, weeks_elapsed),
                extrapolated: false,
            }
        })
        .collect();

    let n = rows.len();
    if n > 0 && rows[n - 1].weeks_elapsed == 0 {
        let earlier: Vec<f64> = rows[(n - 1).saturating_sub(lookback)..n - 1]
            .iter()
            .map(|r| r.churn)
            .collect();
        rows[n - 1].churn = mean(&earlier);
        rows[n - 1].extrapolated = true;
    }

    rows
}
