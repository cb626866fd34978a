//! Tables produced by the aggregation pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::dates::{DateRange, WeekKey};

/// Distinct users active on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyActive {
    pub date: NaiveDate,
    pub dau: usize,
}

/// One row of the weekly growth table.
///
/// `inactive = prev_wau + new_users - wau` always holds and is never clamped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyGrowth {
    pub week: WeekKey,
    pub wau: usize,
    pub new_users: usize,
    pub prev_wau: usize,
    pub inactive: i64,
    /// Percent changes, rounded to whole numbers.
    pub wau_pct_change: f64,
    pub new_users_pct_change: f64,
    pub inactive_pct_change: f64,
}

/// Distinct users and first-day sign-ups seen on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayActivity {
    pub weekday: &'static str,
    pub total_users: usize,
    pub new_signups: usize,
}

/// Distinct users of `cohort` active in `week`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortCell {
    pub cohort: WeekKey,
    pub week: WeekKey,
    pub active_users: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortRetention {
    pub cohort: WeekKey,
    /// Active users in the cohort's own week.
    pub initial_users: usize,
    /// Active users in the last observed week.
    pub final_users: usize,
    pub weeks_elapsed: i64,
    /// Implied weekly churn rate (0.0..=1.0).
    pub churn: f64,
    /// Churn borrowed from earlier cohorts rather than observed.
    pub extrapolated: bool,
}

/// Per-cohort unit economics. Currency values are rounded the way they
/// are displayed: per-user to cents, totals to whole units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortEconomics {
    pub cohort: WeekKey,
    pub churn: f64,
    pub ltv: f64,
    pub cac: f64,
    pub new_users: usize,
    pub total_ltv: f64,
    pub total_cac: f64,
    pub ltv_cac: f64,
}

/// Totals across all cohorts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_ltv: f64,
    pub total_cac: f64,
    pub ltv_cac: f64,
}

/// Headline revenue versus spend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profitability {
    pub revenue: f64,
    /// True when revenue was computed from weekly actives instead of configured.
    pub revenue_derived: bool,
    pub weekly_active_total: usize,
    pub marketing_spend: f64,
    pub profit: f64,
}

/// Views that follow the week selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiView {
    pub range: DateRange,
    pub daily: Vec<DailyActive>,
    pub growth: Vec<WeeklyGrowth>,
}

/// Everything the report shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub generated_at: DateTime<Utc>,
    pub total_events: usize,
    pub kpi: KpiView,
    /// Computed over the full dataset.
    pub weekdays: Vec<WeekdayActivity>,
    pub profitability: Profitability,
    pub cohort_matrix: Vec<CohortCell>,
    pub retention: Vec<CohortRetention>,
    pub economics: Vec<CohortEconomics>,
    pub summary: PortfolioSummary,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardOutcome {
    /// Nothing came back from the endpoint.
    EmptySource,
    /// Data exists but none of it falls inside the selected range.
    EmptySelection { range: DateRange },
    Ready(Box<Dashboard>),
}
