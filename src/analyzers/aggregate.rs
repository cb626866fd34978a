use chrono::Utc;
use tracing::{debug, info, warn};

use crate::analyzers::activity::{daily_active, weekly_active, weekly_growth};
use crate::analyzers::cohort::{cohort_matrix, cohort_retention};
use crate::analyzers::ltv::{UnitEconomics, cohort_economics, portfolio_summary, profitability};
use crate::analyzers::seasonality::weekday_activity;
use crate::analyzers::types::{Dashboard, DashboardOutcome, KpiView};
use crate::config::ScenarioConfig;
use crate::dates::DateRange;
use crate::events::UsageData;

/// Runs every aggregation over `data`.
///
/// Daily and weekly KPIs only see events inside `selection`; weekday,
/// cohort and LTV/CAC views always use the full dataset.
pub fn build_dashboard(
    data: &UsageData,
    selection: DateRange,
    config: &ScenarioConfig,
) -> DashboardOutcome {
    if data.is_empty() {
        warn!("No usage events to aggregate");
        return DashboardOutcome::EmptySource;
    }

    let selected = data.within(selection);
    if selected.is_empty() {
        warn!(range = %selection, "Selected range has no events");
        return DashboardOutcome::EmptySelection { range: selection };
    }

    let all = data.events();
    debug!(total = data.len(), selected = selected.len(), "Aggregating events");

    let kpi = KpiView {
        range: selection,
        daily: daily_active(selected),
        growth: weekly_growth(selected),
    };

    let unit = UnitEconomics {
        weekly_revenue_per_user: config.weekly_revenue_per_user,
        marketing_spend: config.marketing_spend,
        observed_weeks: config.observed_weeks,
    };

    let weekly_active_total = weekly_active(all).values().sum();
    let retention = cohort_retention(all, config.churn_lookback);
    let economics = cohort_economics(&retention, unit);
    let summary = portfolio_summary(&economics);

    let negative_weeks = kpi.growth.iter().filter(|g| g.inactive < 0).count();
    if negative_weeks > 0 {
        warn!(weeks = negative_weeks, "Inactive user balance went negative");
    }

    info!(
        cohorts = retention.len(),
        total_ltv = summary.total_ltv,
        total_cac = summary.total_cac,
        ltv_cac = summary.ltv_cac,
        "Dashboard aggregated"
    );

    DashboardOutcome::Ready(Box::new(Dashboard {
        generated_at: Utc::now(),
        total_events: data.len(),
        kpi,
        weekdays: weekday_activity(all),
        profitability: profitability(config.current_revenue, weekly_active_total, unit),
        cohort_matrix: cohort_matrix(all),
        retention,
        economics,
        summary,
    }))
}
