//! Lifetime value versus acquisition cost per cohort.

use crate::analyzers::types::{CohortEconomics, CohortRetention, PortfolioSummary, Profitability};
use crate::analyzers::utility::round_to;

/// Expected revenue per user over their lifetime: weekly revenue divided by
/// weekly churn. Zero churn gives 0 rather than an unbounded value.
pub fn lifetime_value(weekly_revenue: f64, churn: f64) -> f64 {
    if churn == 0.0 {
        return 0.0;
    }
    weekly_revenue / churn
}

/// Spend for one week divided by the users acquired that week.
pub fn acquisition_cost(total_spend: f64, weeks: u32, new_users: usize) -> f64 {
    if weeks == 0 || new_users == 0 {
        return 0.0;
    }
    total_spend / f64::from(weeks) / new_users as f64
}

/// Inputs that turn churn into money.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitEconomics {
    pub weekly_revenue_per_user: f64,
    pub marketing_spend: f64,
    pub observed_weeks: u32,
}

/// LTV, CAC and their totals per cohort. A cohort's new users are the
/// users whose first week it is.
pub fn cohort_economics(retention: &[CohortRetention], unit: UnitEconomics) -> Vec<CohortEconomics> {
    retention
        .iter()
        .map(|row| {
            let new_users = row.initial_users;
            let ltv = round_to(lifetime_value(unit.weekly_revenue_per_user, row.churn), 2);
            let cac = round_to(
                acquisition_cost(unit.marketing_spend, unit.observed_weeks, new_users),
                2,
            );
            let total_ltv = round_to(ltv * new_users as f64, 0);
            let total_cac = round_to(cac * new_users as f64, 0);

            CohortEconomics {
                cohort: row.cohort,
                churn: row.churn,
                ltv,
                cac,
                new_users,
                total_ltv,
                total_cac,
                ltv_cac: ratio(total_ltv, total_cac),
            }
        })
        .collect()
}

/// Sums of the cohort totals and the overall LTV/CAC ratio.
pub fn portfolio_summary(economics: &[CohortEconomics]) -> PortfolioSummary {
    let total_ltv: f64 = economics.iter().map(|e| e.total_ltv).sum();
    let total_cac: f64 = economics.iter().map(|e| e.total_cac).sum();
    PortfolioSummary {
        total_ltv,
        total_cac,
        ltv_cac: ratio(total_ltv, total_cac),
    }
}

fn ratio(ltv: f64, cac: f64) -> f64 {
    if cac == 0.0 {
        return 0.0;
    }
    round_to(ltv / cac, 1)
}

/// Revenue to date against marketing spend. Without a configured revenue
/// figure, every weekly active user is assumed to have paid the weekly rate.
pub fn profitability(
    configured_revenue: Option<f64>,
    weekly_active_total: usize,
    unit: UnitEconomics,
) -> Profitability {
    let (revenue, revenue_derived) = match configured_revenue {
        Some(revenue) => (revenue, false),
        None => (weekly_active_total as f64 * unit.weekly_revenue_per_user, true),
    };

    Profitability {
        revenue,
        revenue_derived,
        weekly_active_total,
        marketing_spend: unit.marketing_spend,
        profit: revenue - unit.marketing_spend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::WeekKey;
    use chrono::NaiveDate;

    fn unit() -> UnitEconomics {
        UnitEconomics {
            weekly_revenue_per_user: 2.0,
            marketing_spend: 2000.0,
            observed_weeks: 9,
        }
    }

    fn retention(day: u32, initial_users: usize, churn: f64) -> CohortRetention {
        CohortRetention {
            cohort: WeekKey::of(NaiveDate::from_ymd_opt(2024, 1, day).unwrap()),
            initial_users,
            final_users: 0,
            weeks_elapsed: 1,
            churn,
            extrapolated: false,
        }
    }

    #[test]
    fn test_lifetime_value() {
        assert!((lifetime_value(2.0, 0.10) - 20.0).abs() < 1e-9);
        assert_eq!(lifetime_value(2.0, 0.0), 0.0);
    }

    #[test]
    fn test_acquisition_cost() {
        let cac = acquisition_cost(2000.0, 9, 50);
        assert!((cac - 4.444).abs() < 0.001);
        assert_eq!(round_to(cac, 2), 4.44);
        assert_eq!(acquisition_cost(2000.0, 9, 0), 0.0);
        assert_eq!(acquisition_cost(2000.0, 0, 10), 0.0);
    }

    #[test]
    fn test_cohort_economics_rounding() {
        let rows = cohort_economics(&[retention(1, 50, 0.10)], unit());
        let row = &rows[0];

        assert_eq!(row.ltv, 20.0);
        assert_eq!(row.cac, 4.44);
        assert_eq!(row.total_ltv, 1000.0);
        assert_eq!(row.total_cac, 222.0);
        assert_eq!(row.ltv_cac, 4.5);
    }

    #[test]
    fn test_zero_churn_cohort_has_zero_ltv() {
        let rows = cohort_economics(&[retention(1, 10, 0.0)], unit());
        assert_eq!(rows[0].ltv, 0.0);
        assert_eq!(rows[0].total_ltv, 0.0);
        assert_eq!(rows[0].ltv_cac, 0.0);
    }

    #[test]
    fn test_portfolio_summary() {
        let rows = cohort_economics(
            &[retention(1, 50, 0.10), retention(8, 100, 0.20)],
            unit(),
        );
        let summary = portfolio_summary(&rows);

        // 1000 + 100 * 10.0 ; 222 + 100 * 2.22
        assert_eq!(summary.total_ltv, 2000.0);
        assert_eq!(summary.total_cac, 444.0);
        assert_eq!(summary.ltv_cac, 4.5);
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = portfolio_summary(&[]);
        assert_eq!(summary.total_cac, 0.0);
        assert_eq!(summary.ltv_cac, 0.0);
    }

    #[test]
    fn test_profitability_configured_and_derived() {
        let configured = profitability(Some(1542.0), 700, unit());
        assert_eq!(configured.profit, -458.0);
        assert!(!configured.revenue_derived);

        let derived = profitability(None, 771, unit());
        assert_eq!(derived.revenue, 1542.0);
        assert!(derived.revenue_derived);
        assert_eq!(derived.profit, -458.0);
    }
}
