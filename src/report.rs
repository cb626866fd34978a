//! Markdown rendering of a [`DashboardOutcome`].
//!
//! Tables are pipe tables; charts are text bar series. Nothing is computed
//! here beyond formatting.

use std::fmt::Write;

use crate::analyzers::types::{
    CohortCell, CohortEconomics, Dashboard, DashboardOutcome, WeekdayActivity, WeeklyGrowth,
};

const BAR_WIDTH: usize = 40;

pub fn build_report(outcome: &DashboardOutcome, selection_label: Option<&str>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Usage Analysis");
    let _ = writeln!(output);

    match outcome {
        DashboardOutcome::EmptySource => {
            let _ = writeln!(output, "Original fetched data is empty, check source.");
        }
        DashboardOutcome::EmptySelection { range } => {
            let _ = writeln!(output, "Filtered data empty for {range}.");
        }
        DashboardOutcome::Ready(dashboard) => render_dashboard(&mut output, dashboard, selection_label),
    }

    output
}

fn render_dashboard(output: &mut String, dashboard: &Dashboard, selection_label: Option<&str>) {
    render_kpis(output, dashboard, selection_label);
    render_weekdays(output, &dashboard.weekdays);
    render_profitability(output, dashboard);
    render_cohorts(output, dashboard);
}

fn render_kpis(output: &mut String, dashboard: &Dashboard, selection_label: Option<&str>) {
    let range = &dashboard.kpi.range;
    let growth = &dashboard.kpi.growth;
    let _ = writeln!(output, "## KPI Review");
    match selection_label {
        Some(label) => {
            let _ = writeln!(output, "Selected {label}: {range}");
        }
        None => {
            let _ = writeln!(output, "All weeks: {range}");
        }
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "### Daily Active Users");
    let dau: Vec<(String, f64)> = dashboard
        .kpi
        .daily
        .iter()
        .map(|d| (d.date.format("%Y-%m-%d").to_string(), d.dau as f64))
        .collect();
    bar_chart(output, &dau);

    let _ = writeln!(output, "### WAU, New Users and Inactive Users");
    let _ = writeln!(output, "| Week | WAU | New Users | Users Inactive |");
    let _ = writeln!(output, "|---|---|---|---|");
    for row in growth {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            row.week, row.wau, row.new_users, row.inactive
        );
    }
    let _ = writeln!(output);

    for (title, series) in [
        ("WAU", growth.iter().map(|g| g.wau as f64).collect::<Vec<_>>()),
        ("New Users", growth.iter().map(|g| g.new_users as f64).collect()),
        ("Users Inactive", growth.iter().map(|g| g.inactive as f64).collect()),
    ] {
        let _ = writeln!(output, "#### {title}");
        let points: Vec<(String, f64)> = growth
            .iter()
            .zip(series)
            .map(|(g, v)| (format!("Week {}", g.week), v))
            .collect();
        bar_chart(output, &points);
    }

    if growth.iter().any(|g| g.inactive < 0) {
        let _ = writeln!(
            output,
            "_Note: a negative inactive count means more users returned than the balance accounts for._"
        );
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "### Week-over-Week Percentage Change");
    pct_change_table(output, growth);
}

/// Pivot with weeks as columns and one row per metric.
fn pct_change_table(output: &mut String, growth: &[WeeklyGrowth]) {
    let _ = write!(output, "| Metric |");
    for row in growth {
        let _ = write!(output, " {} |", row.week);
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "|---|{}", "---|".repeat(growth.len()));

    let metrics: [(&str, fn(&WeeklyGrowth) -> f64); 3] = [
        ("WAU_pct_change", |g: &WeeklyGrowth| g.wau_pct_change),
        ("New_Users_pct_change", |g: &WeeklyGrowth| g.new_users_pct_change),
        ("Users_Inactive_pct_change", |g: &WeeklyGrowth| g.inactive_pct_change),
    ];
    for (name, value) in metrics {
        let _ = write!(output, "| {name} |");
        for row in growth {
            let _ = write!(output, " {:.0}% |", value(row));
        }
        let _ = writeln!(output);
    }
    let _ = writeln!(output);
}

fn render_weekdays(output: &mut String, weekdays: &[WeekdayActivity]) {
    let _ = writeln!(output, "### User Activity by Weekday");
    let _ = writeln!(output, "| Weekday | Total Users | New Signups |");
    let _ = writeln!(output, "|---|---|---|");
    for row in weekdays {
        let _ = writeln!(
            output,
            "| {} | {} | {} |",
            row.weekday, row.total_users, row.new_signups
        );
    }
    let _ = writeln!(output);
}

fn render_profitability(output: &mut String, dashboard: &Dashboard) {
    let p = &dashboard.profitability;
    let _ = writeln!(output, "## Profitability Overview");
    let _ = writeln!(output, "Computed over all data, independent of the selected weeks.");
    let _ = writeln!(output);
    let _ = writeln!(output, "| Current Revenue | Marketing Spend | Profit |");
    let _ = writeln!(output, "|---|---|---|");
    let _ = writeln!(
        output,
        "| {} | {} | {} |",
        money(p.revenue),
        money(p.marketing_spend),
        money(p.profit)
    );
    if p.revenue_derived {
        let _ = writeln!(
            output,
            "\nRevenue assumes {} weekly active users at the configured weekly rate.",
            p.weekly_active_total
        );
    }
    let _ = writeln!(output);
}

fn render_cohorts(output: &mut String, dashboard: &Dashboard) {
    let _ = writeln!(output, "## LTV vs CAC by Cohort");
    let _ = writeln!(output, "| Cohort Week | LTV | CAC |");
    let _ = writeln!(output, "|---|---|---|");
    for row in &dashboard.economics {
        let _ = writeln!(output, "| {} | {:.2} | {:.2} |", row.cohort, row.ltv, row.cac);
    }
    let _ = writeln!(output);

    for (title, pick) in [
        ("LTV", (|e: &CohortEconomics| e.ltv) as fn(&CohortEconomics) -> f64),
        ("CAC", |e: &CohortEconomics| e.cac),
    ] {
        let _ = writeln!(output, "#### {title}");
        let points: Vec<(String, f64)> = dashboard
            .economics
            .iter()
            .map(|e| (format!("Cohort {}", e.cohort), pick(e)))
            .collect();
        bar_chart(output, &points);
    }

    if let Some(last) = dashboard.retention.iter().find(|r| r.extrapolated) {
        let _ = writeln!(
            output,
            "Cohort {} has no retention history yet; its churn is the average of the preceding cohorts.",
            last.cohort
        );
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "### User Count per Cohort across Weeks");
    cohort_matrix_table(output, &dashboard.cohort_matrix);

    let _ = writeln!(output, "### Total LTV by Cohort");
    economics_table(output, &dashboard.economics);

    let s = &dashboard.summary;
    let _ = writeln!(output, "## Adjusted Profitability View");
    let _ = writeln!(output, "| LTV | Marketing Spend | LTV/CAC |");
    let _ = writeln!(output, "|---|---|---|");
    let _ = writeln!(
        output,
        "| {} | {} | {:.1} |",
        money(s.total_ltv),
        money(dashboard.profitability.marketing_spend),
        s.ltv_cac
    );
}

fn cohort_matrix_table(output: &mut String, cells: &[CohortCell]) {
    let mut weeks: Vec<_> = cells.iter().map(|c| c.week).collect();
    weeks.sort();
    weeks.dedup();

    let _ = write!(output, "| Cohort |");
    for week in &weeks {
        let _ = write!(output, " {week} |");
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "|---|{}", "---|".repeat(weeks.len()));

    let mut cohorts: Vec<_> = cells.iter().map(|c| c.cohort).collect();
    cohorts.dedup();
    for cohort in cohorts {
        let _ = write!(output, "| {cohort} |");
        for week in &weeks {
            match cells.iter().find(|c| c.cohort == cohort && c.week == *week) {
                Some(cell) => {
                    let _ = write!(output, " {} |", cell.active_users);
                }
                None => {
                    let _ = write!(output, " |");
                }
            }
        }
        let _ = writeln!(output);
    }
    let _ = writeln!(output);
}

fn economics_table(output: &mut String, rows: &[CohortEconomics]) {
    let _ = writeln!(output, "| Cohort Week | LTV | CAC | Total LTV | Total CAC | LTV/CAC |");
    let _ = writeln!(output, "|---|---|---|---|---|---|");
    for row in rows {
        let _ = writeln!(
            output,
            "| {} | {:.2} | {:.2} | {:.0} | {:.0} | {:.1} |",
            row.cohort, row.ltv, row.cac, row.total_ltv, row.total_cac, row.ltv_cac
        );
    }
    let _ = writeln!(output);
}

/// Horizontal bars scaled to the largest value; negatives draw no bar.
fn bar_chart(output: &mut String, points: &[(String, f64)]) {
    let max = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_width = points.iter().map(|(l, _)| l.len()).max().unwrap_or(0);

    let _ = writeln!(output, "```");
    for (label, value) in points {
        let len = if max > 0.0 && *value > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(output, "{label:<label_width$} | {} {value}", "█".repeat(len));
    }
    let _ = writeln!(output, "```");
    let _ = writeln!(output);
}

/// Euro amount with thousands separators and no decimals, e.g. `-€1,458`.
fn money(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-€{grouped}")
    } else {
        format!("€{grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::aggregate::build_dashboard;
    use crate::config::ScenarioConfig;
    use crate::dates::DateRange;
    use crate::events::{EventRecord, UsageData};
    use chrono::NaiveDate;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn ready() -> DashboardOutcome {
        let data = UsageData::from_records(vec![
            EventRecord::new("a", d(1, 1)),
            EventRecord::new("b", d(1, 2)),
            EventRecord::new("a", d(1, 9)),
            EventRecord::new("c", d(1, 10)),
        ]);
        build_dashboard(&data, DateRange::new(d(1, 1), d(3, 3)), &ScenarioConfig::default())
    }

    #[test]
    fn test_empty_source_message_only() {
        let report = build_report(&DashboardOutcome::EmptySource, None);
        assert!(report.contains("Original fetched data is empty"));
        assert!(!report.contains("KPI Review"));
    }

    #[test]
    fn test_empty_selection_message_only() {
        let range = DateRange::new(d(2, 5), d(2, 11));
        let report = build_report(&DashboardOutcome::EmptySelection { range }, Some("Week 6"));
        assert!(report.contains("Filtered data empty for 2024-02-05 to 2024-02-11"));
        assert!(!report.contains("LTV"));
    }

    #[test]
    fn test_report_sections_present() {
        let report = build_report(&ready(), None);
        for section in [
            "## KPI Review",
            "### Daily Active Users",
            "### Week-over-Week Percentage Change",
            "### User Activity by Weekday",
            "## Profitability Overview",
            "## LTV vs CAC by Cohort",
            "### User Count per Cohort across Weeks",
            "### Total LTV by Cohort",
            "## Adjusted Profitability View",
        ] {
            assert!(report.contains(section), "missing {section}");
        }
    }

    #[test]
    fn test_pct_change_pivot_rows() {
        let report = build_report(&ready(), None);
        assert!(report.contains("| Metric | 1 | 2 |"));
        assert!(report.contains("| WAU_pct_change | 0% | 0% |"));
        assert!(report.contains("| New_Users_pct_change | 0% | -50% |"));
    }

    #[test]
    fn test_cohort_ltv_and_cac_charted() {
        let report = build_report(&ready(), None);
        let cohorts = &report[report.find("## LTV vs CAC by Cohort").unwrap()..];
        let cac = &cohorts[cohorts.find("#### CAC").unwrap()..];
        let bars: Vec<usize> = cac
            .lines()
            .filter(|l| l.starts_with("Cohort ") && l.contains(" | "))
            .map(|l| l.matches('█').count())
            .collect();
        // cohort 2 has half the signups, so twice the CAC
        assert_eq!(bars, vec![BAR_WIDTH / 2, BAR_WIDTH]);
        assert!(cohorts.find("#### LTV").unwrap() < cohorts.find("#### CAC").unwrap());
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1542.0), "€1,542");
        assert_eq!(money(-458.0), "-€458");
        assert_eq!(money(1234567.4), "€1,234,567");
        assert_eq!(money(0.0), "€0");
    }

    #[test]
    fn test_bar_chart_scales_to_max() {
        let mut out = String::new();
        bar_chart(&mut out, &[("a".to_string(), 10.0), ("b".to_string(), 5.0), ("c".to_string(), -1.0)]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[2].matches('█').count(), BAR_WIDTH / 2);
        assert_eq!(lines[3].matches('█').count(), 0);
    }
}
