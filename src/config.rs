//! Scenario inputs: date ranges and the business constants behind the
//! profitability and LTV/CAC figures.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::DateRange;
use crate::fetch::DEFAULT_WINDOW_DAYS;

/// Every field is optional in the file; missing ones take the defaults below.
///
/// ```json
/// {
///   "marketing_spend": 2500.0,
///   "weekly_revenue_per_user": 2.5,
///   "fetch_end": "2024-03-04"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// First day requested from the endpoint.
    pub fetch_start: NaiveDate,
    /// Last day requested from the endpoint.
    pub fetch_end: NaiveDate,
    /// Maximum days per request.
    pub window_days: u32,
    /// First day offered by the week picker.
    pub report_start: NaiveDate,
    /// Last day shown when no weeks are selected.
    pub report_end: NaiveDate,
    /// Average revenue one active user brings in per week.
    pub weekly_revenue_per_user: f64,
    /// Total marketing spend over the observed period.
    pub marketing_spend: f64,
    /// Number of weeks the marketing spend is spread over.
    pub observed_weeks: u32,
    /// Revenue to date. Derived from weekly active users when unset.
    pub current_revenue: Option<f64>,
    /// How many earlier cohorts stand in for the newest cohort's churn.
    pub churn_lookback: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            fetch_start: ymd(2024, 1, 1),
            fetch_end: ymd(2024, 3, 4),
            window_days: DEFAULT_WINDOW_DAYS,
            report_start: ymd(2024, 1, 1),
            report_end: ymd(2024, 3, 3),
            weekly_revenue_per_user: 2.0,
            marketing_spend: 2000.0,
            observed_weeks: 9,
            current_revenue: None,
            churn_lookback: 3,
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

impl ScenarioConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario config '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("invalid scenario config '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch_end < self.fetch_start {
            anyhow::bail!("fetch_end {} is before fetch_start {}", self.fetch_end, self.fetch_start);
        }
        if self.report_end < self.report_start {
            anyhow::bail!(
                "report_end {} is before report_start {}",
                self.report_end,
                self.report_start
            );
        }
        if self.window_days == 0 {
            anyhow::bail!("window_days must be at least 1");
        }
        Ok(())
    }

    pub fn fetch_range(&self) -> DateRange {
        DateRange::new(self.fetch_start, self.fetch_end)
    }

    pub fn report_range(&self) -> DateRange {
        DateRange::new(self.report_start, self.report_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_nine_week_period() {
        let config = ScenarioConfig::default();
        assert_eq!(config.fetch_range().num_days(), 64);
        assert_eq!(config.report_range().num_days(), 63);
        assert_eq!(config.observed_weeks, 9);
        assert_eq!(config.current_revenue, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config =
            ScenarioConfig::from_json(r#"{"marketing_spend": 3000, "current_revenue": 1542}"#)
                .unwrap();
        assert_eq!(config.marketing_spend, 3000.0);
        assert_eq!(config.current_revenue, Some(1542.0));
        assert_eq!(config.weekly_revenue_per_user, 2.0);
        assert_eq!(config.window_days, 20);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = ScenarioConfig::from_json(r#"{"fetch_start": "2024-05-01"}"#).unwrap_err();
        assert!(err.to_string().contains("fetch_end"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScenarioConfig::load("/nonexistent/scenario.json").unwrap_err();
        assert!(err.to_string().contains("scenario.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        std::fs::write(&path, r#"{"observed_weeks": 12}"#).unwrap();

        let config = ScenarioConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.observed_weeks, 12);
    }
}
