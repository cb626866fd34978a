//! CLI entry point for the usage dashboard.
//!
//! Provides subcommands for fetching usage events, listing the selectable
//! weeks, and producing the KPI / cohort LTV-vs-CAC report.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use usage_dashboard::{
    analyzers::{aggregate::build_dashboard, types::DashboardOutcome},
    cache::{Provenance, UsageCache},
    config::ScenarioConfig,
    events::{EventRecord, UsageData},
    fetch::{BasicClient, DateWindows, HttpPageSource},
    output::{ENRICHED_BACKUP, RAW_BACKUP, print_pretty, write_enriched_backup, write_json},
    report::build_report,
    selection::{parse_week_label, selected_range, week_options},
};

#[derive(Parser)]
#[command(name = "usage_dashboard")]
#[command(
    about = "Fetch usage events and report active users, cohorts and LTV vs CAC",
    long_about = None
)]
struct Cli {
    /// Base URL of the usage endpoint
    #[arg(long, env = "USAGE_API_URL", global = true)]
    url: Option<String>,

    /// JSON file with date ranges and business constants
    #[arg(long, env = "DASHBOARD_CONFIG", global = true)]
    config: Option<String>,

    /// Raw backup CSV, reused instead of fetching when present
    #[arg(long, default_value = RAW_BACKUP, global = true)]
    backup: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every window from the endpoint and overwrite the raw backup
    Fetch,
    /// List the weeks that can be selected for the KPI views
    Weeks,
    /// Aggregate usage data and write the report
    Report {
        /// Weeks to include in the KPI views, e.g. `--weeks 2,3` (default: all)
        #[arg(short, long, visible_alias = "week", value_delimiter = ',')]
        weeks: Vec<String>,

        /// Ignore the raw backup and fetch again
        #[arg(long, default_value_t = false)]
        refresh: bool,

        /// Markdown file to write the report to
        #[arg(short, long, default_value = "report.md")]
        out: String,

        /// Optional: also write every computed table to this JSON file
        #[arg(long)]
        json: Option<String>,

        /// Enriched backup CSV written after a successful run
        #[arg(long, default_value = ENRICHED_BACKUP)]
        enriched_backup: String,

        /// Override the total marketing spend
        #[arg(long)]
        marketing_spend: Option<f64>,

        /// Override the weekly revenue per active user
        #[arg(long)]
        weekly_revenue: Option<f64>,

        /// Override the revenue to date instead of deriving it
        #[arg(long)]
        current_revenue: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/usage_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("usage_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ScenarioConfig::load(path)?,
        None => ScenarioConfig::default(),
    };
    let cache = UsageCache::new(&cli.backup);

    match cli.command {
        Commands::Fetch => {
            let (records, provenance) =
                load_events(cli.url.as_deref(), &cache, &config, true).await?;
            if let Provenance::Fetched { succeeded, failed } = provenance {
                info!(
                    rows = records.len(),
                    succeeded,
                    failed,
                    backup = cache.path(),
                    "Fetch complete"
                );
            }
        }
        Commands::Weeks => {
            let range = config.report_range();
            let options = week_options(range);
            info!(total = options.len(), range = %range, "Selectable weeks");
            for option in &options {
                info!(
                    week = %option.label(),
                    monday = %option.monday.format("%Y-%m-%d"),
                    "Week"
                );
            }
        }
        Commands::Report {
            weeks,
            refresh,
            out,
            json,
            enriched_backup,
            marketing_spend,
            weekly_revenue,
            current_revenue,
        } => {
            if let Some(spend) = marketing_spend {
                config.marketing_spend = spend;
            }
            if let Some(revenue) = weekly_revenue {
                config.weekly_revenue_per_user = revenue;
            }
            if current_revenue.is_some() {
                config.current_revenue = current_revenue;
            }

            let options = week_options(config.report_range());
            let indices = weeks
                .iter()
                .map(|w| parse_week_label(w))
                .collect::<Result<Vec<_>>>()?;
            let selection = selected_range(&options, &indices)?;
            let label = selection.map(|_| {
                let names: Vec<String> = indices.iter().map(|i| format!("Week {i}")).collect();
                names.join(", ")
            });
            let range = selection.unwrap_or_else(|| config.report_range());
            if let Some(label) = &label {
                info!(weeks = %label, range = %range, "Week selection");
            }

            let (records, _) = load_events(cli.url.as_deref(), &cache, &config, refresh).await?;
            let data = UsageData::from_records(records);
            let outcome = build_dashboard(&data, range, &config);

            let report = build_report(&outcome, label.as_deref());
            std::fs::write(&out, report).with_context(|| format!("failed to write {out}"))?;
            info!(path = %out, "Report written");

            if let DashboardOutcome::Ready(_) = &outcome {
                write_enriched_backup(&enriched_backup, data.events())?;
            }
            if let Some(path) = json {
                write_json(&path, &outcome)?;
            }
            print_pretty(&outcome);
        }
    }

    Ok(())
}

/// Returns usage events from the raw backup, or from the endpoint when the
/// backup is missing or `refresh` is set.
async fn load_events(
    url: Option<&str>,
    cache: &UsageCache,
    config: &ScenarioConfig,
    refresh: bool,
) -> Result<(Vec<EventRecord>, Provenance)> {
    let windows = DateWindows::new(config.fetch_range(), config.window_days);

    match url {
        Some(url) => {
            let source = HttpPageSource::new(BasicClient::new()?, url);
            cache.load_or_fetch(&source, windows, refresh).await
        }
        None if !refresh => match cache.load()? {
            Some(records) => {
                warn!("USAGE_API_URL not set, using cached usage data");
                Ok((records, Provenance::Cache))
            }
            None => bail!(
                "no cached data at {} and USAGE_API_URL is not set",
                cache.path()
            ),
        },
        None => bail!("USAGE_API_URL must be set to fetch usage data"),
    }
}
