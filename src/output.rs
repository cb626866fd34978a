//! Backup spreadsheets and structured dumps of the dashboard.
//!
//! Backups are CSV: the raw fetch result, and the enriched dataset with the
//! derived cohort columns appended.

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::analyzers::types::DashboardOutcome;
use crate::dates::{parse_event_date, weekday_name};
use crate::events::{EnrichedEvent, EventRecord};

pub const RAW_BACKUP: &str = "usage_data.csv";
pub const ENRICHED_BACKUP: &str = "usage_enriched.csv";

const ENRICHED_COLUMNS: [&str; 5] = [
    "week",
    "cohort_week",
    "first_activity_date",
    "is_new_user",
    "weekday",
];

/// Logs the outcome using Rust's debug pretty-print format.
pub fn print_pretty(outcome: &DashboardOutcome) {
    debug!("{:#?}", outcome);
}

/// Writes any serialisable value to `path` as pretty-printed JSON.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    std::fs::write(path, body).with_context(|| format!("failed to write {path}"))?;
    info!(path, "JSON written");
    Ok(())
}

/// Writes the raw records, one row each. Extra fields become extra columns
/// in name order; records lacking a field leave the cell empty.
#[tracing::instrument(skip(records), fields(rows = records.len()))]
pub fn write_backup(path: &str, records: &[EventRecord]) -> Result<()> {
    let extras = extra_columns(records.iter());
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("failed to create {path}"))?;

    writer.write_record(header(&extras, &[]))?;
    for record in records {
        writer.write_record(base_cells(record, &extras))?;
    }
    writer.flush()?;

    info!("Raw backup written");
    Ok(())
}

/// Writes the enriched dataset: raw columns followed by the derived ones.
#[tracing::instrument(skip(events), fields(rows = events.len()))]
pub fn write_enriched_backup(path: &str, events: &[EnrichedEvent]) -> Result<()> {
    let extras = extra_columns(events.iter().map(|e| &e.record));
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("failed to create {path}"))?;

    writer.write_record(header(&extras, &ENRICHED_COLUMNS))?;
    for event in events {
        let mut row = base_cells(&event.record, &extras);
        row.push(event.week.number().to_string());
        row.push(event.cohort.number().to_string());
        row.push(event.first_activity_date.format("%Y-%m-%d").to_string());
        row.push(event.is_new_user.to_string());
        row.push(weekday_name(event.weekday()).to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;

    info!("Enriched backup written");
    Ok(())
}

/// Reads a raw backup back into records.
///
/// # Errors
///
/// Fails when the file is unreadable, lacks a `user_id` or `date` column,
/// or a row has an unparseable date.
pub fn read_backup(path: &str) -> Result<Vec<EventRecord>> {
    let mut reader = ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("failed to open {path}"))?;

    let headers = reader.headers()?.clone();
    let user_col = column(&headers, "user_id", path)?;
    let date_col = column(&headers, "date", path)?;

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let raw_date = row.get(date_col).unwrap_or_default();
        let Some(date) = parse_event_date(raw_date) else {
            bail!("{path}: row {} has unrecognised date '{raw_date}'", line + 1);
        };

        let extra: BTreeMap<String, Value> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != user_col && *i != date_col)
            .filter_map(|(i, name)| {
                let cell = row.get(i)?;
                (!cell.is_empty()).then(|| (name.to_string(), cell_value(cell)))
            })
            .collect();

        records.push(EventRecord {
            user_id: row.get(user_col).unwrap_or_default().to_string(),
            date,
            extra,
        });
    }

    debug!(path, rows = records.len(), "Backup read");
    Ok(records)
}

fn column(headers: &StringRecord, name: &str, path: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .with_context(|| format!("{path} has no '{name}' column"))
}

fn extra_columns<'a>(records: impl Iterator<Item = &'a EventRecord>) -> Vec<String> {
    let names: BTreeSet<&String> = records.flat_map(|r| r.extra.keys()).collect();
    names.into_iter().cloned().collect()
}

fn header(extras: &[String], derived: &[&str]) -> Vec<String> {
    let mut cols = vec!["user_id".to_string(), "date".to_string()];
    cols.extend(extras.iter().cloned());
    cols.extend(derived.iter().map(|c| c.to_string()));
    cols
}

fn base_cells(record: &EventRecord, extras: &[String]) -> Vec<String> {
    let mut cells = vec![
        record.user_id.clone(),
        record.date.format("%Y-%m-%d").to_string(),
    ];
    cells.extend(extras.iter().map(|name| match record.extra.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }));
    cells
}

fn cell_value(cell: &str) -> Value {
    if let Ok(n) = cell.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = cell.parse::<f64>() {
        return Value::from(f);
    }
    if let Ok(b) = cell.parse::<bool>() {
        return Value::from(b);
    }
    Value::from(cell)
}
