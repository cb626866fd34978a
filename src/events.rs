//! Usage event records and the per-user metadata derived from them.

use chrono::{NaiveDate, Weekday, Datelike};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::dates::{DateRange, WeekKey, parse_event_date};

/// One user activity instance as returned by the usage endpoint.
///
/// Fields other than `user_id` and `date` are kept as-is so they survive
/// into the backup files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(deserialize_with = "user_id_from_any")]
    pub user_id: String,
    #[serde(deserialize_with = "date_from_str")]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl EventRecord {
    pub fn new(user_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            extra: BTreeMap::new(),
        }
    }
}

fn user_id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "user_id must be a string or number, got {other}"
        ))),
    }
}

fn date_from_str<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_event_date(&raw).ok_or_else(|| de::Error::custom(format!("unrecognised date '{raw}'")))
}

/// An event plus the columns derived from the full dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedEvent {
    pub record: EventRecord,
    pub week: WeekKey,
    /// Week of the user's first-ever activity.
    pub cohort: WeekKey,
    pub first_activity_date: NaiveDate,
    /// True on the day of the user's first-ever activity.
    pub is_new_user: bool,
}

impl EnrichedEvent {
    pub fn user_id(&self) -> &str {
        &self.record.user_id
    }

    pub fn date(&self) -> NaiveDate {
        self.record.date
    }

    pub fn weekday(&self) -> Weekday {
        self.record.date.weekday()
    }
}

#[derive(Debug, Clone, Copy)]
struct FirstSeen {
    date: NaiveDate,
    cohort: WeekKey,
}

/// The full dataset, sorted by date, with cohort metadata attached.
#[derive(Debug, Clone, Default)]
pub struct UsageData {
    events: Vec<EnrichedEvent>,
}

impl UsageData {
    /// Derives first-activity date and cohort week per user and attaches
    /// them to every event. Input order does not matter.
    pub fn from_records(mut records: Vec<EventRecord>) -> Self {
        records.sort_by(|a, b| a.date.cmp(&b.date));

        let mut first_seen: HashMap<&str, FirstSeen> = HashMap::new();
        for record in &records {
            let week = WeekKey::of(record.date);
            first_seen
                .entry(record.user_id.as_str())
                .and_modify(|seen| {
                    seen.date = seen.date.min(record.date);
                    seen.cohort = seen.cohort.min(week);
                })
                .or_insert(FirstSeen {
                    date: record.date,
                    cohort: week,
                });
        }

        let lookup: HashMap<String, FirstSeen> = first_seen
            .into_iter()
            .map(|(id, seen)| (id.to_string(), seen))
            .collect();

        let events = records
            .into_iter()
            .filter_map(|record| {
                let seen = *lookup.get(&record.user_id)?;
                Some(EnrichedEvent {
                    week: WeekKey::of(record.date),
                    cohort: seen.cohort,
                    first_activity_date: seen.date,
                    is_new_user: record.date == seen.date,
                    record,
                })
            })
            .collect();

        Self { events }
    }

    pub fn events(&self) -> &[EnrichedEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Events whose date falls inside `range`.
    pub fn within(&self, range: DateRange) -> &[EnrichedEvent] {
        let lo = self.events.partition_point(|e| e.date() < range.start);
        let hi = self.events.partition_point(|e| e.date() <= range.end);
        if lo >= hi { &[] } else { &self.events[lo..hi] }
    }

    /// Latest week with any activity.
    pub fn last_week(&self) -> Option<WeekKey> {
        self.events.last().map(|e| e.week)
    }
}
