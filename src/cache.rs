//! Reuse of the raw backup between runs.
//!
//! A fetch is only repeated when the backup is missing or the caller asks
//! for a refresh.

use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

use crate::events::EventRecord;
use crate::fetch::{DateWindows, PageSource, fetch_all};
use crate::output::{read_backup, write_backup};

/// Where the events came from on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Cache,
    Fetched { succeeded: usize, failed: usize },
}

pub struct UsageCache {
    path: String,
}

impl UsageCache {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Cached records, or `None` when nothing has been stored yet.
    pub fn load(&self) -> Result<Option<Vec<EventRecord>>> {
        if !Path::new(&self.path).exists() {
            return Ok(None);
        }
        read_backup(&self.path).map(Some)
    }

    /// Returns cached records when present, otherwise fetches every window
    /// and stores the result. With `refresh` the cache is skipped but only
    /// replaced once a fetch yields records; an empty fetch is returned and
    /// the existing backup is left in place.
    #[tracing::instrument(skip(self, source, windows), fields(path = %self.path))]
    pub async fn load_or_fetch<S: PageSource + ?Sized>(
        &self,
        source: &S,
        windows: DateWindows,
        refresh: bool,
    ) -> Result<(Vec<EventRecord>, Provenance)> {
        if !refresh {
            if let Some(records) = self.load()? {
                info!(rows = records.len(), "Using cached usage data");
                return Ok((records, Provenance::Cache));
            }
        }

        let result = fetch_all(source, windows).await;
        if result.is_empty() {
            warn!("Fetch returned no records, existing backup kept");
        } else {
            write_backup(&self.path, &result.records)?;
        }

        let provenance = Provenance::Fetched {
            succeeded: result.succeeded,
            failed: result.failed.len(),
        };
        Ok((result.records, provenance))
    }
}
