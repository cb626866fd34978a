use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use tracing::{error, info, warn};

use super::client::HttpClient;
use super::fetch_bytes;
use super::windows::{DateWindows, Window};
use crate::events::EventRecord;
use crate::parser::{PageResponse, parse_page};

/// Loads the response for a single request window.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn load(&self, window: Window) -> Result<PageResponse>;
}

/// [`PageSource`] backed by the usage endpoint.
pub struct HttpPageSource<C> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> HttpPageSource<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Endpoint URL with `start_date` and `end_date` appended.
    pub fn window_url(&self, window: &Window) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid endpoint URL '{}'", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("start_date", &window.start.format("%Y-%m-%d").to_string())
            .append_pair("end_date", &window.query_end().format("%Y-%m-%d").to_string());
        Ok(url)
    }
}

#[async_trait]
impl<C: HttpClient> PageSource for HttpPageSource<C> {
    async fn load(&self, window: Window) -> Result<PageResponse> {
        let url = self.window_url(&window)?;
        let bytes = fetch_bytes(&self.client, url.as_str()).await?;
        parse_page(&bytes)
    }
}

/// What a single window produced.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    Page {
        window: Window,
        records: Vec<EventRecord>,
    },
    Failed {
        window: Window,
        reason: String,
    },
}

/// Records gathered over all windows, sorted by date, plus the windows
/// that had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    pub records: Vec<EventRecord>,
    pub succeeded: usize,
    pub failed: Vec<Window>,
}

impl FetchResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn absorb(&mut self, outcome: WindowOutcome) {
        match outcome {
            WindowOutcome::Page { records, .. } => {
                self.succeeded += 1;
                self.records.extend(records);
            }
            WindowOutcome::Failed { window, .. } => self.failed.push(window),
        }
    }
}

/// Requests one window. Transport, decoding and `ok: false` failures all
/// come back as [`WindowOutcome::Failed`]. Malformed rows inside an `ok`
/// page are dropped individually and the window still counts as fetched.
#[tracing::instrument(skip_all, fields(window = %window))]
pub async fn fetch_window<S: PageSource + ?Sized>(source: &S, window: Window) -> WindowOutcome {
    match source.load(window).await {
        Ok(page) if page.ok => {
            info!(
                records = page.data.len(),
                skipped = page.skipped,
                "Fetched window"
            );
            WindowOutcome::Page {
                window,
                records: page.data,
            }
        }
        Ok(_) => {
            warn!("Endpoint reported failure for window");
            WindowOutcome::Failed {
                window,
                reason: "endpoint returned ok=false".to_string(),
            }
        }
        Err(e) => {
            error!(error = %e, "Window fetch failed");
            WindowOutcome::Failed {
                window,
                reason: e.to_string(),
            }
        }
    }
}

/// Walks every window in order, one request at a time, with no retries.
pub async fn fetch_all<S: PageSource + ?Sized>(source: &S, windows: DateWindows) -> FetchResult {
    let mut result = FetchResult::default();

    for window in windows {
        result.absorb(fetch_window(source, window).await);
    }

    result.records.sort_by_key(|r| r.date);

    info!(
        records = result.records.len(),
        succeeded = result.succeeded,
        failed = result.failed.len(),
        "Fetch finished"
    );
    result
}
