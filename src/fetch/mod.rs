//! Paginated retrieval of usage events from the remote endpoint.
//!
//! [`DateWindows`] splits the requested range into bounded windows,
//! [`PageSource`] loads one window, and [`fetch_all`] walks the windows
//! in order and collects whatever succeeded.

mod basic;
mod client;
mod pages;
mod windows;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use pages::{FetchResult, HttpPageSource, PageSource, WindowOutcome, fetch_all, fetch_window};
pub use windows::{DEFAULT_WINDOW_DAYS, DateWindows, Window};

use anyhow::Result;

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}
