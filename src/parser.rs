//! JSON parser for usage endpoint responses.

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::events::EventRecord;

/// Body of one endpoint response: `{ "ok": bool, "data": [...] }`.
#[derive(Debug)]
pub struct PageResponse {
    pub ok: bool,
    pub data: Vec<EventRecord>,
    /// Rows dropped for lacking a usable `user_id` or `date`.
    pub skipped: usize,
}

#[derive(Deserialize)]
struct RawPage {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    data: Vec<Value>,
}

/// Decodes a [`PageResponse`] from raw bytes.
///
/// A missing `ok` flag reads as `false`. Rows without a usable `user_id` or
/// `date` are skipped with a warning; the rest of the page is kept.
///
/// # Errors
///
/// Returns an error if the bytes are not a JSON object.
pub fn parse_page(bytes: &[u8]) -> Result<PageResponse> {
    let raw: RawPage = serde_json::from_slice(bytes)?;

    let mut data = Vec::with_capacity(raw.data.len());
    let mut skipped = 0;
    for (index, row) in raw.data.into_iter().enumerate() {
        match serde_json::from_value::<EventRecord>(row) {
            Ok(record) => data.push(record),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed usage row");
                skipped += 1;
            }
        }
    }

    Ok(PageResponse {
        ok: raw.ok,
        data,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ok_page() {
        let body = br#"{"ok": true, "data": [{"user_id": "a", "date": "2024-01-02"}]}"#;
        let page = parse_page(body).unwrap();
        assert!(page.ok);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].user_id, "a");
    }

    #[test]
    fn test_missing_ok_flag_is_failure() {
        let page = parse_page(br#"{"data": []}"#).unwrap();
        assert!(!page.ok);
    }

    #[test]
    fn test_failed_page_without_data() {
        let page = parse_page(br#"{"ok": false, "error": "quota"}"#).unwrap();
        assert!(!page.ok);
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_bad_rows_skipped_rest_kept() {
        let body = br#"{"ok": true, "data": [
            {"user_id": "a", "date": "2024-01-02"},
            {"user_id": null, "date": "2024-01-03"},
            {"user_id": "c", "date": "not a date"},
            {"user_id": 7, "date": "2024-01-04"}
        ]}"#;
        let page = parse_page(body).unwrap();
        assert!(page.ok);
        assert_eq!(page.skipped, 2);
        let ids: Vec<_> = page.data.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "7"]);
    }

    #[test]
    fn test_parse_invalid_bytes() {
        assert!(parse_page(&[0xFF, 0xFE, 0x00]).is_err());
        assert!(parse_page(b"").is_err());
    }
}
