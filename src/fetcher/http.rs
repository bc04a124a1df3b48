use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{FeedShape, SourceConfig};
use crate::core::ListingEntry;
use crate::error::{EngineError, Result};
use crate::fetcher::FeedFetcher;

/// HTTP transport for source feeds.
///
/// Normalizes the known upstream JSON shapes into `ListingEntry` rows so
/// the rest of the engine never sees a raw feed.
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    /// Create a new fetcher; `timeout` bounds every individual feed fetch
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, source: &SourceConfig) -> Result<Vec<ListingEntry>> {
        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| EngineError::SourceUnavailable {
                source: source.name.clone(),
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(EngineError::SourceUnavailable {
                source: source.name.clone(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| EngineError::SourceUnavailable {
                source: source.name.clone(),
                message: format!("Body read failed: {}", e),
            })?;

        parse_feed(source, &body)
    }
}

/// Hydra-style feed: entries under a `downloads` array
#[derive(Debug, Deserialize)]
struct DownloadsFeed {
    downloads: Vec<RawEntry>,
}

/// Alternate feed layout: entries under an `edges` array
#[derive(Debug, Deserialize)]
struct EdgesFeed {
    edges: Vec<RawEntry>,
}

/// Raw feed record; every field is optional upstream
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    upload_date: String,
    #[serde(default)]
    file_size: String,
    #[serde(default)]
    uris: Vec<String>,
    #[serde(default)]
    magnet: String,
    #[serde(default)]
    url: String,
}

impl RawEntry {
    /// Locator preference: first uri, then magnet, then plain url
    fn into_entry(self) -> ListingEntry {
        let upload_date = parse_upload_date(&self.upload_date);
        let download_url = self
            .uris
            .into_iter()
            .find(|u| !u.is_empty())
            .or_else(|| (!self.magnet.is_empty()).then_some(self.magnet))
            .or_else(|| (!self.url.is_empty()).then_some(self.url))
            .unwrap_or_default();

        ListingEntry {
            title: self.title,
            upload_date,
            file_size: self.file_size,
            download_url,
        }
    }
}

/// Missing or unparseable dates collapse to epoch rather than failing the
/// whole feed
fn parse_upload_date(raw: &str) -> DateTime<Utc> {
    if raw.is_empty() {
        return DateTime::<Utc>::UNIX_EPOCH;
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    }
}

/// Parse a feed body using the source's declared shape, falling back to the
/// other known shape and then a bare array before giving up
fn parse_feed(source: &SourceConfig, body: &str) -> Result<Vec<ListingEntry>> {
    let raw = parse_shape(body, source.shape)
        .or_else(|| parse_shape(body, source.shape.other()))
        .or_else(|| serde_json::from_str::<Vec<RawEntry>>(body).ok())
        .ok_or_else(|| EngineError::UpstreamFormat {
            source: source.name.clone(),
        })?;

    Ok(raw.into_iter().map(RawEntry::into_entry).collect())
}

fn parse_shape(body: &str, shape: FeedShape) -> Option<Vec<RawEntry>> {
    match shape {
        FeedShape::Downloads => serde_json::from_str::<DownloadsFeed>(body)
            .ok()
            .map(|f| f.downloads),
        FeedShape::Edges => serde_json::from_str::<EdgesFeed>(body).ok().map(|f| f.edges),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn source(shape: FeedShape) -> SourceConfig {
        SourceConfig::new("Test", "https://example.com/feed.json").with_shape(shape)
    }

    #[test]
    fn test_parse_downloads_feed() {
        let body = r#"{
            "name": "FitGirl",
            "downloads": [
                {
                    "title": "The Witcher 3",
                    "uploadDate": "2024-03-01T12:00:00.000Z",
                    "fileSize": "35.1 GB",
                    "uris": ["magnet:?xt=urn:btih:abc"]
                }
            ]
        }"#;

        let entries = parse_feed(&source(FeedShape::Downloads), body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "The Witcher 3");
        assert_eq!(entries[0].file_size, "35.1 GB");
        assert_eq!(entries[0].download_url, "magnet:?xt=urn:btih:abc");
        assert_eq!(
            entries[0].upload_date,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_edges_feed() {
        let body = r#"{"edges": [{"title": "Hades", "uploadDate": "2023-06-10"}]}"#;

        let entries = parse_feed(&source(FeedShape::Edges), body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Hades");
        assert_eq!(
            entries[0].upload_date,
            Utc.with_ymd_and_hms(2023, 6, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_shape_fallback() {
        // Declared Downloads but the payload is actually edges-shaped
        let body = r#"{"edges": [{"title": "Celeste"}]}"#;

        let entries = parse_feed(&source(FeedShape::Downloads), body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Celeste");
    }

    #[test]
    fn test_bare_array_accepted() {
        let body = r#"[{"title": "Stardew Valley"}]"#;
        let entries = parse_feed(&source(FeedShape::Downloads), body).unwrap();
        assert_eq!(entries[0].title, "Stardew Valley");
    }

    #[test]
    fn test_unknown_shape_rejected() {
        let body = r#"{"games": []}"#;
        let err = parse_feed(&source(FeedShape::Downloads), body).unwrap_err();
        assert!(matches!(err, EngineError::UpstreamFormat { .. }));
    }

    #[test]
    fn test_empty_downloads_is_valid() {
        let body = r#"{"downloads": []}"#;
        let entries = parse_feed(&source(FeedShape::Downloads), body).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_missing_fields_are_tolerated() {
        let body = r#"{"downloads": [{}]}"#;
        let entries = parse_feed(&source(FeedShape::Downloads), body).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].title.is_empty());
        assert_eq!(entries[0].upload_date, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_locator_preference() {
        let uris = RawEntry {
            uris: vec!["u1".into(), "u2".into()],
            magnet: "m".into(),
            url: "p".into(),
            ..Default::default()
        };
        assert_eq!(uris.into_entry().download_url, "u1");

        let magnet = RawEntry {
            magnet: "m".into(),
            url: "p".into(),
            ..Default::default()
        };
        assert_eq!(magnet.into_entry().download_url, "m");

        let plain = RawEntry {
            url: "p".into(),
            ..Default::default()
        };
        assert_eq!(plain.into_entry().download_url, "p");

        let none = RawEntry::default();
        assert!(none.into_entry().download_url.is_empty());
    }

    #[test]
    fn test_bad_date_collapses_to_epoch() {
        assert_eq!(parse_upload_date("not a date"), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(parse_upload_date(""), DateTime::<Utc>::UNIX_EPOCH);
    }
}
