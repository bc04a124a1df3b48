use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// One raw record from a source's feed, normalized from whatever JSON shape
/// the upstream exposes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingEntry {
    /// Release title as published by the source
    #[serde(default)]
    pub title: String,

    /// Upload timestamp; epoch when the feed omitted or mangled it
    #[serde(default = "epoch")]
    pub upload_date: DateTime<Utc>,

    /// Display string ("25.2 GB"), may be empty
    #[serde(default)]
    pub file_size: String,

    /// Download locator (direct URL or magnet), may be empty
    #[serde(default)]
    pub download_url: String,
}

impl ListingEntry {
    /// Create a new entry with the fields every feed is expected to carry
    pub fn new(title: impl Into<String>, upload_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            upload_date,
            file_size: String::new(),
            download_url: String::new(),
        }
    }
}

/// A listing entry matched by a query, tagged with its owning source.
/// Produced transiently per query, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceMatch {
    /// Name of the source that listed this entry
    pub source: String,

    /// Release title as published by that source
    pub title: String,

    /// Download locator for this entry
    #[serde(default)]
    pub download_url: String,

    #[serde(default = "epoch")]
    pub upload_date: DateTime<Utc>,

    #[serde(default)]
    pub file_size: String,
}

impl SourceMatch {
    /// Tag a listing entry with the source it came from
    pub fn from_entry(source: impl Into<String>, entry: ListingEntry) -> Self {
        Self {
            source: source.into(),
            title: entry.title,
            download_url: entry.download_url,
            upload_date: entry.upload_date,
            file_size: entry.file_size,
        }
    }
}
