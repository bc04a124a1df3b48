use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::listing::{epoch, SourceMatch};

/// The externally visible result unit: every matching listing entry that
/// shares a normalized title, across one or more sources.
///
/// `image` and `genres` are filled in by presentation-layer enrichment
/// outside the engine; they serialize only when present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedGame {
    /// Display title (taken from the first matching entry)
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,

    /// Matching source rows, most recent upload first
    pub sources: Vec<SourceMatch>,
}

impl AggregatedGame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: None,
            genres: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Most recent upload across this game's source rows (epoch when empty)
    pub fn latest_upload(&self) -> DateTime<Utc> {
        self.sources
            .iter()
            .map(|s| s.upload_date)
            .max()
            .unwrap_or_else(epoch)
    }

    /// Sort source rows by upload date, most recent first
    pub fn sort_sources(&mut self) {
        self.sources
            .sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
    }
}
