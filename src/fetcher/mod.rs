pub mod http;

use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;

use crate::cache::ListingCache;
use crate::config::SourceConfig;
use crate::core::ListingEntry;
use crate::error::Result;

pub use http::HttpFeedFetcher;

/// Retrieves one source's feed over whatever transport backs it
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch and normalize the source's full listing
    async fn fetch(&self, source: &SourceConfig) -> Result<Vec<ListingEntry>>;
}

/// Cache-first listing access with per-source failure isolation.
///
/// Overlapping queries may refresh the same source twice; duplicate
/// in-flight fetches are tolerated rather than collapsed.
pub struct SourceFetcher {
    fetcher: Arc<dyn FeedFetcher>,
    cache: Arc<dyn ListingCache>,
    ttl: Duration,
}

impl SourceFetcher {
    pub fn new(fetcher: Arc<dyn FeedFetcher>, cache: Arc<dyn ListingCache>, ttl: Duration) -> Self {
        Self {
            fetcher,
            cache,
            ttl,
        }
    }

    /// Listing for `source`; never fails from the caller's perspective.
    ///
    /// Fresh cache record wins without network access. Otherwise one fetch
    /// is attempted; on failure the source contributes an empty listing and
    /// any prior (possibly stale) record is left untouched.
    pub async fn listing(&self, source: &SourceConfig) -> Vec<ListingEntry> {
        if let Some(listing) = self.cache.fresh(&source.name, self.ttl) {
            return listing;
        }

        match self.fetcher.fetch(source).await {
            Ok(listing) => {
                tracing::debug!(
                    "Source {} refreshed with {} entries",
                    source.name,
                    listing.len()
                );
                self.cache.store(&source.name, listing.clone());
                listing
            }
            Err(e) => {
                tracing::warn!("Source {} failed: {}", source.name, e);
                Vec::new()
            }
        }
    }

    pub fn cache(&self) -> &Arc<dyn ListingCache> {
        &self.cache
    }
}
