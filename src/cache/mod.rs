pub mod memory;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::core::ListingEntry;

pub use memory::MemoryCache;

/// One source's most recently fetched listing.
///
/// Replaced wholesale on refresh; `fetched_at` is non-decreasing per source
/// because records are only ever overwritten with the current time.
#[derive(Debug, Clone)]
pub struct CacheRecord {
    pub listing: Vec<ListingEntry>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheRecord {
    pub fn new(listing: Vec<ListingEntry>) -> Self {
        Self {
            listing,
            fetched_at: Utc::now(),
        }
    }

    /// Valid for reads only while `now - fetched_at < ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        Utc::now() - self.fetched_at < ttl
    }
}

/// Store of per-source listings with bounded staleness
pub trait ListingCache: Send + Sync {
    /// Listing for `source_name` if a record exists and is within `ttl`
    fn fresh(&self, source_name: &str, ttl: Duration) -> Option<Vec<ListingEntry>>;

    /// Replace the record for `source_name` wholesale
    fn store(&self, source_name: &str, listing: Vec<ListingEntry>);

    /// Record counts relative to `ttl`
    fn stats(&self, ttl: Duration) -> CacheStats;

    /// Drop every record
    fn clear(&self);
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_records: usize,
    pub fresh_records: usize,
    pub stale_records: usize,
}
