use chrono::Duration;
use dashmap::DashMap;

use crate::cache::{CacheRecord, CacheStats, ListingCache};
use crate::core::ListingEntry;

/// In-memory listing cache, one record per source.
///
/// DashMap shards give per-entry serialization: concurrent queries touching
/// the same source do not lose updates, and different sources never contend.
/// Records survive past their TTL so a failed refresh never destroys the
/// last good listing; expired records are simply not served.
#[derive(Default)]
pub struct MemoryCache {
    records: DashMap<String, CacheRecord>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ListingCache for MemoryCache {
    fn fresh(&self, source_name: &str, ttl: Duration) -> Option<Vec<ListingEntry>> {
        let record = self.records.get(source_name)?;
        if record.is_fresh(ttl) {
            tracing::debug!("Cache hit for source {}", source_name);
            Some(record.listing.clone())
        } else {
            tracing::debug!("Cache expired for source {}", source_name);
            None
        }
    }

    fn store(&self, source_name: &str, listing: Vec<ListingEntry>) {
        tracing::debug!(
            "Stored {} entries for source {}",
            listing.len(),
            source_name
        );
        self.records
            .insert(source_name.to_string(), CacheRecord::new(listing));
    }

    fn stats(&self, ttl: Duration) -> CacheStats {
        let total_records = self.records.len();
        let fresh_records = self
            .records
            .iter()
            .filter(|record| record.value().is_fresh(ttl))
            .count();

        CacheStats {
            total_records,
            fresh_records,
            stale_records: total_records - fresh_records,
        }
    }

    fn clear(&self) {
        self.records.clear();
        tracing::info!("Listing cache cleared");
    }
}
