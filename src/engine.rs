use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::cache::{CacheStats, ListingCache, MemoryCache};
use crate::config::{EngineConfig, SourceConfig};
use crate::core::{AggregatedGame, SourceMatch};
use crate::error::Result;
use crate::fetcher::{FeedFetcher, HttpFeedFetcher, SourceFetcher};
use crate::matcher;

/// Query parameters for one aggregation pass
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,

    /// Source-name allow-list; empty means every configured source.
    /// Unknown names are silently ignored.
    pub sources: Vec<String>,

    /// Final game-list limit; defaults and hard ceiling come from
    /// `EngineConfig`
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// Matched games plus the pre-truncation total
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub games: Vec<AggregatedGame>,

    /// Game count before the limit was applied
    pub total: usize,
}

/// Catalog aggregation engine: fans a query out across every in-scope
/// source, merges matches into per-game records and orders them by recency.
pub struct CatalogEngine {
    sources: Vec<SourceConfig>,
    fetcher: SourceFetcher,
    config: EngineConfig,
}

impl CatalogEngine {
    /// Create an engine backed by HTTP fetches and an in-memory cache
    pub fn new(sources: Vec<SourceConfig>, config: EngineConfig) -> Self {
        let http = Arc::new(HttpFeedFetcher::new(config.fetch_timeout));
        let cache = Arc::new(MemoryCache::new());
        Self::with_parts(sources, config, http, cache)
    }

    /// Build from injected transport and cache; used by tests and by hosts
    /// embedding several independent engines in one process
    pub fn with_parts(
        sources: Vec<SourceConfig>,
        config: EngineConfig,
        fetcher: Arc<dyn FeedFetcher>,
        cache: Arc<dyn ListingCache>,
    ) -> Self {
        let fetcher = SourceFetcher::new(fetcher, cache, config.cache_ttl);
        Self {
            sources,
            fetcher,
            config,
        }
    }

    /// Run one query across the in-scope sources.
    ///
    /// Fails only on an invalid query; individual source outages contribute
    /// zero matches and a query matching nothing is a success with an empty
    /// list.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        // Validation happens before any cache or network access
        let query = matcher::validate_query(&request.query)?;
        let limit = request
            .limit
            .unwrap_or(self.config.default_limit)
            .clamp(1, self.config.max_limit);

        let start = Instant::now();
        let in_scope = self.in_scope_sources(&request.sources);

        // Fan out, then match and merge only after every fetch has
        // resolved or failed, so ordering never depends on completion order
        let listings = join_all(
            in_scope
                .iter()
                .map(|source| self.fetcher.listing(source)),
        )
        .await;

        let mut by_title: HashMap<String, AggregatedGame> = HashMap::new();
        for (source, listing) in in_scope.iter().zip(listings) {
            for entry in listing {
                if !matcher::matches(&entry, &query) {
                    continue;
                }
                let key = matcher::normalize_title(&entry.title);
                let game = by_title
                    .entry(key)
                    .or_insert_with(|| AggregatedGame::new(entry.title.clone()));
                game.sources
                    .push(SourceMatch::from_entry(source.name.clone(), entry));
            }
        }

        let mut games: Vec<AggregatedGame> = by_title.into_values().collect();
        for game in &mut games {
            game.sort_sources();
        }
        // Most recent upload first; title breaks ties deterministically
        games.sort_by(|a, b| {
            b.latest_upload()
                .cmp(&a.latest_upload())
                .then_with(|| a.name.cmp(&b.name))
        });

        let total = games.len();
        games.truncate(limit);

        tracing::debug!(
            "Query '{}' matched {} games across {} sources in {:.1}ms",
            query,
            total,
            in_scope.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(SearchOutcome { games, total })
    }

    fn in_scope_sources(&self, filter: &[String]) -> Vec<&SourceConfig> {
        if filter.is_empty() {
            self.sources.iter().collect()
        } else {
            self.sources
                .iter()
                .filter(|s| filter.iter().any(|name| name == &s.name))
                .collect()
        }
    }

    pub fn sources(&self) -> &[SourceConfig] {
        &self.sources
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.fetcher.cache().stats(self.config.cache_ttl)
    }

    pub fn clear_cache(&self) {
        self.fetcher.cache().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::core::ListingEntry;
    use crate::error::EngineError;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashMap as StdHashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fake transport serving canned listings per source name; sources
    /// without a listing fail like an unreachable feed
    #[derive(Default)]
    struct FakeFeeds {
        listings: StdHashMap<String, Vec<ListingEntry>>,
        fetches: AtomicUsize,
    }

    impl FakeFeeds {
        fn with(mut self, source: &str, entries: Vec<ListingEntry>) -> Self {
            self.listings.insert(source.to_string(), entries);
            self
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FeedFetcher for FakeFeeds {
        async fn fetch(&self, source: &SourceConfig) -> Result<Vec<ListingEntry>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.listings
                .get(&source.name)
                .cloned()
                .ok_or_else(|| EngineError::SourceUnavailable {
                    source: source.name.clone(),
                    message: "connection refused".to_string(),
                })
        }
    }

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn entry(title: &str, day: u32) -> ListingEntry {
        ListingEntry::new(title, date(day))
    }

    fn sources(names: &[&str]) -> Vec<SourceConfig> {
        names
            .iter()
            .map(|n| SourceConfig::new(*n, format!("https://example.com/{}.json", n)))
            .collect()
    }

    fn engine(names: &[&str], feeds: FakeFeeds) -> CatalogEngine {
        CatalogEngine::with_parts(
            sources(names),
            EngineConfig::default(),
            Arc::new(feeds),
            Arc::new(MemoryCache::new()),
        )
    }

    #[tokio::test]
    async fn test_distinct_titles_stay_distinct_and_order_by_recency() {
        let feeds = FakeFeeds::default()
            .with("A", vec![entry("The Witcher 3", 1)])
            .with("B", vec![entry("Witcher Remastered", 2)]);
        let engine = engine(&["A", "B"], feeds);

        let outcome = engine
            .search(&SearchRequest::new("witcher"))
            .await
            .unwrap();

        assert_eq!(outcome.games.len(), 2);
        // B's entry is more recent, so its game comes first
        assert_eq!(outcome.games[0].name, "Witcher Remastered");
        assert_eq!(outcome.games[1].name, "The Witcher 3");
    }

    #[tokio::test]
    async fn test_same_title_merges_across_sources() {
        let feeds = FakeFeeds::default()
            .with("A", vec![entry("Elden Ring", 1)])
            .with("B", vec![entry("ELDEN RING", 5)]);
        let engine = engine(&["A", "B"], feeds);

        let outcome = engine.search(&SearchRequest::new("elden")).await.unwrap();

        assert_eq!(outcome.games.len(), 1);
        let game = &outcome.games[0];
        assert_eq!(game.sources.len(), 2);
        // Within a game, sources are most-recent first
        assert_eq!(game.sources[0].source, "B");
        assert_eq!(game.sources[1].source, "A");
        assert_eq!(game.latest_upload(), date(5));
    }

    #[tokio::test]
    async fn test_determinism() {
        let feeds = FakeFeeds::default()
            .with("A", vec![entry("Game One", 3), entry("Game Two", 1)])
            .with("B", vec![entry("Game Three", 2)]);
        let engine = engine(&["A", "B"], feeds);

        let first = engine.search(&SearchRequest::new("game")).await.unwrap();
        let second = engine.search(&SearchRequest::new("game")).await.unwrap();
        assert_eq!(first.games, second.games);
        assert_eq!(first.total, 3);
    }

    #[tokio::test]
    async fn test_limit_keeps_most_recent_games() {
        let feeds = FakeFeeds::default().with(
            "A",
            (1..=5).map(|d| entry(&format!("Game {}", d), d)).collect(),
        );
        let engine = engine(&["A"], feeds);

        let outcome = engine
            .search(&SearchRequest {
                query: "game".to_string(),
                sources: vec![],
                limit: Some(3),
            })
            .await
            .unwrap();

        assert_eq!(outcome.games.len(), 3);
        assert_eq!(outcome.total, 5);
        let names: Vec<_> = outcome.games.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Game 5", "Game 4", "Game 3"]);
    }

    #[tokio::test]
    async fn test_limit_clamped_to_ceiling() {
        let feeds = FakeFeeds::default().with(
            "A",
            (1..=20).map(|d| entry(&format!("Game {}", d), d)).collect(),
        );
        let engine = engine(&["A"], feeds);

        let outcome = engine
            .search(&SearchRequest {
                query: "game".to_string(),
                sources: vec![],
                limit: Some(50),
            })
            .await
            .unwrap();
        assert_eq!(outcome.games.len(), 10);

        let outcome = engine
            .search(&SearchRequest {
                query: "game".to_string(),
                sources: vec![],
                limit: Some(0),
            })
            .await
            .unwrap();
        assert_eq!(outcome.games.len(), 1);
    }

    #[tokio::test]
    async fn test_source_filter() {
        let feeds = FakeFeeds::default()
            .with("A", vec![entry("Portal", 1)])
            .with("B", vec![entry("Portal 2", 2)]);
        let engine = engine(&["A", "B"], feeds);

        let outcome = engine
            .search(&SearchRequest {
                query: "portal".to_string(),
                sources: vec!["A".to_string(), "Nonexistent".to_string()],
                limit: None,
            })
            .await
            .unwrap();

        // Only A is in scope; the unknown name matches nothing
        assert_eq!(outcome.games.len(), 1);
        assert_eq!(outcome.games[0].name, "Portal");
    }

    #[tokio::test]
    async fn test_failed_source_is_isolated() {
        // "A" has no canned listing, so its fetch fails
        let feeds = FakeFeeds::default().with("B", vec![entry("Hades", 1)]);
        let engine = engine(&["A", "B"], feeds);

        let outcome = engine.search(&SearchRequest::new("hades")).await.unwrap();
        assert_eq!(outcome.games.len(), 1);
        assert_eq!(outcome.games[0].sources[0].source, "B");
    }

    #[tokio::test]
    async fn test_no_matches_is_success() {
        let feeds = FakeFeeds::default().with("A", vec![entry("Hades", 1)]);
        let engine = engine(&["A"], feeds);

        let outcome = engine
            .search(&SearchRequest::new("zzzzzz"))
            .await
            .unwrap();
        assert!(outcome.games.is_empty());
        assert_eq!(outcome.total, 0);
    }

    #[tokio::test]
    async fn test_invalid_query_rejected_before_any_fetch() {
        let feeds = Arc::new(FakeFeeds::default().with("A", vec![entry("Hades", 1)]));
        let engine = CatalogEngine::with_parts(
            sources(&["A"]),
            EngineConfig::default(),
            feeds.clone(),
            Arc::new(MemoryCache::new()),
        );

        let err = engine.search(&SearchRequest::new("h")).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuery(_)));
        assert_eq!(feeds.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_title_within_one_source_keeps_both_rows() {
        let feeds = FakeFeeds::default().with(
            "A",
            vec![entry("Doom Eternal", 1), entry("Doom Eternal", 4)],
        );
        let engine = engine(&["A"], feeds);

        let outcome = engine.search(&SearchRequest::new("doom")).await.unwrap();
        assert_eq!(outcome.games.len(), 1);
        assert_eq!(outcome.games[0].sources.len(), 2);
    }
}
