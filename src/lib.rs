//! # Game Catalog Engine
//!
//! Aggregation engine over remote game-download catalogs:
//! - Multi-source substring search with per-game merging
//! - Bounded-staleness in-memory listing cache
//! - Per-client fixed-window rate limiting
//! - Async fan-out with per-source failure isolation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use game_catalog_engine::{default_sources, CatalogEngine, EngineConfig, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = CatalogEngine::new(default_sources(), EngineConfig::default());
//!
//!     let outcome = engine.search(&SearchRequest::new("witcher")).await?;
//!     for game in &outcome.games {
//!         println!("{} ({} sources)", game.name, game.sources.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod matcher;
pub mod rate_limit;

// Re-export primary types
pub use cache::{CacheStats, ListingCache, MemoryCache};
pub use config::{default_sources, EngineConfig, FeedShape, MirrorUrl, SourceConfig};
pub use core::{AggregatedGame, ListingEntry, SourceMatch};
pub use engine::{CatalogEngine, SearchOutcome, SearchRequest};
pub use error::{EngineError, Result};
pub use fetcher::{FeedFetcher, HttpFeedFetcher, SourceFetcher};
pub use rate_limit::{RateDecision, RateLimiter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
