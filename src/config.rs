use chrono::Duration;
use serde::{Deserialize, Serialize};

/// JSON layout a source publishes its listings under.
///
/// Most catalogs wrap entries in a `downloads` array; a few expose an
/// `edges` array instead. The fetcher also accepts a bare top-level array
/// for either shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedShape {
    #[default]
    Downloads,
    Edges,
}

impl FeedShape {
    /// The other known shape, tried as a fallback before a payload is
    /// rejected as unrecognized
    pub fn other(self) -> Self {
        match self {
            FeedShape::Downloads => FeedShape::Edges,
            FeedShape::Edges => FeedShape::Downloads,
        }
    }
}

/// Alternate mirror for a source's feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorUrl {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MirrorUrl {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One configured remote catalog. Loaded once at startup, never mutated at
/// runtime; adding or removing a source requires a redeploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Unique key, also the cache key for this source's listing
    pub name: String,

    /// Primary feed location
    pub url: String,

    /// Alternate mirrors, surfaced to clients but not fetched by the engine
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_urls: Vec<MirrorUrl>,

    #[serde(default)]
    pub shape: FeedShape,
}

impl SourceConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            additional_urls: Vec::new(),
            shape: FeedShape::Downloads,
        }
    }

    pub fn with_mirrors(mut self, mirrors: Vec<MirrorUrl>) -> Self {
        self.additional_urls = mirrors;
        self
    }

    pub fn with_shape(mut self, shape: FeedShape) -> Self {
        self.shape = shape;
        self
    }
}

/// Engine-wide tunables shared by every source and client
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Staleness bound for cached source listings
    pub cache_ttl: Duration,

    /// Per-fetch timeout; a timed-out source is treated as a fetch failure
    pub fetch_timeout: std::time::Duration,

    /// Requests allowed per client per window
    pub rate_budget: u32,

    /// Fixed rate-limit window length
    pub rate_window: Duration,

    /// Result-count limit when the caller does not specify one
    pub default_limit: usize,

    /// Hard ceiling a caller-specified limit is clamped to
    pub max_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::minutes(5),
            fetch_timeout: std::time::Duration::from_secs(10),
            rate_budget: 100,
            rate_window: Duration::seconds(60),
            default_limit: 5,
            max_limit: 10,
        }
    }
}

/// Mirror pair every hydralinks-hosted source carries
fn hydra_mirrors(slug: &str) -> Vec<MirrorUrl> {
    vec![
        MirrorUrl::new(
            "Original",
            format!("https://hydralinks.pages.dev/sources/{}.json", slug),
        ),
        MirrorUrl::new(
            "Russian",
            format!("https://hydrasources.su/sources/{}.json", slug),
        )
        .with_description("RUSSIAN ONLY"),
    ]
}

fn hydra_source(name: &str, slug: &str) -> SourceConfig {
    SourceConfig::new(
        name,
        format!("https://hydralinks.pages.dev/sources/{}.json", slug),
    )
    .with_mirrors(hydra_mirrors(slug))
}

/// The fixed production source list
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        hydra_source("Empress", "empress"),
        hydra_source("FitGirl", "fitgirl"),
        hydra_source("Atop Games", "atop-games"),
        hydra_source("Dodi", "dodi"),
        hydra_source("GOG", "gog"),
        hydra_source("KaosKrew", "kaoskrew"),
        hydra_source("onlinefix", "onlinefix"),
        hydra_source("Xatab", "xatab"),
        SourceConfig::new(
            "RuTracker(Kekitu)",
            "https://raw.githubusercontent.com/KekitU/rutracker-hydra-links/refs/heads/main/all_categories.json",
        ),
        SourceConfig::new("DavidKazumi", "https://davidkazumi.github.io/fontekazumi.json"),
        hydra_source("SteamRip(Direct download)", "steamrip"),
        SourceConfig::new(
            "Shisuy Source",
            "https://raw.githubusercontent.com/Shisuiicaro/source/refs/heads/main/shisuyssource.json",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_sources_unique_names() {
        let sources = default_sources();
        assert_eq!(sources.len(), 12);

        let names: HashSet<_> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), sources.len());
    }

    #[test]
    fn test_hydra_sources_carry_mirrors() {
        let sources = default_sources();
        let empress = sources.iter().find(|s| s.name == "Empress").unwrap();

        assert_eq!(empress.additional_urls.len(), 2);
        assert_eq!(empress.additional_urls[0].name, "Original");
        assert_eq!(
            empress.additional_urls[1].description.as_deref(),
            Some("RUSSIAN ONLY")
        );
    }

    #[test]
    fn test_feed_shape_other() {
        assert_eq!(FeedShape::Downloads.other(), FeedShape::Edges);
        assert_eq!(FeedShape::Edges.other(), FeedShape::Downloads);
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.cache_ttl, Duration::minutes(5));
        assert_eq!(config.rate_budget, 100);
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.max_limit, 10);
    }
}
