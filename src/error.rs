use std::fmt;

/// Main error type for the catalog engine
#[derive(Debug)]
pub enum EngineError {
    /// Query failed validation; no source or cache work was performed
    InvalidQuery(String),

    /// Client exhausted its request budget for the current window
    RateLimited { retry_after_secs: u64 },

    /// A source's feed could not be fetched; absorbed inside the fetcher,
    /// never surfaced to callers of `search`
    SourceUnavailable { source: String, message: String },

    /// A source's payload matched no known feed shape; handled like a
    /// fetch failure
    UpstreamFormat { source: String },

    /// HTTP request errors
    Http(reqwest::Error),

    /// JSON serialization errors
    Json(serde_json::Error),

    /// Generic errors
    Internal(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidQuery(msg) => write!(f, "Invalid query: {}", msg),
            EngineError::RateLimited { retry_after_secs } => {
                write!(f, "Rate limit exceeded, retry after {}s", retry_after_secs)
            }
            EngineError::SourceUnavailable { source, message } => {
                write!(f, "Source '{}' unavailable: {}", source, message)
            }
            EngineError::UpstreamFormat { source } => {
                write!(f, "Source '{}' returned a payload in no known feed shape", source)
            }
            EngineError::Http(e) => write!(f, "HTTP request failed: {}", e),
            EngineError::Json(e) => write!(f, "JSON error: {}", e),
            EngineError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Http(e) => Some(e),
            EngineError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(e: reqwest::Error) -> Self {
        EngineError::Http(e)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Json(e)
    }
}

impl From<String> for EngineError {
    fn from(s: String) -> Self {
        EngineError::Internal(s)
    }
}

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError::Internal(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EngineError>;
