//! Query normalization and the substring match rule.
//!
//! Matching is intentionally simple: contiguous, case-insensitive substring
//! over the listing title. A title-word overlap with an unrelated game is an
//! accepted false-positive, not a bug.

use crate::core::ListingEntry;
use crate::error::{EngineError, Result};

/// Queries shorter than this (after normalization) are rejected
pub const MIN_QUERY_LEN: usize = 2;

/// Queries are capped to this many characters before any use
pub const MAX_QUERY_LEN: usize = 100;

/// Trim, lower-case and cap a raw query string
pub fn normalize_query(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .take(MAX_QUERY_LEN)
        .collect()
}

/// Normalized title used as the game-identity key when merging matches
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Validate and normalize a raw query, or fail fast with `InvalidQuery`
pub fn validate_query(raw: &str) -> Result<String> {
    let normalized = normalize_query(raw);
    if normalized.chars().count() < MIN_QUERY_LEN {
        return Err(EngineError::InvalidQuery(format!(
            "query must be at least {} characters long",
            MIN_QUERY_LEN
        )));
    }
    Ok(normalized)
}

/// True iff the entry's title contains the normalized query as a contiguous
/// substring. Assumes a pre-validated query.
pub fn matches(entry: &ListingEntry, normalized_query: &str) -> bool {
    entry.title.to_lowercase().contains(normalized_query)
}
