pub mod aggregated;
pub mod listing;

pub use aggregated::AggregatedGame;
pub use listing::{ListingEntry, SourceMatch};
