// src/network/mod.rs
//! Network communication components
//!
//! The switcher talks to exactly one remote service: the profitability
//! ranking feed, fetched over HTTP by [`FeedClient`].

/// Ranking feed client and document parser
///
/// Fetches the ranking document, flattens it and filters it to the
/// configured algorithm.
pub mod feed;

// Re-export main components for cleaner imports
pub use feed::{FeedClient, RankingSource, parse_feed};
