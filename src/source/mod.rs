//! Feed retrieval and parsing.
//!
//! This module defines the [`FeedSource`] trait (where raw payloads come
//! from) and the parser output types.  Concrete pieces live in sub-modules:
//!
//! * [`proxy`]: fetches payloads through the CORS-bypass proxy.
//! * [`rss`]: turns a payload into a [`ParsedFeed`].
//!
//! ## For contributors: testing without the network
//!
//! Everything that fetches is generic over [`FeedSource`], so tests plug in a
//! fake that serves canned payloads instead of standing up an HTTP server.

mod feed_item;
pub mod proxy;
pub mod rss;

// Re-export the public API of this module so callers can write
// `use crate::source::{FeedSource, ParsedFeed, ProxySource};`
pub use feed_item::{FeedItem, ParsedFeed};
pub use proxy::ProxySource;

use std::future::Future;

use crate::error::FeedError;

/// Anything that can retrieve the raw payload of a feed URL.
///
/// Fetches run on the tokio runtime, so the returned future must be
/// [`Send`].
pub trait FeedSource: Send + Sync {
    /// Retrieve the raw feed text for `url`.
    ///
    /// Transport failures are [`FeedError::Network`]; a response that does
    /// not contain a payload is [`FeedError::Parsing`].
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FeedError>> + Send;
}

/// Fetch `url` from `source` and parse the payload.
pub async fn load<S: FeedSource>(source: &S, url: &str) -> Result<ParsedFeed, FeedError> {
    let payload = source.fetch(url).await?;
    rss::parse(&payload)
}
