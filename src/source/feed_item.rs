//! Parser output shared by the subscription flow and the poller.
//!
//! A payload is turned into one [`ParsedFeed`]: the channel metadata plus its
//! entries as [`FeedItem`]s, in payload order (newest first for most feeds).
//! Nothing here carries an id yet; ids are handed out by the store when the
//! items are accepted.

use chrono::{DateTime, Utc};

/// Channel metadata and entries of one fetched payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFeed {
    pub title: String,
    pub description: Option<String>,
    /// Entries in the order the payload lists them.
    pub items: Vec<FeedItem>,
}

/// A single feed entry before it is stored as a [`crate::model::Post`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Headline; also the de-duplication key.
    pub title: String,

    /// Optional longer description or summary text.
    pub description: Option<String>,

    /// URL to the full content.
    pub link: Option<String>,

    /// Publication timestamp, if the feed provided a parseable one.
    pub published: Option<DateTime<Utc>>,
}

#[cfg(test)]
impl FeedItem {
    /// An item with only a title set.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            link: None,
            published: None,
        }
    }
}
