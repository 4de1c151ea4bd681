//! Core data types: subscribed feeds and their posts.

use std::fmt;

use chrono::{DateTime, Utc};

/// Opaque identifier of a subscribed [`Feed`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedId(pub String);

/// Opaque identifier of a [`Post`], scoped to its feed's id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostId(pub String);

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A subscribed feed.
///
/// `url` is exactly the string the user submitted; it is unique across all
/// feeds.  The feed does not own or reference its posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub id: FeedId,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
}

/// A single entry of a feed.  Never mutated after it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    /// The owning feed.
    pub feed_id: FeedId,
    /// De-duplication key for poll merges: a polled item whose title matches
    /// a stored post is dropped.
    pub title: String,
    pub link: Option<String>,
    pub description: Option<String>,
    /// Display only; posts are never reordered by date.
    pub published: Option<DateTime<Utc>>,
}

/// Progress of the most recent form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingProcess {
    Loading,
    Loaded,
    Failure,
}
