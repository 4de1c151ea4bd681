//! RSS payload parsing.
//!
//! Turns raw feed text (as unwrapped from the proxy envelope) into a
//! [`ParsedFeed`] using the [`rss`] crate.  Pure, no I/O.

use chrono::{DateTime, Utc};

use super::{FeedItem, ParsedFeed};
use crate::error::FeedError;

/// Title used for items that do not carry one.
const UNTITLED: &str = "(untitled)";

/// Parse a raw RSS document.
///
/// Any XML or RSS structure error becomes [`FeedError::Parsing`].
pub fn parse(payload: &str) -> Result<ParsedFeed, FeedError> {
    let channel = rss::Channel::read_from(payload.as_bytes())?;
    Ok(parse_channel(&channel))
}

/// Convert an already-read [`rss::Channel`].
pub fn parse_channel(channel: &rss::Channel) -> ParsedFeed {
    let items = channel
        .items()
        .iter()
        .map(|item| {
            // Parse RFC-2822 date; gracefully degrade to None on failure.
            let published = item
                .pub_date()
                .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                .map(|dt| dt.with_timezone(&Utc));

            FeedItem {
                title: item.title().unwrap_or(UNTITLED).to_string(),
                description: item.description().map(String::from),
                link: item.link().map(String::from),
                published,
            }
        })
        .collect();

    let description = Some(channel.description())
        .filter(|d| !d.is_empty())
        .map(String::from);

    ParsedFeed {
        title: channel.title().to_string(),
        description,
        items,
    }
}
