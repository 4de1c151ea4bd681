//! Validation of candidate feed URLs.

use url::Url;

use crate::error::ValidationError;
use crate::model::Feed;

/// URL schemes accepted as a feed address.
const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Check that `candidate` can be subscribed.
///
/// Rules are applied in order and the first violation wins: non-empty,
/// an absolute URL with a host, and not equal to the `url` of any feed in
/// `feeds`.  The duplicate check compares the raw string, exactly as it was
/// submitted, so whitespace or control characters anywhere in the input are
/// rejected rather than silently stripped by the URL parser.
pub fn validate(candidate: &str, feeds: &[Feed]) -> Result<(), ValidationError> {
    if candidate.is_empty() {
        return Err(ValidationError::Required);
    }

    if candidate.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::Url);
    }

    let parsed = Url::parse(candidate).map_err(|_| ValidationError::Url)?;
    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) || parsed.host_str().is_none() {
        return Err(ValidationError::Url);
    }

    if feeds.iter().any(|feed| feed.url == candidate) {
        return Err(ValidationError::NotOneOf);
    }

    Ok(())
}
