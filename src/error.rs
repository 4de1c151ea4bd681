//! Error types and the error-to-message classifier.
//!
//! Every failure a subscription can hit falls into one of three classified
//! kinds (network, validation, parsing).  Classified errors become a
//! localization key shown under the form; anything else is carried as
//! [`FeedError::Other`] and propagated to whoever called the classifier.

use thiserror::Error;

/// Which rule a candidate feed URL broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The input was empty.
    #[error("a URL is required")]
    Required,
    /// The input is not an absolute URL.
    #[error("not a valid URL")]
    Url,
    /// The URL is already subscribed.
    #[error("feed is already subscribed")]
    NotOneOf,
}

impl ValidationError {
    /// Name of the violated rule, as used in localization keys.
    pub fn kind(self) -> &'static str {
        match self {
            ValidationError::Required => "required",
            ValidationError::Url => "url",
            ValidationError::NotOneOf => "notOneOf",
        }
    }
}

/// Error type for fetching, validating and parsing feeds.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport or proxy failure (DNS, timeout, non-2xx status).
    #[error("network error: {0}")]
    Network(String),

    /// The submitted URL was rejected.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The payload is not a readable feed.
    #[error("parsing error: {0}")]
    Parsing(String),

    /// Anything not classified above.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FeedError {
    /// Name used to build the localization key for parse failures.
    pub const PARSING_ERROR_NAME: &'static str = "parsingError";

    /// Map a classified error to the localization key shown under the form.
    ///
    /// Unclassified errors are handed back unchanged as `Err`.
    pub fn into_message_key(self) -> Result<String, anyhow::Error> {
        match self {
            FeedError::Network(_) => Ok("form.errors.network".to_string()),
            FeedError::Validation(v) => Ok(format!("form.errors.{}", v.kind())),
            FeedError::Parsing(_) => Ok(format!("form.errors.{}", Self::PARSING_ERROR_NAME)),
            FeedError::Other(e) => Err(e),
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        FeedError::Network(e.to_string())
    }
}

impl From<rss::Error> for FeedError {
    fn from(e: rss::Error) -> Self {
        FeedError::Parsing(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_maps_to_network_key() {
        let err = FeedError::Network("connection refused".to_string());
        assert_eq!(err.into_message_key().unwrap(), "form.errors.network");
    }

    #[test]
    fn validation_errors_map_to_rule_keys() {
        let cases = [
            (ValidationError::Required, "form.errors.required"),
            (ValidationError::Url, "form.errors.url"),
            (ValidationError::NotOneOf, "form.errors.notOneOf"),
        ];
        for (kind, key) in cases {
            assert_eq!(FeedError::from(kind).into_message_key().unwrap(), key);
        }
    }

    #[test]
    fn parsing_error_maps_to_parsing_key() {
        let err = FeedError::Parsing("unexpected end of file".to_string());
        assert_eq!(err.into_message_key().unwrap(), "form.errors.parsingError");
    }

    #[test]
    fn unclassified_error_is_propagated() {
        let err = FeedError::Other(anyhow::anyhow!("boom"));
        let propagated = err.into_message_key().unwrap_err();
        assert_eq!(propagated.to_string(), "boom");
    }

    #[test]
    fn display_includes_detail() {
        let err = FeedError::Network("timed out".to_string());
        assert_eq!(err.to_string(), "network error: timed out");
        let err = FeedError::from(ValidationError::NotOneOf);
        assert_eq!(err.to_string(), "validation error: feed is already subscribed");
    }
}
