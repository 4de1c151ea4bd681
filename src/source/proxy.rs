//! Fetching feeds through the CORS-bypass proxy.
//!
//! The proxy is asked for `GET <base>/get?disableCache=true&url=<target>` and
//! answers with a JSON envelope whose `contents` field holds the raw feed
//! text.

use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::FeedSource;
use crate::error::FeedError;

/// Proxy response envelope.  Only `contents` is used.
#[derive(Debug, Deserialize)]
struct Envelope {
    contents: Option<String>,
}

/// Build the proxied retrieval URL for `target`.
///
/// `target` is embedded URL-encoded as the `url` query parameter and caching
/// is disabled.
pub fn proxy_url(base: &Url, target: &str) -> Url {
    let mut proxied = base.join("/get").unwrap_or_else(|_| base.clone());
    proxied
        .query_pairs_mut()
        .clear()
        .append_pair("disableCache", "true")
        .append_pair("url", target);
    proxied
}

/// Extract the feed text from a proxy response body.
pub fn unwrap_envelope(body: &str) -> Result<String, FeedError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| FeedError::Parsing(format!("invalid proxy envelope: {e}")))?;
    envelope
        .contents
        .ok_or_else(|| FeedError::Parsing("proxy envelope has no contents".to_string()))
}

/// A [`FeedSource`] that retrieves payloads through the proxy.
pub struct ProxySource {
    client: Client,
    base: Url,
}

impl ProxySource {
    /// Create a source for the proxy at `base`.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { client, base })
    }
}

impl FeedSource for ProxySource {
    async fn fetch(&self, url: &str) -> Result<String, FeedError> {
        let target = proxy_url(&self.base, url);
        debug!(feed = url, "fetching through proxy");

        let response = self.client.get(target).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Network(format!("HTTP error: {}", response.status())));
        }

        let body = response.text().await?;
        unwrap_envelope(&body)
    }
}
