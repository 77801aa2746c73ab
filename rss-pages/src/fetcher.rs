use crate::types::{AggregatorError, FetchConfig, Result};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    /// Downloads the raw feed document. One attempt; the caller decides what
    /// a failure means for the run.
    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<u8>> {
        let start_time = Instant::now();
        let url = Url::parse(url)?;

        debug!("Fetching feed: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(AggregatorError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(content_length) = response.content_length() {
            self.check_size(content_length)?;
        }

        let body = response.bytes().await?;
        self.check_size(body.len() as u64)?;

        debug!(
            "Fetched feed: {} ({} bytes in {}ms)",
            url,
            body.len(),
            start_time.elapsed().as_millis()
        );

        Ok(body.to_vec())
    }

    fn check_size(&self, bytes: u64) -> Result<()> {
        check_feed_size(bytes, self.config.max_feed_size_mb)
    }
}

/// Fails when `bytes` exceeds `max_mb` mebibytes.
pub fn check_feed_size(bytes: u64, max_mb: usize) -> Result<()> {
    let limit = max_mb as u64 * 1024 * 1024;
    if bytes > limit {
        return Err(AggregatorError::FeedTooLarge {
            size_mb: bytes.div_ceil(1024 * 1024) as usize,
        });
    }
    Ok(())
}
