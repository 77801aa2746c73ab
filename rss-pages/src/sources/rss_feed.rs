use crate::traits::FeedRetriever;
use crate::types::{FeedSource, FetchConfig, ParsedFeed, Result};
use crate::{FeedParser, Fetcher};
use async_trait::async_trait;
use tracing::info;

/// Retrieves feeds over HTTP and parses them with feed-rs.
pub struct RssFeedRetriever {
    fetcher: Fetcher,
}

impl RssFeedRetriever {
    pub fn new(fetch_config: FetchConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(fetch_config)?,
        })
    }
}

#[async_trait]
impl FeedRetriever for RssFeedRetriever {
    async fn retrieve(&self, source: &FeedSource) -> Result<ParsedFeed> {
        let content = self.fetcher.fetch_feed(&source.url).await?;
        let parsed_feed = FeedParser::parse_feed(&content)?;

        info!(
            "Pulled {} entries from RSS feed {}",
            parsed_feed.entries.len(),
            source.url
        );
        Ok(parsed_feed)
    }
}
