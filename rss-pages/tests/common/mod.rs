#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rss_pages::{AggregatorError, Article, FeedRetriever, FeedSource, ParsedEntry, ParsedFeed, Result};
use std::collections::HashMap;
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc)
}

pub fn entry(link: &str, published: Option<&str>, description: &str) -> ParsedEntry {
    ParsedEntry {
        title: format!("Post {}", link.rsplit('/').next().unwrap_or(link)),
        description: description.to_string(),
        content: String::new(),
        link: link.to_string(),
        published: published.map(ts),
    }
}

pub fn feed(title: &str, entries: Vec<ParsedEntry>) -> ParsedFeed {
    ParsedFeed {
        title: title.to_string(),
        author: None,
        homepage: None,
        entries,
    }
}

pub fn article(link: &str, published: &str, first_fetched: &str) -> Article {
    Article {
        title: link.to_string(),
        summary: String::new(),
        link: link.to_string(),
        published: ts(published),
        feed_title: "Feed".to_string(),
        feed_author: String::new(),
        homepage: String::new(),
        first_fetched: ts(first_fetched),
    }
}

/// Serves canned feeds by URL and records which URLs were asked for.
#[derive(Default)]
pub struct ScriptedRetriever {
    responses: HashMap<String, std::result::Result<ParsedFeed, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, url: &str, feed: ParsedFeed) -> Self {
        self.responses.insert(url.to_string(), Ok(feed));
        self
    }

    pub fn with_failure(mut self, url: &str, error: &str) -> Self {
        self.responses.insert(url.to_string(), Err(error.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedRetriever for ScriptedRetriever {
    async fn retrieve(&self, source: &FeedSource) -> Result<ParsedFeed> {
        self.calls.lock().unwrap().push(source.url.clone());
        match self.responses.get(&source.url) {
            Some(Ok(feed)) => Ok(feed.clone()),
            Some(Err(e)) => Err(AggregatorError::General(e.clone())),
            None => Err(AggregatorError::General(format!("no scripted feed for {}", source.url))),
        }
    }
}
