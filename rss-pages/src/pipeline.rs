use crate::summarize::{summarize, SUMMARY_SENTENCES};
use crate::traits::{FeedRetriever, FetchLogStore};
use crate::types::{Article, FeedSource, ParsedFeed};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info};

/// A source that could not be retrieved or parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub articles: Vec<Article>,
    pub failures: Vec<SourceFailure>,
    /// Titles of sources with nothing inside the lookback window.
    pub quiet_sources: Vec<String>,
    pub updated_sources: usize,
}

/// Turns subscribed sources into articles, one source at a time.
pub struct IngestionPipeline<'a, R: ?Sized> {
    retriever: &'a R,
    lookback: Duration,
    summary_sentences: usize,
}

impl<'a, R: FeedRetriever + ?Sized> IngestionPipeline<'a, R> {
    pub fn new(retriever: &'a R, lookback: Duration) -> Self {
        Self {
            retriever,
            lookback,
            summary_sentences: SUMMARY_SENTENCES,
        }
    }

    pub fn with_summary_sentences(mut self, sentences: usize) -> Self {
        self.summary_sentences = sentences;
        self
    }

    /// Retrieves every source in order. A failing source is recorded and
    /// skipped; it never stops the sources after it.
    pub async fn ingest<S: FetchLogStore + ?Sized>(
        &self,
        sources: &[FeedSource],
        fetch_log: &mut S,
        now: DateTime<Utc>,
    ) -> IngestReport {
        let age_limit = now - self.lookback;
        let mut report = IngestReport::default();

        for source in sources {
            let feed = match self.retriever.retrieve(source).await {
                Ok(feed) => feed,
                Err(e) => {
                    error!("Error parsing feed {}: {}", source.url, e);
                    report.failures.push(SourceFailure {
                        url: source.url.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let feed_title = effective_title(source, &feed);
            match articles_from_feed(
                &feed_title,
                &feed,
                age_limit,
                fetch_log,
                now,
                self.summary_sentences,
            ) {
                Some(articles) => {
                    info!("Retrieving [{}]...", feed_title);
                    debug!("[{}] produced {} articles", feed_title, articles.len());
                    report.updated_sources += 1;
                    report.articles.extend(articles);
                }
                None => {
                    info!(
                        "Skipping [{}]: No updates within the last {} week(s).",
                        feed_title,
                        self.lookback.num_weeks()
                    );
                    report.quiet_sources.push(feed_title);
                }
            }
        }

        report
    }
}

/// The configured title override, else the feed's own title.
pub fn effective_title(source: &FeedSource, feed: &ParsedFeed) -> String {
    source
        .title
        .clone()
        .unwrap_or_else(|| feed.title.clone())
}

/// Builds articles for entries published strictly after `age_limit`.
/// Returns `None` when no entry qualifies.
pub fn articles_from_feed<S: FetchLogStore + ?Sized>(
    feed_title: &str,
    feed: &ParsedFeed,
    age_limit: DateTime<Utc>,
    fetch_log: &mut S,
    now: DateTime<Utc>,
    summary_sentences: usize,
) -> Option<Vec<Article>> {
    let has_recent = feed
        .entries
        .iter()
        .any(|entry| entry.published.is_some_and(|p| p > age_limit));
    if !has_recent {
        return None;
    }

    let feed_author = feed.author.clone().unwrap_or_default();
    let homepage = feed.homepage.clone().unwrap_or_default();

    let articles = feed
        .entries
        .iter()
        .filter_map(|entry| {
            let published = entry.published.filter(|p| *p > age_limit)?;

            let body = if entry.description.is_empty() {
                &entry.content
            } else {
                &entry.description
            };

            Some(Article {
                title: entry.title.clone(),
                summary: summarize(body, summary_sentences),
                link: entry.link.clone(),
                published,
                feed_title: feed_title.to_string(),
                feed_author: feed_author.clone(),
                homepage: homepage.clone(),
                first_fetched: fetch_log.record_if_absent(&entry.link, now),
            })
        })
        .collect();

    Some(articles)
}
