mod common;

use chrono::Duration;
use common::{entry, feed, init_tracing, ts, ScriptedRetriever};
use rss_pages::{FeedSource, FetchLog, FetchLogStore, IngestionPipeline, MemoryFetchLogStore};
use tracing::info;

const NOW: &str = "2024-05-10T12:00:00Z";
const ONE: &str = "https://one.example.com/feed.xml";
const TWO: &str = "https://two.example.com/feed.xml";

#[tokio::test]
async fn test_lookback_window_excludes_cutoff_and_undated_entries() {
    init_tracing();
    let now = ts(NOW);

    let retriever = ScriptedRetriever::new().with_feed(
        ONE,
        feed(
            "One",
            vec![
                entry("https://one.example.com/at-cutoff", Some("2024-05-03T12:00:00Z"), "At."),
                entry("https://one.example.com/just-inside", Some("2024-05-03T12:00:01Z"), "In."),
                entry("https://one.example.com/undated", None, "Undated."),
                entry("https://one.example.com/old", Some("2024-04-01T00:00:00Z"), "Old."),
            ],
        ),
    );
    let mut log = MemoryFetchLogStore::new(now);

    let report = IngestionPipeline::new(&retriever, Duration::weeks(1))
        .ingest(&[FeedSource::new(ONE)], &mut log, now)
        .await;

    let links: Vec<&str> = report.articles.iter().map(|a| a.link.as_str()).collect();
    assert_eq!(links, vec!["https://one.example.com/just-inside"]);
    assert_eq!(report.updated_sources, 1);
    assert_eq!(log.log().len(), 1, "only published articles are recorded");
}

#[tokio::test]
async fn test_quiet_source_is_skipped_without_error() {
    init_tracing();
    let now = ts(NOW);

    let retriever = ScriptedRetriever::new().with_feed(
        ONE,
        feed(
            "Quiet Blog",
            vec![
                entry("https://one.example.com/old", Some("2024-01-01T00:00:00Z"), "Old."),
                entry("https://one.example.com/undated", None, "Undated."),
            ],
        ),
    );
    let mut log = MemoryFetchLogStore::new(now);

    let report = IngestionPipeline::new(&retriever, Duration::weeks(4))
        .ingest(&[FeedSource::new(ONE)], &mut log, now)
        .await;

    assert!(report.articles.is_empty());
    assert!(report.failures.is_empty());
    assert_eq!(report.quiet_sources, vec!["Quiet Blog".to_string()]);
    assert!(log.log().is_empty());
}

#[tokio::test]
async fn test_failing_source_does_not_stop_the_run() {
    init_tracing();
    let now = ts(NOW);

    let retriever = ScriptedRetriever::new()
        .with_failure(ONE, "connection refused")
        .with_feed(
            TWO,
            feed("Two", vec![entry("https://two.example.com/a", Some("2024-05-09T00:00:00Z"), "A.")]),
        );
    let mut log = MemoryFetchLogStore::new(now);

    let report = IngestionPipeline::new(&retriever, Duration::weeks(4))
        .ingest(&[FeedSource::new(ONE), FeedSource::new(TWO)], &mut log, now)
        .await;

    info!("Failures: {:?}", report.failures);
    assert_eq!(retriever.calls(), vec![ONE.to_string(), TWO.to_string()]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, ONE);
    assert!(report.failures[0].error.contains("connection refused"));
    assert_eq!(report.articles.len(), 1);
    assert_eq!(report.articles[0].feed_title, "Two");
}

#[tokio::test]
async fn test_article_fields_come_from_source_and_feed() {
    init_tracing();
    let now = ts(NOW);

    let mut parsed = feed(
        "Feed Title",
        vec![entry(
            "https://one.example.com/post",
            Some("2024-05-09T08:30:00Z"),
            "<p>One. Two. Three. Four.</p>",
        )],
    );
    parsed.author = Some("Jane Doe".to_string());
    parsed.homepage = Some("https://one.example.com/".to_string());

    let retriever = ScriptedRetriever::new()
        .with_feed(ONE, parsed.clone())
        .with_feed(TWO, feed("Bare", parsed.entries.clone()));
    let mut log = MemoryFetchLogStore::new(now);

    let sources = [FeedSource::new(ONE).with_title("Override"), FeedSource::new(TWO)];
    let report = IngestionPipeline::new(&retriever, Duration::weeks(4))
        .ingest(&sources, &mut log, now)
        .await;

    let first = &report.articles[0];
    assert_eq!(first.title, "Post post");
    assert_eq!(first.feed_title, "Override");
    assert_eq!(first.feed_author, "Jane Doe");
    assert_eq!(first.homepage, "https://one.example.com/");
    assert_eq!(first.summary, "One. Two. Three...");
    assert_eq!(first.published, ts("2024-05-09T08:30:00Z"));
    assert_eq!(first.first_fetched, now);

    let second = &report.articles[1];
    assert_eq!(second.feed_title, "Bare");
    assert_eq!(second.feed_author, "");
    assert_eq!(second.homepage, "");
}

#[tokio::test]
async fn test_summary_falls_back_to_content() {
    init_tracing();
    let now = ts(NOW);

    let mut item = entry("https://one.example.com/post", Some("2024-05-09T00:00:00Z"), "");
    item.content = "<div>From the content body.</div>".to_string();
    let retriever = ScriptedRetriever::new().with_feed(ONE, feed("One", vec![item]));
    let mut log = MemoryFetchLogStore::new(now);

    let report = IngestionPipeline::new(&retriever, Duration::weeks(4))
        .with_summary_sentences(1)
        .ingest(&[FeedSource::new(ONE)], &mut log, now)
        .await;

    assert_eq!(report.articles[0].summary, "From the content body");
}

#[tokio::test]
async fn test_whitespace_description_is_still_the_summary_body() {
    init_tracing();
    let now = ts(NOW);

    let mut item = entry("https://one.example.com/post", Some("2024-05-09T00:00:00Z"), "  \n ");
    item.content = "<div>From the content body.</div>".to_string();
    let retriever = ScriptedRetriever::new().with_feed(ONE, feed("One", vec![item]));
    let mut log = MemoryFetchLogStore::new(now);

    let report = IngestionPipeline::new(&retriever, Duration::weeks(4))
        .ingest(&[FeedSource::new(ONE)], &mut log, now)
        .await;

    assert_eq!(report.articles[0].summary, "");
}

#[tokio::test]
async fn test_first_fetched_reuses_logged_time() {
    init_tracing();
    let now = ts(NOW);
    let earlier = ts("2024-05-08T06:00:00Z");

    let mut previous = FetchLog::empty(earlier);
    previous.articles.insert("https://one.example.com/seen".to_string(), earlier);
    let mut log = MemoryFetchLogStore::from_log(previous);

    let retriever = ScriptedRetriever::new().with_feed(
        ONE,
        feed(
            "One",
            vec![
                entry("https://one.example.com/seen", Some("2024-05-08T00:00:00Z"), "Seen."),
                entry("https://one.example.com/new", Some("2024-05-09T00:00:00Z"), "New."),
            ],
        ),
    );

    let report = IngestionPipeline::new(&retriever, Duration::weeks(4))
        .ingest(&[FeedSource::new(ONE)], &mut log, now)
        .await;

    assert_eq!(report.articles[0].first_fetched, earlier);
    assert_eq!(report.articles[1].first_fetched, now);
    assert_eq!(log.log().first_seen("https://one.example.com/new"), Some(now));
    assert_eq!(log.saves, 0, "ingestion never persists on its own");
}
