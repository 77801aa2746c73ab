use crate::config::Settings;
use crate::fetch_log::{cleanup_cutoff, JsonFetchLogStore};
use crate::pipeline::{IngestionPipeline, SourceFailure};
use crate::publisher::{MetadataFields, PublishReport, Publisher};
use crate::sources::RssFeedRetriever;
use crate::traits::{FeedRetriever, FetchLogStore};
use crate::types::Result;
use crate::utils::time::format_duration;
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Outcome of one run. Everything in here is non-fatal.
#[derive(Debug, Default)]
pub struct RunReport {
    pub articles: usize,
    pub failures: Vec<SourceFailure>,
    pub quiet_sources: Vec<String>,
    pub publish: PublishReport,
    /// Entries pruned from the fetch log, if a cleanup ran.
    pub expired_entries: Option<usize>,
    pub fetch_log_error: Option<String>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.publish.failures.is_empty() && self.fetch_log_error.is_none()
    }
}

pub struct RssAggregator<R, S> {
    settings: Settings,
    retriever: R,
    fetch_log: S,
    publisher: Publisher,
}

impl RssAggregator<RssFeedRetriever, JsonFetchLogStore> {
    /// HTTP retrieval and the on-disk fetch log named in `settings`.
    pub fn from_settings(settings: Settings, now: DateTime<Utc>) -> Result<Self> {
        let retriever = RssFeedRetriever::new(settings.fetch.clone())?;
        let fetch_log = JsonFetchLogStore::load(&settings.fetch_log_path, now)?;
        Self::new(settings, retriever, fetch_log)
    }
}

impl<R: FeedRetriever, S: FetchLogStore> RssAggregator<R, S> {
    /// Fails if the output directory cannot be created or listed.
    pub fn new(settings: Settings, retriever: R, fetch_log: S) -> Result<Self> {
        let publisher = Publisher::new(&settings.output_dir, settings.articles_per_page);
        publisher.prepare()?;

        Ok(Self {
            settings,
            retriever,
            fetch_log,
            publisher,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn fetch_log(&self) -> &S {
        &self.fetch_log
    }

    /// Ingests every source, publishes the pages, then persists the fetch log.
    /// The fetch log is saved before a publish error is returned.
    pub async fn run(&mut self, now: DateTime<Utc>) -> Result<RunReport> {
        let lookback = self.settings.lookback();

        info!("Fetching {} feeds", self.settings.feeds.len());
        let ingest = IngestionPipeline::new(&self.retriever, lookback)
            .ingest(&self.settings.feeds, &mut self.fetch_log, now)
            .await;

        let expired_entries = if self.fetch_log.log().cleanup_due(now) {
            info!(
                "Last fetch log cleanup was {} ago, pruning",
                format_duration(now.signed_duration_since(self.fetch_log.last_cleanup()))
            );
            Some(self.fetch_log.cleanup(cleanup_cutoff(now, lookback), now))
        } else {
            None
        };

        let mut report = RunReport {
            articles: ingest.articles.len(),
            failures: ingest.failures,
            quiet_sources: ingest.quiet_sources,
            expired_entries,
            ..Default::default()
        };

        let fields = MetadataFields {
            fetched_weeks: self.settings.fetch_weeks,
            repo: self.settings.repo.clone(),
            tagline: self.settings.tagline.clone(),
        };
        let published = self.publisher.publish(ingest.articles, &fields, now);

        // Stamps from this ingest are kept even when publishing aborts.
        if let Err(e) = self.fetch_log.save() {
            error!("Error saving fetch log: {}", e);
            report.fetch_log_error = Some(e.to_string());
        }

        report.publish = published?;
        Ok(report)
    }
}
