use crate::fetch_log::FetchLog;
use crate::types::{FeedSource, ParsedFeed, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Retrieves and parses one subscribed feed.
#[async_trait]
pub trait FeedRetriever: Send + Sync {
    async fn retrieve(&self, source: &FeedSource) -> Result<ParsedFeed>;
}

/// Persistent mapping from article link to first-seen time.
///
/// Implementations own a [`FetchLog`] and decide where it lives; the
/// record and cleanup operations only touch memory until [`save`] is called.
///
/// [`save`]: FetchLogStore::save
pub trait FetchLogStore {
    fn log(&self) -> &FetchLog;

    fn log_mut(&mut self) -> &mut FetchLog;

    /// Writes the whole log, replacing what was stored before.
    fn save(&mut self) -> Result<()>;

    /// Returns the stored first-seen time for `link`, storing `now` if the
    /// link has never been seen.
    fn record_if_absent(&mut self, link: &str, now: DateTime<Utc>) -> DateTime<Utc> {
        self.log_mut().record_if_absent(link, now)
    }

    /// Drops entries first seen strictly before `cutoff`. Returns how many were removed.
    fn cleanup(&mut self, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> usize {
        self.log_mut().cleanup(cutoff, now)
    }

    fn last_cleanup(&self) -> DateTime<Utc> {
        self.log().last_cleanup
    }
}
