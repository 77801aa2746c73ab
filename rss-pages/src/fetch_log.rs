use crate::traits::FetchLogStore;
use crate::types::{AggregatorError, Result};
use crate::utils::{time, write_json_atomic};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Minimum time between two cleanups.
pub const CLEANUP_INTERVAL_HOURS: i64 = 24;

/// First-seen times keyed by article link, plus when the map was last pruned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchLog {
    pub articles: BTreeMap<String, DateTime<Utc>>,
    pub last_cleanup: DateTime<Utc>,
}

impl FetchLog {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            articles: BTreeMap::new(),
            last_cleanup: now,
        }
    }

    pub fn record_if_absent(&mut self, link: &str, now: DateTime<Utc>) -> DateTime<Utc> {
        *self.articles.entry(link.to_string()).or_insert(now)
    }

    pub fn first_seen(&self, link: &str) -> Option<DateTime<Utc>> {
        self.articles.get(link).copied()
    }

    pub fn cleanup(&mut self, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> usize {
        let before = self.articles.len();
        self.articles.retain(|_, first_seen| *first_seen >= cutoff);
        self.last_cleanup = now;

        let removed = before - self.articles.len();
        debug!("Fetch log cleanup removed {} of {} entries", removed, before);
        removed
    }

    pub fn cleanup_due(&self, now: DateTime<Utc>) -> bool {
        time::has_elapsed(
            self.last_cleanup,
            Duration::hours(CLEANUP_INTERVAL_HOURS),
            now,
        )
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

/// Entries first seen before this instant are discarded. Twice the lookback
/// window, so a skipped scheduled run does not resurface old articles as new.
pub fn cleanup_cutoff(now: DateTime<Utc>, lookback: Duration) -> DateTime<Utc> {
    now - lookback * 2
}

/// Fetch log persisted as a single JSON document.
pub struct JsonFetchLogStore {
    path: PathBuf,
    log: FetchLog,
}

impl JsonFetchLogStore {
    /// Reads the log at `path`. A missing file yields an empty log; a file
    /// that exists but cannot be read or decoded is an error.
    pub fn load(path: impl Into<PathBuf>, now: DateTime<Utc>) -> Result<Self> {
        let path = path.into();

        let log = match fs::read(&path) {
            Ok(bytes) => {
                let log: FetchLog = serde_json::from_slice(&bytes)?;
                info!("Loaded fetch log {} ({} entries)", path.display(), log.len());
                log
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No fetch log at {}, starting empty", path.display());
                FetchLog::empty(now)
            }
            Err(e) => return Err(AggregatorError::file(&path, e)),
        };

        Ok(Self { path, log })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FetchLogStore for JsonFetchLogStore {
    fn log(&self) -> &FetchLog {
        &self.log
    }

    fn log_mut(&mut self) -> &mut FetchLog {
        &mut self.log
    }

    fn save(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AggregatorError::file(parent, e))?;
        }
        write_json_atomic(&self.path, &self.log)?;
        debug!("Saved fetch log {} ({} entries)", self.path.display(), self.log.len());
        Ok(())
    }
}

/// Fetch log kept in memory only. `saves` counts calls to `save`.
#[derive(Debug, Clone)]
pub struct MemoryFetchLogStore {
    log: FetchLog,
    pub saves: usize,
}

impl MemoryFetchLogStore {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::from_log(FetchLog::empty(now))
    }

    pub fn from_log(log: FetchLog) -> Self {
        Self { log, saves: 0 }
    }
}

impl FetchLogStore for MemoryFetchLogStore {
    fn log(&self) -> &FetchLog {
        &self.log
    }

    fn log_mut(&mut self) -> &mut FetchLog {
        &mut self.log
    }

    fn save(&mut self) -> Result<()> {
        self.saves += 1;
        Ok(())
    }
}
