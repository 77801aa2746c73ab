use crate::types::{AggregatorError, FeedSource, FetchConfig, Result};
use chrono::Duration;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

pub const USER_CONFIG_PATH: &str = "feeds.yaml";
pub const SAMPLE_CONFIG_PATH: &str = "feeds.sample.yaml";

/// Overrides the `repo` display field when set.
pub const REPO_ENV: &str = "GITHUB_REPOSITORY";

pub const DEFAULT_ARTICLES_PER_PAGE: usize = 20;
pub const DEFAULT_FETCH_WEEKS: u32 = 4;
pub const DEFAULT_REPO: &str = "rss-pages/rss-pages";
pub const DEFAULT_TAGLINE: &str = "Recent posts from around the web";

pub const DEFAULT_OUTPUT_DIR: &str = "web/articles";
pub const DEFAULT_FETCH_LOG_PATH: &str = "web/data/fetch_log.json";

/// The configuration file as written by the user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedsConfig {
    #[serde(default)]
    pub feeds: Vec<FeedSource>,
    pub articles_per_page: Option<usize>,
    pub fetch_weeks: Option<u32>,
    pub repo: Option<String>,
    pub tagline: Option<String>,
}

impl FeedsConfig {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| AggregatorError::file(path, e))?;
        Self::parse(&content)
    }
}

/// Where to look for the configuration file. The user file wins over the sample.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub user: PathBuf,
    pub sample: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self {
            user: PathBuf::from(USER_CONFIG_PATH),
            sample: PathBuf::from(SAMPLE_CONFIG_PATH),
        }
    }
}

impl ConfigPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            user: dir.join(USER_CONFIG_PATH),
            sample: dir.join(SAMPLE_CONFIG_PATH),
        }
    }

    pub fn resolve(&self) -> Result<&Path> {
        if self.user.exists() {
            Ok(&self.user)
        } else if self.sample.exists() {
            warn!(
                "{} not found, using sample configuration {}",
                self.user.display(),
                self.sample.display()
            );
            Ok(&self.sample)
        } else {
            Err(AggregatorError::ConfigNotFound {
                user: self.user.clone(),
                sample: self.sample.clone(),
            })
        }
    }
}

/// Fully resolved run settings; every optional field has been defaulted.
#[derive(Debug, Clone)]
pub struct Settings {
    pub feeds: Vec<FeedSource>,
    pub articles_per_page: usize,
    pub fetch_weeks: u32,
    pub repo: String,
    pub tagline: String,
    pub output_dir: PathBuf,
    pub fetch_log_path: PathBuf,
    pub fetch: FetchConfig,
}

impl Settings {
    pub fn from_config(config: FeedsConfig, repo_override: Option<String>) -> Result<Self> {
        let articles_per_page = match config.articles_per_page {
            Some(0) => return Err(AggregatorError::Config("articlesPerPage must be at least 1".to_string())),
            Some(n) => n,
            None => DEFAULT_ARTICLES_PER_PAGE,
        };

        let fetch_weeks = match config.fetch_weeks {
            Some(0) => return Err(AggregatorError::Config("fetchWeeks must be at least 1".to_string())),
            Some(n) => n,
            None => DEFAULT_FETCH_WEEKS,
        };

        let repo = non_blank(repo_override)
            .or_else(|| non_blank(config.repo))
            .unwrap_or_else(|| DEFAULT_REPO.to_string());
        let tagline = non_blank(config.tagline).unwrap_or_else(|| DEFAULT_TAGLINE.to_string());

        let feeds = validate_feeds(config.feeds)?;
        if feeds.is_empty() {
            warn!("Configuration lists no feeds");
        }

        Ok(Self {
            feeds,
            articles_per_page,
            fetch_weeks,
            repo,
            tagline,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            fetch_log_path: PathBuf::from(DEFAULT_FETCH_LOG_PATH),
            fetch: FetchConfig::default(),
        })
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_fetch_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fetch_log_path = path.into();
        self
    }

    pub fn lookback(&self) -> Duration {
        Duration::weeks(i64::from(self.fetch_weeks))
    }
}

/// Resolves the configuration file, reads it, and applies the environment override.
pub fn load_settings(paths: &ConfigPaths) -> Result<Settings> {
    let path = paths.resolve()?;
    let config = FeedsConfig::load(path)?;
    let settings = Settings::from_config(config, std::env::var(REPO_ENV).ok())?;

    info!(
        "Loaded {} feeds from {} ({} per page, {} week lookback)",
        settings.feeds.len(),
        path.display(),
        settings.articles_per_page,
        settings.fetch_weeks
    );
    Ok(settings)
}

fn validate_feeds(feeds: Vec<FeedSource>) -> Result<Vec<FeedSource>> {
    let mut seen = HashSet::new();
    let mut valid = Vec::with_capacity(feeds.len());

    for feed in feeds {
        let url = feed.url.trim().to_string();
        let parsed = Url::parse(&url)
            .map_err(|e| AggregatorError::Config(format!("feed url '{}': {}", url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AggregatorError::Config(format!(
                "feed url '{}' must use http or https",
                url
            )));
        }

        if !seen.insert(url.clone()) {
            warn!("Ignoring duplicate feed {}", url);
            continue;
        }

        valid.push(FeedSource {
            url,
            title: non_blank(feed.title),
        });
    }

    Ok(valid)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
