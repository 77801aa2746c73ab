use crate::types::{AggregatorError, Article, PageMetadata, Result};
use crate::utils::write_json_atomic;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info};

pub const METADATA_FILE: &str = "metadata.json";

/// Display fields copied into `metadata.json` untouched.
#[derive(Debug, Clone)]
pub struct MetadataFields {
    pub fetched_weeks: u32,
    pub repo: String,
    pub tagline: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct PublishReport {
    pub total_pages: usize,
    pub pages_written: usize,
    pub stale_removed: usize,
    pub metadata_written: bool,
    pub failures: Vec<PublishFailure>,
}

/// Newest calendar day first; within a day, the most recently discovered first.
pub fn sort_articles(articles: &mut [Article]) {
    articles.sort_by(|a, b| {
        b.published
            .date_naive()
            .cmp(&a.published.date_naive())
            .then_with(|| b.first_fetched.cmp(&a.first_fetched))
    });
}

pub fn page_count(articles: usize, page_size: usize) -> usize {
    articles.div_ceil(page_size)
}

pub fn page_file_name(page: usize) -> String {
    format!("page_{}.json", page)
}

/// The page number encoded in a `page_<N>.json` file name.
pub fn page_index(file_name: &str) -> Option<usize> {
    let digits = file_name.strip_prefix("page_")?.strip_suffix(".json")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Writes the sorted article set as numbered page files plus a metadata file.
pub struct Publisher {
    output_dir: PathBuf,
    page_size: usize,
}

impl Publisher {
    pub fn new(output_dir: impl Into<PathBuf>, page_size: usize) -> Self {
        Self {
            output_dir: output_dir.into(),
            page_size: page_size.max(1),
        }
    }

    /// Creates the output directory and checks that it can be listed.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| AggregatorError::file(&self.output_dir, e))?;
        self.existing_pages().map(|_| ())
    }

    /// Page files currently in the output directory. Directories and other
    /// non-file entries are never treated as pages.
    pub fn existing_pages(&self) -> Result<Vec<PathBuf>> {
        let entries =
            fs::read_dir(&self.output_dir).map_err(|e| AggregatorError::file(&self.output_dir, e))?;

        let mut pages = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AggregatorError::file(&self.output_dir, e))?;
            let name = entry.file_name();
            if name.to_str().and_then(page_index).is_none() {
                continue;
            }
            let file_type = entry
                .file_type()
                .map_err(|e| AggregatorError::file(entry.path(), e))?;
            if file_type.is_file() {
                pages.push(entry.path());
            }
        }
        pages.sort();
        Ok(pages)
    }

    /// Replaces the published page set.
    ///
    /// Failing to prepare the directory or to remove an old page aborts
    /// before anything new is written. A page or metadata write failure is
    /// recorded in the report and the remaining files are still attempted.
    pub fn publish(
        &self,
        mut articles: Vec<Article>,
        fields: &MetadataFields,
        now: DateTime<Utc>,
    ) -> Result<PublishReport> {
        self.prepare()?;

        let mut report = PublishReport::default();

        for path in self.existing_pages()? {
            fs::remove_file(&path).map_err(|e| AggregatorError::file(&path, e))?;
            debug!("Removed previous page {}", path.display());
            report.stale_removed += 1;
        }

        sort_articles(&mut articles);
        report.total_pages = page_count(articles.len(), self.page_size);

        for (index, page) in articles.chunks(self.page_size).enumerate() {
            let path = self.output_dir.join(page_file_name(index + 1));
            match write_json_atomic(&path, page) {
                Ok(()) => report.pages_written += 1,
                Err(e) => {
                    error!("Error writing page {}: {}", index + 1, e);
                    report.failures.push(PublishFailure {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        let metadata = PageMetadata {
            total_pages: report.total_pages,
            last_fetched: now,
            fetched_weeks: fields.fetched_weeks,
            repo: fields.repo.clone(),
            tagline: fields.tagline.clone(),
        };
        let metadata_path = self.output_dir.join(METADATA_FILE);
        match write_json_atomic(&metadata_path, &metadata) {
            Ok(()) => report.metadata_written = true,
            Err(e) => {
                error!("Error writing metadata: {}", e);
                report.failures.push(PublishFailure {
                    path: metadata_path,
                    error: e.to_string(),
                });
            }
        }

        info!(
            "Published {} articles across {} pages to {}",
            articles.len(),
            report.total_pages,
            self.output_dir.display()
        );
        Ok(report)
    }
}
