pub mod types;
pub mod traits;
pub mod config;
pub mod summarize;
pub mod fetch_log;
pub mod fetcher;
pub mod parser;
pub mod sources;
pub mod pipeline;
pub mod publisher;
pub mod aggregator;
pub mod utils;

pub use types::*;
pub use traits::{FeedRetriever, FetchLogStore};
pub use config::{load_settings, ConfigPaths, FeedsConfig, Settings};
pub use summarize::summarize;
pub use fetch_log::{FetchLog, JsonFetchLogStore, MemoryFetchLogStore};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use sources::RssFeedRetriever;
pub use pipeline::{IngestReport, IngestionPipeline, SourceFailure};
pub use publisher::{MetadataFields, PublishFailure, PublishReport, Publisher};
pub use aggregator::{RssAggregator, RunReport};
