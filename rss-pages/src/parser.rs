use crate::types::{AggregatorError, ParsedEntry, ParsedFeed, Result};
use feed_rs::model::{Entry, Link};
use feed_rs::parser;
use tracing::debug;

pub struct FeedParser;

impl FeedParser {
    /// Parses an RSS, Atom or JSON Feed document.
    pub fn parse_feed(content: &[u8]) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content)
            .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed.title.map(|t| t.content).unwrap_or_default();
        let author = feed
            .authors
            .into_iter()
            .map(|a| a.name)
            .find(|name| !name.is_empty());
        let homepage = homepage_link(&feed.links);

        let entries: Vec<ParsedEntry> = feed.entries.into_iter().map(Self::parse_entry).collect();

        debug!("Parsed feed '{}' with {} entries", title, entries.len());

        Ok(ParsedFeed {
            title,
            author,
            homepage,
            entries,
        })
    }

    fn parse_entry(entry: Entry) -> ParsedEntry {
        let title = entry.title.map(|t| t.content).unwrap_or_default();
        let link = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();
        let description = entry.summary.map(|s| s.content).unwrap_or_default();
        let content = entry.content.and_then(|c| c.body).unwrap_or_default();

        // Atom entries often carry only <updated>.
        let published = entry.published.or(entry.updated);

        ParsedEntry {
            title,
            description,
            content,
            link,
            published,
        }
    }
}

fn homepage_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| l.rel.as_deref() != Some("self"))
        .map(|l| l.href.clone())
}
