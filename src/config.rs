//! The feed source table: category -> feed name -> feed URL.
//!
//! Loaded from an optional YAML file, falling back to the built-in table of
//! Google News and Bing News search feeds. Each URL already encodes its own
//! search operators and is opaque to the rest of the pipeline. The table is
//! immutable once loaded and passed into the pipeline at startup.

use std::error::Error;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::warn;
use url::Url;

/// The built-in feed table, as shipped.
const DEFAULT_FEEDS_YAML: &str = include_str!("default_feeds.yaml");

static DEFAULT_TABLE: Lazy<FeedTable> = Lazy::new(|| {
    serde_yaml::from_str(DEFAULT_FEEDS_YAML).expect("built-in feed table is valid YAML")
});

/// The whole configured feed universe.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedTable {
    pub categories: Vec<Category>,
}

/// A presentation grouping of one or more feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub name: String,
    pub feeds: Vec<FeedSource>,
}

/// A single named, URL-addressed syndicated feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedTable {
    /// Load a table from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a table from a YAML string.
    pub fn from_str(content: &str) -> Result<Self, Box<dyn Error>> {
        let table: FeedTable = serde_yaml::from_str(content)?;
        Ok(table)
    }

    /// The built-in table covering the stock real estate searches.
    pub fn builtin() -> Self {
        DEFAULT_TABLE.clone()
    }

    /// Total number of feeds across all categories.
    pub fn feed_count(&self) -> usize {
        self.categories.iter().map(|c| c.feeds.len()).sum()
    }

    /// Warn about feed URLs that do not parse. The feeds are kept, and the
    /// fetch step will log and skip them, but a typo surfaces at startup
    /// instead of mid-run.
    pub fn warn_on_invalid_urls(&self) {
        for category in &self.categories {
            for feed in &category.feeds {
                if let Err(e) = Url::parse(&feed.url) {
                    warn!(
                        category = %category.name,
                        feed = %feed.name,
                        url = %feed.url,
                        error = %e,
                        "Feed URL does not parse"
                    );
                }
            }
        }
    }
}
