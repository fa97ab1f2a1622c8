//! The core article model and its normalization from raw feed entries.
//!
//! An [`Article`] is an immutable value: constructed once per run from
//! either a live feed entry or the recovered prior page, carried through
//! the merge, and discarded after rendering. Identity across independent
//! fetches is `(lowercase title, link)`. Nothing else participates, so a
//! re-dated or re-categorized copy of the same story still deduplicates.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};

use crate::dates::{self, DateOutcome};

/// A single news item with everything the page (and the next run's
/// recovery pass) needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// Headline text; identity-significant case-insensitively.
    pub title: String,
    /// Target URL; identity-significant with exact matching.
    pub link: String,
    /// Publication instant in the fixed reference zone.
    pub published_at: DateTime<FixedOffset>,
    /// Configured category the feed was fetched under.
    pub category: String,
    /// Configured feed name within that category.
    pub feed_name: String,
}

impl Article {
    /// Build an Article from a raw feed entry. Never fails: title and link
    /// are trimmed, and the date falls back to "now" when the feed omits or
    /// mangles it (see [`dates::parse_published`]).
    pub fn normalize(
        title: &str,
        link: &str,
        published_text: Option<&str>,
        feed_name: &str,
        category: &str,
    ) -> Self {
        Self::with_outcome(title, link, dates::parse_published(published_text), feed_name, category)
    }

    /// Build an Article recovered from the prior output page. Unparseable
    /// stored dates sink to the earliest instant instead of "now".
    pub fn recover(
        title: &str,
        link: &str,
        published_text: &str,
        feed_name: &str,
        category: &str,
    ) -> Self {
        Self::with_outcome(title, link, dates::parse_recovered(published_text), feed_name, category)
    }

    fn with_outcome(
        title: &str,
        link: &str,
        outcome: DateOutcome,
        feed_name: &str,
        category: &str,
    ) -> Self {
        if outcome.was_defaulted() {
            tracing::debug!(title = %title.trim(), ?outcome, "Publication date defaulted");
        }
        Self {
            title: title.trim().to_string(),
            link: link.trim().to_string(),
            published_at: outcome.timestamp(),
            category: category.to_string(),
            feed_name: feed_name.to_string(),
        }
    }

    /// The deduplication key: lowercase title paired with the exact link.
    pub fn identity_key(&self) -> (String, String) {
        (self.title.to_lowercase(), self.link.clone())
    }
}

/// Regroup a flat article sequence into category -> feed name -> articles.
///
/// Purely for presentation metadata (per-category summaries); the rendered
/// listing itself stays flat and globally sorted. Input order is preserved
/// within each feed bucket.
pub fn group_articles(articles: &[Article]) -> BTreeMap<&str, BTreeMap<&str, Vec<&Article>>> {
    let mut grouped: BTreeMap<&str, BTreeMap<&str, Vec<&Article>>> = BTreeMap::new();
    for article in articles {
        grouped
            .entry(article.category.as_str())
            .or_default()
            .entry(article.feed_name.as_str())
            .or_default()
            .push(article);
    }
    grouped
}
