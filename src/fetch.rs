//! Syndicated feed fetching and raw entry extraction.
//!
//! Feeds are fetched one at a time, each preceded by a short randomized
//! pause so the upstream search endpoints are not hammered. Every failure
//! mode (network error, non-success status, malformed XML, empty channel)
//! degrades to zero articles for that feed; the run always continues.
//!
//! The RSS `<item>` blocks are walked with a quick-xml event reader rather
//! than a full feed model so the `pubDate` text reaches the permissive date
//! parser verbatim.

use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::{BytesRef, Event};
use rand::Rng;
use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::config::FeedSource;
use crate::models::Article;

/// Upstream search feeds cap out around this many items anyway.
pub const MAX_ARTICLES_PER_FEED: usize = 100;

/// Politeness pause bounds before each fetch, in milliseconds.
const PAUSE_RANGE_MS: std::ops::RangeInclusive<u64> = 500..=1500;

/// A raw feed entry before normalization: text fields exactly as the feed
/// supplied them.
#[derive(Debug, PartialEq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    pub published: Option<String>,
}

/// Build the shared HTTP client with a per-request timeout.
///
/// Timeout expiry is indistinguishable from any other fetch error
/// downstream: the feed yields zero articles and the run continues.
pub fn build_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("real_estate_news/0.1 (RSS aggregator)")
        .build()
        .expect("HTTP client construction only fails on invalid builder settings")
}

/// Fetch one feed and normalize its entries.
///
/// Never errors: failures are logged and produce an empty vector.
#[instrument(level = "info", skip_all, fields(feed = %feed.name, category = %category))]
pub async fn fetch_feed(client: &Client, feed: &FeedSource, category: &str) -> Vec<Article> {
    info!(url = %feed.url, "Fetching feed");

    let pause_ms: u64 = rand::rng().random_range(PAUSE_RANGE_MS);
    sleep(Duration::from_millis(pause_ms)).await;

    let response = match client.get(&feed.url).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "Feed fetch failed");
            return Vec::new();
        }
    };
    if !response.status().is_success() {
        warn!(status = %response.status(), "Feed returned non-success status");
        return Vec::new();
    }
    let body = match response.text().await {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "Failed reading feed body");
            return Vec::new();
        }
    };

    let entries = parse_rss_items(&body);
    if entries.is_empty() {
        warn!("No entries found in feed");
        return Vec::new();
    }

    let articles: Vec<Article> = entries
        .into_iter()
        .take(MAX_ARTICLES_PER_FEED)
        .map(|entry| {
            Article::normalize(
                &entry.title,
                &entry.link,
                entry.published.as_deref(),
                &feed.name,
                category,
            )
        })
        .collect();

    info!(count = articles.len(), "Fetched articles from feed");
    articles
}

/// Walk RSS XML and pull the raw title/link/pubDate text out of each
/// `<item>`. Items without a link are dropped. Malformed XML simply stops
/// the walk, keeping whatever complete items came before the damage.
///
/// Text is accumulated across events: the reader splits character data
/// around entity references, which arrive as separate [`Event::GeneralRef`]
/// events, so a field must be appended to rather than overwritten.
pub fn parse_rss_items(xml: &str) -> Vec<RawEntry> {
    let mut reader = Reader::from_str(xml);

    let mut entries = Vec::new();
    let mut in_item = false;
    let mut current_tag = String::new();
    let mut title = String::new();
    let mut link = String::new();
    let mut published = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "item" {
                    in_item = true;
                    current_tag.clear();
                    title.clear();
                    link.clear();
                    published.clear();
                } else {
                    if in_item {
                        if let Some(buf) = field_buffer(&name, &mut title, &mut link, &mut published)
                        {
                            buf.clear();
                        }
                    }
                    current_tag = name;
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" && in_item {
                    in_item = false;
                    let link = link.trim();
                    let published = published.trim();
                    if !link.is_empty() {
                        entries.push(RawEntry {
                            title: title.trim().to_string(),
                            link: link.to_string(),
                            published: if published.is_empty() {
                                None
                            } else {
                                Some(published.to_string())
                            },
                        });
                    } else {
                        debug!(title = %title.trim(), "Skipping item with no link");
                    }
                } else {
                    // Whitespace between tags must not leak into a field.
                    current_tag.clear();
                }
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.decode().unwrap_or_default().into_owned();
                    append_field(&current_tag, &text, &mut title, &mut link, &mut published);
                }
            }
            Ok(Event::CData(e)) => {
                if in_item {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    append_field(&current_tag, &text, &mut title, &mut link, &mut published);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_item {
                    if let Some(resolved) = resolve_reference(&e) {
                        append_field(&current_tag, &resolved, &mut title, &mut link, &mut published);
                    } else {
                        debug!(tag = %current_tag, "Dropping unresolvable entity reference");
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "Malformed feed XML; keeping items parsed so far");
                break;
            }
            _ => {}
        }
    }

    entries
}

fn field_buffer<'a>(
    tag: &str,
    title: &'a mut String,
    link: &'a mut String,
    published: &'a mut String,
) -> Option<&'a mut String> {
    match tag {
        "title" => Some(title),
        "link" => Some(link),
        "pubDate" => Some(published),
        _ => None,
    }
}

fn append_field(tag: &str, text: &str, title: &mut String, link: &mut String, published: &mut String) {
    if let Some(buf) = field_buffer(tag, title, link, published) {
        buf.push_str(text);
    }
}

/// Resolve a character reference or one of the five predefined XML
/// entities. RSS feeds have no DTD, so anything else is undefined.
fn resolve_reference(reference: &BytesRef) -> Option<String> {
    if let Ok(Some(ch)) = reference.resolve_char_ref() {
        return Some(ch.to_string());
    }
    match reference.decode().ok()?.as_ref() {
        "amp" => Some("&".to_string()),
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "apos" => Some("'".to_string()),
        "quot" => Some("\"".to_string()),
        _ => None,
    }
}
