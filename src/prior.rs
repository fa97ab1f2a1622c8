//! Recovery of previously published articles from the rendered page.
//!
//! The output HTML is the only persisted state: each run re-parses the page
//! it wrote last time and feeds those articles back into the merge. Every
//! `.news-item` carries the fields needed for full reconstruction: anchor
//! text and href, the displayed timestamp in a `<small>`, and hidden
//! `.category` / `.feed-name` spans.
//!
//! A missing or unreadable page means "no prior state" and never aborts
//! the run.

use std::path::Path;

use itertools::Itertools;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

use crate::models::Article;

/// Read and parse the previous output artifact, if any.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn extract_existing<P: AsRef<Path>>(path: P) -> Vec<Article> {
    let content = match tokio::fs::read_to_string(path.as_ref()).await {
        Ok(c) => c,
        Err(e) => {
            info!(error = %e, "No prior output to recover; starting fresh");
            return Vec::new();
        }
    };

    let articles = parse_prior_page(&content);
    info!(count = articles.len(), "Recovered existing articles");
    articles
}

/// Reconstruct articles from rendered page content.
///
/// Items without an anchor or with an empty href are skipped. The result is
/// defensively deduplicated by identity key; the page should already be
/// unique, but recovery must not assume it.
pub fn parse_prior_page(content: &str) -> Vec<Article> {
    let document = Html::parse_document(content);
    let item_selector = Selector::parse(".news-item").unwrap();
    let anchor_selector = Selector::parse("a").unwrap();
    let date_selector = Selector::parse("small").unwrap();
    let category_selector = Selector::parse(".category").unwrap();
    let feed_selector = Selector::parse(".feed-name").unwrap();

    let mut articles = Vec::new();
    for item in document.select(&item_selector) {
        let Some(anchor) = item.select(&anchor_selector).next() else {
            debug!("Skipping news item with no anchor");
            continue;
        };
        let title = anchor.text().collect::<String>();
        let link = anchor.value().attr("href").unwrap_or("").trim();
        if link.is_empty() {
            warn!(title = %title.trim(), "Skipping recovered item with empty link");
            continue;
        }

        let published = item
            .select(&date_selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();
        let category = span_text(&item, &category_selector).unwrap_or_else(|| "Unknown".to_string());
        let feed_name = span_text(&item, &feed_selector).unwrap_or_else(|| "Unknown".to_string());

        articles.push(Article::recover(&title, link, &published, &feed_name, &category));
    }

    articles
        .into_iter()
        .unique_by(Article::identity_key)
        .collect()
}

fn span_text(item: &scraper::ElementRef, selector: &Selector) -> Option<String> {
    item.select(selector).next().map(|el| {
        el.text().collect::<String>().trim().to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_html(title: &str, link: &str, date: &str, category: &str, feed: &str) -> String {
        format!(
            r#"<li class="news-item">
                <a href="{link}" target="_blank">{title}</a>
                <div class="meta">
                    <small>{date}</small>
                    <span class="category" style="display:none;">{category}</span>
                    <span class="feed-name" style="display:none;">{feed}</span>
                </div>
            </li>"#
        )
    }

    fn page(items: &[String]) -> String {
        format!(
            "<html><body><ul class=\"news-list\">{}</ul></body></html>",
            items.join("\n")
        )
    }

    #[test]
    fn test_parse_round_trip_fields() {
        let html = page(&[item_html(
            "Rates Rise",
            "https://a.com/1",
            "2024-01-02 10:00",
            "Bing News",
            "Bing Mortgage News",
        )]);

        let articles = parse_prior_page(&html);
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.title, "Rates Rise");
        assert_eq!(a.link, "https://a.com/1");
        assert_eq!(a.category, "Bing News");
        assert_eq!(a.feed_name, "Bing Mortgage News");
        assert_eq!(crate::dates::format_display(&a.published_at), "2024-01-02 10:00");
    }

    #[test]
    fn test_parse_unescapes_entities() {
        let html = page(&[item_html(
            "Supply &amp; Demand",
            "https://a.com/s?a=1&amp;b=2",
            "2024-01-02 10:00",
            "General",
            "Feed",
        )]);

        let articles = parse_prior_page(&html);
        assert_eq!(articles[0].title, "Supply & Demand");
        assert_eq!(articles[0].link, "https://a.com/s?a=1&b=2");
    }

    #[test]
    fn test_missing_metadata_defaults_to_unknown() {
        let html = page(&[r#"<li class="news-item"><a href="https://a.com/1">Bare Item</a></li>"#
            .to_string()]);

        let articles = parse_prior_page(&html);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].category, "Unknown");
        assert_eq!(articles[0].feed_name, "Unknown");
        // No stored date: recovered articles sink to the earliest instant.
        assert_eq!(articles[0].published_at, crate::dates::earliest());
    }

    #[test]
    fn test_unparseable_stored_date_sinks() {
        let html = page(&[item_html(
            "Odd Date",
            "https://a.com/odd",
            "around noon, probably",
            "General",
            "Feed",
        )]);

        let articles = parse_prior_page(&html);
        assert_eq!(articles[0].published_at, crate::dates::earliest());
    }

    #[test]
    fn test_defensive_dedup_within_extraction() {
        let html = page(&[
            item_html("Dup Story", "https://a.com/1", "2024-01-02 10:00", "C", "F"),
            item_html("dup story", "https://a.com/1", "2024-01-01 10:00", "C", "F"),
            item_html("Other", "https://a.com/2", "2024-01-01 09:00", "C", "F"),
        ]);

        let articles = parse_prior_page(&html);
        assert_eq!(articles.len(), 2);
        // First occurrence wins within the extraction step.
        assert_eq!(articles[0].title, "Dup Story");
    }

    #[test]
    fn test_items_without_anchor_or_link_skipped() {
        let html = page(&[
            r#"<li class="news-item"><small>2024-01-01 10:00</small></li>"#.to_string(),
            r#"<li class="news-item"><a href="">Empty Href</a></li>"#.to_string(),
            item_html("Kept", "https://a.com/k", "2024-01-01 10:00", "C", "F"),
        ]);

        let articles = parse_prior_page(&html);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Kept");
    }

    #[test]
    fn test_empty_page() {
        assert!(parse_prior_page("<html><body></body></html>").is_empty());
        assert!(parse_prior_page("").is_empty());
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_empty() {
        let articles = extract_existing("/nonexistent/real-estate-news.html").await;
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_extract_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("news.html");
        let html = page(&[item_html(
            "From Disk",
            "https://a.com/disk",
            "2024-01-02 10:00",
            "C",
            "F",
        )]);
        tokio::fs::write(&path, html).await.unwrap();

        let articles = extract_existing(&path).await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "From Disk");
    }
}
