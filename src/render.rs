//! Rendering the merged article listing into the static output page.
//!
//! The article list becomes one flat HTML fragment, newest first. Each item
//! carries the anchor, the displayed timestamp, and hidden category and
//! feed-name spans so the next run can reconstruct every article from the
//! page alone. Titles, links, and metadata are escaped so the round trip
//! through the recovery parser is lossless.
//!
//! If a template file with the placeholder token exists, the fragment is
//! substituted into it; otherwise a self-contained standalone document is
//! synthesized so rendering never depends on the template being present.

use std::error::Error;
use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use tracing::{info, instrument, warn};

use crate::dates;
use crate::models::Article;

/// Token replaced by the article-list fragment when present in the template.
pub const PLACEHOLDER: &str = "<!-- NEWS_CONTENT_PLACEHOLDER -->";

/// Render the flat news-list fragment.
pub fn news_list_html(articles: &[Article], generated_at: DateTime<FixedOffset>) -> String {
    let mut html = String::new();
    writeln!(
        html,
        r#"<p class="last-updated">Last updated: {}</p>"#,
        generated_at.format("%Y-%m-%d %H:%M:%S %z")
    )
    .unwrap();

    html.push_str("<ul class=\"news-list\">\n");
    for article in articles {
        writeln!(
            html,
            r#"<li class="news-item">
    <a href="{link}" target="_blank">{title}</a>
    <div class="meta">
        <small>{published}</small>
        <span class="category" style="display:none;">{category}</span>
        <span class="feed-name" style="display:none;">{feed_name}</span>
    </div>
</li>"#,
            link = escape_html(&article.link),
            title = escape_html(&article.title),
            published = dates::format_display(&article.published_at),
            category = escape_html(&article.category),
            feed_name = escape_html(&article.feed_name),
        )
        .unwrap();
    }
    html.push_str("</ul>\n");
    html
}

/// Write the final page: template substitution when possible, standalone
/// document otherwise.
#[instrument(level = "info", skip_all, fields(output = %output_path.as_ref().display()))]
pub async fn write_output<P: AsRef<Path>, Q: AsRef<Path>>(
    fragment: &str,
    template_path: P,
    output_path: Q,
) -> Result<(), Box<dyn Error>> {
    let final_html = match tokio::fs::read_to_string(template_path.as_ref()).await {
        Ok(template) if template.contains(PLACEHOLDER) => {
            info!(template = %template_path.as_ref().display(), "Injecting into template");
            template.replace(PLACEHOLDER, fragment)
        }
        Ok(_) => {
            warn!(
                template = %template_path.as_ref().display(),
                "Template has no placeholder token; writing standalone page"
            );
            standalone_page(fragment)
        }
        Err(e) => {
            info!(error = %e, "No usable template; writing standalone page");
            standalone_page(fragment)
        }
    };

    tokio::fs::write(output_path.as_ref(), final_html).await?;
    info!("Wrote output page");
    Ok(())
}

/// Wrap the fragment in a complete document.
fn standalone_page(fragment: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Real Estate News</title>
    <style>
        body {{ font-family: Arial, sans-serif; padding: 20px; }}
        .news-list {{ padding-left: 0; list-style-type: none; }}
        .news-item {{ margin-bottom: 15px; padding-bottom: 15px; border-bottom: 1px solid #eee; }}
        .meta {{ color: #666; font-size: 0.9em; margin-top: 5px; }}
        .last-updated {{ color: #666; font-style: italic; margin-bottom: 20px; }}
        h1, h2, h3 {{ color: #333; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Real Estate News</h1>
        {fragment}
    </div>
</body>
</html>
"#
    )
}

/// Escape text for HTML element and attribute positions.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prior;

    fn article(title: &str, link: &str, when: &str) -> Article {
        Article::recover(title, link, when, "Home Sales in Title", "Residential Real Estate")
    }

    fn generated_at() -> DateTime<FixedOffset> {
        dates::parse_recovered("2024-06-01 12:00").timestamp()
    }

    #[test]
    fn test_fragment_structure() {
        let articles = vec![article("Rates Rise", "https://a.com/1", "2024-01-02 10:00")];
        let html = news_list_html(&articles, generated_at());

        assert!(html.contains("Last updated: 2024-06-01 12:00"));
        assert!(html.contains(r#"<a href="https://a.com/1" target="_blank">Rates Rise</a>"#));
        assert!(html.contains("<small>2024-01-02 10:00</small>"));
        assert!(html.contains(r#"<span class="category" style="display:none;">Residential Real Estate</span>"#));
        assert!(html.contains(r#"<span class="feed-name" style="display:none;">Home Sales in Title</span>"#));
    }

    #[test]
    fn test_fragment_escapes_title_and_link() {
        let articles = vec![article("Supply & <Demand>", "https://a.com/s?a=1&b=2", "2024-01-02 10:00")];
        let html = news_list_html(&articles, generated_at());

        assert!(html.contains("Supply &amp; &lt;Demand&gt;"));
        assert!(html.contains(r#"href="https://a.com/s?a=1&amp;b=2""#));
    }

    #[test]
    fn test_empty_listing_still_renders() {
        let html = news_list_html(&[], generated_at());
        assert!(html.contains("news-list"));
        assert!(html.contains("Last updated"));
    }

    #[test]
    fn test_render_recover_round_trip() {
        let articles = vec![
            article("Supply & Demand", "https://a.com/s?a=1&b=2", "2024-01-02 10:00"),
            article("Other Story", "https://b.com/2", "2024-01-01 08:00"),
        ];
        let page = standalone_page(&news_list_html(&articles, generated_at()));

        let recovered = prior::parse_prior_page(&page);
        assert_eq!(recovered, articles);
    }

    #[tokio::test]
    async fn test_write_with_template() {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("template.html");
        let output_path = dir.path().join("out.html");
        tokio::fs::write(
            &template_path,
            format!("<html><body><h1>My Site</h1>{PLACEHOLDER}</body></html>"),
        )
        .await
        .unwrap();

        let fragment = news_list_html(
            &[article("Story", "https://a.com/1", "2024-01-02 10:00")],
            generated_at(),
        );
        write_output(&fragment, &template_path, &output_path).await.unwrap();

        let written = tokio::fs::read_to_string(&output_path).await.unwrap();
        assert!(written.contains("<h1>My Site</h1>"));
        assert!(written.contains("Story"));
        assert!(!written.contains(PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_write_without_template_is_standalone() {
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("out.html");

        let fragment = news_list_html(&[], generated_at());
        write_output(&fragment, dir.path().join("missing-template.html"), &output_path)
            .await
            .unwrap();

        let written = tokio::fs::read_to_string(&output_path).await.unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
        assert!(written.contains("news-list"));
    }

    #[tokio::test]
    async fn test_template_without_placeholder_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("template.html");
        let output_path = dir.path().join("out.html");
        tokio::fs::write(&template_path, "<html><body>no token here</body></html>")
            .await
            .unwrap();

        let fragment = news_list_html(&[], generated_at());
        write_output(&fragment, &template_path, &output_path).await.unwrap();

        let written = tokio::fs::read_to_string(&output_path).await.unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
        assert!(!written.contains("no token here"));
    }
}
