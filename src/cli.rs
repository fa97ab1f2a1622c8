//! Command-line interface definitions.
//!
//! Every option has a default matching the stock setup, so a bare
//! invocation fetches the built-in feed table and rewrites
//! `real-estate-news.html` in the current directory.

use clap::Parser;

/// Command-line arguments for the aggregator.
///
/// # Examples
///
/// ```sh
/// # Stock run: built-in feeds, ./template.html, ./real-estate-news.html
/// real_estate_news
///
/// # Custom feed table and output location
/// real_estate_news --config feeds.yaml -o /srv/www/news.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the output HTML page (also re-read as prior state)
    #[arg(short, long, default_value = "real-estate-news.html")]
    pub output: String,

    /// Path of the optional HTML template containing the placeholder token
    #[arg(short, long, default_value = "template.html")]
    pub template: String,

    /// Optional YAML feed table; the built-in table is used when omitted
    #[arg(short, long)]
    pub config: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(&["real_estate_news"]);
        assert_eq!(cli.output, "real-estate-news.html");
        assert_eq!(cli.template, "template.html");
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(&[
            "real_estate_news",
            "-o",
            "/srv/www/news.html",
            "-t",
            "/srv/www/template.html",
            "-c",
            "feeds.yaml",
        ]);
        assert_eq!(cli.output, "/srv/www/news.html");
        assert_eq!(cli.template, "/srv/www/template.html");
        assert_eq!(cli.config.as_deref(), Some("feeds.yaml"));
    }
}
