//! Permissive publication-date parsing with explicit default tracking.
//!
//! Feed sources disagree wildly about date formats: RFC 2822 from most RSS
//! channels, RFC 3339 from Atom-flavored ones, and our own rendered page
//! stores a bare `YYYY-MM-DD HH:MM`. Everything is parsed into a timestamp
//! in a single fixed reference zone (US Eastern) so articles from different
//! sources sort against each other consistently.
//!
//! Parsing never fails outright. When the text is missing or unreadable the
//! caller-chosen default is substituted, and [`DateOutcome`] records which
//! path was taken so tests (and debug logging) can tell a real timestamp
//! from a fabricated one.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;

/// Fixed reference zone: US Eastern standard time (UTC-05:00).
///
/// Applied uniformly to every naive timestamp; DST is deliberately ignored
/// since only one consistent zone is required for stable ordering.
pub static EASTERN: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::west_opt(5 * 3600).expect("UTC-5 is a valid offset"));

/// Naive formats accepted after the RFC forms fail, tried in order.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Why a timestamp had to be defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReason {
    /// The source supplied no date text at all.
    Missing,
    /// Date text was present but no known format matched.
    Unparseable,
}

/// The result of parsing a publication date.
///
/// Both variants carry a usable timestamp; the distinction only matters to
/// callers that want to know whether the value came from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOutcome {
    Parsed(DateTime<FixedOffset>),
    Defaulted(DateTime<FixedOffset>, DefaultReason),
}

impl DateOutcome {
    /// The timestamp, regardless of how it was obtained.
    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        match self {
            DateOutcome::Parsed(ts) => *ts,
            DateOutcome::Defaulted(ts, _) => *ts,
        }
    }

    pub fn was_defaulted(&self) -> bool {
        matches!(self, DateOutcome::Defaulted(..))
    }
}

/// The current moment in the reference zone.
pub fn now_eastern() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&*EASTERN)
}

/// The earliest instant we ever assign: midnight, year 1, reference zone.
///
/// Recovered articles whose stored date no longer parses sink to the bottom
/// of the listing instead of masquerading as fresh news.
pub fn earliest() -> DateTime<FixedOffset> {
    EASTERN
        .with_ymd_and_hms(1, 1, 1, 0, 0, 0)
        .single()
        .expect("year 1 midnight is representable")
}

/// Parse a date for a freshly fetched article.
///
/// Absent or unparseable text defaults to "now" so a new article is never
/// lost at the bottom of the page just because its feed mangled the date.
pub fn parse_published(text: Option<&str>) -> DateOutcome {
    match text.map(str::trim) {
        None | Some("") => DateOutcome::Defaulted(now_eastern(), DefaultReason::Missing),
        Some(s) => match parse_flexible(s) {
            Some(ts) => DateOutcome::Parsed(ts),
            None => DateOutcome::Defaulted(now_eastern(), DefaultReason::Unparseable),
        },
    }
}

/// Parse a date recovered from the previous output artifact.
///
/// Same parser as [`parse_published`], but failures default to [`earliest`]
/// rather than "now"; stale data must not reappear at the top of the page.
pub fn parse_recovered(text: &str) -> DateOutcome {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return DateOutcome::Defaulted(earliest(), DefaultReason::Missing);
    }
    match parse_flexible(trimmed) {
        Some(ts) => DateOutcome::Parsed(ts),
        None => DateOutcome::Defaulted(earliest(), DefaultReason::Unparseable),
    }
}

/// Format a timestamp the way the rendered page displays it.
pub fn format_display(ts: &DateTime<FixedOffset>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Try each known format in turn.
///
/// Zone-aware forms keep their own offset; naive forms get the Eastern
/// offset attached as-is (no conversion), matching how the display format
/// was written out in the first place.
fn parse_flexible(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc2822(s) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts);
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return naive.and_local_timezone(*EASTERN).single();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .and_then(|naive| naive.and_local_timezone(*EASTERN).single());
    }
    None
}
