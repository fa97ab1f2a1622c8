//! Merge, sort, and deduplicate fresh and recovered articles.
//!
//! The pipeline's core: combine freshly fetched articles with those
//! recovered from the previous page, order everything newest-first, then
//! keep exactly one article per identity key. Sorting *before* the dedup
//! scan is what guarantees the survivor for each key is the most recently
//! seen copy.

use std::collections::HashSet;

use tracing::{info, instrument};

use crate::models::Article;

/// Combine fresh and prior articles into one duplicate-free sequence,
/// sorted by publication time descending.
///
/// The sort is stable, so among exact-timestamp duplicates the first input
/// occurrence (fresh before prior) survives; the contract only requires
/// that exactly one of them does.
#[instrument(level = "info", skip_all, fields(fresh = fresh.len(), prior = prior.len()))]
pub fn merge_and_dedup(fresh: Vec<Article>, prior: Vec<Article>) -> Vec<Article> {
    let mut combined = fresh;
    combined.extend(prior);
    let before = combined.len();

    combined.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(combined.len());
    combined.retain(|article| seen.insert(article.identity_key()));

    info!(
        combined = before,
        removed = before - combined.len(),
        unique = combined.len(),
        "Removed duplicate articles"
    );
    combined
}
