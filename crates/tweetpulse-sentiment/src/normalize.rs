//! Post text cleanup ahead of classification.

use std::collections::HashSet;

use crate::types::RawItem;

/// Marker for a trailing link preview; everything from here on is dropped.
pub const LINK_MARKER: &str = " https";

/// Cuts `text` at the first [`LINK_MARKER`], or returns it whole.
#[must_use]
pub fn strip_trailing_link(text: &str) -> &str {
    text.find(LINK_MARKER).map_or(text, |idx| &text[..idx])
}

/// Truncates every item at its first link marker and drops exact duplicates,
/// keeping first-seen order. Empty truncated texts are kept like any other.
#[must_use]
pub fn normalize(items: &[RawItem]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());
    let mut corpus = Vec::with_capacity(items.len());

    for item in items {
        let cleaned = strip_trailing_link(&item.text);
        if seen.insert(cleaned) {
            corpus.push(cleaned.to_owned());
        }
    }

    corpus
}
