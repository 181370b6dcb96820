//! Search-to-summary orchestration for one request.

use crate::aggregate::aggregate;
use crate::classifier::Classifier;
use crate::error::SentimentError;
use crate::normalize::normalize;
use crate::search::SearchClient;
use crate::types::{SearchQuery, SentimentReport};

/// Run the full sentiment pipeline for one search term.
///
/// 1. Fetch up to `page_count` pages of posts for `query`.
/// 2. Strip trailing links and drop duplicate texts.
/// 3. Classify every unique text with `classifier`.
/// 4. Aggregate verdicts into label percentages.
///
/// Running out of pages early is not an error; the report's `exhausted`
/// flag is set instead. An empty corpus skips classification and yields an
/// all-zero summary.
///
/// # Errors
///
/// Returns [`SentimentError::FetchFailed`] or
/// [`SentimentError::MalformedResponse`] if any page cannot be fetched, and
/// [`SentimentError::ClassificationUnavailable`] if the backend fails. No
/// partial summary is produced in either case.
pub async fn analyze_term(
    search: &SearchClient,
    classifier: &Classifier,
    query: &SearchQuery,
    page_count: u32,
    concurrency: usize,
) -> Result<SentimentReport, SentimentError> {
    let outcome = search.fetch(query, page_count).await?;
    let corpus = normalize(&outcome.items);

    tracing::info!(
        term = query.term(),
        fetched = outcome.items.len(),
        unique = corpus.len(),
        pages = outcome.pages_fetched,
        exhausted = outcome.exhausted,
        "search corpus ready"
    );

    let results = if corpus.is_empty() {
        Vec::new()
    } else {
        classifier.classify_all(&corpus, concurrency).await?
    };

    let summary = aggregate(
        &results,
        classifier.label_set(),
        classifier.confidence_threshold(),
    );

    Ok(SentimentReport {
        term: query.term().to_owned(),
        summary,
        fetched_count: outcome.items.len(),
        corpus_size: corpus.len(),
        pages_requested: outcome.pages_requested,
        pages_fetched: outcome.pages_fetched,
        exhausted: outcome.exhausted,
    })
}
