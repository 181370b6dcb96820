use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tweetpulse_core::SearchFilter;

use crate::error::SentimentError;

/// Smallest `max_results` the recent-search endpoint accepts.
pub const MIN_PAGE_SIZE: u8 = 10;
/// Largest `max_results` the recent-search endpoint accepts.
pub const MAX_PAGE_SIZE: u8 = 100;

/// A validated search request. Fields are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    term: String,
    exclusions: BTreeSet<SearchFilter>,
    page_size: u8,
    total_budget: usize,
}

impl SearchQuery {
    /// Build a query for `term`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::InvalidQuery`] when the term is blank, the
    /// page size is outside `10..=100`, or the item budget is zero.
    pub fn new(
        term: &str,
        exclusions: BTreeSet<SearchFilter>,
        page_size: u8,
        total_budget: usize,
    ) -> Result<Self, SentimentError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(SentimentError::InvalidQuery(
                "search term must not be blank".to_string(),
            ));
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(SentimentError::InvalidQuery(format!(
                "page size {page_size} is outside {MIN_PAGE_SIZE}..={MAX_PAGE_SIZE}"
            )));
        }
        if total_budget == 0 {
            return Err(SentimentError::InvalidQuery(
                "item budget must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            term: term.to_string(),
            exclusions,
            page_size,
            total_budget,
        })
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub fn exclusions(&self) -> &BTreeSet<SearchFilter> {
        &self.exclusions
    }

    #[must_use]
    pub fn page_size(&self) -> u8 {
        self.page_size
    }

    #[must_use]
    pub fn total_budget(&self) -> usize {
        self.total_budget
    }

    /// The `query` parameter sent to the search API: the term followed by one
    /// negated operator per exclusion, e.g. `rust -is:retweet -is:reply`.
    #[must_use]
    pub fn query_text(&self) -> String {
        let mut text = self.term.clone();
        for filter in &self.exclusions {
            text.push(' ');
            text.push_str(filter.operator());
        }
        text
    }
}

/// One post returned by the search API. Every field except `text` is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawItem {
    pub text: String,
}

/// Items gathered across all fetched pages.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Items in fetch order, capped at the query's item budget.
    pub items: Vec<RawItem>,
    pub pages_requested: u32,
    pub pages_fetched: u32,
    /// `true` when the API stopped returning continuation tokens before
    /// `pages_requested` pages were fetched.
    pub exhausted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl SentimentLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Neutral => "NEUTRAL",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Mixed => "MIXED",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The labels a backend can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSet {
    FourClass,
    ThreeClass,
    TwoClass,
}

impl LabelSet {
    #[must_use]
    pub fn labels(self) -> &'static [SentimentLabel] {
        match self {
            LabelSet::FourClass => &[
                SentimentLabel::Positive,
                SentimentLabel::Neutral,
                SentimentLabel::Negative,
                SentimentLabel::Mixed,
            ],
            LabelSet::ThreeClass => &[
                SentimentLabel::Positive,
                SentimentLabel::Neutral,
                SentimentLabel::Negative,
            ],
            LabelSet::TwoClass => &[SentimentLabel::Positive, SentimentLabel::Negative],
        }
    }

    /// Threshold backends come in two- and three-class flavours.
    #[must_use]
    pub fn from_class_count(classes: u8) -> Option<Self> {
        match classes {
            2 => Some(LabelSet::TwoClass),
            3 => Some(LabelSet::ThreeClass),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains(self, label: SentimentLabel) -> bool {
        self.labels().contains(&label)
    }
}

/// A single backend verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationResult {
    pub label: SentimentLabel,
    /// Score in `[0, 1]`.
    pub confidence: f64,
}

impl ClassificationResult {
    #[must_use]
    pub fn new(label: SentimentLabel, confidence: f64) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Aggregated verdicts for one corpus.
///
/// `counts` and `percentages` hold one entry per label of the backend's
/// label set, zero-filled. The counts plus `count_unclassified` always add up
/// to `count_total`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSummary {
    pub percentages: BTreeMap<SentimentLabel, Decimal>,
    pub counts: BTreeMap<SentimentLabel, usize>,
    pub count_unclassified: usize,
    pub count_total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f64>,
}

impl SentimentSummary {
    #[must_use]
    pub fn count(&self, label: SentimentLabel) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn percentage(&self, label: SentimentLabel) -> Decimal {
        self.percentages
            .get(&label)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Items that cleared the confidence cutoff; the percentage denominator.
    #[must_use]
    pub fn classified_count(&self) -> usize {
        self.count_total - self.count_unclassified
    }
}

/// Result of one full search-and-classify run.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentReport {
    pub term: String,
    pub summary: SentimentSummary,
    /// Posts returned by the search API before cleaning.
    pub fetched_count: usize,
    /// Unique cleaned texts that were classified.
    pub corpus_size: usize,
    pub pages_requested: u32,
    pub pages_fetched: u32,
    pub exhausted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(list: &[SearchFilter]) -> BTreeSet<SearchFilter> {
        list.iter().copied().collect()
    }

    #[test]
    fn query_text_appends_operators_in_stable_order() {
        let query = SearchQuery::new(
            "  hemp seltzer ",
            filters(&[SearchFilter::Replies, SearchFilter::Retweets]),
            100,
            200,
        )
        .unwrap();
        assert_eq!(query.term(), "hemp seltzer");
        assert_eq!(query.query_text(), "hemp seltzer -is:retweet -is:reply");
    }

    #[test]
    fn query_without_exclusions_is_just_the_term() {
        let query = SearchQuery::new("rust", BTreeSet::new(), 10, 10).unwrap();
        assert_eq!(query.query_text(), "rust");
    }

    #[test]
    fn blank_term_is_rejected() {
        let err = SearchQuery::new("   ", BTreeSet::new(), 100, 100).unwrap_err();
        assert!(matches!(err, SentimentError::InvalidQuery(_)));
    }

    #[test]
    fn page_size_bounds_are_enforced() {
        assert!(SearchQuery::new("rust", BTreeSet::new(), 9, 100).is_err());
        assert!(SearchQuery::new("rust", BTreeSet::new(), 101, 100).is_err());
        assert!(SearchQuery::new("rust", BTreeSet::new(), 100, 100).is_ok());
    }

    #[test]
    fn zero_budget_is_rejected() {
        assert!(SearchQuery::new("rust", BTreeSet::new(), 100, 0).is_err());
    }

    #[test]
    fn raw_item_ignores_extra_fields() {
        let json = r#"{"id":"1","text":"hello","edit_history_tweet_ids":["1"]}"#;
        let item: RawItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.text, "hello");
    }

    #[test]
    fn labels_serialize_screaming_case() {
        let json = serde_json::to_string(&SentimentLabel::Mixed).unwrap();
        assert_eq!(json, "\"MIXED\"");
    }

    #[test]
    fn label_sets_have_expected_members() {
        assert_eq!(LabelSet::FourClass.labels().len(), 4);
        assert!(!LabelSet::ThreeClass.contains(SentimentLabel::Mixed));
        assert!(!LabelSet::TwoClass.contains(SentimentLabel::Neutral));
        assert_eq!(LabelSet::from_class_count(2), Some(LabelSet::TwoClass));
        assert_eq!(LabelSet::from_class_count(4), None);
    }

    #[test]
    fn classification_confidence_is_clamped() {
        let result = ClassificationResult::new(SentimentLabel::Positive, 1.7);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    }
}
