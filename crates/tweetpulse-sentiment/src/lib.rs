//! Search-term sentiment summaries.
//!
//! Pulls recent posts for a term from the X/Twitter search API following
//! continuation tokens, strips link previews and duplicates, classifies each
//! post with a configurable backend, and aggregates the verdicts into label
//! percentages.

pub mod aggregate;
pub mod classifier;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod search;
pub mod types;

pub use aggregate::{aggregate, DEFAULT_CONFIDENCE_THRESHOLD};
pub use classifier::{lexicon_score, Classifier, ComprehendClient, LexiconClassifier, RemoteClassifier};
pub use error::SentimentError;
pub use normalize::normalize;
pub use pipeline::analyze_term;
pub use search::{SearchClient, SearchPage};
pub use types::{
    ClassificationResult, FetchOutcome, LabelSet, RawItem, SearchQuery, SentimentLabel,
    SentimentReport, SentimentSummary,
};
