use thiserror::Error;

/// Failures that abort a sentiment request.
///
/// Running out of search pages is not an error: a short corpus is reported
/// through [`crate::FetchOutcome::exhausted`] instead.
#[derive(Debug, Error)]
pub enum SentimentError {
    /// Transport failure, timeout or non-2xx status from the search API.
    #[error("search request failed: {0}")]
    FetchFailed(String),

    /// The search API answered with a body that does not match its schema.
    #[error("malformed search response: {0}")]
    MalformedResponse(String),

    /// The sentiment backend could not be reached or returned an error.
    #[error("classification unavailable: {0}")]
    ClassificationUnavailable(String),

    #[error("invalid search query: {0}")]
    InvalidQuery(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SentimentError {
    /// Stable machine-readable code, used by the HTTP layer.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SentimentError::FetchFailed(_) => "fetch_failed",
            SentimentError::MalformedResponse(_) => "malformed_response",
            SentimentError::ClassificationUnavailable(_) => "classification_unavailable",
            SentimentError::InvalidQuery(_) => "bad_request",
            SentimentError::Config(_) => "config_error",
        }
    }
}
