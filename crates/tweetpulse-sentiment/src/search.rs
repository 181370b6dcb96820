//! Client for the recent-search endpoint of the X/Twitter v2 API.
//!
//! Pages are chained through the opaque `meta.next_token` cursor. Every page
//! request repeats the original query parameters and adds the cursor returned
//! by the page before it. A response without a cursor ends pagination early;
//! the items collected so far are returned with [`FetchOutcome::exhausted`]
//! set.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use tweetpulse_core::AppConfig;

use crate::error::SentimentError;
use crate::types::{FetchOutcome, RawItem, SearchQuery};

const DEFAULT_BASE_URL: &str = "https://api.twitter.com/2/";
const SEARCH_PATH: &str = "tweets/search/recent";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Option<Vec<RawItem>>,
    meta: Option<SearchMeta>,
}

#[derive(Debug, Deserialize)]
struct SearchMeta {
    next_token: Option<String>,
    result_count: Option<u64>,
}

/// One parsed response page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub items: Vec<RawItem>,
    pub next_token: Option<String>,
}

/// Pre-authenticated search API client.
///
/// Use [`SearchClient::new`] for production or [`SearchClient::with_base_url`]
/// to point at a mock server in tests.
pub struct SearchClient {
    client: Client,
    bearer_token: String,
    endpoint: Url,
}

impl SearchClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Config`] if the HTTP client cannot be built.
    pub fn new(bearer_token: &str, timeout_secs: u64) -> Result<Self, SentimentError> {
        Self::with_base_url(bearer_token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Config`] if the HTTP client cannot be built
    /// or `base_url` is not a valid URL.
    pub fn with_base_url(
        bearer_token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SentimentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("tweetpulse/0.1 (sentiment-summary)")
            .build()
            .map_err(|e| SentimentError::Config(format!("failed to build HTTP client: {e}")))?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment (`/2` would otherwise be dropped).
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(SEARCH_PATH))
            .map_err(|e| SentimentError::Config(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            bearer_token: bearer_token.to_owned(),
            endpoint,
        })
    }

    /// Builds a client from the startup configuration.
    ///
    /// # Errors
    ///
    /// See [`SearchClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SentimentError> {
        Self::with_base_url(
            &config.twitter_bearer_token,
            config.request_timeout_secs,
            &config.twitter_api_base_url,
        )
    }

    /// Fetches up to `page_count` pages for `query`.
    ///
    /// Stops early when the item budget is met or the API returns no
    /// continuation token. Items are concatenated in fetch order without
    /// deduplication and capped at [`SearchQuery::total_budget`]. A
    /// `page_count` of zero is treated as one.
    ///
    /// # Errors
    ///
    /// - [`SentimentError::FetchFailed`] on network failure, timeout or a
    ///   non-2xx status.
    /// - [`SentimentError::MalformedResponse`] if a page lacks its `data` list.
    pub async fn fetch(
        &self,
        query: &SearchQuery,
        page_count: u32,
    ) -> Result<FetchOutcome, SentimentError> {
        let mut outcome = FetchOutcome {
            pages_requested: page_count.max(1),
            ..FetchOutcome::default()
        };
        let mut cursor: Option<String> = None;

        for page in 1..=outcome.pages_requested {
            let SearchPage { items, next_token } =
                self.fetch_page(query, cursor.as_deref()).await?;

            tracing::debug!(
                term = query.term(),
                page,
                count = items.len(),
                has_next = next_token.is_some(),
                "fetched search page"
            );

            outcome.pages_fetched = page;
            outcome.items.extend(items);

            if outcome.items.len() >= query.total_budget() {
                outcome.items.truncate(query.total_budget());
                break;
            }

            match next_token {
                Some(token) => cursor = Some(token),
                None => {
                    if page < outcome.pages_requested {
                        outcome.exhausted = true;
                        tracing::info!(
                            term = query.term(),
                            requested = outcome.pages_requested,
                            fetched = page,
                            "search results exhausted before requested page count"
                        );
                    }
                    break;
                }
            }
        }

        Ok(outcome)
    }

    /// Fetches a single page, continuing from `next_token` when given.
    ///
    /// # Errors
    ///
    /// Same as [`SearchClient::fetch`].
    pub async fn fetch_page(
        &self,
        query: &SearchQuery,
        next_token: Option<&str>,
    ) -> Result<SearchPage, SentimentError> {
        let url = self.build_url(query, next_token);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SentimentError::FetchFailed(format!(
                "search API returned status {status}"
            )));
        }

        let body = response.text().await.map_err(|e| transport_error(&e))?;
        parse_search_page(&body)
    }

    /// Builds the request URL with percent-encoded query parameters.
    fn build_url(&self, query: &SearchQuery, next_token: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &query.query_text());
            pairs.append_pair("max_results", &query.page_size().to_string());
            if let Some(token) = next_token {
                pairs.append_pair("next_token", token);
            }
        }
        url
    }
}

fn transport_error(error: &reqwest::Error) -> SentimentError {
    if error.is_timeout() {
        SentimentError::FetchFailed(format!("search request timed out: {error}"))
    } else {
        SentimentError::FetchFailed(error.to_string())
    }
}

/// Parses one search response body.
///
/// The API omits `data` when a search matches nothing; that case is an empty
/// page as long as `meta.result_count` is `0`. Any other body without a
/// `data` list is malformed. Blank cursors are treated as absent.
///
/// # Errors
///
/// Returns [`SentimentError::MalformedResponse`] for invalid JSON, a
/// missing `data` list, or items without `text`.
pub fn parse_search_page(body: &str) -> Result<SearchPage, SentimentError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| SentimentError::MalformedResponse(format!("invalid search body: {e}")))?;

    let (next_token, result_count) = match response.meta {
        Some(meta) => (
            meta.next_token.filter(|t| !t.trim().is_empty()),
            meta.result_count,
        ),
        None => (None, None),
    };

    let items = match (response.data, result_count) {
        (Some(items), _) => items,
        (None, Some(0)) => Vec::new(),
        (None, _) => {
            return Err(SentimentError::MalformedResponse(
                "response has no `data` list".to_string(),
            ))
        }
    };

    Ok(SearchPage { items, next_token })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use tweetpulse_core::SearchFilter;

    use super::*;

    fn query() -> SearchQuery {
        let exclusions: BTreeSet<SearchFilter> = [SearchFilter::Retweets].into_iter().collect();
        SearchQuery::new("rust lang", exclusions, 100, 200).unwrap()
    }

    #[test]
    fn parses_items_and_next_token() {
        let body = r#"{
            "data": [
                {"id": "1", "text": "first", "edit_history_tweet_ids": ["1"]},
                {"id": "2", "text": "second"}
            ],
            "meta": {"newest_id": "2", "oldest_id": "1", "result_count": 2, "next_token": "b26v89c19zqg8o3f"}
        }"#;
        let page = parse_search_page(body).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].text, "second");
        assert_eq!(page.next_token.as_deref(), Some("b26v89c19zqg8o3f"));
    }

    #[test]
    fn missing_next_token_is_end_of_results() {
        let body = r#"{"data": [{"text": "only"}], "meta": {"result_count": 1}}"#;
        let page = parse_search_page(body).unwrap();
        assert!(page.next_token.is_none());
    }

    #[test]
    fn blank_next_token_is_treated_as_absent() {
        let body = r#"{"data": [{"text": "only"}], "meta": {"next_token": "  "}}"#;
        assert!(parse_search_page(body).unwrap().next_token.is_none());
    }

    #[test]
    fn zero_result_page_without_data_is_empty() {
        let body = r#"{"meta": {"result_count": 0}}"#;
        let page = parse_search_page(body).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_token.is_none());
    }

    #[test]
    fn missing_data_is_malformed() {
        let body = r#"{"meta": {"result_count": 5}}"#;
        let err = parse_search_page(body).unwrap_err();
        assert!(matches!(err, SentimentError::MalformedResponse(_)), "got {err:?}");
    }

    #[test]
    fn data_of_wrong_shape_is_malformed() {
        let body = r#"{"data": {"text": "not a list"}}"#;
        let err = parse_search_page(body).unwrap_err();
        assert!(matches!(err, SentimentError::MalformedResponse(_)));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_search_page("<html>gateway</html>").unwrap_err();
        assert!(matches!(err, SentimentError::MalformedResponse(_)));
    }

    #[test]
    fn build_url_encodes_query_and_appends_cursor() {
        let client = SearchClient::with_base_url("token", 5, "https://api.example.com/2").unwrap();
        let url = client.build_url(&query(), Some("NEXT"));
        assert_eq!(url.path(), "/2/tweets/search/recent");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "rust lang -is:retweet".to_string()),
                ("max_results".to_string(), "100".to_string()),
                ("next_token".to_string(), "NEXT".to_string()),
            ]
        );
    }

    #[test]
    fn build_url_first_page_has_no_cursor() {
        let client = SearchClient::with_base_url("token", 5, "https://api.example.com/2/").unwrap();
        let url = client.build_url(&query(), None);
        assert!(url.query_pairs().all(|(k, _)| k != "next_token"));
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let result = SearchClient::with_base_url("token", 5, "not a url");
        assert!(matches!(result, Err(SentimentError::Config(_))));
    }
}
