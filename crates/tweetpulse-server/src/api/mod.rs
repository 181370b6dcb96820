mod arithmetic;
mod page;
mod sentiment;

use std::{collections::BTreeSet, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tweetpulse_core::{AppConfig, SearchFilter};
use tweetpulse_sentiment::{
    analyze_term, Classifier, SearchClient, SearchQuery, SentimentError, SentimentReport,
};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

/// Upper bound on `pages` accepted from a single HTTP request.
pub(crate) const MAX_PAGES_PER_REQUEST: u32 = 10;

/// Search settings applied when a request does not override them.
#[derive(Debug, Clone)]
pub struct SearchDefaults {
    pub page_size: u8,
    pub page_count: u32,
    pub exclusions: BTreeSet<SearchFilter>,
    pub concurrency: usize,
}

impl SearchDefaults {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            page_size: config.search_page_size,
            page_count: config.search_page_count,
            exclusions: config.search_exclusions.clone(),
            concurrency: config.classify_concurrency,
        }
    }

    /// Builds the query and page count for `term`, applying overrides.
    ///
    /// The item budget is `page_count * page_size`.
    fn query(
        &self,
        term: &str,
        pages: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<(SearchQuery, u32), SentimentError> {
        let page_count = pages.unwrap_or(self.page_count);
        if !(1..=MAX_PAGES_PER_REQUEST).contains(&page_count) {
            return Err(SentimentError::InvalidQuery(format!(
                "pages must be between 1 and {MAX_PAGES_PER_REQUEST}"
            )));
        }

        let page_size = match page_size {
            Some(raw) => u8::try_from(raw).map_err(|_| {
                SentimentError::InvalidQuery(format!("page size {raw} is out of range"))
            })?,
            None => self.page_size,
        };

        let pages = usize::try_from(page_count).map_err(|_| {
            SentimentError::InvalidQuery(format!("pages {page_count} is out of range"))
        })?;
        let budget = usize::from(page_size) * pages;
        let query = SearchQuery::new(term, self.exclusions.clone(), page_size, budget)?;
        Ok((query, page_count))
    }
}

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchClient>,
    pub classifier: Arc<Classifier>,
    pub defaults: Arc<SearchDefaults>,
}

impl AppState {
    /// Runs the search-and-classify pipeline for one term.
    pub(crate) async fn analyze(
        &self,
        term: &str,
        pages: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<SentimentReport, SentimentError> {
        let (query, page_count) = self.defaults.query(term, pages, page_size)?;
        analyze_term(
            &self.search,
            &self.classifier,
            &query,
            page_count,
            self.defaults.concurrency,
        )
        .await
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    classifier: String,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

/// HTTP status for an error code.
pub(super) fn status_for_code(code: &str) -> StatusCode {
    match code {
        "bad_request" => StatusCode::BAD_REQUEST,
        "fetch_failed" | "malformed_response" => StatusCode::BAD_GATEWAY,
        "classification_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = status_for_code(&self.error.code);
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_sentiment_error(request_id: String, error: &SentimentError) -> ApiError {
    if matches!(error, SentimentError::InvalidQuery(_)) {
        tracing::debug!(error = %error, "rejected sentiment request");
    } else {
        tracing::error!(error = %error, code = error.code(), "sentiment request failed");
    }
    ApiError::new(request_id, error.code(), error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/search", get(page::search))
        .route("/api/v1/health", get(health))
        .route("/api/v1/sentiment/{term}", get(sentiment::get_sentiment))
        .route("/nlp/{term}", get(sentiment::nlp))
        .route("/add/{a}/{b}", get(arithmetic::add))
        .route("/sub/{a}/{b}", get(arithmetic::sub))
        .route("/multiply/{a}/{b}", get(arithmetic::multiply))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            classifier: state.classifier.kind().to_string(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
