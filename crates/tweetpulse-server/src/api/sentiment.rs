use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tweetpulse_sentiment::{SentimentLabel, SentimentReport};

use crate::middleware::RequestId;

use super::{map_sentiment_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Default, Deserialize)]
pub(super) struct SentimentParams {
    pub pages: Option<u32>,
    pub page_size: Option<u32>,
}

/// Label counts only, keyed by label name.
#[derive(Debug, Serialize)]
pub(super) struct NlpResponse {
    pub sentiment: BTreeMap<SentimentLabel, usize>,
}

pub(super) async fn get_sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(term): Path<String>,
    Query(params): Query<SentimentParams>,
) -> Result<Json<ApiResponse<SentimentReport>>, ApiError> {
    let report = state
        .analyze(&term, params.pages, params.page_size)
        .await
        .map_err(|e| map_sentiment_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn nlp(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(term): Path<String>,
) -> Result<Json<NlpResponse>, ApiError> {
    let report = state
        .analyze(&term, None, None)
        .await
        .map_err(|e| map_sentiment_error(req_id.0, &e))?;

    Ok(Json(NlpResponse {
        sentiment: report.summary.counts,
    }))
}
