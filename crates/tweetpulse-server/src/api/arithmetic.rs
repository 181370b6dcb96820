//! Integer arithmetic endpoints used as liveness smoke checks.

use axum::{extract::Path, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::ApiError;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct Total {
    pub total: i64,
}

fn checked(
    req_id: RequestId,
    op: &'static str,
    result: Option<i64>,
) -> Result<Json<Total>, ApiError> {
    result.map(|total| Json(Total { total })).ok_or_else(|| {
        ApiError::new(req_id.0, "bad_request", format!("{op} overflows a 64-bit integer"))
    })
}

pub(super) async fn add(
    Extension(req_id): Extension<RequestId>,
    Path((a, b)): Path<(i64, i64)>,
) -> Result<Json<Total>, ApiError> {
    checked(req_id, "sum", a.checked_add(b))
}

pub(super) async fn sub(
    Extension(req_id): Extension<RequestId>,
    Path((a, b)): Path<(i64, i64)>,
) -> Result<Json<Total>, ApiError> {
    checked(req_id, "difference", a.checked_sub(b))
}

pub(super) async fn multiply(
    Extension(req_id): Extension<RequestId>,
    Path((a, b)): Path<(i64, i64)>,
) -> Result<Json<Total>, ApiError> {
    checked(req_id, "product", a.checked_mul(b))
}
