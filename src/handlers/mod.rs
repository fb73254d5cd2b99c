//! HTTP handlers.
//!
//! GET  /daos                                        - list registered instances
//! POST /daos                                        - register an instance
//! GET  /daos/:id                                    - one instance
//! GET  /daos/:id/proposals/:proposal_id/details     - stored text or ""
//! POST /daos/:id/proposals/:proposal_id/details     - upsert text, 404 if the
//!                                                     instance is unknown
//! GET  /health                                      - database liveness
//!
//! Malformed ids and undecodable path segments are 400. Unknown API paths
//! are a JSON 404.

pub mod daos;
pub mod details;
pub mod health;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{OriginalUri, Path};
use axum::Json;
use serde_json::Value;

use crate::error::DaoError;

/// Unwrap a JSON body, turning extractor rejections (bad syntax, wrong
/// content type) into validation errors so every client fault is a 400.
pub(crate) fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, DaoError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        DaoError::validation(format!("Invalid JSON body: {}", rejection.body_text()))
    })
}

/// Unwrap path parameters the same way, so a segment that fails to
/// percent-decode still gets a JSON error body.
pub(crate) fn path_params<T>(params: Result<Path<T>, PathRejection>) -> Result<T, DaoError> {
    params.map(|Path(value)| value).map_err(|rejection| {
        DaoError::validation(format!("Invalid path parameter: {}", rejection.body_text()))
    })
}

/// Fallback for paths that match no API route.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> DaoError {
    DaoError::NotFound(format!("No route for {}", uri.path()))
}

/// String member of a JSON object; `None` when absent or of another type.
pub(crate) fn str_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}
