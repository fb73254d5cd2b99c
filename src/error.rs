//! Error taxonomy for the proposal details service.
//!
//! Store adapters return [`DaoError`]; handlers return it unchanged and the
//! [`IntoResponse`] impl turns it into a status code plus a JSON body with a
//! `message` field (and the engine message under `error` where useful).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DaoError>;

#[derive(Debug, Error)]
pub enum DaoError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// Ownership proof missing or not matching the claimed signer.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Storage-level uniqueness violation.
    #[error("{message}")]
    Conflict { message: String, detail: String },

    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl DaoError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn storage(context: &'static str, source: sqlx::Error) -> Self {
        Self::Storage { context, source }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Diagnostic detail from the storage engine, if any. Clients must not
    /// branch on it.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Conflict { detail, .. } => Some(detail.clone()),
            Self::Storage { source, .. } => Some(source.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntoResponse for DaoError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
        }

        let body = ErrorResponse {
            message: self.to_string(),
            error: self.detail(),
        };
        (status, Json(body)).into_response()
    }
}
