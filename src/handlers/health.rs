use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.db.test_connection().await {
        Ok(()) => {
            let stats = state.db.connection_stats();
            debug!("Health check ok ({})", stats);
            (StatusCode::OK, Json(json!({ "status": "ok", "pool": stats })))
        }
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}

/// GET / when no client build is served.
pub async fn banner() -> &'static str {
    "DAElect Backend Server Running"
}
