//! DAO instance registry handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::{json_body, path_params, str_field};
use crate::error::{DaoError, Result};
use crate::models::{parse_dao_instance_id, DaoInstance, NewDaoInstance};
use crate::state::AppState;

/// GET /daos
pub async fn list_daos(State(state): State<AppState>) -> Result<Json<Vec<DaoInstance>>> {
    let daos = state.registry.list_instances().await?;
    Ok(Json(daos))
}

/// POST /daos - body `{name, token, staking, voting}`
pub async fn create_dao(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<DaoInstance>)> {
    let body = json_body(payload)?;
    // Absent and non-string fields read as empty and fail the same check.
    let field = |key: &str| str_field(&body, key).unwrap_or_default();
    let new_dao = NewDaoInstance::new(
        field("name"),
        field("token"),
        field("staking"),
        field("voting"),
    )?;

    let dao = state.registry.create_instance(&new_dao).await?;
    Ok((StatusCode::CREATED, Json(dao)))
}

/// GET /daos/:dao_instance_id
pub async fn get_dao(
    State(state): State<AppState>,
    params: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<DaoInstance>> {
    let id = parse_dao_instance_id(&path_params(params)?)?;
    state
        .registry
        .get_instance(id)
        .await?
        .map(Json)
        .ok_or_else(|| DaoError::NotFound(format!("DAO instance {id} not found")))
}
