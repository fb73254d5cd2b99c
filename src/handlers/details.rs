//! Proposal details handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{json_body, path_params, str_field};
use crate::error::{DaoError, Result};
use crate::models::{parse_dao_instance_id, ProposalId};
use crate::signature::OwnershipProof;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DetailsResponse {
    pub details: String,
}

#[derive(Debug, Serialize)]
pub struct SaveDetailsResponse {
    pub message: String,
    pub dao_instance_id: i64,
    pub proposal_id: String,
    pub last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_signer: Option<String>,
}

fn parse_key(dao_instance_id: &str, proposal_id: &str) -> Result<(i64, ProposalId)> {
    Ok((
        parse_dao_instance_id(dao_instance_id)?,
        ProposalId::parse(proposal_id)?,
    ))
}

/// `signer` + `signature` (+ optional `message`) from the body, if the
/// caller sent any of them.
fn ownership_proof(body: &Value) -> Result<Option<OwnershipProof>> {
    let present = |key: &str| body.get(key).is_some_and(|v| !v.is_null());
    if !present("signer") && !present("signature") {
        return Ok(None);
    }
    let (Some(signer), Some(signature)) = (str_field(body, "signer"), str_field(body, "signature"))
    else {
        return Err(DaoError::validation(
            "Ownership proof requires string fields 'signer' and 'signature'.",
        ));
    };
    let message = match body.get("message") {
        None | Some(Value::Null) => None,
        Some(Value::String(m)) => Some(m.clone()),
        Some(_) => return Err(DaoError::validation("Ownership 'message' must be a string.")),
    };
    Ok(Some(OwnershipProof {
        signer: signer.to_string(),
        signature: signature.to_string(),
        message,
    }))
}

/// GET /daos/:dao_instance_id/proposals/:proposal_id/details
pub async fn get_details(
    State(state): State<AppState>,
    params: std::result::Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<DetailsResponse>> {
    let (dao_instance_id, proposal_id) = path_params(params)?;
    let (dao_instance_id, proposal_id) = parse_key(&dao_instance_id, &proposal_id)?;
    let details = state
        .details
        .get_details(dao_instance_id, &proposal_id)
        .await?;
    Ok(Json(DetailsResponse { details }))
}

/// POST /daos/:dao_instance_id/proposals/:proposal_id/details - body
/// `{details, signer?, signature?, message?}`
pub async fn save_details(
    State(state): State<AppState>,
    params: std::result::Result<Path<(String, String)>, PathRejection>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SaveDetailsResponse>)> {
    let (dao_instance_id, proposal_id) = path_params(params)?;
    let (dao_instance_id, proposal_id) = parse_key(&dao_instance_id, &proposal_id)?;
    let body = json_body(payload)?;
    let text = str_field(&body, "details")
        .ok_or_else(|| DaoError::validation("Invalid details format. Expected a string"))?;

    let proof = ownership_proof(&body)?;
    let verified_signer = state.ownership.check(proof.as_ref())?;

    let saved = state
        .details
        .save_details(dao_instance_id, &proposal_id, text)
        .await?;
    info!(
        dao_instance_id,
        proposal_id = %saved.proposal_id,
        signer = verified_signer.as_deref().unwrap_or("-"),
        "proposal details saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(SaveDetailsResponse {
            message: "Details saved successfully".to_string(),
            dao_instance_id: saved.dao_instance_id,
            proposal_id: saved.proposal_id,
            last_updated: saved.last_updated,
            verified_signer,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn no_proof_fields_means_no_proof() {
        assert_eq!(ownership_proof(&json!({"details": "x"})).unwrap(), None);
        assert_eq!(
            ownership_proof(&json!({"details": "x", "signer": null})).unwrap(),
            None
        );
    }

    #[test]
    fn partial_proof_is_invalid() {
        let err = ownership_proof(&json!({"details": "x", "signer": "0xabc"})).unwrap_err();
        assert!(matches!(err, DaoError::Validation(_)));
    }

    #[test]
    fn full_proof_is_extracted() {
        let proof = ownership_proof(&json!({
            "details": "x",
            "signer": "0xabc",
            "signature": "0xdef",
            "message": "hi"
        }))
        .unwrap()
        .unwrap();
        assert_eq!(proof.signer, "0xabc");
        assert_eq!(proof.signature, "0xdef");
        assert_eq!(proof.message.as_deref(), Some("hi"));
    }

    #[test]
    fn non_string_message_is_invalid() {
        let err = ownership_proof(&json!({
            "signer": "0xabc",
            "signature": "0xdef",
            "message": 7
        }))
        .unwrap_err();
        assert!(matches!(err, DaoError::Validation(_)));
    }
}
