//! Records persisted by the registry and the detail store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DaoError;

/// Decimal digits in the largest uint256 value.
const MAX_PROPOSAL_ID_DIGITS: usize = 78;

/// One registered deployment of token/staking/voting contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoInstance {
    pub id: i64,
    pub name: String,
    pub token_address: String,
    pub staking_address: String,
    pub voting_address: String,
    pub created_at: DateTime<Utc>,
}

/// Registration input. Fields are trimmed and must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDaoInstance {
    pub name: String,
    pub token_address: String,
    pub staking_address: String,
    pub voting_address: String,
}

impl NewDaoInstance {
    pub fn new(
        name: &str,
        token_address: &str,
        staking_address: &str,
        voting_address: &str,
    ) -> Result<Self, DaoError> {
        let fields = [name, token_address, staking_address, voting_address].map(str::trim);
        if fields.iter().any(|f| f.is_empty()) {
            return Err(DaoError::validation(
                "Missing DAO configuration fields (name, token, staking, voting).",
            ));
        }
        let [name, token_address, staking_address, voting_address] = fields.map(String::from);
        Ok(Self {
            name,
            token_address,
            staking_address,
            voting_address,
        })
    }
}

/// Off-chain text attached to one proposal of one DAO instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalDetail {
    pub dao_instance_id: i64,
    pub proposal_id: String,
    pub details_text: String,
    pub last_updated: DateTime<Utc>,
}

/// Parse a path segment as a DAO instance id (positive integer).
pub fn parse_dao_instance_id(raw: &str) -> Result<i64, DaoError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(DaoError::validation(format!(
            "Invalid DAO instance id '{raw}'"
        ))),
    }
}

/// On-chain proposal counter value in canonical decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProposalId(String);

impl ProposalId {
    pub fn parse(raw: &str) -> Result<Self, DaoError> {
        let digits = raw.trim();
        if digits.is_empty()
            || digits.len() > MAX_PROPOSAL_ID_DIGITS
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(DaoError::validation(format!("Invalid proposal id '{raw}'")));
        }
        let canonical = digits.trim_start_matches('0');
        let canonical = if canonical.is_empty() { "0" } else { canonical };
        Ok(Self(canonical.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
