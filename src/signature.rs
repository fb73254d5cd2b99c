//! Server-side ownership proof for detail edits.
//!
//! Wallets sign a fixed challenge with `personal_sign` (EIP-191). The save
//! endpoint recovers the signer from that signature and compares it with the
//! address the caller claims, instead of trusting a check done in the browser.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::DaoError;

pub const DEFAULT_OWNERSHIP_MESSAGE: &str = "Verify ownership to edit/change details.";

const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature is not valid hex")]
    InvalidHex,

    #[error("signature must be 65 bytes, got {0}")]
    InvalidLength(usize),

    #[error("unsupported recovery byte {0}")]
    InvalidRecoveryId(u8),

    #[error("malformed signature: {0}")]
    Malformed(String),

    #[error("invalid address '{0}'")]
    InvalidAddress(String),
}

/// keccak256 of the EIP-191 wrapped message.
pub fn personal_message_hash(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

/// Lowercase `0x`-prefixed address of a public key.
pub fn address_of(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag.
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

/// Validate and lowercase an address.
pub fn normalize_address(address: &str) -> Result<String, SignatureError> {
    let trimmed = address.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| SignatureError::InvalidAddress(address.to_string()))?;
    if body.len() != 40 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(SignatureError::InvalidAddress(address.to_string()));
    }
    Ok(format!("0x{}", body.to_ascii_lowercase()))
}

/// Recover the address that produced `signature` (hex `r || s || v`) over
/// `message`.
pub fn recover_signer(message: &str, signature: &str) -> Result<String, SignatureError> {
    let raw = signature.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(raw).map_err(|_| SignatureError::InvalidHex)?;
    if bytes.len() != 65 {
        return Err(SignatureError::InvalidLength(bytes.len()));
    }

    let v = bytes[64];
    let parity = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        other => return Err(SignatureError::InvalidRecoveryId(other)),
    };
    let mut recovery_id =
        RecoveryId::from_byte(parity).ok_or(SignatureError::InvalidRecoveryId(v))?;

    let mut sig = Signature::from_slice(&bytes[..64])
        .map_err(|e| SignatureError::Malformed(e.to_string()))?;
    // Recovery only accepts low-S; flipping s mirrors the y parity.
    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let hash = personal_message_hash(message);
    let key = VerifyingKey::recover_from_prehash(&hash, &sig, recovery_id)
        .map_err(|e| SignatureError::Malformed(e.to_string()))?;
    Ok(address_of(&key))
}

/// Signature material a client attaches to a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipProof {
    pub signer: String,
    pub signature: String,
    /// Challenge that was signed; the policy default when absent.
    pub message: Option<String>,
}

/// How the save endpoint treats ownership proofs.
#[derive(Debug, Clone)]
pub struct OwnershipPolicy {
    /// Reject saves that carry no proof at all.
    pub require_signature: bool,
    pub message: String,
}

impl Default for OwnershipPolicy {
    fn default() -> Self {
        Self {
            require_signature: false,
            message: DEFAULT_OWNERSHIP_MESSAGE.to_string(),
        }
    }
}

impl OwnershipPolicy {
    /// Verify `proof` if one was given. Returns the verified signer, or
    /// `None` when no proof was supplied and none is required.
    pub fn check(&self, proof: Option<&OwnershipProof>) -> Result<Option<String>, DaoError> {
        let Some(proof) = proof else {
            if self.require_signature {
                return Err(DaoError::unauthorized(
                    "Ownership verification required: provide signer and signature.",
                ));
            }
            return Ok(None);
        };

        let claimed = normalize_address(&proof.signer)
            .map_err(|e| DaoError::validation(format!("Invalid ownership proof: {e}")))?;
        let message = proof.message.as_deref().unwrap_or(&self.message);
        let recovered = recover_signer(message, &proof.signature)
            .map_err(|e| DaoError::validation(format!("Invalid ownership proof: {e}")))?;

        if recovered != claimed {
            warn!(%claimed, %recovered, "ownership signature does not match signer");
            return Err(DaoError::unauthorized("Ownership verification failed."));
        }
        debug!(signer = %claimed, "ownership verified");
        Ok(Some(claimed))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn hash_matches_known_vector() {
        // keccak256("\x19Ethereum Signed Message:\n5hello")
        assert_eq!(
            hex::encode(personal_message_hash("hello")),
            "50b2c43fd39106bafbba0da34fc430e1f91e3c96ea2acee2bc34119f92b37750"
        );
    }

    #[test]
    fn recovers_wallet_signer() {
        let key = signing_key(0x11);
        let sig = personal_sign(&key, DEFAULT_OWNERSHIP_MESSAGE);
        assert_eq!(
            recover_signer(DEFAULT_OWNERSHIP_MESSAGE, &sig).unwrap(),
            address(&key)
        );
    }

    #[test]
    fn different_message_recovers_different_address() {
        let key = signing_key(0x11);
        let sig = personal_sign(&key, "something else");
        let recovered = recover_signer(DEFAULT_OWNERSHIP_MESSAGE, &sig);
        assert_ne!(recovered.ok(), Some(address(&key)));
    }

    #[test]
    fn rejects_bad_encoding() {
        assert_eq!(recover_signer("m", "0xzz"), Err(SignatureError::InvalidHex));
        assert_eq!(
            recover_signer("m", "0x00ff"),
            Err(SignatureError::InvalidLength(2))
        );
        let mut sig = hex::decode(
            personal_sign(&signing_key(0x22), "m").trim_start_matches("0x"),
        )
        .unwrap();
        sig[64] = 5;
        assert_eq!(
            recover_signer("m", &hex::encode(sig)),
            Err(SignatureError::InvalidRecoveryId(5))
        );
    }

    #[test]
    fn normalizes_addresses() {
        assert_eq!(
            normalize_address("0xABCDEFabcdef0123456789abcdef0123456789AB").unwrap(),
            "0xabcdefabcdef0123456789abcdef0123456789ab"
        );
        assert!(normalize_address("abcdef").is_err());
        assert!(normalize_address("0x1234").is_err());
    }

    #[test]
    fn policy_accepts_matching_proof() {
        let key = signing_key(0x33);
        let policy = OwnershipPolicy::default();
        let proof = OwnershipProof {
            signer: address(&key).to_uppercase().replacen("0X", "0x", 1),
            signature: personal_sign(&key, DEFAULT_OWNERSHIP_MESSAGE),
            message: None,
        };
        assert_eq!(policy.check(Some(&proof)).unwrap(), Some(address(&key)));
    }

    #[test]
    fn policy_rejects_foreign_signer() {
        let owner = signing_key(0x33);
        let intruder = signing_key(0x44);
        let proof = OwnershipProof {
            signer: address(&owner),
            signature: personal_sign(&intruder, DEFAULT_OWNERSHIP_MESSAGE),
            message: None,
        };
        let err = OwnershipPolicy::default().check(Some(&proof)).unwrap_err();
        assert!(matches!(err, DaoError::Unauthorized(_)));
    }

    #[test]
    fn policy_requires_proof_when_configured() {
        let policy = OwnershipPolicy {
            require_signature: true,
            ..OwnershipPolicy::default()
        };
        assert!(matches!(
            policy.check(None).unwrap_err(),
            DaoError::Unauthorized(_)
        ));
        assert_eq!(OwnershipPolicy::default().check(None).unwrap(), None);
    }

    #[test]
    fn policy_uses_custom_message_from_proof() {
        let key = signing_key(0x55);
        let proof = OwnershipProof {
            signer: address(&key),
            signature: personal_sign(&key, "edit proposal 7"),
            message: Some("edit proposal 7".to_string()),
        };
        assert!(OwnershipPolicy::default().check(Some(&proof)).is_ok());
    }
}
