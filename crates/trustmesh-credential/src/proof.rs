//! Detached-JWS proofs (RFC 7515) over the JCS-canonicalized credential,
//! the lighter-weight sibling of a full Data Integrity proof: the JWS
//! protected header and signature travel in the credential, the payload
//! never does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trustmesh_core::{Error, OneMany, Result};

/// A proof securing a credential or presentation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Proof type; always `DataIntegrityProof` for the detached-JWS
    /// suite trustmesh issues.
    #[serde(rename = "type")]
    pub type_: String,

    /// The cryptographic suite, e.g. `eddsa-jcs-2022` or `ecdsa-jcs-2019`.
    pub cryptosuite: String,

    /// Why this proof exists; almost always `assertionMethod`.
    pub proof_purpose: String,

    /// DID URL of the key that produced the signature.
    pub verification_method: String,

    /// When the proof was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// The detached JWS: `<protected-header>..<signature>`, both
    /// base64url, payload omitted.
    pub proof_value: String,
}

impl Proof {
    /// The bytes that were actually signed: `protected-header || "." ||
    /// payload`, where payload is the JCS-canonicalized credential with
    /// the `proof` field removed.
    pub fn signing_input(protected_header_b64: &str, canonical_payload_b64: &str) -> Vec<u8> {
        format!("{protected_header_b64}.{canonical_payload_b64}").into_bytes()
    }

    /// Splits `proof_value` (`header..signature`) into its base64url parts.
    pub fn split_detached_jws(&self) -> Result<(&str, &str)> {
        let mut parts = self.proof_value.splitn(3, '.');
        let header = parts.next().ok_or_else(|| malformed(&self.proof_value))?;
        let empty_payload = parts.next().ok_or_else(|| malformed(&self.proof_value))?;
        let signature = parts.next().ok_or_else(|| malformed(&self.proof_value))?;
        if !empty_payload.is_empty() {
            return Err(malformed(&self.proof_value));
        }
        Ok((header, signature))
    }
}

fn malformed(value: &str) -> Error {
    Error::MalformedCredential(format!("proofValue is not a detached JWS: {value}"))
}

/// Either a single proof or a set of proofs (a credential may layer
/// multiple, e.g. an issuer proof plus a holder binding proof).
pub type Proofs = OneMany<Proof>;
