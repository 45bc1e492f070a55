//! Minting and updating `StatusList2021Credential`s, and allocating
//! indices for new entries out of them.

use base64ct::{Base64UrlUnpadded, Encoding as _};
use chrono::Utc;
use trustmesh_bitstring::Bitstring;
use trustmesh_core::{Error, Kind, Result};
use trustmesh_crypto::canonicalize;

use crate::proof::Proof;
use crate::signer::CredentialSigner;
use crate::suite::{cryptosuite, jose_alg};
use crate::vc::{StatusListCredential, StatusListSubject, StatusPurpose, VC_CONTEXT};

/// A status list plus the raw bits backing it, before it is re-signed.
pub struct StatusList {
    /// The list id (also the credential id clients dereference).
    pub id: String,
    /// What a set bit means for this list.
    pub purpose: StatusPurpose,
    bits: Bitstring,
}

impl StatusList {
    /// Creates a fresh, all-zero list.
    #[must_use]
    pub fn new(id: impl Into<String>, purpose: StatusPurpose) -> Self {
        Self { id: id.into(), purpose, bits: Bitstring::new(trustmesh_bitstring::MIN_LENGTH_BITS) }
    }

    /// Rebuilds a list from a previously issued credential's encoded bits.
    pub fn from_credential(credential: &StatusListCredential) -> Result<Self> {
        let bits = Bitstring::decode(&credential.credential_subject.encoded_list)?;
        Ok(Self { id: credential.id.clone(), purpose: credential.credential_subject.status_purpose, bits })
    }

    /// The first index with an unset bit, or `Err(ListFull)` if the list
    /// has no capacity left.
    pub fn allocate(&self) -> Result<usize> {
        self.bits.first_unset().ok_or(Error::ListFull)
    }

    /// Flags (or clears) the bit at `index`.
    pub fn set(&mut self, index: usize, flagged: bool) -> Result<()> {
        self.bits.set(index, flagged)
    }

    /// Reads the bit at `index`.
    pub fn get(&self, index: usize) -> Result<bool> {
        self.bits.get(index)
    }

    /// Signs the current bits into a publishable [`StatusListCredential`],
    /// attributed to `issuer_did`.
    pub async fn issue<S: CredentialSigner>(
        &self, issuer_did: &str, signer: &S,
    ) -> Result<StatusListCredential> {
        let mut credential = StatusListCredential {
            context: vec![Kind::String(VC_CONTEXT.to_string())],
            id: self.id.clone(),
            type_: vec!["VerifiableCredential".to_string(), "StatusList2021Credential".to_string()],
            issuer: Kind::String(issuer_did.to_string()),
            credential_subject: StatusListSubject {
                id: format!("{}#list", self.id),
                type_: "StatusList2021".to_string(),
                status_purpose: self.purpose,
                encoded_list: self.bits.encode(),
            },
            proof: None,
        };

        let payload = canonicalize(&credential)?;
        let payload_b64 = Base64UrlUnpadded::encode_string(&payload);
        let algorithm = signer.algorithm();
        let header = serde_json::json!({ "alg": jose_alg(algorithm), "b64": true, "crit": ["b64"] });
        let header_b64 = Base64UrlUnpadded::encode_string(&serde_json::to_vec(&header)?);
        let signing_input = Proof::signing_input(&header_b64, &payload_b64);
        let signature = signer.sign(&signing_input).await?;
        let sig_b64 = Base64UrlUnpadded::encode_string(&signature);

        credential.proof = Some(trustmesh_core::OneMany::One(Proof {
            type_: "DataIntegrityProof".to_string(),
            cryptosuite: cryptosuite(algorithm).to_string(),
            proof_purpose: "assertionMethod".to_string(),
            verification_method: signer.verification_method(),
            created: Some(Utc::now()),
            proof_value: format!("{header_b64}..{sig_b64}"),
        }));
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_finds_first_free_index() {
        let mut list = StatusList::new("https://example.com/status/1", StatusPurpose::Revocation);
        list.set(0, true).unwrap();
        list.set(1, true).unwrap();
        assert_eq!(list.allocate().unwrap(), 2);
    }

    #[test]
    fn roundtrips_through_encoded_credential() {
        let mut list = StatusList::new("https://example.com/status/1", StatusPurpose::Revocation);
        list.set(5, true).unwrap();
        let encoded = list.bits.encode();
        let credential = StatusListCredential {
            context: vec![Kind::String(VC_CONTEXT.to_string())],
            id: list.id.clone(),
            type_: vec!["VerifiableCredential".into(), "StatusList2021Credential".into()],
            issuer: Kind::String("did:key:z6Mk".into()),
            credential_subject: StatusListSubject {
                id: format!("{}#list", list.id),
                type_: "StatusList2021".into(),
                status_purpose: StatusPurpose::Revocation,
                encoded_list: encoded,
            },
            proof: None,
        };
        let rebuilt = StatusList::from_credential(&credential).unwrap();
        assert!(rebuilt.get(5).unwrap());
        assert!(!rebuilt.get(6).unwrap());
    }
}
