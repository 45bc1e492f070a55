//! Issuing a credential: canonicalize, sign, attach the detached-JWS
//! proof.

use base64ct::{Base64UrlUnpadded, Encoding as _};
use chrono::Utc;
use trustmesh_core::{OneMany, Result};
use trustmesh_crypto::canonicalize;

use crate::proof::Proof;
use crate::signer::CredentialSigner;
use crate::suite::{cryptosuite, jose_alg};
use crate::vc::{VerifiableCredential, VC_CONTEXT, VC_TYPE};

/// Issues credentials on behalf of a single signing key.
pub struct Issuer<S> {
    signer: S,
}

impl<S: CredentialSigner> Issuer<S> {
    /// Builds an issuer around `signer`.
    pub const fn new(signer: S) -> Self {
        Self { signer }
    }

    /// Signs `vc`, filling in `@context`/`type` defaults and attaching a
    /// detached-JWS `DataIntegrityProof`. Any pre-existing `proof` is
    /// replaced.
    pub async fn issue(&self, mut vc: VerifiableCredential) -> Result<VerifiableCredential> {
        ensure_default_context(&mut vc);
        ensure_default_type(&mut vc);
        vc.issuance_date = Some(Utc::now().to_rfc3339());
        vc.proof = None;

        let payload = canonicalize(&vc)?;
        let payload_b64 = Base64UrlUnpadded::encode_string(&payload);

        let algorithm = self.signer.algorithm();
        let header = serde_json::json!({ "alg": jose_alg(algorithm), "b64": true, "crit": ["b64"] });
        let header_bytes = serde_json::to_vec(&header)?;
        let header_b64 = Base64UrlUnpadded::encode_string(&header_bytes);

        let signing_input = Proof::signing_input(&header_b64, &payload_b64);
        let signature = self.signer.sign(&signing_input).await?;
        let sig_b64 = Base64UrlUnpadded::encode_string(&signature);

        let proof = Proof {
            type_: "DataIntegrityProof".to_string(),
            cryptosuite: cryptosuite(algorithm).to_string(),
            proof_purpose: "assertionMethod".to_string(),
            verification_method: self.signer.verification_method(),
            created: Some(Utc::now()),
            proof_value: format!("{header_b64}..{sig_b64}"),
        };
        vc.proof = Some(OneMany::One(proof));
        Ok(vc)
    }
}

fn ensure_default_context(vc: &mut VerifiableCredential) {
    if !vc.context.iter().any(|c| matches!(c, trustmesh_core::Kind::String(s) if s == VC_CONTEXT)) {
        vc.context.insert(0, trustmesh_core::Kind::String(VC_CONTEXT.to_string()));
    }
}

fn ensure_default_type(vc: &mut VerifiableCredential) {
    if !vc.type_.iter().any(|t| t == VC_TYPE) {
        vc.type_.insert(0, VC_TYPE.to_string());
    }
}

#[cfg(test)]
mod tests {
    use trustmesh_crypto::{Algorithm, SigningKey};
    use trustmesh_did::{DidResolver, KeyResolver};

    use super::*;
    use crate::vc::{CredentialSubject, Issuer as VcIssuer};

    struct TestSigner {
        key: SigningKey,
        did: String,
    }

    impl TestSigner {
        fn generate() -> Self {
            let key = SigningKey::generate_ed25519();
            let mut bytes = trustmesh_crypto::ED25519_CODEC.to_vec();
            bytes.extend_from_slice(&key.verifying_key_bytes());
            let multibase = multibase::encode(multibase::Base::Base58Btc, &bytes);
            Self { key, did: format!("did:key:{multibase}") }
        }
    }

    impl CredentialSigner for TestSigner {
        async fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
            Ok(self.key.sign(msg))
        }

        fn algorithm(&self) -> Algorithm {
            self.key.algorithm()
        }

        fn verification_method(&self) -> String {
            let fragment = self.did.trim_start_matches("did:key:");
            format!("{}#{fragment}", self.did)
        }
    }

    fn unsigned_credential(issuer_did: &str) -> VerifiableCredential {
        VerifiableCredential {
            context: vec![],
            id: Some("urn:uuid:test".to_string()),
            type_: vec![],
            issuer: trustmesh_core::Kind::Object(VcIssuer { id: issuer_did.to_string(), name: None }),
            credential_subject: trustmesh_core::OneMany::One(CredentialSubject {
                id: Some("did:key:zSubject".to_string()),
                claims: serde_json::Map::new(),
            }),
            issuance_date: None,
            expiration_date: None,
            credential_status: None,
            credential_schema: None,
            proof: None,
        }
    }

    #[tokio::test]
    async fn issue_then_verify_succeeds() {
        let signer = TestSigner::generate();
        let issuer = Issuer::new(signer);
        let vc = unsigned_credential(&issuer.signer.did);
        let signed = issuer.issue(vc).await.unwrap();

        assert!(signed.context.iter().any(|c| matches!(c, trustmesh_core::Kind::String(s) if s == VC_CONTEXT)));
        assert!(signed.type_.iter().any(|t| t == VC_TYPE));

        let resolver = KeyResolver;
        let document = resolver.resolve(&issuer.signer.did).await.unwrap();
        let proof = match signed.proof.as_ref().unwrap() {
            trustmesh_core::OneMany::One(p) => p,
            trustmesh_core::OneMany::Many(_) => panic!("expected single proof"),
        };
        let outcome =
            crate::verifier::verify::<KeyResolver, crate::status::NoopStatusResolver>(&signed, &resolver, None)
                .await
                .unwrap();
        assert!(outcome.valid, "verification errors: {:?}", outcome.errors);
        assert_eq!(proof.verification_method, issuer.signer.verification_method());
        let _ = document;
    }
}
