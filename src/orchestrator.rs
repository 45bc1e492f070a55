//! The `TrustOrchestrator` facade: end-to-end flows over the component
//! crates, each emitting exactly one audit entry — a success entry, or
//! an `OperationFailed` entry when the flow errors out.

use std::sync::Arc;

use trustmesh_audit::{AuditLog, AuditSigner, AuditStorage, EventKind};
use trustmesh_core::{Error, Result};
use trustmesh_credential::{
    verify, CredentialSigner, CredentialSubject, Issuer, VcIssuer, VerifiableCredential, VerificationOutcome,
};
use trustmesh_did::DidResolver;
use trustmesh_score::{score, Articles, ScoringProfile, TrustDeclaration, TrustScore};
use trustmesh_status::{CachingStatusResolver, StatusListManager, StatusListStorage};

/// The result of [`TrustOrchestrator::verify_and_score`].
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyAndScoreOutcome {
    /// The credential verification result.
    pub verification: VerificationOutcome,
    /// The recomputed trust score, present only when verification
    /// succeeded and the credential's subject carries a parseable
    /// [`Articles`] declaration.
    pub score: Option<TrustScore>,
}

/// Composes DID resolution, credential issuance/verification, status
/// list management, trust scoring, and audit logging into the flows
/// described for the trust orchestrator.
pub struct TrustOrchestrator<Resolver, Signer, Store, AuditStore, ASigner, Profile = trustmesh_score::EqualWeightProfile>
{
    resolver: Resolver,
    signer: Arc<Signer>,
    issuer_did: String,
    status_list_id: String,
    status_manager: StatusListManager<Store, Arc<Signer>>,
    status_resolver: CachingStatusResolver<Store, Resolver>,
    audit_log: AuditLog<AuditStore, ASigner>,
    scoring_profile: Profile,
}

impl<Resolver, Signer, Store, AuditStore, ASigner, Profile>
    TrustOrchestrator<Resolver, Signer, Store, AuditStore, ASigner, Profile>
where
    Resolver: DidResolver + Clone,
    Signer: CredentialSigner,
    Store: StatusListStorage + Clone,
    AuditStore: AuditStorage,
    ASigner: AuditSigner,
    Profile: ScoringProfile,
{
    /// Builds an orchestrator. `issuer_did` is the DID `signer` signs as;
    /// `status_list_id` is the single status list new credentials are
    /// allocated an entry from.
    pub fn new(
        resolver: Resolver, signer: Signer, issuer_did: impl Into<String>, status_list_id: impl Into<String>,
        status_store: Store, audit_log: AuditLog<AuditStore, ASigner>, scoring_profile: Profile,
    ) -> Self {
        let issuer_did = issuer_did.into();
        let status_list_id = status_list_id.into();
        let signer = Arc::new(signer);
        let status_manager =
            StatusListManager::new(status_store.clone(), Arc::clone(&signer), issuer_did.clone());
        let status_resolver = CachingStatusResolver::new(status_store, resolver.clone());
        Self { resolver, signer, issuer_did, status_list_id, status_manager, status_resolver, audit_log, scoring_profile }
    }

    /// Issues a trust declaration as a verifiable credential for
    /// `subject_did`, allocating it a fresh status list entry.
    pub async fn issue_trust_declaration(
        &self, subject_did: &str, agent_name: &str, articles: Articles,
    ) -> Result<VerifiableCredential> {
        match self.issue_trust_declaration_inner(subject_did, agent_name, articles).await {
            Ok(vc) => {
                self.audit_log
                    .append(EventKind::CredentialIssued {
                        credential_id: vc.id.clone().unwrap_or_default(),
                        issuer: self.issuer_did.clone(),
                    })
                    .await?;
                Ok(vc)
            }
            Err(e) => {
                self.record_failure("issue_trust_declaration", &e).await;
                Err(e)
            }
        }
    }

    async fn issue_trust_declaration_inner(
        &self, subject_did: &str, agent_name: &str, articles: Articles,
    ) -> Result<VerifiableCredential> {
        let status = self
            .status_manager
            .allocate(&self.status_list_id, trustmesh_credential::StatusPurpose::Revocation)
            .await?;

        let declaration = TrustDeclaration {
            agent_id: subject_did.to_string(),
            agent_name: agent_name.to_string(),
            articles,
        };
        let claims = match serde_json::to_value(&declaration)? {
            serde_json::Value::Object(map) => map,
            _ => return Err(Error::InternalError("trust declaration did not serialize to an object".to_string())),
        };

        let vc = VerifiableCredential {
            context: vec![],
            id: Some(format!("urn:uuid:{}", uuid::Uuid::new_v4())),
            type_: vec!["TrustDeclarationCredential".to_string()],
            issuer: trustmesh_core::Kind::Object(VcIssuer { id: self.issuer_did.clone(), name: None }),
            credential_subject: trustmesh_core::OneMany::One(CredentialSubject {
                id: Some(subject_did.to_string()),
                claims,
            }),
            issuance_date: None,
            expiration_date: None,
            credential_status: Some(status),
            credential_schema: None,
            proof: None,
        };

        Issuer::new(Arc::clone(&self.signer)).issue(vc).await
    }

    /// Verifies `vc` against its issuer's resolved DID document and
    /// status list entry, and — if verification succeeds and the subject
    /// carries a parseable trust declaration — recomputes its trust
    /// score.
    pub async fn verify_and_score(&self, vc: &VerifiableCredential) -> Result<VerifyAndScoreOutcome> {
        match self.verify_and_score_inner(vc).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.record_failure("verify_and_score", &e).await;
                Err(e)
            }
        }
    }

    async fn verify_and_score_inner(&self, vc: &VerifiableCredential) -> Result<VerifyAndScoreOutcome> {
        let verification = verify(vc, &self.resolver, Some(&self.status_resolver)).await?;
        if !verification.valid {
            return Ok(VerifyAndScoreOutcome { verification, score: None });
        }

        let subject = match &vc.credential_subject {
            trustmesh_core::OneMany::One(s) => s,
            trustmesh_core::OneMany::Many(s) => match s.first() {
                Some(s) => s,
                None => return Ok(VerifyAndScoreOutcome { verification, score: None }),
            },
        };
        let Ok(declaration) = serde_json::from_value::<TrustDeclaration>(serde_json::Value::Object(subject.claims.clone()))
        else {
            return Ok(VerifyAndScoreOutcome { verification, score: None });
        };

        let score = score(&declaration, &self.scoring_profile, 1.0)?;
        self.audit_log
            .append(EventKind::TrustScoreRecomputed { subject: declaration.agent_id, score: score.compliance_score })
            .await?;
        Ok(VerifyAndScoreOutcome { verification, score: Some(score) })
    }

    /// Flags `vc`'s status entry as revoked, returning the re-signed
    /// status list credential.
    pub async fn revoke(&self, vc: &VerifiableCredential) -> Result<trustmesh_credential::StatusListCredential> {
        match self.revoke_inner(vc).await {
            Ok(credential) => Ok(credential),
            Err(e) => {
                self.record_failure("revoke", &e).await;
                Err(e)
            }
        }
    }

    async fn revoke_inner(&self, vc: &VerifiableCredential) -> Result<trustmesh_credential::StatusListCredential> {
        let status = vc
            .credential_status
            .as_ref()
            .ok_or_else(|| Error::MalformedCredential("credential carries no status entry to revoke".to_string()))?;
        self.status_manager.flag(status, true).await?;
        self.audit_log
            .append(EventKind::CredentialRevoked {
                status_entry_id: status.id.clone(),
                status_list_credential: status.status_list_credential.clone(),
                status_list_index: status.status_list_index,
            })
            .await?;
        self.status_resolver.invalidate(&status.status_list_credential);

        self.status_manager
            .snapshot(&status.status_list_credential)
            .await?
            .ok_or_else(|| Error::CorruptState("status list vanished after revocation".to_string()))
    }

    async fn record_failure(&self, operation: &str, error: &Error) {
        let _ = self
            .audit_log
            .append(EventKind::OperationFailed { operation: operation.to_string(), reason: error.to_string() })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use trustmesh_audit::InMemoryAuditStorage;
    use trustmesh_crypto::{Algorithm, SigningKey};
    use trustmesh_did::KeyResolver;
    use trustmesh_status::InMemoryStorage;

    use super::*;

    struct TestKey {
        key: SigningKey,
        did: String,
    }

    impl TestKey {
        fn generate() -> Self {
            let key = SigningKey::generate_ed25519();
            let mut bytes = trustmesh_crypto::ED25519_CODEC.to_vec();
            bytes.extend_from_slice(&key.verifying_key_bytes());
            let multibase = multibase::encode(multibase::Base::Base58Btc, &bytes);
            Self { key, did: format!("did:key:{multibase}") }
        }
    }

    impl CredentialSigner for TestKey {
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

    impl AuditSigner for TestKey {
        async fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
            Ok(self.key.sign(msg))
        }

        fn algorithm(&self) -> Algorithm {
            self.key.algorithm()
        }

        fn public_key(&self) -> Vec<u8> {
            self.key.verifying_key_bytes()
        }

        fn signer_id(&self) -> String {
            self.did.clone()
        }
    }

    fn orchestrator(
        issuer: TestKey,
    ) -> TrustOrchestrator<KeyResolver, TestKey, InMemoryStorage, InMemoryAuditStorage, TestKey> {
        let issuer_did = issuer.did.clone();
        let audit_signer = TestKey::generate();
        TrustOrchestrator::new(
            KeyResolver,
            issuer,
            issuer_did,
            "https://example.com/status/trust-declarations",
            InMemoryStorage::new(),
            AuditLog::new(InMemoryAuditStorage::new(), audit_signer),
            trustmesh_score::EqualWeightProfile,
        )
    }

    fn full_compliance() -> Articles {
        Articles {
            inspection_mandate: true,
            consent_architecture: true,
            ethical_override: true,
            continuous_validation: true,
            right_to_disconnect: true,
            moral_recognition: true,
        }
    }

    #[tokio::test]
    async fn issues_verifies_and_scores() {
        let orchestrator = orchestrator(TestKey::generate());
        let subject = TestKey::generate();

        let vc = orchestrator
            .issue_trust_declaration(&subject.did, "Agent Smith", full_compliance())
            .await
            .unwrap();

        let outcome = orchestrator.verify_and_score(&vc).await.unwrap();
        assert!(outcome.verification.valid, "errors: {:?}", outcome.verification.errors);
        let score = outcome.score.unwrap();
        assert!((score.compliance_score - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn revoked_credential_fails_verification() {
        let orchestrator = orchestrator(TestKey::generate());
        let subject = TestKey::generate();

        let vc = orchestrator
            .issue_trust_declaration(&subject.did, "Agent Smith", full_compliance())
            .await
            .unwrap();
        orchestrator.revoke(&vc).await.unwrap();

        let outcome = orchestrator.verify_and_score(&vc).await.unwrap();
        assert!(!outcome.verification.valid);
        assert!(outcome.verification.errors.contains(&trustmesh_core::ErrorKind::Revoked));
    }
}
