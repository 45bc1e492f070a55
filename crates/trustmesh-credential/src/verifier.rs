//! The credential verification pipeline: structural validity, validity
//! window, issuer resolution, signature, and status, in that order.
//! Every check that ran is recorded; the pipeline only short-circuits
//! when a later check has no meaning without an earlier one (there is no
//! point checking a signature against a document that failed to resolve).

use base64ct::{Base64UrlUnpadded, Encoding as _};
use chrono::Duration;
use trustmesh_core::{time, Error, ErrorKind};
use trustmesh_crypto::{canonicalize, verify as verify_signature};
use trustmesh_did::DidResolver;

use crate::status::{StatusCheck, StatusResolver};
use crate::suite::algorithm_for_cryptosuite;
use crate::vc::{VerifiableCredential, VC_TYPE};

/// Tolerance applied when comparing a credential's `issuanceDate` or
/// `expirationDate` against wall-clock time, to absorb clock drift
/// between issuer and verifier.
const CLOCK_SKEW: Duration = Duration::seconds(60);

/// Which individual checks a verification ran and whether each passed.
/// A `false` value distinguishes "ran and failed" from "never reached"
/// only in combination with `errors`: a check that never ran because an
/// earlier one short-circuited is also reported `false` here.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Checks {
    /// Credential shape: `type` includes `VerifiableCredential`, `issuer`
    /// is a DID, `issuanceDate` is not in the future, `expirationDate`
    /// (if present) is after `issuanceDate`.
    pub structural: bool,
    /// The credential is currently within its validity window, within
    /// the clock-skew tolerance.
    pub temporal: bool,
    /// The issuer's DID resolved and its verification method is
    /// authorized to assert credentials.
    pub issuer_trusted: bool,
    /// The detached-JWS proof verified against the resolved key.
    pub signature: bool,
    /// The credential's status entry (if any) reports neither revoked
    /// nor suspended.
    pub status: bool,
}

/// The result of verifying a credential. `valid` is `true` only when
/// `errors` is empty; `errors` is never truncated to the first failure.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    /// `true` if every check passed.
    pub valid: bool,
    /// Every check that failed, in the order it ran.
    pub errors: Vec<ErrorKind>,
    /// Per-check pass/fail breakdown.
    pub checks: Checks,
}

impl VerificationOutcome {
    fn ok() -> Self {
        Self { valid: true, errors: Vec::new(), checks: Checks::default() }
    }

    fn fail(kind: ErrorKind) -> Self {
        Self { valid: false, errors: vec![kind], checks: Checks::default() }
    }

    fn push(&mut self, kind: ErrorKind) {
        self.valid = false;
        self.errors.push(kind);
    }
}

/// Verifies `vc` against a DID resolver and, if the credential carries a
/// status entry, a status resolver.
///
/// Returns `Err` only for infrastructure failures that make verification
/// itself impossible (a cancelled resolution, a malformed resolver
/// response structure outside the credential's own control); a credential
/// that is simply invalid is reported as `Ok(VerificationOutcome { valid:
/// false, .. })`.
pub async fn verify<R, S>(
    vc: &VerifiableCredential, resolver: &R, status_resolver: Option<&S>,
) -> trustmesh_core::Result<VerificationOutcome>
where
    R: DidResolver,
    S: StatusResolver,
{
    let mut outcome = VerificationOutcome::ok();

    let Some(proof) = first_proof(vc) else {
        return Ok(VerificationOutcome::fail(ErrorKind::MalformedCredential));
    };

    match check_structural(vc) {
        Ok(()) => outcome.checks.structural = true,
        Err(e) => outcome.push(e.kind()),
    }

    match check_validity_window(vc) {
        Ok(()) => outcome.checks.temporal = true,
        Err(e) => outcome.push(e.kind()),
    }

    let issuer_did = issuer_id(vc);
    let document = match resolver.resolve(issuer_did).await {
        Ok(doc) => doc,
        Err(e) if matches!(e.kind(), ErrorKind::Cancelled | ErrorKind::Timeout) => return Err(e),
        Err(_) => {
            outcome.push(ErrorKind::IssuerNotResolvable);
            return Ok(outcome);
        }
    };

    if !document.authorizes_assertion(&proof.verification_method) {
        outcome.push(ErrorKind::PurposeMismatch);
        return Ok(outcome);
    }
    outcome.checks.issuer_trusted = true;

    match check_signature(vc, proof, &document) {
        Ok(()) => outcome.checks.signature = true,
        Err(e) => {
            outcome.push(e.kind());
            return Ok(outcome);
        }
    }

    match (&vc.credential_status, status_resolver) {
        (Some(status), Some(resolver)) => match resolver.check(status).await {
            Ok(StatusCheck::Valid) => outcome.checks.status = true,
            Ok(StatusCheck::Revoked) => outcome.push(ErrorKind::Revoked),
            Ok(StatusCheck::Suspended) => outcome.push(ErrorKind::Suspended),
            Err(e) if matches!(e.kind(), ErrorKind::Cancelled | ErrorKind::Timeout) => return Err(e),
            Err(_) => outcome.push(ErrorKind::StatusUnavailable),
        },
        _ => outcome.checks.status = true,
    }

    Ok(outcome)
}

fn check_structural(vc: &VerifiableCredential) -> trustmesh_core::Result<()> {
    if !vc.type_.iter().any(|t| t == VC_TYPE) {
        return Err(Error::MalformedCredential(format!("type does not include {VC_TYPE}")));
    }
    if !issuer_id(vc).starts_with("did:") {
        return Err(Error::MalformedCredential("issuer is not a DID".to_string()));
    }

    let now = chrono::Utc::now();
    let Some(issued) = &vc.issuance_date else {
        return Err(Error::MalformedCredential("missing issuanceDate".to_string()));
    };
    let issued = time::parse_rfc3339(issued)?;
    if issued > now + CLOCK_SKEW {
        return Err(Error::MalformedCredential("issuanceDate is in the future".to_string()));
    }
    if let Some(expires) = &vc.expiration_date {
        if time::parse_rfc3339(expires)? <= issued {
            return Err(Error::MalformedCredential("expirationDate is not after issuanceDate".to_string()));
        }
    }
    Ok(())
}

/// Verifies a status list credential's own proof against its issuer's
/// resolved DID document. Status list credentials carry no
/// `credentialStatus` of their own, so there is no status check to run
/// - this checks only issuer resolution, authorization and signature.
pub async fn verify_status_list<R: DidResolver>(
    credential: &crate::vc::StatusListCredential, resolver: &R,
) -> trustmesh_core::Result<()> {
    let proof = match &credential.proof {
        Some(trustmesh_core::OneMany::One(p)) => p,
        Some(trustmesh_core::OneMany::Many(ps)) => {
            ps.first().ok_or_else(|| Error::MalformedCredential("empty proof array".to_string()))?
        }
        None => return Err(Error::MalformedCredential("status list credential has no proof".to_string())),
    };

    let issuer_did = match &credential.issuer {
        trustmesh_core::Kind::String(id) => id.as_str(),
        trustmesh_core::Kind::Object(issuer) => issuer.id.as_str(),
    };
    let document =
        resolver.resolve(issuer_did).await.map_err(|_| Error::IssuerNotResolvable(issuer_did.to_string()))?;
    if !document.authorizes_assertion(&proof.verification_method) {
        return Err(Error::PurposeMismatch(proof.verification_method.clone()));
    }

    let algorithm = algorithm_for_cryptosuite(&proof.cryptosuite)?;
    let (header_b64, sig_b64) = proof.split_detached_jws()?;

    let mut unsigned = credential.clone();
    unsigned.proof = None;
    let payload = canonicalize(&unsigned)?;
    let payload_b64 = Base64UrlUnpadded::encode_string(&payload);
    let signing_input = crate::proof::Proof::signing_input(header_b64, &payload_b64);

    let signature = Base64UrlUnpadded::decode_vec(sig_b64)
        .map_err(|e| Error::InvalidSignature(format!("malformed signature encoding: {e}")))?;

    let method = document
        .get_verification_method(&proof.verification_method)
        .ok_or_else(|| Error::KeyNotFound(proof.verification_method.clone()))?;
    let public_key = public_key_bytes(method)?;

    verify_signature(algorithm, &public_key, &signing_input, &signature)
}

fn first_proof(vc: &VerifiableCredential) -> Option<&crate::proof::Proof> {
    match vc.proof.as_ref()? {
        trustmesh_core::OneMany::One(p) => Some(p),
        trustmesh_core::OneMany::Many(ps) => ps.first(),
    }
}

fn issuer_id(vc: &VerifiableCredential) -> &str {
    match &vc.issuer {
        trustmesh_core::Kind::String(id) => id,
        trustmesh_core::Kind::Object(issuer) => &issuer.id,
    }
}

fn check_validity_window(vc: &VerifiableCredential) -> trustmesh_core::Result<()> {
    let now = chrono::Utc::now();
    if let Some(from) = &vc.issuance_date {
        if time::parse_rfc3339(from)? > now + CLOCK_SKEW {
            return Err(Error::NotYetValid(from.clone()));
        }
    }
    if let Some(until) = &vc.expiration_date {
        if time::parse_rfc3339(until)? < now - CLOCK_SKEW {
            return Err(Error::Expired(until.clone()));
        }
    }
    Ok(())
}

fn check_signature(
    vc: &VerifiableCredential, proof: &crate::proof::Proof, document: &trustmesh_did::Document,
) -> trustmesh_core::Result<()> {
    let algorithm = algorithm_for_cryptosuite(&proof.cryptosuite)?;
    let (header_b64, sig_b64) = proof.split_detached_jws()?;

    let mut unsigned = vc.clone();
    unsigned.proof = None;
    let payload = canonicalize(&unsigned)?;
    let payload_b64 = Base64UrlUnpadded::encode_string(&payload);
    let signing_input = crate::proof::Proof::signing_input(header_b64, &payload_b64);

    let signature = Base64UrlUnpadded::decode_vec(sig_b64)
        .map_err(|e| Error::InvalidSignature(format!("malformed signature encoding: {e}")))?;

    let method = document
        .get_verification_method(&proof.verification_method)
        .ok_or_else(|| Error::KeyNotFound(proof.verification_method.clone()))?;
    let public_key = public_key_bytes(method)?;

    verify_signature(algorithm, &public_key, &signing_input, &signature)
}

fn public_key_bytes(method: &trustmesh_did::VerificationMethod) -> trustmesh_core::Result<Vec<u8>> {
    match &method.key {
        trustmesh_did::PublicKeyFormat::PublicKeyMultibase { public_key_multibase } => {
            let (_, bytes) = multibase::decode(public_key_multibase)
                .map_err(|e| Error::KeyNotFound(format!("invalid multibase key: {e}")))?;
            Ok(bytes.into_iter().skip(2).collect())
        }
        trustmesh_did::PublicKeyFormat::PublicKeyJwk { public_key_jwk } => {
            Base64UrlUnpadded::decode_vec(&public_key_jwk.x)
                .map_err(|e| Error::KeyNotFound(format!("invalid JWK x-coordinate: {e}")))
        }
        trustmesh_did::PublicKeyFormat::BlockchainAccountId { .. } => {
            Err(Error::KeyNotFound("blockchain account id keys cannot verify signatures directly".into()))
        }
    }
}

#[cfg(test)]
mod status_list_tests {
    use trustmesh_did::KeyResolver;

    use super::*;
    use crate::signer::CredentialSigner;
    use crate::status_list::StatusList;
    use crate::vc::StatusPurpose;

    struct TestSigner {
        key: trustmesh_crypto::SigningKey,
        did: String,
    }

    impl TestSigner {
        fn generate() -> Self {
            let key = trustmesh_crypto::SigningKey::generate_ed25519();
            let mut bytes = trustmesh_crypto::ED25519_CODEC.to_vec();
            bytes.extend_from_slice(&key.verifying_key_bytes());
            let multibase = multibase::encode(multibase::Base::Base58Btc, &bytes);
            Self { key, did: format!("did:key:{multibase}") }
        }
    }

    impl CredentialSigner for TestSigner {
        async fn sign(&self, msg: &[u8]) -> trustmesh_core::Result<Vec<u8>> {
            Ok(self.key.sign(msg))
        }

        fn algorithm(&self) -> trustmesh_crypto::Algorithm {
            self.key.algorithm()
        }

        fn verification_method(&self) -> String {
            let fragment = self.did.trim_start_matches("did:key:");
            format!("{}#{fragment}", self.did)
        }
    }

    #[tokio::test]
    async fn verifies_status_list_own_proof() {
        let signer = TestSigner::generate();
        let list = StatusList::new("https://example.com/status/trust-declarations", StatusPurpose::Revocation);
        let credential = list.issue(&signer.did, &signer).await.unwrap();

        verify_status_list(&credential, &KeyResolver).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_tampered_status_list() {
        let signer = TestSigner::generate();
        let list = StatusList::new("https://example.com/status/trust-declarations", StatusPurpose::Revocation);
        let mut credential = list.issue(&signer.did, &signer).await.unwrap();
        credential.credential_subject.encoded_list = "tampered".to_string();

        let err = verify_status_list(&credential, &KeyResolver).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSignature);
    }
}
