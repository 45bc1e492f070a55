//! # TrustMesh Credential
//!
//! The Verifiable Credential data model, detached-JWS proofs, the issuer
//! pipeline (canonicalize, sign, attach proof), the six-step verifier
//! pipeline, and Status List 2021 credential minting.

mod issuer;
mod proof;
mod signer;
mod status;
mod status_list;
mod suite;
mod vc;
mod verifier;

pub use issuer::Issuer;
pub use proof::{Proof, Proofs};
pub use signer::CredentialSigner;
pub use status::{NoopStatusResolver, StatusCheck, StatusResolver};
pub use status_list::StatusList;
pub use vc::{
    CredentialSchema, CredentialStatus, CredentialSubject, Issuer as VcIssuer, StatusListCredential,
    StatusListSubject, StatusPurpose, VerifiableCredential, VC_CONTEXT, VC_TYPE,
};
pub use verifier::{verify, verify_status_list, Checks, VerificationOutcome};
