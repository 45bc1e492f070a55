//! # TrustMesh
//!
//! A trust infrastructure facade composing DID resolution, verifiable
//! credential issuance/verification, Status List 2021 revocation, and
//! six-pillar trust scoring, emitting one signed audit entry per
//! operation (including failures).
//!
//! The component crates (`trustmesh-core`, `trustmesh-crypto`,
//! `trustmesh-kms`, `trustmesh-bitstring`, `trustmesh-did`,
//! `trustmesh-credential`, `trustmesh-status`, `trustmesh-audit`,
//! `trustmesh-score`) can be used directly; this crate is a convenience
//! facade for the common end-to-end flows.

mod orchestrator;

pub use orchestrator::{TrustOrchestrator, VerifyAndScoreOutcome};
