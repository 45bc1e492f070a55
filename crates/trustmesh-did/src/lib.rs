//! # TrustMesh DID
//!
//! DID document model and resolvers for the four methods trustmesh trusts:
//! `did:key` (self-certifying), `did:web` (HTTPS-hosted), `did:ethr`
//! (Ethereum address) and `did:ion` (delegated to a Sidetree node). The
//! [`universal::UniversalResolver`] dispatches by method and adds a TTL
//! cache with single-flight coordination in front of all four.

pub mod document;
mod ethr;
mod ion;
mod key;
mod method;
mod resolver;
pub mod universal;
mod web;

pub use document::{
    Document, DocumentMetadata, MethodType, PublicKeyFormat, PublicKeyJwk, Resolution,
    ResolutionMetadata, Service, VerificationMethod, DID_CONTEXT,
};
pub use ethr::EthrResolver;
pub use ion::IonResolver;
pub use key::KeyResolver;
pub use method::{Did, Method};
pub use resolver::DidResolver;
pub use universal::UniversalResolver;
pub use web::WebResolver;
