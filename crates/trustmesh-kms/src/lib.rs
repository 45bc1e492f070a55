//! # TrustMesh KMS
//!
//! A single [`Kms`] capability trait fronting three backends: an
//! encrypted-at-rest local keyring for development and single-node
//! deployments, and thin HTTP clients for AWS KMS and GCP Cloud KMS.
//! Issuers and the audit log depend only on the trait, never on a
//! concrete backend.

mod local;
mod remote;

pub use local::LocalKms;
pub use remote::{AwsKms, GcpKms};
pub use trustmesh_crypto::Algorithm;
use trustmesh_core::Result;

/// A managed signing key, addressed by an opaque `key_id` the caller
/// chose at [`Kms::generate_key`] time.
pub trait Kms: Send + Sync {
    /// Provisions a new key under `key_id` for the given algorithm.
    /// Returns `Err` if `key_id` is already in use.
    async fn generate_key(&self, key_id: &str, algorithm: Algorithm) -> Result<()>;

    /// Signs `msg` with the key named `key_id`.
    async fn sign(&self, key_id: &str, msg: &[u8]) -> Result<Vec<u8>>;

    /// Returns the raw public key bytes for `key_id`.
    async fn public_key(&self, key_id: &str) -> Result<Vec<u8>>;

    /// Returns the algorithm `key_id` was provisioned with.
    async fn algorithm(&self, key_id: &str) -> Result<Algorithm>;
}
