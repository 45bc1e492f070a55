//! The capability a [`crate::verifier`] needs to check a credential's
//! revocation/suspension status, kept separate from `trustmesh-status` so
//! the verifier never depends on a specific status list storage backend.

use trustmesh_core::Result;

use crate::vc::CredentialStatus;

/// The outcome of checking a single status entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCheck {
    /// The bit is unset; the credential is neither revoked nor suspended.
    Valid,
    /// The bit is set and the entry's purpose is `Revocation`.
    Revoked,
    /// The bit is set and the entry's purpose is `Suspension`.
    Suspended,
}

/// Resolves a credential's status entry to a current verdict.
pub trait StatusResolver: Send + Sync {
    /// Checks `status`, fetching and decoding its referenced status list
    /// if necessary.
    fn check(&self, status: &CredentialStatus) -> impl std::future::Future<Output = Result<StatusCheck>> + Send;
}

/// A [`StatusResolver`] that always reports `Valid`, for verifying
/// credentials that carry no status entry without forcing callers to
/// thread a real resolver through generic code that never calls it.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopStatusResolver;

impl StatusResolver for NoopStatusResolver {
    async fn check(&self, _status: &CredentialStatus) -> Result<StatusCheck> {
        Ok(StatusCheck::Valid)
    }
}
