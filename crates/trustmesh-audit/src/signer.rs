//! The signing capability an [`crate::AuditLog`] needs, kept independent
//! of `trustmesh-credential`'s `CredentialSigner` since audit entries are
//! not verifiable credentials and a deployment may want a key dedicated
//! to the audit log alone.

use std::sync::Arc;

use trustmesh_core::Result;
use trustmesh_crypto::Algorithm;

/// Signs audit entries and identifies the key that signed them.
pub trait AuditSigner: Send + Sync {
    /// Signs `msg`, the entry's content hash.
    fn sign(&self, msg: &[u8]) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// The signature algorithm this signer produces.
    fn algorithm(&self) -> Algorithm;

    /// The raw public key bytes verifiers should check signatures against.
    fn public_key(&self) -> Vec<u8>;

    /// An identifier (typically a DID) recorded alongside each entry so a
    /// log with multiple writers can be attributed and re-verified.
    fn signer_id(&self) -> String;
}

impl<T: AuditSigner> AuditSigner for Arc<T> {
    async fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        T::sign(self, msg).await
    }

    fn algorithm(&self) -> Algorithm {
        T::algorithm(self)
    }

    fn public_key(&self) -> Vec<u8> {
        T::public_key(self)
    }

    fn signer_id(&self) -> String {
        T::signer_id(self)
    }
}
