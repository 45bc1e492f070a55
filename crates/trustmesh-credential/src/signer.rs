//! The capability an [`crate::issuer::Issuer`] needs from a key manager.
//! Defined here, next to its consumer, rather than inherited from a KMS
//! crate, so the issuer never depends on a specific KMS backend.

use std::sync::Arc;

use trustmesh_core::Result;
use trustmesh_crypto::Algorithm;

/// Signs bytes on behalf of a credential issuer.
pub trait CredentialSigner: Send + Sync {
    /// Signs `msg`, returning the raw signature bytes.
    fn sign(&self, msg: &[u8]) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// The algorithm this signer produces signatures under.
    fn algorithm(&self) -> Algorithm;

    /// The DID URL (`did:...#fragment`) of the verification method the
    /// signature should be checked against.
    fn verification_method(&self) -> String;
}

impl<T: CredentialSigner> CredentialSigner for Arc<T> {
    async fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        T::sign(self, msg).await
    }

    fn algorithm(&self) -> Algorithm {
        T::algorithm(self)
    }

    fn verification_method(&self) -> String {
        T::verification_method(self)
    }
}
