//! Signing key types for the two algorithms trustmesh issues keys under:
//! Ed25519 (`did:key`, `did:web`) and secp256k1 (`did:ethr`).
//!
//! Mirrors the shape of a typical `Signer` capability trait: a keypair can
//! sign, expose its public key, and report which algorithm it speaks, so a
//! KMS backend can hand either variant to the same credential issuer.

use ecdsa::signature::{Signer as _, Verifier as _};
use ed25519_dalek::{Signer as _, Verifier as _};
use rand::rngs::OsRng;
use trustmesh_core::{Error, Result};

/// Multicodec prefix for Ed25519 public keys (used in `did:key` multibase encoding).
pub const ED25519_CODEC: [u8; 2] = [0xed, 0x01];
/// Multicodec prefix for secp256k1 public keys.
pub const SECP256K1_CODEC: [u8; 2] = [0xe7, 0x01];

/// The signature algorithm a key speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Algorithm {
    /// Ed25519 (EdDSA), used by `did:key` and `did:web` verification methods.
    #[serde(rename = "EdDSA")]
    EdDsa,
    /// ECDSA over secp256k1 with low-S normalization, used by `did:ethr`.
    #[serde(rename = "ES256K")]
    Es256k,
}

/// An in-memory signing key. Produced by a KMS backend; never persisted
/// by this crate itself.
pub enum SigningKey {
    /// Ed25519 signing key.
    Ed25519(Box<ed25519_dalek::SigningKey>),
    /// secp256k1 signing key.
    Secp256k1(Box<k256::ecdsa::SigningKey>),
}

impl SigningKey {
    /// Generates a fresh Ed25519 signing key.
    #[must_use]
    pub fn generate_ed25519() -> Self {
        Self::Ed25519(Box::new(ed25519_dalek::SigningKey::generate(&mut OsRng)))
    }

    /// Generates a fresh secp256k1 signing key.
    #[must_use]
    pub fn generate_secp256k1() -> Self {
        Self::Secp256k1(Box::new(k256::ecdsa::SigningKey::random(&mut OsRng)))
    }

    /// The algorithm this key signs with.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        match self {
            Self::Ed25519(_) => Algorithm::EdDsa,
            Self::Secp256k1(_) => Algorithm::Es256k,
        }
    }

    /// Signs `msg`, returning the raw signature bytes (64 bytes for
    /// Ed25519, low-S-normalized DER-free `r||s` for secp256k1).
    #[must_use]
    pub fn sign(&self, msg: &[u8]) -> Vec<u8> {
        match self {
            Self::Ed25519(key) => key.sign(msg).to_bytes().to_vec(),
            Self::Secp256k1(key) => {
                let sig: k256::ecdsa::Signature = key.sign(msg);
                sig.normalize_s().unwrap_or(sig).to_bytes().to_vec()
            }
        }
    }

    /// The raw public key bytes (compressed, for secp256k1).
    #[must_use]
    pub fn verifying_key_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(key) => key.verifying_key().to_bytes().to_vec(),
            Self::Secp256k1(key) => key.verifying_key().to_encoded_point(true).as_bytes().to_vec(),
        }
    }

    /// The multicodec prefix to use when multibase-encoding this key's
    /// public key for a `did:key` identifier.
    #[must_use]
    pub const fn multicodec(&self) -> [u8; 2] {
        match self {
            Self::Ed25519(_) => ED25519_CODEC,
            Self::Secp256k1(_) => SECP256K1_CODEC,
        }
    }

    /// The raw secret scalar, for backends that persist keys themselves
    /// (encrypted) rather than delegating to a remote HSM.
    #[must_use]
    pub fn to_secret_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(key) => key.to_bytes().to_vec(),
            Self::Secp256k1(key) => key.to_bytes().to_vec(),
        }
    }

    /// Reconstructs a signing key from raw secret bytes previously
    /// produced by [`Self::to_secret_bytes`].
    pub fn from_secret_bytes(algorithm: Algorithm, bytes: &[u8]) -> Result<Self> {
        match algorithm {
            Algorithm::EdDsa => {
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| Error::MalformedInput("Ed25519 secret key must be 32 bytes".into()))?;
                Ok(Self::Ed25519(Box::new(ed25519_dalek::SigningKey::from_bytes(&arr))))
            }
            Algorithm::Es256k => {
                let key = k256::ecdsa::SigningKey::from_slice(bytes)
                    .map_err(|e| Error::MalformedInput(format!("invalid secp256k1 secret key: {e}")))?;
                Ok(Self::Secp256k1(Box::new(key)))
            }
        }
    }
}

/// Verifies `sig` over `msg` under the given algorithm and raw public key
/// bytes. Returns `Ok(())` on success, `Err(Error::InvalidSignature)` on
/// any mismatch (bad key bytes count as failed verification, not a
/// separate error class, since a caller never gets to distinguish the
/// two without an oracle).
pub fn verify(algorithm: Algorithm, public_key: &[u8], msg: &[u8], sig: &[u8]) -> Result<()> {
    match algorithm {
        Algorithm::EdDsa => {
            let key_bytes: [u8; 32] = public_key
                .try_into()
                .map_err(|_| Error::InvalidSignature("malformed Ed25519 public key".into()))?;
            let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&key_bytes)
                .map_err(|e| Error::InvalidSignature(format!("malformed Ed25519 public key: {e}")))?;
            let sig_bytes: [u8; 64] = sig
                .try_into()
                .map_err(|_| Error::InvalidSignature("malformed Ed25519 signature".into()))?;
            let signature = ed25519_dalek::Signature::from_bytes(&sig_bytes);
            verifying_key
                .verify(msg, &signature)
                .map_err(|e| Error::InvalidSignature(format!("Ed25519 verification failed: {e}")))
        }
        Algorithm::Es256k => {
            let verifying_key = k256::ecdsa::VerifyingKey::from_sec1_bytes(public_key)
                .map_err(|e| Error::InvalidSignature(format!("malformed secp256k1 public key: {e}")))?;
            let signature = k256::ecdsa::Signature::try_from(sig)
                .map_err(|e| Error::InvalidSignature(format!("malformed secp256k1 signature: {e}")))?;
            verifying_key
                .verify(msg, &signature)
                .map_err(|e| Error::InvalidSignature(format!("secp256k1 verification failed: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ed25519_roundtrip() {
        let key = SigningKey::generate_ed25519();
        let sig = key.sign(b"hello");
        verify(Algorithm::EdDsa, &key.verifying_key_bytes(), b"hello", &sig).unwrap();
    }

    #[test]
    fn secp256k1_roundtrip() {
        let key = SigningKey::generate_secp256k1();
        let sig = key.sign(b"hello");
        verify(Algorithm::Es256k, &key.verifying_key_bytes(), b"hello", &sig).unwrap();
    }

    #[test]
    fn tampered_message_fails() {
        let key = SigningKey::generate_ed25519();
        let sig = key.sign(b"hello");
        assert!(verify(Algorithm::EdDsa, &key.verifying_key_bytes(), b"goodbye", &sig).is_err());
    }
}
