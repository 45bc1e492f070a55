//! Encrypted-at-rest local keyring.
//!
//! Signing keys never leave this process in plaintext: the secret scalar
//! is encrypted with AES-256-GCM under a caller-supplied master key before
//! being held in the in-memory map, the same way a production KMS would
//! keep a key wrapped until the moment it is used.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use dashmap::DashMap;
use rand::RngCore;
use trustmesh_core::{Error, Result};
use trustmesh_crypto::{Algorithm, SigningKey};

use crate::Kms;

const NONCE_LEN: usize = 12;

struct StoredKey {
    algorithm: Algorithm,
    public_key: Vec<u8>,
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

/// A [`Kms`] backend that keeps keys in memory, encrypted under a master
/// key supplied at construction. Suitable for development and for
/// single-node deployments that derive the master key from an HSM-backed
/// root of trust outside this crate.
pub struct LocalKms {
    cipher: Aes256Gcm,
    keys: DashMap<String, StoredKey>,
}

impl LocalKms {
    /// Builds a new keyring encrypted under `master_key` (32 bytes).
    pub fn new(master_key: &[u8; 32]) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(master_key));
        Self { cipher, keys: DashMap::new() }
    }

    fn encrypt(&self, plaintext: &[u8]) -> ([u8; NONCE_LEN], Vec<u8>) {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext =
            self.cipher.encrypt(nonce, plaintext).expect("AES-GCM encryption cannot fail for in-memory buffers");
        (nonce_bytes, ciphertext)
    }

    fn decrypt(&self, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
        let nonce = Nonce::from_slice(nonce);
        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| Error::CorruptState("local KMS ciphertext failed to authenticate".into()))
    }
}

impl Kms for LocalKms {
    async fn generate_key(&self, key_id: &str, algorithm: Algorithm) -> Result<()> {
        if self.keys.contains_key(key_id) {
            return Err(Error::AccessDenied(format!("key {key_id} already exists")));
        }
        let signing_key = match algorithm {
            Algorithm::EdDsa => SigningKey::generate_ed25519(),
            Algorithm::Es256k => SigningKey::generate_secp256k1(),
        };
        let public_key = signing_key.verifying_key_bytes();
        let (nonce, ciphertext) = self.encrypt(&signing_key.to_secret_bytes());
        self.keys.insert(key_id.to_string(), StoredKey { algorithm, public_key, nonce, ciphertext });
        Ok(())
    }

    async fn sign(&self, key_id: &str, msg: &[u8]) -> Result<Vec<u8>> {
        let entry =
            self.keys.get(key_id).ok_or_else(|| Error::KeyNotFound(key_id.to_string()))?;
        let secret = self.decrypt(&entry.nonce, &entry.ciphertext)?;
        let signing_key = SigningKey::from_secret_bytes(entry.algorithm, &secret)?;
        Ok(signing_key.sign(msg))
    }

    async fn public_key(&self, key_id: &str) -> Result<Vec<u8>> {
        self.keys
            .get(key_id)
            .map(|entry| entry.public_key.clone())
            .ok_or_else(|| Error::KeyNotFound(key_id.to_string()))
    }

    async fn algorithm(&self, key_id: &str) -> Result<Algorithm> {
        self.keys.get(key_id).map(|entry| entry.algorithm).ok_or_else(|| Error::KeyNotFound(key_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustmesh_crypto::verify;

    fn kms() -> LocalKms {
        LocalKms::new(&[7u8; 32])
    }

    #[tokio::test]
    async fn generate_sign_verify_roundtrip() {
        let kms = kms();
        kms.generate_key("agent-1", Algorithm::EdDsa).await.unwrap();
        let sig = kms.sign("agent-1", b"hello").await.unwrap();
        let pk = kms.public_key("agent-1").await.unwrap();
        verify(Algorithm::EdDsa, &pk, b"hello", &sig).unwrap();
    }

    #[tokio::test]
    async fn duplicate_key_id_rejected() {
        let kms = kms();
        kms.generate_key("agent-1", Algorithm::EdDsa).await.unwrap();
        assert!(kms.generate_key("agent-1", Algorithm::EdDsa).await.is_err());
    }

    #[tokio::test]
    async fn unknown_key_id_not_found() {
        let kms = kms();
        assert_eq!(kms.sign("ghost", b"x").await.unwrap_err().kind(), trustmesh_core::ErrorKind::KeyNotFound);
    }
}
