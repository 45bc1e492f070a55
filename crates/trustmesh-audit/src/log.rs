//! The audit log itself: appending new entries and verifying the chain.

use base64ct::{Base64UrlUnpadded, Encoding as _};
use chrono::Utc;
use serde::Serialize;
use trustmesh_core::{Error, Result};
use trustmesh_crypto::{canonicalize, verify as verify_signature};

use crate::entry::{AuditEntry, EventKind};
use crate::signer::AuditSigner;
use crate::storage::AuditStorage;

#[derive(Serialize)]
struct SigningPayload<'a> {
    sequence: u64,
    timestamp: &'a str,
    event: &'a EventKind,
    prev_hash: &'a str,
}

/// An append-only, hash-chained, signed log of security-relevant events.
pub struct AuditLog<Storage, Signer> {
    storage: Storage,
    signer: Signer,
}

impl<Storage: AuditStorage, Signer: AuditSigner> AuditLog<Storage, Signer> {
    /// Builds a log that persists to `storage` and signs entries with
    /// `signer`.
    pub const fn new(storage: Storage, signer: Signer) -> Self {
        Self { storage, signer }
    }

    /// Appends `event`, chaining and signing it, and persists the result.
    pub async fn append(&self, event: EventKind) -> Result<AuditEntry> {
        let prev = self.storage.last().await?;
        let (sequence, prev_hash) =
            prev.map_or((0, AuditEntry::genesis_hash()), |e| (e.sequence + 1, e.hash));
        let timestamp = trustmesh_core::time::to_rfc3339(Utc::now());

        let hash = entry_hash(sequence, &timestamp, &event, &prev_hash)?;
        let signature = self.signer.sign(hash.as_bytes()).await?;

        let entry = AuditEntry {
            sequence,
            timestamp,
            event,
            prev_hash,
            hash,
            signer: self.signer.signer_id(),
            signature: Base64UrlUnpadded::encode_string(&signature),
        };
        self.storage.append(&entry).await?;
        Ok(entry)
    }

    /// Replays the whole log, checking that every entry's hash matches
    /// its content, that the chain of `prev_hash` links is unbroken from
    /// genesis, and that every signature verifies against this log's
    /// signer.
    pub async fn verify_chain(&self) -> Result<()> {
        let entries = self.storage.read_all().await?;
        let mut expected_prev = AuditEntry::genesis_hash();
        let public_key = self.signer.public_key();

        for entry in &entries {
            if entry.prev_hash != expected_prev {
                return Err(Error::CorruptState(format!(
                    "hash chain broken at sequence {}: expected prev_hash {}, found {}",
                    entry.sequence, expected_prev, entry.prev_hash
                )));
            }

            let recomputed = entry_hash(entry.sequence, &entry.timestamp, &entry.event, &entry.prev_hash)?;
            if recomputed != entry.hash {
                return Err(Error::CorruptState(format!("entry {} content does not match its hash", entry.sequence)));
            }

            let signature = Base64UrlUnpadded::decode_vec(&entry.signature)
                .map_err(|e| Error::CorruptState(format!("entry {} signature malformed: {e}", entry.sequence)))?;
            verify_signature(self.signer.algorithm(), &public_key, entry.hash.as_bytes(), &signature)
                .map_err(|_| Error::CorruptState(format!("entry {} signature does not verify", entry.sequence)))?;

            expected_prev = entry.hash.clone();
        }
        Ok(())
    }
}

fn entry_hash(sequence: u64, timestamp: &str, event: &EventKind, prev_hash: &str) -> Result<String> {
    let payload = canonicalize(&SigningPayload { sequence, timestamp, event, prev_hash })?;
    Ok(trustmesh_crypto::sha256_hex(&payload))
}

#[cfg(test)]
mod tests {
    use trustmesh_crypto::{Algorithm, SigningKey};

    use super::*;
    use crate::storage::InMemoryAuditStorage;

    struct TestSigner(SigningKey);

    impl AuditSigner for TestSigner {
        async fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
            Ok(self.0.sign(msg))
        }

        fn algorithm(&self) -> Algorithm {
            self.0.algorithm()
        }

        fn public_key(&self) -> Vec<u8> {
            self.0.verifying_key_bytes()
        }

        fn signer_id(&self) -> String {
            "did:key:z6MkAudit".to_string()
        }
    }

    fn log() -> AuditLog<InMemoryAuditStorage, TestSigner> {
        AuditLog::new(InMemoryAuditStorage::new(), TestSigner(SigningKey::generate_ed25519()))
    }

    #[tokio::test]
    async fn appended_entries_chain_and_verify() {
        let log = log();
        let first = log.append(EventKind::KeyGenerated { key_id: "agent-1".to_string() }).await.unwrap();
        let second = log
            .append(EventKind::TrustScoreRecomputed { subject: "did:key:zSubject".to_string(), score: 0.82 })
            .await
            .unwrap();

        assert_eq!(first.sequence, 0);
        assert_eq!(first.prev_hash, AuditEntry::genesis_hash());
        assert_eq!(second.prev_hash, first.hash);
        log.verify_chain().await.unwrap();
    }

    #[tokio::test]
    async fn tampered_entry_fails_verification() {
        let log = log();
        log.append(EventKind::KeyGenerated { key_id: "agent-1".to_string() }).await.unwrap();
        let mut entries = log.storage.read_all().await.unwrap();
        entries[0].event = EventKind::KeyGenerated { key_id: "attacker-key".to_string() };

        let tampered_storage = InMemoryAuditStorage::new();
        for entry in &entries {
            tampered_storage.append(entry).await.unwrap();
        }
        let tampered_log = AuditLog::new(tampered_storage, TestSigner(SigningKey::generate_ed25519()));
        assert_eq!(tampered_log.verify_chain().await.unwrap_err().kind(), trustmesh_core::ErrorKind::CorruptState);
    }
}
