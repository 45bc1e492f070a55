//! Where audit entries are kept. Storage only appends and reads; the
//! hash chain and signatures are verified by [`crate::AuditLog`], not here.

use std::path::PathBuf;

use serde_jsonlines::{AsyncJsonLinesReader, AsyncJsonLinesWriter};
use tokio::io::{AsyncWriteExt as _, BufReader, BufWriter};
use tokio::sync::Mutex;
use trustmesh_core::{Error, Result};

use crate::entry::AuditEntry;

/// Durable storage for an append-only audit log.
pub trait AuditStorage: Send + Sync {
    /// Appends `entry`. Implementations must serialize concurrent
    /// appends; [`crate::AuditLog`] relies on `append` being atomic with
    /// respect to [`Self::last`] to keep the hash chain unbroken.
    fn append(&self, entry: &AuditEntry) -> impl std::future::Future<Output = Result<()>> + Send;

    /// The most recently appended entry, or `None` for an empty log.
    fn last(&self) -> impl std::future::Future<Output = Result<Option<AuditEntry>>> + Send;

    /// Every entry in append order.
    fn read_all(&self) -> impl std::future::Future<Output = Result<Vec<AuditEntry>>> + Send;
}

/// An in-memory [`AuditStorage`], suitable for tests and for logs that
/// are flushed to durable storage by a higher layer (e.g. as part of a
/// larger transactional write).
#[derive(Default)]
pub struct InMemoryAuditStorage {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditStorage {
    /// Builds an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditStorage for InMemoryAuditStorage {
    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }

    async fn last(&self) -> Result<Option<AuditEntry>> {
        Ok(self.entries.lock().await.last().cloned())
    }

    async fn read_all(&self) -> Result<Vec<AuditEntry>> {
        Ok(self.entries.lock().await.clone())
    }
}

/// An [`AuditStorage`] backed by a JSON Lines file, one entry per line,
/// opened in append-only mode so a compromised writer cannot rewrite
/// history without leaving the file's prior bytes untouched on disk.
pub struct FileAuditStorage {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl FileAuditStorage {
    /// Opens (creating if necessary) the log file at `path`.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| Error::CorruptState(e.to_string()))?;
        }
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| Error::CorruptState(e.to_string()))?;
        Ok(Self { path, append_lock: Mutex::new(()) })
    }
}

impl AuditStorage for FileAuditStorage {
    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        let _guard = self.append_lock.lock().await;
        let file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| Error::CorruptState(e.to_string()))?;
        let mut writer = AsyncJsonLinesWriter::new(BufWriter::new(file));
        writer.write(entry).await.map_err(|e| Error::CorruptState(e.to_string()))?;
        writer.flush().await.map_err(|e| Error::CorruptState(e.to_string()))?;
        Ok(())
    }

    async fn last(&self) -> Result<Option<AuditEntry>> {
        Ok(self.read_all().await?.pop())
    }

    async fn read_all(&self) -> Result<Vec<AuditEntry>> {
        let file = tokio::fs::File::open(&self.path).await.map_err(|e| Error::CorruptState(e.to_string()))?;
        let mut reader = AsyncJsonLinesReader::new(BufReader::new(file));
        let mut entries = Vec::new();
        while let Some(entry) = reader.read::<AuditEntry>().await.map_err(|e| Error::CorruptState(e.to_string()))? {
            entries.push(entry);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(sequence: u64, prev_hash: &str) -> AuditEntry {
        AuditEntry {
            sequence,
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            event: crate::entry::EventKind::KeyGenerated { key_id: "agent-1".to_string() },
            prev_hash: prev_hash.to_string(),
            hash: "deadbeef".to_string(),
            signer: "did:key:z6MkIssuer".to_string(),
            signature: "sig".to_string(),
        }
    }

    #[tokio::test]
    async fn in_memory_preserves_append_order() {
        let store = InMemoryAuditStorage::new();
        store.append(&sample(1, &AuditEntry::genesis_hash())).await.unwrap();
        store.append(&sample(2, "deadbeef")).await.unwrap();
        let all = store.read_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].sequence, 2);
        assert_eq!(store.last().await.unwrap().unwrap().sequence, 2);
    }

    #[tokio::test]
    async fn file_storage_survives_reopen() {
        let path = std::env::temp_dir().join(format!("trustmesh-audit-test-{}.jsonl", std::process::id()));
        tokio::fs::remove_file(&path).await.ok();
        {
            let store = FileAuditStorage::new(&path).await.unwrap();
            store.append(&sample(1, &AuditEntry::genesis_hash())).await.unwrap();
        }
        let reopened = FileAuditStorage::new(&path).await.unwrap();
        reopened.append(&sample(2, "deadbeef")).await.unwrap();
        let all = reopened.read_all().await.unwrap();
        assert_eq!(all.len(), 2);
        tokio::fs::remove_file(&path).await.ok();
    }
}
