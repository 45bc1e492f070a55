//! Persistence for status list credentials, keyed by list id (the
//! credential's own `id`, typically the URL clients dereference).

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use trustmesh_core::{Error, Result};
use trustmesh_credential::StatusListCredential;

/// Where [`StatusListCredential`]s are kept between process restarts.
pub trait StatusListStorage: Send + Sync {
    /// Loads the credential last saved under `list_id`, if any.
    fn load(&self, list_id: &str) -> impl std::future::Future<Output = Result<Option<StatusListCredential>>> + Send;

    /// Saves `credential`, overwriting whatever was previously stored
    /// under its id.
    fn save(&self, credential: &StatusListCredential) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Lists the ids of every list known to this store, for
    /// administrative enumeration (e.g. a periodic re-sign sweep).
    fn list_all(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

/// An in-memory [`StatusListStorage`], suitable for tests and single-node
/// deployments that re-derive lists from the audit log on restart.
///
/// Cheaply `Clone`: clones share the same underlying map, so a manager
/// and a resolver built from separate clones see each other's writes.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    lists: Arc<DashMap<String, StatusListCredential>>,
}

impl InMemoryStorage {
    /// Builds an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusListStorage for InMemoryStorage {
    async fn load(&self, list_id: &str) -> Result<Option<StatusListCredential>> {
        Ok(self.lists.get(list_id).map(|entry| entry.clone()))
    }

    async fn save(&self, credential: &StatusListCredential) -> Result<()> {
        self.lists.insert(credential.id.clone(), credential.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<String>> {
        Ok(self.lists.iter().map(|entry| entry.key().clone()).collect())
    }
}

/// A [`StatusListStorage`] backed by one JSON file per list under a root
/// directory, named by a hash of the list id to avoid filesystem-unsafe
/// characters in what is usually a URL.
///
/// The id-to-filename index is kept in memory only; a process restart
/// relies on callers re-registering lists they already know about (via
/// [`Self::save`]) rather than [`Self::list_all`] recovering unknown ids
/// from the hashed filenames on disk.
///
/// Cheaply `Clone`: clones share the same index and point at the same
/// root directory.
#[derive(Clone)]
pub struct FilesystemStorage {
    root: PathBuf,
    known_ids: Arc<DashMap<String, ()>>,
}

impl FilesystemStorage {
    /// Builds a store rooted at `root`, which is created if it does not
    /// already exist.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| Error::CorruptState(e.to_string()))?;
        Ok(Self { root, known_ids: Arc::new(DashMap::new()) })
    }

    fn path_for(&self, list_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", trustmesh_crypto::sha256_hex(list_id.as_bytes())))
    }
}

impl StatusListStorage for FilesystemStorage {
    async fn load(&self, list_id: &str) -> Result<Option<StatusListCredential>> {
        let path = self.path_for(list_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                self.known_ids.insert(list_id.to_string(), ());
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::CorruptState(e.to_string())),
        }
    }

    async fn save(&self, credential: &StatusListCredential) -> Result<()> {
        let path = self.path_for(&credential.id);
        let bytes = serde_json::to_vec_pretty(credential)?;
        tokio::fs::write(&path, bytes).await.map_err(|e| Error::CorruptState(e.to_string()))?;
        self.known_ids.insert(credential.id.clone(), ());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<String>> {
        Ok(self.known_ids.iter().map(|entry| entry.key().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use trustmesh_core::Kind;
    use trustmesh_credential::{StatusListSubject, StatusPurpose, VC_CONTEXT};

    use super::*;

    fn sample(id: &str) -> StatusListCredential {
        StatusListCredential {
            context: vec![Kind::String(VC_CONTEXT.to_string())],
            id: id.to_string(),
            type_: vec!["VerifiableCredential".into(), "StatusList2021Credential".into()],
            issuer: Kind::String("did:key:z6Mk".into()),
            credential_subject: StatusListSubject {
                id: format!("{id}#list"),
                type_: "StatusList2021".into(),
                status_purpose: StatusPurpose::Revocation,
                encoded_list: "H4sIAAAAAAAA_-3AgQAAAADDoPlTH2EAVQAAAAAAAAAAAAAAAAAAAIC3AYbSVKsAQAAA".into(),
            },
            proof: None,
        }
    }

    #[tokio::test]
    async fn in_memory_roundtrips() {
        let store = InMemoryStorage::new();
        assert!(store.load("a").await.unwrap().is_none());
        store.save(&sample("a")).await.unwrap();
        assert_eq!(store.load("a").await.unwrap().unwrap().id, "a");
        assert_eq!(store.list_all().await.unwrap(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn filesystem_roundtrips() {
        let dir = std::env::temp_dir().join(format!("trustmesh-status-test-{}", std::process::id()));
        let store = FilesystemStorage::new(&dir).await.unwrap();
        store.save(&sample("https://example.com/status/1")).await.unwrap();
        let fetched = store.load("https://example.com/status/1").await.unwrap().unwrap();
        assert_eq!(fetched.id, "https://example.com/status/1");
        assert!(store.load("https://example.com/status/2").await.unwrap().is_none());
        assert_eq!(store.list_all().await.unwrap(), vec!["https://example.com/status/1".to_string()]);
        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
