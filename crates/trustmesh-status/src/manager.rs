//! Allocating indices within status lists and re-signing them as bits
//! change, backed by a [`StatusListStorage`].

use dashmap::DashMap;
use tokio::sync::Mutex;
use trustmesh_core::{Error, Result};
use trustmesh_credential::{CredentialSigner, CredentialStatus, StatusList, StatusPurpose};

use crate::storage::StatusListStorage;

struct ManagedList {
    list: StatusList,
    next_index: usize,
}

/// Allocates indices out of status lists and flags credentials as
/// revoked/suspended, persisting the re-signed list after every mutation.
///
/// Index allocation is monotonic within a process: once an index is
/// handed out it is never handed out again, even if its bit later toggles
/// back to unset (suspension lifted). On restart the next-free counter is
/// re-derived from the persisted list's first unset bit, which is correct
/// as long as indices are always allocated in order — true for every
/// caller that goes through [`StatusListManager::allocate`].
pub struct StatusListManager<Store, Signer> {
    store: Store,
    signer: Signer,
    issuer_did: String,
    lists: DashMap<String, Mutex<ManagedList>>,
}

impl<Store: StatusListStorage, Signer: CredentialSigner> StatusListManager<Store, Signer> {
    /// Builds a manager that persists lists via `store` and signs them as
    /// `issuer_did` using `signer`.
    pub fn new(store: Store, signer: Signer, issuer_did: impl Into<String>) -> Self {
        Self { store, signer, issuer_did: issuer_did.into(), lists: DashMap::new() }
    }

    async fn ensure_list(&self, list_id: &str, purpose: StatusPurpose) -> Result<()> {
        if self.lists.contains_key(list_id) {
            return Ok(());
        }
        let list = match self.store.load(list_id).await? {
            Some(credential) => StatusList::from_credential(&credential)?,
            None => StatusList::new(list_id, purpose),
        };
        let next_index = list.allocate().unwrap_or(trustmesh_bitstring::MIN_LENGTH_BITS);
        self.lists.entry(list_id.to_string()).or_insert_with(|| Mutex::new(ManagedList { list, next_index }));
        Ok(())
    }

    /// Reserves the next free index in `list_id` (creating the list with
    /// `purpose` if it does not yet exist) and returns the status entry a
    /// new credential should carry.
    pub async fn allocate(&self, list_id: &str, purpose: StatusPurpose) -> Result<CredentialStatus> {
        self.ensure_list(list_id, purpose).await?;
        let entry = self.lists.get(list_id).ok_or_else(|| Error::CorruptState("status list vanished".into()))?;
        let mut managed = entry.lock().await;
        if managed.next_index >= trustmesh_bitstring::MIN_LENGTH_BITS {
            return Err(Error::ListFull);
        }
        let index = managed.next_index;
        managed.next_index += 1;

        let credential = managed.list.issue(&self.issuer_did, &self.signer).await?;
        drop(managed);
        self.store.save(&credential).await?;

        Ok(CredentialStatus {
            id: format!("{list_id}#{index}"),
            type_: "StatusList2021Entry".to_string(),
            status_purpose: purpose,
            status_list_index: index,
            status_list_credential: list_id.to_string(),
        })
    }

    /// Fetches the persisted status list credential for `list_id`, e.g.
    /// to return the up-to-date list after a [`Self::flag`] call.
    pub async fn snapshot(&self, list_id: &str) -> Result<Option<trustmesh_credential::StatusListCredential>> {
        self.store.load(list_id).await
    }

    /// Flags (or clears) the bit backing `status`, re-signs the list, and
    /// persists the update.
    pub async fn flag(&self, status: &CredentialStatus, flagged: bool) -> Result<()> {
        self.ensure_list(&status.status_list_credential, status.status_purpose).await?;
        let entry = self
            .lists
            .get(&status.status_list_credential)
            .ok_or_else(|| Error::CorruptState("status list vanished".into()))?;
        let mut managed = entry.lock().await;
        managed.list.set(status.status_list_index, flagged)?;
        let credential = managed.list.issue(&self.issuer_did, &self.signer).await?;
        drop(managed);
        self.store.save(&credential).await
    }
}

#[cfg(test)]
mod tests {
    use trustmesh_crypto::{Algorithm, SigningKey};

    use super::*;
    use crate::storage::InMemoryStorage;

    struct TestSigner(SigningKey);

    impl CredentialSigner for TestSigner {
        async fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
            Ok(self.0.sign(msg))
        }

        fn algorithm(&self) -> Algorithm {
            self.0.algorithm()
        }

        fn verification_method(&self) -> String {
            "did:key:z6MkIssuer#z6MkIssuer".to_string()
        }
    }

    fn manager() -> StatusListManager<InMemoryStorage, TestSigner> {
        StatusListManager::new(
            InMemoryStorage::new(),
            TestSigner(SigningKey::generate_ed25519()),
            "did:key:z6MkIssuer",
        )
    }

    #[tokio::test]
    async fn allocate_hands_out_sequential_indices() {
        let manager = manager();
        let a = manager.allocate("https://example.com/status/1", StatusPurpose::Revocation).await.unwrap();
        let b = manager.allocate("https://example.com/status/1", StatusPurpose::Revocation).await.unwrap();
        assert_eq!(a.status_list_index, 0);
        assert_eq!(b.status_list_index, 1);
    }

    #[tokio::test]
    async fn flag_persists_revocation() {
        let manager = manager();
        let status = manager.allocate("https://example.com/status/1", StatusPurpose::Revocation).await.unwrap();
        manager.flag(&status, true).await.unwrap();
        let credential = manager.store.load(&status.status_list_credential).await.unwrap().unwrap();
        let rebuilt = StatusList::from_credential(&credential).unwrap();
        assert!(rebuilt.get(status.status_list_index).unwrap());
    }
}
