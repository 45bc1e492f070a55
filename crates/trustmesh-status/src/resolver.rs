//! A [`StatusResolver`] that fetches status lists from a
//! [`StatusListStorage`] backend and caches the decoded bitstring for a
//! configurable TTL, so a batch of verifications against the same list
//! only decodes it once.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use trustmesh_core::Error;
use trustmesh_credential::{verify_status_list, CredentialStatus, StatusCheck, StatusList, StatusPurpose, StatusResolver};
use trustmesh_did::DidResolver;

use crate::storage::StatusListStorage;

/// Default time a decoded list is trusted before being re-fetched.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

struct CacheEntry {
    list: StatusList,
    inserted_at: Instant,
}

/// Resolves [`CredentialStatus`] entries against status lists kept in a
/// [`StatusListStorage`] backend. Every freshly fetched list's own proof
/// is verified against its issuer's resolved DID document before its
/// bits are trusted.
pub struct CachingStatusResolver<Store, Resolver> {
    store: Store,
    resolver: Resolver,
    cache: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl<Store: StatusListStorage, Resolver: DidResolver> CachingStatusResolver<Store, Resolver> {
    /// Builds a resolver backed by `store`, verifying list proofs against
    /// `resolver`, using the default cache TTL.
    pub fn new(store: Store, resolver: Resolver) -> Self {
        Self { store, resolver, cache: DashMap::new(), ttl: DEFAULT_CACHE_TTL }
    }

    /// Builds a resolver with a custom cache TTL.
    pub fn with_ttl(store: Store, resolver: Resolver, ttl: Duration) -> Self {
        Self { store, resolver, cache: DashMap::new(), ttl }
    }

    /// Evicts a cached list, forcing the next check to re-fetch it.
    pub fn invalidate(&self, list_id: &str) {
        self.cache.remove(list_id);
    }

    async fn fetch(&self, list_id: &str) -> trustmesh_core::Result<()> {
        let credential = self
            .store
            .load(list_id)
            .await?
            .ok_or_else(|| Error::StatusUnavailable(format!("no list stored for {list_id}")))?;
        verify_status_list(&credential, &self.resolver).await?;
        let list = StatusList::from_credential(&credential)?;
        self.cache.insert(list_id.to_string(), CacheEntry { list, inserted_at: Instant::now() });
        Ok(())
    }

    fn is_fresh(&self, list_id: &str) -> bool {
        self.cache.get(list_id).is_some_and(|entry| entry.inserted_at.elapsed() <= self.ttl)
    }
}

impl<Store: StatusListStorage, Resolver: DidResolver> StatusResolver for CachingStatusResolver<Store, Resolver> {
    async fn check(&self, status: &CredentialStatus) -> trustmesh_core::Result<StatusCheck> {
        if !self.is_fresh(&status.status_list_credential) {
            self.fetch(&status.status_list_credential).await?;
        }

        let entry = self
            .cache
            .get(&status.status_list_credential)
            .ok_or_else(|| Error::StatusUnavailable(status.status_list_credential.clone()))?;
        let flagged = entry.list.get(status.status_list_index)?;

        Ok(match (flagged, status.status_purpose) {
            (false, _) => StatusCheck::Valid,
            (true, StatusPurpose::Revocation) => StatusCheck::Revoked,
            (true, StatusPurpose::Suspension) => StatusCheck::Suspended,
        })
    }
}

#[cfg(test)]
mod tests {
    use trustmesh_credential::{CredentialSigner, StatusList};
    use trustmesh_crypto::{Algorithm, SigningKey};
    use trustmesh_did::KeyResolver;

    use super::*;
    use crate::storage::InMemoryStorage;

    struct TestSigner {
        key: SigningKey,
        did: String,
    }

    impl TestSigner {
        fn generate() -> Self {
            let key = SigningKey::generate_ed25519();
            let mut bytes = trustmesh_crypto::ED25519_CODEC.to_vec();
            bytes.extend_from_slice(&key.verifying_key_bytes());
            let multibase = multibase::encode(multibase::Base::Base58Btc, &bytes);
            Self { key, did: format!("did:key:{multibase}") }
        }
    }

    impl CredentialSigner for TestSigner {
        async fn sign(&self, msg: &[u8]) -> trustmesh_core::Result<Vec<u8>> {
            Ok(self.key.sign(msg))
        }

        fn algorithm(&self) -> Algorithm {
            self.key.algorithm()
        }

        fn verification_method(&self) -> String {
            let fragment = self.did.trim_start_matches("did:key:");
            format!("{}#{fragment}", self.did)
        }
    }

    fn entry(list_id: &str, index: usize) -> CredentialStatus {
        CredentialStatus {
            id: format!("{list_id}#{index}"),
            type_: "StatusList2021Entry".to_string(),
            status_purpose: StatusPurpose::Revocation,
            status_list_index: index,
            status_list_credential: list_id.to_string(),
        }
    }

    #[tokio::test]
    async fn reports_valid_then_revoked_after_reissue() {
        let signer = TestSigner::generate();
        let mut list = StatusList::new("https://example.com/status/1", StatusPurpose::Revocation);
        let status = entry(&list.id, 5);

        let store = InMemoryStorage::new();
        store.save(&list.issue(&signer.did, &signer).await.unwrap()).await.unwrap();
        let resolver = CachingStatusResolver::new(store, KeyResolver);
        assert_eq!(resolver.check(&status).await.unwrap(), StatusCheck::Valid);

        list.set(5, true).unwrap();
        resolver.store.save(&list.issue(&signer.did, &signer).await.unwrap()).await.unwrap();
        resolver.invalidate(&status.status_list_credential);
        assert_eq!(resolver.check(&status).await.unwrap(), StatusCheck::Revoked);
    }

    #[tokio::test]
    async fn missing_list_is_unavailable() {
        let resolver = CachingStatusResolver::new(InMemoryStorage::new(), KeyResolver);
        let err = resolver.check(&entry("https://example.com/status/none", 0)).await.unwrap_err();
        assert_eq!(err.kind(), trustmesh_core::ErrorKind::StatusUnavailable);
    }

    #[tokio::test]
    async fn tampered_list_fails_verification() {
        let signer = TestSigner::generate();
        let list = StatusList::new("https://example.com/status/2", StatusPurpose::Revocation);
        let status = entry(&list.id, 3);

        let mut credential = list.issue(&signer.did, &signer).await.unwrap();
        credential.credential_subject.encoded_list = "tampered".to_string();

        let store = InMemoryStorage::new();
        store.save(&credential).await.unwrap();
        let resolver = CachingStatusResolver::new(store, KeyResolver);
        let err = resolver.check(&status).await.unwrap_err();
        assert_eq!(err.kind(), trustmesh_core::ErrorKind::InvalidSignature);
    }
}
