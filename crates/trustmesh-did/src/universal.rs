//! A method-dispatching resolver with a TTL cache and single-flight
//! coordination, so that N concurrent verifiers resolving the same
//! issuer DID trigger exactly one network round trip.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures::future::{FutureExt as _, Shared};
use tokio_util::sync::CancellationToken;
use trustmesh_core::{Error, Result};

use crate::document::{Document, DocumentMetadata, Resolution, ResolutionMetadata};
use crate::ethr::EthrResolver;
use crate::ion::IonResolver;
use crate::key::KeyResolver;
use crate::method::{Did, Method};
use crate::resolver::DidResolver;
use crate::web::WebResolver;

/// Default time a cached document is considered fresh before a
/// resolution is attempted again.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default deadline for a single resolution attempt.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

type InflightFuture = Shared<Pin<Box<dyn Future<Output = Result<Document>> + Send>>>;

struct CacheEntry {
    document: Document,
    inserted_at: Instant,
}

/// Resolves DIDs of any supported method, caching successful resolutions
/// and collapsing concurrent lookups of the same DID into one request.
pub struct UniversalResolver {
    key: KeyResolver,
    web: WebResolver,
    ethr: EthrResolver,
    ion: Option<IonResolver>,
    cache: DashMap<String, CacheEntry>,
    inflight: DashMap<String, InflightFuture>,
    ttl: Duration,
    timeout: Duration,
}

impl Default for UniversalResolver {
    fn default() -> Self {
        Self {
            key: KeyResolver,
            web: WebResolver::default(),
            ethr: EthrResolver,
            ion: None,
            cache: DashMap::new(),
            inflight: DashMap::new(),
            ttl: DEFAULT_CACHE_TTL,
            timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }
}

impl UniversalResolver {
    /// Builds a resolver; `did:ion` support is added separately via
    /// [`Self::with_ion`] since it requires a configured endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables `did:ion` resolution against the given node.
    #[must_use]
    pub fn with_ion(mut self, ion: IonResolver) -> Self {
        self.ion = Some(ion);
        self
    }

    /// Overrides the cache TTL and per-resolution timeout.
    #[must_use]
    pub fn with_timings(mut self, ttl: Duration, timeout: Duration) -> Self {
        self.ttl = ttl;
        self.timeout = timeout;
        self
    }

    /// Evicts a DID from the cache, forcing the next [`Self::resolve`] to
    /// hit the network again.
    pub fn invalidate(&self, did: &str) {
        self.cache.remove(did);
    }

    fn cached(&self, did: &str) -> Option<Document> {
        let entry = self.cache.get(did)?;
        if entry.inserted_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.document.clone())
    }

    fn dispatch(self: &Arc<Self>, did: String) -> InflightFuture {
        let this = Arc::clone(self);
        let fut: Pin<Box<dyn Future<Output = Result<Document>> + Send>> = Box::pin(async move {
            let parsed: Did = did.parse()?;
            match parsed.method {
                Method::Key => this.key.resolve(&did).await,
                Method::Web => this.web.resolve(&did).await,
                Method::Ethr => this.ethr.resolve(&did).await,
                Method::Ion => match &this.ion {
                    Some(ion) => ion.resolve(&did).await,
                    None => Err(Error::MethodNotSupported("did:ion (no endpoint configured)".into())),
                },
            }
        });
        fut.shared()
    }

    /// Resolves `did`, using the cache when fresh and collapsing
    /// concurrent callers resolving the same DID into a single lookup.
    pub async fn resolve(self: &Arc<Self>, did: &str) -> Result<Document> {
        self.resolve_cancellable(did, &CancellationToken::new()).await
    }

    /// As [`Self::resolve`], but the wait can be cut short by cancelling
    /// `token` - used by batched credential verification so that
    /// abandoning one item's verification doesn't block on its DID
    /// resolution forever.
    pub async fn resolve_cancellable(
        self: &Arc<Self>, did: &str, token: &CancellationToken,
    ) -> Result<Document> {
        if let Some(doc) = self.cached(did) {
            return Ok(doc);
        }

        let inflight = match self.inflight.get(did) {
            Some(existing) => existing.clone(),
            None => {
                let fut = self.dispatch(did.to_string());
                self.inflight.insert(did.to_string(), fut.clone());
                fut
            }
        };

        let result = tokio::select! {
            () = token.cancelled() => Err(Error::Cancelled(did.to_string())),
            outcome = tokio::time::timeout(self.timeout, inflight) => outcome
                .map_err(|_| Error::Timeout(did.to_string()))
                .and_then(|r| r),
        };

        self.inflight.remove(did);

        if let Ok(doc) = &result {
            self.cache.insert(did.to_string(), CacheEntry { document: doc.clone(), inserted_at: Instant::now() });
        }

        result
    }

    /// As [`Self::resolve`], but returns the full DID Resolution Result -
    /// document plus resolution and document metadata - per the W3C DID
    /// Resolution spec. `didResolutionMetadata.duration` is always
    /// measured with a monotonic clock and is never zero; `cached` is
    /// `true` when the document came from the cache rather than a fresh
    /// resolution.
    pub async fn resolve_with_metadata(self: &Arc<Self>, did: &str) -> Result<Resolution> {
        self.resolve_with_metadata_cancellable(did, &CancellationToken::new()).await
    }

    /// As [`Self::resolve_with_metadata`], cancellable via `token`.
    pub async fn resolve_with_metadata_cancellable(
        self: &Arc<Self>, did: &str, token: &CancellationToken,
    ) -> Result<Resolution> {
        let was_cached = self.cached(did).is_some();
        let start = Instant::now();
        let result = self.resolve_cancellable(did, token).await;
        let duration = start.elapsed().as_micros().clamp(1, u128::from(u64::MAX)) as u64;
        let retrieved = chrono::Utc::now();

        Ok(match result {
            Ok(document) => Resolution {
                did_document: Some(document),
                did_document_metadata: DocumentMetadata::default(),
                did_resolution_metadata: ResolutionMetadata {
                    content_type: "application/did+json".to_string(),
                    duration,
                    retrieved,
                    cached: was_cached,
                    error: None,
                },
            },
            Err(err) => Resolution {
                did_document: None,
                did_document_metadata: DocumentMetadata::default(),
                did_resolution_metadata: ResolutionMetadata {
                    content_type: String::new(),
                    duration,
                    retrieved,
                    cached: was_cached,
                    error: Some(resolution_error_code(&err).to_string()),
                },
            },
        })
    }
}

/// Maps an internal error to one of the DID Resolution spec's registered
/// `didResolutionMetadata.error` codes.
fn resolution_error_code(err: &Error) -> &'static str {
    use trustmesh_core::ErrorKind;
    match err.kind() {
        ErrorKind::InvalidDid => "invalidDid",
        ErrorKind::MethodNotSupported => "methodNotSupported",
        ErrorKind::NotFound | ErrorKind::NetworkError | ErrorKind::Timeout | ErrorKind::Cancelled => "notFound",
        ErrorKind::MalformedInput | ErrorKind::MalformedCredential => "representationNotSupported",
        _ => "internalError",
    }
}

impl DidResolver for Arc<UniversalResolver> {
    async fn resolve(&self, did: &str) -> Result<Document> {
        UniversalResolver::resolve(self, did).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustmesh_crypto::{SigningKey, ED25519_CODEC};

    fn sample_did_key() -> String {
        let key = SigningKey::generate_ed25519();
        let mut bytes = ED25519_CODEC.to_vec();
        bytes.extend_from_slice(&key.verifying_key_bytes());
        let multibase = multibase::encode(multibase::Base::Base58Btc, &bytes);
        format!("did:key:{multibase}")
    }

    #[tokio::test]
    async fn resolves_and_caches_did_key() {
        let resolver = Arc::new(UniversalResolver::new());
        let did = sample_did_key();
        let first = resolver.resolve(&did).await.unwrap();
        assert_eq!(first.id, did);
        assert!(resolver.cached(&did).is_some());
    }

    #[tokio::test]
    async fn concurrent_resolutions_share_one_inflight_future() {
        let resolver = Arc::new(UniversalResolver::new());
        let did = sample_did_key();
        let (a, b) = tokio::join!(resolver.resolve(&did), resolver.resolve(&did));
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[tokio::test]
    async fn cancellation_short_circuits_resolution() {
        let resolver = Arc::new(UniversalResolver::new());
        let token = CancellationToken::new();
        token.cancel();
        let err = resolver.resolve_cancellable("did:web:example.com", &token).await.unwrap_err();
        assert_eq!(err.kind(), trustmesh_core::ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn unconfigured_ion_method_not_supported() {
        let resolver = Arc::new(UniversalResolver::new());
        let err = resolver.resolve("did:ion:EiA...").await.unwrap_err();
        assert_eq!(err.kind(), trustmesh_core::ErrorKind::MethodNotSupported);
    }

    #[tokio::test]
    async fn metadata_reports_duration_and_cache_state() {
        let resolver = Arc::new(UniversalResolver::new());
        let did = sample_did_key();

        let first = resolver.resolve_with_metadata(&did).await.unwrap();
        assert!(first.did_document.is_some());
        assert!(first.did_resolution_metadata.duration > 0);
        assert!(!first.did_resolution_metadata.cached);
        assert_eq!(first.did_resolution_metadata.content_type, "application/did+json");
        assert!(first.did_resolution_metadata.error.is_none());

        let second = resolver.resolve_with_metadata(&did).await.unwrap();
        assert!(second.did_resolution_metadata.cached);
    }

    #[tokio::test]
    async fn metadata_reports_error_code_on_failure() {
        let resolver = Arc::new(UniversalResolver::new());
        let resolution = resolver.resolve_with_metadata("did:ion:EiA...").await.unwrap();
        assert!(resolution.did_document.is_none());
        assert_eq!(resolution.did_resolution_metadata.error.as_deref(), Some("methodNotSupported"));
    }
}
