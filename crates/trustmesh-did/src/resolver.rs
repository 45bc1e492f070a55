//! The [`DidResolver`] capability trait implemented by each method
//! resolver and by the caching [`crate::universal::UniversalResolver`].

use trustmesh_core::Result;

use crate::document::Document;

/// Resolves a DID string to its DID document.
///
/// Implementers return `Document`, not the full `Resolution` wrapper -
/// callers that need resolution/document metadata go through
/// [`crate::universal::UniversalResolver::resolve_with_metadata`] instead,
/// which is the single place that assembles it.
pub trait DidResolver: Send + Sync {
    /// Resolves `did` (a bare `did:<method>:<msid>` string, no fragment)
    /// to its document.
    fn resolve(&self, did: &str) -> impl std::future::Future<Output = Result<Document>> + Send;
}
