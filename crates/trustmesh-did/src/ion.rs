//! `did:ion` - a Sidetree-anchored DID. trustmesh does not implement the
//! Sidetree protocol itself; resolution is delegated to a configured ION
//! node's resolution endpoint (the same role a Universal Resolver driver
//! plays), mirroring how the teacher's own ION registrar only proxies to
//! `resolve_did` rather than walking the anchoring log locally.
//!
//! <https://identity.foundation/sidetree/spec/>

use reqwest::Client;
use trustmesh_core::{Error, Result};

use crate::document::Document;
use crate::method::{Did, Method};
use crate::resolver::DidResolver;

/// Resolver for `did:ion` identifiers, delegating to a remote node.
#[derive(Clone)]
pub struct IonResolver {
    client: Client,
    /// Base URL of the node's resolution endpoint, e.g.
    /// `https://ion.example.com/identifiers`.
    endpoint: String,
}

impl IonResolver {
    /// Builds a resolver against an explicit node endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { client: Client::new(), endpoint: endpoint.into() }
    }

    /// Builds a resolver from `TRUSTMESH_ION_RESOLUTION_ENDPOINT`.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("TRUSTMESH_ION_RESOLUTION_ENDPOINT").map_err(|_| {
            Error::MethodNotSupported("did:ion resolution requires TRUSTMESH_ION_RESOLUTION_ENDPOINT".into())
        })?;
        Ok(Self::new(endpoint))
    }
}

/// The subset of a Universal-Resolver-shaped response trustmesh reads;
/// extra fields from the node are ignored.
#[derive(serde::Deserialize)]
struct NodeResponse {
    did_document: Document,
}

impl DidResolver for IonResolver {
    async fn resolve(&self, did: &str) -> Result<Document> {
        let parsed: Did = did.parse()?;
        if parsed.method != Method::Ion {
            return Err(Error::MethodNotSupported(parsed.method.to_string()));
        }

        let url = format!("{}/{did}", self.endpoint.trim_end_matches('/'));

        let document = trustmesh_core::retry::retry(|| async {
            let response = self
                .client
                .get(&url)
                .header(reqwest::header::ACCEPT, "application/did+json")
                .send()
                .await
                .map_err(|e| Error::NetworkError(e.to_string()))?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(Error::NotFound(did.to_string()));
            }
            if !response.status().is_success() {
                return Err(Error::NetworkError(format!("ION node returned {}", response.status())));
            }

            response
                .json::<NodeResponse>()
                .await
                .map(|r| r.did_document)
                .map_err(|e| Error::MalformedInput(format!("ION node response did not parse: {e}")))
        })
        .await?;

        validate_id(&document, did)?;
        Ok(document)
    }
}

fn validate_id(document: &Document, did: &str) -> Result<()> {
    if document.id != did {
        return Err(Error::InvalidDid(format!(
            "ION node served document for {} instead of {did}",
            document.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_fails_without_endpoint() {
        std::env::remove_var("TRUSTMESH_ION_RESOLUTION_ENDPOINT");
        assert!(IonResolver::from_env().is_err());
    }

    #[test]
    fn rejects_document_with_mismatched_id() {
        let doc = Document { id: "did:ion:EiOther".to_string(), ..Document::default() };
        let err = validate_id(&doc, "did:ion:EiA...").unwrap_err();
        assert_eq!(err.kind(), trustmesh_core::ErrorKind::InvalidDid);
    }
}
