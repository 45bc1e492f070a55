//! `did:web` - resolved by fetching a `did.json` document from the
//! subject's web domain over HTTPS.
//!
//! <https://w3c-ccg.github.io/did-method-web>

use reqwest::Client;
use trustmesh_core::{Error, Result};

use crate::document::Document;
use crate::method::{Did, Method};
use crate::resolver::DidResolver;

/// Resolver for `did:web` identifiers.
#[derive(Clone)]
pub struct WebResolver {
    client: Client,
}

impl Default for WebResolver {
    fn default() -> Self {
        Self { client: Client::new() }
    }
}

impl WebResolver {
    /// Builds a resolver using a caller-supplied HTTP client (for custom
    /// timeouts, proxies, or TLS configuration).
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn document_url(msid: &str) -> Result<String> {
        let has_path = msid.contains(':');
        let mut url = "https://".to_string() + &msid.replace(':', "/").replace("%3A", ":");
        if has_path {
            url += "/did.json";
        } else {
            url += "/.well-known/did.json";
        }
        reqwest::Url::parse(&url).map_err(|e| Error::InvalidDid(format!("invalid did:web host: {e}")))?;
        Ok(url)
    }
}

impl DidResolver for WebResolver {
    async fn resolve(&self, did: &str) -> Result<Document> {
        let parsed: Did = did.parse()?;
        if parsed.method != Method::Web {
            return Err(Error::MethodNotSupported(parsed.method.to_string()));
        }
        let url = Self::document_url(&parsed.msid)?;

        let document: Document = trustmesh_core::retry::retry(|| async {
            let response = self
                .client
                .get(&url)
                .header(reqwest::header::ACCEPT, "application/did+json, application/json")
                .send()
                .await
                .map_err(|e| Error::NetworkError(e.to_string()))?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(Error::NotFound(did.to_string()));
            }
            if !response.status().is_success() {
                return Err(Error::NetworkError(format!("did:web host returned {}", response.status())));
            }

            response
                .json::<Document>()
                .await
                .map_err(|e| Error::MalformedInput(format!("did:web document did not parse: {e}")))
        })
        .await?;

        validate_id(&document, did)?;
        Ok(document)
    }
}

fn validate_id(document: &Document, did: &str) -> Result<()> {
    if document.id != did {
        return Err(Error::InvalidDid(format!(
            "did:web host served document for {} instead of {did}",
            document.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_url_without_path_uses_well_known() {
        let url = WebResolver::document_url("example.com").unwrap();
        assert_eq!(url, "https://example.com/.well-known/did.json");
    }

    #[test]
    fn document_url_with_path_uses_did_json() {
        let url = WebResolver::document_url("example.com:users:alice").unwrap();
        assert_eq!(url, "https://example.com/users/alice/did.json");
    }

    #[test]
    fn document_url_decodes_percent_encoded_port() {
        let url = WebResolver::document_url("example.com%3A8443").unwrap();
        assert_eq!(url, "https://example.com:8443/.well-known/did.json");
    }

    #[test]
    fn rejects_document_with_mismatched_id() {
        let doc = Document { id: "did:web:impostor.test".to_string(), ..Document::default() };
        let err = validate_id(&doc, "did:web:example.test").unwrap_err();
        assert_eq!(err.kind(), trustmesh_core::ErrorKind::InvalidDid);
    }

    #[test]
    fn accepts_document_with_matching_id() {
        let doc = Document { id: "did:web:example.test".to_string(), ..Document::default() };
        assert!(validate_id(&doc, "did:web:example.test").is_ok());
    }
}
