//! Thin HTTP clients for cloud KMS backends.
//!
//! Both backends speak to a REST front door (API Gateway in front of AWS
//! KMS, or Cloud KMS's own HTTPS API) rather than an SDK, the same way the
//! teacher's Azure Key Vault signer drove everything through `reqwest`
//! instead of an Azure SDK crate. Credentials are read from the
//! environment once, at construction, never on every call.

use base64ct::{Base64UrlUnpadded, Encoding};
use reqwest::Client;
use serde::Deserialize;
use trustmesh_core::{Error, Result};
use trustmesh_crypto::Algorithm;

use crate::Kms;

/// Shared HTTP plumbing for a bearer-token-authenticated remote KMS.
struct HttpKms {
    client: Client,
    base_url: String,
    bearer_token: String,
}

#[derive(Deserialize)]
struct SignResponse {
    signature: String,
}

#[derive(Deserialize)]
struct KeyDescriptor {
    algorithm: RemoteAlgorithm,
    public_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum RemoteAlgorithm {
    EddsaEd25519,
    EcdsaSecp256k1,
}

impl From<RemoteAlgorithm> for Algorithm {
    fn from(value: RemoteAlgorithm) -> Self {
        match value {
            RemoteAlgorithm::EddsaEd25519 => Self::EdDsa,
            RemoteAlgorithm::EcdsaSecp256k1 => Self::Es256k,
        }
    }
}

impl RemoteAlgorithm {
    const fn from_algorithm(alg: Algorithm) -> Self {
        match alg {
            Algorithm::EdDsa => Self::EddsaEd25519,
            Algorithm::Es256k => Self::EcdsaSecp256k1,
        }
    }
}

impl HttpKms {
    fn new(base_url: String, bearer_token: String) -> Self {
        Self { client: Client::new(), base_url, bearer_token }
    }

    async fn generate_key(&self, key_id: &str, algorithm: Algorithm) -> Result<()> {
        trustmesh_core::retry::retry(|| async {
            let body = serde_json::json!({ "algorithm": RemoteAlgorithm::from_algorithm(algorithm) });
            let resp = self
                .client
                .post(format!("{}/keys/{key_id}", self.base_url))
                .bearer_auth(&self.bearer_token)
                .json(&body)
                .send()
                .await
                .map_err(|e| Error::KmsUnavailable(e.to_string()))?;
            if resp.status() == reqwest::StatusCode::CONFLICT {
                return Err(Error::AccessDenied(format!("key {key_id} already exists")));
            }
            if !resp.status().is_success() {
                return Err(Error::KmsUnavailable(format!("create key failed: {}", resp.status())));
            }
            Ok(())
        })
        .await
    }

    async fn sign(&self, key_id: &str, msg: &[u8]) -> Result<Vec<u8>> {
        trustmesh_core::retry::retry(|| async {
            let body = serde_json::json!({ "message": Base64UrlUnpadded::encode_string(msg) });
            let resp = self
                .client
                .post(format!("{}/keys/{key_id}:sign", self.base_url))
                .bearer_auth(&self.bearer_token)
                .json(&body)
                .send()
                .await
                .map_err(|e| Error::KmsUnavailable(e.to_string()))?;
            if resp.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(Error::KeyNotFound(key_id.to_string()));
            }
            let parsed: SignResponse = resp
                .error_for_status()
                .map_err(|e| Error::KmsUnavailable(e.to_string()))?
                .json()
                .await
                .map_err(|e| Error::KmsUnavailable(e.to_string()))?;
            Base64UrlUnpadded::decode_vec(&parsed.signature)
                .map_err(|e| Error::KmsUnavailable(format!("malformed signature in response: {e}")))
        })
        .await
    }

    async fn describe(&self, key_id: &str) -> Result<KeyDescriptor> {
        trustmesh_core::retry::retry(|| async {
            let resp = self
                .client
                .get(format!("{}/keys/{key_id}", self.base_url))
                .bearer_auth(&self.bearer_token)
                .send()
                .await
                .map_err(|e| Error::KmsUnavailable(e.to_string()))?;
            if resp.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(Error::KeyNotFound(key_id.to_string()));
            }
            resp.error_for_status()
                .map_err(|e| Error::KmsUnavailable(e.to_string()))?
                .json()
                .await
                .map_err(|e| Error::KmsUnavailable(e.to_string()))
        })
        .await
    }

    async fn public_key(&self, key_id: &str) -> Result<Vec<u8>> {
        let descriptor = self.describe(key_id).await?;
        Base64UrlUnpadded::decode_vec(&descriptor.public_key)
            .map_err(|e| Error::KmsUnavailable(format!("malformed public key in response: {e}")))
    }

    async fn algorithm(&self, key_id: &str) -> Result<Algorithm> {
        Ok(self.describe(key_id).await?.algorithm.into())
    }
}

/// AWS KMS backend, addressed through a REST front door.
pub struct AwsKms(HttpKms);

impl AwsKms {
    /// Builds a client against an explicit endpoint and bearer token
    /// (typically a short-lived STS-assumed-role token).
    #[must_use]
    pub fn new(endpoint: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self(HttpKms::new(endpoint.into(), bearer_token.into()))
    }

    /// Builds a client from `TRUSTMESH_AWS_KMS_ENDPOINT` and
    /// `TRUSTMESH_AWS_KMS_TOKEN`. Environment variables are read once,
    /// here, never again for the life of the client.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("TRUSTMESH_AWS_KMS_ENDPOINT")
            .map_err(|_| Error::KmsUnavailable("TRUSTMESH_AWS_KMS_ENDPOINT not set".into()))?;
        let token = std::env::var("TRUSTMESH_AWS_KMS_TOKEN")
            .map_err(|_| Error::KmsUnavailable("TRUSTMESH_AWS_KMS_TOKEN not set".into()))?;
        Ok(Self::new(endpoint, token))
    }
}

impl Kms for AwsKms {
    async fn generate_key(&self, key_id: &str, algorithm: Algorithm) -> Result<()> {
        self.0.generate_key(key_id, algorithm).await
    }

    async fn sign(&self, key_id: &str, msg: &[u8]) -> Result<Vec<u8>> {
        self.0.sign(key_id, msg).await
    }

    async fn public_key(&self, key_id: &str) -> Result<Vec<u8>> {
        self.0.public_key(key_id).await
    }

    async fn algorithm(&self, key_id: &str) -> Result<Algorithm> {
        self.0.algorithm(key_id).await
    }
}

/// GCP Cloud KMS backend, addressed through its HTTPS API.
pub struct GcpKms(HttpKms);

impl GcpKms {
    /// Builds a client against an explicit endpoint and bearer token
    /// (typically a Google service-account access token).
    #[must_use]
    pub fn new(endpoint: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self(HttpKms::new(endpoint.into(), bearer_token.into()))
    }

    /// Builds a client from `TRUSTMESH_GCP_KMS_ENDPOINT` and
    /// `TRUSTMESH_GCP_KMS_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("TRUSTMESH_GCP_KMS_ENDPOINT")
            .map_err(|_| Error::KmsUnavailable("TRUSTMESH_GCP_KMS_ENDPOINT not set".into()))?;
        let token = std::env::var("TRUSTMESH_GCP_KMS_TOKEN")
            .map_err(|_| Error::KmsUnavailable("TRUSTMESH_GCP_KMS_TOKEN not set".into()))?;
        Ok(Self::new(endpoint, token))
    }
}

impl Kms for GcpKms {
    async fn generate_key(&self, key_id: &str, algorithm: Algorithm) -> Result<()> {
        self.0.generate_key(key_id, algorithm).await
    }

    async fn sign(&self, key_id: &str, msg: &[u8]) -> Result<Vec<u8>> {
        self.0.sign(key_id, msg).await
    }

    async fn public_key(&self, key_id: &str) -> Result<Vec<u8>> {
        self.0.public_key(key_id).await
    }

    async fn algorithm(&self, key_id: &str) -> Result<Algorithm> {
        self.0.algorithm(key_id).await
    }
}
