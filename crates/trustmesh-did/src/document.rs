//! The DID Document data model (W3C DID Core) and the DID Resolution
//! Result wrapper around it.

use serde::{Deserialize, Serialize};
use trustmesh_core::{Kind, OneMany};

/// Default `@context` value for a freshly resolved document.
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// A DID Document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The context of the DID document.
    #[serde(rename = "@context")]
    pub context: Vec<Kind<serde_json::Value>>,

    /// The DID identifying the subject of this document.
    pub id: String,

    /// Other identifiers for the subject of this document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub also_known_as: Option<Vec<String>>,

    /// DIDs whose verification methods are accepted as authoritative for
    /// this subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<OneMany<String>>,

    /// Services through which the subject can be reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<Service>>,

    /// Verification methods defined by this document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Vec<VerificationMethod>>,

    /// Methods authorized to authenticate as the subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<Kind<VerificationMethod>>>,

    /// Methods authorized to issue assertions (e.g. verifiable credentials)
    /// on behalf of the subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_method: Option<Vec<Kind<VerificationMethod>>>,

    /// Methods usable to establish confidential communication with the subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_agreement: Option<Vec<Kind<VerificationMethod>>>,

    /// Methods authorized to invoke a capability on behalf of the subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_invocation: Option<Vec<Kind<VerificationMethod>>>,

    /// Methods authorized to delegate a capability on behalf of the subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_delegation: Option<Vec<Kind<VerificationMethod>>>,
}

impl Document {
    /// Finds a verification method by its full id (`did#fragment`).
    #[must_use]
    pub fn get_verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.as_ref()?.iter().find(|vm| vm.id == id)
    }

    /// Finds a service by its id.
    #[must_use]
    pub fn get_service(&self, id: &str) -> Option<&Service> {
        self.service.as_ref()?.iter().find(|s| s.id == id)
    }

    /// Returns `true` if `method_id` appears in the `assertionMethod`
    /// relationship, the relationship verifiable credential issuance
    /// checks against.
    #[must_use]
    pub fn authorizes_assertion(&self, method_id: &str) -> bool {
        let Some(methods) = &self.assertion_method else { return false };
        methods.iter().any(|k| match k {
            Kind::String(id) => id == method_id,
            Kind::Object(vm) => vm.id == method_id,
        })
    }
}

/// A service endpoint advertised by a DID subject.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Unique id for the service.
    pub id: String,
    /// Registered service type.
    #[serde(rename = "type")]
    pub type_: String,
    /// One or more endpoints.
    pub service_endpoint: OneMany<Kind<serde_json::Value>>,
}

/// A cryptographic verification method declared by a DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// The DID URL identifying this verification method.
    pub id: String,
    /// The registered type of the verification method.
    #[serde(rename = "type")]
    pub type_: MethodType,
    /// The DID of the controller of the verification method.
    pub controller: String,
    /// The public key material, in whichever format the document uses.
    #[serde(flatten)]
    pub key: PublicKeyFormat,
}

/// The encoding used for a verification method's public key material.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum PublicKeyFormat {
    /// Multibase-encoded raw key bytes, used by `did:key` and `did:web`.
    PublicKeyMultibase {
        /// The multibase-encoded public key.
        public_key_multibase: String,
    },
    /// JSON Web Key, used by `did:ion`.
    PublicKeyJwk {
        /// The public key as a JWK.
        public_key_jwk: PublicKeyJwk,
    },
    /// A CAIP-10 blockchain account id, used by `did:ethr` when only the
    /// address (not the public key) is known.
    BlockchainAccountId {
        /// The CAIP-10 account id, e.g. `eip155:1:0xabc...`.
        blockchain_account_id: String,
    },
}

impl Default for PublicKeyFormat {
    fn default() -> Self {
        Self::PublicKeyMultibase { public_key_multibase: String::new() }
    }
}

/// A minimal JSON Web Key, carrying only the fields trustmesh's supported
/// curves need.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PublicKeyJwk {
    /// Key type (`OKP` for Ed25519, `EC` for secp256k1).
    pub kty: String,
    /// Curve name (`Ed25519` or `secp256k1`).
    pub crv: String,
    /// Base64url-encoded x-coordinate (or the full key for Ed25519).
    pub x: String,
    /// Base64url-encoded y-coordinate, present only for `EC` keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

/// Registered verification method types trustmesh resolvers produce.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum MethodType {
    /// Generic multikey format.
    #[default]
    Multikey,
    /// Ed25519 verification key, version 2020, used by `did:key` and
    /// `did:web` over an Ed25519 key.
    Ed25519VerificationKey2020,
    /// JSON Web Key, version 2020.
    JsonWebKey2020,
    /// secp256k1 verification key, version 2019, used by `did:key` over a
    /// secp256k1 key.
    EcdsaSecp256k1VerificationKey2019,
    /// secp256k1 recovery method, version 2020 (used by `did:ethr` when
    /// only the blockchain address is known).
    EcdsaSecp256k1RecoveryMethod2020,
}

/// The result of a DID resolution, bundling the document with its
/// resolution and document metadata per the W3C DID Resolution spec.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// The resolved document, absent if resolution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_document: Option<Document>,
    /// Metadata about the document itself.
    pub did_document_metadata: DocumentMetadata,
    /// Metadata about the resolution process.
    pub did_resolution_metadata: ResolutionMetadata,
}

/// Metadata describing a resolved document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Timestamp the document was created, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<chrono::DateTime<chrono::Utc>>,
    /// `true` if the DID has been deactivated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
}

/// Metadata describing the resolution process itself.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    /// The media type of the resolved representation.
    pub content_type: String,
    /// Wall-clock time the resolution took, in microseconds. Always
    /// measured with a monotonic clock; never zero, even for resolvers
    /// that do no network I/O.
    pub duration: u64,
    /// When this resolution completed.
    pub retrieved: chrono::DateTime<chrono::Utc>,
    /// `true` if the document was served from cache rather than resolved
    /// fresh.
    pub cached: bool,
    /// An error code, one of the DID Resolution spec's registered values
    /// (`invalidDid`, `notFound`, `representationNotSupported`,
    /// `methodNotSupported`, `internalError`), if resolution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
