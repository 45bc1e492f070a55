//! The Verifiable Credential Data Model (W3C VC Data Model 1.1).

use serde::{Deserialize, Serialize};
use trustmesh_core::{Kind, OneMany};

use crate::proof::Proof;

/// Default context every trustmesh credential carries.
pub const VC_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";
/// The type every trustmesh credential carries in addition to its
/// domain-specific types.
pub const VC_TYPE: &str = "VerifiableCredential";

/// A verifiable credential.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    /// JSON-LD context.
    #[serde(rename = "@context")]
    pub context: Vec<Kind<serde_json::Value>>,

    /// Credential id, typically a URN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Credential types; always includes `VerifiableCredential`.
    #[serde(rename = "type")]
    pub type_: Vec<String>,

    /// The entity that issued the credential.
    pub issuer: Kind<Issuer>,

    /// The entity the credential makes claims about.
    pub credential_subject: OneMany<CredentialSubject>,

    /// The instant the credential was issued, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<String>,

    /// The instant after which the credential is no longer valid, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    /// Revocation/suspension status entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<CredentialStatus>,

    /// Schema the credential subject conforms to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_schema: Option<OneMany<CredentialSchema>>,

    /// The proof(s) securing this credential. Absent until the issuer signs it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<OneMany<Proof>>,
}

/// The credential issuer, which may be a bare DID or an object with
/// additional properties (e.g. a human-readable name).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Issuer {
    /// The issuer's DID.
    pub id: String,
    /// A human-readable name, if published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The claims a credential makes about its subject.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSubject {
    /// The subject's DID, if the claims are about a specific identified entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The claims themselves.
    #[serde(flatten)]
    pub claims: serde_json::Map<String, serde_json::Value>,
}

/// A reference to a schema the credential subject's claims conform to.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CredentialSchema {
    /// URL of the schema document.
    pub id: String,
    /// The schema's type, e.g. `JsonSchema`.
    #[serde(rename = "type")]
    pub type_: String,
}

/// A Status List 2021 credential status entry.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    /// Id of this status entry.
    pub id: String,
    /// Entry type; always `StatusList2021Entry`.
    #[serde(rename = "type")]
    pub type_: String,
    /// What the flagged bit means.
    pub status_purpose: StatusPurpose,
    /// The bit's position within the referenced list.
    pub status_list_index: usize,
    /// URL of the `StatusList2021Credential` that contains the bit.
    pub status_list_credential: String,
}

/// The purpose a status list bit is tracking.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StatusPurpose {
    /// A set bit permanently revokes the credential.
    Revocation,
    /// A set bit temporarily suspends the credential.
    Suspension,
}

/// A `StatusList2021Credential`: a credential whose subject is the
/// encoded bitstring itself.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusListCredential {
    /// JSON-LD context.
    #[serde(rename = "@context")]
    pub context: Vec<Kind<serde_json::Value>>,
    /// Credential id; this is the URL clients dereference.
    pub id: String,
    /// Always `["VerifiableCredential", "StatusList2021Credential"]`.
    #[serde(rename = "type")]
    pub type_: Vec<String>,
    /// The entity that maintains the list.
    pub issuer: Kind<Issuer>,
    /// The encoded bitstring subject.
    pub credential_subject: StatusListSubject,
    /// Proof securing the status list credential itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<OneMany<Proof>>,
}

/// Subject of a [`StatusListCredential`]: the encoded bitstring.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusListSubject {
    /// Subject id, typically `<credential id>#list`.
    pub id: String,
    /// Always `StatusList2021`.
    #[serde(rename = "type")]
    pub type_: String,
    /// What bits in this list mean.
    pub status_purpose: StatusPurpose,
    /// Gzip + base64url-encoded bitstring.
    pub encoded_list: String,
}
